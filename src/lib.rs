//! # Cardiac planes library
//!
//! This crate derives the standard cardiac imaging planes from an arbitrary
//! 3D volume, driven by line segments an operator draws on successive views
//!
//! Planning runs in three chained steps, each consuming a line drawn on the
//! previous view:
//!  - Axial line → pseudo 2-chamber (P2CH) plane
//!  - Valve → apex line on P2CH → pseudo 4-chamber (P4CH) plane, rotatable
//!    around the long axis
//!  - Long-axis line on P4CH → short-axis (SAX) plane family, scrollable along
//!    its normal
//!
//! Every plane is an [`ObliquePlane`]: a bounded pixel frame embedded in
//! volume space that maps points both ways and resamples the volume with
//! trilinear interpolation. Extraction is parallelized row-wise using rayon.
//!
//! The derivation functions are pure and never fail. Degenerate gestures
//! (zero-length lines) yield degenerate planes; rejecting them is up to the
//! caller, which [`CardiacPlanner`] does according to its [`PlannerConfig`].
//! Volumes are assumed to be:
//!   - In `(z, y, x)` array order
//!   - Reoriented so that axial slices are XY planes with superior at high z
//!
//! # Examples
//!
//! ## Planning a short-axis stack
//!
//! ```no_run
//! # use cardiac_planes::{CardiacPlanner, LineSegment2, PlannerConfig, Volume};
//! # use ndarray::Array3;
//! let volume = Volume::new(Array3::zeros((100, 256, 256)), (1.0, 1.0, 1.0))
//!     .expect("should have accepted a non-empty volume");
//! let mut planner = CardiacPlanner::new(volume.dim(), PlannerConfig::default());
//!
//! let p2ch = planner
//!     .set_axial_line(LineSegment2::new((50.0, 120.0), (180.0, 120.0)), 50)
//!     .expect("should have derived P2CH")
//!     .clone();
//! let valve_to_apex = LineSegment2::new((190.0, 10.0), (200.0, 90.0)).lift(&p2ch, 0.0);
//! let p4ch = planner
//!     .set_p2ch_line(valve_to_apex)
//!     .expect("should have derived P4CH")
//!     .clone();
//! let long_axis = LineSegment2::new((180.0, 20.0), (210.0, 85.0)).lift(&p4ch, 0.0);
//! planner.set_p4ch_line(long_axis).expect("should have derived SAX");
//!
//! let sax = planner.sax_plane_at(10.0).expect("should have a SAX plane");
//! let image = volume
//!     .get_image_from_plane(&sax, 0.0, volume.default_window())
//!     .expect("should have rendered the SAX slice");
//! image.save("sax.png");
//! ```

pub mod config;
pub mod derive;
pub mod enums;
pub mod error;
pub mod extract;
mod interpolator;
pub mod line;
pub mod plane;
pub mod planner;
pub mod render;
pub mod vector;
pub mod volume;

pub use config::PlannerConfig;
pub use derive::{
    P4chDerivation, VolumeShape, derive_p2ch, derive_p4ch, derive_p4ch_with_rotation, derive_sax,
    sax_scroll_range,
};
pub use enums::{Orientation, PlanningStage, RotationMode};
pub use error::PlanningError;
pub use extract::extract_oblique_slice;
pub use line::{LineSegment2, LineSegment3};
pub use plane::ObliquePlane;
pub use planner::CardiacPlanner;
pub use render::Window;
pub use vector::{Vec3, normalize};
pub use volume::Volume;
