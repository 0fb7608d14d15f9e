//! The three-stage planning workflow as an explicit state machine.
//!
//! Each stage owns the line it was derived from and the plane it produced.
//! Replacing or clearing a stage's line drops every later stage, so a
//! downstream plane can never outlive the upstream gesture it came from.

use std::mem;

use crate::config::PlannerConfig;
use crate::derive::{
    P4chDerivation, VolumeShape, derive_p2ch, derive_p4ch_with_rotation, derive_sax, sax_scroll_range,
};
use crate::enums::{Orientation, PlanningStage, RotationMode};
use crate::error::PlanningError;
use crate::line::{LineSegment2, LineSegment3};
use crate::plane::ObliquePlane;

#[derive(Clone, Debug)]
struct P2chStage {
    axial_line: LineSegment3,
    plane: ObliquePlane,
}

#[derive(Clone, Debug)]
struct P4chStage {
    p2ch_line: LineSegment3,
    derivation: P4chDerivation,
}

#[derive(Clone, Debug)]
struct SaxStage {
    p4ch_line: LineSegment3,
    plane: ObliquePlane,
}

#[derive(Clone, Debug, Default)]
enum PlanningState {
    #[default]
    Empty,
    P2ch(P2chStage),
    P4ch(P2chStage, P4chStage),
    Sax(P2chStage, P4chStage, SaxStage),
}

impl PlanningState {
    fn stage(&self) -> PlanningStage {
        match self {
            PlanningState::Empty => PlanningStage::Empty,
            PlanningState::P2ch(..) => PlanningStage::P2chReady,
            PlanningState::P4ch(..) => PlanningStage::P4chReady,
            PlanningState::Sax(..) => PlanningStage::SaxReady,
        }
    }

    fn p2ch(&self) -> Option<&P2chStage> {
        match self {
            PlanningState::Empty => None,
            PlanningState::P2ch(p2ch) | PlanningState::P4ch(p2ch, _) | PlanningState::Sax(p2ch, ..) => {
                Some(p2ch)
            }
        }
    }

    fn p4ch(&self) -> Option<&P4chStage> {
        match self {
            PlanningState::P4ch(_, p4ch) | PlanningState::Sax(_, p4ch, _) => Some(p4ch),
            _ => None,
        }
    }

    fn sax(&self) -> Option<&SaxStage> {
        match self {
            PlanningState::Sax(.., sax) => Some(sax),
            _ => None,
        }
    }

    /// Keep only the stages up to and including `keep`.
    fn truncate(self, keep: PlanningStage) -> Self {
        match (self, keep) {
            (_, PlanningStage::Empty) => PlanningState::Empty,
            (PlanningState::P4ch(p2ch, _) | PlanningState::Sax(p2ch, ..), PlanningStage::P2chReady) => {
                PlanningState::P2ch(p2ch)
            }
            (PlanningState::Sax(p2ch, p4ch, _), PlanningStage::P4chReady) => PlanningState::P4ch(p2ch, p4ch),
            (state, _) => state,
        }
    }
}

/// Drives P2CH → P4CH → SAX derivation from successive line gestures.
///
/// Lines are held in volume coordinates. The current P4CH rotation angle and
/// mode persist across re-derivations, the way a rotation control keeps its
/// position while the lines it applies to are redrawn.
#[derive(Clone, Debug)]
pub struct CardiacPlanner {
    volume_shape: VolumeShape,
    config: PlannerConfig,
    rotation_degrees: f64,
    rotation_mode: RotationMode,
    state: PlanningState,
}

impl CardiacPlanner {
    pub fn new(volume_shape: VolumeShape, config: PlannerConfig) -> Self {
        let rotation_mode = config.rotation_mode;
        Self {
            volume_shape,
            config,
            rotation_degrees: 0.0,
            rotation_mode,
            state: PlanningState::Empty,
        }
    }

    pub fn stage(&self) -> PlanningStage {
        self.state.stage()
    }

    pub fn volume_shape(&self) -> VolumeShape {
        self.volume_shape
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    pub fn rotation_mode(&self) -> RotationMode {
        self.rotation_mode
    }

    /// Start over from a line drawn on axial slice `axial_index`. Replaces
    /// any existing P2CH stage and drops P4CH and SAX.
    pub fn set_axial_line(
        &mut self,
        line: LineSegment2,
        axial_index: usize,
    ) -> Result<&ObliquePlane, PlanningError> {
        self.check_length(line.length())?;
        self.invalidate(PlanningStage::Empty);

        let axial_line = LineSegment3::new(
            Orientation::Axial.to_volume(axial_index, line.start.0, line.start.1),
            Orientation::Axial.to_volume(axial_index, line.end.0, line.end.1),
        );
        let plane = derive_p2ch(&line, axial_index as f64, self.volume_shape);
        log::info!("P2CH derived from axial slice {axial_index}");

        self.state = PlanningState::P2ch(P2chStage { axial_line, plane });
        Ok(&self.p2ch_stage()?.plane)
    }

    /// Derive P4CH from a valve → apex line drawn on the P2CH view. Drops SAX.
    pub fn set_p2ch_line(&mut self, line: LineSegment3) -> Result<&ObliquePlane, PlanningError> {
        self.check_length(line.length())?;
        let p2ch = self.p2ch_stage()?;
        let on_p2ch = self.project(&line, &p2ch.plane)?;
        let derivation = derive_p4ch_with_rotation(
            &on_p2ch,
            &p2ch.plane,
            self.volume_shape,
            self.rotation_degrees,
            self.rotation_mode,
        );
        log::info!(
            "P4CH derived at {}° ({:?})",
            self.rotation_degrees,
            self.rotation_mode
        );

        let p2ch = p2ch.clone();
        self.invalidate(PlanningStage::P2chReady);
        self.state = PlanningState::P4ch(
            p2ch,
            P4chStage {
                p2ch_line: line,
                derivation,
            },
        );
        Ok(&self.p4ch_stage()?.derivation.plane)
    }

    /// Derive the SAX family from a long-axis line drawn on the P4CH view.
    pub fn set_p4ch_line(&mut self, line: LineSegment3) -> Result<&ObliquePlane, PlanningError> {
        self.check_length(line.length())?;
        let p4ch = self.p4ch_stage()?;
        let p4ch_plane = &p4ch.derivation.plane;
        let on_p4ch = self.project(&line, p4ch_plane)?;
        let plane = derive_sax(&on_p4ch, p4ch_plane, self.volume_shape);
        log::info!("SAX derived, normal {:?}", plane.normal);

        self.state = match mem::take(&mut self.state).truncate(PlanningStage::P4chReady) {
            PlanningState::P4ch(p2ch, p4ch) => PlanningState::Sax(
                p2ch,
                p4ch,
                SaxStage {
                    p4ch_line: line,
                    plane,
                },
            ),
            other => other,
        };
        Ok(&self.sax_stage()?.plane)
    }

    pub fn clear_axial_line(&mut self) {
        self.invalidate(PlanningStage::Empty);
    }

    pub fn clear_p2ch_line(&mut self) {
        self.invalidate(PlanningStage::P2chReady);
    }

    pub fn clear_p4ch_line(&mut self) {
        self.invalidate(PlanningStage::P4chReady);
    }

    /// Rotate P4CH around its long axis. The angle is wrapped into
    /// `[-180, 180]` and remembered for later derivations. Recomputes from
    /// the cached derivation in constant time.
    ///
    /// SAX is dropped along with its long-axis line, which was drawn on the
    /// previous orientation. Draw a new line on the rotated view with
    /// [`CardiacPlanner::set_p4ch_line`] to get SAX back.
    pub fn set_rotation(&mut self, degrees: f64) -> Option<&ObliquePlane> {
        self.rotation_degrees = wrap_degrees(degrees);
        let rotated = self.state.p4ch()?.derivation.rotated(self.rotation_degrees);
        self.replace_p4ch(rotated)
    }

    /// Switch the P4CH zero-degree convention, keeping the current angle.
    /// Like [`CardiacPlanner::set_rotation`], this drops SAX and its line.
    pub fn set_rotation_mode(&mut self, mode: RotationMode) -> Option<&ObliquePlane> {
        self.rotation_mode = mode;
        let switched = self.state.p4ch()?.derivation.with_mode(mode);
        self.replace_p4ch(switched)
    }

    pub fn axial_line(&self) -> Option<&LineSegment3> {
        self.state.p2ch().map(|p2ch| &p2ch.axial_line)
    }

    pub fn p2ch_line(&self) -> Option<&LineSegment3> {
        self.state.p4ch().map(|p4ch| &p4ch.p2ch_line)
    }

    pub fn p4ch_line(&self) -> Option<&LineSegment3> {
        self.state.sax().map(|sax| &sax.p4ch_line)
    }

    pub fn p2ch_plane(&self) -> Option<&ObliquePlane> {
        self.state.p2ch().map(|p2ch| &p2ch.plane)
    }

    pub fn p4ch_plane(&self) -> Option<&ObliquePlane> {
        self.p4ch_derivation().map(|derivation| &derivation.plane)
    }

    pub fn p4ch_derivation(&self) -> Option<&P4chDerivation> {
        self.state.p4ch().map(|p4ch| &p4ch.derivation)
    }

    pub fn sax_plane(&self) -> Option<&ObliquePlane> {
        self.state.sax().map(|sax| &sax.plane)
    }

    /// Member of the SAX family `offset` voxels along its normal.
    pub fn sax_plane_at(&self, offset: f64) -> Option<ObliquePlane> {
        self.sax_plane().map(|plane| plane.with_offset(offset))
    }

    pub fn sax_scroll_range(&self) -> (f64, f64) {
        sax_scroll_range(self.volume_shape)
    }

    fn replace_p4ch(&mut self, derivation: P4chDerivation) -> Option<&ObliquePlane> {
        self.invalidate(PlanningStage::P4chReady);
        if let PlanningState::P4ch(_, p4ch) = &mut self.state {
            p4ch.derivation = derivation;
        }
        self.p4ch_plane()
    }

    fn invalidate(&mut self, keep: PlanningStage) {
        let before = self.stage();
        self.state = mem::take(&mut self.state).truncate(keep);
        if self.stage() != before {
            log::debug!("Planning invalidated from {before:?} to {:?}", self.stage());
        }
    }

    fn check_length(&self, length: f64) -> Result<(), PlanningError> {
        if length < self.config.min_line_length {
            return Err(PlanningError::LineTooShort {
                length,
                minimum: self.config.min_line_length,
            });
        }
        Ok(())
    }

    fn project(&self, line: &LineSegment3, plane: &ObliquePlane) -> Result<LineSegment2, PlanningError> {
        let tolerance = self.config.projection_tolerance;
        line.project_onto(plane, tolerance)
            .ok_or(PlanningError::EndpointOffPlane { distance_limit: tolerance })
    }

    fn p2ch_stage(&self) -> Result<&P2chStage, PlanningError> {
        self.state.p2ch().ok_or_else(|| self.not_ready(PlanningStage::P2chReady))
    }

    fn p4ch_stage(&self) -> Result<&P4chStage, PlanningError> {
        self.state.p4ch().ok_or_else(|| self.not_ready(PlanningStage::P4chReady))
    }

    fn sax_stage(&self) -> Result<&SaxStage, PlanningError> {
        self.state.sax().ok_or_else(|| self.not_ready(PlanningStage::SaxReady))
    }

    fn not_ready(&self, required: PlanningStage) -> PlanningError {
        PlanningError::StageNotReady {
            required,
            current: self.stage(),
        }
    }
}

/// Bring an angle into `[-180, 180]` without changing its direction.
fn wrap_degrees(degrees: f64) -> f64 {
    if (-180.0..=180.0).contains(&degrees) {
        degrees
    } else {
        (degrees + 180.0).rem_euclid(360.0) - 180.0
    }
}
