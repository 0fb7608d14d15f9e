//! Construction of the three chained cardiac planes.
//!
//! Each deriver is a pure function of the gesture and the previous stage's
//! plane. Degenerate input (a zero-length line) is not rejected: it flows
//! through [`normalize`] as a zero vector and yields a degenerate plane.

use crate::{
    enums::RotationMode,
    line::LineSegment2,
    plane::ObliquePlane,
    vector::{PARALLEL_EPSILON, Vec3, normalize, reject},
};

/// `(z, y, x)` extent of the volume being planned on.
pub type VolumeShape = (usize, usize, usize);

const LONG_AXIS_SIZE_FACTOR: f64 = 1.5;
const SAX_SIZE_FACTOR: f64 = 1.2;

/// Pixel size of the P2CH and P4CH views: wide enough for any in-plane
/// direction, full volume depth tall.
fn long_axis_dimensions((z_dim, y_dim, x_dim): VolumeShape) -> (usize, usize) {
    let width = (x_dim.max(y_dim) as f64 * LONG_AXIS_SIZE_FACTOR).round() as usize;
    (width, z_dim)
}

/// Pseudo 2-chamber plane from a line drawn on the axial slice `axial_z`.
///
/// The plane contains the line (it is viewed from the side), keeps the
/// line horizontal and superior at the top, and is re-centered to the
/// volume's mid depth regardless of `axial_z`.
pub fn derive_p2ch(line: &LineSegment2, axial_z: f64, volume_shape: VolumeShape) -> ObliquePlane {
    let ((x1, y1), (x2, y2)) = (line.start, line.end);
    let direction = normalize(Vec3::new(x2 - x1, y2 - y1, 0.0));
    let normal = normalize(Vec3::new(-direction.y, direction.x, 0.0));
    let (mid_x, mid_y) = line.midpoint();
    let origin = Vec3::new(mid_x, mid_y, volume_shape.0 as f64 / 2.0);
    let (width, height) = long_axis_dimensions(volume_shape);

    log::debug!("P2CH from axial line at z={axial_z}: direction {direction:?}");
    ObliquePlane::new(
        origin,
        direction,
        Vec3::new(0.0, 0.0, -1.0),
        normal,
        width,
        height,
    )
}

/// Pseudo 4-chamber plane from a valve-to-apex line drawn on the P2CH view.
///
/// See [`derive_p4ch_with_rotation`] for the variant that also returns the
/// vectors needed to re-rotate cheaply.
pub fn derive_p4ch(
    line: &LineSegment2,
    p2ch: &ObliquePlane,
    volume_shape: VolumeShape,
    rotation_degrees: f64,
    rotation_mode: RotationMode,
) -> ObliquePlane {
    derive_p4ch_with_rotation(line, p2ch, volume_shape, rotation_degrees, rotation_mode).plane
}

/// A P4CH plane together with the angle-independent vectors it was built
/// from.
///
/// Changing only the rotation angle needs none of the line lifting or base
/// normal computation, so [`P4chDerivation::rotated`] is constant time.
#[derive(Clone, Debug, PartialEq)]
pub struct P4chDerivation {
    pub plane: ObliquePlane,
    /// Unit valve-to-apex direction; the axis the plane rotates around.
    pub rotation_axis: Vec3,
    /// Plane normal at 0°.
    pub base_normal: Vec3,
    /// Plane `u_axis` at 0°.
    pub base_u_axis: Vec3,
    /// Normal of the P2CH plane the line was drawn on, kept so the rotation
    /// mode can be switched without the drawn line.
    pub p2ch_normal: Vec3,
    pub rotation_degrees: f64,
    pub rotation_mode: RotationMode,
}

/// Valve/apex ordered line on P2CH to P4CH plane plus rotation cache.
pub fn derive_p4ch_with_rotation(
    line: &LineSegment2,
    p2ch: &ObliquePlane,
    volume_shape: VolumeShape,
    rotation_degrees: f64,
    rotation_mode: RotationMode,
) -> P4chDerivation {
    let lifted = line.lift(p2ch, 0.0);
    let (valve, apex) = (lifted.start, lifted.end);
    let long_axis = normalize(apex - valve);
    let base_normal = zero_degree_normal(&p2ch.normal, &long_axis, rotation_mode);
    let base_u_axis = normalize((-long_axis).cross(&base_normal));
    let (width, height) = long_axis_dimensions(volume_shape);

    let template = ObliquePlane::new(valve, base_u_axis, -long_axis, base_normal, width, height);
    let plane = orient_about_axis(&template, &long_axis, &base_normal, rotation_degrees);

    P4chDerivation {
        plane,
        rotation_axis: long_axis,
        base_normal,
        base_u_axis,
        p2ch_normal: p2ch.normal,
        rotation_degrees,
        rotation_mode,
    }
}

impl P4chDerivation {
    /// The same P4CH plane rotated to `degrees` around the long axis.
    pub fn rotated(&self, degrees: f64) -> Self {
        Self {
            plane: orient_about_axis(&self.plane, &self.rotation_axis, &self.base_normal, degrees),
            rotation_degrees: degrees,
            ..self.clone()
        }
    }

    /// Switch the zero-degree convention, keeping the current angle.
    pub fn with_mode(&self, mode: RotationMode) -> Self {
        let base_normal = zero_degree_normal(&self.p2ch_normal, &self.rotation_axis, mode);
        let base_u_axis = normalize((-self.rotation_axis).cross(&base_normal));
        Self {
            plane: orient_about_axis(&self.plane, &self.rotation_axis, &base_normal, self.rotation_degrees),
            base_normal,
            base_u_axis,
            rotation_mode: mode,
            ..self.clone()
        }
    }
}

fn zero_degree_normal(p2ch_normal: &Vec3, long_axis: &Vec3, mode: RotationMode) -> Vec3 {
    let perpendicular = || normalize(p2ch_normal.cross(long_axis));
    match mode {
        RotationMode::PerpP2ch => perpendicular(),
        RotationMode::LongAxis => {
            let projected = reject(p2ch_normal, long_axis);
            if projected.norm() < PARALLEL_EPSILON {
                log::warn!("P2CH normal is parallel to the long axis, using perpendicular base");
                perpendicular()
            } else {
                normalize(projected)
            }
        }
    }
}

/// Rotate the 0° frame by `degrees` around `axis` (Rodrigues, with the
/// parallel term dropped since `base_normal ⟂ axis`). Origin and size come
/// from `plane`.
///
/// A zero `axis` (coincident valve and apex) leaves both in-plane axes zero.
fn orient_about_axis(plane: &ObliquePlane, axis: &Vec3, base_normal: &Vec3, degrees: f64) -> ObliquePlane {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let normal = normalize(base_normal * cos + axis.cross(base_normal) * sin);
    let u_axis = normalize((-axis).cross(&normal));
    ObliquePlane {
        u_axis,
        v_axis: -axis,
        normal,
        ..plane.clone()
    }
}

/// Short-axis plane perpendicular to a long-axis line drawn on the P4CH view.
///
/// This is the zero-offset member of a family; scroll through it with
/// [`ObliquePlane::with_offset`] over [`sax_scroll_range`].
pub fn derive_sax(line: &LineSegment2, p4ch: &ObliquePlane, volume_shape: VolumeShape) -> ObliquePlane {
    let lifted = line.lift(p4ch, 0.0);
    let normal = normalize(lifted.end - lifted.start);

    let mut u_axis = reject(&p4ch.u_axis, &normal);
    if u_axis.norm() < PARALLEL_EPSILON {
        log::warn!("SAX line parallel to P4CH u axis, projecting v axis instead");
        u_axis = reject(&p4ch.v_axis, &normal);
    }
    let u_axis = normalize(u_axis);
    let v_axis = normalize(normal.cross(&u_axis));

    let (_, y_dim, x_dim) = volume_shape;
    let size = (x_dim.max(y_dim) as f64 * SAX_SIZE_FACTOR).round() as usize;

    ObliquePlane::new(
        (lifted.start + lifted.end) / 2.0,
        u_axis,
        v_axis,
        normal,
        size,
        size,
    )
}

/// Offsets spanning the SAX family: half the largest volume dimension each
/// way, floored, so an odd dimension reaches one voxel further below zero.
pub fn sax_scroll_range((z_dim, y_dim, x_dim): VolumeShape) -> (f64, f64) {
    let max_dim = z_dim.max(y_dim).max(x_dim);
    (-(max_dim.div_ceil(2) as f64), (max_dim / 2) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const SHAPE: VolumeShape = (100, 256, 256);

    fn p2ch() -> ObliquePlane {
        derive_p2ch(&LineSegment2::new((50.0, 120.0), (180.0, 120.0)), 50.0, SHAPE)
    }

    fn oblique_p2ch() -> ObliquePlane {
        derive_p2ch(&LineSegment2::new((40.0, 200.0), (190.0, 90.0)), 30.0, SHAPE)
    }

    fn valve_apex() -> LineSegment2 {
        LineSegment2::new((170.0, 25.0), (230.0, 80.0))
    }

    fn assert_orthonormal(plane: &ObliquePlane) {
        assert_abs_diff_eq!(plane.u_axis.norm(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(plane.v_axis.norm(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(plane.normal.norm(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(plane.u_axis.dot(&plane.v_axis), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(plane.u_axis.dot(&plane.normal), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(plane.v_axis.dot(&plane.normal), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn p2ch_contains_the_axial_line() {
        let plane = p2ch();
        assert_eq!((plane.width, plane.height), (384, 100));
        assert_relative_eq!(plane.u_axis, Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(plane.v_axis, Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(plane.normal, Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(plane.origin, Vec3::new(115.0, 120.0, 50.0));
        assert_relative_eq!(plane.normal, plane.u_axis.cross(&plane.v_axis));

        // both endpoints, at the drawn depth, lie on the plane
        for (x, y) in [(50.0, 120.0), (180.0, 120.0)] {
            let p = Vec3::new(x, y, 50.0);
            assert!(plane.map_3d_to_2d(&p, 1e-9).is_some());
        }
    }

    #[test]
    fn p2ch_is_recentered_in_depth() {
        let line = LineSegment2::new((10.0, 10.0), (60.0, 90.0));
        let shallow = derive_p2ch(&line, 3.0, (41, 64, 80));
        let deep = derive_p2ch(&line, 39.0, (41, 64, 80));
        assert_eq!(shallow, deep);
        assert_abs_diff_eq!(shallow.origin.z, 20.5);
        assert_eq!((shallow.width, shallow.height), (120, 41));
        assert_orthonormal(&shallow);
    }

    #[test]
    fn zero_length_p2ch_line_degrades_without_nan() {
        let plane = derive_p2ch(&LineSegment2::new((30.0, 30.0), (30.0, 30.0)), 5.0, SHAPE);
        assert_eq!(plane.u_axis, Vec3::zeros());
        assert_eq!(plane.normal, Vec3::zeros());
        assert!(plane.origin.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn zero_length_p4ch_line_degrades_without_nan() {
        let p2ch = p2ch();
        let point = LineSegment2::new((190.0, 10.0), (190.0, 10.0));
        for mode in [RotationMode::LongAxis, RotationMode::PerpP2ch] {
            let d = derive_p4ch_with_rotation(&point, &p2ch, SHAPE, 45.0, mode);
            assert_eq!(d.rotation_axis, Vec3::zeros());
            assert_eq!(d.plane.u_axis, Vec3::zeros());
            assert_eq!(d.plane.v_axis, Vec3::zeros());
            assert!(d.plane.normal.iter().all(|c| c.is_finite()));
            assert_relative_eq!(d.plane.origin, p2ch.map_2d_to_3d(190.0, 10.0, 0.0));

            let rotated = d.rotated(-120.0).plane;
            assert_eq!(rotated.u_axis, Vec3::zeros());
            assert_eq!(rotated.v_axis, Vec3::zeros());
        }
    }

    #[test]
    fn p4ch_pivots_through_the_valve() {
        let p2ch = p2ch();
        let line = LineSegment2::new((190.0, 10.0), (190.0, 90.0));
        let plane = derive_p4ch(&line, &p2ch, SHAPE, 0.0, RotationMode::LongAxis);
        assert_relative_eq!(plane.origin, p2ch.map_2d_to_3d(190.0, 10.0, 0.0));
        assert_relative_eq!(plane.origin, Vec3::new(113.0, 120.0, 90.0));
        // the line is vertical on P2CH, so the long axis points down (-z)
        assert_relative_eq!(plane.v_axis, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!((plane.width, plane.height), (384, 100));
        assert_orthonormal(&plane);
    }

    #[test]
    fn p4ch_long_axis_mode_starts_at_base_normal() {
        let p2ch = oblique_p2ch();
        let d = derive_p4ch_with_rotation(&valve_apex(), &p2ch, SHAPE, 0.0, RotationMode::LongAxis);
        assert_relative_eq!(d.plane.normal, d.base_normal, epsilon = 1e-12);
        assert_relative_eq!(d.plane.u_axis, d.base_u_axis, epsilon = 1e-12);
        // the long axis lies in P2CH, so 0° keeps the P2CH viewing direction
        assert_relative_eq!(d.base_normal, p2ch.normal, epsilon = 1e-9);
    }

    #[test]
    fn p4ch_perpendicular_mode_is_orthogonal_to_p2ch() {
        let p2ch = oblique_p2ch();
        let plane = derive_p4ch(&valve_apex(), &p2ch, SHAPE, 0.0, RotationMode::PerpP2ch);
        assert_abs_diff_eq!(plane.normal.dot(&p2ch.normal), 0.0, epsilon = 1e-9);
        assert_orthonormal(&plane);
    }

    #[test]
    fn p4ch_rotation_is_periodic() {
        let p2ch = oblique_p2ch();
        for mode in [RotationMode::LongAxis, RotationMode::PerpP2ch] {
            let zero = derive_p4ch(&valve_apex(), &p2ch, SHAPE, 0.0, mode);
            let full = derive_p4ch(&valve_apex(), &p2ch, SHAPE, 360.0, mode);
            assert_relative_eq!(zero.normal, full.normal, epsilon = 1e-9);
            assert_relative_eq!(zero.u_axis, full.u_axis, epsilon = 1e-9);

            let half = derive_p4ch(&valve_apex(), &p2ch, SHAPE, 180.0, mode);
            assert_relative_eq!(zero.normal, -half.normal, epsilon = 1e-9);
        }
    }

    #[test]
    fn p4ch_stays_orthonormal_at_every_angle() {
        let p2ch = oblique_p2ch();
        for mode in [RotationMode::LongAxis, RotationMode::PerpP2ch] {
            for degrees in (-180..=180).step_by(15) {
                let plane = derive_p4ch(&valve_apex(), &p2ch, SHAPE, degrees as f64, mode);
                assert_orthonormal(&plane);
                assert_relative_eq!(plane.normal, plane.u_axis.cross(&plane.v_axis), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn cached_rotation_matches_full_derivation() {
        let p2ch = oblique_p2ch();
        let cached = derive_p4ch_with_rotation(&valve_apex(), &p2ch, SHAPE, 0.0, RotationMode::LongAxis);
        for degrees in [-135.0, -30.0, 45.0, 90.0, 170.0] {
            let fast = cached.rotated(degrees);
            let full = derive_p4ch(&valve_apex(), &p2ch, SHAPE, degrees, RotationMode::LongAxis);
            assert_relative_eq!(fast.plane.normal, full.normal, epsilon = 1e-12);
            assert_relative_eq!(fast.plane.u_axis, full.u_axis, epsilon = 1e-12);
            assert_relative_eq!(fast.plane.origin, full.origin);
            assert_eq!(fast.rotation_degrees, degrees);
        }
    }

    #[test]
    fn switching_mode_matches_full_derivation() {
        let p2ch = oblique_p2ch();
        let cached = derive_p4ch_with_rotation(&valve_apex(), &p2ch, SHAPE, 40.0, RotationMode::LongAxis);
        let switched = cached.with_mode(RotationMode::PerpP2ch);
        let full = derive_p4ch(&valve_apex(), &p2ch, SHAPE, 40.0, RotationMode::PerpP2ch);
        assert_relative_eq!(switched.plane.normal, full.normal, epsilon = 1e-12);
        assert_relative_eq!(switched.plane.u_axis, full.u_axis, epsilon = 1e-12);
        assert_eq!(switched.rotation_mode, RotationMode::PerpP2ch);
    }

    #[test]
    fn long_axis_mode_falls_back_when_normal_is_nearly_parallel() {
        // the drawn axis is within 1e-8 rad of the plane normal
        let p2ch = ObliquePlane::new(
            Vec3::new(50.0, 50.0, 50.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
            100,
            100,
        );
        let line = LineSegment2::new((50.0, 20.0), (50.0 + 6e-7, 80.0));

        let fallback = derive_p4ch(&line, &p2ch, SHAPE, 0.0, RotationMode::LongAxis);
        let perpendicular = derive_p4ch(&line, &p2ch, SHAPE, 0.0, RotationMode::PerpP2ch);
        assert_relative_eq!(fallback.normal, perpendicular.normal);
        assert_relative_eq!(fallback.normal, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn sax_is_perpendicular_to_the_drawn_axis() {
        let p2ch = oblique_p2ch();
        let p4ch = derive_p4ch(&valve_apex(), &p2ch, SHAPE, 25.0, RotationMode::LongAxis);
        let line = LineSegment2::new((180.0, 20.0), (210.0, 85.0));
        let sax = derive_sax(&line, &p4ch, SHAPE);

        let lifted = line.lift(&p4ch, 0.0);
        assert_relative_eq!(sax.normal, normalize(lifted.end - lifted.start), epsilon = 1e-12);
        assert_relative_eq!(sax.origin, (lifted.start + lifted.end) / 2.0, epsilon = 1e-9);
        assert_eq!((sax.width, sax.height), (307, 307));
        assert_orthonormal(&sax);
        assert_relative_eq!(sax.normal, sax.u_axis.cross(&sax.v_axis), epsilon = 1e-9);
    }

    #[test]
    fn sax_falls_back_to_v_axis_when_line_runs_along_u() {
        let p2ch = p2ch();
        let p4ch = derive_p4ch(&valve_apex(), &p2ch, SHAPE, 0.0, RotationMode::LongAxis);
        let horizontal = LineSegment2::new((100.0, 40.0), (160.0, 40.0));
        let sax = derive_sax(&horizontal, &p4ch, SHAPE);
        assert_relative_eq!(sax.normal, p4ch.u_axis, epsilon = 1e-9);
        assert_relative_eq!(sax.u_axis, p4ch.v_axis, epsilon = 1e-9);
        assert_orthonormal(&sax);
    }

    #[test]
    fn zero_length_sax_line_degrades_without_nan() {
        let p4ch = derive_p4ch(&valve_apex(), &oblique_p2ch(), SHAPE, 25.0, RotationMode::LongAxis);
        let point = LineSegment2::new((200.0, 50.0), (200.0, 50.0));
        let sax = derive_sax(&point, &p4ch, SHAPE);
        assert_eq!(sax.normal, Vec3::zeros());
        assert_eq!(sax.v_axis, Vec3::zeros());
        assert!(sax.u_axis.iter().all(|c| c.is_finite()));
        assert_relative_eq!(sax.origin, p4ch.map_2d_to_3d(200.0, 50.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn scroll_range_spans_half_the_largest_dimension() {
        assert_eq!(sax_scroll_range(SHAPE), (-128.0, 128.0));
        assert_eq!(sax_scroll_range((101, 33, 7)), (-51.0, 50.0));
    }
}
