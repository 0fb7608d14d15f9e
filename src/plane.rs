use crate::vector::Vec3;

/// Default distance (in voxels) within which a point counts as lying on a
/// plane for [`ObliquePlane::map_3d_to_2d`].
pub const DEFAULT_PROJECTION_TOLERANCE: f64 = 5.0;

/// An oriented, bounded 2D pixel frame embedded in volume space.
///
/// Pixel `(width / 2, height / 2)` sits on `origin`. Moving one pixel right
/// steps along `u_axis`, one pixel down steps along `v_axis`. The axes are
/// expected to be orthonormal with `normal = u_axis × v_axis`; the derivers
/// guarantee this and nothing re-orthogonalizes them afterwards.
///
/// Planes are values: every transformation returns a new one.
#[derive(Clone, Debug, PartialEq)]
pub struct ObliquePlane {
    pub origin: Vec3,
    pub u_axis: Vec3,
    pub v_axis: Vec3,
    pub normal: Vec3,
    pub width: usize,
    pub height: usize,
}

impl ObliquePlane {
    pub fn new(
        origin: Vec3,
        u_axis: Vec3,
        v_axis: Vec3,
        normal: Vec3,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            origin,
            u_axis,
            v_axis,
            normal,
            width,
            height,
        }
    }

    /// Half the pixel extent, i.e. the pixel coordinate of `origin`.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Volume position of pixel `(x2d, y2d)` on the parallel plane shifted by
    /// `offset` along the normal.
    pub fn map_2d_to_3d(&self, x2d: f64, y2d: f64, offset: f64) -> Vec3 {
        let (cx, cy) = self.center();
        self.point_at(x2d - cx, y2d - cy, offset)
    }

    /// Volume position for plane-local coordinates centered on the origin.
    #[inline]
    pub(crate) fn point_at(&self, u: f64, v: f64, offset: f64) -> Vec3 {
        self.origin + self.u_axis * u + self.v_axis * v + self.normal * offset
    }

    /// Pixel coordinates of `point`, or `None` when it is farther than
    /// `tolerance` from the plane.
    pub fn map_3d_to_2d(&self, point: &Vec3, tolerance: f64) -> Option<(f64, f64)> {
        let diff = point - self.origin;
        if diff.dot(&self.normal).abs() > tolerance {
            return None;
        }
        let (cx, cy) = self.center();
        Some((diff.dot(&self.u_axis) + cx, diff.dot(&self.v_axis) + cy))
    }

    /// The parallel plane `distance` voxels along the normal.
    pub fn with_offset(&self, distance: f64) -> Self {
        Self {
            origin: self.origin + self.normal * distance,
            ..self.clone()
        }
    }
}
