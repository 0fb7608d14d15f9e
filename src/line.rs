use crate::{plane::ObliquePlane, vector::Vec3};

/// A segment drawn on a 2D view, in that view's pixel coordinates.
///
/// For P4CH derivation the endpoint order matters: `start` is the valve and
/// `end` is the apex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment2 {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl LineSegment2 {
    pub fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end.0 - self.start.0).hypot(self.end.1 - self.start.1)
    }

    pub fn midpoint(&self) -> (f64, f64) {
        (
            (self.start.0 + self.end.0) / 2.0,
            (self.start.1 + self.end.1) / 2.0,
        )
    }

    /// Lift both endpoints into volume space through `plane`.
    pub fn lift(&self, plane: &ObliquePlane, offset: f64) -> LineSegment3 {
        LineSegment3 {
            start: plane.map_2d_to_3d(self.start.0, self.start.1, offset),
            end: plane.map_2d_to_3d(self.end.0, self.end.1, offset),
        }
    }
}

/// A segment in volume coordinates. This is how drawn lines are kept once
/// the gesture finishes, independent of the view they came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment3 {
    pub start: Vec3,
    pub end: Vec3,
}

impl LineSegment3 {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Both endpoints sit on the same axial slice.
    pub fn is_axial(&self) -> bool {
        (self.start.z - self.end.z).abs() < 0.5
    }

    /// Express the segment in `plane`'s pixel coordinates. `None` if either
    /// endpoint is farther than `tolerance` from the plane.
    pub fn project_onto(&self, plane: &ObliquePlane, tolerance: f64) -> Option<LineSegment2> {
        Some(LineSegment2 {
            start: plane.map_3d_to_2d(&self.start, tolerance)?,
            end: plane.map_3d_to_2d(&self.end, tolerance)?,
        })
    }
}
