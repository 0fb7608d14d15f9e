use crate::vector::Vec3;

/// Through-plane tolerance used when mapping a volume point onto an
/// orthogonal view.
const ORTHOGONAL_TOLERANCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    /// Volume axis (in `(z, y, x)` array order) that this orientation slices.
    pub fn axis(self) -> usize {
        match self {
            Orientation::Axial => 0,
            Orientation::Coronal => 1,
            Orientation::Sagittal => 2,
        }
    }

    /// Convert a 2D position on the orthogonal view at `index` into volume
    /// coordinates `(x, y, z)`.
    pub fn to_volume(self, index: usize, x2d: f64, y2d: f64) -> Vec3 {
        let index = index as f64;
        match self {
            Orientation::Axial => Vec3::new(x2d, y2d, index),
            Orientation::Coronal => Vec3::new(x2d, index, y2d),
            Orientation::Sagittal => Vec3::new(index, x2d, y2d),
        }
    }

    /// Inverse of [`Orientation::to_volume`]. Returns `None` when the point
    /// does not lie on the slice at `index`.
    pub fn from_volume(self, index: usize, point: &Vec3) -> Option<(f64, f64)> {
        let index = index as f64;
        let (through, x2d, y2d) = match self {
            Orientation::Axial => (point.z, point.x, point.y),
            Orientation::Coronal => (point.y, point.x, point.z),
            Orientation::Sagittal => (point.x, point.y, point.z),
        };
        ((through - index).abs() <= ORTHOGONAL_TOLERANCE).then_some((x2d, y2d))
    }
}

/// How the P4CH plane's zero-degree orientation is chosen before rotating
/// around the long axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RotationMode {
    /// 0° keeps the P2CH viewing direction.
    #[default]
    LongAxis,
    /// 0° is perpendicular to the P2CH plane.
    PerpP2ch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum PlanningStage {
    #[default]
    Empty,
    P2chReady,
    P4chReady,
    SaxReady,
}
