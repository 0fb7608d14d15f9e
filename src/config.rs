use crate::{enums::RotationMode, plane::DEFAULT_PROJECTION_TOLERANCE};

/// Caller-side policy for [`CardiacPlanner`](crate::planner::CardiacPlanner).
///
/// The derivers accept any input; these settings decide which gestures the
/// planner forwards to them.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannerConfig {
    /// Maximum distance from a plane for a drawn endpoint to count as on it.
    pub projection_tolerance: f64,
    /// Shortest line, in voxels, accepted as a planning gesture.
    pub min_line_length: f64,
    /// Zero-degree convention for newly derived P4CH planes.
    pub rotation_mode: RotationMode,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            projection_tolerance: DEFAULT_PROJECTION_TOLERANCE,
            min_line_length: 5.0,
            rotation_mode: RotationMode::default(),
        }
    }
}
