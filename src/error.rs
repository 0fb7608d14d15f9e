use thiserror::Error;

use crate::enums::PlanningStage;

#[derive(Debug, Error, PartialEq)]
pub enum PlanningError {
    #[error("{required:?} is required but planning is at {current:?}")]
    StageNotReady {
        required: PlanningStage,
        current: PlanningStage,
    },

    #[error("Line endpoint is more than {distance_limit} voxels from the plane it was drawn on")]
    EndpointOffPlane { distance_limit: f64 },

    #[error("Line is {length:.2} voxels long, at least {minimum} required")]
    LineTooShort { length: f64, minimum: f64 },

    #[error("Invalid volume shape: {0}")]
    InvalidShape(String),

    #[error("Image error: {0}")]
    Image(String),
}
