use thiserror::Error;

/// Fatal construction/initialization failures.
///
/// Every variant is detected before any stepping begins, so a run either
/// fully validates or never starts. The zero clamp applied to computed
/// densities is deliberately absent here: negative intermediate values are
/// floored as a matter of numerical policy, not reported.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid landscape dimensions {width}x{height}; both must be positive")]
    InvalidDimensions { width: usize, height: usize },

    #[error("land proportion {0} is outside [0, 1]")]
    InvalidProportion(f64),

    #[error("invalid simulation parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("grid shape {found_width}x{found_height} does not match landscape {expected_width}x{expected_height}")]
    ShapeMismatch {
        expected_width: usize,
        expected_height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("nonzero density on water cell ({x}, {y})")]
    DensityOnWaterCell { x: usize, y: usize },

    #[error("simulation already complete after {steps} steps")]
    AlreadyComplete { steps: u64 },

    #[error("unknown stepper '{name}'; registered steppers: {known}")]
    UnknownStepper { name: String, known: String },
}
