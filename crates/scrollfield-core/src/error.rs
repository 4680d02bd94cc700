use thiserror::Error;

/// Errors raised while setting up a particle field or scene.
///
/// Per-frame work never returns these; only construction does.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("particle count must be greater than zero")]
    ZeroParticles,

    #[error("at least two shape states are required, got {0}")]
    TooFewShapeStates(usize),

    #[error("shape generator '{name}' produced {got} positions, expected {expected}")]
    GeneratorCountMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("palette has {got} colors but there are {expected} shape states")]
    PaletteMismatch { expected: usize, got: usize },

    #[error("smoothing factor must be in (0, 1], got {0}")]
    InvalidSmoothing(f32),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f32 },
}

/// Error returned when a scroll trigger rule string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerParseError {
    #[error("trigger rule '{0}' must name an element edge and a viewport edge")]
    MissingEdge(String),

    #[error("unknown edge '{0}'")]
    UnknownEdge(String),
}
