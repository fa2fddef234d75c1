use thiserror::Error;

/// Main error type for the OptBench system
#[derive(Error, Debug)]
pub enum ObError {
    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Test function error: {0}")]
    Function(#[from] FunctionError),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Test function evaluation errors
#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("Missing parameter: {name}")]
    MissingParameter { name: String },

    #[error("Parameter {name} is not numeric: {value}")]
    NonNumericParameter { name: String, value: String },

    #[error("Unsupported dimension {dim} for {problem}")]
    UnsupportedDimension { problem: String, dim: usize },

    #[error("Invalid bounds: {message}")]
    InvalidBounds { message: String },

    #[error("Problem {problem} carries its own noise; set noise on the runner instead")]
    NoisyProblem { problem: String },

    #[error("Surrogate failure: {message}")]
    SurrogateFailed { message: String },

    #[error("Outcome {outcome} missing from surrogate prediction")]
    MissingOutcome { outcome: String },
}

/// Runner-related errors
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Noise std has {actual} entries but there are {expected} outcomes")]
    NoiseLengthMismatch { expected: usize, actual: usize },

    #[error("Noise std keys {keys:?} do not match outcome names {outcome_names:?}")]
    NoiseKeyMismatch {
        keys: Vec<String>,
        outcome_names: Vec<String>,
    },

    #[error("Invalid noise std for {outcome}: {value}")]
    InvalidNoiseStd { outcome: String, value: f64 },

    #[error("Test function produced {actual} outcomes, expected {expected}")]
    OutcomeCountMismatch { expected: usize, actual: usize },

    #[error("Duplicate outcome name: {name}")]
    DuplicateOutcome { name: String },

    #[error("No outcome names given")]
    NoOutcomes,

    #[error("Trial {index} has no arms")]
    EmptyTrial { index: usize },
}

/// Result type alias for OptBench operations
pub type ObResult<T> = Result<T, ObError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::ObError::Validation(format!($($arg)*))
    };
}

/// Macro for creating unsupported-operation errors
#[macro_export]
macro_rules! unsupported_error {
    ($($arg:tt)*) => {
        $crate::ObError::Unsupported(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::ObError::Config(format!($($arg)*))
    };
}
