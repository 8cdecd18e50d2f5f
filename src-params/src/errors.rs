// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while constructing, mutating or decoding a parameter record
///
/// Every variant is reported at the boundary where the record is built or
/// changed; a failed operation never leaves a half-applied record behind.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Band vector '{field}' has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown selector value {value} for '{field}'")]
    UnknownSelector { field: &'static str, value: i64 },

    #[error("Failed to decode parameter record: {0}")]
    DecodeError(String),

    #[error("Unknown parameter: {0}")]
    UnknownField(String),

    #[error("Parameter '{field}' expects {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Value {value} for '{field}' is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ParamError {
    fn from(err: serde_json::Error) -> Self {
        ParamError::DecodeError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for ParamError {
    fn from(err: serde_yaml::Error) -> Self {
        ParamError::DecodeError(format!("YAML error: {}", err))
    }
}

pub type ParamResult<T> = Result<T, ParamError>;
