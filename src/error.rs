use thiserror::Error;

/// Main error type for mleval
#[derive(Error, Debug)]
pub enum EvalError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed label record (non-binary token, bad header, bad probability)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Record width differs from the established label-universe width
    #[error("Shape mismatch in {origin} line {line}: expected {expected} labels, found {found}")]
    ShapeMismatch {
        origin: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Record counts (or label counts) of two aligned collections differ
    #[error("Length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Missing or degenerate input (no instances, no labels)
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A metric whose denominator is zero over the whole evaluation set
    #[error("Division by zero computing {0}")]
    DivisionByZero(&'static str),

    /// JSON report serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenient Result type using EvalError
pub type Result<T> = std::result::Result<T, EvalError>;
