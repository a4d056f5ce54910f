use std::fmt;

/// Result type for metis operations
pub type Result<T> = std::result::Result<T, MetisError>;

/// Main error type for the metis library
#[derive(Debug, Clone)]
pub enum MetisError {
    /// Invalid dimensions for operations
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// IO errors (file operations)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),

    /// A persisted experiment log whose iteration index disagrees with the
    /// physical row position
    CorruptLog {
        row: usize,
        detail: String,
    },
}

impl fmt::Display for MetisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetisError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            MetisError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            MetisError::IoError(msg) => write!(f, "IO error: {}", msg),
            MetisError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            MetisError::CorruptLog { row, detail } => {
                write!(f, "Corrupted logfile at row {}: {}", row, detail)
            }
        }
    }
}

impl std::error::Error for MetisError {}

// Conversion from std::io::Error
impl From<std::io::Error> for MetisError {
    fn from(err: std::io::Error) -> Self {
        MetisError::IoError(err.to_string())
    }
}

// Conversion from bincode::Error
impl From<bincode::Error> for MetisError {
    fn from(err: bincode::Error) -> Self {
        MetisError::SerializationError(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for MetisError {
    fn from(err: serde_json::Error) -> Self {
        MetisError::SerializationError(err.to_string())
    }
}

// Helper functions for common error patterns
impl MetisError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        MetisError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        MetisError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
