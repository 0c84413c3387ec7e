//! Error types for DSP operations.

use lib_types::OptionError;
use thiserror::Error;

/// Errors that can occur during DSP operations.
///
/// Every validation error is raised before any kernel runs, so a failed call
/// never leaves partial output behind.
#[derive(Debug, Error)]
pub enum DspError {
    /// Zero-length operand, mismatched dimensionality or incompatible shapes.
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    /// Parameter outside its accepted domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Option combination with no implemented algorithm.
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// Transform or kernel execution failed. Not retried.
    #[error("Execution failed: {0}")]
    Execution(String),

    /// Engine configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DspError {
    /// Create an invalid shape error.
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape(reason.into())
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported configuration error.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration(reason.into())
    }

    /// True for errors detected by up-front validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidShape(_) | Self::InvalidParameter { .. } | Self::UnsupportedConfiguration(_)
        )
    }
}

impl From<OptionError> for DspError {
    fn from(err: OptionError) -> Self {
        Self::InvalidParameter {
            name: err.parameter().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Non-fatal conditions, reported through `tracing` rather than returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DspWarning {
    /// Transform length exceeds the configured safe threshold.
    #[error("Transform length {len} exceeds the safe threshold {limit}")]
    LargeTransform { len: usize, limit: usize },
}

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;

/// Fail with [`DspError::InvalidShape`] when an operand is empty.
pub(crate) fn ensure_non_empty(len: usize, what: &str) -> DspResult<()> {
    if len == 0 {
        return Err(DspError::invalid_shape(format!("{what} must not be empty")));
    }
    Ok(())
}
