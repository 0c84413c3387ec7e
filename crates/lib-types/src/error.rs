//! Error types for option parsing and parameter validation.

use thiserror::Error;

/// Errors raised while parsing or validating engine options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionError {
    /// Unrecognised convolution mode string.
    #[error("Unknown mode '{0}', expected one of: full, valid, same")]
    UnknownMode(String),

    /// Unrecognised 2-D boundary policy string.
    #[error("Unknown boundary '{0}', expected one of: fill, wrap, symm")]
    UnknownBoundary(String),

    /// Unrecognised convolution method string.
    #[error("Unknown method '{0}', expected one of: direct, fft, auto")]
    UnknownMethod(String),

    /// Unrecognised window name.
    #[error("Unknown window '{0}'")]
    UnknownWindow(String),

    /// Window family needs a shape parameter that was not supplied.
    #[error("Window '{0}' requires a shape parameter")]
    MissingWindowParameter(String),

    /// A factor that must be strictly positive was zero.
    #[error("Factor '{name}' must be positive, got {value}")]
    NonPositiveFactor { name: &'static str, value: usize },
}

impl OptionError {
    /// Name of the offending parameter.
    pub fn parameter(&self) -> &'static str {
        match self {
            Self::UnknownMode(_) => "mode",
            Self::UnknownBoundary(_) => "boundary",
            Self::UnknownMethod(_) => "method",
            Self::UnknownWindow(_) | Self::MissingWindowParameter(_) => "window",
            Self::NonPositiveFactor { name, .. } => name,
        }
    }
}
