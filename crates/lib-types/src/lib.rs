//! # lib-types
//!
//! Shared option and parameter types for the resampling/convolution engine.
//!
//! This crate provides the vocabulary used by every public operation:
//! - Convolution mode, 2-D boundary policy and method selection
//! - Window specifications for filter design and spectral tapering
//! - Rational resampling factors and their length rules
//! - The aggregate per-call [`SignalOptions`]

pub mod error;
pub mod factors;
pub mod options;
pub mod window;

pub use error::OptionError;
pub use factors::{gcd, ResampleFactors};
pub use options::{Boundary, Method, Mode, SignalOptions};
pub use window::WindowSpec;
