//! Call options shared by every public engine operation.
//!
//! Each operation accepts a [`SignalOptions`] and reads only the fields that
//! apply to it. Option values parse from their lowercase names so they can be
//! taken from configuration files as well as code.

use crate::error::OptionError;
use crate::window::WindowSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output length and alignment for convolution and correlation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Every point of overlap: `N + K - 1` samples.
    #[default]
    Full,
    /// Only points where the shorter operand lies entirely inside the longer one.
    Valid,
    /// `max(N, K)` samples centered on the full result.
    Same,
}

impl Mode {
    /// Output length of a 1-D operation with operands of length `n` and `k`.
    pub fn output_len(self, n: usize, k: usize) -> usize {
        let (short, long) = if n < k { (n, k) } else { (k, n) };
        match self {
            Mode::Full => n + k - 1,
            Mode::Valid => long - short + 1,
            Mode::Same => long,
        }
    }

    /// Offset of this mode's first sample inside the full result.
    pub fn start_offset(self, n: usize, k: usize) -> usize {
        let short = n.min(k);
        match self {
            Mode::Full => 0,
            Mode::Valid => short - 1,
            Mode::Same => (short - 1) / 2,
        }
    }

    /// Lowercase name as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Full => "full",
            Mode::Valid => "valid",
            Mode::Same => "same",
        }
    }
}

impl FromStr for Mode {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Mode::Full),
            "valid" => Ok(Mode::Valid),
            "same" => Ok(Mode::Same),
            _ => Err(OptionError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How 2-D direct filtering reads samples beyond the signal's edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// A constant (`SignalOptions::fill_value`) outside the signal.
    #[default]
    Fill,
    /// Indices wrap modulo the signal extent.
    Wrap,
    /// Indices mirror at the edge, repeating the edge sample.
    Symm,
}

impl Boundary {
    /// Lowercase name as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Boundary::Fill => "fill",
            Boundary::Wrap => "wrap",
            Boundary::Symm => "symm",
        }
    }
}

impl FromStr for Boundary {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fill" => Ok(Boundary::Fill),
            "wrap" | "circular" => Ok(Boundary::Wrap),
            "symm" | "symmetric" => Ok(Boundary::Symm),
            _ => Err(OptionError::UnknownBoundary(s.to_string())),
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convolution algorithm selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Sliding-window accumulation.
    Direct,
    /// Zero-padded transform, multiply, inverse transform.
    Fft,
    /// Let the cost model decide per call shape.
    #[default]
    Auto,
}

impl Method {
    /// Lowercase name as accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Direct => "direct",
            Method::Fft => "fft",
            Method::Auto => "auto",
        }
    }
}

impl FromStr for Method {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Method::Direct),
            "fft" => Ok(Method::Fft),
            "auto" => Ok(Method::Auto),
            _ => Err(OptionError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options recognised by the public operations.
///
/// Fields that do not apply to an operation are ignored by it, e.g.
/// `boundary` only affects 2-D convolution and `zero_phase` only affects
/// decimation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalOptions {
    /// Output length/alignment for convolution and correlation.
    #[serde(default)]
    pub mode: Mode,

    /// Convolution algorithm.
    #[serde(default)]
    pub method: Method,

    /// Edge policy for 2-D direct convolution.
    #[serde(default)]
    pub boundary: Boundary,

    /// Constant used by [`Boundary::Fill`].
    #[serde(default)]
    pub fill_value: f64,

    /// Window used by filter design (`resample_poly`) or spectral tapering (`resample`).
    #[serde(default)]
    pub window: Option<WindowSpec>,

    /// Forward-backward filtering in `decimate`.
    #[serde(default = "default_zero_phase")]
    pub zero_phase: bool,

    /// Use the shape-specialized, cached fused resampling kernel.
    #[serde(default)]
    pub use_specialized_kernel: bool,
}

fn default_zero_phase() -> bool {
    true
}

impl Default for SignalOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            method: Method::default(),
            boundary: Boundary::default(),
            fill_value: 0.0,
            window: None,
            zero_phase: default_zero_phase(),
            use_specialized_kernel: false,
        }
    }
}

impl SignalOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = fill_value;
        self
    }

    pub fn with_window(mut self, window: WindowSpec) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_zero_phase(mut self, zero_phase: bool) -> Self {
        self.zero_phase = zero_phase;
        self
    }

    pub fn with_specialized_kernel(mut self, specialized: bool) -> Self {
        self.use_specialized_kernel = specialized;
        self
    }
}
