//! Window specifications: a family name plus an optional shape parameter.

use crate::error::OptionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Window family used for filter design and spectral tapering.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum WindowSpec {
    /// Rectangular window.
    #[serde(alias = "rectangular")]
    Boxcar,

    /// Hann (raised cosine).
    Hann,

    /// Hamming.
    Hamming,

    /// Blackman.
    Blackman,

    /// Kaiser-Bessel with shape parameter `beta`.
    Kaiser { beta: f64 },
}

impl WindowSpec {
    /// Build a window from a family name and optional shape parameter,
    /// e.g. `("kaiser", Some(5.0))`.
    pub fn from_name(name: &str, param: Option<f64>) -> Result<Self, OptionError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "boxcar" | "rectangular" | "rect" | "ones" => Ok(Self::Boxcar),
            "hann" | "hanning" => Ok(Self::Hann),
            "hamming" | "hamm" => Ok(Self::Hamming),
            "blackman" | "black" => Ok(Self::Blackman),
            "kaiser" | "ksr" => param
                .map(|beta| Self::Kaiser { beta })
                .ok_or_else(|| OptionError::MissingWindowParameter(name.to_string())),
            _ => Err(OptionError::UnknownWindow(name.to_string())),
        }
    }

    /// Family name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Boxcar => "boxcar",
            Self::Hann => "hann",
            Self::Hamming => "hamming",
            Self::Blackman => "blackman",
            Self::Kaiser { .. } => "kaiser",
        }
    }

    /// Shape parameter, if the family has one.
    pub fn param(&self) -> Option<f64> {
        match self {
            Self::Kaiser { beta } => Some(*beta),
            _ => None,
        }
    }
}

/// Parses `"hann"` or `"kaiser,5.0"` / `"kaiser:5.0"`.
impl FromStr for WindowSpec {
    type Err = OptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, |c: char| c == ',' || c == ':');
        let name = parts.next().unwrap_or_default();
        let param = match parts.next() {
            Some(p) => Some(
                p.trim()
                    .parse::<f64>()
                    .map_err(|_| OptionError::UnknownWindow(s.to_string()))?,
            ),
            None => None,
        };
        Self::from_name(name, param)
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param() {
            Some(p) => write!(f, "{},{}", self.name(), p),
            None => f.write_str(self.name()),
        }
    }
}
