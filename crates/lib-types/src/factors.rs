//! Rational resampling factors.

use crate::error::OptionError;
use serde::{Deserialize, Serialize};

/// Upsample factor `up` (L) and downsample factor `down` (M).
///
/// Both are strictly positive; they need not be coprime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResampleFactors {
    pub up: usize,
    pub down: usize,
}

impl ResampleFactors {
    /// Validate and construct.
    pub fn new(up: usize, down: usize) -> Result<Self, OptionError> {
        if up == 0 {
            return Err(OptionError::NonPositiveFactor { name: "up", value: up });
        }
        if down == 0 {
            return Err(OptionError::NonPositiveFactor { name: "down", value: down });
        }
        Ok(Self { up, down })
    }

    /// Factors divided by their greatest common divisor.
    pub fn reduced(self) -> Self {
        let g = gcd(self.up, self.down);
        Self {
            up: self.up / g,
            down: self.down / g,
        }
    }

    /// True when no rate change takes place.
    #[inline]
    pub fn is_identity(self) -> bool {
        self.up == self.down
    }

    /// Length of a rational resampling of `n` samples: `ceil(n * up / down)`.
    #[inline]
    pub fn resampled_len(self, n: usize) -> usize {
        (n * self.up).div_ceil(self.down)
    }

    /// Length of the fused upsample/filter/downsample output for an input of
    /// `n` samples and a filter of `taps` taps.
    ///
    /// Counts every M-th sample of the full convolution of the zero-stuffed
    /// input (`(n-1)*up + 1` samples) with the filter.
    #[inline]
    pub fn upfirdn_len(self, n: usize, taps: usize) -> usize {
        ((n - 1) * self.up + taps - 1) / self.down + 1
    }
}

/// Greatest common divisor.
pub fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
