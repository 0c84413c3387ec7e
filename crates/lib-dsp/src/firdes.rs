//! Windowed-sinc FIR filter design.
//!
//! Anti-aliasing filters for polyphase resampling and decimation are
//! designed here. The [`FilterDesigner`] trait lets callers substitute their
//! own design routine.

use crate::error::{DspError, DspResult};
use crate::window::generate_window;
use lib_types::WindowSpec;
use std::f64::consts::PI;

/// Lowpass FIR design algorithm.
pub trait FilterDesigner: Send + Sync {
    /// Design a lowpass filter of `num_taps` taps with the given cutoff,
    /// relative to the Nyquist frequency (`0 < cutoff < 1`).
    fn design_lowpass(&self, num_taps: usize, cutoff: f64, window: WindowSpec) -> DspResult<Vec<f64>>;
}

/// Window method: truncated ideal sinc response shaped by a window and
/// normalized to unit DC gain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowedSinc;

impl FilterDesigner for WindowedSinc {
    fn design_lowpass(&self, num_taps: usize, cutoff: f64, window: WindowSpec) -> DspResult<Vec<f64>> {
        firwin(num_taps, cutoff, window)
    }
}

/// Normalized sinc: `sin(pi x) / (pi x)`.
#[inline]
pub(crate) fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Design a linear-phase lowpass FIR filter with the window method.
///
/// # Arguments
///
/// * `num_taps` - Filter length
/// * `cutoff` - Cutoff frequency relative to Nyquist, in (0, 1)
/// * `window` - Window applied to the truncated sinc
///
/// # Returns
///
/// Symmetric taps whose sum is 1.
pub fn firwin(num_taps: usize, cutoff: f64, window: WindowSpec) -> DspResult<Vec<f64>> {
    if num_taps == 0 {
        return Err(DspError::invalid_parameter("num_taps", "filter must have at least one tap"));
    }
    if !(cutoff > 0.0 && cutoff < 1.0) {
        return Err(DspError::invalid_parameter(
            "cutoff",
            format!("cutoff must lie strictly between 0 and 1 (Nyquist), got {}", cutoff),
        ));
    }

    let alpha = 0.5 * (num_taps - 1) as f64;
    let win = generate_window(window, num_taps);

    let mut taps: Vec<f64> = win
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let m = i as f64 - alpha;
            cutoff * sinc(cutoff * m) * w
        })
        .collect();

    let gain: f64 = taps.iter().sum();
    if gain == 0.0 || !gain.is_finite() {
        return Err(DspError::invalid_parameter(
            "window",
            format!("{} window gives a filter with zero DC gain", window),
        ));
    }
    for t in taps.iter_mut() {
        *t /= gain;
    }

    Ok(taps)
}
