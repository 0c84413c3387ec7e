//! Fourier-domain resampling.
//!
//! The signal is treated as one period of a periodic, band-limited
//! waveform: its spectrum is truncated or zero-extended to the new length
//! and transformed back. Real input uses the real transform pair and keeps
//! the output real.

use crate::config::engine_config;
use crate::error::{ensure_non_empty, DspError, DspResult};
use crate::fft::FftEngine;
use crate::sample::Sample;
use crate::window::spectral_taper;
use lib_types::SignalOptions;
use num_complex::Complex;
use num_traits::Zero;

/// Resample `x` to `num` samples.
///
/// When `opts.window` is set, the spectrum is tapered by that window
/// (centered on the zero-frequency bin) before truncation.
///
/// # Errors
///
/// `InvalidShape` for an empty signal or `num == 0`.
pub fn resample<T: Sample>(x: &[T], num: usize, opts: &SignalOptions) -> DspResult<Vec<T>> {
    ensure_non_empty(x.len(), "signal")?;
    if num == 0 {
        return Err(DspError::invalid_shape("number of output samples must be positive"));
    }

    let nx = x.len();
    engine_config().check_transform_len(nx.max(num));

    let mut engine = FftEngine::<T::Real>::new();
    let mut spectrum = T::forward(&mut engine, x, nx)?;

    if let Some(window) = opts.window {
        let taper = spectral_taper(window, nx, !T::IS_COMPLEX);
        for (bin, &w) in spectrum.iter_mut().zip(taper.iter()) {
            *bin = *bin * <T::Real as Sample>::from_scalar(w);
        }
    }

    let n = num.min(nx);
    let nyq = n / 2 + 1;
    let mut resized = vec![Complex::<T::Real>::zero(); T::spectrum_len(num)];

    // Non-negative frequencies
    resized[..nyq].copy_from_slice(&spectrum[..nyq]);

    // Negative frequencies
    if T::IS_COMPLEX && n > 2 {
        let negative = n - nyq;
        resized[num - negative..].copy_from_slice(&spectrum[nx - negative..]);
    }

    // An even-length band has a single bin at +/- n/2 that must be split
    // (upsampling) or merged (downsampling).
    if n % 2 == 0 {
        let half = n / 2;
        if num < nx {
            if T::IS_COMPLEX {
                resized[half] = resized[half] + spectrum[nx - half];
            } else {
                resized[half] = resized[half] * <T::Real as Sample>::from_scalar(2.0);
            }
        } else if nx < num {
            resized[half] = resized[half] * <T::Real as Sample>::from_scalar(0.5);
            if T::IS_COMPLEX {
                resized[num - half] = resized[half];
            }
        }
    }

    tracing::debug!(
        "resample: {} -> {} samples (complex={}, window={:?})",
        nx,
        num,
        T::IS_COMPLEX,
        opts.window
    );

    let scale = <T::Real as Sample>::from_scalar(num as f64 / nx as f64);
    let y = T::inverse(&mut engine, &resized, num)?;
    Ok(y.into_iter().map(|v| v.scale(scale)).collect())
}
