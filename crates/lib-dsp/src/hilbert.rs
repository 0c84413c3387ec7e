//! Analytic signal construction via the Hilbert transform.
//!
//! The spectrum of a real signal is masked so that negative frequencies
//! vanish and positive ones are doubled; DC and (for even lengths) the
//! Nyquist bin are kept as-is. The inverse transform is the analytic
//! signal, whose real part is the input and whose imaginary part is its
//! Hilbert transform.

use crate::config::engine_config;
use crate::error::{ensure_non_empty, DspError, DspResult};
use crate::fft::FftEngine;
use crate::sample::Real;
use ndarray::{Array2, ArrayView2, Zip};
use num_complex::Complex;

/// Frequency-domain mask turning an `n`-point spectrum into an analytic one.
pub fn analytic_mask(n: usize) -> Vec<f64> {
    let mut h = vec![0.0; n];
    if n == 0 {
        return h;
    }
    h[0] = 1.0;
    if n % 2 == 0 {
        h[n / 2] = 1.0;
        h[1..n / 2].iter_mut().for_each(|v| *v = 2.0);
    } else {
        h[1..n.div_ceil(2)].iter_mut().for_each(|v| *v = 2.0);
    }
    h
}

/// Analytic signal of `x` using an `n`-point transform (default `x.len()`).
///
/// Shorter inputs are zero-padded, longer ones truncated.
pub fn hilbert<T: Real>(x: &[T], n: Option<usize>) -> DspResult<Vec<Complex<T>>> {
    ensure_non_empty(x.len(), "signal")?;
    let n = n.unwrap_or(x.len());
    if n == 0 {
        return Err(DspError::invalid_shape("transform length must be positive"));
    }
    engine_config().check_transform_len(n);

    let mut engine = FftEngine::<T>::new();
    let input: Vec<Complex<T>> = x.iter().map(|&v| v.into_complex()).collect();
    let mut spectrum = engine.fft(&input, n)?;

    for (bin, &m) in spectrum.iter_mut().zip(analytic_mask(n).iter()) {
        *bin = *bin * T::from_scalar(m);
    }

    engine.ifft_inplace(&mut spectrum)?;
    tracing::trace!("hilbert: n={} len={}", x.len(), n);
    Ok(spectrum)
}

/// 2-D analytic signal of `x` using a `shape` transform (default `x.dim()`).
///
/// The mask is the outer product of the row and column masks.
pub fn hilbert2<T: Real>(x: ArrayView2<T>, shape: Option<(usize, usize)>) -> DspResult<Array2<Complex<T>>> {
    ensure_non_empty(x.len(), "signal")?;
    let shape = shape.unwrap_or(x.dim());
    if shape.0 == 0 || shape.1 == 0 {
        return Err(DspError::invalid_shape(format!(
            "transform shape must be positive, got {:?}",
            shape
        )));
    }
    engine_config().check_transform_len(shape.0 * shape.1);

    let mut engine = FftEngine::<T>::new();
    let input = x.mapv(|v| v.into_complex());
    let mut spectrum = engine.fft2(&input, shape)?;

    let row_mask = analytic_mask(shape.0);
    let col_mask = analytic_mask(shape.1);
    Zip::indexed(&mut spectrum).for_each(|(i, j), bin| {
        *bin = *bin * T::from_scalar(row_mask[i] * col_mask[j]);
    });

    tracing::trace!("hilbert2: shape={:?} transform={:?}", x.dim(), shape);
    engine.ifft2(&spectrum)
}
