//! Adaptive Wiener noise reduction.
//!
//! Each sample is pulled toward its local mean by an amount that depends
//! on how the local variance compares with the noise power. Local
//! statistics come from `same`-mode correlation with a box of ones.

use crate::convolution::correlate;
use crate::convolution2d::correlate2d;
use crate::error::{ensure_non_empty, DspError, DspResult};
use crate::sample::Real;
use lib_types::{Mode, SignalOptions};
use ndarray::{Array2, ArrayView2, Zip};

/// Window extent used when no size is given.
pub const DEFAULT_WIENER_SIZE: usize = 3;

/// Wiener-filter a 1-D signal over a window of `size` samples.
///
/// `noise` defaults to the mean local variance.
pub fn wiener<T: Real>(x: &[T], size: Option<usize>, noise: Option<f64>) -> DspResult<Vec<T>> {
    ensure_non_empty(x.len(), "signal")?;
    let size = size.unwrap_or(DEFAULT_WIENER_SIZE);
    if size == 0 || size > x.len() {
        return Err(DspError::invalid_shape(format!(
            "window size must be in 1..={}, got {}",
            x.len(),
            size
        )));
    }

    let opts = SignalOptions::default().with_mode(Mode::Same);
    let ones = vec![T::one(); size];
    let squares: Vec<T> = x.iter().map(|&v| v * v).collect();
    let inv = T::one() / T::from_scalar(size as f64);

    let mean: Vec<T> = correlate(x, &ones, &opts)?.into_iter().map(|v| v * inv).collect();
    let var: Vec<T> = correlate(&squares, &ones, &opts)?
        .into_iter()
        .zip(mean.iter())
        .map(|(sq, &m)| sq * inv - m * m)
        .collect();

    let noise = resolve_noise(noise, var.iter().copied());
    tracing::debug!("wiener: n={} size={} noise={:.6e}", x.len(), size, noise.as_f64());

    Ok(x
        .iter()
        .zip(mean.iter().zip(var.iter()))
        .map(|(&v, (&m, &s))| shrink(v, m, s, noise))
        .collect())
}

/// Wiener-filter a 2-D signal over a `(rows, cols)` window (default 3x3).
pub fn wiener2<T: Real>(x: ArrayView2<T>, size: Option<(usize, usize)>, noise: Option<f64>) -> DspResult<Array2<T>> {
    ensure_non_empty(x.len(), "signal")?;
    let size = size.unwrap_or((DEFAULT_WIENER_SIZE, DEFAULT_WIENER_SIZE));
    if size.0 == 0 || size.1 == 0 {
        return Err(DspError::invalid_shape(format!("window size must be positive, got {:?}", size)));
    }

    let opts = SignalOptions::default().with_mode(Mode::Same);
    let ones = Array2::from_elem(size, T::one());
    let inv = T::one() / T::from_scalar((size.0 * size.1) as f64);

    let mean = correlate2d(x, ones.view(), &opts)?.mapv(|v| v * inv);
    let squares = x.mapv(|v| v * v);
    let mut var = correlate2d(squares.view(), ones.view(), &opts)?;
    Zip::from(&mut var).and(&mean).for_each(|s, &m| *s = *s * inv - m * m);

    let noise = resolve_noise(noise, var.iter().copied());
    tracing::debug!("wiener2: shape={:?} size={:?} noise={:.6e}", x.dim(), size, noise.as_f64());

    Ok(Zip::from(&x)
        .and(&mean)
        .and(&var)
        .map_collect(|&v, &m, &s| shrink(v, m, s, noise)))
}

fn resolve_noise<T: Real>(noise: Option<f64>, var: impl ExactSizeIterator<Item = T>) -> T {
    match noise {
        Some(n) => T::from_scalar(n),
        None => {
            let count = T::from_scalar(var.len() as f64);
            var.sum::<T>() / count
        }
    }
}

/// Local mean where the variance does not exceed the noise, else a
/// variance-weighted blend of the sample and the local mean.
fn shrink<T: Real>(value: T, mean: T, var: T, noise: T) -> T {
    if var <= noise {
        mean
    } else {
        (value - mean) * (T::one() - noise / var) + mean
    }
}
