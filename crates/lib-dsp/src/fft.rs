//! FFT/IFFT operations using rustfft and realfft.
//!
//! This module provides a high-level wrapper around the planners with:
//! - Planner caching for repeated transforms within one call
//! - Real-to-complex and complex-to-real transforms of any length
//! - Row/column 2-D transforms over `ndarray` grids
//! - Fast transform length selection

use crate::error::{DspError, DspResult};
use ndarray::{Array2, Axis};
use num_complex::Complex;
use num_traits::{Float, Zero};
use realfft::RealFftPlanner;
use rustfft::{Fft, FftNum, FftPlanner};
use std::sync::Arc;

/// FFT engine with cached planners.
pub struct FftEngine<T: FftNum> {
    /// Complex FFT planner.
    complex_planner: FftPlanner<T>,

    /// Real FFT planner.
    real_planner: RealFftPlanner<T>,
}

impl<T: FftNum + Float> FftEngine<T> {
    /// Create a new FFT engine.
    pub fn new() -> Self {
        Self {
            complex_planner: FftPlanner::new(),
            real_planner: RealFftPlanner::new(),
        }
    }

    /// Perform forward FFT on complex data in-place.
    pub fn fft_inplace(&mut self, data: &mut [Complex<T>]) -> DspResult<()> {
        let len = data.len();
        if len == 0 {
            return Err(DspError::invalid_shape("FFT length must be positive"));
        }

        let fft = self.complex_planner.plan_fft_forward(len);
        fft.process(data);
        Ok(())
    }

    /// Perform normalized inverse FFT on complex data in-place.
    pub fn ifft_inplace(&mut self, data: &mut [Complex<T>]) -> DspResult<()> {
        let len = data.len();
        if len == 0 {
            return Err(DspError::invalid_shape("FFT length must be positive"));
        }

        let fft = self.complex_planner.plan_fft_inverse(len);
        fft.process(data);

        // Normalize
        let scale = normalization::<T>(len);
        for x in data.iter_mut() {
            *x = *x * scale;
        }

        Ok(())
    }

    /// Forward FFT of `data` zero-padded (or truncated) to `n` points.
    pub fn fft(&mut self, data: &[Complex<T>], n: usize) -> DspResult<Vec<Complex<T>>> {
        let mut result = resized(data, n, Complex::zero());
        self.fft_inplace(&mut result)?;
        Ok(result)
    }

    /// Normalized inverse FFT, returning a new buffer.
    pub fn ifft(&mut self, data: &[Complex<T>]) -> DspResult<Vec<Complex<T>>> {
        let mut result = data.to_vec();
        self.ifft_inplace(&mut result)?;
        Ok(result)
    }

    /// Perform forward real-to-complex FFT of `data` zero-padded to `n` points.
    ///
    /// Output: n/2 + 1 complex samples (Hermitian symmetry exploited)
    pub fn rfft(&mut self, data: &[T], n: usize) -> DspResult<Vec<Complex<T>>> {
        if n == 0 {
            return Err(DspError::invalid_shape("FFT length must be positive"));
        }

        let r2c = self.real_planner.plan_fft_forward(n);
        let mut input = resized(data, n, T::zero());
        let mut output = r2c.make_output_vec();

        r2c.process(&mut input, &mut output)
            .map_err(|e| DspError::Execution(e.to_string()))?;

        Ok(output)
    }

    /// Perform normalized inverse complex-to-real FFT.
    ///
    /// Input: n/2 + 1 complex samples
    /// Output: n real samples
    ///
    /// The imaginary parts of the DC bin and (for even `n`) the Nyquist bin
    /// carry no information for a real output and are ignored.
    pub fn irfft(&mut self, data: &[Complex<T>], n: usize) -> DspResult<Vec<T>> {
        if n == 0 {
            return Err(DspError::invalid_shape("FFT length must be positive"));
        }

        let expected_input_len = n / 2 + 1;
        if data.len() != expected_input_len {
            return Err(DspError::invalid_shape(format!(
                "inverse real FFT of length {} needs {} bins, got {}",
                n,
                expected_input_len,
                data.len()
            )));
        }

        let c2r = self.real_planner.plan_fft_inverse(n);
        let mut input = data.to_vec();
        input[0].im = T::zero();
        if n % 2 == 0 {
            input[n / 2].im = T::zero();
        }
        let mut output = c2r.make_output_vec();

        c2r.process(&mut input, &mut output)
            .map_err(|e| DspError::Execution(e.to_string()))?;

        // Normalize
        let scale = normalization::<T>(n);
        for x in output.iter_mut() {
            *x = *x * scale;
        }

        Ok(output)
    }

    /// Forward 2-D FFT of `data` zero-padded to `shape`, complex in both axes.
    pub fn fft2(&mut self, data: &Array2<Complex<T>>, shape: (usize, usize)) -> DspResult<Array2<Complex<T>>> {
        let (rows, cols) = shape;
        let mut out = Array2::zeros(shape);
        for (i, row) in data.outer_iter().enumerate().take(rows) {
            let row: Vec<Complex<T>> = row.iter().copied().collect();
            let spectrum = self.fft(&row, cols)?;
            out.row_mut(i).assign(&ndarray::ArrayView1::from(&spectrum[..]));
        }
        self.transform_columns(&mut out, false)?;
        Ok(out)
    }

    /// Normalized inverse 2-D FFT.
    pub fn ifft2(&mut self, data: &Array2<Complex<T>>) -> DspResult<Array2<Complex<T>>> {
        let mut out = data.clone();
        self.transform_columns(&mut out, true)?;
        for mut row in out.outer_iter_mut() {
            let mut buf: Vec<Complex<T>> = row.iter().copied().collect();
            self.ifft_inplace(&mut buf)?;
            row.assign(&ndarray::ArrayView1::from(&buf[..]));
        }
        Ok(out)
    }

    /// Complex FFT (or normalized inverse) along every column in place.
    pub fn transform_columns(&mut self, data: &mut Array2<Complex<T>>, inverse: bool) -> DspResult<()> {
        let rows = data.nrows();
        if rows == 0 {
            return Err(DspError::invalid_shape("FFT length must be positive"));
        }
        let fft = if inverse {
            self.get_fft_inverse(rows)
        } else {
            self.get_fft_forward(rows)
        };
        let scale = normalization::<T>(rows);
        let mut buf = vec![Complex::zero(); rows];
        for mut col in data.axis_iter_mut(Axis(1)) {
            for (b, &c) in buf.iter_mut().zip(col.iter()) {
                *b = c;
            }
            fft.process(&mut buf);
            for (c, &b) in col.iter_mut().zip(buf.iter()) {
                *c = if inverse { b * scale } else { b };
            }
        }
        Ok(())
    }

    /// Get a cached forward FFT plan.
    pub fn get_fft_forward(&mut self, len: usize) -> Arc<dyn Fft<T>> {
        self.complex_planner.plan_fft_forward(len)
    }

    /// Get a cached inverse FFT plan.
    pub fn get_fft_inverse(&mut self, len: usize) -> Arc<dyn Fft<T>> {
        self.complex_planner.plan_fft_inverse(len)
    }
}

impl<T: FftNum + Float> Default for FftEngine<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn normalization<T: Float>(len: usize) -> T {
    T::one() / T::from(len).unwrap_or_else(T::one)
}

/// Copy `data` into a buffer of exactly `n` elements, padding with `fill`.
pub(crate) fn resized<S: Copy>(data: &[S], n: usize, fill: S) -> Vec<S> {
    let mut result = Vec::with_capacity(n);
    result.extend_from_slice(&data[..data.len().min(n)]);
    result.resize(n, fill);
    result
}

/// Smallest 5-smooth integer (only prime factors 2, 3, 5) not below `target`.
///
/// Transforms of these lengths run on the fast mixed-radix paths.
pub fn next_fast_len(target: usize) -> usize {
    if target <= 6 {
        return target.max(1);
    }
    let mut best = target.next_power_of_two();
    let mut p5 = 1usize;
    while p5 < best {
        let mut p35 = p5;
        while p35 < best {
            // Smallest power-of-two multiple of p35 that reaches the target
            let mut candidate = p35;
            while candidate < target {
                candidate *= 2;
            }
            if candidate < best {
                best = candidate;
            }
            if p35 >= target {
                break;
            }
            p35 *= 3;
        }
        if p5 >= target {
            break;
        }
        p5 *= 5;
    }
    best
}

/// Move the zero-frequency term from the center back to index 0.
pub fn ifftshift<S: Copy>(data: &[S]) -> Vec<S> {
    let n = data.len();
    (0..n).map(|i| data[(i + n / 2) % n]).collect()
}
