//! Element types accepted by the engine.
//!
//! Every operation is generic over [`Sample`], implemented for `f32`, `f64`,
//! `Complex<f32>` and `Complex<f64>`. Real samples go through real-to-complex
//! transforms; complex samples use full complex transforms.

use crate::error::{DspError, DspResult};
use crate::fft::FftEngine;
use num_complex::Complex;
use num_traits::{Float, FromPrimitive, NumAssign, Zero};
use rustfft::FftNum;
use std::fmt::Debug;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A signal or filter element.
pub trait Sample:
    Copy
    + Send
    + Sync
    + Debug
    + PartialEq
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + Sum
    + 'static
{
    /// Underlying real scalar.
    type Real: Real;

    /// True for complex element types.
    const IS_COMPLEX: bool;

    /// Complex conjugate (identity for real types).
    fn conj(self) -> Self;

    /// Convert a real constant.
    fn from_scalar(x: f64) -> Self;

    /// Embed a real value.
    fn from_real(r: Self::Real) -> Self;

    /// Multiply by a real factor.
    fn scale(self, k: Self::Real) -> Self;

    /// Real part.
    fn re(self) -> Self::Real;

    /// Widen to a complex value.
    fn into_complex(self) -> Complex<Self::Real>;

    /// Narrow from a complex value, dropping the imaginary part for real types.
    fn from_complex(c: Complex<Self::Real>) -> Self;

    /// Number of spectrum bins produced by [`Sample::forward`] for an `n`-point transform.
    fn spectrum_len(n: usize) -> usize;

    /// Forward transform of `data` zero-padded to `n` points.
    fn forward(engine: &mut FftEngine<Self::Real>, data: &[Self], n: usize) -> DspResult<Vec<Complex<Self::Real>>>;

    /// Normalized inverse transform back to `n` samples.
    fn inverse(engine: &mut FftEngine<Self::Real>, spectrum: &[Complex<Self::Real>], n: usize) -> DspResult<Vec<Self>>;
}

/// Real scalar types (`f32`, `f64`).
pub trait Real: Sample<Real = Self> + Float + FftNum + FromPrimitive + NumAssign + Sum + Default {
    /// Widen to `f64`.
    fn as_f64(self) -> f64;
}

macro_rules! impl_real_sample {
    ($t:ty) => {
        impl Sample for $t {
            type Real = $t;
            const IS_COMPLEX: bool = false;

            #[inline]
            fn conj(self) -> Self {
                self
            }

            #[inline]
            fn from_scalar(x: f64) -> Self {
                x as $t
            }

            #[inline]
            fn from_real(r: $t) -> Self {
                r
            }

            #[inline]
            fn scale(self, k: $t) -> Self {
                self * k
            }

            #[inline]
            fn re(self) -> $t {
                self
            }

            #[inline]
            fn into_complex(self) -> Complex<$t> {
                Complex::new(self, 0.0)
            }

            #[inline]
            fn from_complex(c: Complex<$t>) -> Self {
                c.re
            }

            fn spectrum_len(n: usize) -> usize {
                n / 2 + 1
            }

            fn forward(engine: &mut FftEngine<$t>, data: &[Self], n: usize) -> DspResult<Vec<Complex<$t>>> {
                engine.rfft(data, n)
            }

            fn inverse(engine: &mut FftEngine<$t>, spectrum: &[Complex<$t>], n: usize) -> DspResult<Vec<Self>> {
                engine.irfft(spectrum, n)
            }
        }

        impl Real for $t {
            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_real_sample!(f32);
impl_real_sample!(f64);

impl<T: Real> Sample for Complex<T> {
    type Real = T;
    const IS_COMPLEX: bool = true;

    #[inline]
    fn conj(self) -> Self {
        Complex::new(self.re, -self.im)
    }

    #[inline]
    fn from_scalar(x: f64) -> Self {
        Complex::new(T::from_scalar(x), T::zero())
    }

    #[inline]
    fn from_real(r: T) -> Self {
        Complex::new(r, T::zero())
    }

    #[inline]
    fn scale(self, k: T) -> Self {
        Complex::new(self.re * k, self.im * k)
    }

    #[inline]
    fn re(self) -> T {
        self.re
    }

    #[inline]
    fn into_complex(self) -> Complex<T> {
        self
    }

    #[inline]
    fn from_complex(c: Complex<T>) -> Self {
        c
    }

    fn spectrum_len(n: usize) -> usize {
        n
    }

    fn forward(engine: &mut FftEngine<T>, data: &[Self], n: usize) -> DspResult<Vec<Complex<T>>> {
        engine.fft(data, n)
    }

    fn inverse(engine: &mut FftEngine<T>, spectrum: &[Complex<T>], n: usize) -> DspResult<Vec<Self>> {
        if spectrum.len() != n {
            return Err(DspError::invalid_shape(format!(
                "inverse FFT of length {} needs {} bins, got {}",
                n,
                n,
                spectrum.len()
            )));
        }
        engine.ifft(spectrum)
    }
}

/// Convert a slice of `f64` constants (designed filters, windows).
pub fn from_f64_slice<T: Sample>(values: &[f64]) -> Vec<T> {
    values.iter().map(|&v| T::from_scalar(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    #[test]
    fn test_real_sample() {
        assert!(!f64::IS_COMPLEX);
        assert_eq!(2.5f64.conj(), 2.5);
        assert_eq!(f32::from_scalar(0.25), 0.25f32);
        assert_eq!(3.0f64.scale(2.0), 6.0);
        assert_eq!(f64::spectrum_len(9), 5);
    }

    #[test]
    fn test_complex_sample() {
        assert!(Complex32::IS_COMPLEX);
        let z = Complex32::new(1.0, 2.0);
        assert_eq!(z.conj(), Complex32::new(1.0, -2.0));
        assert_eq!(z.scale(2.0), Complex32::new(2.0, 4.0));
        assert_eq!(Complex32::from_real(3.0), Complex32::new(3.0, 0.0));
        assert_eq!(Complex32::spectrum_len(9), 9);
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let mut engine = FftEngine::<f64>::new();
        let data = [1.0, -2.0, 0.5, 4.0, 3.0];
        let spectrum = f64::forward(&mut engine, &data, 8).unwrap();
        assert_eq!(spectrum.len(), 5);
        let back = f64::inverse(&mut engine, &spectrum, 8).unwrap();
        for (i, v) in back.iter().enumerate() {
            let expected = data.get(i).copied().unwrap_or(0.0);
            assert!((v - expected).abs() < 1e-12);
        }

        let data: Vec<Complex<f64>> = (0..6).map(|i| Complex::new(i as f64, -(i as f64))).collect();
        let spectrum = Complex::<f64>::forward(&mut engine, &data, 6).unwrap();
        let back = Complex::<f64>::inverse(&mut engine, &spectrum, 6).unwrap();
        for (a, b) in data.iter().zip(back.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }
}
