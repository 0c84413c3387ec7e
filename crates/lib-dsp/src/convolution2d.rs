//! 2-D convolution and correlation.
//!
//! The direct kernel reads the first operand through a boundary policy
//! (`fill`, `wrap`, `symm`), so samples beyond its edges take a constant,
//! periodic or mirrored value. The spectral kernel zero-pads, which only
//! matches `fill` with a zero fill value.

use crate::config::engine_config;
use crate::convolution::{fft_ops, ConvolutionPath, CostModel};
use crate::error::{ensure_non_empty, DspError, DspResult};
use crate::fft::{next_fast_len, FftEngine};
use crate::sample::Sample;
use lib_types::{Boundary, Method, Mode, SignalOptions};
use ndarray::{s, Array2, ArrayView1, ArrayView2, Zip};
use num_complex::Complex;

/// Pick the faster algorithm for operands of shapes `s1` and `s2`.
pub fn choose_method_2d(s1: (usize, usize), s2: (usize, usize), mode: Mode) -> ConvolutionPath {
    let p1 = s1.0 * s1.1;
    let p2 = s2.0 * s2.1;
    if p1.min(p2) < engine_config().direct_kernel_threshold {
        return ConvolutionPath::Direct;
    }

    let out_points = match mode {
        Mode::Full => (s1.0 + s2.0 - 1) * (s1.1 + s2.1 - 1),
        Mode::Valid => (s1.0.abs_diff(s2.0) + 1) * (s1.1.abs_diff(s2.1) + 1),
        Mode::Same => p1,
    };
    let direct_ops = match mode {
        Mode::Full | Mode::Valid => p1.min(p2) * out_points,
        Mode::Same => p1 * p2,
    };
    let full_points = (s1.0 + s2.0 - 1) * (s1.1 + s2.1 - 1);

    CostModel::two_d(mode).decide(fft_ops(full_points), direct_ops as f64)
}

/// Output shape and its offset inside the full result.
fn output_window(s1: (usize, usize), s2: (usize, usize), mode: Mode) -> ((usize, usize), (usize, usize)) {
    match mode {
        Mode::Full => ((s1.0 + s2.0 - 1, s1.1 + s2.1 - 1), (0, 0)),
        Mode::Same => (s1, ((s2.0 - 1) / 2, (s2.1 - 1) / 2)),
        Mode::Valid => ((s1.0 - s2.0 + 1, s1.1 - s2.1 + 1), (s2.0 - 1, s2.1 - 1)),
    }
}

/// Convolve two 2-D arrays.
///
/// `same` output has the shape of `in1`. `valid` requires one operand to
/// be at least as large as the other in both dimensions. `opts.boundary`
/// and `opts.fill_value` govern reads outside `in1` in the direct kernel.
///
/// # Errors
///
/// - `InvalidShape` for empty operands or non-nested `valid` operands
/// - `UnsupportedConfiguration` for `method = fft` with a boundary other
///   than zero fill
pub fn convolve2d<T: Sample>(in1: ArrayView2<T>, in2: ArrayView2<T>, opts: &SignalOptions) -> DspResult<Array2<T>> {
    ensure_non_empty(in1.len(), "first operand")?;
    ensure_non_empty(in2.len(), "second operand")?;

    let (mut in1, mut in2) = (in1.view(), in2.view());
    if opts.mode == Mode::Valid {
        let (a, b) = (in1.dim(), in2.dim());
        if a.0 >= b.0 && a.1 >= b.1 {
            // Already nested
        } else if b.0 >= a.0 && b.1 >= a.1 {
            std::mem::swap(&mut in1, &mut in2);
        } else {
            return Err(DspError::invalid_shape(format!(
                "valid mode needs one operand to contain the other, got {:?} and {:?}",
                a, b
            )));
        }
    }

    let zero_fill = opts.boundary == Boundary::Fill && opts.fill_value == 0.0;
    let path = match opts.method {
        Method::Direct => ConvolutionPath::Direct,
        Method::Fft if !zero_fill => {
            return Err(DspError::unsupported(format!(
                "fft method supports only zero fill, got boundary {} with fill value {}",
                opts.boundary, opts.fill_value
            )));
        }
        Method::Fft => ConvolutionPath::Spectral,
        Method::Auto if !zero_fill => ConvolutionPath::Direct,
        Method::Auto => choose_method_2d(in1.dim(), in2.dim(), opts.mode),
    };

    tracing::debug!(
        "convolve2d: {:?} * {:?} mode={} boundary={} -> {:?}",
        in1.dim(),
        in2.dim(),
        opts.mode,
        opts.boundary,
        path
    );

    match path {
        ConvolutionPath::Direct => Ok(direct_convolve2d(in1, in2, opts)),
        ConvolutionPath::Spectral => fft_convolve2d(in1, in2, opts.mode),
    }
}

/// Cross-correlate two 2-D arrays: convolution with `in2` flipped in both
/// axes and conjugated.
pub fn correlate2d<T: Sample>(in1: ArrayView2<T>, in2: ArrayView2<T>, opts: &SignalOptions) -> DspResult<Array2<T>> {
    let flipped = in2.slice(s![..;-1, ..;-1]).mapv(|v| v.conj());
    convolve2d(in1, flipped.view(), opts)
}

/// Map a possibly out-of-range index into `[0, n)`, or `None` for fill.
#[inline]
fn boundary_index(i: isize, n: usize, boundary: Boundary) -> Option<usize> {
    let n_i = n as isize;
    if (0..n_i).contains(&i) {
        return Some(i as usize);
    }
    match boundary {
        Boundary::Fill => None,
        Boundary::Wrap => Some(i.rem_euclid(n_i) as usize),
        Boundary::Symm => {
            let m = i.rem_euclid(2 * n_i);
            let mirrored = if m < n_i { m } else { 2 * n_i - 1 - m };
            Some(mirrored as usize)
        }
    }
}

fn direct_convolve2d<T: Sample>(in1: ArrayView2<T>, in2: ArrayView2<T>, opts: &SignalOptions) -> Array2<T> {
    let (rows, cols) = in1.dim();
    let (k_rows, k_cols) = in2.dim();
    let (shape, offset) = output_window(in1.dim(), in2.dim(), opts.mode);
    let fill = T::from_scalar(opts.fill_value);
    let boundary = opts.boundary;

    let output = |(a, b): (usize, usize), y: &mut T| {
        let r0 = (a + offset.0) as isize;
        let c0 = (b + offset.1) as isize;
        let mut acc = T::zero();
        for i in 0..k_rows {
            let r = boundary_index(r0 - i as isize, rows, boundary);
            for j in 0..k_cols {
                let sample = match (r, boundary_index(c0 - j as isize, cols, boundary)) {
                    (Some(r), Some(c)) => in1[[r, c]],
                    _ => fill,
                };
                acc += in2[[i, j]] * sample;
            }
        }
        *y = acc;
    };

    let mut out = Array2::zeros(shape);
    if engine_config().is_parallel(out.len() * in2.len()) {
        Zip::indexed(&mut out).par_for_each(output);
    } else {
        Zip::indexed(&mut out).for_each(output);
    }
    out
}

/// 2-D forward transform zero-padded to `shape`: rows with the element
/// type's transform, then complex transforms down the columns.
pub(crate) fn forward_2d<T: Sample>(
    engine: &mut FftEngine<T::Real>,
    x: ArrayView2<T>,
    shape: (usize, usize),
) -> DspResult<Array2<Complex<T::Real>>> {
    let mut spectrum = Array2::zeros((shape.0, T::spectrum_len(shape.1)));
    for (i, row) in x.outer_iter().enumerate() {
        let row = row.to_vec();
        let bins = T::forward(engine, &row, shape.1)?;
        spectrum.row_mut(i).assign(&ArrayView1::from(&bins[..]));
    }
    engine.transform_columns(&mut spectrum, false)?;
    Ok(spectrum)
}

/// Inverse of [`forward_2d`], keeping the leading `keep` rows and columns.
pub(crate) fn inverse_2d<T: Sample>(
    engine: &mut FftEngine<T::Real>,
    mut spectrum: Array2<Complex<T::Real>>,
    shape: (usize, usize),
    keep: (usize, usize),
) -> DspResult<Array2<T>> {
    engine.transform_columns(&mut spectrum, true)?;
    let mut out = Array2::zeros(keep);
    for (i, mut row) in out.outer_iter_mut().enumerate() {
        let bins = spectrum.row(i).to_vec();
        let samples = T::inverse(engine, &bins, shape.1)?;
        row.assign(&ArrayView1::from(&samples[..keep.1]));
    }
    Ok(out)
}

fn fft_convolve2d<T: Sample>(in1: ArrayView2<T>, in2: ArrayView2<T>, mode: Mode) -> DspResult<Array2<T>> {
    let full = (in1.nrows() + in2.nrows() - 1, in1.ncols() + in2.ncols() - 1);
    let size = (next_fast_len(full.0), next_fast_len(full.1));
    engine_config().check_transform_len(size.0 * size.1);
    tracing::debug!("fft_convolve2d: full={:?} transform={:?}", full, size);

    let mut engine = FftEngine::<T::Real>::new();
    let mut spectrum = forward_2d(&mut engine, in1, size)?;
    let kernel = forward_2d(&mut engine, in2, size)?;
    spectrum.zip_mut_with(&kernel, |s, &h| *s = *s * h);

    let full_result = inverse_2d::<T>(&mut engine, spectrum, size, full)?;
    let (shape, offset) = output_window(in1.dim(), in2.dim(), mode);
    Ok(full_result
        .slice(s![offset.0..offset.0 + shape.0, offset.1..offset.1 + shape.1])
        .to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use num_complex::Complex64;

    fn grid(rows: usize, cols: usize, seed: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(i, j)| (((i * 37 + j * 11 + seed * 7) % 29) as f64) / 29.0 - 0.4)
    }

    /// Extend `x` by `pad` samples on every side using mirror-with-repeat.
    fn symmetric_pad(x: &Array2<f64>, pad: (usize, usize)) -> Array2<f64> {
        let (m, n) = x.dim();
        let mirror = |i: isize, len: usize| -> usize {
            let len = len as isize;
            let mut i = i;
            while i < 0 || i >= len {
                i = if i < 0 { -i - 1 } else { 2 * len - 1 - i };
            }
            i as usize
        };
        Array2::from_shape_fn((m + 2 * pad.0, n + 2 * pad.1), |(i, j)| {
            x[[
                mirror(i as isize - pad.0 as isize, m),
                mirror(j as isize - pad.1 as isize, n),
            ]]
        })
    }

    #[test]
    fn test_symm_same_matches_brute_force() {
        let x = grid(8, 8, 1);
        let h = grid(5, 5, 2);
        let opts = SignalOptions::default()
            .with_mode(Mode::Same)
            .with_boundary(Boundary::Symm);
        let y = convolve2d(x.view(), h.view(), &opts).unwrap();
        assert_eq!(y.dim(), (8, 8));

        // Full convolution over the padded signal, then the centered 8x8 window
        let padded = symmetric_pad(&x, (4, 4));
        for a in 0..8 {
            for b in 0..8 {
                let (r0, c0) = (a + 2 + 4, b + 2 + 4);
                let mut acc = 0.0;
                for i in 0..5 {
                    for j in 0..5 {
                        acc += h[[i, j]] * padded[[r0 - i, c0 - j]];
                    }
                }
                assert!((y[[a, b]] - acc).abs() < 1e-12, "({}, {}): {} vs {}", a, b, y[[a, b]], acc);
            }
        }
    }

    #[test]
    fn test_fill_value() {
        let x = arr2(&[[1.0]]);
        let h = Array2::from_elem((2, 2), 1.0);
        let opts = SignalOptions::default().with_fill_value(5.0);
        let y = convolve2d(x.view(), h.view(), &opts).unwrap();
        assert_eq!(y, Array2::from_elem((2, 2), 16.0));
    }

    #[test]
    fn test_wrap_and_symm_shift() {
        let x = grid(3, 3, 4);
        let mut h = Array2::zeros((3, 3));
        h[[0, 0]] = 1.0;

        let opts = SignalOptions::default().with_mode(Mode::Same).with_boundary(Boundary::Wrap);
        let y = convolve2d(x.view(), h.view(), &opts).unwrap();
        for a in 0..3 {
            for b in 0..3 {
                assert_eq!(y[[a, b]], x[[(a + 1) % 3, (b + 1) % 3]]);
            }
        }

        let opts = opts.with_boundary(Boundary::Symm);
        let y = convolve2d(x.view(), h.view(), &opts).unwrap();
        assert_eq!(y[[2, 2]], x[[2, 2]]);
        assert_eq!(y[[0, 2]], x[[1, 2]]);
    }

    #[test]
    fn test_fft_matches_direct() {
        let x = grid(17, 12, 5);
        let h = grid(6, 4, 6);
        for mode in [Mode::Full, Mode::Same, Mode::Valid] {
            let direct = convolve2d(
                x.view(),
                h.view(),
                &SignalOptions::default().with_mode(mode).with_method(Method::Direct),
            )
            .unwrap();
            let fft = convolve2d(
                x.view(),
                h.view(),
                &SignalOptions::default().with_mode(mode).with_method(Method::Fft),
            )
            .unwrap();
            assert_eq!(direct.dim(), fft.dim());
            for (a, b) in direct.iter().zip(fft.iter()) {
                assert!((a - b).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_complex_fft_matches_direct() {
        let x = grid(6, 7, 1).mapv(|v| Complex64::new(v, 1.0 - v));
        let h = grid(3, 2, 3).mapv(|v| Complex64::new(-v, 0.5));
        let direct = convolve2d(x.view(), h.view(), &SignalOptions::default().with_method(Method::Direct)).unwrap();
        let fft = convolve2d(x.view(), h.view(), &SignalOptions::default().with_method(Method::Fft)).unwrap();
        for (a, b) in direct.iter().zip(fft.iter()) {
            assert!((a - b).norm() < 1e-10);
        }
    }

    #[test]
    fn test_valid_nesting() {
        let big = grid(6, 6, 1);
        let small = grid(2, 3, 2);
        let opts = SignalOptions::default().with_mode(Mode::Valid);
        let a = convolve2d(big.view(), small.view(), &opts).unwrap();
        let b = convolve2d(small.view(), big.view(), &opts).unwrap();
        assert_eq!(a.dim(), (5, 4));
        assert_eq!(a, b);

        let wide = grid(2, 8, 3);
        let tall = grid(8, 2, 4);
        assert!(matches!(
            convolve2d(wide.view(), tall.view(), &opts),
            Err(DspError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_valid_swap_with_short_lived_operand() {
        let small = grid(3, 3, 5);
        let expected = {
            let big = grid(7, 5, 6);
            let opts = SignalOptions::default().with_mode(Mode::Valid);
            let swapped = convolve2d(small.view(), big.view(), &opts).unwrap();
            assert_eq!(swapped, convolve2d(big.view(), small.view(), &opts).unwrap());
            swapped
        };
        assert_eq!(expected.dim(), (5, 3));
    }

    #[test]
    fn test_fft_with_boundary_unsupported() {
        let x = grid(4, 4, 1);
        let h = grid(2, 2, 2);
        let opts = SignalOptions::default()
            .with_boundary(Boundary::Symm)
            .with_method(Method::Fft);
        assert!(matches!(
            convolve2d(x.view(), h.view(), &opts),
            Err(DspError::UnsupportedConfiguration(_))
        ));
        let opts = SignalOptions::default().with_fill_value(1.0).with_method(Method::Fft);
        assert!(convolve2d(x.view(), h.view(), &opts).is_err());

        // Auto falls back to the direct kernel
        let opts = SignalOptions::default().with_boundary(Boundary::Symm);
        assert!(convolve2d(x.view(), h.view(), &opts).is_ok());
    }

    #[test]
    fn test_correlate2d_flips_kernel() {
        let x = grid(7, 5, 2);
        let h = grid(3, 2, 9);
        let flipped = h.slice(s![..;-1, ..;-1]).to_owned();
        let opts = SignalOptions::default().with_mode(Mode::Same).with_boundary(Boundary::Symm);
        let corr = correlate2d(x.view(), h.view(), &opts).unwrap();
        let conv = convolve2d(x.view(), flipped.view(), &opts).unwrap();
        assert_eq!(corr, conv);
    }

    #[test]
    fn test_choose_method_2d() {
        assert_eq!(choose_method_2d((256, 256), (2, 2), Mode::Same), ConvolutionPath::Direct);
        assert_eq!(choose_method_2d((16, 16), (3, 3), Mode::Same), ConvolutionPath::Direct);
        assert_eq!(choose_method_2d((256, 256), (100, 100), Mode::Same), ConvolutionPath::Spectral);
    }

    #[test]
    fn test_empty_operand() {
        let x: Array2<f64> = Array2::zeros((0, 3));
        let h = grid(2, 2, 1);
        assert!(matches!(
            convolve2d(x.view(), h.view(), &SignalOptions::default()),
            Err(DspError::InvalidShape(_))
        ));
    }
}
