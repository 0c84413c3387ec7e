//! 1-D convolution and correlation with direct, spectral and overlap-save
//! kernels.
//!
//! `Method::Auto` picks between the direct and spectral algorithms with a
//! cost model calibrated per output mode. Long signals filtered by short
//! kernels take the overlap-save path, which splits the spectral work into
//! independent blocks processed in parallel with Rayon.

use crate::config::engine_config;
use crate::error::{ensure_non_empty, DspError, DspResult};
use crate::fft::{next_fast_len, FftEngine};
use crate::sample::Sample;
use lib_types::{Method, Mode, SignalOptions};
use num_complex::Complex;
use rayon::prelude::*;

/// Algorithm that will compute a convolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConvolutionPath {
    /// Sliding-window accumulation.
    Direct,
    /// Transform, multiply, inverse transform.
    Spectral,
}

/// Relative cost weights for one dimensionality and mode.
///
/// The spectral algorithm is preferred when
/// `fft * fft_ops < direct * direct_ops + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CostModel {
    pub fft: f64,
    pub direct: f64,
    pub offset: f64,
}

impl CostModel {
    /// Weights for 1-D operands of lengths `n` (first) and `k` (second).
    pub fn one_d(mode: Mode, n: usize, k: usize) -> Self {
        let offset = -1e-3;
        let (fft, direct, offset) = match mode {
            Mode::Valid => (1.89095737e-9, 2.1364985e-10, offset),
            Mode::Full => (1.7649070e-9, 2.1414831e-10, offset),
            Mode::Same if k <= n => (3.2646654e-9, 2.8478277e-10, offset),
            Mode::Same => (3.21635404e-9, 1.1773253e-8, -1e-5),
        };
        Self { fft, direct, offset }
    }

    /// Weights for 2-D operands.
    pub fn two_d(mode: Mode) -> Self {
        let offset = -1e-4;
        let (fft, direct) = match mode {
            Mode::Valid => (1.85927e-9, 2.11242e-8),
            Mode::Full => (1.99817e-9, 1.66174e-8),
            Mode::Same => (2.04735e-9, 1.55367e-8),
        };
        Self { fft, direct, offset }
    }

    /// Decide between the two algorithms for the given operation counts.
    pub fn decide(&self, fft_ops: f64, direct_ops: f64) -> ConvolutionPath {
        if self.fft * fft_ops < self.direct * direct_ops + self.offset {
            ConvolutionPath::Spectral
        } else {
            ConvolutionPath::Direct
        }
    }
}

/// Estimated operation count of a spectral convolution whose full output
/// has `points` samples.
pub(crate) fn fft_ops(points: usize) -> f64 {
    let p = points as f64;
    3.0 * p * p.ln()
}

/// Multiply-accumulate count of a direct 1-D convolution.
fn direct_ops_1d(mode: Mode, s1: usize, s2: usize) -> f64 {
    let ops = match mode {
        Mode::Full => s1 * s2,
        Mode::Valid => {
            if s2 >= s1 {
                (s2 - s1 + 1) * s1
            } else {
                (s1 - s2 + 1) * s2
            }
        }
        Mode::Same => {
            if s1 < s2 {
                s1 * s2
            } else {
                s1 * s2 - (s2 / 2) * ((s2 + 1) / 2)
            }
        }
    };
    ops as f64
}

/// Pick the faster algorithm for 1-D operands of lengths `n` and `k`.
///
/// Kernels shorter than the configured `direct_kernel_threshold` always run
/// directly; otherwise the per-mode [`CostModel`] decides.
pub fn choose_method(n: usize, k: usize, mode: Mode) -> ConvolutionPath {
    if n.min(k) < engine_config().direct_kernel_threshold {
        return ConvolutionPath::Direct;
    }
    CostModel::one_d(mode, n, k).decide(fft_ops(n + k - 1), direct_ops_1d(mode, n, k))
}

fn resolve_path(n: usize, k: usize, mode: Mode, method: Method) -> ConvolutionPath {
    match method {
        Method::Direct => ConvolutionPath::Direct,
        Method::Fft => ConvolutionPath::Spectral,
        Method::Auto => choose_method(n, k, mode),
    }
}

/// Convolve two 1-D signals.
///
/// Output length follows `opts.mode`: `full` gives `N + K - 1` samples,
/// `valid` gives `max - min + 1`, and `same` gives `max(N, K)` samples
/// centered on the full result. `opts.method` selects the algorithm.
pub fn convolve<T: Sample>(in1: &[T], in2: &[T], opts: &SignalOptions) -> DspResult<Vec<T>> {
    ensure_non_empty(in1.len(), "first operand")?;
    ensure_non_empty(in2.len(), "second operand")?;

    let path = resolve_path(in1.len(), in2.len(), opts.mode, opts.method);
    tracing::debug!(
        "convolve: n={} k={} mode={} method={} -> {:?}",
        in1.len(),
        in2.len(),
        opts.mode,
        opts.method,
        path
    );

    match path {
        ConvolutionPath::Direct => direct_convolve(in1, in2, opts.mode),
        ConvolutionPath::Spectral => fft_convolve(in1, in2, opts.mode),
    }
}

/// Cross-correlate two 1-D signals: convolution with `in2` reversed and
/// conjugated.
pub fn correlate<T: Sample>(in1: &[T], in2: &[T], opts: &SignalOptions) -> DspResult<Vec<T>> {
    let reversed: Vec<T> = in2.iter().rev().map(|v| v.conj()).collect();
    convolve(in1, &reversed, opts)
}

/// Direct convolution, computing only the samples the mode keeps.
pub fn direct_convolve<T: Sample>(in1: &[T], in2: &[T], mode: Mode) -> DspResult<Vec<T>> {
    ensure_non_empty(in1.len(), "first operand")?;
    ensure_non_empty(in2.len(), "second operand")?;

    let (short, long) = if in1.len() < in2.len() { (in1, in2) } else { (in2, in1) };
    let start = mode.start_offset(in1.len(), in2.len());
    let len = mode.output_len(in1.len(), in2.len());

    let output = |idx: usize| {
        let m = start + idx;
        let lo = m.saturating_sub(long.len() - 1);
        let hi = m.min(short.len() - 1);
        let mut acc = T::zero();
        for i in lo..=hi {
            acc += short[i] * long[m - i];
        }
        acc
    };

    let result = if engine_config().is_parallel(len * short.len()) {
        (0..len).into_par_iter().map(output).collect()
    } else {
        (0..len).map(output).collect()
    };

    Ok(result)
}

/// Spectral convolution.
///
/// Uses one transform of `next_fast_len(N + K - 1)` points, or overlap-save
/// blocks when one operand is at least `overlap_save_ratio` times longer
/// than the other.
pub fn fft_convolve<T: Sample>(in1: &[T], in2: &[T], mode: Mode) -> DspResult<Vec<T>> {
    ensure_non_empty(in1.len(), "first operand")?;
    ensure_non_empty(in2.len(), "second operand")?;

    let (n, k) = (in1.len(), in2.len());
    let (short, long) = if n < k { (in1, in2) } else { (in2, in1) };
    let config = engine_config();

    let full = if short.len() > 1 && long.len() >= short.len() * config.overlap_save_ratio {
        ConvolutionEngine::new(short)?.convolve(long)?
    } else {
        let full_len = n + k - 1;
        let size = next_fast_len(full_len);
        config.check_transform_len(size);
        tracing::debug!("fft_convolve: n={} k={} transform={}", n, k, size);

        let mut engine = FftEngine::<T::Real>::new();
        let mut spectrum = T::forward(&mut engine, in1, size)?;
        let kernel = T::forward(&mut engine, in2, size)?;
        for (s, h) in spectrum.iter_mut().zip(kernel.iter()) {
            *s = *s * *h;
        }
        let mut full = T::inverse(&mut engine, &spectrum, size)?;
        full.truncate(full_len);
        full
    };

    Ok(trim_to_mode(full, n, k, mode))
}

/// Keep the part of a full result that `mode` selects.
pub(crate) fn trim_to_mode<T>(mut full: Vec<T>, n: usize, k: usize, mode: Mode) -> Vec<T> {
    let start = mode.start_offset(n, k);
    let len = mode.output_len(n, k);
    full.truncate(start + len);
    full.drain(..start);
    full
}

/// Overlap-save convolution engine.
///
/// Holds the spectrum of a short kernel and convolves long inputs block by
/// block. Blocks are independent and run in parallel when there are more
/// than two of them.
pub struct ConvolutionEngine<T: Sample> {
    /// Pre-computed transform of the kernel.
    kernel_spectrum: Vec<Complex<T::Real>>,

    /// Transform size per block.
    block_size: usize,

    /// Leading samples of each block lost to circular wrap (kernel length - 1).
    overlap: usize,

    /// Output samples produced per block.
    valid_size: usize,

    /// Original kernel length.
    kernel_len: usize,
}

impl<T: Sample> ConvolutionEngine<T> {
    /// Create an engine for `kernel` with block size 4x the kernel length
    /// (minimum 1024), rounded up to a power of two.
    pub fn new(kernel: &[T]) -> DspResult<Self> {
        let block_size = (kernel.len() * 4).next_power_of_two().max(1024);
        Self::with_block_size(kernel, block_size)
    }

    /// Create an engine with an explicit transform size per block.
    pub fn with_block_size(kernel: &[T], block_size: usize) -> DspResult<Self> {
        let kernel_len = kernel.len();
        ensure_non_empty(kernel_len, "kernel")?;
        if block_size < kernel_len {
            return Err(DspError::invalid_parameter(
                "block_size",
                format!("block size {} is smaller than kernel length {}", block_size, kernel_len),
            ));
        }

        let overlap = kernel_len - 1;
        let valid_size = block_size - overlap;

        tracing::debug!(
            "ConvolutionEngine: block size={}, kernel_len={}, valid per block={}",
            block_size,
            kernel_len,
            valid_size
        );

        let mut engine = FftEngine::<T::Real>::new();
        let kernel_spectrum = T::forward(&mut engine, kernel, block_size)?;

        Ok(Self {
            kernel_spectrum,
            block_size,
            overlap,
            valid_size,
            kernel_len,
        })
    }

    /// Full convolution of `input` with the kernel (`N + K - 1` samples).
    pub fn convolve(&self, input: &[T]) -> DspResult<Vec<T>> {
        ensure_non_empty(input.len(), "signal")?;
        let output_len = input.len() + self.overlap;
        let num_blocks = output_len.div_ceil(self.valid_size);

        let blocks: Vec<Vec<T>> = if num_blocks <= 2 {
            let mut engine = FftEngine::new();
            (0..num_blocks)
                .map(|b| self.convolve_block(&mut engine, input, b))
                .collect::<DspResult<_>>()?
        } else {
            (0..num_blocks)
                .into_par_iter()
                .map_init(FftEngine::new, |engine, b| self.convolve_block(engine, input, b))
                .collect::<DspResult<_>>()?
        };

        let mut output: Vec<T> = blocks.into_iter().flatten().collect();
        output.truncate(output_len);
        Ok(output)
    }

    /// Valid output samples of block `index`.
    fn convolve_block(&self, engine: &mut FftEngine<T::Real>, input: &[T], index: usize) -> DspResult<Vec<T>> {
        // Block input starts `overlap` samples before its first output
        let start = (index * self.valid_size) as isize - self.overlap as isize;
        let chunk: Vec<T> = (0..self.block_size)
            .map(|i| {
                let src = start + i as isize;
                if src >= 0 && (src as usize) < input.len() {
                    input[src as usize]
                } else {
                    T::zero()
                }
            })
            .collect();

        let mut spectrum = T::forward(engine, &chunk, self.block_size)?;
        for (c, h) in spectrum.iter_mut().zip(self.kernel_spectrum.iter()) {
            *c = *c * *h;
        }
        let mut result = T::inverse(engine, &spectrum, self.block_size)?;

        // Discard the circularly wrapped prefix
        result.drain(..self.overlap);
        Ok(result)
    }

    /// Get the kernel length.
    pub fn kernel_len(&self) -> usize {
        self.kernel_len
    }

    /// Get the transform size per block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}
