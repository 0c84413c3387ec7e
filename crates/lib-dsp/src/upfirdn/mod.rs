//! Fused upsample / FIR filter / downsample.
//!
//! Produces exactly what zero-stuffing the input by L, convolving with the
//! filter and keeping every M-th sample would, without building the
//! zero-stuffed signal or computing discarded outputs.
//!
//! Two kernel forms are available:
//! - Generic: output indices mapped to filter phases at runtime
//! - Specialized: an index plan compiled per `(L, M, taps, element type)`
//!   and cached process-wide (see [`KernelCache`])
//!
//! Both produce identical results.

mod cache;
mod kernel;
mod phase;

pub use cache::{kernel_cache, KernelCache};
pub use kernel::{GenericKernel, KernelForm, KernelKey, PhaseIndexer, SpecializedKernel};
pub use phase::PhaseTable;

use crate::error::{ensure_non_empty, DspError, DspResult};
use crate::sample::Sample;
use kernel::run_kernel;
use lib_types::{ResampleFactors, SignalOptions};
use ndarray::{Array2, ArrayView1, ArrayView2, Axis, Zip};
use phase::phase_dot;

/// A filter prepared for repeated fused resampling.
#[derive(Clone, Debug)]
pub struct UpFirDn<T> {
    table: PhaseTable<T>,
    factors: ResampleFactors,
    taps: usize,
    kernel: KernelForm,
}

impl<T: Sample> UpFirDn<T> {
    /// Prepare filter `h` for factors `up`/`down`.
    ///
    /// With `specialized`, the index plan is fetched from (or compiled into)
    /// the process-wide kernel cache.
    pub fn new(h: &[T], up: usize, down: usize, specialized: bool) -> DspResult<Self> {
        ensure_non_empty(h.len(), "filter")?;
        let factors = ResampleFactors::new(up, down)?;

        let kernel = if specialized {
            KernelForm::Specialized(kernel_cache().get_or_compile(KernelKey::new::<T>(up, down, h.len())))
        } else {
            KernelForm::Generic(GenericKernel::new(up, down))
        };

        Ok(Self {
            table: PhaseTable::new(h, up),
            factors,
            taps: h.len(),
            kernel,
        })
    }

    /// Output length for an input of `n` (> 0) samples.
    pub fn output_len(&self, n: usize) -> usize {
        self.factors.upfirdn_len(n, self.taps)
    }

    /// Apply to a 1-D signal.
    pub fn apply(&self, x: &[T]) -> DspResult<Vec<T>> {
        ensure_non_empty(x.len(), "signal")?;
        Ok(run_kernel(&self.kernel, &self.table, x, self.output_len(x.len())))
    }

    /// Output `n` for signal `x`.
    #[inline]
    fn output_at(&self, x: &[T], n: usize) -> T {
        let (phase, i) = self.kernel.locate(n);
        phase_dot(self.table.phase(phase), x, i)
    }
}

/// Upsample `x` by `up`, filter with `h`, downsample by `down`.
///
/// Output length is `((N-1)*up + K - 1) / down + 1`. Honours
/// `opts.use_specialized_kernel`.
pub fn upfirdn<T: Sample>(h: &[T], x: &[T], up: usize, down: usize, opts: &SignalOptions) -> DspResult<Vec<T>> {
    ensure_non_empty(x.len(), "signal")?;
    let engine = UpFirDn::new(h, up, down, opts.use_specialized_kernel)?;
    tracing::debug!(
        "upfirdn: n={} taps={} up={} down={} specialized={}",
        x.len(),
        h.len(),
        up,
        down,
        opts.use_specialized_kernel
    );
    engine.apply(x)
}

/// Apply the 1-D fused kernel independently to every lane of `x` along `axis`.
pub fn upfirdn_axis<T: Sample>(
    h: &[T],
    x: ArrayView2<T>,
    up: usize,
    down: usize,
    axis: Axis,
    opts: &SignalOptions,
) -> DspResult<Array2<T>> {
    ensure_non_empty(x.len(), "signal")?;
    let engine = UpFirDn::new(h, up, down, opts.use_specialized_kernel)?;

    let mut shape = [x.nrows(), x.ncols()];
    shape[axis.index()] = engine.output_len(x.len_of(axis));
    let mut out = Array2::zeros(shape);

    Zip::from(out.lanes_mut(axis))
        .and(x.lanes(axis))
        .par_for_each(|mut y, lane| {
            let lane = lane.to_vec();
            let filtered = run_kernel(&engine.kernel, &engine.table, &lane, y.len());
            y.assign(&ArrayView1::from(&filtered[..]));
        });

    Ok(out)
}

/// Separable 2-D upfirdn in a single pass.
///
/// `h_col` with `col_factors` acts along axis 0 (down the columns), `h_row`
/// with `row_factors` along axis 1. Each output is the full 2-D
/// receptive-field sum of the outer-product filter.
pub fn upfirdn2d<T: Sample>(
    h_row: &[T],
    h_col: &[T],
    x: ArrayView2<T>,
    row_factors: ResampleFactors,
    col_factors: ResampleFactors,
    opts: &SignalOptions,
) -> DspResult<Array2<T>> {
    ensure_non_empty(x.len(), "signal")?;
    let specialized = opts.use_specialized_kernel;
    let along_rows = UpFirDn::new(h_row, row_factors.up, row_factors.down, specialized)?;
    let along_cols = UpFirDn::new(h_col, col_factors.up, col_factors.down, specialized)?;

    let x = x.as_standard_layout();
    let data = x
        .as_slice()
        .ok_or_else(|| DspError::Execution("signal is not contiguous".into()))?;
    let rows: Vec<&[T]> = data.chunks(x.ncols()).collect();

    let shape = (along_cols.output_len(x.nrows()), along_rows.output_len(x.ncols()));
    tracing::debug!("upfirdn2d: input {:?} -> output {:?}", x.dim(), shape);

    let mut out = Array2::zeros(shape);
    Zip::indexed(&mut out).par_for_each(|(a, b), y| {
        let (phase, last_row) = along_cols.kernel.locate(a);
        let col_taps = along_cols.table.phase(phase);
        let taps = col_taps.len();

        let mut acc = T::zero();
        for (k, &c) in col_taps.iter().enumerate() {
            // Row read by reversed tap k: last_row + 1 - taps + k
            let r = last_row as isize + 1 - taps as isize + k as isize;
            if r < 0 || r as usize >= rows.len() {
                continue;
            }
            acc += c * along_rows.output_at(rows[r as usize], b);
        }
        *y = acc;
    });

    Ok(out)
}
