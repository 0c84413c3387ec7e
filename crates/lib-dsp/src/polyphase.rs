//! Rational resampling through a polyphase anti-aliasing filter.
//!
//! The filter is either designed (windowed sinc, cutoff at the tighter of
//! the two Nyquist limits) or supplied by the caller. Its group delay is
//! compensated so that output sample `k` is aligned with input time
//! `k * down / up`.

use crate::error::{ensure_non_empty, DspResult};
use crate::firdes::{FilterDesigner, WindowedSinc};
use crate::sample::{from_f64_slice, Sample};
use crate::upfirdn::UpFirDn;
use lib_types::{ResampleFactors, SignalOptions, WindowSpec};

/// Window used for the designed filter when none is given.
pub const DEFAULT_POLYPHASE_WINDOW: WindowSpec = WindowSpec::Kaiser { beta: 5.0 };

/// Source of the anti-aliasing filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PolyphaseFilter<'a> {
    /// Design a lowpass with the given window.
    Design(WindowSpec),
    /// Use these taps as-is; their center is taken as the filter delay.
    Taps(&'a [f64]),
}

/// Resample `x` by `up / down` with a designed filter.
///
/// The window comes from `opts.window`, defaulting to Kaiser with beta 5.
/// Output length is `ceil(N * up / down)`.
pub fn resample_poly<T: Sample>(x: &[T], up: usize, down: usize, opts: &SignalOptions) -> DspResult<Vec<T>> {
    let window = opts.window.unwrap_or(DEFAULT_POLYPHASE_WINDOW);
    resample_poly_with(x, up, down, PolyphaseFilter::Design(window), &WindowedSinc, opts)
}

/// Resample `x` by `up / down` with an explicit filter source and designer.
pub fn resample_poly_with<T: Sample>(
    x: &[T],
    up: usize,
    down: usize,
    filter: PolyphaseFilter<'_>,
    designer: &dyn FilterDesigner,
    opts: &SignalOptions,
) -> DspResult<Vec<T>> {
    ensure_non_empty(x.len(), "signal")?;
    let factors = ResampleFactors::new(up, down)?.reduced();
    if let PolyphaseFilter::Taps(taps) = filter {
        ensure_non_empty(taps.len(), "filter")?;
    }

    if factors.is_identity() {
        return Ok(x.to_vec());
    }

    let ResampleFactors { up, down } = factors;
    let n_out = factors.resampled_len(x.len());

    let (taps, half_len) = match filter {
        PolyphaseFilter::Design(window) => {
            let max_rate = up.max(down);
            let half_len = 10 * max_rate;
            let taps = designer.design_lowpass(2 * half_len + 1, 1.0 / max_rate as f64, window)?;
            (taps, half_len)
        }
        PolyphaseFilter::Taps(taps) => (taps.to_vec(), (taps.len() - 1) / 2),
    };

    // Pad the front so the filter center lands on an output sample, and the
    // back until enough outputs exist to cover the trimmed range.
    let n_pre_pad = down - half_len % down;
    let n_pre_remove = (half_len + n_pre_pad) / down;
    let mut n_post_pad = 0;
    while factors.upfirdn_len(x.len(), taps.len() + n_pre_pad + n_post_pad) < n_out + n_pre_remove {
        n_post_pad += 1;
    }

    let gain = up as f64;
    let mut padded = vec![0.0; n_pre_pad];
    padded.extend(taps.iter().map(|&t| t * gain));
    padded.resize(padded.len() + n_post_pad, 0.0);

    tracing::debug!(
        "resample_poly: n={} up={} down={} taps={} pre_pad={} post_pad={}",
        x.len(),
        up,
        down,
        taps.len(),
        n_pre_pad,
        n_post_pad
    );

    let h: Vec<T> = from_f64_slice(&padded);
    let y = UpFirDn::new(&h, up, down, opts.use_specialized_kernel)?.apply(x)?;

    Ok(y[n_pre_remove..n_pre_remove + n_out].to_vec())
}
