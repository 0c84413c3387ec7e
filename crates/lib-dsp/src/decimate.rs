//! Anti-aliased integer downsampling.
//!
//! The signal is lowpass filtered and every `q`-th sample kept. Filtering
//! is either causal (FIR through the fused upfirdn kernel, IIR through a
//! transposed direct-form II recursion) or zero-phase (forward-backward
//! filtering with odd-extension padding and steady-state initial
//! conditions).

use crate::convolution::convolve;
use crate::error::{ensure_non_empty, DspError, DspResult};
use crate::firdes::firwin;
use crate::sample::{from_f64_slice, Sample};
use crate::upfirdn::UpFirDn;
use lib_types::{Mode, SignalOptions, WindowSpec};

/// Lowpass filter applied before downsampling.
#[derive(Clone, Debug, PartialEq)]
pub enum AntiAliasFilter {
    /// Finite impulse response taps.
    Fir(Vec<f64>),
    /// Rational transfer function `b(z) / a(z)`.
    Iir { b: Vec<f64>, a: Vec<f64> },
}

impl AntiAliasFilter {
    /// Hamming-windowed FIR of `20q + 1` taps with cutoff `1/q` of Nyquist.
    pub fn default_fir(q: usize) -> DspResult<Self> {
        ensure_factor(q)?;
        let half_len = 10 * q;
        Ok(Self::Fir(firwin(2 * half_len + 1, 1.0 / q as f64, WindowSpec::Hamming)?))
    }

    /// Numerator and denominator coefficients.
    pub fn coefficients(&self) -> (&[f64], &[f64]) {
        match self {
            Self::Fir(b) => (b.as_slice(), &[1.0][..]),
            Self::Iir { b, a } => (b.as_slice(), a.as_slice()),
        }
    }

    fn is_fir(&self) -> bool {
        matches!(self, Self::Fir(_))
    }
}

fn ensure_factor(q: usize) -> DspResult<()> {
    if q == 0 {
        return Err(DspError::invalid_parameter("q", "downsampling factor must be positive"));
    }
    Ok(())
}

/// Downsample `x` by `q` after the default FIR anti-aliasing filter.
///
/// `opts.zero_phase` (default true) selects forward-backward filtering;
/// `opts.method` is used for its convolutions. A factor of 1 returns a copy.
pub fn decimate<T: Sample>(x: &[T], q: usize, opts: &SignalOptions) -> DspResult<Vec<T>> {
    ensure_non_empty(x.len(), "signal")?;
    ensure_factor(q)?;
    if q == 1 {
        return Ok(x.to_vec());
    }
    decimate_with(x, q, &AntiAliasFilter::default_fir(q)?, opts)
}

/// Downsample `x` by `q` after the given anti-aliasing filter.
///
/// Output length is `ceil(N / q)`.
pub fn decimate_with<T: Sample>(x: &[T], q: usize, filter: &AntiAliasFilter, opts: &SignalOptions) -> DspResult<Vec<T>> {
    ensure_non_empty(x.len(), "signal")?;
    ensure_factor(q)?;
    let (b, a) = filter.coefficients();
    check_coefficients(b, a)?;

    let n_out = x.len().div_ceil(q);
    tracing::debug!(
        "decimate: n={} q={} fir={} taps={} zero_phase={}",
        x.len(),
        q,
        filter.is_fir(),
        b.len(),
        opts.zero_phase
    );

    if opts.zero_phase {
        let y = filtfilt(b, a, x, opts)?;
        return Ok(y.into_iter().step_by(q).collect());
    }

    if filter.is_fir() {
        let h: Vec<T> = from_f64_slice(b);
        let mut y = UpFirDn::new(&h, 1, q, opts.use_specialized_kernel)?.apply(x)?;
        y.truncate(n_out);
        Ok(y)
    } else {
        let y = lfilter(b, a, x, None)?;
        Ok(y.into_iter().step_by(q).collect())
    }
}

fn check_coefficients(b: &[f64], a: &[f64]) -> DspResult<()> {
    ensure_non_empty(b.len(), "numerator")?;
    match a.first() {
        None => Err(DspError::invalid_parameter("a", "denominator must not be empty")),
        Some(&a0) if a0 == 0.0 => Err(DspError::invalid_parameter("a", "leading denominator coefficient is zero")),
        Some(_) => Ok(()),
    }
}

/// Coefficients divided by `a[0]` and zero-padded to a common length.
fn normalized(b: &[f64], a: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let order = b.len().max(a.len());
    let a0 = a[0];
    let mut bn: Vec<f64> = b.iter().map(|v| v / a0).collect();
    let mut an: Vec<f64> = a.iter().map(|v| v / a0).collect();
    bn.resize(order, 0.0);
    an.resize(order, 0.0);
    (bn, an)
}

/// Filter `x` with the transfer function `b(z) / a(z)`.
///
/// `zi` gives the initial delay-line state (`max(len(a), len(b)) - 1`
/// values); zero state when `None`.
pub fn lfilter<T: Sample>(b: &[f64], a: &[f64], x: &[T], zi: Option<&[T]>) -> DspResult<Vec<T>> {
    check_coefficients(b, a)?;
    let (bn, an) = normalized(b, a);
    let order = bn.len();

    let mut state: Vec<T> = match zi {
        Some(zi) if zi.len() == order - 1 => zi.to_vec(),
        Some(zi) => {
            return Err(DspError::invalid_shape(format!(
                "initial state needs {} values, got {}",
                order - 1,
                zi.len()
            )));
        }
        None => vec![T::zero(); order - 1],
    };

    let bn: Vec<T::Real> = from_f64_slice(&bn);
    let an: Vec<T::Real> = from_f64_slice(&an);

    let mut y = Vec::with_capacity(x.len());
    for &sample in x {
        let out = sample.scale(bn[0]) + state.first().copied().unwrap_or_else(T::zero);
        for i in 0..order.saturating_sub(1) {
            let next = if i + 1 < order - 1 { state[i + 1] } else { T::zero() };
            state[i] = sample.scale(bn[i + 1]) - out.scale(an[i + 1]) + next;
        }
        y.push(out);
    }
    Ok(y)
}

/// Initial state giving the steady-state response to a unit step.
pub fn lfilter_zi(b: &[f64], a: &[f64]) -> DspResult<Vec<f64>> {
    check_coefficients(b, a)?;
    let (bn, an) = normalized(b, a);

    let a_sum: f64 = an.iter().sum();
    if a_sum == 0.0 {
        return Err(DspError::invalid_parameter("a", "filter has a pole at z = 1"));
    }
    let dc_gain = bn.iter().sum::<f64>() / a_sum;

    // z[i] = sum_{k > i} (b[k] - a[k] * dc_gain)
    let mut zi = vec![0.0; bn.len() - 1];
    let mut acc = 0.0;
    for k in (1..bn.len()).rev() {
        acc += bn[k] - an[k] * dc_gain;
        zi[k - 1] = acc;
    }
    Ok(zi)
}

/// Odd extension: `n` samples reflected through each end point.
fn odd_extension<T: Sample>(x: &[T], n: usize) -> Vec<T> {
    let len = x.len();
    let two = <T::Real as Sample>::from_scalar(2.0);
    let first = x[0].scale(two);
    let last = x[len - 1].scale(two);

    let mut ext = Vec::with_capacity(len + 2 * n);
    ext.extend((1..=n).rev().map(|i| first - x[i]));
    ext.extend_from_slice(x);
    ext.extend((1..=n).map(|i| last - x[len - 1 - i]));
    ext
}

/// Zero-phase filtering: forward, then backward, through `b(z) / a(z)`.
///
/// The input is padded by odd extension of `3 * max(len(a), len(b))`
/// samples at each end and both passes start from the steady state of
/// their first sample. FIR passes use [`convolve`] with `opts.method`.
pub fn filtfilt<T: Sample>(b: &[f64], a: &[f64], x: &[T], opts: &SignalOptions) -> DspResult<Vec<T>> {
    check_coefficients(b, a)?;
    ensure_non_empty(x.len(), "signal")?;

    let padlen = 3 * b.len().max(a.len());
    if x.len() <= padlen {
        return Err(DspError::invalid_shape(format!(
            "zero-phase filtering needs more than {} samples, got {}",
            padlen,
            x.len()
        )));
    }

    let zi = lfilter_zi(b, a)?;
    let fir = a.len() == 1;
    let pass = |signal: &[T]| -> DspResult<Vec<T>> {
        let x0 = signal[0];
        let state: Vec<T> = zi
            .iter()
            .map(|&z| x0.scale(<T::Real as Sample>::from_scalar(z)))
            .collect();
        if fir {
            fir_pass(b, a[0], signal, &state, opts)
        } else {
            lfilter(b, a, signal, Some(&state))
        }
    };

    let ext = odd_extension(x, padlen);
    let mut y = pass(&ext)?;
    y.reverse();
    let mut y = pass(&y)?;
    y.reverse();

    Ok(y[padlen..padlen + x.len()].to_vec())
}

/// FIR filtering with initial state via the convolution dispatcher.
fn fir_pass<T: Sample>(b: &[f64], a0: f64, x: &[T], state: &[T], opts: &SignalOptions) -> DspResult<Vec<T>> {
    let taps: Vec<f64> = b.iter().map(|v| v / a0).collect();
    let taps: Vec<T> = from_f64_slice(&taps);
    let full_opts = opts.clone().with_mode(Mode::Full);

    let mut y = convolve(x, &taps, &full_opts)?;
    y.truncate(x.len());
    for (out, &z) in y.iter_mut().zip(state.iter()) {
        *out += z;
    }
    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lib_types::Method;
    use num_complex::Complex64;
    use std::f64::consts::PI;

    #[test]
    fn test_default_fir_design() {
        match AntiAliasFilter::default_fir(4).unwrap() {
            AntiAliasFilter::Fir(b) => {
                assert_eq!(b.len(), 81);
                assert!((b.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lfilter_first_order() {
        let y = lfilter(&[0.5], &[1.0, -0.5], &[1.0, 0.0, 0.0, 0.0], None).unwrap();
        assert_eq!(y, vec![0.5, 0.25, 0.125, 0.0625]);

        // Leading coefficient is normalized away
        let y2 = lfilter(&[1.0], &[2.0, -1.0], &[1.0, 0.0, 0.0, 0.0], None).unwrap();
        assert_eq!(y, y2);
    }

    #[test]
    fn test_lfilter_fir_is_convolution() {
        let y = lfilter(&[1.0, 2.0, 3.0], &[1.0], &[1.0, 1.0, 1.0, 1.0], None).unwrap();
        assert_eq!(y, vec![1.0, 3.0, 6.0, 6.0]);
    }

    #[test]
    fn test_lfilter_zi_steady_state() {
        let b = [0.2, 0.3, 0.1];
        let a = [1.0, -0.6, 0.2];
        let zi = lfilter_zi(&b, &a).unwrap();
        let y = lfilter(&b, &a, &[1.0; 20], Some(&zi)).unwrap();
        let dc = b.iter().sum::<f64>() / a.iter().sum::<f64>();
        for v in y {
            assert!((v - dc).abs() < 1e-12);
        }
    }

    #[test]
    fn test_odd_extension() {
        let ext = odd_extension(&[1.0, 2.0, 4.0, 7.0], 2);
        assert_eq!(ext, vec![-2.0, 0.0, 1.0, 2.0, 4.0, 7.0, 10.0, 12.0]);
    }

    #[test]
    fn test_zero_phase_constant() {
        let x = vec![1.5f64; 400];
        let y = decimate(&x, 4, &SignalOptions::default()).unwrap();
        assert_eq!(y.len(), 100);
        for v in &y {
            assert!((v - 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_phase_has_no_delay() {
        let x: Vec<f64> = (0..2000).map(|i| (2.0 * PI * 0.002 * i as f64).sin()).collect();
        let y = decimate(&x, 4, &SignalOptions::default()).unwrap();
        assert_eq!(y.len(), 500);
        for k in 20..480 {
            assert!((y[k] - x[4 * k]).abs() < 1e-2, "k={}: {} vs {}", k, y[k], x[4 * k]);
        }
    }

    #[test]
    fn test_causal_fir_matches_filter_then_pick() {
        let x: Vec<f64> = (0..301).map(|i| ((i * 13) % 17) as f64).collect();
        let filter = AntiAliasFilter::default_fir(3).unwrap();
        let (b, a) = filter.coefficients();
        let opts = SignalOptions::default().with_zero_phase(false);

        let y = decimate_with(&x, 3, &filter, &opts).unwrap();
        let reference: Vec<f64> = lfilter(b, a, &x, None).unwrap().into_iter().step_by(3).collect();
        assert_eq!(y.len(), 101);
        for (p, r) in y.iter().zip(reference.iter()) {
            assert!((p - r).abs() < 1e-10);
        }
    }

    #[test]
    fn test_iir_paths() {
        let filter = AntiAliasFilter::Iir {
            b: vec![0.25, 0.25],
            a: vec![1.0, -0.5],
        };
        let x = vec![2.0f64; 100];

        let y = decimate_with(&x, 5, &filter, &SignalOptions::default()).unwrap();
        assert_eq!(y.len(), 20);
        for v in &y {
            assert!((v - 2.0).abs() < 1e-9);
        }

        let causal = decimate_with(&x, 5, &filter, &SignalOptions::default().with_zero_phase(false)).unwrap();
        assert_eq!(causal.len(), 20);
        assert!((causal[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fir_pass_honours_method() {
        let x: Vec<f64> = (0..500).map(|i| (i as f64 * 0.05).cos()).collect();
        let direct = decimate(&x, 2, &SignalOptions::default().with_method(Method::Direct)).unwrap();
        let fft = decimate(&x, 2, &SignalOptions::default().with_method(Method::Fft)).unwrap();
        for (a, b) in direct.iter().zip(fft.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_complex_signal() {
        let x = vec![Complex64::new(1.0, -2.0); 300];
        let y = decimate(&x, 3, &SignalOptions::default()).unwrap();
        assert_eq!(y.len(), 100);
        for v in &y {
            assert!((v - Complex64::new(1.0, -2.0)).norm() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_arguments() {
        let opts = SignalOptions::default();
        assert!(matches!(
            decimate(&[1.0; 100], 0, &opts),
            Err(DspError::InvalidParameter { .. })
        ));

        let bad = AntiAliasFilter::Iir {
            b: vec![1.0],
            a: vec![0.0, 1.0],
        };
        assert!(matches!(
            decimate_with(&[1.0; 100], 2, &bad, &opts),
            Err(DspError::InvalidParameter { .. })
        ));

        // 61 taps need more than 183 samples
        assert!(matches!(decimate(&[1.0; 150], 3, &opts), Err(DspError::InvalidShape(_))));
        assert_eq!(decimate(&[1.0; 150], 3, &opts.clone().with_zero_phase(false)).unwrap().len(), 50);
    }
}
