//! Window functions for filter design and spectral tapering.
//!
//! Symmetric windows are used when truncating an ideal impulse response;
//! periodic windows (one sample longer, last sample dropped) are used when
//! tapering a spectrum.

use crate::fft::ifftshift;
use lib_types::WindowSpec;
use std::f64::consts::PI;

/// Compute the zeroth-order modified Bessel function of the first kind, I_0(x).
///
/// Sums the power series `sum_k ((x/2)^k / k!)^2` until terms stop
/// contributing at double precision.
pub(crate) fn bessel_i0(x: f64) -> f64 {
    let half = x.abs() / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    let mut k = 1.0;
    while term > sum * 1e-17 {
        let ratio = half / k;
        term *= ratio * ratio;
        sum += term;
        k += 1.0;
    }
    sum
}

/// Generate symmetric window coefficients for a given window and length.
///
/// # Arguments
///
/// * `window` - Window family
/// * `length` - Number of points in the window
///
/// # Returns
///
/// Vector of window coefficients, length `length`. The first and last
/// coefficients are equal.
pub fn generate_window(window: WindowSpec, length: usize) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let n = length as f64;

    match window {
        WindowSpec::Boxcar => vec![1.0; length],

        WindowSpec::Hann => (0..length)
            .map(|i| {
                let x = i as f64 / (n - 1.0);
                0.5 * (1.0 - (2.0 * PI * x).cos())
            })
            .collect(),

        WindowSpec::Hamming => (0..length)
            .map(|i| {
                let x = i as f64 / (n - 1.0);
                0.54 - 0.46 * (2.0 * PI * x).cos()
            })
            .collect(),

        WindowSpec::Blackman => (0..length)
            .map(|i| {
                let x = i as f64 / (n - 1.0);
                // Clamp rounding noise at the endpoints
                (0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()).max(0.0)
            })
            .collect(),

        WindowSpec::Kaiser { beta } => {
            let denom = bessel_i0(beta);
            (0..length)
                .map(|i| {
                    let x = 2.0 * i as f64 / (n - 1.0) - 1.0; // Range [-1, 1]
                    let arg = beta * (1.0 - x * x).max(0.0).sqrt();
                    bessel_i0(arg) / denom
                })
                .collect()
        }
    }
}

/// Periodic window: the symmetric window of `length + 1` points without its
/// last point. Suited to DFT-domain use.
pub fn periodic_window(window: WindowSpec, length: usize) -> Vec<f64> {
    if length <= 1 {
        return generate_window(window, length);
    }
    let mut w = generate_window(window, length + 1);
    w.truncate(length);
    w
}

/// Per-bin weights for tapering the spectrum of an `nx`-point signal.
///
/// The periodic window is rotated so its center lands on the zero-frequency
/// bin. For real input only the first `nx / 2 + 1` weights are used; each
/// positive-frequency weight is then averaged with its negative-frequency
/// mirror so the taper stays symmetric.
pub fn spectral_taper(window: WindowSpec, nx: usize, real_input: bool) -> Vec<f64> {
    let mut w = ifftshift(&periodic_window(window, nx));
    if real_input && nx > 1 {
        let mirrored: Vec<f64> = w.clone();
        for i in 1..nx {
            w[i] = 0.5 * (mirrored[i] + mirrored[nx - i]);
        }
        w.truncate(nx / 2 + 1);
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bessel_i0() {
        // I_0(0) = 1
        assert!((bessel_i0(0.0) - 1.0).abs() < 1e-15);

        // I_0(1) = 1.2660658777520082
        assert!((bessel_i0(1.0) - 1.2660658777520082).abs() < 1e-14);

        // I_0(5) = 27.239871823604442
        assert!((bessel_i0(5.0) - 27.239871823604442).abs() < 1e-11);

        // Symmetry: I_0(-x) = I_0(x)
        assert!((bessel_i0(-2.0) - bessel_i0(2.0)).abs() < 1e-15);
    }

    #[test]
    fn test_boxcar_window() {
        let window = generate_window(WindowSpec::Boxcar, 10);
        assert_eq!(window.len(), 10);
        assert!(window.iter().all(|&w| (w - 1.0).abs() < 1e-15));
    }

    #[test]
    fn test_hann_window() {
        let window = generate_window(WindowSpec::Hann, 5);
        let expected = [0.0, 0.5, 1.0, 0.5, 0.0];
        for (w, e) in window.iter().zip(expected.iter()) {
            assert!((w - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hamming_endpoints() {
        let window = generate_window(WindowSpec::Hamming, 21);
        assert!((window[0] - 0.08).abs() < 1e-12);
        assert!((window[20] - 0.08).abs() < 1e-12);
        assert!((window[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_kaiser_window() {
        let window = generate_window(WindowSpec::Kaiser { beta: 6.0 }, 65);

        // Peak at center, tapered edges
        assert!((window[32] - 1.0).abs() < 1e-12);
        assert!((window[0] - 1.0 / bessel_i0(6.0)).abs() < 1e-12);

        for i in 0..32 {
            assert!(
                (window[i] - window[64 - i]).abs() < 1e-12,
                "Asymmetry at index {}: {} vs {}",
                i,
                window[i],
                window[64 - i]
            );
        }
    }

    #[test]
    fn test_periodic_window() {
        let window = periodic_window(WindowSpec::Hann, 4);
        let expected = [0.0, 0.5, 1.0, 0.5];
        for (w, e) in window.iter().zip(expected.iter()) {
            assert!((w - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_spectral_taper() {
        // Periodic Hann of 4 = [0, .5, 1, .5]; centered -> [1, .5, 0, .5]
        let full = spectral_taper(WindowSpec::Hann, 4, false);
        let expected = [1.0, 0.5, 0.0, 0.5];
        for (w, e) in full.iter().zip(expected.iter()) {
            assert!((w - e).abs() < 1e-12);
        }

        let half = spectral_taper(WindowSpec::Hann, 4, true);
        assert_eq!(half.len(), 3);
        let expected = [1.0, 0.5, 0.0];
        for (w, e) in half.iter().zip(expected.iter()) {
            assert!((w - e).abs() < 1e-12);
        }
    }
}
