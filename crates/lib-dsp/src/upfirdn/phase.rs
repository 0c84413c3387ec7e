//! Polyphase decomposition of a filter.

use crate::sample::Sample;

/// Filter taps split into `up` interleaved sub-filters.
///
/// Row `p` holds `h[p], h[p + up], h[p + 2*up], ...`, zero-padded to
/// `taps_per_phase` and stored reversed so that a sub-filter lines up with
/// an ascending slice of the input.
#[derive(Clone, Debug)]
pub struct PhaseTable<T> {
    taps_per_phase: usize,
    coeffs: Vec<T>,
}

impl<T: Sample> PhaseTable<T> {
    /// Decompose `h` for an upsampling factor of `up` (> 0).
    pub fn new(h: &[T], up: usize) -> Self {
        let taps_per_phase = h.len().div_ceil(up);
        let mut coeffs = vec![T::zero(); up * taps_per_phase];

        for (k, &tap) in h.iter().enumerate() {
            let phase = k % up;
            let j = k / up;
            coeffs[phase * taps_per_phase + (taps_per_phase - 1 - j)] = tap;
        }

        Self {
            taps_per_phase,
            coeffs,
        }
    }

    #[inline]
    pub fn taps_per_phase(&self) -> usize {
        self.taps_per_phase
    }

    /// Reversed sub-filter for `phase`.
    #[inline]
    pub fn phase(&self, phase: usize) -> &[T] {
        let start = phase * self.taps_per_phase;
        &self.coeffs[start..start + self.taps_per_phase]
    }
}

/// Dot product of a reversed sub-filter with the input samples ending at
/// `input_index`; samples outside `x` count as zero.
///
/// Both kernel forms evaluate outputs through this routine, so they agree
/// bit for bit.
#[inline]
pub(crate) fn phase_dot<T: Sample>(row: &[T], x: &[T], input_index: usize) -> T {
    let taps = row.len() as isize;
    let n = x.len() as isize;
    let start = input_index as isize + 1 - taps;

    let k_lo = (-start).max(0);
    let k_hi = taps.min(n - start);
    if k_lo >= k_hi {
        return T::zero();
    }

    let coeffs = &row[k_lo as usize..k_hi as usize];
    let samples = &x[(start + k_lo) as usize..(start + k_hi) as usize];

    let mut acc = T::zero();
    for (&c, &s) in coeffs.iter().zip(samples.iter()) {
        acc += c * s;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_rows_reversed_and_padded() {
        let h = [1.0, 2.0, 3.0, 4.0, 5.0];
        let table = PhaseTable::new(&h, 2);
        assert_eq!(table.taps_per_phase(), 3);
        // phase 0: h[0], h[2], h[4] reversed
        assert_eq!(table.phase(0), &[5.0, 3.0, 1.0]);
        // phase 1: h[1], h[3], pad reversed
        assert_eq!(table.phase(1), &[0.0, 4.0, 2.0]);
    }

    #[test]
    fn test_phase_dot_edges() {
        let row = [3.0, 2.0, 1.0]; // h = [1, 2, 3]
        let x = [1.0, 10.0, 100.0];

        // y[0] = h0*x0
        assert_eq!(phase_dot(&row, &x, 0), 1.0);
        // y[2] = h0*x2 + h1*x1 + h2*x0
        assert_eq!(phase_dot(&row, &x, 2), 100.0 + 20.0 + 3.0);
        // Tail: only h2*x2 remains
        assert_eq!(phase_dot(&row, &x, 4), 300.0);
        assert_eq!(phase_dot(&row, &x, 5), 0.0);
    }

    #[test]
    fn test_filter_longer_than_signal() {
        let h: Vec<f64> = (1..=6).map(|v| v as f64).collect();
        let table = PhaseTable::new(&h, 1);
        let x = [1.0, 1.0];
        // Full convolution of h with [1, 1]
        let y: Vec<f64> = (0..7).map(|i| phase_dot(table.phase(0), &x, i)).collect();
        assert_eq!(y, vec![1.0, 3.0, 5.0, 7.0, 9.0, 11.0, 6.0]);
    }
}
