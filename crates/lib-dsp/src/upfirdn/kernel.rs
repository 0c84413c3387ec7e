//! Output-to-input index mapping for the fused kernel.
//!
//! Output `n` of an upsample-by-L, downsample-by-M operation reads filter
//! phase `(n*M) mod L` against input samples ending at `(n*M) div L`. The
//! generic form computes this per output; the specialized form precomputes
//! it over one period of the index pattern.

use crate::config::engine_config;
use crate::sample::Sample;
use crate::upfirdn::phase::{phase_dot, PhaseTable};
use lib_types::gcd;
use rayon::prelude::*;
use std::any::TypeId;
use std::sync::Arc;

/// Maps an output index to `(filter phase, last input index)`.
pub trait PhaseIndexer: Send + Sync {
    fn locate(&self, n: usize) -> (usize, usize);
}

/// Runtime index computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenericKernel {
    up: usize,
    down: usize,
}

impl GenericKernel {
    pub fn new(up: usize, down: usize) -> Self {
        Self { up, down }
    }
}

impl PhaseIndexer for GenericKernel {
    #[inline]
    fn locate(&self, n: usize) -> (usize, usize) {
        let t = n * self.down;
        (t % self.up, t / self.up)
    }
}

/// Shape parameters a specialized kernel is compiled for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KernelKey {
    pub up: usize,
    pub down: usize,
    pub taps: usize,
    pub element: TypeId,
}

impl KernelKey {
    pub fn new<T: Sample>(up: usize, down: usize, taps: usize) -> Self {
        Self {
            up,
            down,
            taps,
            element: TypeId::of::<T>(),
        }
    }
}

/// Index plan precomputed for one [`KernelKey`].
///
/// The pattern of phases repeats every `period = L / gcd(L, M)` outputs,
/// during which the input position advances by `M / gcd(L, M)`.
#[derive(Clone, Debug)]
pub struct SpecializedKernel {
    key: KernelKey,
    period: usize,
    advance: usize,
    taps_per_phase: usize,
    phases: Vec<usize>,
    offsets: Vec<usize>,
}

impl SpecializedKernel {
    /// Build the per-residue phase and offset tables.
    pub fn compile(key: KernelKey) -> Self {
        let g = gcd(key.up, key.down);
        let period = key.up / g;
        let advance = key.down / g;

        let (phases, offsets) = (0..period)
            .map(|r| {
                let t = r * key.down;
                (t % key.up, t / key.up)
            })
            .unzip();

        Self {
            key,
            period,
            advance,
            taps_per_phase: key.taps.div_ceil(key.up),
            phases,
            offsets,
        }
    }

    pub fn key(&self) -> KernelKey {
        self.key
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn taps_per_phase(&self) -> usize {
        self.taps_per_phase
    }
}

impl PhaseIndexer for SpecializedKernel {
    #[inline]
    fn locate(&self, n: usize) -> (usize, usize) {
        let q = n / self.period;
        let r = n % self.period;
        (self.phases[r], q * self.advance + self.offsets[r])
    }
}

/// The kernel form chosen for a call.
#[derive(Clone, Debug)]
pub enum KernelForm {
    Generic(GenericKernel),
    Specialized(Arc<SpecializedKernel>),
}

impl PhaseIndexer for KernelForm {
    #[inline]
    fn locate(&self, n: usize) -> (usize, usize) {
        match self {
            KernelForm::Generic(k) => k.locate(n),
            KernelForm::Specialized(k) => k.locate(n),
        }
    }
}

/// Evaluate `out_len` outputs of the fused kernel.
pub(crate) fn run_kernel<T: Sample, I: PhaseIndexer>(
    indexer: &I,
    table: &PhaseTable<T>,
    x: &[T],
    out_len: usize,
) -> Vec<T> {
    let output = |n: usize| {
        let (phase, i) = indexer.locate(n);
        phase_dot(table.phase(phase), x, i)
    };

    if engine_config().is_parallel(out_len * table.taps_per_phase()) {
        (0..out_len).into_par_iter().map(output).collect()
    } else {
        (0..out_len).map(output).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_locate() {
        let k = GenericKernel::new(3, 7);
        assert_eq!(k.locate(0), (0, 0));
        assert_eq!(k.locate(1), (1, 2));
        assert_eq!(k.locate(2), (2, 4));
        assert_eq!(k.locate(3), (0, 7));
    }

    #[test]
    fn test_specialized_matches_generic() {
        for &(up, down) in &[(1, 1), (2, 1), (3, 7), (6, 4), (5, 3), (1, 9), (7, 9), (4, 6)] {
            let generic = GenericKernel::new(up, down);
            let special = SpecializedKernel::compile(KernelKey::new::<f64>(up, down, 11));
            for n in 0..200 {
                assert_eq!(
                    generic.locate(n),
                    special.locate(n),
                    "up={} down={} n={}",
                    up,
                    down,
                    n
                );
            }
        }
    }

    #[test]
    fn test_specialized_period() {
        let k = SpecializedKernel::compile(KernelKey::new::<f32>(6, 4, 25));
        assert_eq!(k.period(), 3);
        assert_eq!(k.taps_per_phase(), 5);
        assert_ne!(k.key(), KernelKey::new::<f64>(6, 4, 25));
    }
}
