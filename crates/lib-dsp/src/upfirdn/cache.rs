//! Process-wide cache of compiled specialized kernels.

use crate::upfirdn::kernel::{KernelKey, SpecializedKernel};
use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Slot = Arc<OnceCell<Arc<SpecializedKernel>>>;

/// Compiled kernels keyed by `(up, down, taps, element type)`.
///
/// Each key is compiled at most once: concurrent requesters for a key that
/// is being compiled wait on its cell and share the result.
pub struct KernelCache {
    kernels: DashMap<KernelKey, Slot>,
    compilations: AtomicUsize,
}

static KERNEL_CACHE: Lazy<KernelCache> = Lazy::new(KernelCache::new);

/// The shared cache used by the public operations.
pub fn kernel_cache() -> &'static KernelCache {
    &KERNEL_CACHE
}

impl KernelCache {
    pub fn new() -> Self {
        Self {
            kernels: DashMap::new(),
            compilations: AtomicUsize::new(0),
        }
    }

    /// Fetch the kernel for `key`, compiling it on first use.
    pub fn get_or_compile(&self, key: KernelKey) -> Arc<SpecializedKernel> {
        // Release the shard lock before compiling; waiters block on the cell.
        let slot: Slot = self
            .kernels
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .value()
            .clone();

        slot.get_or_init(|| {
            self.compilations.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                "Compiling upfirdn kernel: up={} down={} taps={}",
                key.up,
                key.down,
                key.taps
            );
            Arc::new(SpecializedKernel::compile(key))
        })
        .clone()
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Total compilations performed since creation.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Drop every cached kernel. Only for use between independent runs.
    pub fn clear(&self) {
        tracing::debug!("Clearing {} cached upfirdn kernels", self.kernels.len());
        self.kernels.clear();
    }
}

impl Default for KernelCache {
    fn default() -> Self {
        Self::new()
    }
}
