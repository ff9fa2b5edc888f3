//! Store configuration.

use serde::Deserialize;

/// Default per-collection cache capacity, in entries.
pub const DEFAULT_CACHE_SIZE: usize = 50_000;

/// Configuration for a consensus store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Capacity of each bounded collection, in entries.
    ///
    /// Applies per collection: the event cache, the two round caches, the
    /// block and frame caches, each participant's event window, and the
    /// consensus window each retain up to this many entries. Must be
    /// positive; constructors reject zero.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Whether a reset also clears derived state: the block cache, the frame
    /// cache, and the last-consensus-event map. Disable to retain them
    /// across resets.
    #[serde(default = "default_clear_derived")]
    pub clear_derived_on_reset: bool,
}

impl StoreConfig {
    /// Config with the given capacity and default policies.
    pub fn with_cache_size(cache_size: usize) -> Self {
        Self {
            cache_size,
            ..Self::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            clear_derived_on_reset: true,
        }
    }
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_clear_derived() -> bool {
    true
}
