use core::sync::atomic::{AtomicBool, Ordering};

static MULTITHREAD_ENABLED: AtomicBool = AtomicBool::new(true);

pub fn is_multithread_enabled() -> bool {
    MULTITHREAD_ENABLED.load(Ordering::Relaxed)
}

pub fn set_multithread_enabled(val: bool) {
    MULTITHREAD_ENABLED.store(val, Ordering::Relaxed)
}

/// Post-processing of a cover that drops redundant generators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shrink {
    #[default]
    Off,
    Forward,
    Backward,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionConfig {
    /// Kernels with at most this many vectors are covered greedily,
    /// larger ones with the fast single-pass cover.
    pub greedy_limit: usize,
    pub shrink: Shrink,
    /// Upper bound on the ℤ-rank of a node's domain.
    pub max_rank: Option<usize>,
    /// Upper bound on the bit length of kernel entries.
    pub max_bits: Option<u64>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            greedy_limit: 50,
            shrink: Shrink::Off,
            max_rank: None,
            max_bits: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    pub peek_dim: usize,
    pub verbose: bool,
    pub resolution: ResolutionConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            peek_dim: 4,
            verbose: false,
            resolution: ResolutionConfig::default(),
        }
    }
}
