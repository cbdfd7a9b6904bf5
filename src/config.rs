/// Seed used by [`ProductionConfig::default`].
pub const DEFAULT_SEED: u64 = 0x00C0_FFEE;

/// Shape of a production line.
///
/// Pair `p` starts at belt offset `p`, so with `pair_count <= slot_count` no two
/// pairs ever target the same slot within one round.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionConfig {
    /// Number of belt slots.
    pub slot_count: u16,
    /// Number of worker pairs (two worker threads each).
    pub pair_count: u16,
    /// Seed for [`crate::feed::RandomFeed`].
    pub seed: u64,
}

impl ProductionConfig {
    /// A line of `slot_count` slots served by `pair_count` worker pairs.
    pub const fn new(slot_count: u16, pair_count: u16) -> Self {
        Self {
            slot_count,
            pair_count,
            seed: DEFAULT_SEED,
        }
    }

    /// Replaces the random feed seed.
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Total number of worker threads.
    #[must_use]
    pub const fn worker_count(&self) -> usize {
        self.pair_count as usize * 2
    }
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self::new(3, 3)
    }
}
