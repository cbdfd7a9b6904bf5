use crate::types::Component;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of raw values the feeder places on the belt, one per round.
pub trait ComponentFeed {
    /// Component for the next round, or `None` for an empty feed.
    fn next_component(&mut self) -> Option<Component>;
}

/// Uniform pick among nothing, A, B and C.
#[derive(Debug, Clone)]
pub struct RandomFeed {
    rng: ChaCha8Rng,
}

impl RandomFeed {
    /// Deterministic feed for `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ComponentFeed for RandomFeed {
    fn next_component(&mut self) -> Option<Component> {
        let pick = self.rng.gen_range(0..=Component::RAW.len());
        pick.checked_sub(1).map(|idx| Component::RAW[idx])
    }
}

/// Emits the same value every round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFeed(pub Option<Component>);

impl ComponentFeed for FixedFeed {
    fn next_component(&mut self) -> Option<Component> {
        self.0
    }
}

/// Emits a fixed sequence, then nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeed {
    script: Vec<Option<Component>>,
    cursor: usize,
}

impl ScriptedFeed {
    /// Feed replaying `script` once.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Option<Component>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            cursor: 0,
        }
    }
}

impl ComponentFeed for ScriptedFeed {
    fn next_component(&mut self) -> Option<Component> {
        let next = self.script.get(self.cursor).copied().flatten();
        self.cursor = self.cursor.saturating_add(1);
        next
    }
}
