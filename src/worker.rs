use crate::{
    belt::Belt,
    chart::AssemblyStateChart,
    sync::{Mutex, MutexGuard, try_lock},
    types::Slot,
    utils::WrappingPredecessor,
};
use core::fmt;
use derive_more::Add;
use tracing::trace;

/// Result of one worker round.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The tracked index left the belt; the worker's run is over.
    Finished,
    /// The slot already carried a committed mutation for its occupancy.
    Skipped {
        /// Slot index visited.
        index: u16,
    },
    /// No transition applied to the slot.
    Idle {
        /// Slot index visited.
        index: u16,
    },
    /// The draft was published and the chart transition kept.
    Committed {
        /// Slot index visited.
        index: u16,
    },
    /// The draft was discarded and the chart restored.
    RolledBack {
        /// Slot index visited.
        index: u16,
        /// Why the publish did not happen.
        cause: RollbackCause,
    },
}

/// Reason a worker discarded its tentative transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RollbackCause {
    /// Another agent committed to the slot while the draft was prepared.
    AlreadyHandled,
    /// The partner worker held the pair gate.
    GateBusy,
}

/// Per-worker round counters.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Add)]
pub struct WorkerStats {
    /// Rounds processed, terminal round excluded.
    pub rounds: u64,
    /// Drafts published to the belt.
    pub commits: u64,
    /// Drafts discarded.
    pub rollbacks: u64,
    /// Rounds skipped because the slot was already handled.
    pub skips: u64,
    /// Rounds where no transition applied.
    pub idle: u64,
}

/// An execution agent walking the belt in lockstep with the feeder.
///
/// Each round it moves to the position after its last one, runs its own
/// [`AssemblyStateChart`] against a private copy of that slot and tries to
/// publish the copy optimistically.
#[must_use]
#[derive(Debug, Clone)]
pub struct Worker {
    last_index: u16,
    chart: AssemblyStateChart,
    stats: WorkerStats,
}

impl Worker {
    /// A worker whose first round visits the position after `start_index`.
    pub fn new(start_index: u16) -> Self {
        Self {
            last_index: start_index,
            chart: AssemblyStateChart::new(),
            stats: WorkerStats::default(),
        }
    }

    /// Index visited by the most recent round.
    #[inline]
    #[must_use]
    pub fn last_index(&self) -> u16 {
        self.last_index
    }

    /// The worker's own state chart.
    #[inline]
    pub fn chart(&self) -> &AssemblyStateChart {
        &self.chart
    }

    /// Round counters.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        self.stats
    }

    /// See [`AssemblyStateChart::holds_unfinished_product`].
    #[inline]
    #[must_use]
    pub fn holds_unfinished_product(&self) -> bool {
        self.chart.holds_unfinished_product()
    }

    /// Performs one round against `belt`, arbitrating the publish through `gate`.
    ///
    /// The live slot is re-read before taking the gate and again while holding
    /// it; a draft is published only if neither read shows the slot as handled.
    /// Losing either check rolls the chart back to its pre-round value.
    pub fn process_round(&mut self, belt: &Belt, gate: &PairGate) -> RoundOutcome {
        let Some(index) = self.advance(belt.len()) else {
            return RoundOutcome::Finished;
        };
        self.stats.rounds += 1;

        let mut draft = belt.read(index);
        let outcome = if draft.is_handled() {
            self.stats.skips += 1;
            RoundOutcome::Skipped { index }
        } else if !self.chart.process(&mut draft) {
            self.stats.idle += 1;
            RoundOutcome::Idle { index }
        } else {
            match Self::publish(belt, gate, index, draft) {
                Ok(()) => {
                    self.chart.commit();
                    self.stats.commits += 1;
                    RoundOutcome::Committed { index }
                }
                Err(cause) => {
                    self.chart.rollback();
                    self.stats.rollbacks += 1;
                    RoundOutcome::RolledBack { index, cause }
                }
            }
        };
        trace!(index, ?outcome, state = ?self.chart.state(), "worker round");
        outcome
    }

    fn advance(&mut self, len: u16) -> Option<u16> {
        if self.last_index >= len {
            return None;
        }
        self.last_index = self.last_index.wrapping_pred(len);
        Some(self.last_index)
    }

    fn publish(
        belt: &Belt,
        gate: &PairGate,
        index: u16,
        draft: Slot,
    ) -> Result<(), RollbackCause> {
        if belt.read(index).is_handled() {
            return Err(RollbackCause::AlreadyHandled);
        }
        let guard = gate.try_acquire().ok_or(RollbackCause::GateBusy)?;
        if belt.read(index).is_handled() {
            return Err(RollbackCause::AlreadyHandled);
        }
        belt.write(index, draft);
        guard.release();
        Ok(())
    }
}

/// Non-blocking arbitration gate shared by the two workers of a pair.
///
/// Only ever tried, never waited on: a worker that finds it taken rolls back.
pub struct PairGate {
    lock: Mutex<()>,
}

/// Proof of holding a [`PairGate`]; released on drop.
#[must_use]
pub struct GateGuard<'a>(#[allow(dead_code)] MutexGuard<'a, ()>);

impl PairGate {
    /// An unheld gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    /// Takes the gate if nobody holds it.
    #[inline]
    pub fn try_acquire(&self) -> Option<GateGuard<'_>> {
        try_lock(&self.lock).map(GateGuard)
    }
}

impl Default for PairGate {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PairGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairGate").finish_non_exhaustive()
    }
}

impl GateGuard<'_> {
    /// Releases the gate. Dropping the guard has the same effect.
    #[inline]
    pub fn release(self) {}
}

/// Two workers sharing a starting offset, and so always racing for the same
/// slot in the same round, plus the gate arbitrating their publishes.
#[must_use]
#[derive(Debug)]
pub struct WorkerPair {
    gate: PairGate,
    workers: [Worker; 2],
}

impl WorkerPair {
    /// A pair whose workers both start at `start_index`.
    pub fn new(start_index: u16) -> Self {
        Self {
            gate: PairGate::new(),
            workers: [Worker::new(start_index), Worker::new(start_index)],
        }
    }

    /// The pair's arbitration gate.
    #[inline]
    #[must_use]
    pub fn gate(&self) -> &PairGate {
        &self.gate
    }

    /// Both workers.
    #[inline]
    pub fn workers(&self) -> &[Worker; 2] {
        &self.workers
    }

    /// Shared gate and exclusive workers, for driving the pair from two threads.
    #[inline]
    pub fn split_mut(&mut self) -> (&PairGate, &mut [Worker; 2]) {
        let Self { gate, workers } = self;
        (gate, workers)
    }

    /// Number of the pair's workers midway through a product.
    #[must_use]
    pub fn unfinished_products(&self) -> usize {
        self.workers
            .iter()
            .filter(|worker| worker.holds_unfinished_product())
            .count()
    }
}
