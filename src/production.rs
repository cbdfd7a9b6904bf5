mod rendezvous;
mod setup;

/// Errors returned while constructing or running a [`Production`].
pub use crate::production::setup::{ProductionError, ProductionSetupError};
use crate::{
    belt::Belt,
    config::ProductionConfig,
    feed::{ComponentFeed, RandomFeed},
    production::rendezvous::{Rendezvous, WorkerEnd, token_pair},
    sync::{AtomicBool, Ordering},
    types::Slot,
    utils::WrappingPredecessor,
    worker::{PairGate, RoundOutcome, Worker, WorkerPair, WorkerStats},
};
use derive_more::Debug;
use std::thread;
use tracing::{debug, error, info};

/// Outcome counters for slots retired by the feeder.
///
/// A slot is retired when the rotation comes back to it and the feeder is about
/// to overwrite a value it placed one lap earlier.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LapStats {
    /// Retired untouched without any component.
    pub empty_feeds: u64,
    /// Retired carrying a product.
    pub products_formed: u64,
    /// Retired still carrying a raw component.
    pub components_unhandled: u64,
    /// Retired empty after a worker picked its component up.
    pub components_consumed: u64,
}

impl LapStats {
    fn retire(&mut self, slot: Slot) {
        let counter = if slot.has_any_raw() {
            &mut self.components_unhandled
        } else if !slot.is_empty() {
            &mut self.products_formed
        } else if !slot.is_handled() {
            &mut self.empty_feeds
        } else {
            &mut self.components_consumed
        };
        *counter += 1;
    }

    /// Total number of retired slots.
    #[must_use]
    pub fn retired(&self) -> u64 {
        self.empty_feeds
            + self.products_formed
            + self.components_unhandled
            + self.components_consumed
    }
}

/// Conveyor production line: the belt, the worker pairs and the feeder.
///
/// `start` drives a round-synchronized simulation. Each round the feeder:
/// - draws one raw value from its [`ComponentFeed`],
/// - waits until every worker has finished the previous round,
/// - retires the outgoing value of the slot it is about to overwrite into
///   [`LapStats`] and writes the new value,
/// - releases every worker into the round.
///
/// Workers run on dedicated threads, one per seat of each pair, and are joined
/// before `start` returns.
#[must_use]
#[derive(Debug)]
pub struct Production<F = RandomFeed> {
    config: ProductionConfig,
    belt: Belt,
    pairs: Vec<WorkerPair>,
    #[debug(skip)]
    feed: F,
    feed_cursor: u16,
    rounds_fed: u64,
    exit: AtomicBool,
    laps: LapStats,
}

impl Production<RandomFeed> {
    /// A line fed by a [`RandomFeed`] seeded from `config`.
    ///
    /// # Errors
    /// See [`Production::with_feed`].
    pub fn new(config: ProductionConfig) -> Result<Self, ProductionSetupError> {
        Self::with_feed(config, RandomFeed::new(config.seed))
    }
}

impl<F: ComponentFeed> Production<F> {
    /// A line fed by `feed`.
    ///
    /// # Errors
    /// If the belt has no slots, or there are more pairs than slots.
    pub fn with_feed(config: ProductionConfig, feed: F) -> Result<Self, ProductionSetupError> {
        setup::validate(&config)?;
        let pairs = (0..config.pair_count).map(WorkerPair::new).collect();
        Ok(Self {
            config,
            belt: Belt::new(config.slot_count),
            pairs,
            feed,
            feed_cursor: 0,
            rounds_fed: 0,
            exit: AtomicBool::new(false),
            laps: LapStats::default(),
        })
    }

    /// Runs `round_count` rounds and returns once every worker has observed
    /// the end of the run and has been joined.
    ///
    /// Calling `start` again continues the simulation where it stopped.
    ///
    /// # Errors
    /// If a worker thread cannot be spawned (the run is aborted before any
    /// round is fed) or a worker panics.
    pub fn start(&mut self, round_count: u64) -> Result<(), ProductionError> {
        if round_count == 0 {
            return Ok(());
        }
        let Self {
            config,
            belt,
            pairs,
            feed,
            feed_cursor,
            rounds_fed,
            exit,
            laps,
        } = self;
        let belt = &*belt;
        let exit = &*exit;
        exit.store(false, Ordering::Relaxed);
        info!(
            slots = config.slot_count,
            pairs = config.pair_count,
            round_count,
            "production started"
        );

        thread::scope(|scope| {
            let mut feeder_ends = Vec::with_capacity(config.worker_count());
            let mut handles = Vec::with_capacity(config.worker_count());
            let mut spawn_error = None;
            'spawn: for (pair_idx, pair) in pairs.iter_mut().enumerate() {
                let (gate, workers) = pair.split_mut();
                for (seat, worker) in workers.iter_mut().enumerate() {
                    let name = format!("worker-{pair_idx}.{seat}");
                    let (feeder_end, worker_end) = token_pair();
                    let spawned = thread::Builder::new()
                        .name(name.clone())
                        .spawn_scoped(scope, move || {
                            run_worker(worker, &worker_end, belt, gate, exit);
                        });
                    match spawned {
                        Ok(handle) => {
                            feeder_ends.push(feeder_end);
                            handles.push((name, handle));
                        }
                        Err(err) => {
                            error!(worker = %name, %err, "failed to spawn worker");
                            spawn_error = Some(err);
                            break 'spawn;
                        }
                    }
                }
            }

            let mut rendezvous = Rendezvous::new(feeder_ends);
            if spawn_error.is_none() {
                let mut feeder = Feeder {
                    belt,
                    feed: &mut *feed,
                    cursor: &mut *feed_cursor,
                    rounds_fed: &mut *rounds_fed,
                    laps: &mut *laps,
                };
                for round in 0..round_count {
                    feeder.feed_round(&mut rendezvous, round > 0);
                }
                rendezvous.collect();
                exit.store(true, Ordering::Release);
            }
            // Hanging up releases any worker still waiting for a round.
            drop(rendezvous);

            let mut result = spawn_error.map_or(Ok(()), |err| Err(ProductionError::Spawn(err)));
            for (worker, handle) in handles {
                if handle.join().is_err() && result.is_ok() {
                    result = Err(ProductionError::WorkerPanicked { worker });
                }
            }
            result
        })?;

        info!(
            empty_feeds = laps.empty_feeds,
            products_formed = laps.products_formed,
            components_unhandled = laps.components_unhandled,
            components_consumed = laps.components_consumed,
            "production finished"
        );
        Ok(())
    }

    /// Line shape.
    pub fn config(&self) -> &ProductionConfig {
        &self.config
    }

    /// The shared belt.
    pub fn belt(&self) -> &Belt {
        &self.belt
    }

    /// All worker pairs.
    #[must_use]
    pub fn pairs(&self) -> &[WorkerPair] {
        &self.pairs
    }

    /// Lap outcome counters.
    #[must_use]
    pub fn lap_stats(&self) -> LapStats {
        self.laps
    }

    /// Retired slots that were fed nothing and never touched.
    #[must_use]
    pub fn empty_feeds(&self) -> u64 {
        self.laps.empty_feeds
    }

    /// Retired slots carrying a product.
    #[must_use]
    pub fn products_formed(&self) -> u64 {
        self.laps.products_formed
    }

    /// Retired slots still carrying a raw component.
    #[must_use]
    pub fn components_unhandled(&self) -> u64 {
        self.laps.components_unhandled
    }

    /// Workers currently midway through a product.
    #[must_use]
    pub fn workers_with_unfinished_products(&self) -> usize {
        self.pairs.iter().map(WorkerPair::unfinished_products).sum()
    }

    /// Round counters summed over every worker.
    #[must_use]
    pub fn worker_stats(&self) -> WorkerStats {
        self.pairs
            .iter()
            .flat_map(WorkerPair::workers)
            .map(Worker::stats)
            .fold(WorkerStats::default(), |acc, stats| acc + stats)
    }

    /// Rounds fed over the lifetime of the line.
    #[must_use]
    pub fn rounds_fed(&self) -> u64 {
        self.rounds_fed
    }
}

struct Feeder<'a, F> {
    belt: &'a Belt,
    feed: &'a mut F,
    cursor: &'a mut u16,
    rounds_fed: &'a mut u64,
    laps: &'a mut LapStats,
}

impl<F: ComponentFeed> Feeder<'_, F> {
    fn feed_round(&mut self, rendezvous: &mut Rendezvous, previous_in_flight: bool) {
        let value = Slot::fresh(self.feed.next_component());
        let index = (*self.cursor).wrapping_pred(self.belt.len());
        *self.cursor = index;

        if previous_in_flight {
            rendezvous.collect();
        }
        if *self.rounds_fed >= u64::from(self.belt.len()) {
            self.laps.retire(self.belt.read(index));
        }
        self.belt.write(index, value);
        *self.rounds_fed += 1;
        debug!(
            round = *self.rounds_fed,
            index,
            ?value,
            live = rendezvous.live(),
            "slot fed"
        );

        rendezvous.release();
    }
}

fn run_worker(
    worker: &mut Worker,
    tokens: &WorkerEnd,
    belt: &Belt,
    gate: &PairGate,
    exit: &AtomicBool,
) {
    while tokens.wait_release() {
        let finished = matches!(worker.process_round(belt, gate), RoundOutcome::Finished);
        tokens.signal_done();
        if finished || exit.load(Ordering::Acquire) {
            break;
        }
    }
}
