//! Conveyor belt assembly line with optimistic, rollback-based slot commits.
//!
//! A single feeder places raw components on a fixed-size circular belt, one
//! slot per round. Pairs of worker threads walk the belt in lockstep with it,
//! each running its own assembly state machine that turns an A plus a partner
//! (B or C) into a product over several rounds. The crate:
//! - Packs every slot into one byte so it moves between threads with a single
//!   Acquire load or Release store; there are no partial-field updates.
//! - Lets workers mutate a private copy and publish it optimistically. Both
//!   workers of a pair race for the same slot; a non-blocking gate plus a
//!   "handled" marker admit at most one commit per slot occupancy, and the
//!   loser rolls its state machine back.
//! - Synchronizes feeder and workers round by round with one-token channels,
//!   so the feeder never overwrites a slot a worker is still looking at.
//!
//! Key modules:
//! - `types`: `Component` and the packed `Slot` value.
//! - `belt`: the cache-line padded atomic slot array.
//! - `chart`: the per-worker assembly state machine with snapshot/rollback.
//! - `worker`: the optimistic per-round protocol and pair arbitration.
//! - `production`: the feeder, the round rendezvous and lap counters.
//!
//! Quick start:
//! 1. Build a `ProductionConfig` with a slot count and a worker pair count.
//! 2. Construct a `Production`, optionally with your own `ComponentFeed`.
//! 3. Call `start(round_count)`, then read the lap counters and the number of
//!    workers left holding an unfinished product.

/// The shared belt of atomic slots.
pub mod belt;
/// Per-worker assembly state machine.
///
/// Exposes `AssemblyStateChart`, whose `process` applies one transition to a
/// private slot copy and whose `commit`/`rollback` keep or discard it.
pub mod chart;
/// Production line shape (`ProductionConfig`).
pub mod config;
/// Sources of raw components for the feeder.
pub mod feed;
/// The feeder, the round rendezvous and lap outcome counters.
///
/// Owns the belt and all worker pairs, runs every worker on its own thread and
/// joins them when the run ends.
#[cfg(not(feature = "loom"))]
pub mod production;
mod sync;
/// Component kinds and the packed slot value.
pub mod types;
mod utils;
/// Workers, worker pairs and the optimistic per-round protocol.
///
/// A worker reads its slot, runs its chart against a private copy and
/// publishes the copy only if the slot is still unhandled and the pair gate is
/// free; otherwise it rolls the chart back.
pub mod worker;
