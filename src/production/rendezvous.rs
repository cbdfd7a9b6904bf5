use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::warn;

/// Feeder side of one worker's round tokens.
pub(super) struct FeederEnd {
    release: Sender<()>,
    done: Receiver<()>,
}

/// Worker side of its round tokens.
pub(super) struct WorkerEnd {
    release: Receiver<()>,
    done: Sender<()>,
}

/// Both token channels hold at most one token, so neither side can run more
/// than one round ahead of the other.
pub(super) fn token_pair() -> (FeederEnd, WorkerEnd) {
    let (release_tx, release_rx) = bounded(1);
    let (done_tx, done_rx) = bounded(1);
    (
        FeederEnd {
            release: release_tx,
            done: done_rx,
        },
        WorkerEnd {
            release: release_rx,
            done: done_tx,
        },
    )
}

impl WorkerEnd {
    /// Blocks until the feeder opens the next round. `false` once the feeder
    /// has hung up.
    pub(super) fn wait_release(&self) -> bool {
        self.release.recv().is_ok()
    }

    /// Reports the current round as finished.
    pub(super) fn signal_done(&self) {
        // The feeder only hangs up after collecting the final round.
        let _ = self.done.send(());
    }
}

/// Feeder's view of every worker's token channels.
///
/// A worker whose channels disconnect (run finished early, or panicked) is
/// dropped from all later rounds.
pub(super) struct Rendezvous {
    workers: Vec<Option<FeederEnd>>,
}

impl Rendezvous {
    pub(super) fn new(workers: Vec<FeederEnd>) -> Self {
        Self {
            workers: workers.into_iter().map(Some).collect(),
        }
    }

    /// Waits for every live worker to finish the round in flight.
    pub(super) fn collect(&mut self) {
        for (seat, slot) in self.workers.iter_mut().enumerate() {
            let Some(end) = slot else {
                continue;
            };
            if end.done.recv().is_err() {
                warn!(seat, "worker left the rendezvous");
                *slot = None;
            }
        }
    }

    /// Opens the next round for every live worker.
    pub(super) fn release(&mut self) {
        for (seat, slot) in self.workers.iter_mut().enumerate() {
            let Some(end) = slot else {
                continue;
            };
            if end.release.send(()).is_err() {
                warn!(seat, "worker left the rendezvous");
                *slot = None;
            }
        }
    }

    /// Number of workers still taking part.
    pub(super) fn live(&self) -> usize {
        self.workers.iter().flatten().count()
    }
}
