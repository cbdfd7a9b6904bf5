use crate::config::ProductionConfig;
use thiserror::Error;

/// Error kind for production line construction failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProductionSetupError {
    /// The belt must have at least one slot.
    #[error("belt must have at least one slot")]
    NoSlots,
    /// Each pair needs its own starting offset on the belt.
    #[error("{pairs} worker pairs do not fit on a belt of {slots} slots")]
    TooManyPairs {
        /// Requested pair count.
        pairs: u16,
        /// Requested slot count.
        slots: u16,
    },
}

/// Error kind for failures while running a production line.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProductionError {
    /// A worker thread could not be spawned; the run was aborted.
    #[error("failed to spawn worker thread")]
    Spawn(#[source] std::io::Error),
    /// A worker thread panicked.
    #[error("worker `{worker}` panicked")]
    WorkerPanicked {
        /// Name of the worker thread.
        worker: String,
    },
}

pub(super) fn validate(config: &ProductionConfig) -> Result<(), ProductionSetupError> {
    let &ProductionConfig {
        slot_count,
        pair_count,
        seed: _,
    } = config;
    if slot_count == 0 {
        return Err(ProductionSetupError::NoSlots);
    }
    if pair_count > slot_count {
        return Err(ProductionSetupError::TooManyPairs {
            pairs: pair_count,
            slots: slot_count,
        });
    }
    Ok(())
}
