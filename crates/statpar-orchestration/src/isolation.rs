//! The seam between the coordinator and an isolation strategy.

use std::io;
use std::time::Instant;

use statpar_core::kind::{StatKind, StatResult};
use statpar_core::wire::WireError;
use statpar_core::worker::StatError;

use crate::interfaces::{IsolationMode, WorkerExit};

/// Error type for coordinated runs.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A worker process or thread could not be created.
    #[error("failed to spawn {kind} worker: {source}")]
    Spawn {
        kind: StatKind,
        #[source]
        source: io::Error,
    },

    /// The result channel could not be opened or read.
    #[error("result channel error: {0}")]
    Channel(#[from] io::Error),

    /// A record could not be written or decoded.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// Dataset or statistic error.
    #[error(transparent)]
    Stat(#[from] StatError),

    /// The run was cancelled before it finished.
    #[error("run cancelled")]
    Cancelled,
}

/// What the result channel yielded before a deadline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delivery {
    /// One complete record.
    Result(StatResult),
    /// The worker for this kind ended without producing a record.
    Silent(StatKind),
    /// Every producer is gone; nothing more will arrive.
    Closed,
    /// Deadline reached with nothing to deliver.
    Pending,
}

/// A fixed set of isolated workers feeding one result channel.
///
/// The coordinator drives every implementation through the same sequence:
/// `spawn` x3, `seal`, `next_delivery` until drained, optionally `abort`,
/// then `join_all` exactly once.
pub trait WorkerGroup {
    /// Isolation mode this group implements.
    fn mode(&self) -> IsolationMode;

    /// Start the worker for `kind`.
    fn spawn(&mut self, kind: StatKind) -> Result<(), EngineError>;

    /// Called once after the last spawn; releases the coordinator's copies of
    /// producer resources and hands the dataset over where needed.
    fn seal(&mut self) -> Result<(), EngineError>;

    /// Block until the next delivery or `deadline`.
    fn next_delivery(&mut self, deadline: Instant) -> Delivery;

    /// Stop workers that are still running, where the mode allows it.
    fn abort(&mut self);

    /// Join or reap every spawned worker, in spawn order.
    fn join_all(&mut self) -> Vec<(StatKind, WorkerExit)>;
}
