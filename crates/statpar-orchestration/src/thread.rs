//! Thread isolation: sibling threads sharing the dataset by reference.
//!
//! Every worker thread owns the only sender of its own capacity-1 slot.
//! Nothing else is shared mutably between workers.

use std::any::Any;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Select};
use tracing::{debug, error, warn};

use statpar_core::dataset::Dataset;
use statpar_core::kind::{StatKind, StatResult};
use statpar_core::worker::{worker_for, StatWorker};

use crate::interfaces::{IsolationMode, WorkerExit};
use crate::isolation::{Delivery, EngineError, WorkerGroup};

/// Three worker threads over one shared, read-only dataset.
pub struct ThreadGroup {
    dataset: Arc<Dataset>,
    handles: Vec<(StatKind, JoinHandle<()>)>,
    pending: Vec<(StatKind, Receiver<StatResult>)>,
}

impl ThreadGroup {
    #[must_use]
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            handles: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Spawn a thread running an arbitrary worker. Exposed for tests that
    /// need misbehaving workers.
    pub fn spawn_worker(&mut self, worker: Arc<dyn StatWorker>) -> Result<(), EngineError> {
        let kind = worker.kind();
        let (slot, receiver) = bounded::<StatResult>(1);
        let dataset = Arc::clone(&self.dataset);

        let handle = thread::Builder::new()
            .name(format!("statpar-{kind}"))
            .spawn(move || match worker.run(&dataset) {
                Ok(result) => {
                    debug!(worker = worker.name(), value = result.value, "result ready");
                    // The receiver is gone only if the coordinator stopped waiting.
                    let _ = slot.send(result);
                }
                Err(e) => {
                    error!(worker = worker.name(), error = %e, "worker failed; no result emitted");
                }
            })
            .map_err(|source| EngineError::Spawn { kind, source })?;

        debug!(%kind, "worker thread spawned");
        self.handles.push((kind, handle));
        self.pending.push((kind, receiver));
        Ok(())
    }
}

impl WorkerGroup for ThreadGroup {
    fn mode(&self) -> IsolationMode {
        IsolationMode::Thread
    }

    fn spawn(&mut self, kind: StatKind) -> Result<(), EngineError> {
        self.spawn_worker(worker_for(kind))
    }

    fn seal(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    fn next_delivery(&mut self, deadline: Instant) -> Delivery {
        if self.pending.is_empty() {
            return Delivery::Closed;
        }

        let (index, received) = {
            let mut select = Select::new();
            for (_, receiver) in &self.pending {
                select.recv(receiver);
            }
            match select.select_deadline(deadline) {
                Ok(oper) => {
                    let index = oper.index();
                    let received = oper.recv(&self.pending[index].1);
                    (index, received)
                }
                Err(_) => return Delivery::Pending,
            }
        };

        let (kind, _) = self.pending.remove(index);
        match received {
            Ok(result) => Delivery::Result(result),
            // Sender dropped without sending: the worker failed or panicked.
            Err(_) => Delivery::Silent(kind),
        }
    }

    fn abort(&mut self) {
        // Threads cannot be interrupted. Their computations are finite, so
        // `join_all` still waits for each of them.
        self.pending.clear();
    }

    fn join_all(&mut self) -> Vec<(StatKind, WorkerExit)> {
        self.handles
            .drain(..)
            .map(|(kind, handle)| {
                let exit = match handle.join() {
                    Ok(()) => WorkerExit::Exited(0),
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        warn!(%kind, %message, "worker thread panicked");
                        WorkerExit::Abnormal(message)
                    }
                };
                debug!(%kind, ?exit, "worker thread joined");
                (kind, exit)
            })
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use statpar_core::worker::StatError;

    struct Panicking;

    impl StatWorker for Panicking {
        fn kind(&self) -> StatKind {
            StatKind::Median
        }
        fn compute(&self, _dataset: &Dataset) -> Result<f64, StatError> {
            panic!("boom");
        }
        fn name(&self) -> &'static str {
            "Panicking"
        }
    }

    struct Failing;

    impl StatWorker for Failing {
        fn kind(&self) -> StatKind {
            StatKind::Median
        }
        fn compute(&self, _dataset: &Dataset) -> Result<f64, StatError> {
            Err(StatError::Allocation("simulated".into()))
        }
        fn name(&self) -> &'static str {
            "Failing"
        }
    }

    fn dataset() -> Arc<Dataset> {
        Arc::new(Dataset::from_values(vec![0, 100, 50, 50]).unwrap())
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(10)
    }

    #[test]
    fn delivers_all_three_then_closes() {
        let mut group = ThreadGroup::new(dataset());
        for kind in StatKind::ALL {
            group.spawn(kind).unwrap();
        }
        group.seal().unwrap();

        let mut seen = Vec::new();
        for _ in 0..3 {
            match group.next_delivery(deadline()) {
                Delivery::Result(r) => seen.push(r.kind),
                other => panic!("unexpected delivery: {other:?}"),
            }
        }
        seen.sort();
        assert_eq!(seen, StatKind::ALL.to_vec());
        assert_eq!(group.next_delivery(deadline()), Delivery::Closed);

        let exits = group.join_all();
        assert_eq!(exits.len(), 3);
        assert!(exits.iter().all(|(_, e)| *e == WorkerExit::Exited(0)));
        let order: Vec<StatKind> = exits.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, StatKind::ALL.to_vec());
    }

    #[test]
    fn failing_worker_is_silent() {
        let mut group = ThreadGroup::new(dataset());
        group.spawn_worker(Arc::new(Failing)).unwrap();
        assert_eq!(
            group.next_delivery(deadline()),
            Delivery::Silent(StatKind::Median)
        );
        assert_eq!(group.join_all(), vec![(StatKind::Median, WorkerExit::Exited(0))]);
    }

    #[test]
    fn panicking_worker_is_silent_and_abnormal() {
        let mut group = ThreadGroup::new(dataset());
        group.spawn_worker(Arc::new(Panicking)).unwrap();
        assert_eq!(
            group.next_delivery(deadline()),
            Delivery::Silent(StatKind::Median)
        );
        let exits = group.join_all();
        assert_eq!(
            exits,
            vec![(StatKind::Median, WorkerExit::Abnormal("boom".into()))]
        );
    }

    #[test]
    fn join_all_is_single_shot() {
        let mut group = ThreadGroup::new(dataset());
        group.spawn(StatKind::Mean).unwrap();
        assert_eq!(group.join_all().len(), 1);
        assert!(group.join_all().is_empty());
    }
}
