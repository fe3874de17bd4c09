//! The coordinator: spawn, time, drain, join, report.
//!
//! One run walks `Init -> Spawning -> AwaitingResults -> DrainingChannel ->
//! Joining -> Done`. The isolation strategy is a [`WorkerGroup`]; the
//! coordinator owns the slots, both timers and the drain deadline.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use statpar_core::baseline::compute_sequential;
use statpar_core::cancel::CancellationToken;
use statpar_core::constants::DRAIN_POLL_INTERVAL;
use statpar_core::dataset::Dataset;
use statpar_core::kind::{StatKind, StatResult};
use statpar_core::options::EngineOptions;

use crate::interfaces::{IsolationMode, RunReport, SlotOutcome, WorkerExit};
use crate::isolation::{Delivery, EngineError, WorkerGroup};
use crate::process::{ProcessGroup, WorkerCommand};
use crate::thread::ThreadGroup;
use crate::timing::{RunClock, TimingSample};

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Spawning,
    AwaitingResults,
    DrainingChannel,
    Joining,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Spawning => "spawning",
            Self::AwaitingResults => "awaiting-results",
            Self::DrainingChannel => "draining-channel",
            Self::Joining => "joining",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Empty,
    Received(f64),
    Failed,
}

/// The three per-statistic result cells, indexed by [`StatKind::index`].
#[derive(Debug)]
struct Slots([Slot; 3]);

impl Slots {
    fn new() -> Self {
        Self([Slot::Empty; 3])
    }

    /// Fill an empty slot. Returns `false` if the slot was already resolved.
    fn fill(&mut self, result: StatResult) -> bool {
        let slot = &mut self.0[result.kind.index()];
        if *slot == Slot::Empty {
            *slot = Slot::Received(result.value);
            true
        } else {
            false
        }
    }

    fn fail(&mut self, kind: StatKind) {
        let slot = &mut self.0[kind.index()];
        if *slot == Slot::Empty {
            *slot = Slot::Failed;
        }
    }

    fn fail_empty(&mut self) -> Vec<StatKind> {
        let empty = self.empty_kinds();
        for &kind in &empty {
            self.fail(kind);
        }
        empty
    }

    fn empty_kinds(&self) -> Vec<StatKind> {
        StatKind::ALL
            .into_iter()
            .filter(|k| self.0[k.index()] == Slot::Empty)
            .collect()
    }

    fn is_resolved(&self) -> bool {
        self.0.iter().all(|s| *s != Slot::Empty)
    }

    fn all_received(&self) -> bool {
        self.0.iter().all(|s| matches!(s, Slot::Received(_)))
    }

    fn outcome(&self, kind: StatKind) -> SlotOutcome {
        match self.0[kind.index()] {
            Slot::Received(v) => SlotOutcome::Received(v),
            Slot::Empty | Slot::Failed => SlotOutcome::Failed,
        }
    }
}

/// How the drain loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrainEnd {
    /// Every slot is either received or failed.
    Resolved,
    /// The channel closed with slots still empty.
    Closed,
    /// A record deadline expired.
    TimedOut,
    Cancelled,
}

/// Runs the three workers under one isolation mode and collects a report.
#[derive(Debug, Clone)]
pub struct Coordinator {
    options: EngineOptions,
    cancel: CancellationToken,
    worker_command: Option<WorkerCommand>,
}

impl Coordinator {
    #[must_use]
    pub fn new(options: EngineOptions, cancel: CancellationToken) -> Self {
        Self {
            options: options.normalize(),
            cancel,
            worker_command: None,
        }
    }

    /// Launch process workers with `command` instead of the current executable.
    #[must_use]
    pub fn with_worker_command(mut self, command: WorkerCommand) -> Self {
        self.worker_command = Some(command);
        self
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Run one mode over `dataset`.
    pub fn execute(
        &self,
        mode: IsolationMode,
        dataset: &Arc<Dataset>,
    ) -> Result<RunReport, EngineError> {
        debug!(%mode, phase = %Phase::Init, elements = dataset.len(), "starting run");
        match mode {
            IsolationMode::Process => {
                let command = match &self.worker_command {
                    Some(command) => command.clone(),
                    None => WorkerCommand::current_exe()?,
                };
                let mut group = ProcessGroup::new(command, Arc::clone(dataset))?;
                self.run_group(&mut group, dataset.len())
            }
            IsolationMode::Thread => {
                let mut group = ThreadGroup::new(Arc::clone(dataset));
                self.run_group(&mut group, dataset.len())
            }
            IsolationMode::Sequential => run_sequential(dataset, &self.cancel),
        }
    }

    /// Drive `group` through one complete run.
    pub fn run_group<G: WorkerGroup>(
        &self,
        group: &mut G,
        element_count: usize,
    ) -> Result<RunReport, EngineError> {
        let mode = group.mode();
        let mut clock = RunClock::start();

        debug!(%mode, phase = %Phase::Spawning);
        for kind in StatKind::ALL {
            if let Err(e) = group.spawn(kind) {
                error!(%mode, %kind, error = %e, "spawn failed; tearing down the run");
                group.abort();
                let exits = group.join_all();
                debug!(%mode, ?exits, "spawned workers reaped");
                return Err(e);
            }
        }
        clock.mark_created();

        if let Err(e) = group.seal() {
            error!(%mode, error = %e, "result channel setup failed");
            group.abort();
            group.join_all();
            return Err(e);
        }

        debug!(%mode, phase = %Phase::AwaitingResults);
        let mut slots = Slots::new();
        let end = self.drain(group, &mut slots);
        if !slots.all_received() {
            group.abort();
        }

        debug!(%mode, phase = %Phase::Joining, ?end);
        let exits = group.join_all();
        let (creation, total) = clock.finish();

        if end == DrainEnd::Cancelled {
            warn!(%mode, "run cancelled");
            return Err(EngineError::Cancelled);
        }

        let report = build_report(mode, &slots, element_count, creation, total, exits);
        debug!(%mode, phase = %Phase::Done);
        info!(
            %mode,
            creation_ms = report.creation_latency_ms,
            total_ms = report.total_latency_ms,
            complete = report.is_complete(),
            "run finished"
        );
        Ok(report)
    }

    fn drain<G: WorkerGroup>(&self, group: &mut G, slots: &mut Slots) -> DrainEnd {
        let timeout = self.options.record_timeout;
        let mode = group.mode();
        let mut deadline = Instant::now() + timeout;
        let mut draining = false;

        while !slots.is_resolved() {
            if self.cancel.is_cancelled() {
                return DrainEnd::Cancelled;
            }
            let now = Instant::now();
            if now >= deadline {
                let failed = slots.fail_empty();
                warn!(%mode, ?failed, ?timeout, "record deadline expired; marking slots failed");
                return DrainEnd::TimedOut;
            }

            match group.next_delivery(deadline.min(now + DRAIN_POLL_INTERVAL)) {
                Delivery::Result(result) => {
                    if !draining {
                        debug!(%mode, phase = %Phase::DrainingChannel);
                        draining = true;
                    }
                    if slots.fill(result) {
                        debug!(%mode, kind = %result.kind, value = result.value, "slot filled");
                        deadline = Instant::now() + timeout;
                    } else {
                        warn!(%mode, kind = %result.kind, value = result.value, "duplicate record discarded");
                    }
                }
                Delivery::Silent(kind) => {
                    warn!(%mode, %kind, "worker ended without a result");
                    slots.fail(kind);
                }
                Delivery::Closed => {
                    let failed = slots.fail_empty();
                    if !failed.is_empty() {
                        warn!(%mode, ?failed, "result channel closed early");
                    }
                    return DrainEnd::Closed;
                }
                Delivery::Pending => {}
            }
        }
        DrainEnd::Resolved
    }
}

fn build_report(
    mode: IsolationMode,
    slots: &Slots,
    element_count: usize,
    creation: TimingSample,
    total: TimingSample,
    exits: Vec<(StatKind, WorkerExit)>,
) -> RunReport {
    RunReport {
        mode,
        mean: slots.outcome(StatKind::Mean),
        median: slots.outcome(StatKind::Median),
        deviation: slots.outcome(StatKind::Deviation),
        element_count,
        creation,
        total,
        creation_latency_ms: creation.as_millis_f64(),
        total_latency_ms: total.as_millis_f64(),
        exits,
    }
}

/// Baseline run: all three statistics in the calling thread, no workers.
pub fn run_sequential(
    dataset: &Dataset,
    cancel: &CancellationToken,
) -> Result<RunReport, EngineError> {
    let clock = RunClock::start();
    cancel
        .check_cancelled()
        .map_err(|_| EngineError::Cancelled)?;
    let summary = compute_sequential(dataset)?;
    let (creation, total) = clock.finish();

    let mut slots = Slots::new();
    for kind in StatKind::ALL {
        slots.fill(StatResult::new(kind, summary.get(kind)));
    }
    let report = build_report(
        IsolationMode::Sequential,
        &slots,
        dataset.len(),
        creation,
        total,
        Vec::new(),
    );
    info!(total_ms = report.total_latency_ms, "sequential baseline finished");
    Ok(report)
}
