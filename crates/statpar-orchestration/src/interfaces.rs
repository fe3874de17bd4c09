//! Orchestration interfaces and the run report handed to presenters.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use statpar_core::baseline::StatSummary;
use statpar_core::kind::StatKind;
use statpar_core::worker::StatError;

use crate::timing::TimingSample;

/// How the three workers are isolated from each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationMode {
    /// One child process per worker; results over a shared pipe.
    Process,
    /// One thread per worker; results through per-worker slots.
    Thread,
    /// No workers; the coordinator computes everything itself.
    Sequential,
}

impl IsolationMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Thread => "thread",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IsolationMode {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "process" | "processes" => Ok(Self::Process),
            "thread" | "threads" => Ok(Self::Thread),
            "sequential" | "single" => Ok(Self::Sequential),
            other => Err(StatError::Config(format!("unknown isolation mode: {other}"))),
        }
    }
}

/// Final state of one statistic slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum SlotOutcome {
    /// The worker delivered its value.
    Received(f64),
    /// The worker went silent: it failed, or missed its deadline.
    Failed,
}

impl SlotOutcome {
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Received(v) => Some(*v),
            Self::Failed => None,
        }
    }
}

/// How a worker ended, as observed when it was joined or reaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerExit {
    /// Terminated normally with the given exit code (0 for threads).
    Exited(i32),
    /// Process killed by a signal, or thread panicked.
    Abnormal(String),
    /// Killed by the coordinator after its deadline.
    Killed,
}

/// Output record of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Isolation mode used.
    pub mode: IsolationMode,
    /// Mean slot.
    pub mean: SlotOutcome,
    /// Median slot.
    pub median: SlotOutcome,
    /// Deviation slot.
    pub deviation: SlotOutcome,
    /// Number of dataset elements.
    pub element_count: usize,
    /// Spawn latency window.
    #[serde(skip)]
    pub creation: TimingSample,
    /// Whole-run window.
    #[serde(skip)]
    pub total: TimingSample,
    /// Spawn latency in milliseconds.
    pub creation_latency_ms: f64,
    /// Whole-run latency in milliseconds.
    pub total_latency_ms: f64,
    /// Per-worker termination, in spawn order.
    pub exits: Vec<(StatKind, WorkerExit)>,
}

impl RunReport {
    /// Slot for one statistic.
    #[must_use]
    pub fn slot(&self, kind: StatKind) -> SlotOutcome {
        match kind {
            StatKind::Mean => self.mean,
            StatKind::Median => self.median,
            StatKind::Deviation => self.deviation,
        }
    }

    /// All three values, if every slot was filled.
    #[must_use]
    pub fn summary(&self) -> Option<StatSummary> {
        Some(StatSummary {
            mean: self.mean.value()?,
            median: self.median.value()?,
            deviation: self.deviation.value()?,
        })
    }

    /// Kinds whose worker went silent.
    #[must_use]
    pub fn failed_kinds(&self) -> Vec<StatKind> {
        StatKind::ALL
            .into_iter()
            .filter(|&k| self.slot(k) == SlotOutcome::Failed)
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed_kinds().is_empty()
    }
}

/// Trait for presenting results to the user.
pub trait ResultPresenter: Send + Sync {
    /// Present one run.
    fn present_report(&self, report: &RunReport);

    /// Present a side-by-side comparison of several runs.
    fn present_comparison(&self, reports: &[RunReport]);

    /// Present an error.
    fn present_error(&self, error: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(mean: SlotOutcome) -> RunReport {
        let timing = TimingSample::instant();
        RunReport {
            mode: IsolationMode::Thread,
            mean,
            median: SlotOutcome::Received(2.0),
            deviation: SlotOutcome::Received(3.0),
            element_count: 4,
            creation: timing,
            total: timing,
            creation_latency_ms: 0.0,
            total_latency_ms: 0.0,
            exits: Vec::new(),
        }
    }

    #[test]
    fn parse_modes() {
        assert_eq!("process".parse::<IsolationMode>().unwrap(), IsolationMode::Process);
        assert_eq!("THREADS".parse::<IsolationMode>().unwrap(), IsolationMode::Thread);
        assert_eq!(
            "sequential".parse::<IsolationMode>().unwrap(),
            IsolationMode::Sequential
        );
        assert!("fiber".parse::<IsolationMode>().is_err());
    }

    #[test]
    fn complete_report_has_summary() {
        let r = report(SlotOutcome::Received(1.0));
        assert!(r.is_complete());
        let s = r.summary().unwrap();
        assert_eq!((s.mean, s.median, s.deviation), (1.0, 2.0, 3.0));
    }

    #[test]
    fn failed_slot_blocks_summary() {
        let r = report(SlotOutcome::Failed);
        assert!(r.summary().is_none());
        assert_eq!(r.failed_kinds(), vec![StatKind::Mean]);
    }
}
