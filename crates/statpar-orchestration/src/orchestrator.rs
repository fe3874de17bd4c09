//! Multi-mode execution and cross-mode result analysis.

use std::sync::Arc;

use tracing::{info, warn};

use statpar_core::dataset::Dataset;
use statpar_core::kind::StatKind;
use statpar_core::worker::StatError;

use crate::coordinator::Coordinator;
use crate::interfaces::{IsolationMode, RunReport};
use crate::isolation::EngineError;

/// Run every mode in `modes` over the same dataset, in order.
///
/// Stops at the first run that fails outright (spawn failure, cancellation).
/// Runs that finish with failed slots are still returned.
pub fn execute_runs(
    coordinator: &Coordinator,
    modes: &[IsolationMode],
    dataset: &Arc<Dataset>,
) -> Result<Vec<RunReport>, EngineError> {
    let mut reports = Vec::with_capacity(modes.len());
    for &mode in modes {
        let report = coordinator.execute(mode, dataset)?;
        if !report.is_complete() {
            warn!(%mode, failed = ?report.failed_kinds(), "run finished with failed slots");
        }
        reports.push(report);
    }
    info!(runs = reports.len(), "all runs finished");
    Ok(reports)
}

/// Check that every complete run produced bit-identical statistics.
pub fn analyze_comparison_results(reports: &[RunReport]) -> Result<(), StatError> {
    let complete: Vec<(IsolationMode, _)> = reports
        .iter()
        .filter_map(|r| r.summary().map(|s| (r.mode, s)))
        .collect();

    let Some(((first_mode, first), rest)) = complete.split_first() else {
        return Err(StatError::Mismatch("no complete run to compare".into()));
    };

    for (mode, summary) in rest {
        if !summary.bit_identical(first) {
            let kind = StatKind::ALL
                .into_iter()
                .find(|&k| summary.get(k).to_bits() != first.get(k).to_bits())
                .unwrap_or(StatKind::Mean);
            return Err(StatError::Mismatch(format!(
                "{kind}: {first_mode} gave {} but {mode} gave {}",
                first.get(kind),
                summary.get(kind)
            )));
        }
    }
    Ok(())
}
