//! Golden file integration tests.
//!
//! Verifies every isolation mode against known statistics from
//! tests/testdata/golden.json, and that the modes agree bit for bit.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use statpar_core::cancel::CancellationToken;
use statpar_core::dataset::Dataset;
use statpar_core::options::EngineOptions;
use statpar_orchestration::coordinator::Coordinator;
use statpar_orchestration::interfaces::{IsolationMode, RunReport};
use statpar_orchestration::mode_selection::ALL_MODES;
use statpar_orchestration::orchestrator::{analyze_comparison_results, execute_runs};
use statpar_orchestration::process::WorkerCommand;

#[derive(Deserialize)]
struct GoldenData {
    datasets: Vec<GoldenEntry>,
}

#[derive(Deserialize)]
struct GoldenEntry {
    name: String,
    values: Vec<i32>,
    mean: f64,
    median: f64,
    deviation: f64,
}

fn load_golden() -> GoldenData {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/testdata/golden.json");
    let data = std::fs::read_to_string(path).expect("Failed to read golden file");
    serde_json::from_str(&data).expect("Failed to parse golden file")
}

fn coordinator() -> Coordinator {
    Coordinator::new(
        EngineOptions {
            record_timeout: Duration::from_secs(30),
            ..Default::default()
        },
        CancellationToken::new(),
    )
    .with_worker_command(WorkerCommand::new(env!("CARGO_BIN_EXE_statpar")))
}

fn run(mode: IsolationMode, entry: &GoldenEntry) -> RunReport {
    let dataset = Arc::new(Dataset::from_values(entry.values.clone()).unwrap());
    coordinator().execute(mode, &dataset).unwrap()
}

fn assert_matches_golden(report: &RunReport, entry: &GoldenEntry) {
    let summary = report
        .summary()
        .unwrap_or_else(|| panic!("{} [{}]: incomplete run", entry.name, report.mode));
    for (label, got, want) in [
        ("mean", summary.mean, entry.mean),
        ("median", summary.median, entry.median),
        ("deviation", summary.deviation, entry.deviation),
    ] {
        assert!(
            (got - want).abs() < 1e-9,
            "{} [{}]: {label} = {got}, expected {want}",
            entry.name,
            report.mode
        );
    }
    assert_eq!(report.element_count, entry.values.len());
}

#[test]
fn golden_sequential() {
    for entry in &load_golden().datasets {
        assert_matches_golden(&run(IsolationMode::Sequential, entry), entry);
    }
}

#[test]
fn golden_thread() {
    for entry in &load_golden().datasets {
        assert_matches_golden(&run(IsolationMode::Thread, entry), entry);
    }
}

#[test]
fn golden_process() {
    for entry in &load_golden().datasets {
        let report = run(IsolationMode::Process, entry);
        assert_matches_golden(&report, entry);
        assert!(report.creation_latency_ms <= report.total_latency_ms);
    }
}

#[test]
fn golden_modes_bit_identical() {
    let coordinator = coordinator();
    for entry in &load_golden().datasets {
        let dataset = Arc::new(Dataset::from_values(entry.values.clone()).unwrap());
        let reports = execute_runs(&coordinator, &ALL_MODES, &dataset).unwrap();
        assert_eq!(reports.len(), 3);
        analyze_comparison_results(&reports)
            .unwrap_or_else(|e| panic!("{}: {e}", entry.name));
    }
}
