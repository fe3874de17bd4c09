//! Engine results checked against the textbook reference definitions.

use std::sync::Arc;

use proptest::prelude::*;

use statpar_core::cancel::CancellationToken;
use statpar_core::dataset::Dataset;
use statpar_core::options::EngineOptions;
use statpar_orchestration::coordinator::Coordinator;
use statpar_orchestration::interfaces::{IsolationMode, RunReport};
use statpar_tests::{close, load_golden, reference, Expected};

fn run(mode: IsolationMode, values: Vec<i32>) -> RunReport {
    let dataset = Arc::new(Dataset::from_values(values).unwrap());
    Coordinator::new(EngineOptions::default(), CancellationToken::new())
        .execute(mode, &dataset)
        .unwrap()
}

fn assert_close(report: &RunReport, expected: Expected, label: &str) {
    let s = report.summary().expect("incomplete run");
    assert!(close(s.mean, expected.mean, 1e-9), "{label}: mean {} vs {}", s.mean, expected.mean);
    assert!(close(s.median, expected.median, 1e-9), "{label}: median {} vs {}", s.median, expected.median);
    assert!(
        close(s.deviation, expected.deviation, 1e-9),
        "{label}: deviation {} vs {}",
        s.deviation,
        expected.deviation
    );
}

#[test]
fn golden_cases_match_reference() {
    for case in load_golden().unwrap() {
        let r = reference(&case.values).unwrap();
        assert!(close(r.mean, case.expected.mean, 1e-9), "{}", case.name);
        assert!(close(r.median, case.expected.median, 1e-9), "{}", case.name);
        assert!(close(r.deviation, case.expected.deviation, 1e-9), "{}", case.name);
    }
}

#[test]
fn golden_cases_thread_and_sequential() {
    for case in load_golden().unwrap() {
        for mode in [IsolationMode::Thread, IsolationMode::Sequential] {
            let report = run(mode, case.values.clone());
            assert_close(&report, case.expected, &format!("{} [{mode}]", case.name));
        }
    }
}

#[test]
fn default_sized_dataset() {
    let opts = EngineOptions {
        seed: 2024,
        ..Default::default()
    };
    let dataset = opts.build_dataset().unwrap();
    assert_eq!(dataset.len(), 10_000);
    let expected = reference(dataset.values()).unwrap();
    let report = run(IsolationMode::Thread, dataset.values().to_vec());
    assert_close(&report, expected, "N=10000");
    assert!(report.creation_latency_ms <= report.total_latency_ms);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn thread_mode_matches_reference(values in prop::collection::vec(0i32..=100, 1..1_000)) {
        let expected = reference(&values).unwrap();
        let report = run(IsolationMode::Thread, values);
        let s = report.summary().unwrap();
        prop_assert!(close(s.mean, expected.mean, 1e-9));
        prop_assert!(close(s.median, expected.median, 1e-9));
        prop_assert!(close(s.deviation, expected.deviation, 1e-9));
    }
}
