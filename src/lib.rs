//! Shared fixtures for workspace-level integration tests.
//!
//! Holds the golden datasets and a deliberately naive reference
//! implementation of the three statistics, written straight from their
//! textbook definitions and independent of the engine's kernels.

use serde::Deserialize;

/// Golden file shared with the binary crate's tests.
pub const GOLDEN_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/crates/statpar/tests/testdata/golden.json"
);

/// Expected statistics for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Expected {
    pub mean: f64,
    pub median: f64,
    pub deviation: f64,
}

/// One golden dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct GoldenCase {
    pub name: String,
    pub values: Vec<i32>,
    #[serde(flatten)]
    pub expected: Expected,
}

#[derive(Deserialize)]
struct GoldenFile {
    datasets: Vec<GoldenCase>,
}

/// Load every golden dataset.
pub fn load_golden() -> Result<Vec<GoldenCase>, Box<dyn std::error::Error>> {
    let data = std::fs::read_to_string(GOLDEN_PATH)?;
    let file: GoldenFile = serde_json::from_str(&data)?;
    Ok(file.datasets)
}

/// Reference statistics; `None` for an empty input.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn reference(values: &[i32]) -> Option<Expected> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0
    } else {
        f64::from(sorted[mid])
    };

    let variance = values
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / n;

    Some(Expected {
        mean,
        median,
        deviation: variance.sqrt(),
    })
}

/// Whether two values agree within `tolerance`.
#[must_use]
pub fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
