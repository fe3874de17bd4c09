//! # statpar-core
//!
//! Core library for statpar: the immutable dataset, the three statistic
//! workers (mean, median, population standard deviation), the fixed-size
//! result record used between worker processes and the coordinator, and
//! run options.

pub mod baseline;
pub mod cancel;
pub mod constants;
pub mod dataset;
pub mod kind;
pub mod options;
pub mod stats;
pub mod wire;
pub mod worker;

// Re-exports
pub use baseline::{compute_sequential, StatSummary};
pub use cancel::CancellationToken;
pub use constants::{exit_codes, DEFAULT_ELEMENT_COUNT, DEFAULT_RECORD_TIMEOUT, RECORD_LEN};
pub use dataset::{Dataset, ValueRange};
pub use kind::{StatKind, StatResult};
pub use options::EngineOptions;
pub use wire::{RecordReader, WireError};
pub use worker::{worker_for, StatError, StatWorker};

/// Compute all three statistics of `values` sequentially.
///
/// Convenience entry point for simple use cases. For isolated, parallel
/// runs use the coordinator in `statpar-orchestration`.
///
/// # Example
/// ```
/// let s = statpar_core::summarize(vec![0, 100, 50, 50]).unwrap();
/// assert_eq!(s.mean, 50.0);
/// assert_eq!(s.median, 50.0);
/// assert!((s.deviation - 35.355339).abs() < 1e-6);
/// ```
pub fn summarize(values: Vec<i32>) -> Result<StatSummary, StatError> {
    let dataset = Dataset::from_values(values)?;
    compute_sequential(&dataset)
}
