//! Constants for dataset shape, channel framing, and process exit codes.

use std::time::Duration;

/// Default number of elements in a generated dataset.
pub const DEFAULT_ELEMENT_COUNT: usize = 10_000;

/// Default inclusive lower bound for generated values.
pub const DEFAULT_MIN_VALUE: i32 = 0;

/// Default inclusive upper bound for generated values.
pub const DEFAULT_MAX_VALUE: i32 = 100;

/// Largest dataset accepted by option validation.
///
/// 10^8 elements of `i32::MAX` still sum to about 2.1 * 10^17, well inside `i64`.
pub const MAX_ELEMENT_COUNT: usize = 100_000_000;

/// Default bounded wait for each expected result record.
pub const DEFAULT_RECORD_TIMEOUT: Duration = Duration::from_secs(10);

/// Granularity at which a blocked drain re-checks cancellation.
pub const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Size of one result record on the wire: 1 tag byte + 8 value bytes.
pub const RECORD_LEN: usize = 9;

/// Number of statistic workers in every run.
pub const WORKER_COUNT: usize = 3;

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// A worker missed its result deadline.
    pub const ERROR_TIMEOUT: i32 = 2;
    /// Isolation modes disagreed on a statistic.
    pub const ERROR_MISMATCH: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// Run cancelled by user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}
