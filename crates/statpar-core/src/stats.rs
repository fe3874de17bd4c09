//! Pure statistic kernels.
//!
//! Every isolation mode funnels through these functions so that process,
//! thread and sequential runs perform the same floating-point operations in
//! the same order and therefore agree bit for bit.

use crate::dataset::Dataset;
use crate::worker::StatError;

/// Arithmetic mean: `sum / N` with an `i64` accumulator.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(dataset: &Dataset) -> f64 {
    dataset.sum() as f64 / dataset.len() as f64
}

/// Median over a private sorted copy; the shared dataset is left untouched.
///
/// Even N averages the elements at 0-indexed positions `N/2 - 1` and `N/2`;
/// odd N takes position `N/2`.
#[allow(clippy::cast_precision_loss)]
pub fn median(dataset: &Dataset) -> Result<f64, StatError> {
    let values = dataset.values();
    let mut copy: Vec<i32> = Vec::new();
    copy.try_reserve_exact(values.len())
        .map_err(|e| StatError::Allocation(e.to_string()))?;
    copy.extend_from_slice(values);
    copy.sort_unstable();

    let n = copy.len();
    let mid = n / 2;
    if n % 2 == 0 {
        let pair = i64::from(copy[mid]) + i64::from(copy[mid - 1]);
        Ok(pair as f64 / 2.0)
    } else {
        Ok(f64::from(copy[mid]))
    }
}

/// Population standard deviation (divisor N).
///
/// Recomputes the mean locally instead of taking one from another worker.
#[must_use]
pub fn deviation(dataset: &Dataset) -> f64 {
    let mean = mean(dataset);
    let squares: f64 = dataset
        .values()
        .iter()
        .map(|&v| {
            let diff = f64::from(v) - mean;
            diff * diff
        })
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let n = dataset.len() as f64;
    (squares / n).sqrt()
}
