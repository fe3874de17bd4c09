//! Sequential baseline: all three statistics in the calling thread.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::kind::StatKind;
use crate::stats;
use crate::worker::StatError;

/// The three statistics of one complete run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub mean: f64,
    pub median: f64,
    pub deviation: f64,
}

impl StatSummary {
    /// Value for one statistic.
    #[must_use]
    pub fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Mean => self.mean,
            StatKind::Median => self.median,
            StatKind::Deviation => self.deviation,
        }
    }

    /// Bitwise equality, so that `NaN` and signed zeros compare strictly.
    #[must_use]
    pub fn bit_identical(&self, other: &Self) -> bool {
        StatKind::ALL
            .iter()
            .all(|&k| self.get(k).to_bits() == other.get(k).to_bits())
    }
}

/// Compute mean, median and deviation one after another.
pub fn compute_sequential(dataset: &Dataset) -> Result<StatSummary, StatError> {
    Ok(StatSummary {
        mean: stats::mean(dataset),
        median: stats::median(dataset)?,
        deviation: stats::deviation(dataset),
    })
}
