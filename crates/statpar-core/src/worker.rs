//! Statistic worker trait and the three fixed worker roles.
//!
//! `StatWorker` is the trait consumed by orchestration. Each implementation
//! is a thin, stateless wrapper over a kernel in [`crate::stats`].

use std::sync::Arc;

use crate::dataset::Dataset;
use crate::kind::{StatKind, StatResult};
use crate::stats;

/// Error type for dataset construction and statistic computation.
#[derive(Debug, thiserror::Error)]
pub enum StatError {
    /// The dataset has no elements.
    #[error("dataset is empty")]
    EmptyDataset,

    /// The value range has `min > max`.
    #[error("invalid value range: [{min}, {max}]")]
    InvalidRange { min: i32, max: i32 },

    /// The private working copy could not be allocated.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// The dataset could not be encoded for, or decoded by, a worker process.
    #[error("dataset handoff failed: {0}")]
    Handoff(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Run was cancelled.
    #[error("run cancelled")]
    Cancelled,

    /// Results from different isolation modes don't match.
    #[error("result mismatch between isolation modes: {0}")]
    Mismatch(String),
}

/// A unit of computation producing exactly one [`StatResult`].
pub trait StatWorker: Send + Sync {
    /// Which statistic this worker produces.
    fn kind(&self) -> StatKind;

    /// Compute the raw value over a read-only dataset.
    fn compute(&self, dataset: &Dataset) -> Result<f64, StatError>;

    /// Compute and tag the value.
    fn run(&self, dataset: &Dataset) -> Result<StatResult, StatError> {
        let value = self.compute(dataset)?;
        Ok(StatResult::new(self.kind(), value))
    }

    /// Human-readable name.
    fn name(&self) -> &'static str;
}

/// Computes the arithmetic mean.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeanWorker;

impl StatWorker for MeanWorker {
    fn kind(&self) -> StatKind {
        StatKind::Mean
    }

    fn compute(&self, dataset: &Dataset) -> Result<f64, StatError> {
        Ok(stats::mean(dataset))
    }

    fn name(&self) -> &'static str {
        "MeanWorker"
    }
}

/// Computes the median over a private sorted copy.
#[derive(Debug, Default, Clone, Copy)]
pub struct MedianWorker;

impl StatWorker for MedianWorker {
    fn kind(&self) -> StatKind {
        StatKind::Median
    }

    fn compute(&self, dataset: &Dataset) -> Result<f64, StatError> {
        stats::median(dataset)
    }

    fn name(&self) -> &'static str {
        "MedianWorker"
    }
}

/// Computes the population standard deviation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviationWorker;

impl StatWorker for DeviationWorker {
    fn kind(&self) -> StatKind {
        StatKind::Deviation
    }

    fn compute(&self, dataset: &Dataset) -> Result<f64, StatError> {
        Ok(stats::deviation(dataset))
    }

    fn name(&self) -> &'static str {
        "DeviationWorker"
    }
}

/// The worker responsible for `kind`.
#[must_use]
pub fn worker_for(kind: StatKind) -> Arc<dyn StatWorker> {
    match kind {
        StatKind::Mean => Arc::new(MeanWorker),
        StatKind::Median => Arc::new(MedianWorker),
        StatKind::Deviation => Arc::new(DeviationWorker),
    }
}
