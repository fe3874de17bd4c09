//! Run options and validation.

use std::time::Duration;

use crate::constants::{
    DEFAULT_ELEMENT_COUNT, DEFAULT_RECORD_TIMEOUT, MAX_ELEMENT_COUNT,
};
use crate::dataset::{Dataset, ValueRange};
use crate::worker::StatError;

/// Options for one statistics run.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Number of dataset elements.
    pub element_count: usize,
    /// Inclusive range of generated values.
    pub value_range: ValueRange,
    /// Seed for dataset generation.
    pub seed: u64,
    /// Bounded wait for each expected result record.
    pub record_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            element_count: DEFAULT_ELEMENT_COUNT,
            value_range: ValueRange::default(),
            seed: 0,
            record_timeout: DEFAULT_RECORD_TIMEOUT,
        }
    }
}

impl EngineOptions {
    /// Normalize options, applying defaults where values are zero.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.element_count == 0 {
            self.element_count = DEFAULT_ELEMENT_COUNT;
        }
        if self.record_timeout.is_zero() {
            self.record_timeout = DEFAULT_RECORD_TIMEOUT;
        }
        self
    }

    /// Reject option combinations no run can satisfy.
    pub fn validate(&self) -> Result<(), StatError> {
        if self.element_count == 0 {
            return Err(StatError::Config("element count must be at least 1".into()));
        }
        if self.element_count > MAX_ELEMENT_COUNT {
            return Err(StatError::Config(format!(
                "element count {} exceeds maximum {MAX_ELEMENT_COUNT}",
                self.element_count
            )));
        }
        ValueRange::new(self.value_range.min, self.value_range.max)?;
        Ok(())
    }

    /// Validate, then generate the dataset these options describe.
    pub fn build_dataset(&self) -> Result<Dataset, StatError> {
        self.validate()?;
        Dataset::generate(self.element_count, self.value_range, self.seed)
    }
}
