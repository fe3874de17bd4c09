//! The immutable input dataset shared by all workers.
//!
//! A `Dataset` is created once, never mutated, and either shared by
//! reference (thread isolation) or serialized once and handed to each
//! worker process (process isolation).

use std::io::{Read, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::worker::StatError;

/// Inclusive range of generated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Smallest allowed value.
    pub min: i32,
    /// Largest allowed value.
    pub max: i32,
}

impl ValueRange {
    /// Create a range, rejecting `min > max`.
    pub fn new(min: i32, max: i32) -> Result<Self, StatError> {
        if min > max {
            return Err(StatError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Whether `value` lies inside the range.
    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: crate::constants::DEFAULT_MIN_VALUE,
            max: crate::constants::DEFAULT_MAX_VALUE,
        }
    }
}

/// Ordered, non-empty sequence of integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct Dataset {
    values: Vec<i32>,
}

impl Dataset {
    /// Wrap existing values. Fails on an empty input.
    pub fn from_values(values: Vec<i32>) -> Result<Self, StatError> {
        if values.is_empty() {
            return Err(StatError::EmptyDataset);
        }
        Ok(Self { values })
    }

    /// Generate `count` uniformly distributed values in `range` from `seed`.
    ///
    /// The same `(count, range, seed)` always yields the same dataset.
    ///
    /// # Example
    /// ```
    /// use statpar_core::dataset::{Dataset, ValueRange};
    ///
    /// let a = Dataset::generate(100, ValueRange::default(), 7).unwrap();
    /// let b = Dataset::generate(100, ValueRange::default(), 7).unwrap();
    /// assert_eq!(a, b);
    /// assert!(a.values().iter().all(|v| (0..=100).contains(v)));
    /// ```
    pub fn generate(count: usize, range: ValueRange, seed: u64) -> Result<Self, StatError> {
        if count == 0 {
            return Err(StatError::EmptyDataset);
        }
        let range = ValueRange::new(range.min, range.max)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let values = (0..count)
            .map(|_| rng.gen_range(range.min..=range.max))
            .collect();
        tracing::debug!(count, min = range.min, max = range.max, seed, "dataset generated");
        Ok(Self { values })
    }

    /// The values, in generation order.
    #[must_use]
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Number of elements (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the dataset has no elements; `false` for every constructed `Dataset`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sum of all elements in a widened accumulator.
    #[must_use]
    pub fn sum(&self) -> i64 {
        self.values.iter().map(|&v| i64::from(v)).sum()
    }

    /// Serialize for handoff to a worker process.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), StatError> {
        serde_json::to_writer(writer, &self.values)
            .map_err(|e| StatError::Handoff(e.to_string()))
    }

    /// Read a dataset previously written with [`Dataset::write_to`].
    pub fn read_from<R: Read>(reader: R) -> Result<Self, StatError> {
        let values: Vec<i32> =
            serde_json::from_reader(reader).map_err(|e| StatError::Handoff(e.to_string()))?;
        Self::from_values(values)
    }
}

impl TryFrom<Vec<i32>> for Dataset {
    type Error = StatError;

    fn try_from(values: Vec<i32>) -> Result<Self, Self::Error> {
        Self::from_values(values)
    }
}

impl From<Dataset> for Vec<i32> {
    fn from(dataset: Dataset) -> Self {
        dataset.values
    }
}
