//! Statistic kinds and the tagged result each worker produces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::worker::StatError;

/// The three fixed worker roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    /// Arithmetic mean.
    Mean,
    /// Median (average of the two middle elements for even N).
    Median,
    /// Population standard deviation.
    Deviation,
}

impl StatKind {
    /// All kinds, in spawn order.
    pub const ALL: [StatKind; 3] = [StatKind::Mean, StatKind::Median, StatKind::Deviation];

    /// Wire tag for this kind.
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Mean => 1,
            Self::Median => 2,
            Self::Deviation => 3,
        }
    }

    /// Decode a wire tag.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Mean),
            2 => Some(Self::Median),
            3 => Some(Self::Deviation),
            _ => None,
        }
    }

    /// Position of this kind in [`StatKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Mean => 0,
            Self::Median => 1,
            Self::Deviation => 2,
        }
    }

    /// Lowercase name, as accepted on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Deviation => "deviation",
        }
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKind {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "median" => Ok(Self::Median),
            "deviation" | "stddev" => Ok(Self::Deviation),
            other => Err(StatError::Config(format!("unknown statistic: {other}"))),
        }
    }
}

/// One tagged result, produced by exactly one worker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatResult {
    /// Which statistic this is.
    pub kind: StatKind,
    /// The computed value.
    pub value: f64,
}

impl StatResult {
    #[must_use]
    pub const fn new(kind: StatKind, value: f64) -> Self {
        Self { kind, value }
    }
}
