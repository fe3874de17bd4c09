//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use statpar_core::constants::{DEFAULT_ELEMENT_COUNT, DEFAULT_MAX_VALUE, DEFAULT_MIN_VALUE};
use statpar_core::dataset::ValueRange;
use statpar_core::kind::StatKind;
use statpar_core::options::EngineOptions;
use statpar_core::worker::StatError;

/// statpar: mean, median and population standard deviation computed by
/// three isolated workers.
#[derive(Parser, Debug)]
#[command(name = "statpar", version, about)]
pub struct AppConfig {
    /// Number of dataset elements.
    #[arg(short = 'n', long, default_value_t = DEFAULT_ELEMENT_COUNT, env = "STATPAR_N")]
    pub count: usize,

    /// Smallest generated value (inclusive).
    #[arg(long, default_value_t = DEFAULT_MIN_VALUE, allow_negative_numbers = true)]
    pub min: i32,

    /// Largest generated value (inclusive).
    #[arg(long, default_value_t = DEFAULT_MAX_VALUE, allow_negative_numbers = true)]
    pub max: i32,

    /// Isolation mode: process, thread, sequential, or all.
    #[arg(long, default_value = "all", env = "STATPAR_MODE")]
    pub mode: String,

    /// Seed for dataset generation (random when omitted).
    #[arg(long, env = "STATPAR_SEED")]
    pub seed: Option<u64>,

    /// Bounded wait for each result record (e.g., "500ms", "10s", "1m").
    #[arg(long, default_value = "10s")]
    pub record_timeout: String,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode (only the three values).
    #[arg(short, long)]
    pub quiet: bool,

    /// Write the JSON report to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,

    /// Run as a single worker: read the dataset from stdin, write one
    /// record to stdout.
    #[arg(long, hide = true, value_name = "KIND")]
    pub worker: Option<StatKind>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse the record timeout string into a Duration.
    pub fn record_timeout_duration(&self) -> Result<Duration, StatError> {
        match parse_duration(&self.record_timeout) {
            Some(d) if !d.is_zero() => Ok(d),
            _ => Err(StatError::Config(format!(
                "invalid record timeout: {:?}",
                self.record_timeout
            ))),
        }
    }

    /// Build validated engine options; a missing seed is drawn at random.
    pub fn engine_options(&self) -> Result<EngineOptions, StatError> {
        let options = EngineOptions {
            element_count: self.count,
            value_range: ValueRange::new(self.min, self.max)?,
            seed: self.seed.unwrap_or_else(rand::random),
            record_timeout: self.record_timeout_duration()?,
        };
        options.validate()?;
        Ok(options)
    }
}

/// Parse a duration string like "500ms", "30s", "5m", "1h".
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.parse().ok()?;
        Some(Duration::from_millis(n))
    } else if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(60)?))
    } else if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(3600)?))
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.parse().ok()?;
        Some(Duration::from_secs(n))
    } else {
        let n: u64 = s.parse().ok()?;
        Some(Duration::from_secs(n))
    }
}
