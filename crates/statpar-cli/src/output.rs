//! CLI output formatting.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use statpar_core::kind::StatKind;
use statpar_orchestration::interfaces::{RunReport, SlotOutcome, WorkerExit};

/// Format one statistic slot with six decimals, or `FAILED`.
#[must_use]
pub fn format_stat(slot: SlotOutcome) -> String {
    match slot {
        SlotOutcome::Received(v) => format!("{v:.6}"),
        SlotOutcome::Failed => "FAILED".to_string(),
    }
}

/// Format a latency in milliseconds with three decimals.
#[must_use]
pub fn format_ms(ms: f64) -> String {
    format!("{ms:.3} ms")
}

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 0.001 {
        format!("{:.2}µs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.3}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Format a count with thousand separators.
#[must_use]
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Short description of how a worker ended.
#[must_use]
pub fn format_exit(exit: &WorkerExit) -> String {
    match exit {
        WorkerExit::Exited(code) => format!("exited {code}"),
        WorkerExit::Abnormal(reason) => format!("abnormal ({reason})"),
        WorkerExit::Killed => "killed after deadline".to_string(),
    }
}

/// Body lines of a single-run report.
#[must_use]
pub fn render_report(report: &RunReport, verbose: bool) -> Vec<String> {
    let mut lines = vec![
        format!("Mode:             {}", report.mode),
        format!("Elements:         {}", format_number(report.element_count)),
    ];
    for kind in StatKind::ALL {
        lines.push(format!(
            "{:<18}{}",
            format!("{}:", capitalize(kind.as_str())),
            format_stat(report.slot(kind))
        ));
    }
    lines.push(format!(
        "Creation latency: {}",
        format_ms(report.creation_latency_ms)
    ));
    lines.push(format!("Total latency:    {}", format_ms(report.total_latency_ms)));
    if verbose {
        for (kind, exit) in &report.exits {
            lines.push(format!("  {kind} worker: {}", format_exit(exit)));
        }
    }
    lines
}

/// Rows of the side-by-side comparison table.
#[must_use]
pub fn render_comparison(reports: &[RunReport]) -> Vec<String> {
    let mut lines = vec![
        format!(
            "  {:<11} {:>12} {:>12} {:>12} {:>13} {:>13}  {}",
            "mode", "mean", "median", "deviation", "creation", "total", "status"
        ),
        format!("{:-<90}", ""),
    ];
    for report in reports {
        let status = if report.is_complete() { "OK" } else { "INCOMPLETE" };
        lines.push(format!(
            "  {:<11} {:>12} {:>12} {:>12} {:>13} {:>13}  [{status}]",
            report.mode.as_str(),
            format_stat(report.mean),
            format_stat(report.median),
            format_stat(report.deviation),
            format_ms(report.creation_latency_ms),
            format_duration(report.total.duration()),
        ));
    }
    lines
}

/// Serialize reports as pretty JSON: one object, or an array for several runs.
pub fn reports_to_json(reports: &[RunReport]) -> serde_json::Result<String> {
    match reports {
        [single] => serde_json::to_string_pretty(single),
        many => serde_json::to_string_pretty(many),
    }
}

/// Write the JSON report to a file.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_report_json(path: &Path, reports: &[RunReport]) -> io::Result<()> {
    let json = reports_to_json(reports)?;
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{json}")?;
    debug!(path = %path.display(), runs = reports.len(), "report written");
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statpar_orchestration::interfaces::IsolationMode;
    use statpar_orchestration::timing::TimingSample;

    fn report() -> RunReport {
        let timing = TimingSample::instant();
        RunReport {
            mode: IsolationMode::Process,
            mean: SlotOutcome::Received(50.0),
            median: SlotOutcome::Received(50.0),
            deviation: SlotOutcome::Received(35.355_339_059_327_38),
            element_count: 10_000,
            creation: timing,
            total: timing,
            creation_latency_ms: 1.5,
            total_latency_ms: 12.25,
            exits: vec![
                (StatKind::Mean, WorkerExit::Exited(0)),
                (StatKind::Median, WorkerExit::Exited(0)),
                (StatKind::Deviation, WorkerExit::Killed),
            ],
        }
    }

    #[test]
    fn stat_has_six_decimals() {
        assert_eq!(format_stat(SlotOutcome::Received(35.355_339_059)), "35.355339");
        assert_eq!(format_stat(SlotOutcome::Failed), "FAILED");
    }

    #[test]
    fn ms_has_three_decimals() {
        assert_eq!(format_ms(1.0), "1.000 ms");
        assert_eq!(format_ms(0.123_456), "0.123 ms");
    }

    #[test]
    fn format_duration_ranges() {
        assert!(format_duration(Duration::from_nanos(500)).contains("µs"));
        assert!(format_duration(Duration::from_millis(42)).contains("ms"));
        assert_eq!(format_duration(Duration::from_millis(2_500)), "2.500s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m30.0s");
    }

    #[test]
    fn format_number_thousands() {
        assert_eq!(format_number(1_000_000), "1,000,000");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(10_000), "10,000");
    }

    #[test]
    fn report_lines() {
        let lines = render_report(&report(), false);
        assert_eq!(lines[0], "Mode:             process");
        assert_eq!(lines[1], "Elements:         10,000");
        assert_eq!(lines[2], "Mean:             50.000000");
        assert_eq!(lines[4], "Deviation:        35.355339");
        assert_eq!(lines[5], "Creation latency: 1.500 ms");
        assert_eq!(lines[6], "Total latency:    12.250 ms");
        assert_eq!(lines.len(), 7);
    }

    #[test]
    fn verbose_report_lists_exits() {
        let lines = render_report(&report(), true);
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[9], "  deviation worker: killed after deadline");
    }

    #[test]
    fn comparison_marks_incomplete_runs() {
        let mut failed = report();
        failed.median = SlotOutcome::Failed;
        let lines = render_comparison(&[report(), failed]);
        assert_eq!(lines.len(), 4);
        assert!(lines[2].ends_with("[OK]"));
        assert!(lines[3].contains("FAILED"));
        assert!(lines[3].ends_with("[INCOMPLETE]"));
    }

    #[test]
    fn json_single_and_many() {
        let one: serde_json::Value =
            serde_json::from_str(&reports_to_json(&[report()]).unwrap()).unwrap();
        assert_eq!(one["mode"], "process");
        assert_eq!(one["element_count"], 10_000);
        assert_eq!(one["mean"]["status"], "received");
        assert_eq!(one["mean"]["value"], 50.0);
        assert_eq!(one["total_latency_ms"], 12.25);

        let mut failed = report();
        failed.deviation = SlotOutcome::Failed;
        let many: serde_json::Value =
            serde_json::from_str(&reports_to_json(&[report(), failed]).unwrap()).unwrap();
        assert_eq!(many.as_array().unwrap().len(), 2);
        assert_eq!(many[1]["deviation"]["status"], "failed");
    }

    #[test]
    fn report_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report_json(&path, &[report(), report()]).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.as_array().map(Vec::len), Some(2));
        assert_eq!(written[1]["deviation"]["status"], "received");

        let missing = dir.path().join("no-such-dir").join("report.json");
        assert!(write_report_json(&missing, &[report()]).is_err());
    }

    #[test]
    fn capitalize_kind_names() {
        assert_eq!(capitalize("median"), "Median");
        assert_eq!(capitalize(""), "");
    }
}
