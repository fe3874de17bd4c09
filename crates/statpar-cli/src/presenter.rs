//! CLI result presenter.

use statpar_orchestration::interfaces::{ResultPresenter, RunReport};

use crate::output::{format_stat, render_comparison, render_report, reports_to_json};
use crate::ui::{print_error, print_header, print_warning};

/// CLI result presenter.
pub struct CLIResultPresenter {
    verbose: bool,
    quiet: bool,
    json: bool,
}

impl CLIResultPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool, json: bool) -> Self {
        Self {
            verbose,
            quiet,
            json,
        }
    }

    fn print_json(reports: &[RunReport]) {
        match reports_to_json(reports) {
            Ok(json) => println!("{json}"),
            Err(e) => print_error(&format!("failed to serialize report: {e}")),
        }
    }
}

impl ResultPresenter for CLIResultPresenter {
    fn present_report(&self, report: &RunReport) {
        if self.json {
            Self::print_json(std::slice::from_ref(report));
            return;
        }
        if self.quiet {
            println!(
                "{} {} {}",
                format_stat(report.mean),
                format_stat(report.median),
                format_stat(report.deviation)
            );
            return;
        }

        print_header(&format!("statpar ({} isolation)", report.mode));
        for line in render_report(report, self.verbose) {
            println!("{line}");
        }
        let failed = report.failed_kinds();
        if !failed.is_empty() {
            let names: Vec<&str> = failed.iter().map(|k| k.as_str()).collect();
            print_warning(&format!("no result from: {}", names.join(", ")));
        }
    }

    fn present_comparison(&self, reports: &[RunReport]) {
        if self.json {
            Self::print_json(reports);
            return;
        }
        if self.quiet {
            return;
        }

        print_header("Comparison");
        for line in render_comparison(reports) {
            println!("{line}");
        }
    }

    fn present_error(&self, error: &str) {
        print_error(error);
    }
}
