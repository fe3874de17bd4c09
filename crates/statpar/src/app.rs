//! Application entry point and dispatch.

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use statpar_cli::output::write_report_json;
use statpar_cli::presenter::CLIResultPresenter;
use statpar_cli::ui::print_success;
use statpar_core::cancel::CancellationToken;
use statpar_core::kind::StatKind;
use statpar_orchestration::coordinator::Coordinator;
use statpar_orchestration::interfaces::ResultPresenter;
use statpar_orchestration::mode_selection::get_modes_to_run;
use statpar_orchestration::orchestrator::{analyze_comparison_results, execute_runs};
use statpar_orchestration::process::{raw_stdout, run_worker};

use crate::config::AppConfig;
use crate::errors::AppError;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Re-executed as a process-isolated worker
    if let Some(kind) = config.worker {
        return run_worker_mode(kind);
    }

    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        statpar_cli::completion::generate_completion(&mut cmd, shell, &mut io::stdout());
        return Ok(());
    }

    run_cli(config)
}

fn run_worker_mode(kind: StatKind) -> Result<()> {
    let mut out = raw_stdout().context("cannot open stdout for the result record")?;
    run_worker(kind, io::stdin().lock(), &mut out)
        .map_err(|source| AppError::Worker { kind, source })?;
    Ok(())
}

fn run_cli(config: &AppConfig) -> Result<()> {
    let modes = get_modes_to_run(&config.mode)?;
    let options = config.engine_options()?;
    info!(
        seed = options.seed,
        elements = options.element_count,
        min = options.value_range.min,
        max = options.value_range.max,
        "generating dataset"
    );
    let dataset = Arc::new(options.build_dataset()?);

    let cancel = CancellationToken::new();
    ctrlc_handler(cancel.clone());

    let coordinator = Coordinator::new(options, cancel);
    let reports = execute_runs(&coordinator, &modes, &dataset)?;

    // Present results
    let presenter = CLIResultPresenter::new(config.verbose, config.quiet, config.json);
    match reports.as_slice() {
        [single] => presenter.present_report(single),
        many => {
            if !config.json {
                for report in many {
                    presenter.present_report(report);
                }
            }
            presenter.present_comparison(many);
        }
    }

    // Write to file if requested
    if let Some(ref path) = config.output {
        write_report_json(path, &reports)
            .with_context(|| format!("cannot write report to {}", path.display()))?;
    }

    // Analyze results
    let incomplete = reports.iter().filter(|r| !r.is_complete()).count();
    if reports.len() > 1 && incomplete < reports.len() {
        analyze_comparison_results(&reports)?;
        if !config.quiet && !config.json {
            print_success("complete runs agree bit for bit");
        }
    }
    if incomplete > 0 {
        return Err(AppError::Incomplete(incomplete).into());
    }

    Ok(())
}

fn ctrlc_handler(cancel: CancellationToken) {
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .expect("Error setting Ctrl+C handler");
}
