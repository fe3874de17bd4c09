//! statpar: parallel mean, median and standard deviation.

use statpar_cli::ui::print_error;
use statpar_lib::{app, config, errors};

fn main() {
    // Initialize tracing. Stdout is reserved for results, and in worker
    // mode for the result record alone.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let config = config::AppConfig::parse();
    if let Err(err) = app::run(&config) {
        let code = errors::exit_code(&err);
        print_error(&format!("{err:#}"));
        std::process::exit(code);
    }
}
