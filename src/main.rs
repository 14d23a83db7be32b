use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zunda_voicegen::app::{self, RunError};
use zunda_voicegen::cli::Cli;
use zunda_voicegen::config_loader::Settings;

fn main() -> ExitCode {
    // Logging / tracing (stdout is reserved for progress lines)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = Settings::new()
        .map_err(RunError::Setup)
        .and_then(|settings| app::run(&cli, &settings));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::from(e.exit_code())
        }
    }
}
