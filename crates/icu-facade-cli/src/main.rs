#![forbid(unsafe_code)]

mod assets;
mod cli;
mod command_format;
mod command_locale;
mod command_segment;
mod command_verify;
mod config;
mod error;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::cli::CliAppError;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ICU_FACADE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliAppError::Usage(message)) => {
            eprintln!("{message}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
