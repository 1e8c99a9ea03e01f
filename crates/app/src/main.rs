use std::process::ExitCode;

use clap::Parser;

use crate::{cli::Cli, settings::Settings};

mod cli;
mod error;
mod handlers;
mod settings;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match Settings::load(&cli.overrides) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("corrida: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "corrida={level},engine={level}",
            level = settings.log_level
        ))
        .with_writer(std::io::stderr)
        .init();

    match handlers::run(cli.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("command failed: {err}");
            eprintln!("corrida: {err}");
            ExitCode::FAILURE
        }
    }
}
