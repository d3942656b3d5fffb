use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use indicatif::style::TemplateError;
use plume_fluids::{ConfigError, FluidError};
use plume_io::{decode::DecodingError, encode::EncodingError};
use thiserror::Error;
use tracing::error;
use tracing_subscriber::EnvFilter;

use run::RunArgs;

mod emitter;
mod inspect;
mod run;

/// Stable-fluids smoke solver.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Runs the solver, optionally recording frames.
    Run(RunArgs),
    /// Summarises a recording.
    Inspect { path: PathBuf },
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fluid(#[from] FluidError),

    #[error("failed to record frames: {0}")]
    Encoding(#[from] EncodingError),

    #[error("failed to read recording: {0}")]
    Decoding(#[from] DecodingError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Command::Run(args) => run::run(args),
        Command::Inspect { path } => inspect::inspect(path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
