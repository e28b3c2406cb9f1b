mod cli;
mod commands;
mod model;
mod scoring;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::scoring::ScoreError;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        let category = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<ScoreError>())
            .map(ScoreError::category)
            .unwrap_or("internal");
        error!(error = %err, category, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Score(args) => commands::score::run(args),
        Commands::Batch(args) => commands::batch::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
