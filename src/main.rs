//! aves - Main Entry Point
//!
//! Parses the command line, sets up logging and runs the selected command.

use anyhow::Context;
use aves_rs::cli::{Cli, Command};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "info,aves_rs=trace"
    } else {
        "info,aves_rs=debug"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let what = match &cli.command {
        Command::Acquire(args) => format!("acquisition from {}", args.port),
        Command::Explore(_) => "log exploration".to_string(),
        Command::Init(args) => format!("template {}", args.template),
    };
    tracing::info!("Starting {}", what);
    aves_rs::app::run(cli).with_context(|| format!("{} failed", what))
}
