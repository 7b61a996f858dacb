//! # plugdash: smart plug dashboard
//!
//! Composition root that wires the REST client and token store into the
//! application services and runs one command.
//!
//! ## Responsibilities
//! - Parse the command line and load configuration (file, then env vars)
//! - Install the tracing subscriber (stderr, `EnvFilter`)
//! - Construct the reqwest client and file token store (adapters)
//! - Construct application services, injecting adapters via port traits
//! - Print the full error chain and exit non-zero on failure
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod cli;
mod commands;
mod config;
mod render;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::App;
use crate::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    init_tracing(&config.logging.filter);
    tracing::debug!(base_url = %config.api.base_url, "configuration loaded");

    let app = App::build(&config)?;
    app.run(cli.command).await
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("warning: ignoring log filter {filter:?}: {err}");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
