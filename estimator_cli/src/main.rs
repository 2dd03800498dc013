//! # Estimator CLI
//!
//! Terminal front end for holiday lighting estimates. Each invocation loads
//! the saved estimate, runs one command, and saves any change.
//!
//! ```text
//! estimator                          # show the estimate
//! estimator apply-preset High-End
//! estimator add count --label "Porch garland" --qty 2 --rate 40
//! estimator quote --pdf quote.pdf
//! ```
//!
//! Log output goes to stderr. `RUST_LOG` wins over `-v` when set.

mod cli;
mod commands;
mod render;

use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use estimator_core::config::load_config;
use estimator_core::errors::{EstimateError, EstimateResult};
use estimator_core::session::{Session, SessionOptions};
use estimator_core::store::FileStore;

use crate::cli::{Cli, Command};
use crate::commands::{execute, Output};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let json = cli.json;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, json);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> EstimateResult<()> {
    let cwd = std::env::current_dir()
        .map_err(|e| EstimateError::file_error("read working directory", ".", e.to_string()))?;
    let loaded = load_config(&cli.overrides(), |key| std::env::var(key).ok(), &cwd)?;

    let store = FileStore::new(&loaded.config.data_dir);
    debug!(dir = %store.dir().display(), "opening estimate store");
    let mut session = Session::open(store, SessionOptions::from(&loaded));

    let command = cli.command.unwrap_or(Command::Show);
    execute(&mut session, command, &loaded.config.export_dir, Output { json: cli.json })
}

fn report_error(err: &EstimateError, json: bool) {
    if json {
        let body = json!({
            "code": err.error_code(),
            "message": err.to_string(),
            "error": err,
        });
        match serde_json::to_string_pretty(&body) {
            Ok(text) => eprintln!("{}", text),
            Err(_) => eprintln!("{}", err),
        }
    } else {
        eprintln!("error: {}", err);
    }
}
