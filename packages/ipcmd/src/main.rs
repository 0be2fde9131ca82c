#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))]

//! Binary entry point for the ipcmd tool.
//!
//! This module is excluded from mutation testing because testing process entry/exit behavior
//! is impractical - it requires spawning subprocesses and checking exit codes.

use std::io;
use std::process::ExitCode;

use argh::FromArgs;
use ipcmd::{Args, LOG_FILTER_VARIABLE, protect_negative_operands, run};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// Binary entry point - mutations would require subprocess testing which is impractical.
#[cfg_attr(test, mutants::skip)]
fn main() -> ExitCode {
    init_logging();

    let env_args = protect_negative_operands(std::env::args().collect());

    // Convert to &str for argh.
    let str_args: Vec<&str> = env_args.iter().map(String::as_str).collect();

    let program_name = str_args.first().copied().unwrap_or("ipcmd");

    let args = match Args::from_args(&[program_name], str_args.get(1..).unwrap_or_default()) {
        Ok(args) => args,
        Err(early_exit) => {
            return if early_exit.status.is_ok() {
                println!("{}", early_exit.output);
                ExitCode::SUCCESS
            } else {
                eprintln!("{}", early_exit.output);
                ExitCode::FAILURE
            };
        }
    };

    match run(&args) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            eprintln!("{}", e.diagnostic(args.command.name()));
            ExitCode::from(e.exit_code())
        }
    }
}

/// Sends log events to stderr, filtered by `IPCMD_LOG` (default: `warn`).
///
/// Standard output carries command results only, so scripts can capture it safely.
#[cfg_attr(test, mutants::skip)]
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_FILTER_VARIABLE)
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}
