#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Command-line access to System V semaphores and message queues for shell scripts.
//!
//! Each tool command wraps one IPC call family: `ftok`, `semget`, `semctl`, `semop`, `msgget`,
//! `msgsnd` and `msgrcv`. The most involved one is `semop`, which applies a list of semaphore
//! operations as a single atomic `semop()` call and can then replace the process with a
//! guarded command:
//!
//! ```text
//! export IPCMD_SEMID=$(ipcmd semget -N 4)
//! ipcmd semctl setall 1
//! ipcmd semop -u 0:3=-1 : make install
//! ```
//!
//! Operands are parsed and validated by [`semspec`] before any kernel call is made.
//!
//! This crate provides the core logic, exposed via the [`run`] function. The binary entry point
//! is in `main.rs`.

mod argv;
mod config;
mod ftok;
mod kernel_error;
mod msg;
mod pal;
mod semctl;
mod semget;
mod semop;
mod supervisor;
mod types;

use std::io::{self, Read, Write};

pub use argv::protect_negative_operands;
pub use config::{Config, LOG_FILTER_VARIABLE, MSQID_VARIABLE, SEMID_VARIABLE};
pub use kernel_error::*;
use pal::{Kernel, KernelFacade, Launcher, LauncherFacade};
pub(crate) use supervisor::GuardedCommand;
pub use types::*;

/// Core logic of the tool, extracted for testability.
///
/// Reads the identifier defaults from the process environment and uses the real kernel, the
/// real process launcher and the standard streams.
///
/// # Errors
///
/// Returns a [`RunError`] describing the first problem. [`RunError::diagnostic`] renders it the
/// way the tool reports it and [`RunError::exit_code`] gives the matching exit code.
#[doc(hidden)]
pub fn run(args: &Args) -> Result<RunOutcome, RunError> {
    let config = Config::from_env();

    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();

    run_with(
        args,
        &config,
        &KernelFacade::target(),
        &LauncherFacade::target(),
        &mut input,
        &mut output,
    )
}

/// Internal implementation of `run` that accepts the process-global dependencies.
///
/// This allows mocking the kernel and the launcher in tests.
fn run_with(
    args: &Args,
    config: &Config,
    kernel: &impl Kernel,
    launcher: &impl Launcher,
    input: &mut impl Read,
    output: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    match &args.command {
        Command::Ftok(ftok) => ftok::run(ftok, kernel, output),
        Command::Semget(semget) => semget::run(semget, kernel, output),
        Command::Semctl(semctl) => semctl::run(semctl, config, kernel, output),
        Command::Semop(semop) => semop::run(semop, config, kernel, launcher),
        Command::Msgget(msgget) => msg::get(msgget, kernel, output),
        Command::Msgsnd(msgsnd) => msg::send(msgsnd, config, kernel, input),
        Command::Msgrcv(msgrcv) => msg::receive(msgrcv, config, kernel, output),
    }
}
