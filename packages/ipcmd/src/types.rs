// Public API types for ipcmd.
//
// These types are used by main.rs and exposed via the crate's public API.

use std::io;

use argh::FromArgs;
use thiserror::Error;

use crate::config::{parse_key, parse_mode};
use crate::{KernelCall, KernelError, KernelFailure};

/// Command-line access to System V semaphores and message queues for shell scripts.
#[derive(Debug, FromArgs)]
#[non_exhaustive]
pub struct Args {
    /// the tool command to run
    #[argh(subcommand)]
    pub command: Command,
}

/// The tool commands, one per System V IPC call family.
#[derive(Debug, FromArgs)]
#[argh(subcommand)]
#[non_exhaustive]
pub enum Command {
    /// Generate an IPC key.
    Ftok(FtokArgs),
    /// Create a semaphore set.
    Semget(SemgetArgs),
    /// Initialize or query semaphores.
    Semctl(SemctlArgs),
    /// Apply semaphore operations, optionally guarding a command.
    Semop(SemopArgs),
    /// Create a message queue.
    Msgget(MsggetArgs),
    /// Send messages.
    Msgsnd(MsgsndArgs),
    /// Receive a message.
    Msgrcv(MsgrcvArgs),
}

impl Command {
    /// The command name as typed on the command line, used to prefix diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ftok(_) => "ftok",
            Self::Semget(_) => "semget",
            Self::Semctl(_) => "semctl",
            Self::Semop(_) => "semop",
            Self::Msgget(_) => "msgget",
            Self::Msgsnd(_) => "msgsnd",
            Self::Msgrcv(_) => "msgrcv",
        }
    }
}

/// generate an IPC key from a path and a project identifier
#[derive(Debug, Default, FromArgs)]
#[argh(subcommand, name = "ftok")]
#[non_exhaustive]
pub struct FtokArgs {
    /// an existing path (default: .), then a project identifier from 1 to 255 (default: 1)
    #[argh(positional, greedy)]
    pub operands: Vec<String>,
}

/// create a semaphore set and print its identifier
#[derive(Debug, Default, FromArgs)]
#[argh(subcommand, name = "semget")]
#[non_exhaustive]
pub struct SemgetArgs {
    /// create the set associated with this hexadecimal key instead of a private set
    #[argh(option, short = 'S', from_str_fn(parse_key))]
    pub key: Option<libc::key_t>,

    /// no error if the set already exists (requires -S)
    #[argh(switch, short = 'e')]
    pub exist_ok: bool,

    /// read/alter permissions as an octal value (default: 600)
    #[argh(option, short = 'm', from_str_fn(parse_mode))]
    pub mode: Option<i32>,

    /// number of semaphores in the set (default: 1)
    #[argh(option, short = 'N', default = "1")]
    pub nsems: i32,
}

/// initialize or query the semaphores of a set
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "semctl")]
#[non_exhaustive]
pub struct SemctlArgs {
    /// semaphore set identifier (default: $IPCMD_SEMID)
    #[argh(option, short = 's')]
    pub semid: Option<i32>,

    /// the query or update to perform
    #[argh(subcommand)]
    pub command: SemctlCommand,
}

/// The queries and updates that `semctl` can perform.
#[derive(Debug, FromArgs)]
#[argh(subcommand)]
#[non_exhaustive]
pub enum SemctlCommand {
    /// Print the value of one semaphore.
    Getval(GetvalArgs),
    /// Print the process that last operated on one semaphore.
    Getpid(GetpidArgs),
    /// Print how many processes wait for one semaphore to increase.
    Getncnt(GetncntArgs),
    /// Print how many processes wait for one semaphore to become zero.
    Getzcnt(GetzcntArgs),
    /// Set the value of one semaphore.
    Setval(SetvalArgs),
    /// Print the values of all semaphores.
    Getall(GetallArgs),
    /// Set the values of all semaphores.
    Setall(SetallArgs),
}

/// print the value of a semaphore
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "getval")]
#[non_exhaustive]
pub struct GetvalArgs {
    /// semaphore number within the set
    #[argh(positional)]
    pub semnum: i32,
}

/// print the process ID of the last process to operate on a semaphore
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "getpid")]
#[non_exhaustive]
pub struct GetpidArgs {
    /// semaphore number within the set
    #[argh(positional)]
    pub semnum: i32,
}

/// print the number of processes waiting for a semaphore to increase
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "getncnt")]
#[non_exhaustive]
pub struct GetncntArgs {
    /// semaphore number within the set
    #[argh(positional)]
    pub semnum: i32,
}

/// print the number of processes waiting for a semaphore to become zero
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "getzcnt")]
#[non_exhaustive]
pub struct GetzcntArgs {
    /// semaphore number within the set
    #[argh(positional)]
    pub semnum: i32,
}

/// set the value of a semaphore
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "setval")]
#[non_exhaustive]
pub struct SetvalArgs {
    /// semaphore number within the set
    #[argh(positional)]
    pub semnum: i32,

    /// new value of the semaphore
    #[argh(positional)]
    pub semval: i32,
}

/// print the values of all semaphores in the set, separated by spaces
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "getall")]
#[non_exhaustive]
pub struct GetallArgs {}

/// set all semaphores from one VALUE or from LOWER[:UPPER]=VALUE assignments covering the set
#[derive(Debug, FromArgs)]
#[argh(subcommand, name = "setall")]
#[non_exhaustive]
pub struct SetallArgs {
    /// a single value for every semaphore, or assignments addressing each semaphore once
    #[argh(positional, greedy)]
    pub values: Vec<String>,
}

/// apply semaphore operations atomically, then optionally run a command after ':'
#[derive(Debug, Default, FromArgs)]
#[argh(subcommand, name = "semop")]
#[non_exhaustive]
pub struct SemopArgs {
    /// semaphore set identifier (default: $IPCMD_SEMID)
    #[argh(option, short = 's')]
    pub semid: Option<i32>,

    /// fail with exit code 2 instead of blocking (adds IPC_NOWAIT to every operation)
    #[argh(switch, short = 'n')]
    pub no_wait: bool,

    /// undo the operations when the process exits (adds SEM_UNDO to every operation)
    #[argh(switch, short = 'u')]
    pub undo: bool,

    /// VALUE[FLAGS] or LOWER[:UPPER]=VALUE[FLAGS]..., optionally followed by ': COMMAND [ARGS...]'
    #[argh(positional, greedy)]
    pub operands: Vec<String>,
}

/// create a message queue and print its identifier
#[derive(Debug, Default, FromArgs)]
#[argh(subcommand, name = "msgget")]
#[non_exhaustive]
pub struct MsggetArgs {
    /// create the queue associated with this hexadecimal key instead of a private queue
    #[argh(option, short = 'Q', from_str_fn(parse_key))]
    pub key: Option<libc::key_t>,

    /// no error if the queue already exists (requires -Q)
    #[argh(switch, short = 'e')]
    pub exist_ok: bool,

    /// read/write permissions as an octal value (default: 600)
    #[argh(option, short = 'm', from_str_fn(parse_mode))]
    pub mode: Option<i32>,
}

/// send each argument as a message, or standard input if there are no arguments
#[derive(Debug, Default, FromArgs)]
#[argh(subcommand, name = "msgsnd")]
#[non_exhaustive]
pub struct MsgsndArgs {
    /// message queue identifier (default: $IPCMD_MSQID)
    #[argh(option, short = 'q')]
    pub msqid: Option<i32>,

    /// message type, a positive integer (default: 1)
    #[argh(option, short = 't', default = "1")]
    pub mtype: libc::c_long,

    /// fail with exit code 2 instead of blocking when the queue is full
    #[argh(switch, short = 'n')]
    pub no_wait: bool,

    /// the messages to send
    #[argh(positional, greedy)]
    pub messages: Vec<String>,
}

/// receive a message and write its text to standard output
#[derive(Debug, Default, FromArgs)]
#[argh(subcommand, name = "msgrcv")]
#[non_exhaustive]
pub struct MsgrcvArgs {
    /// message queue identifier (default: $IPCMD_MSQID)
    #[argh(option, short = 'q')]
    pub msqid: Option<i32>,

    /// message type to receive: 0 for any, a positive type for that type, or a negative type
    /// for the lowest type up to its absolute value (default: 0)
    #[argh(option, short = 't', default = "0")]
    pub msgtyp: libc::c_long,

    /// fail with exit code 2 instead of blocking when no message is available
    #[argh(switch, short = 'n')]
    pub no_wait: bool,

    /// print the type of the received message to standard error
    #[argh(switch, short = 'v')]
    pub verbose: bool,
}

/// The outcome of a run that did not fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum RunOutcome {
    /// The command finished and its output, if any, has been written.
    Completed,

    /// The operation could not proceed without blocking and non-blocking mode was requested.
    /// Nothing was changed.
    WouldBlock,

    /// The operations were applied and the guarded command was launched.
    ///
    /// A real launch replaces the process image and never returns, so only a launcher that
    /// does not replace the process produces this outcome.
    Launched,
}

impl RunOutcome {
    /// The process exit code for this outcome.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Completed | Self::Launched => 0,
            Self::WouldBlock => 2,
        }
    }
}

/// Errors that can occur during a run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// The operands could not be parsed or validated. Nothing was sent to the kernel.
    #[error(transparent)]
    Operands(#[from] semspec::Error),

    /// The arguments do not form a valid invocation.
    #[error("usage: {0}")]
    Usage(String),

    /// No identifier was given on the command line or in the environment.
    #[error("must either specify [{option}] or set {variable} environment variable")]
    MissingIdentifier {
        /// The command-line option that supplies the identifier.
        option: &'static str,
        /// The environment variable that supplies the identifier.
        variable: &'static str,
    },

    /// An argument is well-formed but its value is not acceptable.
    #[error("{0}")]
    InvalidArgument(String),

    /// A kernel call failed.
    #[error(transparent)]
    Kernel(#[from] KernelError),

    /// Reading input or writing output failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being done.
        context: &'static str,
        /// The underlying error.
        source: io::Error,
    },

    /// The operations were applied but the guarded command could not be launched. The
    /// operations are not rolled back.
    #[error("failed to launch '{program}': {source}")]
    GuardedLaunchFailed {
        /// The program that could not be launched.
        program: String,
        /// The underlying error.
        source: io::Error,
    },
}

impl RunError {
    pub(crate) fn output(source: io::Error) -> Self {
        Self::Io {
            context: "failed to write to standard output",
            source,
        }
    }

    pub(crate) fn input(source: io::Error) -> Self {
        Self::Io {
            context: "failed to read from standard input",
            source,
        }
    }

    /// The process exit code for this error.
    ///
    /// Exclusive creation of a semaphore set that already exists yields 2, like a would-block
    /// outcome, so scripts can tell "someone else created it" apart from real failures.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Kernel(error)
                if error.call() == KernelCall::Semget
                    && error.failure() == KernelFailure::AlreadyExists =>
            {
                2
            }
            _ => 1,
        }
    }

    /// Renders the one-line diagnostic printed for a failed `command`.
    #[must_use]
    pub fn diagnostic(&self, command: &str) -> String {
        match self {
            Self::Kernel(error) => format!(
                "ipcmd {command} ({}()): {}",
                error.call(),
                error.description()
            ),
            _ => format!("ipcmd {command}: {self}"),
        }
    }
}
