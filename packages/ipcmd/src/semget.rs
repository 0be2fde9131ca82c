// The `semget` command.

use std::io::Write;

use tracing::trace;

use crate::config::creation_flags;
use crate::pal::Kernel;
use crate::{KernelCall, KernelError, RunError, RunOutcome, SemgetArgs};

pub(crate) fn run(
    args: &SemgetArgs,
    kernel: &impl Kernel,
    output: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    let flags = creation_flags(args.key.is_some(), args.exist_ok, args.mode, "-S semkey")?;
    let key = args.key.unwrap_or(libc::IPC_PRIVATE);

    trace!(key, nsems = args.nsems, flags, "semget()");

    let semid = kernel
        .semget(key, args.nsems, flags)
        .map_err(|error| KernelError::new(KernelCall::Semget, error))?;

    writeln!(output, "{semid}").map_err(RunError::output)?;

    Ok(RunOutcome::Completed)
}
