// The `semop` command: parse operands, expand them into an operation list and apply it.

use semspec::{OperationFlags, OperationPlan};
use tracing::{debug, trace};

use crate::pal::{Kernel, Launcher};
use crate::supervisor::{GuardedCommand, acquire_then_launch};
use crate::{Config, KernelCall, KernelError, RunError, RunOutcome, SemopArgs};

/// The operand that separates the operation list from the guarded command.
const COMMAND_SEPARATOR: &str = ":";

pub(crate) fn run(
    args: &SemopArgs,
    config: &Config,
    kernel: &impl Kernel,
    launcher: &impl Launcher,
) -> Result<RunOutcome, RunError> {
    let (operands, command) = split_guarded_command(&args.operands)?;

    if operands.is_empty() {
        return Err(RunError::Usage(
            "expected VALUE[FLAGS] or LOWER[:UPPER]=VALUE[FLAGS]...".to_string(),
        ));
    }

    let semid = config.semid(args.semid)?;

    let plan =
        OperationPlan::parse(operands)?.with_flags(OperationFlags::new(args.no_wait, args.undo));

    let operations = plan.compile(|| {
        trace!(semid, "semctl(IPC_STAT)");

        kernel
            .semaphore_count(semid)
            .map_err(|error| RunError::from(KernelError::new(KernelCall::Semctl, error)))
    })?;

    debug!(
        semid,
        operands = operands.len(),
        operations = operations.len(),
        "compiled operation list"
    );

    let command = command.and_then(|argv| GuardedCommand::new(argv, semid));

    acquire_then_launch(kernel, launcher, semid, &operations, command.as_ref())
}

/// Splits the arguments at the first lone `:` into operands and the guarded command's argument
/// vector.
fn split_guarded_command(
    arguments: &[String],
) -> Result<(&[String], Option<&[String]>), RunError> {
    let Some(separator) = arguments
        .iter()
        .position(|argument| argument == COMMAND_SEPARATOR)
    else {
        return Ok((arguments, None));
    };

    let (operands, rest) = arguments.split_at(separator);
    let command = rest.get(1..).unwrap_or_default();

    if command.is_empty() {
        return Err(RunError::Usage(format!(
            "expected a command after '{COMMAND_SEPARATOR}'"
        )));
    }

    Ok((operands, Some(command)))
}
