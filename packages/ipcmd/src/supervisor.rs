// Applies an operation list and, once it has succeeded, hands the process over to the guarded
// command.

use semspec::CompiledOperation;
use tracing::{debug, trace, warn};

use crate::pal::{Kernel, Launcher};
use crate::{KernelCall, KernelError, KernelFailure, RunError, RunOutcome};

/// A command to run after the operations have been applied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct GuardedCommand {
    program: String,
    args: Vec<String>,
    semid: i32,
}

impl GuardedCommand {
    /// Creates a command from its argument vector, or `None` if the vector is empty.
    pub(crate) fn new(argv: &[String], semid: i32) -> Option<Self> {
        let (program, args) = argv.split_first()?;

        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            semid,
        })
    }

    pub(crate) fn program(&self) -> &str {
        &self.program
    }

    pub(crate) fn args(&self) -> &[String] {
        &self.args
    }

    /// The semaphore set that is held while the command runs.
    pub(crate) fn semid(&self) -> i32 {
        self.semid
    }
}

/// Submits `operations` as one atomic `semop()` call, then launches `command` if there is one.
///
/// The command is only launched after the kernel has applied every operation. A launch failure
/// does not roll anything back; only operations flagged for undo are reverted, by the kernel,
/// when this process exits.
pub(crate) fn acquire_then_launch(
    kernel: &impl Kernel,
    launcher: &impl Launcher,
    semid: i32,
    operations: &[CompiledOperation],
    command: Option<&GuardedCommand>,
) -> Result<RunOutcome, RunError> {
    trace!(semid, operations = operations.len(), "semop()");

    if let Err(error) = kernel.semop(semid, operations) {
        let error = KernelError::new(KernelCall::Semop, error);

        if error.failure() == KernelFailure::WouldBlock {
            debug!(semid, "operations would block");
            return Ok(RunOutcome::WouldBlock);
        }

        return Err(error.into());
    }

    let Some(command) = command else {
        return Ok(RunOutcome::Completed);
    };

    debug!(semid, program = command.program(), "launching guarded command");

    launcher.launch(command).map_err(|source| {
        warn!(
            semid,
            program = command.program(),
            %source,
            "operations were applied but the guarded command could not be launched"
        );

        RunError::GuardedLaunchFailed {
            program: command.program().to_string(),
            source,
        }
    })?;

    Ok(RunOutcome::Launched)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;

    use semspec::OperationFlags;

    use super::*;
    use crate::pal::{MockKernel, MockLauncher};

    fn operations() -> Vec<CompiledOperation> {
        vec![
            CompiledOperation::new(0, -1, OperationFlags::new(false, true)),
            CompiledOperation::new(1, -1, OperationFlags::new(false, true)),
        ]
    }

    fn command() -> GuardedCommand {
        GuardedCommand::new(&["make".to_string(), "install".to_string()], 9).unwrap()
    }

    #[test]
    fn guarded_command_needs_program() {
        assert!(GuardedCommand::new(&[], 1).is_none());

        let command = command();
        assert_eq!(command.program(), "make");
        assert_eq!(command.args(), ["install"]);
        assert_eq!(command.semid(), 9);
    }

    #[test]
    fn launches_after_successful_apply() {
        let mut kernel = MockKernel::new();
        let mut launcher = MockLauncher::new();
        let mut sequence = mockall::Sequence::new();

        kernel
            .expect_semop()
            .withf(|semid, operations| *semid == 9 && operations.len() == 2)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_, _| Ok(()));
        launcher
            .expect_launch()
            .withf(|command| command.program() == "make" && command.semid() == 9)
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));

        let outcome =
            acquire_then_launch(&kernel, &launcher, 9, &operations(), Some(&command())).unwrap();

        assert_eq!(outcome, RunOutcome::Launched);
    }

    #[test]
    fn completes_without_command() {
        let mut kernel = MockKernel::new();
        let mut launcher = MockLauncher::new();

        kernel.expect_semop().times(1).returning(|_, _| Ok(()));
        launcher.expect_launch().never();

        let outcome = acquire_then_launch(&kernel, &launcher, 9, &operations(), None).unwrap();

        assert_eq!(outcome, RunOutcome::Completed);
    }

    #[test]
    fn failed_apply_never_launches() {
        let mut kernel = MockKernel::new();
        let mut launcher = MockLauncher::new();

        kernel
            .expect_semop()
            .times(1)
            .returning(|_, _| Err(io::Error::from_raw_os_error(libc::EIDRM)));
        launcher.expect_launch().never();

        let error =
            acquire_then_launch(&kernel, &launcher, 9, &operations(), Some(&command()))
                .unwrap_err();

        let RunError::Kernel(error) = error else {
            panic!("expected a kernel error");
        };
        assert_eq!(error.call(), KernelCall::Semop);
        assert_eq!(error.failure(), KernelFailure::IdentifierRemoved);
    }

    #[test]
    fn would_block_is_an_outcome() {
        let mut kernel = MockKernel::new();
        let mut launcher = MockLauncher::new();

        kernel
            .expect_semop()
            .times(1)
            .returning(|_, _| Err(io::Error::from_raw_os_error(libc::EAGAIN)));
        launcher.expect_launch().never();

        let outcome =
            acquire_then_launch(&kernel, &launcher, 9, &operations(), Some(&command())).unwrap();

        assert_eq!(outcome, RunOutcome::WouldBlock);
    }

    #[test]
    fn interrupted_apply_is_not_retried() {
        let mut kernel = MockKernel::new();
        let launcher = MockLauncher::new();

        kernel
            .expect_semop()
            .times(1)
            .returning(|_, _| Err(io::Error::from_raw_os_error(libc::EINTR)));

        let error = acquire_then_launch(&kernel, &launcher, 9, &operations(), None).unwrap_err();

        assert!(matches!(
            error,
            RunError::Kernel(error) if error.failure() == KernelFailure::Interrupted
        ));
    }

    #[test]
    fn launch_failure_is_reported() {
        let mut kernel = MockKernel::new();
        let mut launcher = MockLauncher::new();

        kernel.expect_semop().times(1).returning(|_, _| Ok(()));
        launcher
            .expect_launch()
            .times(1)
            .returning(|_| Err(io::Error::from(io::ErrorKind::NotFound)));

        let error =
            acquire_then_launch(&kernel, &launcher, 9, &operations(), Some(&command()))
                .unwrap_err();

        assert!(matches!(
            error,
            RunError::GuardedLaunchFailed { ref program, .. } if program == "make"
        ));
        assert_eq!(error.exit_code(), 1);
    }
}
