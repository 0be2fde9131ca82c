// The `semctl` command: single-semaphore queries and whole-set initialization.

use std::io::Write;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::pal::{Kernel, SemaphoreQuery};
use crate::{Config, KernelCall, KernelError, RunError, RunOutcome, SemctlArgs, SemctlCommand};

pub(crate) fn run(
    args: &SemctlArgs,
    config: &Config,
    kernel: &impl Kernel,
    output: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    // Operand syntax is checked before anything touches the kernel.
    if let SemctlCommand::Setall(setall) = &args.command {
        if setall.values.is_empty() {
            return Err(RunError::Usage(
                "expected VALUE or LOWER[:UPPER]=VALUE...".to_string(),
            ));
        }

        semspec::classify_operands(&setall.values)?;
    }

    let semid = config.semid(args.semid)?;

    match &args.command {
        SemctlCommand::Getval(query) => {
            print_query(kernel, output, semid, query.semnum, SemaphoreQuery::Value)
        }
        SemctlCommand::Getpid(query) => {
            print_query(kernel, output, semid, query.semnum, SemaphoreQuery::LastPid)
        }
        SemctlCommand::Getncnt(query) => print_query(
            kernel,
            output,
            semid,
            query.semnum,
            SemaphoreQuery::IncreaseWaiters,
        ),
        SemctlCommand::Getzcnt(query) => print_query(
            kernel,
            output,
            semid,
            query.semnum,
            SemaphoreQuery::ZeroWaiters,
        ),
        SemctlCommand::Setval(update) => {
            trace!(semid, semnum = update.semnum, value = update.semval, "semctl(SETVAL)");

            kernel
                .set_value(semid, update.semnum, update.semval)
                .map_err(semctl_error)?;

            Ok(RunOutcome::Completed)
        }
        SemctlCommand::Getall(_) => {
            let count = semaphore_count(kernel, semid)?;

            trace!(semid, count, "semctl(GETALL)");

            let values = kernel.values(semid, count).map_err(semctl_error)?;

            writeln!(output, "{}", values.iter().join(" ")).map_err(RunError::output)?;

            Ok(RunOutcome::Completed)
        }
        SemctlCommand::Setall(setall) => {
            let count = semaphore_count(kernel, semid)?;
            let values = semspec::plan_set_all(&setall.values, count)?;

            debug!(semid, count, "initializing every semaphore of the set");
            trace!(semid, "semctl(SETALL)");

            kernel.set_values(semid, &values).map_err(semctl_error)?;

            Ok(RunOutcome::Completed)
        }
    }
}

fn print_query(
    kernel: &impl Kernel,
    output: &mut impl Write,
    semid: i32,
    semnum: i32,
    query: SemaphoreQuery,
) -> Result<RunOutcome, RunError> {
    trace!(semid, semnum, ?query, "semctl()");

    let value = kernel
        .query_semaphore(semid, semnum, query)
        .map_err(semctl_error)?;

    writeln!(output, "{value}").map_err(RunError::output)?;

    Ok(RunOutcome::Completed)
}

fn semaphore_count(kernel: &impl Kernel, semid: i32) -> Result<u16, RunError> {
    trace!(semid, "semctl(IPC_STAT)");

    kernel.semaphore_count(semid).map_err(semctl_error)
}

fn semctl_error(error: std::io::Error) -> RunError {
    KernelError::new(KernelCall::Semctl, error).into()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;

    use super::*;
    use crate::pal::MockKernel;
    use crate::{GetallArgs, GetvalArgs, GetzcntArgs, SetallArgs, SetvalArgs};

    fn args(semid: Option<i32>, command: SemctlCommand) -> SemctlArgs {
        SemctlArgs { semid, command }
    }

    fn setall(values: &[&str]) -> SemctlCommand {
        SemctlCommand::Setall(SetallArgs {
            values: values.iter().map(|value| (*value).to_string()).collect(),
        })
    }

    #[test]
    fn getval_prints_value() {
        let mut kernel = MockKernel::new();
        kernel
            .expect_query_semaphore()
            .withf(|semid, semnum, query| {
                *semid == 5 && *semnum == 2 && *query == SemaphoreQuery::Value
            })
            .times(1)
            .returning(|_, _, _| Ok(3));

        let mut output = Vec::new();
        run(
            &args(Some(5), SemctlCommand::Getval(GetvalArgs { semnum: 2 })),
            &Config::default(),
            &kernel,
            &mut output,
        )
        .unwrap();

        assert_eq!(output, b"3\n");
    }

    #[test]
    fn getzcnt_uses_inherited_semid() {
        let mut kernel = MockKernel::new();
        kernel
            .expect_query_semaphore()
            .withf(|semid, _, query| *semid == 11 && *query == SemaphoreQuery::ZeroWaiters)
            .times(1)
            .returning(|_, _, _| Ok(0));

        let mut output = Vec::new();
        run(
            &args(None, SemctlCommand::Getzcnt(GetzcntArgs { semnum: 0 })),
            &Config::new(Some("11".to_string()), None),
            &kernel,
            &mut output,
        )
        .unwrap();

        assert_eq!(output, b"0\n");
    }

    #[test]
    fn setval_prints_nothing() {
        let mut kernel = MockKernel::new();
        kernel
            .expect_set_value()
            .withf(|semid, semnum, value| *semid == 5 && *semnum == 1 && *value == 9)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut output = Vec::new();
        run(
            &args(
                Some(5),
                SemctlCommand::Setval(SetvalArgs {
                    semnum: 1,
                    semval: 9,
                }),
            ),
            &Config::default(),
            &kernel,
            &mut output,
        )
        .unwrap();

        assert!(output.is_empty());
    }

    #[test]
    fn setval_out_of_range_is_kernel_error() {
        let mut kernel = MockKernel::new();
        kernel
            .expect_set_value()
            .returning(|_, _, _| Err(io::Error::from_raw_os_error(libc::ERANGE)));

        let error = run(
            &args(
                Some(5),
                SemctlCommand::Setval(SetvalArgs {
                    semnum: 0,
                    semval: 1_000_000,
                }),
            ),
            &Config::default(),
            &kernel,
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(
            error
                .diagnostic("semctl")
                .starts_with("ipcmd semctl (semctl()): The argument cmd is equal to SETVAL")
        );
    }

    #[test]
    fn getall_prints_values_on_one_line() {
        let mut kernel = MockKernel::new();
        kernel.expect_semaphore_count().times(1).returning(|_| Ok(3));
        kernel
            .expect_values()
            .withf(|semid, count| *semid == 5 && *count == 3)
            .times(1)
            .returning(|_, _| Ok(vec![1, 0, 7]));

        let mut output = Vec::new();
        run(
            &args(Some(5), SemctlCommand::Getall(GetallArgs {})),
            &Config::default(),
            &kernel,
            &mut output,
        )
        .unwrap();

        assert_eq!(output, b"1 0 7\n");
    }

    #[test]
    fn setall_whole_set() {
        let mut kernel = MockKernel::new();
        kernel.expect_semaphore_count().times(1).returning(|_| Ok(4));
        kernel
            .expect_set_values()
            .withf(|semid, values| *semid == 5 && values == [2, 2, 2, 2])
            .times(1)
            .returning(|_, _| Ok(()));

        run(
            &args(Some(5), setall(&["2"])),
            &Config::default(),
            &kernel,
            &mut Vec::new(),
        )
        .unwrap();
    }

    #[test]
    fn setall_ranged_assignments() {
        let mut kernel = MockKernel::new();
        kernel.expect_semaphore_count().times(1).returning(|_| Ok(4));
        kernel
            .expect_set_values()
            .withf(|_, values| values == [1, 1, 0, 5])
            .times(1)
            .returning(|_, _| Ok(()));

        run(
            &args(Some(5), setall(&["3=5", "0:1=1", "2=0"])),
            &Config::default(),
            &kernel,
            &mut Vec::new(),
        )
        .unwrap();
    }

    #[test]
    fn setall_mixed_addressing_never_reaches_kernel() {
        let kernel = MockKernel::new();

        let error = run(
            &args(Some(5), setall(&["0=1", "2"])),
            &Config::default(),
            &kernel,
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(matches!(
            error,
            RunError::Operands(semspec::Error::CoverageMismatch { .. })
        ));
    }

    #[test]
    fn setall_without_values_never_reaches_kernel() {
        let kernel = MockKernel::new();

        let error = run(
            &args(Some(5), setall(&[])),
            &Config::default(),
            &kernel,
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(matches!(error, RunError::Usage(_)));
        assert_eq!(
            error.diagnostic("semctl"),
            "ipcmd semctl: usage: expected VALUE or LOWER[:UPPER]=VALUE..."
        );
    }

    #[test]
    fn setall_gap_is_not_applied() {
        let mut kernel = MockKernel::new();
        kernel.expect_semaphore_count().times(1).returning(|_| Ok(4));
        kernel.expect_set_values().never();

        let error = run(
            &args(Some(5), setall(&["0:1=1", "3=1"])),
            &Config::default(),
            &kernel,
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(matches!(
            error,
            RunError::Operands(semspec::Error::CoverageMismatch { .. })
        ));
    }

    #[test]
    fn missing_semid_is_reported() {
        let kernel = MockKernel::new();

        let error = run(
            &args(None, SemctlCommand::Getall(GetallArgs {})),
            &Config::default(),
            &kernel,
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(matches!(error, RunError::MissingIdentifier { .. }));
    }
}
