// The `ftok` command.

use std::io::Write;
use std::path::Path;

use tracing::trace;

use crate::pal::Kernel;
use crate::{FtokArgs, KernelCall, KernelError, RunError, RunOutcome};

const DEFAULT_PATH: &str = ".";
const DEFAULT_PROJECT_ID: u8 = 1;

pub(crate) fn run(
    args: &FtokArgs,
    kernel: &impl Kernel,
    output: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    let (path, id) = match args.operands.as_slice() {
        [] => (Path::new(DEFAULT_PATH), DEFAULT_PROJECT_ID),
        [path] => (Path::new(path), DEFAULT_PROJECT_ID),
        [path, id] => (Path::new(path), parse_project_id(id)?),
        _ => return Err(RunError::Usage("expected [PATH [ID]]".to_string())),
    };

    trace!(path = %path.display(), id, "ftok()");

    let key = kernel
        .ftok(path, id)
        .map_err(|error| KernelError::new(KernelCall::Ftok, error))?;

    // Keys are conventionally shown as unsigned hexadecimal, as ipcs does.
    writeln!(output, "{key:#x}").map_err(RunError::output)?;

    Ok(RunOutcome::Completed)
}

fn parse_project_id(text: &str) -> Result<u8, RunError> {
    match text.parse::<u8>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(RunError::InvalidArgument(
            "id must be an integer between 1 and 255".to_string(),
        )),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;

    use super::*;
    use crate::pal::{BuildTargetKernel, MockKernel};

    fn args(path: Option<&str>, id: Option<&str>) -> FtokArgs {
        FtokArgs {
            operands: path.into_iter().chain(id).map(str::to_string).collect(),
        }
    }

    #[test]
    fn project_ids() {
        assert_eq!(parse_project_id("1").unwrap(), 1);
        assert_eq!(parse_project_id("255").unwrap(), 255);

        for invalid in ["0", "256", "-1", "x", ""] {
            assert!(
                matches!(
                    parse_project_id(invalid).unwrap_err(),
                    RunError::InvalidArgument(_)
                ),
                "{invalid}"
            );
        }
    }

    #[test]
    fn key_is_printed_as_hex() {
        let mut kernel = MockKernel::new();
        kernel
            .expect_ftok()
            .withf(|path, id| path == Path::new(".") && *id == 1)
            .times(1)
            .returning(|_, _| Ok(0x0105_abcd));

        let mut output = Vec::new();
        let outcome = run(&args(None, None), &kernel, &mut output).unwrap();

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(String::from_utf8(output).unwrap(), "0x105abcd\n");
    }

    #[test]
    fn negative_key_is_printed_unsigned() {
        let mut kernel = MockKernel::new();
        kernel.expect_ftok().returning(|_, _| Ok(-2));

        let mut output = Vec::new();
        run(&args(Some("/tmp"), Some("7")), &kernel, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "0xfffffffe\n");
    }

    #[test]
    fn path_alone_uses_default_id() {
        let mut kernel = MockKernel::new();
        kernel
            .expect_ftok()
            .withf(|path, id| path == Path::new("/tmp") && *id == 1)
            .times(1)
            .returning(|_, _| Ok(1));

        run(&args(Some("/tmp"), None), &kernel, &mut Vec::new()).unwrap();
    }

    #[test]
    fn extra_operands_never_reach_kernel() {
        let kernel = MockKernel::new();

        let error = run(
            &FtokArgs {
                operands: vec![".".to_string(), "1".to_string(), "2".to_string()],
            },
            &kernel,
            &mut Vec::new(),
        )
        .unwrap_err();

        assert_eq!(error.diagnostic("ftok"), "ipcmd ftok: usage: expected [PATH [ID]]");
    }

    #[test]
    fn missing_path_is_kernel_error() {
        let mut kernel = MockKernel::new();
        kernel
            .expect_ftok()
            .returning(|_, _| Err(io::Error::from_raw_os_error(libc::ENOENT)));

        let error = run(&args(Some("/missing"), None), &kernel, &mut Vec::new()).unwrap_err();

        assert!(error.diagnostic("ftok").starts_with("ipcmd ftok (ftok()): "));
    }

    #[test]
    fn real_key_depends_on_path_and_id() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().to_str().unwrap();
        let kernel = BuildTargetKernel;

        let mut first = Vec::new();
        let mut again = Vec::new();
        let mut other_id = Vec::new();

        run(&args(Some(path), Some("1")), &kernel, &mut first).unwrap();
        run(&args(Some(path), Some("1")), &kernel, &mut again).unwrap();
        run(&args(Some(path), Some("2")), &kernel, &mut other_id).unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other_id);
        assert!(first.starts_with(b"0x"));
    }
}
