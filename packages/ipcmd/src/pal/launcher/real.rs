use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;

use crate::GuardedCommand;
use crate::config::SEMID_VARIABLE;
use crate::pal::Launcher;

/// Launches programs by replacing the current process image.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetLauncher;

// Trivial forwarder to the exec family of system calls - not worth testing, and a successful
// call would replace the test process.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Launcher for BuildTargetLauncher {
    fn launch(&self, command: &GuardedCommand) -> io::Result<()> {
        // exec() resolves the program via PATH and only returns on failure.
        Err(Command::new(command.program())
            .args(command.args())
            .env(SEMID_VARIABLE, command.semid().to_string())
            .exec())
    }
}
