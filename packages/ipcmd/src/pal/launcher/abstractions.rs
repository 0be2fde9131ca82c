// Launcher trait abstraction for mocking in tests.

use std::fmt::Debug;
use std::io;

use crate::GuardedCommand;

/// Abstraction over replacing the current process with another program.
///
/// This trait is automatically mocked by mockall in test builds, generating `MockLauncher`.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Launcher: Debug + Send + Sync + 'static {
    /// Replaces the current process image with `command`, which inherits standard I/O and the
    /// environment, with `IPCMD_SEMID` set to the identifier of the locked set.
    ///
    /// The real implementation only returns if the launch failed. Mocks may return `Ok`.
    fn launch(&self, command: &GuardedCommand) -> io::Result<()>;
}
