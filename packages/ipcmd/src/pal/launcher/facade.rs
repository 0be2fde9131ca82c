// Facade that dispatches to either the real launcher or a mock in tests.

use std::io;
#[cfg(test)]
use std::sync::Arc;

use crate::GuardedCommand;
#[cfg(test)]
use crate::pal::MockLauncher;
use crate::pal::{BuildTargetLauncher, Launcher};

/// Facade over process launching, dispatching to real or mock implementation.
#[derive(Clone)]
pub(crate) enum LauncherFacade {
    /// Real launcher implementation.
    Target(&'static BuildTargetLauncher),

    /// Mock launcher for testing.
    #[cfg(test)]
    Mock(Arc<MockLauncher>),
}

// Debug implementations have no API contract to test.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl std::fmt::Debug for LauncherFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(_) => f.debug_struct("LauncherFacade::Target").finish(),
            #[cfg(test)]
            Self::Mock(_) => f.debug_struct("LauncherFacade::Mock").finish(),
        }
    }
}

static BUILD_TARGET_LAUNCHER: BuildTargetLauncher = BuildTargetLauncher;

// Facade types are trivial pass-through layers - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl LauncherFacade {
    /// Creates a facade using the real launcher.
    pub(crate) const fn target() -> Self {
        Self::Target(&BUILD_TARGET_LAUNCHER)
    }

    /// Creates a facade wrapping a mock launcher (test builds only).
    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockLauncher) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

// Facade types are trivial pass-through layers - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Launcher for LauncherFacade {
    fn launch(&self, command: &GuardedCommand) -> io::Result<()> {
        match self {
            Self::Target(launcher) => launcher.launch(command),
            #[cfg(test)]
            Self::Mock(mock) => mock.launch(command),
        }
    }
}
