// Facade that dispatches to either the real kernel or a mock in tests.

use std::io;
use std::path::Path;
#[cfg(test)]
use std::sync::Arc;

use semspec::CompiledOperation;

#[cfg(test)]
use crate::pal::MockKernel;
use crate::pal::{BuildTargetKernel, Kernel, Message, SemaphoreQuery};

/// Facade over kernel calls, dispatching to real or mock implementation.
///
/// In production, this always uses `BuildTargetKernel`. In tests, it can also wrap a
/// `MockKernel` for controlled test scenarios.
#[derive(Clone)]
pub(crate) enum KernelFacade {
    /// Real kernel implementation.
    Target(&'static BuildTargetKernel),

    /// Mock kernel for testing.
    #[cfg(test)]
    Mock(Arc<MockKernel>),
}

// Debug implementations have no API contract to test.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl std::fmt::Debug for KernelFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(_) => f.debug_struct("KernelFacade::Target").finish(),
            #[cfg(test)]
            Self::Mock(_) => f.debug_struct("KernelFacade::Mock").finish(),
        }
    }
}

static BUILD_TARGET_KERNEL: BuildTargetKernel = BuildTargetKernel;

// Facade types are trivial pass-through layers - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl KernelFacade {
    /// Creates a facade using the real kernel.
    pub(crate) const fn target() -> Self {
        Self::Target(&BUILD_TARGET_KERNEL)
    }

    /// Creates a facade wrapping a mock kernel (test builds only).
    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockKernel) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

// Facade types are trivial pass-through layers - not worth testing.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Kernel for KernelFacade {
    fn ftok(&self, path: &Path, id: u8) -> io::Result<libc::key_t> {
        match self {
            Self::Target(kernel) => kernel.ftok(path, id),
            #[cfg(test)]
            Self::Mock(mock) => mock.ftok(path, id),
        }
    }

    fn semget(&self, key: libc::key_t, nsems: i32, flags: i32) -> io::Result<i32> {
        match self {
            Self::Target(kernel) => kernel.semget(key, nsems, flags),
            #[cfg(test)]
            Self::Mock(mock) => mock.semget(key, nsems, flags),
        }
    }

    fn semaphore_count(&self, semid: i32) -> io::Result<u16> {
        match self {
            Self::Target(kernel) => kernel.semaphore_count(semid),
            #[cfg(test)]
            Self::Mock(mock) => mock.semaphore_count(semid),
        }
    }

    fn semop(&self, semid: i32, operations: &[CompiledOperation]) -> io::Result<()> {
        match self {
            Self::Target(kernel) => kernel.semop(semid, operations),
            #[cfg(test)]
            Self::Mock(mock) => mock.semop(semid, operations),
        }
    }

    fn query_semaphore(&self, semid: i32, semnum: i32, query: SemaphoreQuery) -> io::Result<i32> {
        match self {
            Self::Target(kernel) => kernel.query_semaphore(semid, semnum, query),
            #[cfg(test)]
            Self::Mock(mock) => mock.query_semaphore(semid, semnum, query),
        }
    }

    fn set_value(&self, semid: i32, semnum: i32, value: i32) -> io::Result<()> {
        match self {
            Self::Target(kernel) => kernel.set_value(semid, semnum, value),
            #[cfg(test)]
            Self::Mock(mock) => mock.set_value(semid, semnum, value),
        }
    }

    fn values(&self, semid: i32, count: u16) -> io::Result<Vec<u16>> {
        match self {
            Self::Target(kernel) => kernel.values(semid, count),
            #[cfg(test)]
            Self::Mock(mock) => mock.values(semid, count),
        }
    }

    fn set_values(&self, semid: i32, values: &[u16]) -> io::Result<()> {
        match self {
            Self::Target(kernel) => kernel.set_values(semid, values),
            #[cfg(test)]
            Self::Mock(mock) => mock.set_values(semid, values),
        }
    }

    fn msgget(&self, key: libc::key_t, flags: i32) -> io::Result<i32> {
        match self {
            Self::Target(kernel) => kernel.msgget(key, flags),
            #[cfg(test)]
            Self::Mock(mock) => mock.msgget(key, flags),
        }
    }

    fn queue_capacity(&self, msqid: i32) -> io::Result<usize> {
        match self {
            Self::Target(kernel) => kernel.queue_capacity(msqid),
            #[cfg(test)]
            Self::Mock(mock) => mock.queue_capacity(msqid),
        }
    }

    fn msgsnd(
        &self,
        msqid: i32,
        message_type: libc::c_long,
        text: &[u8],
        no_wait: bool,
    ) -> io::Result<()> {
        match self {
            Self::Target(kernel) => kernel.msgsnd(msqid, message_type, text, no_wait),
            #[cfg(test)]
            Self::Mock(mock) => mock.msgsnd(msqid, message_type, text, no_wait),
        }
    }

    fn msgrcv(
        &self,
        msqid: i32,
        capacity: usize,
        message_type: libc::c_long,
        no_wait: bool,
    ) -> io::Result<Message> {
        match self {
            Self::Target(kernel) => kernel.msgrcv(msqid, capacity, message_type, no_wait),
            #[cfg(test)]
            Self::Mock(mock) => mock.msgrcv(msqid, capacity, message_type, no_wait),
        }
    }
}
