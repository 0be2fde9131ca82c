// Kernel trait abstraction for mocking in tests.
//
// Each method corresponds to one System V IPC call (or one semctl()/msgctl() command) and
// reports failure as the raw OS error, leaving classification to the caller.

use std::fmt::Debug;
use std::io;
use std::path::Path;

use semspec::CompiledOperation;

/// The single-semaphore queries that `semctl()` answers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SemaphoreQuery {
    /// `GETVAL`: the current value.
    Value,
    /// `GETPID`: the process that last operated on the semaphore.
    LastPid,
    /// `GETNCNT`: processes waiting for the value to increase.
    IncreaseWaiters,
    /// `GETZCNT`: processes waiting for the value to become zero.
    ZeroWaiters,
}

/// A message taken from a queue.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Message {
    pub(crate) message_type: libc::c_long,
    pub(crate) text: Vec<u8>,
}

/// Abstraction over the System V IPC calls used by ipcmd.
///
/// This trait is automatically mocked by mockall in test builds, generating `MockKernel`.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Kernel: Debug + Send + Sync + 'static {
    /// `ftok()`: derives an IPC key from an existing path and a project identifier.
    fn ftok(&self, path: &Path, id: u8) -> io::Result<libc::key_t>;

    /// `semget()`: creates or looks up a semaphore set, returning its identifier.
    fn semget(&self, key: libc::key_t, nsems: i32, flags: i32) -> io::Result<i32>;

    /// `semctl(IPC_STAT)`: the number of semaphores in the set.
    fn semaphore_count(&self, semid: i32) -> io::Result<u16>;

    /// `semop()`: applies the whole operation list atomically.
    fn semop(&self, semid: i32, operations: &[CompiledOperation]) -> io::Result<()>;

    /// `semctl()` with one of the single-semaphore query commands.
    fn query_semaphore(&self, semid: i32, semnum: i32, query: SemaphoreQuery) -> io::Result<i32>;

    /// `semctl(SETVAL)`.
    fn set_value(&self, semid: i32, semnum: i32, value: i32) -> io::Result<()>;

    /// `semctl(GETALL)` for a set of `count` semaphores.
    fn values(&self, semid: i32, count: u16) -> io::Result<Vec<u16>>;

    /// `semctl(SETALL)`. `values` holds one entry per semaphore in the set.
    fn set_values(&self, semid: i32, values: &[u16]) -> io::Result<()>;

    /// `msgget()`: creates or looks up a message queue, returning its identifier.
    fn msgget(&self, key: libc::key_t, flags: i32) -> io::Result<i32>;

    /// `msgctl(IPC_STAT)`: the maximum number of bytes the queue may hold (`msg_qbytes`).
    fn queue_capacity(&self, msqid: i32) -> io::Result<usize>;

    /// `msgsnd()`.
    fn msgsnd(&self, msqid: i32, message_type: libc::c_long, text: &[u8], no_wait: bool)
    -> io::Result<()>;

    /// `msgrcv()` for a message of at most `capacity` bytes.
    fn msgrcv(
        &self,
        msqid: i32,
        capacity: usize,
        message_type: libc::c_long,
        no_wait: bool,
    ) -> io::Result<Message>;
}
