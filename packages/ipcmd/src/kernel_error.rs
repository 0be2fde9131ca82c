// Classification and description of failed System V IPC calls.
//
// Each call has its own set of documented failure conditions, so the description of an errno
// value depends on which call produced it.

use std::error::Error;
use std::fmt;
use std::io;

/// The kernel call that failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum KernelCall {
    /// `ftok()`: derive an IPC key from a path.
    Ftok,
    /// `semget()`: create or look up a semaphore set.
    Semget,
    /// `semctl()`: query or initialize semaphores.
    Semctl,
    /// `semop()`: apply an operation list to a semaphore set.
    Semop,
    /// `msgget()`: create or look up a message queue.
    Msgget,
    /// `msgctl()`: query a message queue.
    Msgctl,
    /// `msgsnd()`: send a message.
    Msgsnd,
    /// `msgrcv()`: receive a message.
    Msgrcv,
}

impl fmt::Display for KernelCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ftok => "ftok",
            Self::Semget => "semget",
            Self::Semctl => "semctl",
            Self::Semop => "semop",
            Self::Msgget => "msgget",
            Self::Msgctl => "msgctl",
            Self::Msgsnd => "msgsnd",
            Self::Msgrcv => "msgrcv",
        };

        f.write_str(name)
    }
}

/// Why a kernel call failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum KernelFailure {
    /// The caller lacks permission for the object (`EACCES`, `EPERM`).
    PermissionDenied,
    /// The object was removed from the system (`EIDRM`).
    IdentifierRemoved,
    /// The identifier or another argument is not valid (`EINVAL`).
    IdentifierInvalid,
    /// A signal interrupted a blocking call (`EINTR`). There is no automatic retry.
    Interrupted,
    /// A value would overflow the system-imposed maximum (`ERANGE`).
    RangeExceeded,
    /// A system-imposed limit would be exceeded (`E2BIG`, `ENOSPC`).
    ResourceLimitExceeded,
    /// An operation addresses a semaphore number outside of the set (`EFBIG`).
    SemaphoreOutOfRange,
    /// Exclusive creation found an existing object (`EEXIST`).
    AlreadyExists,
    /// No object exists for the key and creation was not requested (`ENOENT`).
    NotFound,
    /// The call would have blocked but non-blocking mode was requested (`EAGAIN`, or
    /// `ENOMSG` from `msgrcv()`).
    WouldBlock,
    /// Any other failure. The OS error text describes it.
    Other,
}

impl KernelFailure {
    fn classify(call: KernelCall, errno: Option<i32>) -> Self {
        match errno {
            Some(libc::EACCES | libc::EPERM) => Self::PermissionDenied,
            Some(libc::EIDRM) => Self::IdentifierRemoved,
            Some(libc::EINVAL) => Self::IdentifierInvalid,
            Some(libc::EINTR) => Self::Interrupted,
            Some(libc::ERANGE) => Self::RangeExceeded,
            Some(libc::E2BIG | libc::ENOSPC) => Self::ResourceLimitExceeded,
            Some(libc::EFBIG) => Self::SemaphoreOutOfRange,
            Some(libc::EEXIST) => Self::AlreadyExists,
            Some(libc::ENOENT) if call != KernelCall::Ftok => Self::NotFound,
            Some(libc::EAGAIN) => Self::WouldBlock,
            Some(libc::ENOMSG) if call == KernelCall::Msgrcv => Self::WouldBlock,
            _ => Self::Other,
        }
    }
}

/// A failed kernel call, with enough context to explain the failure to the user.
#[derive(Debug)]
pub struct KernelError {
    call: KernelCall,
    failure: KernelFailure,
    source: io::Error,
}

impl KernelError {
    pub(crate) fn new(call: KernelCall, source: io::Error) -> Self {
        Self {
            call,
            failure: KernelFailure::classify(call, source.raw_os_error()),
            source,
        }
    }

    /// The call that failed.
    #[must_use]
    pub fn call(&self) -> KernelCall {
        self.call
    }

    /// Why the call failed.
    #[must_use]
    pub fn failure(&self) -> KernelFailure {
        self.failure
    }

    /// The condition text documented for this call and error, falling back to the OS error text.
    #[must_use]
    pub fn description(&self) -> String {
        self.source
            .raw_os_error()
            .and_then(|errno| documented_condition(self.call, errno))
            .map_or_else(|| self.source.to_string(), str::to_string)
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(): {}", self.call, self.description())
    }
}

impl Error for KernelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

#[expect(
    clippy::match_same_arms,
    reason = "each call documents its own conditions, even where the wording matches"
)]
fn documented_condition(call: KernelCall, errno: i32) -> Option<&'static str> {
    let text = match (call, errno) {
        (KernelCall::Semget, libc::EACCES) => {
            "A semaphore identifier exists for key, but operation permission as specified by the \
             low-order 9 bits of semflg would not be granted."
        }
        (KernelCall::Semget, libc::EEXIST) => {
            "A semaphore identifier exists for the argument key but ((semflg &IPC_CREAT) && \
             (semflg &IPC_EXCL)) is non-zero."
        }
        (KernelCall::Semget, libc::EINVAL) => {
            "The value of nsems is either less than or equal to 0 or greater than the \
             system-imposed limit, or a semaphore identifier exists for the argument key, but the \
             number of semaphores in the set associated with it is less than nsems and nsems is \
             not equal to 0."
        }
        (KernelCall::Semget, libc::ENOENT) => {
            "A semaphore identifier does not exist for the argument key and (semflg &IPC_CREAT) \
             is equal to 0."
        }
        (KernelCall::Semget, libc::ENOSPC) => {
            "A semaphore identifier is to be created but the system-imposed limit on the maximum \
             number of allowed semaphores system-wide would be exceeded."
        }
        (KernelCall::Semctl, libc::EACCES) => {
            "Operation permission is denied to the calling process."
        }
        (KernelCall::Semctl, libc::EINVAL) => {
            "The value of semid is not a valid semaphore identifier, or the value of semnum is \
             less than 0 or greater than or equal to sem_nsems, or the value of cmd is not a \
             valid command."
        }
        (KernelCall::Semctl, libc::EPERM) => {
            "The argument cmd is equal to IPC_RMID or IPC_SET and the effective user ID of the \
             calling process is not equal to that of a process with appropriate privileges and \
             it is not equal to the value of sem_perm.cuid or sem_perm.uid in the data structure \
             associated with semid."
        }
        (KernelCall::Semctl, libc::ERANGE) => {
            "The argument cmd is equal to SETVAL or SETALL and the value to which semval is to \
             be set is greater than the system-imposed maximum."
        }
        (KernelCall::Semop, libc::E2BIG) => {
            "The value of nsops is greater than the system-imposed maximum."
        }
        (KernelCall::Semop, libc::EACCES) => {
            "Operation permission is denied to the calling process."
        }
        (KernelCall::Semop, libc::EFBIG) => {
            "The value of sem_num is less than 0 or greater than or equal to the number of \
             semaphores in the set associated with semid."
        }
        (KernelCall::Semop, libc::EIDRM) => {
            "The semaphore identifier semid is removed from the system."
        }
        (KernelCall::Semop, libc::EINTR) => "The semop() function was interrupted by a signal.",
        (KernelCall::Semop, libc::EINVAL) => {
            "The value of semid is not a valid semaphore identifier, or the number of individual \
             semaphores for which the calling process requests a SEM_UNDO would exceed the \
             system-imposed limit."
        }
        (KernelCall::Semop, libc::ENOSPC) => {
            "The limit on the number of individual processes requesting a SEM_UNDO would be \
             exceeded."
        }
        (KernelCall::Semop, libc::ERANGE) => {
            "An operation would cause a semval to overflow the system-imposed limit, or an \
             operation would cause a semadj value to overflow the system-imposed limit."
        }
        (KernelCall::Msgget, libc::EACCES) => {
            "A message queue identifier exists for the argument key, but operation permission as \
             specified by the low-order 9 bits of msgflg would not be granted."
        }
        (KernelCall::Msgget, libc::EEXIST) => {
            "A message queue identifier exists for the argument key but ((msgflg & IPC_CREAT) && \
             (msgflg & IPC_EXCL)) is non-zero."
        }
        (KernelCall::Msgget, libc::ENOENT) => {
            "A message queue identifier does not exist for the argument key and (msgflg & \
             IPC_CREAT) is 0."
        }
        (KernelCall::Msgget, libc::ENOSPC) => {
            "A message queue identifier is to be created but the system-imposed limit on the \
             maximum number of allowed message queue identifiers system-wide would be exceeded."
        }
        (KernelCall::Msgctl, libc::EACCES) => {
            "The argument cmd is IPC_STAT and the calling process does not have read permission"
        }
        (KernelCall::Msgctl, libc::EINVAL) => {
            "The value of msqid is not a valid message queue identifier; or the value of cmd is \
             not a valid command."
        }
        (KernelCall::Msgsnd, libc::EACCES) => {
            "Operation permission is denied to the calling process."
        }
        (KernelCall::Msgsnd, libc::EIDRM) => {
            "The message queue identifier msqid is removed from the system."
        }
        (KernelCall::Msgsnd, libc::EINTR) => "The msgsnd() function was interrupted by a signal.",
        (KernelCall::Msgsnd, libc::EINVAL) => {
            "The value of msqid is not a valid message queue identifier, or the value of mtype is \
             less than 1; or the value of msgsz is less than 0 or greater than the system-imposed \
             limit."
        }
        (KernelCall::Msgrcv, libc::E2BIG) => {
            "The value of mtext is greater than msgsz and (msgflg & MSG_NOERROR) is 0."
        }
        (KernelCall::Msgrcv, libc::EACCES) => {
            "Operation permission is denied to the calling process"
        }
        (KernelCall::Msgrcv, libc::EIDRM) => {
            "The message queue identifier msqid is removed from the system."
        }
        (KernelCall::Msgrcv, libc::EINTR) => "The msgrcv() function was interrupted by a signal.",
        (KernelCall::Msgrcv, libc::EINVAL) => "msqid is not a valid message queue identifier.",
        (KernelCall::Msgrcv, libc::ENOMSG) => {
            "The queue does not contain a message of the desired type and (msgflg & IPC_NOWAIT) \
             is non-zero."
        }
        _ => return None,
    };

    Some(text)
}
