use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::{io, mem, slice};

use libc::{c_int, c_long, c_short, c_ushort, c_void};
use semspec::CompiledOperation;

use crate::pal::{Kernel, Message, SemaphoreQuery};

/// Kernel calls against the real operating system that the build is targeting.
#[derive(Debug, Default)]
pub(crate) struct BuildTargetKernel;

/// The fourth argument of `semctl()`, which the caller must define.
#[allow(dead_code, reason = "the fields are only read by the kernel")]
#[repr(C)]
union Semun {
    val: c_int,
    buf: *mut libc::semid_ds,
    array: *mut c_ushort,
}

// Real OS calls are excluded from coverage measurement because:
// 1. Only the parse-failure paths are exercised by integration tests, which never create
//    kernel objects.
// 2. Error paths require OS-level failures that are impractical to trigger in tests.
#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg_attr(test, mutants::skip)]
impl Kernel for BuildTargetKernel {
    fn ftok(&self, path: &Path, id: u8) -> io::Result<libc::key_t> {
        let path = CString::new(path.as_os_str().as_bytes())
            .map_err(|inner| io::Error::new(io::ErrorKind::InvalidInput, inner))?;

        // SAFETY: `path` is a NUL-terminated string that outlives the call.
        let key = unsafe { libc::ftok(path.as_ptr(), c_int::from(id)) };

        if key == -1 {
            Err(io::Error::last_os_error())
        } else {
            Ok(key)
        }
    }

    fn semget(&self, key: libc::key_t, nsems: i32, flags: i32) -> io::Result<i32> {
        // SAFETY: No safety requirements beyond passing valid arguments.
        check(unsafe { libc::semget(key, nsems, flags) })
    }

    fn semaphore_count(&self, semid: i32) -> io::Result<u16> {
        // SAFETY: All zeroes is a valid semid_ds.
        let mut info: libc::semid_ds = unsafe { mem::zeroed() };
        let argument = Semun {
            buf: &raw mut info,
        };

        // SAFETY: IPC_STAT writes one semid_ds through `buf`, which points to a live value.
        check(unsafe { libc::semctl(semid, 0, libc::IPC_STAT, argument) })?;

        u16::try_from(info.sem_nsems)
            .map_err(|inner| io::Error::new(io::ErrorKind::InvalidData, inner))
    }

    fn semop(&self, semid: i32, operations: &[CompiledOperation]) -> io::Result<()> {
        let mut buffers: Vec<libc::sembuf> = operations.iter().copied().map(to_sembuf).collect();

        // SAFETY: The pointer and length describe the `buffers` vector, which outlives the call.
        check(unsafe { libc::semop(semid, buffers.as_mut_ptr(), buffers.len()) })?;

        Ok(())
    }

    fn query_semaphore(&self, semid: i32, semnum: i32, query: SemaphoreQuery) -> io::Result<i32> {
        let command = match query {
            SemaphoreQuery::Value => libc::GETVAL,
            SemaphoreQuery::LastPid => libc::GETPID,
            SemaphoreQuery::IncreaseWaiters => libc::GETNCNT,
            SemaphoreQuery::ZeroWaiters => libc::GETZCNT,
        };

        // SAFETY: The query commands ignore the fourth argument.
        check(unsafe { libc::semctl(semid, semnum, command, Semun { val: 0 }) })
    }

    fn set_value(&self, semid: i32, semnum: i32, value: i32) -> io::Result<()> {
        // SAFETY: SETVAL only reads `val`.
        check(unsafe { libc::semctl(semid, semnum, libc::SETVAL, Semun { val: value }) })?;

        Ok(())
    }

    fn values(&self, semid: i32, count: u16) -> io::Result<Vec<u16>> {
        let mut values: Vec<c_ushort> = vec![0; usize::from(count)];
        let argument = Semun {
            array: values.as_mut_ptr(),
        };

        // SAFETY: GETALL writes one value per semaphore and the caller passes the set size as
        // `count`, so `array` has room for all of them.
        check(unsafe { libc::semctl(semid, 0, libc::GETALL, argument) })?;

        Ok(values)
    }

    fn set_values(&self, semid: i32, values: &[u16]) -> io::Result<()> {
        let mut values: Vec<c_ushort> = values.to_vec();
        let argument = Semun {
            array: values.as_mut_ptr(),
        };

        // SAFETY: SETALL reads one value per semaphore from `array`, which holds that many.
        check(unsafe { libc::semctl(semid, 0, libc::SETALL, argument) })?;

        Ok(())
    }

    fn msgget(&self, key: libc::key_t, flags: i32) -> io::Result<i32> {
        // SAFETY: No safety requirements beyond passing valid arguments.
        check(unsafe { libc::msgget(key, flags) })
    }

    fn queue_capacity(&self, msqid: i32) -> io::Result<usize> {
        // SAFETY: All zeroes is a valid msqid_ds.
        let mut info: libc::msqid_ds = unsafe { mem::zeroed() };

        // SAFETY: IPC_STAT writes one msqid_ds through the pointer, which points to a live value.
        check(unsafe { libc::msgctl(msqid, libc::IPC_STAT, &raw mut info) })?;

        usize::try_from(info.msg_qbytes)
            .map_err(|inner| io::Error::new(io::ErrorKind::InvalidData, inner))
    }

    fn msgsnd(
        &self,
        msqid: i32,
        message_type: c_long,
        text: &[u8],
        no_wait: bool,
    ) -> io::Result<()> {
        let mut buffer = MessageBuffer::new(text.len())?;
        buffer.set_message_type(message_type);
        buffer.text_mut().copy_from_slice(text);

        let flags = if no_wait { libc::IPC_NOWAIT } else { 0 };

        // SAFETY: The buffer is laid out as `struct msgbuf` with `text.len()` bytes of text.
        check(unsafe { libc::msgsnd(msqid, buffer.as_ptr(), text.len(), flags) })?;

        Ok(())
    }

    fn msgrcv(
        &self,
        msqid: i32,
        capacity: usize,
        message_type: c_long,
        no_wait: bool,
    ) -> io::Result<Message> {
        let mut buffer = MessageBuffer::new(capacity)?;
        let flags = if no_wait { libc::IPC_NOWAIT } else { 0 };

        // SAFETY: The buffer is laid out as `struct msgbuf` with room for `capacity` bytes of
        // text, which is the most the kernel will write.
        let received =
            unsafe { libc::msgrcv(msqid, buffer.as_mut_ptr(), capacity, message_type, flags) };

        let Ok(received) = usize::try_from(received) else {
            return Err(io::Error::last_os_error());
        };

        Ok(Message {
            message_type: buffer.message_type(),
            text: buffer.text_mut().iter().take(received).copied().collect(),
        })
    }
}

fn check(result: c_int) -> io::Result<c_int> {
    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result)
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "IPC_NOWAIT and SEM_UNDO are defined to fit in sem_flg"
)]
fn to_sembuf(operation: CompiledOperation) -> libc::sembuf {
    let mut flags: c_int = 0;

    if operation.flags().no_wait() {
        flags |= libc::IPC_NOWAIT;
    }

    if operation.flags().undo() {
        flags |= libc::SEM_UNDO;
    }

    libc::sembuf {
        sem_num: operation.semaphore_number(),
        sem_op: operation.magnitude(),
        sem_flg: flags as c_short,
    }
}

/// Storage laid out as `struct msgbuf { long mtype; char mtext[capacity]; }`.
struct MessageBuffer {
    words: Vec<c_long>,
    capacity: usize,
}

impl MessageBuffer {
    fn new(capacity: usize) -> io::Result<Self> {
        let words = capacity
            .div_ceil(size_of::<c_long>())
            .checked_add(1)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "message is too large"))?;

        Ok(Self {
            words: vec![0; words],
            capacity,
        })
    }

    fn message_type(&self) -> c_long {
        self.words.first().copied().unwrap_or_default()
    }

    fn set_message_type(&mut self, message_type: c_long) {
        if let Some(first) = self.words.first_mut() {
            *first = message_type;
        }
    }

    fn text_mut(&mut self) -> &mut [u8] {
        let start = self.words.as_mut_ptr().wrapping_add(1).cast::<u8>();

        // SAFETY: The words after the first one are initialized and span at least `capacity`
        // bytes. Bytes have no alignment requirement.
        unsafe { slice::from_raw_parts_mut(start, self.capacity) }
    }

    fn as_ptr(&self) -> *const c_void {
        self.words.as_ptr().cast()
    }

    fn as_mut_ptr(&mut self) -> *mut c_void {
        self.words.as_mut_ptr().cast()
    }
}
