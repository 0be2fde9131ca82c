// The message queue commands: `msgget`, `msgsnd` and `msgrcv`.

use std::io::{Read, Write};

use tracing::{debug, trace};

use crate::config::creation_flags;
use crate::pal::Kernel;
use crate::{
    Config, KernelCall, KernelError, KernelFailure, MsggetArgs, MsgrcvArgs, MsgsndArgs, RunError,
    RunOutcome,
};

pub(crate) fn get(
    args: &MsggetArgs,
    kernel: &impl Kernel,
    output: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    let flags = creation_flags(args.key.is_some(), args.exist_ok, args.mode, "-Q msgkey")?;
    let key = args.key.unwrap_or(libc::IPC_PRIVATE);

    trace!(key, flags, "msgget()");

    let msqid = kernel
        .msgget(key, flags)
        .map_err(|error| KernelError::new(KernelCall::Msgget, error))?;

    writeln!(output, "{msqid}").map_err(RunError::output)?;

    Ok(RunOutcome::Completed)
}

/// Sends every argument as one message or, without arguments, all of `input` as one message.
///
/// Every message is checked against the queue capacity before the first one is sent.
pub(crate) fn send(
    args: &MsgsndArgs,
    config: &Config,
    kernel: &impl Kernel,
    input: &mut impl Read,
) -> Result<RunOutcome, RunError> {
    let msqid = config.msqid(args.msqid)?;
    let capacity = queue_capacity(kernel, msqid)?;

    let messages = if args.messages.is_empty() {
        vec![read_message(input, capacity)?]
    } else {
        if args
            .messages
            .iter()
            .any(|message| message.len() > capacity)
        {
            return Err(RunError::InvalidArgument(
                "message argument length > msg_qbytes".to_string(),
            ));
        }

        args.messages
            .iter()
            .map(|message| message.as_bytes().to_vec())
            .collect()
    };

    debug!(msqid, messages = messages.len(), "sending messages");

    for text in &messages {
        trace!(msqid, mtype = args.mtype, length = text.len(), "msgsnd()");

        if let Err(error) = kernel.msgsnd(msqid, args.mtype, text, args.no_wait) {
            let error = KernelError::new(KernelCall::Msgsnd, error);

            if error.failure() == KernelFailure::WouldBlock {
                debug!(msqid, "queue is full");
                return Ok(RunOutcome::WouldBlock);
            }

            return Err(error.into());
        }
    }

    Ok(RunOutcome::Completed)
}

/// Reads at most `capacity` bytes, failing if `input` holds more than that.
fn read_message(input: &mut impl Read, capacity: usize) -> Result<Vec<u8>, RunError> {
    let limit = u64::try_from(capacity)
        .unwrap_or(u64::MAX)
        .saturating_add(1);

    let mut message = Vec::new();
    input
        .take(limit)
        .read_to_end(&mut message)
        .map_err(RunError::input)?;

    if message.len() > capacity {
        return Err(RunError::InvalidArgument(
            "message length > msg_qbytes".to_string(),
        ));
    }

    Ok(message)
}

pub(crate) fn receive(
    args: &MsgrcvArgs,
    config: &Config,
    kernel: &impl Kernel,
    output: &mut impl Write,
) -> Result<RunOutcome, RunError> {
    let msqid = config.msqid(args.msqid)?;
    let capacity = queue_capacity(kernel, msqid)?;

    trace!(msqid, capacity, msgtyp = args.msgtyp, "msgrcv()");

    let message = match kernel.msgrcv(msqid, capacity, args.msgtyp, args.no_wait) {
        Ok(message) => message,
        Err(error) => {
            let error = KernelError::new(KernelCall::Msgrcv, error);

            if error.failure() == KernelFailure::WouldBlock {
                debug!(msqid, "no message of the requested type");
                return Ok(RunOutcome::WouldBlock);
            }

            return Err(error.into());
        }
    };

    if args.verbose {
        eprintln!("{}", message.message_type);
    }

    output.write_all(&message.text).map_err(RunError::output)?;
    output.flush().map_err(RunError::output)?;

    Ok(RunOutcome::Completed)
}

fn queue_capacity(kernel: &impl Kernel, msqid: i32) -> Result<usize, RunError> {
    trace!(msqid, "msgctl(IPC_STAT)");

    kernel
        .queue_capacity(msqid)
        .map_err(|error| KernelError::new(KernelCall::Msgctl, error).into())
}
