use std::fmt;

use crate::payload::parse_payload_of;
use crate::{OperationFlags, Payload, Range, parse_interval};

/// The character that separates the interval from the value payload in a ranged token.
pub const ASSIGNMENT_DELIMITER: char = '=';

/// One parsed interval assignment: apply `payload` to every semaphore in `range`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OperationSpec {
    range: Range,
    payload: Payload,
}

impl OperationSpec {
    /// Creates an operation specification.
    #[must_use]
    pub const fn new(range: Range, payload: Payload) -> Self {
        Self { range, payload }
    }

    /// The semaphores addressed by this specification.
    #[must_use]
    pub const fn range(&self) -> Range {
        self.range
    }

    /// The value and flags applied to each addressed semaphore.
    #[must_use]
    pub const fn payload(&self) -> Payload {
        self.payload
    }

    /// The delta applied to each addressed semaphore.
    #[must_use]
    pub const fn magnitude(&self) -> i16 {
        self.payload.magnitude()
    }

    /// The flags applied to each addressed semaphore.
    #[must_use]
    pub const fn flags(&self) -> OperationFlags {
        self.payload.flags()
    }

    /// Returns a copy of this specification with `additions` merged into its flags.
    #[must_use]
    pub const fn with_flags(self, additions: OperationFlags) -> Self {
        Self {
            range: self.range,
            payload: Payload::new(self.payload.magnitude(), self.payload.flags().union(additions)),
        }
    }
}

impl fmt::Display for OperationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{ASSIGNMENT_DELIMITER}{}", self.range, self.payload)
    }
}

/// A single-semaphore entry of an operation list, ready to be submitted to the kernel.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct CompiledOperation {
    semaphore_number: u16,
    payload: Payload,
}

impl CompiledOperation {
    /// Creates an operation on a single semaphore.
    #[must_use]
    pub const fn new(semaphore_number: u16, magnitude: i16, flags: OperationFlags) -> Self {
        Self {
            semaphore_number,
            payload: Payload::new(magnitude, flags),
        }
    }

    /// Index of the semaphore within its set.
    #[must_use]
    pub const fn semaphore_number(&self) -> u16 {
        self.semaphore_number
    }

    /// The delta applied to the semaphore value.
    #[must_use]
    pub const fn magnitude(&self) -> i16 {
        self.payload.magnitude()
    }

    /// Flags that alter how the kernel applies the operation.
    #[must_use]
    pub const fn flags(&self) -> OperationFlags {
        self.payload.flags()
    }

    /// The value and flags of the operation, without the semaphore number.
    #[must_use]
    pub const fn payload(&self) -> Payload {
        self.payload
    }
}

/// Parses a ranged operation token of the form `LOWER[:UPPER]=[+|-]VALUE[n][u]`.
///
/// # Errors
///
/// Returns [`crate::Error::MalformedInterval`] if the interval is invalid, or
/// [`crate::Error::MalformedValue`] / [`crate::Error::MalformedFlags`] if the payload after the
/// delimiter is invalid. The interval is always checked first.
pub fn parse_operation(token: &str) -> crate::Result<OperationSpec> {
    let (range, offset) = parse_interval(token, ASSIGNMENT_DELIMITER)?;

    let payload_text = token
        .get(offset..)
        .and_then(|rest| rest.strip_prefix(ASSIGNMENT_DELIMITER))
        .unwrap_or_default();

    let payload = parse_payload_of(token, payload_text)?;

    Ok(OperationSpec::new(range, payload))
}
