use std::fmt;

use crate::Error;
use crate::bounds::split_signed;

/// Flag letter requesting that the operation fail instead of blocking.
const NO_WAIT_FLAG: char = 'n';

/// Flag letter requesting that the kernel reverse the operation when the process exits.
const UNDO_FLAG: char = 'u';

/// Per-operation flags that alter how the kernel applies a semaphore operation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct OperationFlags {
    no_wait: bool,
    undo: bool,
}

impl OperationFlags {
    /// No flags: the operation blocks until it can proceed and is not undone on exit.
    pub const NONE: Self = Self::new(false, false);

    /// Creates a flag set.
    #[must_use]
    pub const fn new(no_wait: bool, undo: bool) -> Self {
        Self { no_wait, undo }
    }

    /// Whether the operation fails immediately instead of suspending the caller.
    #[must_use]
    pub const fn no_wait(&self) -> bool {
        self.no_wait
    }

    /// Whether the kernel reverses the operation when the owning process terminates.
    #[must_use]
    pub const fn undo(&self) -> bool {
        self.undo
    }

    /// Returns a flag set with every flag that is set in either `self` or `other`.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            no_wait: self.no_wait || other.no_wait,
            undo: self.undo || other.undo,
        }
    }
}

impl fmt::Display for OperationFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.no_wait {
            write!(f, "{NO_WAIT_FLAG}")?;
        }

        if self.undo {
            write!(f, "{UNDO_FLAG}")?;
        }

        Ok(())
    }
}

/// The value part of an operation token: a signed delta plus flags.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Payload {
    magnitude: i16,
    flags: OperationFlags,
}

impl Payload {
    /// Creates a payload.
    #[must_use]
    pub const fn new(magnitude: i16, flags: OperationFlags) -> Self {
        Self { magnitude, flags }
    }

    /// The delta applied to the semaphore value. Zero waits until the value is zero.
    #[must_use]
    pub const fn magnitude(&self) -> i16 {
        self.magnitude
    }

    /// The flags parsed from the trailing flag letters.
    #[must_use]
    pub const fn flags(&self) -> OperationFlags {
        self.flags
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.flags)
    }
}

/// Parses a value payload of the form `[+|-]VALUE[n][u]`.
///
/// The flag letters may appear in any order and repeating a letter has no additional effect.
///
/// # Errors
///
/// Returns [`Error::MalformedValue`] if the payload does not start with an integer in the
/// signed 16-bit range and [`Error::MalformedFlags`] if the integer is followed by anything
/// other than flag letters.
pub fn parse_payload(text: &str) -> crate::Result<Payload> {
    parse_payload_of(text, text)
}

/// Parses a bare signed 16-bit integer with no flags.
///
/// Operand parsing goes through [`parse_payload`]. This is for callers that hold a value which
/// must not carry flags, such as a programmatically built
/// [`CompiledOperation`](crate::CompiledOperation).
///
/// ```
/// use semspec::{CompiledOperation, OperationFlags, parse_magnitude};
///
/// let magnitude = parse_magnitude("-2").unwrap();
/// let operation = CompiledOperation::new(0, magnitude, OperationFlags::default());
///
/// assert_eq!(operation.magnitude(), -2);
/// assert!(parse_magnitude("-2u").is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::MalformedValue`] if `text` is not entirely an integer in the signed 16-bit
/// range.
pub fn parse_magnitude(text: &str) -> crate::Result<i16> {
    let (number, rest) = split_signed(text)
        .ok_or_else(|| Error::malformed_value(text, "expected a signed integer"))?;

    if !rest.is_empty() {
        return Err(Error::malformed_value(
            text,
            "unexpected characters after the integer",
        ));
    }

    parse_signed(text, number)
}

/// Parses `text` as a payload, naming `token` in any error.
pub(crate) fn parse_payload_of(token: &str, text: &str) -> crate::Result<Payload> {
    let (number, flag_letters) = split_signed(text)
        .ok_or_else(|| Error::malformed_value(token, "expected a signed integer value"))?;

    let magnitude = parse_signed(token, number)?;

    let mut no_wait = false;
    let mut undo = false;

    for letter in flag_letters.chars() {
        match letter {
            NO_WAIT_FLAG => no_wait = true,
            UNDO_FLAG => undo = true,
            flag => {
                return Err(Error::MalformedFlags {
                    invalid_value: token.to_string(),
                    flag,
                });
            }
        }
    }

    Ok(Payload::new(magnitude, OperationFlags::new(no_wait, undo)))
}

fn parse_signed(token: &str, number: &str) -> crate::Result<i16> {
    number.parse::<i16>().map_err(|inner| {
        Error::malformed_value(
            token,
            format!(
                "{number} is outside of [{}, {}]: {inner}",
                i16::MIN,
                i16::MAX
            ),
        )
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parse_smoke_test() {
        assert_eq!(
            parse_payload("5").unwrap(),
            Payload::new(5, OperationFlags::NONE)
        );
        assert_eq!(
            parse_payload("-1u").unwrap(),
            Payload::new(-1, OperationFlags::new(false, true))
        );
        assert_eq!(
            parse_payload("+3n").unwrap(),
            Payload::new(3, OperationFlags::new(true, false))
        );
        assert_eq!(
            parse_payload("0un").unwrap(),
            Payload::new(0, OperationFlags::new(true, true))
        );
        assert_eq!(
            parse_payload("2nn").unwrap(),
            Payload::new(2, OperationFlags::new(true, false))
        );
    }

    #[test]
    fn signed_bounds() {
        assert_eq!(parse_payload("-32768").unwrap().magnitude(), i16::MIN);
        assert_eq!(parse_payload("32767u").unwrap().magnitude(), i16::MAX);

        for text in ["32768", "-32769", "100000n"] {
            let error = parse_payload(text).unwrap_err();
            assert!(
                matches!(error, Error::MalformedValue { .. }),
                "{text} produced {error:?}"
            );
        }
    }

    #[test]
    fn missing_value_is_error() {
        for text in ["", "n", "-", "+u", "=5"] {
            let error = parse_payload(text).unwrap_err();
            assert!(
                matches!(error, Error::MalformedValue { .. }),
                "{text:?} produced {error:?}"
            );
        }
    }

    #[test]
    fn unknown_flag_is_malformed_flags() {
        assert_eq!(
            parse_payload("5x").unwrap_err(),
            Error::MalformedFlags {
                invalid_value: "5x".to_string(),
                flag: 'x',
            }
        );

        // The first unknown letter is reported even after valid ones.
        assert!(matches!(
            parse_payload("5nz").unwrap_err(),
            Error::MalformedFlags { flag: 'z', .. }
        ));
        assert!(matches!(
            parse_payload("5 ").unwrap_err(),
            Error::MalformedFlags { flag: ' ', .. }
        ));
    }

    #[test]
    fn bare_magnitude() {
        assert_eq!(parse_magnitude("-1").unwrap(), -1);
        assert_eq!(parse_magnitude("+12").unwrap(), 12);
        parse_magnitude("12n").unwrap_err();
        parse_magnitude("").unwrap_err();
        parse_magnitude("40000").unwrap_err();
    }

    #[test]
    fn flags_union_and_display() {
        let no_wait = OperationFlags::new(true, false);
        let undo = OperationFlags::new(false, true);

        assert_eq!(no_wait.union(undo), OperationFlags::new(true, true));
        assert_eq!(OperationFlags::NONE.union(undo), undo);

        assert_eq!(OperationFlags::NONE.to_string(), "");
        assert_eq!(no_wait.union(undo).to_string(), "nu");
        assert_eq!(Payload::new(-4, undo).to_string(), "-4u");
    }
}
