use std::fmt;
use std::ops::RangeInclusive;

use crate::Error;
use crate::bounds::{cardinality, index_sum, split_digits};

/// Characters accepted between the lower and upper bound of an interval.
const BOUND_SEPARATORS: [char; 2] = [':', ','];

/// A closed interval of semaphore numbers within a semaphore set.
///
/// The lower bound is never greater than the upper bound. A single semaphore is represented by
/// an interval whose bounds are equal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Range {
    lower: u16,
    upper: u16,
}

impl Range {
    /// Creates an interval covering `lower..=upper`.
    ///
    /// Returns `None` if `upper` is less than `lower`.
    #[must_use]
    pub const fn new(lower: u16, upper: u16) -> Option<Self> {
        if upper < lower {
            return None;
        }

        Some(Self { lower, upper })
    }

    /// Creates an interval that covers exactly one semaphore.
    #[must_use]
    pub const fn single(semaphore_number: u16) -> Self {
        Self {
            lower: semaphore_number,
            upper: semaphore_number,
        }
    }

    /// The first semaphore number in the interval.
    #[must_use]
    pub const fn lower(&self) -> u16 {
        self.lower
    }

    /// The last semaphore number in the interval (inclusive).
    #[must_use]
    pub const fn upper(&self) -> u16 {
        self.upper
    }

    /// Number of semaphores addressed by the interval. Always at least 1.
    #[must_use]
    pub fn cardinality(&self) -> u64 {
        cardinality(self.lower, self.upper)
    }

    /// Sum of all semaphore numbers addressed by the interval.
    #[must_use]
    pub fn index_sum(&self) -> u64 {
        index_sum(self.lower, self.upper)
    }

    /// The semaphore numbers addressed by the interval, in ascending order.
    #[must_use]
    pub fn semaphores(&self) -> RangeInclusive<u16> {
        self.lower..=self.upper
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lower == self.upper {
            write!(f, "{}", self.lower)
        } else {
            write!(f, "{}:{}", self.lower, self.upper)
        }
    }
}

/// Parses the semaphore number interval at the start of `token`.
///
/// The interval is `LOWER` or `LOWER:UPPER` (a comma is accepted in place of the colon) and must
/// be immediately followed by `delimiter`. On success, returns the interval together with the
/// byte offset of the delimiter within `token`, where the value payload begins.
///
/// # Errors
///
/// Returns [`Error::MalformedInterval`] if the token does not start with a semaphore number, if a
/// bound is outside of `[0, 65535]`, if the upper bound is less than the lower bound or if the
/// interval is not immediately followed by `delimiter`.
pub fn parse_interval(token: &str, delimiter: char) -> crate::Result<(Range, usize)> {
    let Some((lower_digits, rest)) = split_digits(token) else {
        let problem = if token.starts_with('-') {
            "semaphore numbers cannot be negative"
        } else {
            "expected a semaphore number at the start"
        };

        return Err(Error::malformed_interval(token, problem));
    };

    let lower = parse_bound(token, lower_digits)?;

    let (upper, rest) = if rest.starts_with(delimiter) {
        (lower, rest)
    } else if let Some(after_separator) = rest.strip_prefix(BOUND_SEPARATORS) {
        let (upper_digits, rest) = split_digits(after_separator).ok_or_else(|| {
            Error::malformed_interval(token, "expected an upper bound after the separator")
        })?;

        (parse_bound(token, upper_digits)?, rest)
    } else {
        (lower, rest)
    };

    let range = Range::new(lower, upper).ok_or_else(|| {
        Error::malformed_interval(token, "upper bound of interval must be >= lower bound")
    })?;

    if !rest.starts_with(delimiter) {
        return Err(Error::malformed_interval(
            token,
            format!("expected '{delimiter}' immediately after the interval"),
        ));
    }

    Ok((range, token.len() - rest.len()))
}

fn parse_bound(token: &str, digits: &str) -> crate::Result<u16> {
    digits.parse::<u16>().map_err(|inner| {
        Error::malformed_interval(
            token,
            format!(
                "semaphore number {digits} is outside of [0, {}]: {inner}",
                u16::MAX
            ),
        )
    })
}
