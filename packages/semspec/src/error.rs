use thiserror::Error;

/// Errors that can occur when parsing, validating or compiling semaphore operation
/// specifications.
///
/// Every variant is detected before any kernel call is made, so a caller that receives one of
/// these can be certain that no semaphore was touched.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The semaphore number interval at the start of a token did not match
    /// `LOWER[:UPPER]` followed by the expected delimiter.
    #[error("malformed interval '{invalid_value}': {problem}")]
    MalformedInterval {
        /// The token that contained the invalid interval.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// The operation value was missing or outside of the permitted numeric range.
    #[error("malformed value '{invalid_value}': {problem}")]
    MalformedValue {
        /// The token that contained the invalid value.
        invalid_value: String,

        /// A human-readable description of the problem.
        problem: String,
    },

    /// The value was followed by a character that is not a recognized flag letter.
    #[error("malformed flags '{invalid_value}': unexpected '{flag}', expected 'n' or 'u'")]
    MalformedFlags {
        /// The token that contained the invalid flag.
        invalid_value: String,

        /// The first character that was not a recognized flag.
        flag: char,
    },

    /// The operands do not address every semaphore in the set exactly once.
    ///
    /// This covers ranges that leave gaps, overlap or fall outside the set, as well as operands
    /// that mix a whole-set value with ranged assignments, because the two addressing modes are
    /// mutually exclusive within one invocation.
    #[error("operands do not address every semaphore of the set exactly once: {problem}")]
    CoverageMismatch {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// Compilation produced no operations. Submitting an empty list to the kernel is an
    /// observable no-op, so it is rejected instead.
    #[error("no semaphore operations were specified")]
    EmptyOperationList,
}

impl Error {
    pub(crate) fn malformed_interval(token: &str, problem: impl Into<String>) -> Self {
        Self::MalformedInterval {
            invalid_value: token.to_string(),
            problem: problem.into(),
        }
    }

    pub(crate) fn malformed_value(token: &str, problem: impl Into<String>) -> Self {
        Self::MalformedValue {
            invalid_value: token.to_string(),
            problem: problem.into(),
        }
    }

    pub(crate) fn coverage_mismatch(problem: impl Into<String>) -> Self {
        Self::CoverageMismatch {
            problem: problem.into(),
        }
    }
}

/// A specialized `Result` type for semspec operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug, Clone);

    #[test]
    fn messages_name_the_offending_token() {
        let error = Error::malformed_interval("7:3=1", "upper bound must be >= lower bound");
        assert_eq!(
            error.to_string(),
            "malformed interval '7:3=1': upper bound must be >= lower bound"
        );

        let error = Error::MalformedFlags {
            invalid_value: "0=1x".to_string(),
            flag: 'x',
        };
        assert_eq!(
            error.to_string(),
            "malformed flags '0=1x': unexpected 'x', expected 'n' or 'u'"
        );
    }

    #[test]
    fn coverage_mismatch_reports_problem() {
        let error = Error::coverage_mismatch("semaphore 2 of 4 is not addressed");
        assert_eq!(
            error.to_string(),
            "operands do not address every semaphore of the set exactly once: semaphore 2 of 4 \
             is not addressed"
        );
    }
}
