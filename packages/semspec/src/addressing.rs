use crate::operation::ASSIGNMENT_DELIMITER;
use crate::{
    CompiledOperation, Error, OperationFlags, OperationSpec, Payload, compile, compile_whole_set,
    parse_operation, parse_payload,
};

/// How the operands of one invocation address the semaphores of a set.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Addressing<'a> {
    /// A single value applies to every semaphore in the set.
    WholeSet(&'a str),

    /// Each operand assigns a value to an explicit interval of semaphores.
    Ranged(Vec<&'a str>),
}

/// Determines the addressing mode of `operands` from the first operand and verifies that the
/// remaining operands use the same mode.
///
/// An operand containing `=` is ranged; any other operand is a whole-set value.
///
/// # Errors
///
/// Returns [`Error::EmptyOperationList`] if there are no operands and
/// [`Error::CoverageMismatch`] if a whole-set value is combined with ranged operands or more than
/// one whole-set value is given. A non-ranged operand in a ranged list that is not a valid value
/// either is left for the interval parser to reject.
pub fn classify_operands<S: AsRef<str>>(operands: &[S]) -> crate::Result<Addressing<'_>> {
    let mut tokens = operands.iter().map(|operand| operand.as_ref());

    let Some(first) = tokens.next() else {
        return Err(Error::EmptyOperationList);
    };

    if is_ranged(first) {
        let rest: Vec<&str> = tokens.collect();

        if let Some(conflict) = rest
            .iter()
            .find(|token| !is_ranged(token) && parse_payload(token).is_ok())
        {
            return Err(mixed_addressing(
                conflict,
                "a value for the whole set cannot be combined with ranged assignments",
            ));
        }

        let mut ranged = Vec::with_capacity(rest.len() + 1);
        ranged.push(first);
        ranged.extend(rest);

        return Ok(Addressing::Ranged(ranged));
    }

    if let Some(extra) = tokens.next() {
        let problem = if is_ranged(extra) {
            "ranged assignments cannot follow a value for the whole set"
        } else {
            "only one value may be given for the whole set"
        };

        return Err(mixed_addressing(extra, problem));
    }

    Ok(Addressing::WholeSet(first))
}

fn mixed_addressing(token: &str, problem: &str) -> Error {
    Error::coverage_mismatch(format!(
        "cannot combine '{token}' with the other operands: {problem}"
    ))
}

fn is_ranged(token: &str) -> bool {
    token.contains(ASSIGNMENT_DELIMITER)
}

/// A fully parsed set of semaphore operation operands, not yet expanded.
///
/// Building a plan parses and validates every operand, so a plan can only fail to compile if the
/// semaphore set itself turns out to be empty.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum OperationPlan {
    /// Apply the payload to every semaphore in the set. Expansion needs the set size.
    WholeSet(Payload),

    /// Apply each specification to its interval, in order.
    Ranged(Vec<OperationSpec>),
}

impl OperationPlan {
    /// Parses semaphore operation operands in either the whole-set form `VALUE[n][u]` or the
    /// ranged form `LOWER[:UPPER]=VALUE[n][u]...`.
    ///
    /// # Errors
    ///
    /// Returns the first addressing, interval, value or flag error found in the operands.
    pub fn parse<S: AsRef<str>>(operands: &[S]) -> crate::Result<Self> {
        match classify_operands(operands)? {
            Addressing::WholeSet(token) => Ok(Self::WholeSet(parse_payload(token)?)),
            Addressing::Ranged(tokens) => Ok(Self::Ranged(
                tokens
                    .into_iter()
                    .map(parse_operation)
                    .collect::<crate::Result<_>>()?,
            )),
        }
    }

    /// Returns a plan where `additions` are merged into the flags of every operation.
    #[must_use]
    pub fn with_flags(self, additions: OperationFlags) -> Self {
        match self {
            Self::WholeSet(payload) => Self::WholeSet(Payload::new(
                payload.magnitude(),
                payload.flags().union(additions),
            )),
            Self::Ranged(specs) => Self::Ranged(
                specs
                    .into_iter()
                    .map(|spec| spec.with_flags(additions))
                    .collect(),
            ),
        }
    }

    /// Whether expanding this plan requires knowing the number of semaphores in the set.
    #[must_use]
    pub const fn needs_set_size(&self) -> bool {
        matches!(self, Self::WholeSet(_))
    }

    /// Expands the plan into an operation list.
    ///
    /// `set_size` is only called for whole-set plans, so ranged plans never pay for a set size
    /// query.
    ///
    /// # Errors
    ///
    /// Returns any error produced by `set_size`, or [`Error::EmptyOperationList`] if the plan
    /// expands to nothing.
    pub fn compile<E>(
        &self,
        set_size: impl FnOnce() -> Result<u16, E>,
    ) -> Result<Vec<CompiledOperation>, E>
    where
        E: From<Error>,
    {
        match self {
            Self::WholeSet(payload) => Ok(compile_whole_set(*payload, set_size()?)?),
            Self::Ranged(specs) => Ok(compile(specs)?),
        }
    }
}
