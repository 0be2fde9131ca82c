use crate::bounds::split_signed;
use crate::operation::ASSIGNMENT_DELIMITER;
use crate::{Addressing, Error, Range, classify_operands, parse_interval, validate_coverage};

/// Builds the value array for initializing every semaphore of a set at once.
///
/// `operands` is either a single unsigned value applied to every semaphore, or one or more
/// `LOWER[:UPPER]=VALUE` assignments that together must address each of the `set_size`
/// semaphores exactly once. Values are unsigned 16-bit integers; flags are not accepted.
///
/// Every operand is parsed and range-checked before coverage is validated, so the coverage proof
/// only ever sees in-domain intervals.
///
/// # Errors
///
/// Returns [`Error::MalformedInterval`] or [`Error::MalformedValue`] for an invalid operand,
/// [`Error::CoverageMismatch`] if the two addressing modes are combined or the intervals are not
/// a partition of the set and
/// [`Error::EmptyOperationList`] if there are no operands or the set is empty.
pub fn plan_set_all<S: AsRef<str>>(operands: &[S], set_size: u16) -> crate::Result<Vec<u16>> {
    let addressing = classify_operands(operands)?;

    if set_size == 0 {
        return Err(Error::EmptyOperationList);
    }

    match addressing {
        Addressing::WholeSet(token) => {
            let value = parse_semaphore_value(token, token)?;

            Ok(vec![value; usize::from(set_size)])
        }
        Addressing::Ranged(tokens) => {
            let assignments = tokens
                .into_iter()
                .map(parse_assignment)
                .collect::<crate::Result<Vec<_>>>()?;

            let ranges: Vec<Range> = assignments.iter().map(|&(range, _)| range).collect();
            validate_coverage(&ranges, set_size)?;

            let mut values = vec![0; usize::from(set_size)];

            for (range, value) in assignments {
                for semaphore_number in range.semaphores() {
                    if let Some(slot) = values.get_mut(usize::from(semaphore_number)) {
                        *slot = value;
                    }
                }
            }

            Ok(values)
        }
    }
}

fn parse_assignment(token: &str) -> crate::Result<(Range, u16)> {
    let (range, offset) = parse_interval(token, ASSIGNMENT_DELIMITER)?;

    let value_text = token
        .get(offset..)
        .and_then(|rest| rest.strip_prefix(ASSIGNMENT_DELIMITER))
        .unwrap_or_default();

    Ok((range, parse_semaphore_value(token, value_text)?))
}

/// Parses an unsigned 16-bit semaphore value, naming `token` in any error.
fn parse_semaphore_value(token: &str, text: &str) -> crate::Result<u16> {
    let Some((number, rest)) = split_signed(text) else {
        return Err(Error::malformed_value(token, "expected an unsigned integer value"));
    };

    if !rest.is_empty() {
        return Err(Error::malformed_value(
            token,
            "unexpected characters after the value",
        ));
    }

    number.parse::<u16>().map_err(|inner| {
        Error::malformed_value(
            token,
            format!("semaphore value {number} is outside of [0, {}]: {inner}", u16::MAX),
        )
    })
}
