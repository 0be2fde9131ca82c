// Numeric scanning and closed-form range arithmetic shared by the parsers and the coverage
// validator.
//
// Scanning is strict: no whitespace, no radix prefixes. Digits are split off first and
// converted afterwards, so an out-of-range number and a missing number are told apart.

/// Splits `text` into its leading run of ASCII digits and the remainder.
///
/// Returns `None` if `text` does not start with a digit.
pub(crate) fn split_digits(text: &str) -> Option<(&str, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());

    if end == 0 {
        return None;
    }

    Some(text.split_at(end))
}

/// Splits `text` into a leading integer with an optional `+` or `-` sign and the remainder.
///
/// Returns `None` if no digits follow the (optional) sign.
pub(crate) fn split_signed(text: &str) -> Option<(&str, &str)> {
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let unsigned = text.get(sign_len..)?;
    let (digits, _) = split_digits(unsigned)?;

    Some(text.split_at(sign_len + digits.len()))
}

/// Number of integers in the closed interval `[lower, upper]`.
pub(crate) fn cardinality(lower: u16, upper: u16) -> u64 {
    debug_assert!(lower <= upper);

    u64::from(upper) - u64::from(lower) + 1
}

/// Sum of all integers in the closed interval `[lower, upper]`.
pub(crate) fn index_sum(lower: u16, upper: u16) -> u64 {
    // (lower + upper) * count is always even, so the division is exact.
    (u64::from(lower) + u64::from(upper)) * cardinality(lower, upper) / 2
}

/// Sum `0 + 1 + ... + (count - 1)`, the index sum of a fully covered set of `count` items.
pub(crate) fn prefix_index_sum(count: u16) -> u64 {
    let count = u64::from(count);

    count * count.saturating_sub(1) / 2
}
