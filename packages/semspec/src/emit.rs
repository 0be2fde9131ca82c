use itertools::Itertools;

use crate::{CompiledOperation, OperationSpec, Range};

/// Groups an operation list back into operation specifications.
///
/// Consecutive operations that carry the same payload and address consecutive ascending
/// semaphore numbers are merged into one interval. For a list compiled from gap-free,
/// non-overlapping specifications whose neighbours differ in payload, this recovers the original
/// specifications.
#[must_use]
pub fn regroup(operations: &[CompiledOperation]) -> Vec<OperationSpec> {
    operations
        .iter()
        .map(|operation| {
            OperationSpec::new(
                Range::single(operation.semaphore_number()),
                operation.payload(),
            )
        })
        .coalesce(|previous, next| {
            let is_adjacent = u32::from(previous.range().upper()) + 1
                == u32::from(next.range().lower());

            if !is_adjacent || previous.payload() != next.payload() {
                return Err((previous, next));
            }

            match Range::new(previous.range().lower(), next.range().upper()) {
                Some(merged) => Ok(OperationSpec::new(merged, previous.payload())),
                None => Err((previous, next)),
            }
        })
        .collect()
}

/// Emits an operation list in the ranged operand syntax, one space-separated token per group.
///
/// The output can be passed back to `ipcmd semop` to perform the same operations.
#[must_use]
pub fn emit(operations: &[CompiledOperation]) -> String {
    regroup(operations).iter().join(" ")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{OperationFlags, compile, parse_operation};

    fn specs(tokens: &[&str]) -> Vec<OperationSpec> {
        tokens
            .iter()
            .map(|token| parse_operation(token).unwrap())
            .collect()
    }

    #[test]
    fn compile_then_regroup_recovers_partition() {
        for tokens in [
            vec!["0:1=5", "2:3=7"],
            vec!["0=1n", "1:9=-1u", "10=0"],
            vec!["4:6=2", "0:3=1"],
            vec!["0:65535=-2nu"],
        ] {
            let original = specs(&tokens);
            let operations = compile(&original).unwrap();

            assert_eq!(regroup(&operations), original, "{tokens:?}");
        }
    }

    #[test]
    fn equal_neighbours_are_merged() {
        let operations = compile(&specs(&["0:1=5", "2:3=5"])).unwrap();

        assert_eq!(regroup(&operations), specs(&["0:3=5"]));
    }

    #[test]
    fn descending_or_repeated_numbers_are_not_merged() {
        let operations = [
            CompiledOperation::new(1, 1, OperationFlags::NONE),
            CompiledOperation::new(0, 1, OperationFlags::NONE),
            CompiledOperation::new(0, 1, OperationFlags::NONE),
        ];

        assert_eq!(regroup(&operations).len(), 3);
    }

    #[test]
    fn emit_produces_operands() {
        let operations = compile(&specs(&["0,1=3u", "2=-1"])).unwrap();

        assert_eq!(emit(&operations), "0:1=3u 2=-1");
        assert_eq!(emit(&[]), "");
    }
}
