use itertools::Itertools;

use crate::Error;
use crate::Range;
use crate::bounds::prefix_index_sum;

/// Verifies that `ranges` address every semaphore of a set with `set_size` semaphores exactly
/// once, with no gaps and no overlaps.
///
/// Each range must already have been fully parsed and range-checked. Two aggregate checks run
/// first: the sum of interval cardinalities must equal `set_size`, and the sum of all covered
/// semaphore numbers must equal `0 + 1 + ... + (set_size - 1)`. Because equal count and sum can
/// still hide an overlap that cancels out a gap (e.g. `0 0 3 3` for a set of 4), the ranges are
/// then walked in ascending order to confirm that each one starts exactly where the previous one
/// ended.
///
/// # Errors
///
/// Returns [`Error::CoverageMismatch`] describing the first problem found.
pub fn validate_coverage(ranges: &[Range], set_size: u16) -> crate::Result<()> {
    if ranges.is_empty() {
        if set_size == 0 {
            return Ok(());
        }

        return Err(Error::coverage_mismatch(format!(
            "no ranges were supplied for a set of {set_size} semaphores"
        )));
    }

    let addressed_count: u64 = ranges.iter().map(Range::cardinality).sum();

    if addressed_count != u64::from(set_size) {
        return Err(Error::coverage_mismatch(format!(
            "{addressed_count} semaphores are addressed in a set of {set_size}"
        )));
    }

    let addressed_sum: u64 = ranges.iter().map(Range::index_sum).sum();

    if addressed_sum != prefix_index_sum(set_size) {
        return Err(Error::coverage_mismatch(format!(
            "some of the {set_size} semaphores are addressed more than once while others are \
             not addressed"
        )));
    }

    let mut next_expected: u32 = 0;

    for range in ranges.iter().sorted_by_key(|range| range.lower()) {
        let lower = u32::from(range.lower());

        if lower < next_expected {
            return Err(Error::coverage_mismatch(format!(
                "semaphore {lower} is addressed more than once"
            )));
        }

        if lower > next_expected {
            return Err(Error::coverage_mismatch(format!(
                "semaphore {next_expected} of {set_size} is not addressed"
            )));
        }

        next_expected = u32::from(range.upper()) + 1;
    }

    // Contiguous from zero with the right count means exactly [0, set_size).
    debug_assert_eq!(next_expected, u32::from(set_size));

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn ranges(bounds: &[(u16, u16)]) -> Vec<Range> {
        bounds
            .iter()
            .map(|&(lower, upper)| Range::new(lower, upper).unwrap())
            .collect()
    }

    #[test]
    fn partition_is_accepted() {
        validate_coverage(&ranges(&[(0, 1), (2, 3)]), 4).unwrap();
        validate_coverage(&ranges(&[(2, 3), (0, 1)]), 4).unwrap();
        validate_coverage(&ranges(&[(0, 0), (1, 1), (2, 2)]), 3).unwrap();
        validate_coverage(&ranges(&[(0, 9)]), 10).unwrap();
        validate_coverage(&ranges(&[(0, u16::MAX - 1)]), u16::MAX).unwrap();
    }

    #[test]
    fn overlap_is_rejected() {
        let error = validate_coverage(&ranges(&[(0, 1), (1, 3)]), 4).unwrap_err();
        assert!(matches!(error, Error::CoverageMismatch { .. }));
    }

    #[test]
    fn gap_is_rejected() {
        let error = validate_coverage(&ranges(&[(0, 1), (3, 3)]), 4).unwrap_err();
        assert!(matches!(error, Error::CoverageMismatch { .. }));
        assert!(error.to_string().contains("3 semaphores are addressed in a set of 4"));
    }

    #[test]
    fn overlap_hidden_by_matching_count_and_sum_is_rejected() {
        // Count 4 and sum 6 both match {0, 1, 2, 3}.
        let error = validate_coverage(&ranges(&[(0, 0), (0, 0), (3, 3), (3, 3)]), 4).unwrap_err();
        assert!(error.to_string().contains("more than once"));

        // Count 5 and sum 10 both match {0, 1, 2, 3, 4}.
        let error = validate_coverage(&ranges(&[(0, 1), (1, 1), (3, 3), (4, 4)]), 5).unwrap_err();
        assert!(matches!(error, Error::CoverageMismatch { .. }));
    }

    #[test]
    fn out_of_set_range_is_rejected() {
        validate_coverage(&ranges(&[(1, 3)]), 3).unwrap_err();
        validate_coverage(&ranges(&[(0, 1), (2, 3)]), 3).unwrap_err();
    }

    #[test]
    fn empty_input() {
        let error = validate_coverage(&[], 4).unwrap_err();
        assert!(error.to_string().contains("no ranges"));

        validate_coverage(&[], 0).unwrap();
    }

    #[test]
    fn accepts_iff_partition_exhaustive_small_sets() {
        // Every combination of up to three ranges over a set of four semaphores.
        let set_size: u16 = 4;
        let all_ranges: Vec<Range> = (0..set_size)
            .flat_map(|lower| (lower..set_size).map(move |upper| Range::new(lower, upper).unwrap()))
            .collect();

        for count in 1..=3 {
            for combination in all_ranges.iter().copied().combinations_with_replacement(count) {
                let mut covered = vec![0_u32; usize::from(set_size)];
                for range in &combination {
                    for n in range.semaphores() {
                        covered[usize::from(n)] += 1;
                    }
                }
                let is_partition = covered.iter().all(|&hits| hits == 1);

                assert_eq!(
                    validate_coverage(&combination, set_size).is_ok(),
                    is_partition,
                    "{combination:?}"
                );
            }
        }
    }
}
