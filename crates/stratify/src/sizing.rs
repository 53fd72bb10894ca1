//! Pure arithmetic from (split kind, rates, partition size) to a row window.

use crate::types::{ClassPartition, SplitKind, Window};

/// Computes the LIMIT/OFFSET window for one partition of the requested
/// split.
///
/// Training samples carve the training split into contiguous equal-size
/// windows of `⌊training_size·sample_rate⌋` rows; `sample_number` picks
/// the window. Out-of-range windows are not rejected; they simply
/// select fewer or zero rows, like a slice.
pub fn split_window(
    kind: SplitKind,
    partition: &ClassPartition,
    sample_rate: f64,
    sample_number: u64,
) -> Window {
    match kind {
        SplitKind::Training => Window {
            limit: partition.training_size,
            offset: 0,
        },
        SplitKind::Fusion => Window {
            limit: partition.fusion_size,
            offset: partition.training_size,
        },
        SplitKind::Test => Window {
            limit: partition.test_size,
            offset: partition.training_size + partition.fusion_size,
        },
        SplitKind::TrainingSample => {
            let limit = (partition.training_size as f64 * sample_rate) as u64;
            // Saturate: a huge sample_number must degrade to an empty
            // window, not overflow.
            Window {
                limit,
                offset: limit.saturating_mul(sample_number),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(size: u64, training_rate: f64, fusion_rate: f64) -> ClassPartition {
        ClassPartition::new("0".to_string(), size, training_rate, fusion_rate)
    }

    #[test]
    fn test_worked_example_500_rows_per_class() {
        let p = partition(500, 0.5, 0.3);
        assert_eq!(
            split_window(SplitKind::Training, &p, 0.0, 0),
            Window { limit: 250, offset: 0 }
        );
        assert_eq!(
            split_window(SplitKind::Fusion, &p, 0.0, 0),
            Window { limit: 150, offset: 250 }
        );
        assert_eq!(
            split_window(SplitKind::Test, &p, 0.0, 0),
            Window { limit: 100, offset: 400 }
        );
    }

    #[test]
    fn test_sizes_cover_partition_for_any_rates() {
        for size in [0u64, 1, 7, 500, 999] {
            for (tr, fr) in [(0.0, 0.0), (0.5, 0.3), (0.7, 0.3), (1.0, 0.0), (0.33, 0.33)] {
                let p = partition(size, tr, fr);
                assert_eq!(
                    p.training_size + p.fusion_size + p.test_size,
                    p.partition_size,
                    "size={size} tr={tr} fr={fr}"
                );
            }
        }
    }

    #[test]
    fn test_test_split_absorbs_remainder() {
        // 7 * 0.5 truncates to 3, 7 * 0.3 truncates to 2, test picks up 2.
        let p = partition(7, 0.5, 0.3);
        assert_eq!(p.training_size, 3);
        assert_eq!(p.fusion_size, 2);
        assert_eq!(p.test_size, 2);
    }

    #[test]
    fn test_training_sample_windows_tile_the_training_split() {
        let p = partition(1000, 0.5, 0.0);
        let w0 = split_window(SplitKind::TrainingSample, &p, 0.2, 0);
        let w1 = split_window(SplitKind::TrainingSample, &p, 0.2, 1);
        let w2 = split_window(SplitKind::TrainingSample, &p, 0.2, 2);
        assert_eq!(w0, Window { limit: 100, offset: 0 });
        assert_eq!(w1, Window { limit: 100, offset: 100 });
        assert_eq!(w2, Window { limit: 100, offset: 200 });
    }

    #[test]
    fn test_huge_sample_number_saturates_instead_of_overflowing() {
        let p = partition(1000, 0.5, 0.0);
        let w = split_window(SplitKind::TrainingSample, &p, 0.5, u64::MAX);
        assert_eq!(w.limit, 250);
        assert_eq!(w.offset, u64::MAX);
    }

    #[test]
    fn test_out_of_range_sample_window_is_not_an_error() {
        let p = partition(100, 0.5, 0.0);
        // sample_rate 0.5 over 50 training rows: window 3 starts at 75,
        // past the training split's extent. Slice semantics apply.
        let w = split_window(SplitKind::TrainingSample, &p, 0.5, 3);
        assert_eq!(w, Window { limit: 25, offset: 75 });
    }
}
