//! Reproducible train/test partitioning of a [`DataSet`].

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::{IngestionError, IngestionResult};
use crate::types::DataSet;

/// Seed of the split permutation.
///
/// Repeated runs over identical input produce identical partitions; changing this value changes
/// every split produced by the pipeline.
pub const SPLIT_SEED: u64 = 42;

/// Result of [`train_test_split`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: DataSet,
    pub test: DataSet,
}

/// Partition `dataset` into train and test subsets using [`SPLIT_SEED`].
///
/// `test_ratio` is the fraction of rows routed to the test subset.
pub fn train_test_split(dataset: &DataSet, test_ratio: f64) -> IngestionResult<TrainTestSplit> {
    split_with_seed(dataset, test_ratio, SPLIT_SEED)
}

/// Partition `dataset` with an explicit permutation seed.
///
/// - `test_count = round(test_ratio * total)` (halves round away from zero),
///   `train_count = total - test_count`.
/// - Row indices are shuffled with a seeded [`StdRng`]; the first `test_count` permuted rows form
///   the test subset and the rest the train subset, both in permuted order.
///
/// Fails with `InvalidConfiguration` if `test_ratio` is not strictly between 0 and 1, or if the
/// dataset cannot form two non-empty subsets at this ratio.
pub fn split_with_seed(dataset: &DataSet, test_ratio: f64, seed: u64) -> IngestionResult<TrainTestSplit> {
    let (train_count, test_count) = split_counts(dataset.row_count(), test_ratio)?;

    let mut indices: Vec<usize> = (0..dataset.row_count()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(test_count);
    debug_assert_eq!(train_idx.len(), train_count);

    Ok(TrainTestSplit {
        train: dataset.select_rows(train_idx),
        test: dataset.select_rows(test_idx),
    })
}

/// `(train_count, test_count)` for `total` rows at `test_ratio`.
pub fn split_counts(total: usize, test_ratio: f64) -> IngestionResult<(usize, usize)> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(IngestionError::invalid_configuration(format!(
            "train/test split ratio must be strictly between 0 and 1, got {test_ratio}"
        )));
    }
    if total < 2 {
        return Err(IngestionError::invalid_configuration(format!(
            "cannot split {total} record(s) into two non-empty subsets"
        )));
    }

    let test_count = (test_ratio * total as f64).round() as usize;
    if test_count == 0 || test_count == total {
        return Err(IngestionError::invalid_configuration(format!(
            "split ratio {test_ratio} over {total} records leaves an empty subset (test_count={test_count})"
        )));
    }
    Ok((total - test_count, test_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{DataType, Field, Schema, Value};

    fn dataset_of_n(n: usize) -> DataSet {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
        let rows = (0..n as i64).map(|i| vec![Value::Int64(i)]).collect();
        DataSet::new(schema, rows)
    }

    fn ids(ds: &DataSet) -> Vec<i64> {
        ds.rows
            .iter()
            .map(|r| match r[0] {
                Value::Int64(v) => v,
                _ => panic!("unexpected value"),
            })
            .collect()
    }

    #[test]
    fn counts_follow_rounded_ratio() {
        assert_eq!(split_counts(10, 0.2).unwrap(), (8, 2));
        assert_eq!(split_counts(10, 0.25).unwrap(), (7, 3));
        assert_eq!(split_counts(7, 0.3).unwrap(), (5, 2));
        for total in 2..60 {
            for ratio in [0.1, 0.2, 0.33, 0.5, 0.75, 0.9] {
                if let Ok((train, test)) = split_counts(total, ratio) {
                    assert_eq!(train + test, total);
                    assert_eq!(test, (ratio * total as f64).round() as usize);
                }
            }
        }
    }

    #[test]
    fn ratio_out_of_range_is_invalid_configuration() {
        let ds = dataset_of_n(10);
        for ratio in [0.0, 1.0, 1.5, -0.1, f64::NAN] {
            let err = train_test_split(&ds, ratio).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfiguration, "ratio={ratio}");
        }
    }

    #[test]
    fn too_few_records_is_invalid_configuration() {
        assert_eq!(
            train_test_split(&dataset_of_n(1), 0.2).unwrap_err().kind(),
            ErrorKind::InvalidConfiguration
        );
        assert_eq!(
            train_test_split(&dataset_of_n(0), 0.2).unwrap_err().kind(),
            ErrorKind::InvalidConfiguration
        );
        // round(0.2 * 2) == 0 leaves the test subset empty.
        assert!(train_test_split(&dataset_of_n(2), 0.2).is_err());
        assert!(train_test_split(&dataset_of_n(2), 0.5).is_ok());
    }

    #[test]
    fn split_is_reproducible_and_disjoint() {
        let ds = dataset_of_n(100);
        let a = train_test_split(&ds, 0.2).unwrap();
        let b = train_test_split(&ds, 0.2).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.train.row_count(), 80);
        assert_eq!(a.test.row_count(), 20);

        let mut all: Vec<i64> = ids(&a.train).into_iter().chain(ids(&a.test)).collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn different_seed_changes_partition() {
        let ds = dataset_of_n(100);
        let a = split_with_seed(&ds, 0.2, SPLIT_SEED).unwrap();
        let b = split_with_seed(&ds, 0.2, SPLIT_SEED + 1).unwrap();
        assert_ne!(ids(&a.test), ids(&b.test));
    }
}
