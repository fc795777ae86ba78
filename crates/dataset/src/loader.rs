//! Splits and batched loading.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use crate::dataset::CycloneDataset;
use crate::error::{DatasetError, DatasetResult};
use crate::sample::Sample;

/// Sizes of the train, validation and test subsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLengths {
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

impl SplitLengths {
    pub fn as_array(&self) -> [usize; 3] {
        [self.train, self.validation, self.test]
    }
}

/// Subset sizes for `len` rows.
///
/// Without a test split the training set gets `floor(len * (1 - val))` rows
/// and validation the rest. With one, test and validation are floored and
/// training takes what remains.
pub fn split_lengths(len: usize, validation: f64, test: f64) -> DatasetResult<SplitLengths> {
    let in_unit = |f: f64| (0.0..1.0).contains(&f);
    if !in_unit(validation) || !in_unit(test) || validation + test >= 1.0 {
        return Err(DatasetError::invalid_split(format!(
            "validation {} and test {} must be in [0, 1) and sum below 1",
            validation, test
        )));
    }

    if test == 0.0 {
        let train = (len as f64 * (1.0 - validation)).floor() as usize;
        return Ok(SplitLengths {
            train,
            validation: len - train,
            test: 0,
        });
    }

    let test = (len as f64 * test).floor() as usize;
    let validation = (len as f64 * validation).floor() as usize;
    Ok(SplitLengths {
        train: len - test - validation,
        validation,
        test,
    })
}

/// Randomly partition `0..len` into subsets of the given sizes.
pub fn random_split<R: Rng + ?Sized>(
    len: usize,
    lengths: &[usize],
    rng: &mut R,
) -> DatasetResult<Vec<Vec<usize>>> {
    let total: usize = lengths.iter().sum();
    if total != len {
        return Err(DatasetError::invalid_split(format!(
            "lengths sum to {} but the dataset has {} rows",
            total, len
        )));
    }

    let mut indices: Vec<usize> = (0..len).collect();
    indices.shuffle(rng);

    let mut rest = indices.as_slice();
    let mut subsets = Vec::with_capacity(lengths.len());
    for &n in lengths {
        let (head, tail) = rest.split_at(n);
        subsets.push(head.to_vec());
        rest = tail;
    }
    Ok(subsets)
}

/// Samples prepared together.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub samples: Vec<Sample>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Iterates a subset of a dataset in batches, one epoch at a time.
///
/// Each sample draws its window from its own RNG seeded by the loader seed,
/// the epoch and the row index, so results do not depend on thread
/// scheduling.
#[derive(Debug)]
pub struct DataLoader<'a> {
    dataset: &'a CycloneDataset,
    indices: Vec<usize>,
    batch_size: usize,
    shuffle: bool,
    seed: u64,
    epoch: u64,
}

impl<'a> DataLoader<'a> {
    pub fn new(
        dataset: &'a CycloneDataset,
        indices: Vec<usize>,
        batch_size: usize,
    ) -> DatasetResult<Self> {
        if batch_size == 0 {
            return Err(DatasetError::config("batch size must be at least 1"));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= dataset.len()) {
            return Err(DatasetError::IndexOutOfRange {
                index: bad,
                len: dataset.len(),
            });
        }
        Ok(Self {
            dataset,
            indices,
            batch_size,
            shuffle: false,
            seed: 0,
            epoch: 0,
        })
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Rows in this loader's subset.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Upper bound on the batches per epoch; skipped rows can only lower it.
    pub fn num_batches(&self) -> usize {
        (self.indices.len() + self.batch_size - 1) / self.batch_size
    }

    /// Start the next epoch.
    pub fn epoch(&mut self) -> Epoch<'_, 'a> {
        let epoch = self.epoch;
        self.epoch += 1;

        let mut order = self.indices.clone();
        if self.shuffle {
            let mut rng = StdRng::seed_from_u64(mix(self.seed, epoch, u64::MAX));
            order.shuffle(&mut rng);
        }

        Epoch {
            loader: self,
            order,
            epoch,
            position: 0,
        }
    }

    fn prepare(&self, rows: &[usize], epoch: u64) -> DatasetResult<Batch> {
        let prepared = rows
            .par_iter()
            .map(|&index| {
                let mut rng = StdRng::seed_from_u64(mix(self.seed, epoch, index as u64));
                self.dataset.get(index, &mut rng)
            })
            .collect::<DatasetResult<Vec<Option<Sample>>>>()?;

        let samples: Vec<Sample> = prepared.into_iter().flatten().collect();
        if samples.len() < rows.len() {
            debug!(
                requested = rows.len(),
                kept = samples.len(),
                "Dropped skipped rows from batch"
            );
        }
        Ok(Batch { samples })
    }
}

/// One pass over a loader's subset. Batches whose rows were all skipped are
/// not yielded.
pub struct Epoch<'l, 'a> {
    loader: &'l DataLoader<'a>,
    order: Vec<usize>,
    epoch: u64,
    position: usize,
}

impl Iterator for Epoch<'_, '_> {
    type Item = DatasetResult<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.order.len() {
            let end = (self.position + self.loader.batch_size).min(self.order.len());
            let rows = &self.order[self.position..end];
            self.position = end;

            match self.loader.prepare(rows, self.epoch) {
                Ok(batch) if batch.is_empty() => continue,
                other => return Some(other),
            }
        }
        None
    }
}

/// Derive a per-sample seed (splitmix64 finalizer over the inputs).
fn mix(seed: u64, epoch: u64, index: u64) -> u64 {
    let mut z = seed
        .wrapping_add(epoch.wrapping_mul(0x9E37_79B9_7F4A_7C15))
        .wrapping_add(index.wrapping_mul(0xD1B5_4A32_D192_ED03));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lengths_without_test() {
        let s = split_lengths(10, 0.2, 0.0).unwrap();
        assert_eq!(s.as_array(), [8, 2, 0]);

        let s = split_lengths(7, 0.2, 0.0).unwrap();
        // floor(7 * 0.8) = 5
        assert_eq!(s.as_array(), [5, 2, 0]);
    }

    #[test]
    fn test_split_lengths_with_test() {
        let s = split_lengths(10, 0.2, 0.1).unwrap();
        assert_eq!(s.as_array(), [7, 2, 1]);

        let s = split_lengths(9, 0.2, 0.1).unwrap();
        assert_eq!(s.as_array(), [8, 1, 0]);
    }

    #[test]
    fn test_split_lengths_rejects_bad_fractions() {
        assert!(split_lengths(10, 1.0, 0.0).is_err());
        assert!(split_lengths(10, 0.6, 0.5).is_err());
        assert!(split_lengths(10, -0.1, 0.0).is_err());
    }

    #[test]
    fn test_random_split_partitions() {
        let mut rng = StdRng::seed_from_u64(11);
        let subsets = random_split(10, &[6, 3, 1], &mut rng).unwrap();
        assert_eq!(subsets.iter().map(Vec::len).collect::<Vec<_>>(), vec![6, 3, 1]);

        let mut all: Vec<usize> = subsets.concat();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_split_length_mismatch() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            random_split(5, &[2, 2], &mut rng),
            Err(DatasetError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_mix_varies_with_each_input() {
        let base = mix(1, 2, 3);
        assert_ne!(base, mix(0, 2, 3));
        assert_ne!(base, mix(1, 1, 3));
        assert_ne!(base, mix(1, 2, 4));
        assert_eq!(base, mix(1, 2, 3));
    }
}
