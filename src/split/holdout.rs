use rand::prelude::*;

use crate::dataset::Dataset;
use crate::errors::{Error, Result};


/// A builder that partitions a [`Dataset`] into a training and a
/// held-out test set with leave-fraction-per-user semantics: each
/// user's interactions are shuffled and the first
/// `round(train_fraction * n)` of them (never fewer than
/// `min_train_per_user`) stay in training.
///
/// Users with a single interaction keep it in training and contribute
/// no test rows, so every evaluated user has a profile to rank from.
///
/// # Example
/// ```no_run
/// use cotrec::HoldoutSplit;
/// # let dataset = cotrec::Dataset::from_interactions(vec![]);
///
/// let (train, test) = HoldoutSplit::new(&dataset)
///     .train_fraction(0.8)?
///     .seed(1234)
///     .split();
/// # Ok::<(), cotrec::Error>(())
/// ```
pub struct HoldoutSplit<'a> {
    dataset: &'a Dataset,
    train_fraction: f64,
    min_train_per_user: usize,
    seed: u64,
}


impl<'a> HoldoutSplit<'a> {
    /// Construct a new instance of `HoldoutSplit`.
    /// By default the train fraction is `0.8`, the per-user floor is
    /// one interaction, and the seed is `1234`.
    #[inline]
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            train_fraction: 0.8,
            min_train_per_user: 1,
            seed: 1234,
        }
    }


    /// Set the fraction of each user's interactions kept for training.
    /// Fails with a configuration error unless the value
    /// lies strictly between zero and one.
    #[inline]
    pub fn train_fraction(mut self, fraction: f64) -> Result<Self> {
        if !(0.0 < fraction && fraction < 1.0) {
            return Err(Error::Configuration(format!(
                "holdout_perc must lie in (0, 1), got {fraction}"
            )));
        }
        self.train_fraction = fraction;
        Ok(self)
    }


    /// Set the minimal number of interactions every user keeps in
    /// training. Default value is `1`.
    #[inline]
    pub fn min_train_per_user(mut self, floor: usize) -> Self {
        self.min_train_per_user = floor.max(1);
        self
    }


    /// Set the seed of the randomness for shuffling.
    /// Default value is `1234`.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Partition the dataset.
    /// Every interaction lands in exactly one of the two returned
    /// datasets, and the assignment is deterministic under a fixed
    /// seed. This method consumes `self`.
    pub fn split(self) -> (Dataset, Dataset) {
        let n_users = self.dataset.n_users();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut by_user = vec![Vec::new(); n_users];
        for (ix, r) in self.dataset.interactions().iter().enumerate() {
            by_user[r.user as usize].push(ix);
        }

        let mut train_ix = Vec::new();
        let mut test_ix = Vec::new();

        // Users are visited in ascending order so the RNG stream,
        // and thus the partition, is reproducible.
        for indices in by_user.iter_mut() {
            if indices.is_empty() { continue; }

            indices.shuffle(&mut rng);

            let n = indices.len();
            let n_train = ((self.train_fraction * n as f64).round() as usize)
                .max(self.min_train_per_user)
                .min(n);

            train_ix.extend_from_slice(&indices[..n_train]);
            test_ix.extend_from_slice(&indices[n_train..]);
        }

        (self.dataset.subset(&train_ix), self.dataset.subset(&test_ix))
    }
}
