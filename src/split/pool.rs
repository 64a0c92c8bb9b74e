use std::collections::HashSet;

use rand::prelude::*;

use crate::dataset::RatingMatrix;
use crate::errors::{Error, Result};
use crate::recommender::LabeledSample;


/// The pool of unlabeled user/item pairs the co-training driver draws
/// pseudo-label candidates from.
///
/// A candidate is any pair that carries no rating in the training *or*
/// the test set and was never labeled before, so test interactions can
/// never leak into the training signal. Every iteration the driver
/// refills a fresh batch of at most `capacity` candidates; pairs that
/// get labeled are consumed permanently and never drawn again.
#[derive(Debug)]
pub struct UnlabeledPool {
    n_users: usize,
    n_items: usize,
    capacity: usize,
    rated: HashSet<(u32, u32)>,
    consumed: HashSet<(u32, u32)>,
    candidates: Vec<(u32, u32)>,
}


impl UnlabeledPool {
    /// Construct the pool over the unrated pairs of the given split.
    /// Fails with a configuration error when `capacity` exceeds the
    /// number of unrated pairs.
    pub fn new(
        train: &RatingMatrix,
        test: &RatingMatrix,
        capacity: usize,
    ) -> Result<Self>
    {
        let (n_users, n_items) = train.shape();

        let mut rated = HashSet::with_capacity(train.nnz() + test.nnz());
        rated.extend(train.iter().map(|r| (r.user, r.item)));
        rated.extend(test.iter().map(|r| (r.user, r.item)));

        let total = n_users * n_items;
        let unrated = total - rated.len();
        if capacity > unrated {
            return Err(Error::Configuration(format!(
                "number_unlabeled = {capacity} exceeds \
                 the {unrated} unrated user/item pairs"
            )));
        }

        Ok(Self {
            n_users,
            n_items,
            capacity,
            rated,
            consumed: HashSet::new(),
            candidates: Vec::with_capacity(capacity),
        })
    }


    /// Draw a fresh candidate batch by rejection sampling, replacing
    /// the previous one. Returns the number of candidates drawn; zero
    /// means the pool is exhausted.
    ///
    /// Candidates are sorted by (user, item) so downstream tie-breaks
    /// stay deterministic.
    pub fn refill(&mut self, rng: &mut StdRng) -> usize {
        self.candidates.clear();

        let total = self.n_users * self.n_items;
        let drawable = total - self.rated.len() - self.consumed.len();
        if drawable == 0 || self.n_users == 0 || self.n_items == 0 {
            return 0;
        }

        let want = self.capacity.min(drawable);
        // Rejection sampling stalls once nearly everything is blocked;
        // the attempt bound turns that stall into exhaustion.
        let max_attempts = 100 * self.capacity + 1_000;
        let mut batch = HashSet::with_capacity(want);
        let mut attempts = 0_usize;

        while batch.len() < want && attempts < max_attempts {
            attempts += 1;
            let user = rng.gen_range(0..self.n_users) as u32;
            let item = rng.gen_range(0..self.n_items) as u32;
            let pair = (user, item);
            if self.rated.contains(&pair) || self.consumed.contains(&pair) {
                continue;
            }
            batch.insert(pair);
        }

        self.candidates = batch.into_iter().collect();
        self.candidates.sort_unstable();
        self.candidates.len()
    }


    /// The current candidate batch, sorted by (user, item).
    pub fn candidates(&self) -> &[(u32, u32)] {
        &self.candidates[..]
    }


    /// Number of candidates in the current batch.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }


    /// `true` when the current batch is empty.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }


    /// Consume labeled pairs: they leave the current batch and are
    /// never drawn again.
    pub fn remove(&mut self, labels: &[LabeledSample]) {
        for label in labels {
            self.consumed.insert((label.user, label.item));
        }
        self.candidates.retain(|pair| !self.consumed.contains(pair));
    }


    /// Pairs consumed so far, sorted by (user, item).
    pub fn consumed(&self) -> Vec<(u32, u32)> {
        let mut pairs = self.consumed.iter()
            .copied()
            .collect::<Vec<_>>();
        pairs.sort_unstable();
        pairs
    }


    /// Mark pairs as already consumed when resuming from a checkpoint.
    pub fn restore_consumed<I>(&mut self, pairs: I)
        where I: IntoIterator<Item = (u32, u32)>,
    {
        self.consumed.extend(pairs);
    }
}
