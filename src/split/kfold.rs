use rand::prelude::*;
use colored::Colorize;

use crate::dataset::Dataset;
use crate::errors::{Error, Result};

const WIDTH: usize = 9;

/// A struct that generates train/test dataset pairs for k-fold
/// cross-validation. Each fold acts once as the test set; the test
/// folds are pairwise disjoint and together cover the dataset.
///
/// # Example
/// ```no_run
/// use cotrec::KFold;
/// # let dataset = cotrec::Dataset::from_interactions(vec![]);
///
/// let folds = KFold::new(&dataset)
///     .n_folds(5)?
///     .seed(777)
///     .verbose(true)
///     .shuffle();
/// for (train, test) in folds {
///     // one independent run per fold
/// }
/// # Ok::<(), cotrec::Error>(())
/// ```
pub struct KFold<'a> {
    current_fold: usize,
    n_folds: usize,
    seed: u64,
    dataset: &'a Dataset,
    ix: Vec<usize>,
    verbose: bool,
}


impl<'a> KFold<'a> {
    /// Construct a new instance of `KFold`.
    #[inline]
    pub fn new(dataset: &'a Dataset) -> Self {
        let ix = (0..dataset.len()).collect::<Vec<_>>();
        Self {
            current_fold: 0,
            n_folds: 5,
            seed: 1234,
            verbose: false,
            dataset,
            ix,
        }
    }


    /// Set the number of folds. Default value is `5`.
    /// Fails with a configuration error when the fold count is below
    /// two or exceeds the number of interactions.
    #[inline]
    pub fn n_folds(mut self, n_folds: usize) -> Result<Self> {
        if n_folds < 2 {
            return Err(Error::Configuration(format!(
                "k_fold must be at least 2, got {n_folds}"
            )));
        }
        if n_folds > self.dataset.len() {
            return Err(Error::Configuration(format!(
                "k_fold = {n_folds} exceeds the {} available interactions",
                self.dataset.len(),
            )));
        }
        self.n_folds = n_folds;
        Ok(self)
    }


    /// Set the seed of the randomness for shuffling.
    /// Default value is `1234`.
    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the verbose parameter.
    /// If `true`, `KFold` prints a line per generated fold.
    /// Default value is `false`.
    #[inline]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Shuffle the interaction indices.
    /// By default, `KFold` does not shuffle them.
    #[inline]
    pub fn shuffle(mut self) -> Self {
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.ix.shuffle(&mut rng);
        self
    }


    /// Returns the training/test datasets for the `i`-th fold.
    /// The first `len % k` folds absorb the remainder,
    /// so every interaction appears in exactly one test fold.
    #[inline]
    fn fold_at(&self, i: usize) -> (Dataset, Dataset) {
        let n = self.ix.len();
        let base = n / self.n_folds;
        let rem = n % self.n_folds;

        let start = i * base + i.min(rem);
        let end = start + base + usize::from(i < rem);

        let test = &self.ix[start..end];
        let train = self.ix[..start].iter()
            .chain(self.ix[end..].iter())
            .copied()
            .collect::<Vec<_>>();

        (self.dataset.subset(&train), self.dataset.subset(test))
    }
}


impl<'a> Iterator for KFold<'a> {
    type Item = (Dataset, Dataset);
    fn next(&mut self) -> Option<Self::Item> {
        if self.current_fold >= self.n_folds { return None; }

        let output = self.fold_at(self.current_fold);
        self.current_fold += 1;

        if self.verbose {
            let train_size = output.0.len();
            let test_size = output.1.len();
            println!(
                "{}    {}    {}",
                format!("  [{: >3}'th fold]", self.current_fold).bold().red(),
                format!("[TRAIN {:>WIDTH$}]", train_size).bold().green(),
                format!("[TEST {:>WIDTH$}]", test_size).bold().yellow(),
            );
        }

        Some(output)
    }
}
