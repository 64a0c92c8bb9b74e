//! Struct `CoTraining` runs the semi-supervised loop:
//! fit both recommenders, evaluate them, let each label the candidate
//! pairs it is most confident about, and feed those labels to the
//! peer's training matrix.

use std::ops::ControlFlow;
use std::path::PathBuf;
use std::str::FromStr;

use colored::Colorize;
use rand::prelude::*;

use crate::dataset::Dataset;
use crate::errors::{Error, Result};
use crate::evaluation::Evaluator;
use crate::recommender::{LabelThresholds, LabeledSample, Recommender};
use crate::results::{LabelComparison, ResultsWriter};
use crate::split::UnlabeledPool;
use super::checkpoint::Checkpoint;


/// Number of item-popularity bins in the optional histogram.
const N_POP_BINS: usize = 10;

const ITER_WIDTH: usize = 6;


/// Which direction pseudo-labels flow between the two recommenders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelingPolicy {
    /// Each recommender labels for its peer.
    #[default]
    Bidirectional,
    /// Only the first recommender labels; the second learns.
    FirstToSecond,
    /// Only the second recommender labels; the first learns.
    SecondToFirst,
}


impl FromStr for LabelingPolicy {
    type Err = Error;
    fn from_str(name: &str) -> Result<Self> {
        match name {
            "bidirectional" => Ok(Self::Bidirectional),
            "first_to_second" => Ok(Self::FirstToSecond),
            "second_to_first" => Ok(Self::SecondToFirst),
            _ => Err(Error::Configuration(
                format!("`{name}` is not a labeling policy")
            )),
        }
    }
}


/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every requested iteration ran.
    Completed,
    /// The unlabeled universe ran dry before the iteration budget.
    Exhausted,
    /// A recommender failed to refit mid-run.
    IterationFailed,
}


/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Iterations actually completed.
    pub iterations: usize,
    /// Why the loop ended.
    pub stop: StopReason,
    /// Labels the first recommender received in total.
    pub labels_first: usize,
    /// Labels the second recommender received in total.
    pub labels_second: usize,
}


/// The co-training driver.
///
/// ```no_run
/// use std::path::Path;
/// use cotrec::prelude::*;
///
/// fn run(train: &Dataset, test: &Dataset) -> cotrec::Result<()> {
///     let first = RecommenderConfig::parse("item_knn".parse()?, None)?;
///     let second = RecommenderConfig::parse("top_pop".parse()?, None)?;
///     let mut writer = ResultsWriter::new(
///         Path::new("results"), "evaluation.csv", 0, false,
///     )?;
///     let summary = CoTraining::new(
///         first.build(1234), second.build(1234), train, test,
///     )
///         .iterations(30)
///         .pool_size(75)
///         .run(&mut writer)?;
///     println!("{summary:?}");
///     Ok(())
/// }
/// ```
pub struct CoTraining<'a> {
    first: Box<dyn Recommender>,
    second: Box<dyn Recommender>,
    train: &'a Dataset,
    test: &'a Dataset,

    thresholds: LabelThresholds,
    policy: LabelingPolicy,
    n_iterations: usize,
    n_positives: usize,
    n_negatives: usize,
    pool_size: usize,
    rec_length: usize,
    seed: u64,
    verbose: bool,
    with_popularity_bins: bool,
    checkpoint_path: Option<PathBuf>,
    resume_from: Option<Checkpoint>,

    pool: Option<UnlabeledPool>,
    popularity: Vec<usize>,
    labels_first: Vec<LabeledSample>,
    labels_second: Vec<LabeledSample>,
}


impl<'a> CoTraining<'a> {
    /// Construct a driver over a fixed split with the defaults of
    /// 30 iterations, 1 positive and 3 negative labels per side, a
    /// 75-pair pool, lists of length 10, and explicit-rating
    /// thresholds.
    pub fn new(
        first: Box<dyn Recommender>,
        second: Box<dyn Recommender>,
        train: &'a Dataset,
        test: &'a Dataset,
    ) -> Self
    {
        Self {
            first,
            second,
            train,
            test,
            thresholds: LabelThresholds::explicit(),
            policy: LabelingPolicy::default(),
            n_iterations: 30,
            n_positives: 1,
            n_negatives: 3,
            pool_size: 75,
            rec_length: 10,
            seed: 1234,
            verbose: false,
            with_popularity_bins: false,
            checkpoint_path: None,
            resume_from: None,
            pool: None,
            popularity: Vec::new(),
            labels_first: Vec::new(),
            labels_second: Vec::new(),
        }
    }


    /// Set the iteration budget.
    pub fn iterations(mut self, n: usize) -> Self {
        self.n_iterations = n;
        self
    }


    /// Set how many positive labels each side may hand over per
    /// iteration.
    pub fn positives(mut self, p: usize) -> Self {
        self.n_positives = p;
        self
    }


    /// Set how many negative labels each side may hand over per
    /// iteration.
    pub fn negatives(mut self, n: usize) -> Self {
        self.n_negatives = n;
        self
    }


    /// Set the candidate batch capacity.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }


    /// Set the recommendation list length used for evaluation.
    pub fn rec_length(mut self, at: usize) -> Self {
        self.rec_length = at;
        self
    }


    /// Set the seed that drives pool sampling and SGD.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the label score bands.
    pub fn thresholds(mut self, thresholds: LabelThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }


    /// Set which direction labels flow.
    pub fn policy(mut self, policy: LabelingPolicy) -> Self {
        self.policy = policy;
        self
    }


    /// Print one progress line per iteration.
    pub fn verbose(mut self, flag: bool) -> Self {
        self.verbose = flag;
        self
    }


    /// Also record a popularity histogram of the labeled items.
    pub fn popularity_bins(mut self, flag: bool) -> Self {
        self.with_popularity_bins = flag;
        self
    }


    /// Snapshot the run state to `path` after every iteration.
    pub fn checkpoint_path(mut self, path: PathBuf) -> Self {
        self.checkpoint_path = Some(path);
        self
    }


    /// Continue a previous run from its snapshot instead of starting
    /// at iteration zero.
    pub fn resume(mut self, checkpoint: Checkpoint) -> Self {
        self.resume_from = Some(checkpoint);
        self
    }


    /// Fit both recommenders on the base split, build the pool, and
    /// replay the resume snapshot if one was given.
    fn preprocess(&mut self) -> Result<usize> {
        let train = self.train.to_matrix();
        let test = self.test.to_matrix();

        self.first.fit(&train)?;
        self.second.fit(&train)?;

        self.popularity = train.item_popularity();
        let mut pool = UnlabeledPool::new(&train, &test, self.pool_size)?;

        let start = match self.resume_from.take() {
            None => 0,
            Some(checkpoint) => {
                pool.restore_consumed(checkpoint.consumed);
                self.first.incorporate_labels(&checkpoint.labels_first)?;
                self.second.incorporate_labels(&checkpoint.labels_second)?;
                self.labels_first = checkpoint.labels_first;
                self.labels_second = checkpoint.labels_second;
                checkpoint.iteration
            }
        };

        self.pool = Some(pool);
        Ok(start)
    }


    fn evaluate_both(
        &self,
        iteration: usize,
        writer: &mut ResultsWriter,
    ) -> Result<()>
    {
        let evaluator = Evaluator::new(self.test)
            .at(self.rec_length)
            .relevance_threshold(self.thresholds.positive);

        for side in [self.first.as_ref(), self.second.as_ref()] {
            let metrics = evaluator.evaluate(side);
            writer.write_evaluation(
                iteration, self.rec_length, side.name(), &metrics,
            )?;
        }
        Ok(())
    }


    /// Histogram of the labeled items over `N_POP_BINS` equal-width
    /// popularity bins of the base training matrix.
    fn bin_by_popularity(&self, labels: &[LabeledSample]) -> Vec<usize> {
        let max = self.popularity.iter().copied().max().unwrap_or(0);
        let mut bins = vec![0_usize; N_POP_BINS];
        for label in labels {
            let pop = self.popularity.get(label.item as usize)
                .copied()
                .unwrap_or(0);
            let bin = (pop * N_POP_BINS / (max + 1)).min(N_POP_BINS - 1);
            bins[bin] += 1;
        }
        bins
    }


    fn record_labeling(
        &self,
        iteration: usize,
        name: &str,
        labels: &[LabeledSample],
        pool_len: usize,
        writer: &mut ResultsWriter,
    ) -> Result<()>
    {
        let midpoint = (self.thresholds.positive + self.thresholds.negative)
            / 2.0;
        let positives = labels.iter()
            .filter(|l| l.rating >= midpoint)
            .count();
        writer.write_labeling(
            iteration, name, positives, labels.len() - positives, pool_len,
        )?;
        if self.with_popularity_bins {
            writer.write_popularity_bins(
                iteration, name, &self.bin_by_popularity(labels),
            )?;
        }
        Ok(())
    }


    /// Run one iteration.
    /// Returns `Break` when the unlabeled universe is exhausted.
    fn step(
        &mut self,
        iteration: usize,
        writer: &mut ResultsWriter,
    ) -> Result<ControlFlow<StopReason>>
    {
        // A fresh stream per iteration keeps a resumed run on the
        // exact draws of the uninterrupted one.
        let mut rng = StdRng::seed_from_u64(
            self.seed.wrapping_add(iteration as u64 + 1)
        );
        let pool = self.pool.as_mut()
            .ok_or_else(|| Error::Configuration(
                String::from("the driver was stepped before preprocess")
            ))?;
        if pool.refill(&mut rng) == 0 {
            return Ok(ControlFlow::Break(StopReason::Exhausted));
        }

        self.evaluate_both(iteration, writer)?;

        let pool = self.pool.as_ref().expect("the pool was built above");
        let candidates = pool.candidates().to_vec();
        let produce_first = self.policy != LabelingPolicy::SecondToFirst;
        let produce_second = self.policy != LabelingPolicy::FirstToSecond;

        let by_first = if produce_first {
            self.first.label(
                &candidates,
                self.n_positives,
                self.n_negatives,
                &self.thresholds,
            )
        } else {
            Vec::new()
        };
        let by_second = if produce_second {
            self.second.label(
                &candidates,
                self.n_positives,
                self.n_negatives,
                &self.thresholds,
            )
        } else {
            Vec::new()
        };

        let pool_len = pool.len();
        self.record_labeling(
            iteration, self.first.name(), &by_first, pool_len, writer,
        )?;
        self.record_labeling(
            iteration, self.second.name(), &by_second, pool_len, writer,
        )?;
        let midpoint = (self.thresholds.positive + self.thresholds.negative)
            / 2.0;
        writer.write_label_comparison(
            iteration,
            &LabelComparison::compare(&by_first, &by_second, midpoint),
        )?;

        // Each side learns from the labels of its peer.
        self.second.incorporate_labels(&by_first)?;
        self.first.incorporate_labels(&by_second)?;
        self.labels_second.extend_from_slice(&by_first);
        self.labels_first.extend_from_slice(&by_second);

        let pool = self.pool.as_mut().expect("the pool was built above");
        pool.remove(&by_first);
        pool.remove(&by_second);

        if self.verbose {
            let tag = format!("[COTRAIN {:>ITER_WIDTH$}]", iteration)
                .bold()
                .green();
            println!(
                "{tag} {} labeled {:>2}, {} labeled {:>2}, pool {}",
                self.first.name(),
                by_first.len(),
                self.second.name(),
                by_second.len(),
                pool.len(),
            );
        }

        if let Some(path) = &self.checkpoint_path {
            Checkpoint {
                iteration: iteration + 1,
                labels_first: self.labels_first.clone(),
                labels_second: self.labels_second.clone(),
                consumed: pool.consumed(),
            }
            .save(path)?;
        }

        Ok(ControlFlow::Continue(()))
    }


    /// Run the loop to completion, writing one row per recommender per
    /// iteration through `writer`.
    pub fn run(mut self, writer: &mut ResultsWriter) -> Result<RunSummary> {
        let start = self.preprocess()?;
        if start > self.n_iterations {
            return Err(Error::Configuration(format!(
                "cannot resume at iteration {start} \
                 with a budget of {} iterations",
                self.n_iterations,
            )));
        }

        let mut stop = StopReason::Completed;
        let mut completed = start;
        for iteration in start..self.n_iterations {
            match self.step(iteration, writer) {
                Ok(ControlFlow::Continue(())) => completed = iteration + 1,
                Ok(ControlFlow::Break(reason)) => {
                    stop = reason;
                    break;
                }
                Err(Error::AdapterFit { name, reason }) => {
                    eprintln!(
                        "{} {name}: {reason}",
                        "[COTRAIN FAILED]".bold().red(),
                    );
                    stop = StopReason::IterationFailed;
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        if stop == StopReason::Completed {
            // Final scores after the last cross-feed.
            self.evaluate_both(completed, writer)?;
        }
        writer.flush()?;

        Ok(RunSummary {
            iterations: completed,
            stop,
            labels_first: self.labels_first.len(),
            labels_second: self.labels_second.len(),
        })
    }
}
