//! Struct `ResultsWriter` appends one CSV row per event to the files
//! under the results directory.
//!
//! Files are opened in append mode and the header is only written when
//! a file is empty, so a recovered run continues the same files.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::errors::Result;
use crate::evaluation::MetricSet;
use crate::recommender::LabeledSample;


/// Header of the evaluation file.
pub const EVALUATION_HEADER: &str =
    "cotraining,iteration,at,recommender,\
     rmse,roc_auc,precision,recall,map,mrr,ndcg\n";

/// Name of the per-iteration label count file.
pub const NUMBER_LABELED_FILE: &str = "numberlabeled.csv";
/// Header of the per-iteration label count file.
pub const NUMBER_LABELED_HEADER: &str =
    "cotraining,iteration,recommender,positives,negatives,pool\n";

/// Name of the label agreement file.
pub const LABEL_COMPARISON_FILE: &str = "label_comparison.csv";
/// Header of the label agreement file.
pub const LABEL_COMPARISON_HEADER: &str =
    "cotraining,iteration,both_positive,both_negative,\
     conflicting,only_first,only_second\n";

/// Name of the labeled-item popularity histogram file.
pub const POPULARITY_BINS_FILE: &str = "popularity_bins.csv";
/// Header of the labeled-item popularity histogram file.
pub const POPULARITY_BINS_HEADER: &str =
    "cotraining,iteration,recommender,bin,count\n";


/// How the two recommenders' label sets of one iteration relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelComparison {
    /// Pairs both sides labeled positive.
    pub both_positive: usize,
    /// Pairs both sides labeled negative.
    pub both_negative: usize,
    /// Pairs labeled with opposite signs.
    pub conflicting: usize,
    /// Pairs only the first recommender labeled.
    pub only_first: usize,
    /// Pairs only the second recommender labeled.
    pub only_second: usize,
}


impl LabelComparison {
    /// Compare the two label sets of one iteration. A label counts as
    /// positive when its rating is at or above `midpoint`.
    pub fn compare(
        first: &[LabeledSample],
        second: &[LabeledSample],
        midpoint: f64,
    ) -> Self
    {
        let firsts = first.iter()
            .map(|l| ((l.user, l.item), l.rating >= midpoint))
            .collect::<HashMap<_, _>>();

        let mut comparison = Self::default();
        for label in second {
            let positive = label.rating >= midpoint;
            match firsts.get(&(label.user, label.item)) {
                Some(&peer) if peer == positive => {
                    if positive {
                        comparison.both_positive += 1;
                    } else {
                        comparison.both_negative += 1;
                    }
                }
                Some(_) => comparison.conflicting += 1,
                None => comparison.only_second += 1,
            }
        }
        let shared = comparison.both_positive
            + comparison.both_negative
            + comparison.conflicting;
        comparison.only_first = first.len() - shared;
        comparison
    }
}


fn open_with_header(path: &Path, header: &str) -> Result<File> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    if file.metadata()?.len() == 0 {
        file.write_all(header.as_bytes())?;
    }
    Ok(file)
}


/// Appends evaluation, label count, label agreement, and optional
/// popularity histogram rows under one results directory.
pub struct ResultsWriter {
    run: usize,
    evaluation: File,
    number_labeled: File,
    label_comparison: File,
    popularity_bins: Option<File>,
}


impl ResultsWriter {
    /// Open (or continue) the results files under `dir`, writing
    /// evaluation rows to `evaluation_file`. `run` fills the
    /// `cotraining` column and distinguishes folds of one experiment.
    pub fn new(
        dir: &Path,
        evaluation_file: &str,
        run: usize,
        with_popularity_bins: bool,
    ) -> Result<Self>
    {
        fs::create_dir_all(dir)?;
        let popularity_bins = if with_popularity_bins {
            let path = dir.join(POPULARITY_BINS_FILE);
            Some(open_with_header(&path, POPULARITY_BINS_HEADER)?)
        } else {
            None
        };

        Ok(Self {
            run,
            evaluation: open_with_header(
                &dir.join(evaluation_file), EVALUATION_HEADER,
            )?,
            number_labeled: open_with_header(
                &dir.join(NUMBER_LABELED_FILE), NUMBER_LABELED_HEADER,
            )?,
            label_comparison: open_with_header(
                &dir.join(LABEL_COMPARISON_FILE), LABEL_COMPARISON_HEADER,
            )?,
            popularity_bins,
        })
    }


    /// Append one metric row for a recommender at an iteration.
    pub fn write_evaluation(
        &mut self,
        iteration: usize,
        at: usize,
        recommender: &str,
        metrics: &MetricSet,
    ) -> Result<()>
    {
        writeln!(
            self.evaluation,
            "{},{},{},{},{},{},{},{},{},{},{}",
            self.run,
            iteration,
            at,
            recommender,
            metrics.rmse,
            metrics.roc_auc,
            metrics.precision,
            metrics.recall,
            metrics.map,
            metrics.mrr,
            metrics.ndcg,
        )?;
        Ok(())
    }


    /// Append how many labels a recommender produced this iteration
    /// and how many candidates the pool still holds.
    pub fn write_labeling(
        &mut self,
        iteration: usize,
        recommender: &str,
        positives: usize,
        negatives: usize,
        pool: usize,
    ) -> Result<()>
    {
        writeln!(
            self.number_labeled,
            "{},{},{},{},{},{}",
            self.run, iteration, recommender, positives, negatives, pool,
        )?;
        Ok(())
    }


    /// Append the label agreement row of one iteration.
    pub fn write_label_comparison(
        &mut self,
        iteration: usize,
        comparison: &LabelComparison,
    ) -> Result<()>
    {
        writeln!(
            self.label_comparison,
            "{},{},{},{},{},{},{}",
            self.run,
            iteration,
            comparison.both_positive,
            comparison.both_negative,
            comparison.conflicting,
            comparison.only_first,
            comparison.only_second,
        )?;
        Ok(())
    }


    /// Append one row per popularity bin with the number of items a
    /// recommender labeled from that bin.
    pub fn write_popularity_bins(
        &mut self,
        iteration: usize,
        recommender: &str,
        bins: &[usize],
    ) -> Result<()>
    {
        let Some(file) = self.popularity_bins.as_mut() else {
            return Ok(());
        };
        for (bin, count) in bins.iter().enumerate() {
            writeln!(
                file,
                "{},{},{},{},{}",
                self.run, iteration, recommender, bin, count,
            )?;
        }
        Ok(())
    }


    /// Flush every results file.
    pub fn flush(&mut self) -> Result<()> {
        self.evaluation.flush()?;
        self.number_labeled.flush()?;
        self.label_comparison.flush()?;
        if let Some(file) = self.popularity_bins.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}
