//! Runs a co-training experiment from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use cotrec::prelude::*;


#[derive(Debug, Parser)]
#[command(
    name = "cotrain",
    about = "Co-train two recommenders over a shared unlabeled pool",
)]
struct Args {
    /// Path of the rating file (user, item, rating per row).
    dataset: PathBuf,

    /// Directory the results files are written to.
    #[arg(long = "results_path", default_value = "results")]
    results_path: PathBuf,

    /// Name of the evaluation file inside the results directory.
    #[arg(long = "results_file", default_value = "evaluation.csv")]
    results_file: String,

    /// Fraction of each user's ratings kept for training.
    #[arg(long = "holdout_perc")]
    holdout_perc: Option<f64>,

    /// Run one co-training per fold instead of a single holdout.
    #[arg(long = "k_fold", conflicts_with = "holdout_perc")]
    k_fold: Option<usize>,

    /// The rating file starts with a header row.
    #[arg(long)]
    header: bool,

    /// Column separator of the rating file (`\t` for tabs).
    #[arg(long, default_value = ",")]
    sep: String,

    /// Name of the user column when a header is present.
    #[arg(long = "user_key", default_value = "user_id")]
    user_key: String,

    /// Name of the item column when a header is present.
    #[arg(long = "item_key", default_value = "item_id")]
    item_key: String,

    /// Name of the rating column when a header is present.
    #[arg(long = "rating_key", default_value = "rating")]
    rating_key: String,

    /// Seed of the splitter, the pool, and the SGD models.
    #[arg(long = "rnd_seed", default_value_t = 1234)]
    rnd_seed: u64,

    /// Name of the first recommender.
    #[arg(long = "recommender_1", default_value = "top_pop")]
    recommender_1: String,

    /// Comma-separated `key=value` parameters of the first recommender.
    #[arg(long = "params_1")]
    params_1: Option<String>,

    /// Name of the second recommender.
    #[arg(long = "recommender_2", default_value = "top_pop")]
    recommender_2: String,

    /// Comma-separated `key=value` parameters of the second recommender.
    #[arg(long = "params_2")]
    params_2: Option<String>,

    /// Length of the recommendation lists the metrics are computed at.
    #[arg(long = "rec_length", default_value_t = 10)]
    rec_length: usize,

    /// Iteration budget of the co-training loop.
    #[arg(long = "number_iterations", default_value_t = 30)]
    number_iterations: usize,

    /// Positive labels each recommender may hand over per iteration.
    #[arg(long = "number_positives", default_value_t = 1)]
    number_positives: usize,

    /// Negative labels each recommender may hand over per iteration.
    #[arg(long = "number_negatives", default_value_t = 3)]
    number_negatives: usize,

    /// Capacity of the unlabeled candidate pool.
    #[arg(long = "number_unlabeled", default_value_t = 75)]
    number_unlabeled: usize,

    /// The rating file already holds 0/1 ratings.
    #[arg(long = "is_binary")]
    is_binary: bool,

    /// Binarize the ratings while reading.
    #[arg(long = "make_binary")]
    make_binary: bool,

    /// Ratings at or above this become 1, the rest are dropped.
    #[arg(long = "binary_th", default_value_t = 4.0)]
    binary_th: f64,

    /// Label flow between the recommenders:
    /// `bidirectional`, `first_to_second`, or `second_to_first`.
    #[arg(long)]
    labeling: Option<LabelingPolicy>,

    /// Also record a popularity histogram of the labeled items.
    #[arg(long = "make_pop_bins")]
    make_pop_bins: bool,

    /// Resume a holdout run from its checkpoint.
    #[arg(long = "recover_cotraining", requires = "recover_iter")]
    recover_cotraining: bool,

    /// Iteration the checkpoint is expected to be at.
    #[arg(long = "recover_iter", requires = "recover_cotraining")]
    recover_iter: Option<usize>,

    /// Where the checkpoint is written (and read on recovery).
    #[arg(long = "checkpoint_path")]
    checkpoint_path: Option<PathBuf>,

    /// Print one progress line per iteration.
    #[arg(long, short)]
    verbose: bool,
}


impl Args {
    fn separator(&self) -> cotrec::Result<u8> {
        match self.sep.as_str() {
            "\\t" | "\t" => Ok(b'\t'),
            text => text.bytes().next().ok_or_else(|| {
                Error::Configuration(String::from("`sep` must not be empty"))
            }),
        }
    }


    fn thresholds(&self) -> LabelThresholds {
        if self.is_binary || self.make_binary {
            LabelThresholds::binary()
        } else {
            LabelThresholds::explicit()
        }
    }


    fn driver<'a>(
        &self,
        train: &'a Dataset,
        test: &'a Dataset,
    ) -> cotrec::Result<CoTraining<'a>>
    {
        let first = RecommenderConfig::parse(
            self.recommender_1.parse()?,
            self.params_1.as_deref(),
        )?;
        let second = RecommenderConfig::parse(
            self.recommender_2.parse()?,
            self.params_2.as_deref(),
        )?;

        Ok(
            CoTraining::new(
                first.build(self.rnd_seed),
                second.build(self.rnd_seed),
                train,
                test,
            )
            .iterations(self.number_iterations)
            .positives(self.number_positives)
            .negatives(self.number_negatives)
            .pool_size(self.number_unlabeled)
            .rec_length(self.rec_length)
            .seed(self.rnd_seed)
            .thresholds(self.thresholds())
            .policy(self.labeling.unwrap_or_default())
            .popularity_bins(self.make_pop_bins)
            .verbose(self.verbose)
        )
    }
}


fn report(summary: &RunSummary) {
    let tag = match summary.stop {
        StopReason::Completed => "[DONE]".bold().green(),
        StopReason::Exhausted => "[POOL EXHAUSTED]".bold().yellow(),
        StopReason::IterationFailed => "[STOPPED]".bold().red(),
    };
    println!(
        "{tag} {} iterations, {} labels to the first recommender, \
         {} to the second",
        summary.iterations, summary.labels_first, summary.labels_second,
    );
}


fn holdout(args: &Args, data: &Dataset) -> cotrec::Result<()> {
    let (train, test) = HoldoutSplit::new(data)
        .train_fraction(args.holdout_perc.unwrap_or(0.8))?
        .seed(args.rnd_seed)
        .split();

    let checkpoint_path = args.checkpoint_path
        .clone()
        .unwrap_or_else(|| args.results_path.join("checkpoint.json"));
    let mut driver = args.driver(&train, &test)?
        .checkpoint_path(checkpoint_path.clone());

    if args.recover_cotraining {
        let checkpoint = Checkpoint::load(&checkpoint_path)?;
        let expected = args.recover_iter
            .ok_or_else(|| Error::Configuration(
                String::from("`recover_cotraining` needs `recover_iter`")
            ))?;
        if checkpoint.iteration != expected {
            return Err(Error::Configuration(format!(
                "the checkpoint is at iteration {}, not {expected}",
                checkpoint.iteration,
            )));
        }
        driver = driver.resume(checkpoint);
    }

    let mut writer = ResultsWriter::new(
        &args.results_path,
        &args.results_file,
        0,
        args.make_pop_bins,
    )?;
    report(&driver.run(&mut writer)?);
    Ok(())
}


fn k_fold(args: &Args, data: &Dataset, n_folds: usize) -> cotrec::Result<()> {
    if args.recover_cotraining {
        return Err(Error::Configuration(String::from(
            "`recover_cotraining` only applies to holdout runs"
        )));
    }

    let folds = KFold::new(data)
        .n_folds(n_folds)?
        .seed(args.rnd_seed)
        .verbose(args.verbose)
        .shuffle();
    for (fold, (train, test)) in folds.enumerate() {
        let mut writer = ResultsWriter::new(
            &args.results_path,
            &args.results_file,
            fold,
            args.make_pop_bins,
        )?;
        report(&args.driver(&train, &test)?.run(&mut writer)?);
    }
    Ok(())
}


fn run(args: &Args) -> cotrec::Result<()> {
    let data = DatasetReader::new()
        .file(&args.dataset)
        .separator(args.separator()?)
        .has_header(args.header)
        .user_key(&args.user_key)
        .item_key(&args.item_key)
        .rating_key(&args.rating_key)
        .make_binary(args.make_binary, args.binary_th)
        .read()?;

    match args.k_fold {
        Some(n_folds) => k_fold(args, &data, n_folds),
        None => holdout(args, &data),
    }
}


fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "[ERROR]".bold().red());
            ExitCode::FAILURE
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_flags_require_each_other() {
        assert!(
            Args::try_parse_from([
                "cotrain", "ratings.csv", "--recover_cotraining",
            ])
            .is_err()
        );
        assert!(
            Args::try_parse_from([
                "cotrain", "ratings.csv", "--recover_iter", "3",
            ])
            .is_err()
        );
        assert!(
            Args::try_parse_from([
                "cotrain", "ratings.csv",
                "--recover_cotraining",
                "--recover_iter", "3",
            ])
            .is_ok()
        );
    }
}
