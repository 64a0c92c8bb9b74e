//! Aggregates and optionally plots the files a co-training run wrote.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use cotrec::prelude::*;
use cotrec::results::{
    aggregate_counts,
    read_counts,
    LABEL_COMPARISON_FILE,
    LABEL_COMPARISON_HEADER,
    NUMBER_LABELED_FILE,
    NUMBER_LABELED_HEADER,
    POPULARITY_BINS_FILE,
    POPULARITY_BINS_HEADER,
};


#[derive(Debug, Parser)]
#[command(
    name = "read-results",
    about = "Aggregate the results of a co-training run",
)]
struct Args {
    /// Directory the run wrote its results to.
    #[arg(long = "results_path", default_value = "results")]
    results_path: PathBuf,

    /// Name of the evaluation file inside the results directory.
    #[arg(long = "results_file", default_value = "evaluation.csv")]
    results_file: String,

    /// What to read, comma-separated: any metric column,
    /// `numberlabeled`, or `label_comparison`.
    /// Defaults to every metric column.
    #[arg(long = "to_read", value_delimiter = ',')]
    to_read: Vec<String>,

    /// Also read the popularity histogram file.
    #[arg(long = "make_pop_bins")]
    make_pop_bins: bool,

    /// Write one `<metric>.png` line chart per requested metric.
    #[arg(long)]
    plot: bool,
}


fn print_table(rows: &[EvaluationRow], metric: &str) -> cotrec::Result<()> {
    println!("{}", format!("[{metric}]").bold().green());
    println!("{:>20} {:>10} {:>12}", "recommender", "iteration", "mean");
    for ((recommender, iteration), mean) in aggregate(rows, metric)? {
        println!("{recommender:>20} {iteration:>10} {mean:>12.6}");
    }
    Ok(())
}


/// Print a bookkeeping file averaged per `(iteration, key)` across
/// runs, one column per header name past `cotraining`.
fn print_counts(
    path: &PathBuf,
    header: &str,
    key_columns: usize,
) -> cotrec::Result<()>
{
    let name = path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("{}", format!("[{name}]").bold().green());

    let columns = header.trim_end().split(',').collect::<Vec<_>>();
    for column in &columns[1..] {
        print!("{column:>16}");
    }
    println!();

    let rows = read_counts(path, header, key_columns)?;
    for ((iteration, key), counts) in aggregate_counts(&rows) {
        print!("{iteration:>16}");
        for part in &key {
            print!("{part:>16}");
        }
        for count in &counts {
            print!("{count:>16.3}");
        }
        println!();
    }
    Ok(())
}


fn run(args: &Args) -> cotrec::Result<()> {
    let evaluation = args.results_path.join(&args.results_file);
    let rows = read_evaluation(&evaluation)?;

    let to_read = if args.to_read.is_empty() {
        MetricSet::NAMES.iter().map(|name| name.to_string()).collect()
    } else {
        args.to_read.clone()
    };

    for name in &to_read {
        match name.as_str() {
            "numberlabeled" => {
                print_counts(
                    &args.results_path.join(NUMBER_LABELED_FILE),
                    NUMBER_LABELED_HEADER,
                    1,
                )?;
            }
            "label_comparison" => {
                print_counts(
                    &args.results_path.join(LABEL_COMPARISON_FILE),
                    LABEL_COMPARISON_HEADER,
                    0,
                )?;
            }
            metric => {
                print_table(&rows, metric)?;
                if args.plot {
                    let output = args.results_path
                        .join(format!("{metric}.png"));
                    plot_metric(&rows, metric, &output)?;
                    println!("wrote {}", output.display());
                }
            }
        }
    }

    if args.make_pop_bins {
        print_counts(
            &args.results_path.join(POPULARITY_BINS_FILE),
            POPULARITY_BINS_HEADER,
            2,
        )?;
    }
    Ok(())
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
