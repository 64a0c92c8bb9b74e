//! Reads evaluation files back and averages each metric per
//! recommender and iteration.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{Error, Result};
use crate::evaluation::MetricSet;


/// One parsed row of an evaluation file.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRow {
    /// Run index (`0` in holdout mode, the fold otherwise).
    pub cotraining: usize,
    /// Co-training iteration of the row.
    pub iteration: usize,
    /// Recommendation list length the metrics were computed at.
    pub at: usize,
    /// Name of the evaluated recommender.
    pub recommender: String,
    /// The metric columns.
    pub metrics: MetricSet,
}


fn parse_error(path: &Path, line: usize, reason: impl Into<String>) -> Error {
    Error::Parse {
        path: path.display().to_string(),
        line,
        reason: reason.into(),
    }
}


fn field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    path: &Path,
    line: usize,
    name: &str,
) -> Result<&'a str>
{
    fields.next()
        .ok_or_else(|| parse_error(path, line, format!("missing `{name}`")))
}


fn numeric<T>(text: &str, path: &Path, line: usize, name: &str) -> Result<T>
    where T: std::str::FromStr,
{
    text.parse().map_err(|_| {
        parse_error(path, line, format!("`{text}` is not a valid `{name}`"))
    })
}


/// Parse every row of an evaluation file.
/// The header line is required and checked against the writer's.
pub fn read_evaluation(path: &Path) -> Result<Vec<EvaluationRow>> {
    let file = File::open(path).map_err(|e| {
        parse_error(path, 0, e.to_string())
    })?;

    let mut rows = Vec::new();
    for (ix, line) in BufReader::new(file).lines().enumerate() {
        let text = line?;
        let number = ix + 1;
        if number == 1 {
            if format!("{text}\n") != super::EVALUATION_HEADER {
                return Err(parse_error(
                    path, number, "unrecognized evaluation header",
                ));
            }
            continue;
        }
        if text.trim().is_empty() {
            continue;
        }

        let mut fields = text.split(',');
        let f = &mut fields;
        let row = EvaluationRow {
            cotraining: numeric(
                field(f, path, number, "cotraining")?,
                path, number, "cotraining",
            )?,
            iteration: numeric(
                field(f, path, number, "iteration")?,
                path, number, "iteration",
            )?,
            at: numeric(field(f, path, number, "at")?, path, number, "at")?,
            recommender: field(f, path, number, "recommender")?.to_string(),
            metrics: MetricSet {
                rmse: numeric(
                    field(f, path, number, "rmse")?, path, number, "rmse",
                )?,
                roc_auc: numeric(
                    field(f, path, number, "roc_auc")?,
                    path, number, "roc_auc",
                )?,
                precision: numeric(
                    field(f, path, number, "precision")?,
                    path, number, "precision",
                )?,
                recall: numeric(
                    field(f, path, number, "recall")?,
                    path, number, "recall",
                )?,
                map: numeric(
                    field(f, path, number, "map")?, path, number, "map",
                )?,
                mrr: numeric(
                    field(f, path, number, "mrr")?, path, number, "mrr",
                )?,
                ndcg: numeric(
                    field(f, path, number, "ndcg")?, path, number, "ndcg",
                )?,
            },
        };
        if fields.next().is_some() {
            return Err(parse_error(path, number, "too many columns"));
        }
        rows.push(row);
    }
    Ok(rows)
}


/// One parsed row of a bookkeeping file (label counts, label
/// agreement, or popularity histogram).
#[derive(Debug, Clone, PartialEq)]
pub struct CountRow {
    /// Run index (`0` in holdout mode, the fold otherwise).
    pub cotraining: usize,
    /// Co-training iteration of the row.
    pub iteration: usize,
    /// Remaining key columns, e.g. the recommender name or the bin.
    pub key: Vec<String>,
    /// The numeric count columns.
    pub counts: Vec<f64>,
}


/// Parse every row of a bookkeeping file whose header is `header`.
/// The first two columns are `cotraining` and `iteration`; the next
/// `key_columns` ones identify the row within a run, and the rest are
/// numeric counts.
pub fn read_counts(
    path: &Path,
    header: &str,
    key_columns: usize,
) -> Result<Vec<CountRow>>
{
    let file = File::open(path).map_err(|e| {
        parse_error(path, 0, e.to_string())
    })?;
    let n_counts = header.trim_end().split(',').count() - 2 - key_columns;

    let mut rows = Vec::new();
    for (ix, line) in BufReader::new(file).lines().enumerate() {
        let text = line?;
        let number = ix + 1;
        if number == 1 {
            if format!("{text}\n") != header {
                return Err(parse_error(path, number, "unrecognized header"));
            }
            continue;
        }
        if text.trim().is_empty() {
            continue;
        }

        let mut fields = text.split(',');
        let f = &mut fields;
        let cotraining = numeric(
            field(f, path, number, "cotraining")?,
            path, number, "cotraining",
        )?;
        let iteration = numeric(
            field(f, path, number, "iteration")?,
            path, number, "iteration",
        )?;
        let key = (0..key_columns)
            .map(|_| Ok(field(f, path, number, "key")?.to_string()))
            .collect::<Result<Vec<_>>>()?;
        let counts = (0..n_counts)
            .map(|_| {
                let text = field(f, path, number, "count")?;
                numeric(text, path, number, "count")
            })
            .collect::<Result<Vec<_>>>()?;
        if fields.next().is_some() {
            return Err(parse_error(path, number, "too many columns"));
        }
        rows.push(CountRow { cotraining, iteration, key, counts });
    }
    Ok(rows)
}


/// Average every count column per `(iteration, key)` across runs,
/// so k-fold experiments report one row per iteration and key.
pub fn aggregate_counts(
    rows: &[CountRow],
) -> BTreeMap<(usize, Vec<String>), Vec<f64>>
{
    let mut sums = BTreeMap::<(usize, Vec<String>), (Vec<f64>, usize)>::new();
    for row in rows {
        let entry = sums.entry((row.iteration, row.key.clone()))
            .or_insert((vec![0.0; row.counts.len()], 0));
        for (sum, count) in entry.0.iter_mut().zip(&row.counts) {
            *sum += count;
        }
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(key, (sums, n))| {
            (key, sums.into_iter().map(|s| s / n as f64).collect())
        })
        .collect()
}


/// Average one metric per `(recommender, iteration)` across runs.
/// Reading the same file twice and aggregating yields the same map.
pub fn aggregate(
    rows: &[EvaluationRow],
    metric: &str,
) -> Result<BTreeMap<(String, usize), f64>>
{
    if !MetricSet::NAMES.contains(&metric) {
        return Err(Error::Configuration(
            format!("`{metric}` is not a metric column")
        ));
    }

    let mut sums = BTreeMap::<(String, usize), (f64, usize)>::new();
    for row in rows {
        let value = row.metrics.get(metric)
            .expect("metric name was checked above");
        let entry = sums.entry((row.recommender.clone(), row.iteration))
            .or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    Ok(
        sums.into_iter()
            .map(|(key, (sum, count))| (key, sum / count as f64))
            .collect()
    )
}
