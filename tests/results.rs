extern crate cotrec;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use cotrec::prelude::*;
use cotrec::results::{
    aggregate_counts,
    read_counts,
    EVALUATION_HEADER,
    NUMBER_LABELED_HEADER,
};


fn results_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir()
        .join(format!("cotrec-results-{name}-{}", process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}


fn sample_metrics(seed: f64) -> MetricSet {
    MetricSet {
        rmse: 1.0 + seed,
        roc_auc: 0.5,
        precision: 0.25,
        recall: 0.125 + seed,
        map: 0.1,
        mrr: 0.2,
        ndcg: 0.3,
    }
}


#[test]
fn evaluation_rows_survive_the_round_trip() {
    let dir = results_dir("round-trip");
    let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 0, false)
        .unwrap();
    writer.write_evaluation(0, 10, "top_pop", &sample_metrics(0.0)).unwrap();
    writer.write_evaluation(0, 10, "item_knn", &sample_metrics(0.5)).unwrap();
    writer.write_evaluation(1, 10, "top_pop", &sample_metrics(1.0)).unwrap();
    writer.flush().unwrap();

    let rows = read_evaluation(&dir.join("evaluation.csv")).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].recommender, "top_pop");
    assert_eq!(rows[0].iteration, 0);
    assert_eq!(rows[0].at, 10);
    assert_eq!(rows[0].metrics, sample_metrics(0.0));
    assert_eq!(rows[2].iteration, 1);
    assert_eq!(rows[2].metrics.rmse, 2.0);
}


#[test]
fn reopening_a_results_file_appends_without_a_second_header() {
    let dir = results_dir("append");
    {
        let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 0, false)
            .unwrap();
        writer.write_evaluation(0, 10, "top_pop", &sample_metrics(0.0))
            .unwrap();
        writer.flush().unwrap();
    }
    {
        let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 1, false)
            .unwrap();
        writer.write_evaluation(0, 10, "top_pop", &sample_metrics(1.0))
            .unwrap();
        writer.flush().unwrap();
    }

    let text = fs::read_to_string(dir.join("evaluation.csv")).unwrap();
    assert_eq!(text.matches("cotraining,").count(), 1);

    let rows = read_evaluation(&dir.join("evaluation.csv")).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].cotraining, 0);
    assert_eq!(rows[1].cotraining, 1);
}


#[test]
fn aggregation_averages_across_runs_and_is_idempotent() {
    let dir = results_dir("aggregate");
    let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 0, false)
        .unwrap();
    writer.write_evaluation(0, 10, "top_pop", &sample_metrics(0.0)).unwrap();
    writer.write_evaluation(0, 10, "top_pop", &sample_metrics(1.0)).unwrap();
    writer.write_evaluation(1, 10, "top_pop", &sample_metrics(0.0)).unwrap();
    writer.flush().unwrap();

    let rows = read_evaluation(&dir.join("evaluation.csv")).unwrap();
    let means = aggregate(&rows, "rmse").unwrap();
    assert_eq!(means[&(String::from("top_pop"), 0)], 1.5);
    assert_eq!(means[&(String::from("top_pop"), 1)], 1.0);

    let again = read_evaluation(&dir.join("evaluation.csv")).unwrap();
    assert_eq!(rows, again);
    assert_eq!(aggregate(&again, "rmse").unwrap(), means);

    assert!(aggregate(&rows, "accuracy").is_err());
}


#[test]
fn malformed_rows_report_the_line() {
    let dir = results_dir("malformed");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("evaluation.csv");
    fs::write(
        &path,
        format!("{}0,0,10,top_pop,oops,0,0,0,0,0,0\n", EVALUATION_HEADER),
    ).unwrap();

    match read_evaluation(&path) {
        Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a parse error, got {other:?}"),
    }

    fs::write(&path, "wrong,header\n").unwrap();
    assert!(read_evaluation(&path).is_err());
}


#[test]
fn labeling_and_comparison_files_get_one_row_per_event() {
    let dir = results_dir("labeling");
    let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 0, true)
        .unwrap();
    writer.write_labeling(0, "top_pop", 1, 3, 75).unwrap();
    writer.write_labeling(0, "item_knn", 0, 2, 75).unwrap();
    writer.write_label_comparison(0, &LabelComparison {
        both_positive: 1,
        both_negative: 2,
        conflicting: 0,
        only_first: 1,
        only_second: 0,
    }).unwrap();
    writer.write_popularity_bins(0, "top_pop", &[4, 0, 1]).unwrap();
    writer.flush().unwrap();

    let labeled = fs::read_to_string(dir.join("numberlabeled.csv")).unwrap();
    assert_eq!(labeled.lines().count(), 3);
    assert!(labeled.contains("0,0,top_pop,1,3,75"));

    let comparison =
        fs::read_to_string(dir.join("label_comparison.csv")).unwrap();
    assert!(comparison.contains("0,0,1,2,0,1,0"));

    let bins = fs::read_to_string(dir.join("popularity_bins.csv")).unwrap();
    assert_eq!(bins.lines().count(), 4);
    assert!(bins.contains("0,0,top_pop,0,4"));
    assert!(bins.contains("0,0,top_pop,2,1"));
}


#[test]
fn count_files_aggregate_across_runs() {
    let dir = results_dir("count-aggregate");
    for (run, pool) in [(0, 70), (1, 80)] {
        let mut writer = ResultsWriter::new(&dir, "evaluation.csv", run, false)
            .unwrap();
        writer.write_labeling(0, "top_pop", 1, 3, pool).unwrap();
        writer.write_labeling(1, "top_pop", 1, 3, pool - 8).unwrap();
        writer.flush().unwrap();
    }

    let path = dir.join("numberlabeled.csv");
    let rows = read_counts(&path, NUMBER_LABELED_HEADER, 1).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].key, vec!["top_pop"]);
    assert_eq!(rows[0].counts, vec![1.0, 3.0, 70.0]);

    // One row per (iteration, recommender), pool averaged over runs.
    let means = aggregate_counts(&rows);
    assert_eq!(means.len(), 2);
    let key = (0, vec![String::from("top_pop")]);
    assert_eq!(means[&key], vec![1.0, 3.0, 75.0]);
    let key = (1, vec![String::from("top_pop")]);
    assert_eq!(means[&key], vec![1.0, 3.0, 67.0]);
}


#[test]
fn count_files_reject_foreign_headers_and_short_rows() {
    let dir = results_dir("count-malformed");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("numberlabeled.csv");

    fs::write(&path, EVALUATION_HEADER).unwrap();
    assert!(read_counts(&path, NUMBER_LABELED_HEADER, 1).is_err());

    fs::write(&path, format!("{NUMBER_LABELED_HEADER}0,0,top_pop,1,3\n"))
        .unwrap();
    match read_counts(&path, NUMBER_LABELED_HEADER, 1) {
        Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected a parse error, got {other:?}"),
    }
}


#[test]
fn label_comparison_classifies_every_pair() {
    let label = |user, item, rating| LabeledSample {
        user, item, rating, confidence: 1.0,
    };
    let first = [
        label(0, 0, 5.0),
        label(0, 1, 1.0),
        label(1, 0, 5.0),
        label(2, 2, 1.0),
    ];
    let second = [
        label(0, 0, 5.0),
        label(0, 1, 1.0),
        label(1, 0, 1.0),
        label(3, 3, 5.0),
    ];

    let comparison = LabelComparison::compare(&first, &second, 3.0);
    assert_eq!(comparison.both_positive, 1);
    assert_eq!(comparison.both_negative, 1);
    assert_eq!(comparison.conflicting, 1);
    assert_eq!(comparison.only_first, 1);
    assert_eq!(comparison.only_second, 1);
}
