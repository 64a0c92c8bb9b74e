extern crate cotrec;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use cotrec::prelude::*;


fn results_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir()
        .join(format!("cotrec-driver-{name}-{}", process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}


/// Every user rates `per_user` distinct items with ratings cycling
/// over 1..=5.
fn scenario(n_users: u32, n_items: u32, per_user: u32) -> Dataset {
    let mut interactions = Vec::new();
    for user in 0..n_users {
        for ix in 0..per_user {
            interactions.push(Interaction {
                user,
                item: (user + 3 * ix) % n_items,
                rating: ((user + ix) % 5 + 1) as f64,
            });
        }
    }
    Dataset::from_interactions(interactions)
}


fn adapter(name: &str, seed: u64) -> Box<dyn Recommender> {
    RecommenderConfig::parse(name.parse().unwrap(), None)
        .unwrap()
        .build(seed)
}


#[test]
fn run_exhausts_the_iteration_budget() {
    let data = scenario(100, 50, 10);
    let (train, test) = HoldoutSplit::new(&data)
        .train_fraction(0.8)
        .unwrap()
        .seed(1234)
        .split();

    let dir = results_dir("budget");
    let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 0, false)
        .unwrap();
    let summary = CoTraining::new(
        adapter("top_pop", 1234),
        adapter("item_knn", 1234),
        &train,
        &test,
    )
        .iterations(10)
        .positives(1)
        .negatives(3)
        .pool_size(75)
        .seed(1234)
        .run(&mut writer)
        .unwrap();

    assert_eq!(summary.stop, StopReason::Completed);
    assert_eq!(summary.iterations, 10);
    assert!(summary.labels_first > 0);
    assert!(summary.labels_second > 0);

    // Two rows per iteration plus the two final ones.
    let rows = read_evaluation(&dir.join("evaluation.csv")).unwrap();
    assert_eq!(rows.len(), 22);
    assert!(rows.iter().any(|r| r.recommender == "top_pop"));
    assert!(rows.iter().any(|r| r.recommender == "item_knn"));
    assert_eq!(rows.last().unwrap().iteration, 10);

    let labeled = fs::read_to_string(dir.join("numberlabeled.csv")).unwrap();
    assert_eq!(labeled.lines().count(), 1 + 2 * 10);
    let comparison = fs::read_to_string(dir.join("label_comparison.csv"))
        .unwrap();
    assert_eq!(comparison.lines().count(), 1 + 10);
}


#[test]
fn run_stops_when_the_universe_is_exhausted() {
    // 3 x 3 with six pairs in train/test leaves three to label.
    let train = Dataset::new(
        vec![
            Interaction { user: 0, item: 0, rating: 5.0 },
            Interaction { user: 0, item: 1, rating: 2.0 },
            Interaction { user: 1, item: 0, rating: 4.0 },
            Interaction { user: 1, item: 1, rating: 1.0 },
            Interaction { user: 2, item: 0, rating: 3.0 },
        ],
        3,
        3,
    );
    let test = Dataset::new(
        vec![Interaction { user: 2, item: 1, rating: 5.0 }],
        3,
        3,
    );

    let dir = results_dir("exhausted");
    let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 0, false)
        .unwrap();
    let summary = CoTraining::new(
        adapter("top_pop", 1),
        adapter("top_pop", 1),
        &train,
        &test,
    )
        .iterations(10)
        .positives(1)
        .negatives(3)
        .pool_size(3)
        .run(&mut writer)
        .unwrap();

    assert_eq!(summary.stop, StopReason::Exhausted);
    assert_eq!(summary.iterations, 1);
}


#[test]
fn runs_with_one_seed_are_reproducible() {
    let data = scenario(20, 20, 8);
    let (train, test) = HoldoutSplit::new(&data)
        .train_fraction(0.8)
        .unwrap()
        .seed(7)
        .split();

    let run = |name: &str| {
        let dir = results_dir(name);
        let mut writer =
            ResultsWriter::new(&dir, "evaluation.csv", 0, false).unwrap();
        CoTraining::new(
            adapter("top_pop", 7),
            adapter("item_knn", 7),
            &train,
            &test,
        )
            .iterations(5)
            .pool_size(30)
            .seed(7)
            .run(&mut writer)
            .unwrap();
        fs::read_to_string(dir.join("evaluation.csv")).unwrap()
    };

    assert_eq!(run("repro-a"), run("repro-b"));
}


#[test]
fn a_resumed_run_matches_the_uninterrupted_one() {
    let data = scenario(20, 20, 8);
    let (train, test) = HoldoutSplit::new(&data)
        .train_fraction(0.8)
        .unwrap()
        .seed(42)
        .split();

    let driver = |budget: usize, dir: &PathBuf, checkpoint: PathBuf| {
        CoTraining::new(
            adapter("top_pop", 42),
            adapter("item_knn", 42),
            &train,
            &test,
        )
            .iterations(budget)
            .pool_size(30)
            .seed(42)
            .checkpoint_path(checkpoint)
            .run(
                &mut ResultsWriter::new(dir, "evaluation.csv", 0, false)
                    .unwrap(),
            )
            .unwrap()
    };

    let full_dir = results_dir("resume-full");
    let full_cp = full_dir.join("checkpoint.json");
    driver(6, &full_dir, full_cp.clone());

    let split_dir = results_dir("resume-split");
    let split_cp = split_dir.join("checkpoint.json");
    driver(3, &split_dir, split_cp.clone());

    let halfway = Checkpoint::load(&split_cp).unwrap();
    assert_eq!(halfway.iteration, 3);
    let summary = CoTraining::new(
        adapter("top_pop", 42),
        adapter("item_knn", 42),
        &train,
        &test,
    )
        .iterations(6)
        .pool_size(30)
        .seed(42)
        .checkpoint_path(split_cp.clone())
        .resume(halfway)
        .run(
            &mut ResultsWriter::new(
                &split_dir, "evaluation.csv", 0, false,
            ).unwrap(),
        )
        .unwrap();
    assert_eq!(summary.iterations, 6);

    assert_eq!(
        Checkpoint::load(&full_cp).unwrap(),
        Checkpoint::load(&split_cp).unwrap(),
    );
}


#[test]
fn resuming_past_the_budget_is_rejected() {
    let data = scenario(5, 6, 4);
    let (train, test) = HoldoutSplit::new(&data)
        .train_fraction(0.75)
        .unwrap()
        .split();

    let dir = results_dir("resume-past");
    let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 0, false)
        .unwrap();
    let stale = Checkpoint {
        iteration: 5,
        labels_first: Vec::new(),
        labels_second: Vec::new(),
        consumed: Vec::new(),
    };
    let outcome = CoTraining::new(
        adapter("top_pop", 1),
        adapter("top_pop", 1),
        &train,
        &test,
    )
        .iterations(3)
        .pool_size(4)
        .resume(stale)
        .run(&mut writer);
    assert!(outcome.is_err());
}


#[test]
fn one_way_labeling_only_feeds_the_second_recommender() {
    let data = scenario(20, 20, 8);
    let (train, test) = HoldoutSplit::new(&data)
        .train_fraction(0.8)
        .unwrap()
        .split();

    let dir = results_dir("one-way");
    let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 0, false)
        .unwrap();
    let summary = CoTraining::new(
        adapter("top_pop", 3),
        adapter("item_knn", 3),
        &train,
        &test,
    )
        .iterations(4)
        .pool_size(20)
        .policy(LabelingPolicy::FirstToSecond)
        .run(&mut writer)
        .unwrap();

    assert_eq!(summary.labels_first, 0);
    assert!(summary.labels_second > 0);
}


#[test]
fn zero_label_budgets_leave_the_pool_untouched() {
    let data = scenario(10, 12, 6);
    let (train, test) = HoldoutSplit::new(&data)
        .train_fraction(0.8)
        .unwrap()
        .split();

    let dir = results_dir("zero-budget");
    let mut writer = ResultsWriter::new(&dir, "evaluation.csv", 0, false)
        .unwrap();
    let summary = CoTraining::new(
        adapter("top_pop", 1),
        adapter("top_pop", 1),
        &train,
        &test,
    )
        .iterations(3)
        .positives(0)
        .negatives(0)
        .pool_size(10)
        .run(&mut writer)
        .unwrap();

    assert_eq!(summary.stop, StopReason::Completed);
    assert_eq!(summary.labels_first, 0);
    assert_eq!(summary.labels_second, 0);
}
