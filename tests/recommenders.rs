extern crate cotrec;

use cotrec::prelude::*;


fn matrix(n_users: usize, n_items: usize, triples: &[(u32, u32, f64)]) -> RatingMatrix {
    let mut m = RatingMatrix::new(n_users, n_items);
    for &(user, item, rating) in triples {
        m.set(user, item, rating);
    }
    m
}


/// Item 0 rated by three users, item 1 by two, item 2 by one.
fn popularity_skewed() -> RatingMatrix {
    matrix(4, 3, &[
        (0, 0, 5.0), (1, 0, 4.0), (2, 0, 3.0),
        (0, 1, 2.0), (1, 1, 5.0),
        (3, 2, 4.0),
    ])
}


#[test]
fn top_pop_ranks_by_popularity() {
    let mut model = TopPop::new();
    model.fit(&popularity_skewed()).unwrap();

    assert_eq!(model.recommend_top_n(3, 2, true), vec![0, 1]);
    assert!(model.predict_score(3, 0) > model.predict_score(3, 1));
    assert_eq!(model.predict_score(0, 0), 1.0);
}


#[test]
fn top_pop_labels_by_rank_with_extreme_ratings() {
    let mut model = TopPop::new();
    model.fit(&popularity_skewed()).unwrap();

    let candidates = [(3, 0), (3, 1)];
    let labels = model.label(&candidates, 1, 1, &LabelThresholds::explicit());
    assert_eq!(labels.len(), 2);

    // Sorted by (user, item): the popular item gets the maximal
    // rating, the unpopular one the minimal.
    assert_eq!((labels[0].user, labels[0].item), (3, 0));
    assert_eq!(labels[0].rating, 5.0);
    assert_eq!((labels[1].user, labels[1].item), (3, 1));
    assert_eq!(labels[1].rating, 1.0);
}


/// Items 0 and 1 carry identical rating columns; item 2 is rated by
/// disjoint users.
fn duplicated_items() -> RatingMatrix {
    matrix(7, 3, &[
        (0, 0, 5.0), (0, 1, 5.0),
        (1, 0, 3.0), (1, 1, 3.0),
        (2, 0, 4.0), (2, 1, 4.0),
        (3, 0, 2.0), (3, 1, 2.0),
        (4, 2, 1.0), (5, 2, 2.0),
        (6, 0, 5.0),
    ])
}


#[test]
fn item_knn_transfers_ratings_between_twin_items() {
    let mut model = ItemKnn::new(KnnParams::default());
    model.fit(&duplicated_items()).unwrap();

    // User 6 only rated item 0; its twin must inherit that rating.
    let score = model.predict_score(6, 1);
    assert!((score - 5.0).abs() < 1e-6);
    assert!(model.predict_score(6, 2) < score);
}


#[test]
fn user_knn_transfers_ratings_between_twin_users() {
    let train = matrix(4, 4, &[
        (0, 0, 5.0), (0, 1, 1.0), (0, 2, 4.0),
        (1, 0, 5.0), (1, 1, 1.0), (1, 2, 4.0), (1, 3, 2.0),
        (2, 0, 1.0), (2, 1, 5.0),
        (3, 3, 3.0),
    ]);
    let mut model = UserKnn::new(KnnParams::default());
    model.fit(&train).unwrap();

    // User 0 is a twin of user 1, who rated item 3 with 2.
    let score = model.predict_score(0, 3);
    assert!((score - 2.0).abs() < 1.0);
}


#[test]
fn funk_svd_is_seed_deterministic() {
    let train = duplicated_items();
    let params = FunkSvdParams::default();

    let mut a = FunkSvd::new(params, 7);
    let mut b = FunkSvd::new(params, 7);
    let mut c = FunkSvd::new(params, 8);
    a.fit(&train).unwrap();
    b.fit(&train).unwrap();
    c.fit(&train).unwrap();

    for user in 0..7 {
        for item in 0..3 {
            let lhs = a.predict_score(user, item);
            assert!(lhs.is_finite());
            assert_eq!(lhs, b.predict_score(user, item));
        }
    }
    assert_ne!(a.predict_score(6, 1), c.predict_score(6, 1));
}


#[test]
fn slim_learns_the_twin_item_weight() {
    let mut model = Slim::new(SlimParams::default());
    model.fit(&duplicated_items()).unwrap();

    // The twin weight drives the score well above the unrelated item.
    assert!(model.predict_score(6, 1) > 1.0);
    assert!(model.predict_score(6, 1) > model.predict_score(6, 2));
    // Item 2 shares no co-rater with user 6 and learns no weight;
    // the learned zero is not replaced by the popularity fallback.
    assert_eq!(model.predict_score(6, 2), 0.0);
}


#[test]
fn parallel_slim_matches_the_sequential_solution() {
    let train = duplicated_items();
    let mut serial = Slim::new(SlimParams::default());
    let mut parallel = Slim::new(SlimParams::default()).parallel(true);
    serial.fit(&train).unwrap();
    parallel.fit(&train).unwrap();

    assert_eq!(serial.name(), "SLIM");
    assert_eq!(parallel.name(), "SLIM_mt");
    for user in 0..7 {
        for item in 0..3 {
            assert_eq!(
                serial.predict_score(user, item),
                parallel.predict_score(user, item),
            );
        }
    }
}


#[test]
fn slim_bpr_prefers_the_co_consumed_item() {
    // Items 0 and 1 are always consumed together; item 2 never with
    // them.
    let train = matrix(7, 3, &[
        (0, 0, 1.0), (0, 1, 1.0),
        (1, 0, 1.0), (1, 1, 1.0),
        (2, 0, 1.0), (2, 1, 1.0),
        (3, 0, 1.0), (3, 1, 1.0),
        (4, 0, 1.0), (4, 1, 1.0),
        (5, 2, 1.0),
        (6, 0, 1.0),
    ]);
    let mut model = SlimBpr::new(BprParams::default(), 3);
    model.fit(&train).unwrap();

    assert!(model.predict_score(6, 1) > model.predict_score(6, 2));
}


#[test]
fn slim_bpr_reserves_the_fallback_for_unseen_users() {
    // Same co-consumption pattern, plus user 7 who rated nothing.
    let train = matrix(8, 3, &[
        (0, 0, 1.0), (0, 1, 1.0),
        (1, 0, 1.0), (1, 1, 1.0),
        (2, 0, 1.0), (2, 1, 1.0),
        (3, 0, 1.0), (3, 1, 1.0),
        (4, 0, 1.0), (4, 1, 1.0),
        (5, 2, 1.0),
        (6, 0, 1.0),
    ]);
    let mut model = SlimBpr::new(BprParams::default(), 3);
    model.fit(&train).unwrap();

    // Item 2 never collects a positive weight, so a profiled user
    // gets its learned zero rather than the popularity fallback.
    assert_eq!(model.predict_score(6, 2), 0.0);
    // A user without a profile still falls back to popularity.
    assert_eq!(model.predict_score(7, 0), 1.0);
    assert!(model.predict_score(7, 2) > 0.0);
}


#[test]
fn every_adapter_refuses_an_empty_matrix() {
    let empty = RatingMatrix::new(3, 3);
    let names = [
        "item_knn", "user_knn", "FunkSVD",
        "SLIM", "SLIM_mt", "SLIM_BPR", "top_pop",
    ];
    for name in names {
        let config = RecommenderConfig::parse(name.parse().unwrap(), None)
            .unwrap();
        let mut model = config.build(1);
        assert!(model.fit(&empty).is_err(), "{name} accepted empty input");
    }
}


#[test]
fn incorporate_labels_extends_the_training_matrix() {
    let mut model = TopPop::new();
    model.fit(&popularity_skewed()).unwrap();
    let before = model.train_matrix().nnz();

    model.incorporate_labels(&[
        LabeledSample { user: 3, item: 1, rating: 5.0, confidence: 1.0 },
        LabeledSample { user: 2, item: 2, rating: 1.0, confidence: 0.5 },
    ]).unwrap();

    assert_eq!(model.train_matrix().nnz(), before + 2);
    // Item 1 caught up with item 0 in popularity.
    assert_eq!(model.predict_score(0, 1), model.predict_score(0, 0));
}


#[test]
fn config_parses_key_value_parameters() {
    let config = RecommenderConfig::parse(
        "item_knn".parse().unwrap(),
        Some("k=5,shrinkage=2.5,similarity=pearson,normalize=false"),
    ).unwrap();
    let RecommenderConfig::ItemKnn(params) = config else {
        panic!("parsed into the wrong adapter");
    };
    assert_eq!(params.k, 5);
    assert_eq!(params.shrinkage, 2.5);
    assert_eq!(params.similarity, Similarity::Pearson);
    assert!(!params.normalize);
}


#[test]
fn config_rejects_unknown_names_and_keys() {
    assert!("svd++".parse::<RecommenderName>().is_err());
    assert!(
        RecommenderConfig::parse(
            "FunkSVD".parse().unwrap(),
            Some("learning=0.1"),
        ).is_err()
    );
}
