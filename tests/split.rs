extern crate cotrec;

use std::collections::HashSet;

use rand::prelude::*;

use cotrec::prelude::*;


/// Every user rates `per_user` items, ratings cycling over 1..=5.
fn synthetic(n_users: u32, per_user: u32) -> Dataset {
    let mut interactions = Vec::new();
    for user in 0..n_users {
        for ix in 0..per_user {
            interactions.push(Interaction {
                user,
                item: (user + 2 * ix) % (2 * per_user),
                rating: (ix % 5 + 1) as f64,
            });
        }
    }
    Dataset::from_interactions(interactions)
}


fn pairs(data: &Dataset) -> HashSet<(u32, u32)> {
    data.interactions()
        .iter()
        .map(|r| (r.user, r.item))
        .collect()
}


#[test]
fn holdout_splits_each_user_by_the_fraction() {
    let data = synthetic(20, 10);
    let (train, test) = HoldoutSplit::new(&data)
        .train_fraction(0.8)
        .unwrap()
        .seed(1234)
        .split();

    assert_eq!(train.len() + test.len(), data.len());
    for user in 0..20 {
        let in_train = train.interactions()
            .iter()
            .filter(|r| r.user == user)
            .count();
        assert_eq!(in_train, 8);
    }

    let train_pairs = pairs(&train);
    let test_pairs = pairs(&test);
    assert!(train_pairs.is_disjoint(&test_pairs));
}


#[test]
fn holdout_keeps_at_least_the_floor_per_user() {
    let data = synthetic(5, 2);
    let (train, _) = HoldoutSplit::new(&data)
        .train_fraction(0.1)
        .unwrap()
        .min_train_per_user(1)
        .split();

    for user in 0..5 {
        let in_train = train.interactions()
            .iter()
            .filter(|r| r.user == user)
            .count();
        assert!(in_train >= 1);
    }
}


#[test]
fn holdout_is_seed_deterministic() {
    let data = synthetic(30, 8);
    let split = |seed| {
        let (train, test) = HoldoutSplit::new(&data)
            .train_fraction(0.75)
            .unwrap()
            .seed(seed)
            .split();
        (pairs(&train), pairs(&test))
    };

    assert_eq!(split(7), split(7));
    assert_ne!(split(7), split(8));
}


#[test]
fn holdout_rejects_degenerate_fractions() {
    let data = synthetic(3, 4);
    assert!(HoldoutSplit::new(&data).train_fraction(0.0).is_err());
    assert!(HoldoutSplit::new(&data).train_fraction(1.0).is_err());
    assert!(HoldoutSplit::new(&data).train_fraction(-0.5).is_err());
}


#[test]
fn kfold_partitions_the_interactions() {
    let data = synthetic(10, 10);
    let folds = KFold::new(&data)
        .n_folds(4)
        .unwrap()
        .seed(99)
        .shuffle()
        .collect::<Vec<_>>();
    assert_eq!(folds.len(), 4);

    let mut seen = 0;
    for (train, test) in &folds {
        assert_eq!(train.len() + test.len(), data.len());
        // 100 interactions over 4 folds
        assert_eq!(test.len(), 25);
        seen += test.len();
    }
    assert_eq!(seen, data.len());
}


#[test]
fn kfold_rejects_a_single_fold() {
    let data = synthetic(4, 4);
    assert!(KFold::new(&data).n_folds(1).is_err());
}


#[test]
fn pool_only_draws_unrated_pairs() {
    let data = synthetic(10, 6);
    let (train, test) = HoldoutSplit::new(&data)
        .train_fraction(0.5)
        .unwrap()
        .split();
    let train = train.to_matrix();
    let test = test.to_matrix();

    let mut pool = UnlabeledPool::new(&train, &test, 20).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    assert_eq!(pool.refill(&mut rng), 20);

    for &(user, item) in pool.candidates() {
        assert!(train.get(user, item).is_none());
        assert!(test.get(user, item).is_none());
    }
}


#[test]
fn pool_rejects_an_oversized_capacity() {
    // 2 users x 2 items with 3 rated pairs leaves one unrated pair.
    let data = Dataset::from_interactions(vec![
        Interaction { user: 0, item: 0, rating: 5.0 },
        Interaction { user: 0, item: 1, rating: 3.0 },
        Interaction { user: 1, item: 0, rating: 4.0 },
    ]);
    let matrix = data.to_matrix();
    let empty = RatingMatrix::new(2, 2);

    assert!(UnlabeledPool::new(&matrix, &empty, 1).is_ok());
    assert!(UnlabeledPool::new(&matrix, &empty, 2).is_err());
}


#[test]
fn pool_never_redraws_consumed_pairs() {
    let data = synthetic(6, 4);
    let train = data.to_matrix();
    let empty = RatingMatrix::new(
        data.n_users(), data.n_items(),
    );

    let mut pool = UnlabeledPool::new(&train, &empty, 10).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    pool.refill(&mut rng);

    let taken = pool.candidates()[..4]
        .iter()
        .map(|&(user, item)| LabeledSample {
            user, item, rating: 5.0, confidence: 1.0,
        })
        .collect::<Vec<_>>();
    pool.remove(&taken);
    assert_eq!(pool.len(), 6);

    let consumed = pool.consumed();
    assert_eq!(consumed.len(), 4);
    for _ in 0..5 {
        pool.refill(&mut rng);
        for pair in pool.candidates() {
            assert!(!consumed.contains(pair));
        }
    }
}


#[test]
fn pool_refill_is_seed_deterministic() {
    let data = synthetic(8, 5);
    let train = data.to_matrix();
    let empty = RatingMatrix::new(data.n_users(), data.n_items());

    let draw = |seed| {
        let mut pool = UnlabeledPool::new(&train, &empty, 15).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        pool.refill(&mut rng);
        pool.candidates().to_vec()
    };
    assert_eq!(draw(3), draw(3));
}
