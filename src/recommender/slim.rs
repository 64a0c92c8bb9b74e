//! Provides `SLIM`: sparse linear regression over item co-occurrences,
//! solved by coordinate descent with an elastic-net penalty.
//!
//! `SLIM_mt` is the same model with the per-item subproblems solved in
//! parallel; the driver still sees a synchronous `fit`.

use rayon::prelude::*;

use crate::dataset::RatingMatrix;
use crate::errors::{Error, Result};
use super::config::SlimParams;
use super::core::Recommender;


/// SLIM learns a sparse item-item weight matrix `W` with a zero
/// diagonal and nonnegative entries by regressing each item's rating
/// column on every other item's.
pub struct Slim {
    params: SlimParams,
    parallel: bool,
    train: RatingMatrix,
    /// Per target item: its learned `(feature item, weight)` pairs
    /// sorted by item id.
    weights: Vec<Vec<(u32, f64)>>,
    popularity: Vec<usize>,
    max_popularity: usize,
}


impl Slim {
    /// Construct an unfitted, sequential instance of `Slim`.
    pub fn new(params: SlimParams) -> Self {
        Self {
            params,
            parallel: false,
            train: RatingMatrix::new(0, 0),
            weights: Vec::new(),
            popularity: Vec::new(),
            max_popularity: 0,
        }
    }


    /// Solve the item subproblems in parallel.
    /// This is the `SLIM_mt` variant.
    pub fn parallel(mut self, flag: bool) -> Self {
        self.parallel = flag;
        self
    }


    fn fallback(&self, item: u32) -> f64 {
        if self.max_popularity == 0 {
            return 0.0;
        }
        let pop = self.popularity.get(item as usize).copied().unwrap_or(0);
        pop as f64 / self.max_popularity as f64
    }
}


/// Coordinate descent for one target item.
///
/// `users` is the user-major training matrix, `items` its transpose.
/// The residual is kept dense in user space, so every coordinate
/// update is a sparse dot product plus a sparse axpy.
fn solve_item(
    users: &RatingMatrix,
    items: &RatingMatrix,
    target: u32,
    params: &SlimParams,
) -> Vec<(u32, f64)>
{
    let n_users = users.shape().0;
    let n_items = users.shape().1;
    let column = items.user_ratings(target);
    if column.is_empty() {
        return Vec::new();
    }

    // Candidate features: every item co-rated with the target.
    let mut features = Vec::new();
    let mut seen = vec![false; n_items];
    for &(user, _) in column {
        for &(item, _) in users.user_ratings(user) {
            if item != target && !seen[item as usize] {
                seen[item as usize] = true;
                features.push(item);
            }
        }
    }
    features.sort_unstable();

    // Residual r = y - X w, dense over users; w starts at zero.
    let mut residual = vec![0.0; n_users];
    for &(user, rating) in column {
        residual[user as usize] = rating;
    }

    let norms = features.iter()
        .map(|&feat| {
            items.user_ratings(feat)
                .iter()
                .map(|&(_, v)| v * v)
                .sum::<f64>()
        })
        .collect::<Vec<_>>();

    let mut w = vec![0.0; features.len()];

    for _ in 0..params.iters {
        for (fx, &feat) in features.iter().enumerate() {
            let ss = norms[fx];
            if ss == 0.0 { continue; }

            let col = items.user_ratings(feat);
            let rho = col.iter()
                .map(|&(user, v)| v * residual[user as usize])
                .sum::<f64>()
                + w[fx] * ss;

            // Soft threshold with the nonnegativity constraint.
            let updated = ((rho - params.l1_reg) / (ss + params.l2_reg))
                .max(0.0);

            let delta = w[fx] - updated;
            if delta != 0.0 {
                for &(user, v) in col {
                    residual[user as usize] += v * delta;
                }
                w[fx] = updated;
            }
        }
    }

    features.into_iter()
        .zip(w)
        .filter(|&(_, weight)| weight > 0.0)
        .collect()
}


impl Recommender for Slim {
    fn name(&self) -> &str {
        if self.parallel { "SLIM_mt" } else { "SLIM" }
    }


    fn train_matrix(&self) -> &RatingMatrix {
        &self.train
    }


    fn fit(&mut self, train: &RatingMatrix) -> Result<()> {
        if train.nnz() == 0 {
            return Err(Error::AdapterFit {
                name: self.name().to_string(),
                reason: String::from("the training set holds no rating"),
            });
        }

        let items = train.transpose();
        let n_items = train.shape().1;

        self.weights = if self.parallel {
            (0..n_items as u32).into_par_iter()
                .map(|target| solve_item(train, &items, target, &self.params))
                .collect()
        } else {
            (0..n_items as u32)
                .map(|target| solve_item(train, &items, target, &self.params))
                .collect()
        };

        self.popularity = train.item_popularity();
        self.max_popularity = self.popularity.iter().copied().max().unwrap_or(0);
        self.train = train.clone();
        Ok(())
    }


    fn predict_score(&self, user: u32, item: u32) -> f64 {
        let profile = self.train.user_ratings(user);
        let Some(weights) = self.weights.get(item as usize) else {
            return self.fallback(item);
        };
        // An empty weight column is still a trained item; only a user
        // without a profile falls back to popularity.
        if profile.is_empty() {
            return self.fallback(item);
        }

        profile.iter()
            .filter_map(|&(rated, rating)| {
                weights.binary_search_by_key(&rated, |&(j, _)| j)
                    .ok()
                    .map(|pos| weights[pos].1 * rating)
            })
            .sum()
    }
}
