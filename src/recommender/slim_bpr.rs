//! Provides `SLIM_BPR`: an item-item weight matrix trained with
//! stochastic gradient descent on the BPR ranking loss.
//!
//! Scores rank items within a user but live on no rating scale, so
//! labeling assigns the extreme ratings by rank instead of reading the
//! scores as ratings.

use rand::prelude::*;

use crate::dataset::RatingMatrix;
use crate::errors::{Error, Result};
use super::config::BprParams;
use super::core::{
    label_by_rank,
    LabelThresholds,
    LabeledSample,
    Recommender,
};


/// `SLIM_BPR` optimizes pairwise preference: for a sampled user, a
/// consumed item should score above an unconsumed one. The learned
/// weights are truncated to the `top_k` strongest per item.
pub struct SlimBpr {
    params: BprParams,
    seed: u64,
    train: RatingMatrix,
    /// Per target item: its `(feature item, weight)` pairs sorted by
    /// item id.
    weights: Vec<Vec<(u32, f64)>>,
    popularity: Vec<usize>,
    max_popularity: usize,
}


impl SlimBpr {
    /// Construct an unfitted instance of `SlimBpr`.
    pub fn new(params: BprParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            train: RatingMatrix::new(0, 0),
            weights: Vec::new(),
            popularity: Vec::new(),
            max_popularity: 0,
        }
    }


    fn fallback(&self, item: u32) -> f64 {
        if self.max_popularity == 0 {
            return 0.0;
        }
        let pop = self.popularity.get(item as usize).copied().unwrap_or(0);
        pop as f64 / self.max_popularity as f64
    }
}


/// Draw a `(user, positive, negative)` triple uniformly:
/// a user among those with at least one rating, a positive item from
/// their profile, and a negative one the user never rated.
fn sample_triple(
    train: &RatingMatrix,
    eligible: &[u32],
    rng: &mut StdRng,
) -> (u32, u32, u32)
{
    let n_items = train.shape().1 as u32;
    let user = eligible[rng.gen_range(0..eligible.len())];
    let profile = train.user_ratings(user);
    let positive = profile[rng.gen_range(0..profile.len())].0;
    let negative = loop {
        let item = rng.gen_range(0..n_items);
        if profile.binary_search_by_key(&item, |&(i, _)| i).is_err() {
            break item;
        }
    };
    (user, positive, negative)
}


impl Recommender for SlimBpr {
    fn name(&self) -> &str {
        "SLIM_BPR"
    }


    fn train_matrix(&self) -> &RatingMatrix {
        &self.train
    }


    fn fit(&mut self, train: &RatingMatrix) -> Result<()> {
        let (_, n_items) = train.shape();
        if train.nnz() == 0 {
            return Err(Error::AdapterFit {
                name: self.name().to_string(),
                reason: String::from("the training set holds no rating"),
            });
        }

        // Users whose profile leaves room for a negative sample.
        let eligible = (0..train.shape().0 as u32)
            .filter(|&user| {
                let rated = train.user_ratings(user).len();
                rated > 0 && rated < n_items
            })
            .collect::<Vec<_>>();
        if eligible.is_empty() {
            return Err(Error::AdapterFit {
                name: self.name().to_string(),
                reason: String::from(
                    "every user rated either no item or all of them"
                ),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut dense = vec![vec![0.0_f64; n_items]; n_items];

        for _ in 0..self.params.iters {
            for _ in 0..train.nnz() {
                let (user, positive, negative) =
                    sample_triple(train, &eligible, &mut rng);
                let profile = train.user_ratings(user);

                let x_pos = profile.iter()
                    .filter(|&&(item, _)| item != positive)
                    .map(|&(item, _)| dense[item as usize][positive as usize])
                    .sum::<f64>();
                let x_neg = profile.iter()
                    .filter(|&&(item, _)| item != negative)
                    .map(|&(item, _)| dense[item as usize][negative as usize])
                    .sum::<f64>();
                let z = 1.0 / (1.0 + (x_pos - x_neg).exp());

                for &(item, _) in profile {
                    let row = item as usize;
                    if item != positive {
                        let w = dense[row][positive as usize];
                        dense[row][positive as usize] +=
                            self.params.lrate
                            * (z - self.params.reg_positive * w);
                    }
                    if item != negative {
                        let w = dense[row][negative as usize];
                        dense[row][negative as usize] -=
                            self.params.lrate
                            * (z + self.params.reg_negative * w);
                    }
                }
            }
        }

        // Keep only the top_k strongest positive weights per target.
        self.weights = (0..n_items).map(|target| {
            let mut column = (0..n_items)
                .filter(|&feat| feat != target)
                .map(|feat| (feat as u32, dense[feat][target]))
                .filter(|&(_, w)| w > 0.0)
                .collect::<Vec<_>>();
            column.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });
            column.truncate(self.params.top_k);
            column.sort_by_key(|&(feat, _)| feat);
            column
        })
        .collect();

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
        // An empty truncated column is still a trained item; only a
        // user without a profile falls back to popularity.
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


    fn label(
        &self,
        candidates: &[(u32, u32)],
        p: usize,
        n: usize,
        thresholds: &LabelThresholds,
    ) -> Vec<LabeledSample>
    {
        label_by_rank(self, candidates, p, n, thresholds)
    }
}
