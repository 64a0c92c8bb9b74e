//! Neighborhood recommenders: item-based and user-based k-NN over a
//! shrunken similarity with a configurable metric.

use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;

use crate::dataset::RatingMatrix;
use crate::errors::{Error, Result};
use super::config::{KnnParams, Similarity};
use super::core::Recommender;


/// How the row vectors are centered before the dot products.
enum Centering {
    None,
    /// Subtract the mean of the column the entry sits in
    /// (adjusted cosine).
    PerColumn(Vec<f64>),
    /// Subtract the compared row's own mean (Pearson).
    PerRow(Vec<f64>),
}


impl Centering {
    #[inline]
    fn apply(&self, row: usize, col: u32, value: f64) -> f64 {
        match self {
            Centering::None => value,
            Centering::PerColumn(means) => value - means[col as usize],
            Centering::PerRow(means) => value - means[row],
        }
    }
}


fn row_means(matrix: &RatingMatrix) -> Vec<f64> {
    let (n_rows, _) = matrix.shape();
    (0..n_rows)
        .map(|row| {
            let entries = matrix.user_ratings(row as u32);
            if entries.is_empty() {
                0.0
            } else {
                let sum = entries.iter().map(|&(_, v)| v).sum::<f64>();
                sum / entries.len() as f64
            }
        })
        .collect()
}


/// Shrunken top-k similarity between the rows of `rows`.
/// Only positive similarities are kept; each neighbor list is sorted
/// by row id so predictions can binary-search it.
fn top_k_similarity(
    rows: &RatingMatrix,
    centering: &Centering,
    k: usize,
    shrinkage: f64,
) -> Vec<Vec<(u32, f64)>>
{
    let (n_rows, _) = rows.shape();
    let transpose = rows.transpose();

    let norms = (0..n_rows)
        .map(|row| {
            rows.user_ratings(row as u32)
                .iter()
                .map(|&(col, v)| centering.apply(row, col, v).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .collect::<Vec<_>>();

    (0..n_rows).into_par_iter()
        .map(|a| {
            let mut dots = HashMap::<u32, f64>::new();
            for &(col, va) in rows.user_ratings(a as u32) {
                let va = centering.apply(a, col, va);
                for &(b, vb) in transpose.user_ratings(col) {
                    if b as usize == a { continue; }
                    let vb = centering.apply(b as usize, col, vb);
                    *dots.entry(b).or_insert(0.0) += va * vb;
                }
            }

            let mut sims = dots.into_iter()
                .filter_map(|(b, dot)| {
                    let den = norms[a] * norms[b as usize] + shrinkage;
                    if den <= 0.0 { return None; }
                    let sim = dot / den;
                    (sim > 0.0).then_some((b, sim))
                })
                .collect::<Vec<_>>();

            sims.sort_by(|x, y| {
                y.1.partial_cmp(&x.1)
                    .unwrap_or(Ordering::Equal)
                    .then(x.0.cmp(&y.0))
            });
            sims.truncate(k);
            sims.sort_unstable_by_key(|&(b, _)| b);
            sims
        })
        .collect()
}


/// Item-based k-nearest-neighbors.
/// Scores an item by the user's ratings of its most similar items.
pub struct ItemKnn {
    params: KnnParams,
    train: RatingMatrix,
    /// Per item: its neighbors sorted by item id.
    similarity: Vec<Vec<(u32, f64)>>,
    popularity: Vec<usize>,
    max_popularity: usize,
    global_mean: f64,
}


impl ItemKnn {
    /// Construct an unfitted instance of `ItemKnn`.
    pub fn new(params: KnnParams) -> Self {
        Self {
            params,
            train: RatingMatrix::new(0, 0),
            similarity: Vec::new(),
            popularity: Vec::new(),
            max_popularity: 0,
            global_mean: 0.0,
        }
    }


    /// Popularity-scaled fallback for users without a profile.
    fn fallback(&self, item: u32) -> f64 {
        if self.max_popularity == 0 {
            return 0.0;
        }
        let pop = self.popularity.get(item as usize).copied().unwrap_or(0);
        self.global_mean * pop as f64 / self.max_popularity as f64
    }
}


impl Recommender for ItemKnn {
    fn name(&self) -> &str {
        "item_knn"
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
        let centering = match self.params.similarity {
            Similarity::Cosine => Centering::None,
            Similarity::AdjustedCosine => Centering::PerColumn(row_means(train)),
            Similarity::Pearson => Centering::PerRow(row_means(&items)),
        };

        self.similarity = top_k_similarity(
            &items, &centering, self.params.k, self.params.shrinkage,
        );
        self.popularity = train.item_popularity();
        self.max_popularity = self.popularity.iter().copied().max().unwrap_or(0);
        self.global_mean = train.global_mean();
        self.train = train.clone();
        Ok(())
    }


    fn predict_score(&self, user: u32, item: u32) -> f64 {
        let profile = self.train.user_ratings(user);
        let Some(neighbors) = self.similarity.get(item as usize) else {
            return self.fallback(item);
        };
        if profile.is_empty() {
            return self.fallback(item);
        }

        let mut num = 0.0;
        let mut den = 0.0;
        for &(rated, rating) in profile {
            if let Ok(pos) = neighbors.binary_search_by_key(&rated, |&(j, _)| j) {
                let sim = neighbors[pos].1;
                num += sim * rating;
                den += sim.abs();
            }
        }

        if self.params.normalize && den > 0.0 {
            num / den
        } else {
            num
        }
    }
}


/// User-based k-nearest-neighbors.
/// Scores an item by the ratings its most similar users gave it.
pub struct UserKnn {
    params: KnnParams,
    train: RatingMatrix,
    /// Per user: its neighbors sorted by user id.
    similarity: Vec<Vec<(u32, f64)>>,
    popularity: Vec<usize>,
    max_popularity: usize,
    global_mean: f64,
}


impl UserKnn {
    /// Construct an unfitted instance of `UserKnn`.
    pub fn new(params: KnnParams) -> Self {
        Self {
            params,
            train: RatingMatrix::new(0, 0),
            similarity: Vec::new(),
            popularity: Vec::new(),
            max_popularity: 0,
            global_mean: 0.0,
        }
    }


    fn fallback(&self, item: u32) -> f64 {
        if self.max_popularity == 0 {
            return 0.0;
        }
        let pop = self.popularity.get(item as usize).copied().unwrap_or(0);
        self.global_mean * pop as f64 / self.max_popularity as f64
    }
}


impl Recommender for UserKnn {
    fn name(&self) -> &str {
        "user_knn"
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

        let centering = match self.params.similarity {
            Similarity::Cosine => Centering::None,
            Similarity::AdjustedCosine => {
                Centering::PerColumn(row_means(&train.transpose()))
            },
            Similarity::Pearson => Centering::PerRow(row_means(train)),
        };

        self.similarity = top_k_similarity(
            train, &centering, self.params.k, self.params.shrinkage,
        );
        self.popularity = train.item_popularity();
        self.max_popularity = self.popularity.iter().copied().max().unwrap_or(0);
        self.global_mean = train.global_mean();
        self.train = train.clone();
        Ok(())
    }


    fn predict_score(&self, user: u32, item: u32) -> f64 {
        let Some(neighbors) = self.similarity.get(user as usize) else {
            return self.fallback(item);
        };
        if neighbors.is_empty() {
            return self.fallback(item);
        }

        let mut num = 0.0;
        let mut den = 0.0;
        for &(other, sim) in neighbors {
            if let Some(rating) = self.train.get(other, item) {
                num += sim * rating;
                den += sim.abs();
            }
        }

        if self.params.normalize && den > 0.0 {
            num / den
        } else {
            num
        }
    }
}
