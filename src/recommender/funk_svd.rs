//! Provides `FunkSVD`: a latent-factor model fitted by stochastic
//! gradient descent on the observed ratings.

use rand::prelude::*;
use rand_distr::Normal;

use crate::dataset::RatingMatrix;
use crate::errors::{Error, Result};
use super::config::FunkSvdParams;
use super::core::Recommender;


/// FunkSVD factorizes the rating matrix into user and item factor
/// matrices and predicts by their dot product. Factors start from a
/// Normal(`init_mean`, `init_std`) draw and are refined by SGD with an
/// optionally decaying learning rate.
pub struct FunkSvd {
    params: FunkSvdParams,
    seed: u64,
    train: RatingMatrix,
    user_factors: Vec<Vec<f64>>,
    item_factors: Vec<Vec<f64>>,
    global_mean: f64,
}


impl FunkSvd {
    /// Construct an unfitted instance of `FunkSvd`.
    pub fn new(params: FunkSvdParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            train: RatingMatrix::new(0, 0),
            user_factors: Vec::new(),
            item_factors: Vec::new(),
            global_mean: 0.0,
        }
    }


    #[inline]
    fn dot(&self, user: usize, item: usize) -> f64 {
        self.user_factors[user].iter()
            .zip(&self.item_factors[item])
            .map(|(u, v)| u * v)
            .sum()
    }
}


impl Recommender for FunkSvd {
    fn name(&self) -> &str {
        "FunkSVD"
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

        let (n_users, n_items) = train.shape();
        let f = self.params.num_factors;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let normal = Normal::new(self.params.init_mean, self.params.init_std)
            .map_err(|e| Error::AdapterFit {
                name: self.name().to_string(),
                reason: format!("invalid init_std: {e}"),
            })?;

        let mut user_factors = (0..n_users)
            .map(|_| (0..f).map(|_| normal.sample(&mut rng)).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let mut item_factors = (0..n_items)
            .map(|_| (0..f).map(|_| normal.sample(&mut rng)).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        let mut triples = train.iter().collect::<Vec<_>>();
        let mut lrate = self.params.lrate;
        let reg = self.params.reg;

        for _ in 0..self.params.iters {
            triples.shuffle(&mut rng);

            for r in &triples {
                let (u, i) = (r.user as usize, r.item as usize);
                let predicted = user_factors[u].iter()
                    .zip(&item_factors[i])
                    .map(|(a, b)| a * b)
                    .sum::<f64>();
                let err = r.rating - predicted;

                for k in 0..f {
                    let uf = user_factors[u][k];
                    let vf = item_factors[i][k];
                    user_factors[u][k] += lrate * (err * vf - reg * uf);
                    item_factors[i][k] += lrate * (err * uf - reg * vf);
                }
            }

            lrate *= self.params.lrate_decay;
        }

        self.user_factors = user_factors;
        self.item_factors = item_factors;
        self.global_mean = train.global_mean();
        self.train = train.clone();
        Ok(())
    }


    fn predict_score(&self, user: u32, item: u32) -> f64 {
        let (user, item) = (user as usize, item as usize);
        if user >= self.user_factors.len() || item >= self.item_factors.len() {
            // No factors to speak for this pair.
            return self.global_mean;
        }
        self.dot(user, item)
    }
}
