//! Provides `top_pop`, the non-personalized popularity baseline.

use crate::dataset::RatingMatrix;
use crate::errors::{Error, Result};
use super::core::{
    label_by_rank,
    LabelThresholds,
    LabeledSample,
    Recommender,
};


/// `TopPop` scores every item by its share of the most popular item's
/// rating count, independent of the user.
pub struct TopPop {
    train: RatingMatrix,
    popularity: Vec<usize>,
    max_popularity: usize,
}


impl TopPop {
    /// Construct an unfitted instance of `TopPop`.
    pub fn new() -> Self {
        Self {
            train: RatingMatrix::new(0, 0),
            popularity: Vec::new(),
            max_popularity: 0,
        }
    }
}


impl Default for TopPop {
    fn default() -> Self {
        Self::new()
    }
}


impl Recommender for TopPop {
    fn name(&self) -> &str {
        "top_pop"
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
        self.popularity = train.item_popularity();
        self.max_popularity = self.popularity.iter().copied().max().unwrap_or(0);
        self.train = train.clone();
        Ok(())
    }


    fn predict_score(&self, _user: u32, item: u32) -> f64 {
        if self.max_popularity == 0 {
            return 0.0;
        }
        let pop = self.popularity.get(item as usize).copied().unwrap_or(0);
        pop as f64 / self.max_popularity as f64
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
