//! Struct `Evaluator` scores a fitted recommender on a held-out test
//! set, one user at a time and in parallel.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::recommender::Recommender;
use super::metrics::{
    average_precision,
    ndcg_at,
    precision_at,
    rank_auc,
    recall_at,
    reciprocal_rank,
};


/// One metric value per column of the evaluation file.
///
/// `rmse` averages over every test rating; the ranking metrics average
/// over users who have at least one relevant test item, and `roc_auc`
/// over users whose test set holds both a relevant and an irrelevant
/// item.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricSet {
    /// Root mean squared error of the predicted ratings.
    pub rmse: f64,
    /// Mean per-user area under the ROC curve.
    pub roc_auc: f64,
    /// Mean precision of the top-`at` list.
    pub precision: f64,
    /// Mean recall of the top-`at` list.
    pub recall: f64,
    /// Mean average precision.
    pub map: f64,
    /// Mean reciprocal rank of the first relevant item.
    pub mrr: f64,
    /// Mean normalized discounted cumulative gain.
    pub ndcg: f64,
}


impl MetricSet {
    /// Metric names in evaluation file column order.
    pub const NAMES: [&'static str; 7] = [
        "rmse", "roc_auc", "precision", "recall", "map", "mrr", "ndcg",
    ];


    /// Look a metric up by its column name.
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "rmse" => Some(self.rmse),
            "roc_auc" => Some(self.roc_auc),
            "precision" => Some(self.precision),
            "recall" => Some(self.recall),
            "map" => Some(self.map),
            "mrr" => Some(self.mrr),
            "ndcg" => Some(self.ndcg),
            _ => None,
        }
    }
}


/// Per-user partial sums, merged across the rayon workers.
#[derive(Default)]
struct Partial {
    sq_error: f64,
    n_ratings: usize,
    auc: f64,
    n_auc_users: usize,
    precision: f64,
    recall: f64,
    map: f64,
    mrr: f64,
    ndcg: f64,
    n_ranked_users: usize,
}


impl Partial {
    fn merge(mut self, other: Self) -> Self {
        self.sq_error += other.sq_error;
        self.n_ratings += other.n_ratings;
        self.auc += other.auc;
        self.n_auc_users += other.n_auc_users;
        self.precision += other.precision;
        self.recall += other.recall;
        self.map += other.map;
        self.mrr += other.mrr;
        self.ndcg += other.ndcg;
        self.n_ranked_users += other.n_ranked_users;
        self
    }
}


/// Evaluates recommenders against one test set.
///
/// ```no_run
/// use cotrec::prelude::*;
///
/// fn score(test: &Dataset, recommender: &dyn Recommender) -> MetricSet {
///     Evaluator::new(test)
///         .at(10)
///         .relevance_threshold(3.5)
///         .evaluate(recommender)
/// }
/// ```
pub struct Evaluator<'a> {
    test: &'a Dataset,
    at: usize,
    relevance_threshold: f64,
}


impl<'a> Evaluator<'a> {
    /// Construct an evaluator over `test` with a list length of 10 and
    /// a relevance threshold of 3.5.
    pub fn new(test: &'a Dataset) -> Self {
        Self { test, at: 10, relevance_threshold: 3.5 }
    }


    /// Set the recommendation list length.
    pub fn at(mut self, at: usize) -> Self {
        self.at = at;
        self
    }


    /// Set the rating at and above which a test item counts as
    /// relevant.
    pub fn relevance_threshold(mut self, threshold: f64) -> Self {
        self.relevance_threshold = threshold;
        self
    }


    /// Score `recommender` on every test user.
    pub fn evaluate<R>(&self, recommender: &R) -> MetricSet
        where R: Recommender + ?Sized,
    {
        let mut by_user = BTreeMap::<u32, Vec<(u32, f64)>>::new();
        for interaction in self.test.interactions() {
            by_user.entry(interaction.user)
                .or_default()
                .push((interaction.item, interaction.rating));
        }
        let by_user = by_user.into_iter().collect::<Vec<_>>();

        let total = by_user.par_iter()
            .map(|(user, ratings)| {
                self.evaluate_user(recommender, *user, ratings)
            })
            .reduce(Partial::default, Partial::merge);

        let ranked = total.n_ranked_users.max(1) as f64;
        MetricSet {
            rmse: (total.sq_error / total.n_ratings.max(1) as f64).sqrt(),
            roc_auc: total.auc / total.n_auc_users.max(1) as f64,
            precision: total.precision / ranked,
            recall: total.recall / ranked,
            map: total.map / ranked,
            mrr: total.mrr / ranked,
            ndcg: total.ndcg / ranked,
        }
    }


    fn evaluate_user<R>(
        &self,
        recommender: &R,
        user: u32,
        ratings: &[(u32, f64)],
    ) -> Partial
        where R: Recommender + ?Sized,
    {
        let mut partial = Partial::default();

        let mut relevant = Vec::new();
        let mut positive_scores = Vec::new();
        let mut negative_scores = Vec::new();
        for &(item, rating) in ratings {
            let score = recommender.predict_score(user, item);
            partial.sq_error += (score - rating).powi(2);
            partial.n_ratings += 1;
            if rating >= self.relevance_threshold {
                relevant.push(item);
                positive_scores.push(score);
            } else {
                negative_scores.push(score);
            }
        }
        relevant.sort_unstable();

        if !positive_scores.is_empty() && !negative_scores.is_empty() {
            partial.auc = rank_auc(&positive_scores, &negative_scores);
            partial.n_auc_users = 1;
        }

        if !relevant.is_empty() {
            let ranked = recommender.recommend_top_n(user, self.at, true);
            partial.precision = precision_at(&ranked, &relevant);
            partial.recall = recall_at(&ranked, &relevant);
            partial.map = average_precision(&ranked, &relevant);
            partial.mrr = reciprocal_rank(&ranked, &relevant);
            partial.ndcg = ndcg_at(&ranked, &relevant);
            partial.n_ranked_users = 1;
        }

        partial
    }
}
