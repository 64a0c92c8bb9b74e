//! Provides the `Recommender` trait.

use std::cmp::Ordering;

use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};

use crate::dataset::RatingMatrix;
use crate::errors::Result;


/// A pseudo-label one recommender proposes for its peer:
/// an unrated pair together with the predicted rating and the
/// confidence the labeler assigns to it.
/// Produced each co-training iteration and consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    /// Dense user index.
    pub user: u32,
    /// Dense item index.
    pub item: u32,
    /// Predicted rating, clamped to the rating scale.
    pub rating: f64,
    /// Distance of the raw score from the neutral band;
    /// larger means more confident.
    pub confidence: f64,
}


/// The score bands that turn raw predictions into positive/negative
/// pseudo-labels, together with the rating scale labels are clamped to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelThresholds {
    /// Scores at least this value are positive candidates.
    pub positive: f64,
    /// Scores at most this value are negative candidates.
    pub negative: f64,
    /// Lower end of the rating scale.
    pub rating_min: f64,
    /// Upper end of the rating scale.
    pub rating_max: f64,
}


impl LabelThresholds {
    /// Bands for an explicit 1-5 star scale:
    /// positive at 3.5 and above, negative at 2.5 and below.
    pub fn explicit() -> Self {
        Self { positive: 3.5, negative: 2.5, rating_min: 1.0, rating_max: 5.0 }
    }


    /// Bands for an implicit 0/1 scale:
    /// positive at 0.75 and above, negative below.
    pub fn binary() -> Self {
        Self { positive: 0.75, negative: 0.75, rating_min: 0.0, rating_max: 1.0 }
    }


    fn midpoint(&self) -> f64 {
        (self.positive + self.negative) / 2.0
    }
}


/// The uniform interface both co-training peers are driven through.
///
/// You need to implement [`Recommender::fit`],
/// [`Recommender::predict_score`], [`Recommender::train_matrix`],
/// and [`Recommender::name`]; ranking, labeling, and label
/// incorporation have default implementations on top of those.
///
/// `fit` and `incorporate_labels` mutate only the adapter's own state,
/// so independent runs never share anything mutable.
pub trait Recommender: Send + Sync {
    /// The enumerated name this adapter is registered under.
    fn name(&self) -> &str;


    /// The training matrix the adapter was last fitted on.
    fn train_matrix(&self) -> &RatingMatrix;


    /// Build the model state from a training matrix.
    fn fit(&mut self, train: &RatingMatrix) -> Result<()>;


    /// Predicted preference of a user for an item.
    /// An unseen user or item yields a defined fallback score
    /// (popularity or the global mean), never an error.
    fn predict_score(&self, user: u32, item: u32) -> f64;


    /// Predicted preference of a user for every item.
    fn user_scores(&self, user: u32) -> Vec<f64> {
        let n_items = self.train_matrix().shape().1;
        (0..n_items as u32)
            .map(|item| self.predict_score(user, item))
            .collect()
    }


    /// Top-`n` recommendation list for a user, ranked by descending
    /// score with (item id) as the deterministic tie-break.
    fn recommend_top_n(
        &self,
        user: u32,
        n: usize,
        exclude_seen: bool,
    ) -> Vec<u32>
    {
        let scores = self.user_scores(user);

        let mut seen = FixedBitSet::with_capacity(scores.len());
        if exclude_seen {
            for &(item, _) in self.train_matrix().user_ratings(user) {
                seen.insert(item as usize);
            }
        }

        let mut ranking = (0..scores.len() as u32)
            .filter(|&item| !seen.contains(item as usize))
            .collect::<Vec<_>>();
        ranking.sort_by(|&a, &b| {
            scores[b as usize].partial_cmp(&scores[a as usize])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });
        ranking.truncate(n);
        ranking
    }


    /// Splice pseudo-labels into the training matrix and rebuild the
    /// model state. The default performs a full refit; adapters with a
    /// cheaper incremental update may override this.
    fn incorporate_labels(&mut self, labels: &[LabeledSample]) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }
        let mut train = self.train_matrix().clone();
        for label in labels {
            train.set(label.user, label.item, label.rating);
        }
        self.fit(&train)
    }


    /// Rate the candidate pairs and keep the `p` most confidently
    /// positive and `n` most confidently negative predictions.
    ///
    /// Candidates outside both score bands are dropped. Equal scores
    /// break ties by (user, item) ascending, and the returned labels
    /// are sorted by (user, item) as well, so a fixed seed reproduces
    /// the exact label sequence.
    fn label(
        &self,
        candidates: &[(u32, u32)],
        p: usize,
        n: usize,
        thresholds: &LabelThresholds,
    ) -> Vec<LabeledSample>
    {
        let midpoint = thresholds.midpoint();
        let mut positives = Vec::new();
        let mut negatives = Vec::new();

        for &(user, item) in candidates {
            let score = self.predict_score(user, item);
            if score >= thresholds.positive {
                positives.push((score, user, item));
            } else if score <= thresholds.negative {
                negatives.push((score, user, item));
            }
        }

        positives.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then((a.1, a.2).cmp(&(b.1, b.2)))
        });
        negatives.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then((a.1, a.2).cmp(&(b.1, b.2)))
        });
        positives.truncate(p);
        negatives.truncate(n);

        let mut labels = positives.into_iter()
            .map(|(score, user, item)| LabeledSample {
                user,
                item,
                rating: score.min(thresholds.rating_max),
                confidence: (score - midpoint).abs(),
            })
            .chain(negatives.into_iter().map(|(score, user, item)| {
                LabeledSample {
                    user,
                    item,
                    rating: score.max(thresholds.rating_min),
                    confidence: (score - midpoint).abs(),
                }
            }))
            .collect::<Vec<_>>();

        labels.sort_by_key(|l| (l.user, l.item));
        labels
    }
}


/// Rank-based labeling for adapters whose scores are not on the rating
/// scale (ranking-loss and popularity models): the top `p` candidates
/// by score become maximal ratings, the bottom `n` minimal ones.
pub(crate) fn label_by_rank<R>(
    recommender: &R,
    candidates: &[(u32, u32)],
    p: usize,
    n: usize,
    thresholds: &LabelThresholds,
) -> Vec<LabeledSample>
    where R: Recommender + ?Sized,
{
    let mut scored = candidates.iter()
        .map(|&(user, item)| {
            (recommender.predict_score(user, item), user, item)
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(Ordering::Equal)
            .then((a.1, a.2).cmp(&(b.1, b.2)))
    });

    // Never hand the same pair out as both positive and negative.
    let n = n.min(scored.len());
    let p = p.min(scored.len() - n);

    let positives = scored.iter()
        .rev()
        .take(p)
        .map(|&(score, user, item)| LabeledSample {
            user,
            item,
            rating: thresholds.rating_max,
            confidence: score,
        });
    let negatives = scored.iter()
        .take(n)
        .map(|&(score, user, item)| LabeledSample {
            user,
            item,
            rating: thresholds.rating_min,
            confidence: -score,
        });

    let mut labels = positives.chain(negatives).collect::<Vec<_>>();
    labels.sort_by_key(|l| (l.user, l.item));
    labels
}
