//! Ranking and rating-accuracy metrics computed per user over a
//! recommendation list.
//!
//! Every function takes the ranked list as item ids and the relevant
//! set as a sorted slice, so membership tests are binary searches.

/// Fraction of the recommended items that are relevant.
/// Returns `0.0` for an empty list.
#[inline]
pub fn precision_at(ranked: &[u32], relevant: &[u32]) -> f64 {
    if ranked.is_empty() {
        return 0.0;
    }
    let hits = ranked.iter()
        .filter(|item| relevant.binary_search(item).is_ok())
        .count();
    hits as f64 / ranked.len() as f64
}


/// Fraction of the relevant items that were recommended.
/// Returns `0.0` when nothing is relevant.
#[inline]
pub fn recall_at(ranked: &[u32], relevant: &[u32]) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = ranked.iter()
        .filter(|item| relevant.binary_search(item).is_ok())
        .count();
    hits as f64 / relevant.len() as f64
}


/// Average of the precisions at each rank that holds a relevant item,
/// normalized by the number of relevant items reachable in the list.
pub fn average_precision(ranked: &[u32], relevant: &[u32]) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }

    let mut hits = 0_usize;
    let mut acc = 0.0;
    for (pos, item) in ranked.iter().enumerate() {
        if relevant.binary_search(item).is_ok() {
            hits += 1;
            acc += hits as f64 / (pos + 1) as f64;
        }
    }
    acc / relevant.len().min(ranked.len().max(1)) as f64
}


/// Reciprocal of the rank of the first relevant item, `0.0` if the
/// list holds none.
pub fn reciprocal_rank(ranked: &[u32], relevant: &[u32]) -> f64 {
    ranked.iter()
        .position(|item| relevant.binary_search(item).is_ok())
        .map(|pos| 1.0 / (pos + 1) as f64)
        .unwrap_or(0.0)
}


/// Normalized discounted cumulative gain with binary gains: each
/// relevant item at rank `r` contributes `1 / log2(r + 2)`, divided by
/// the gain of the ideal ordering.
pub fn ndcg_at(ranked: &[u32], relevant: &[u32]) -> f64 {
    if relevant.is_empty() || ranked.is_empty() {
        return 0.0;
    }

    let dcg = ranked.iter()
        .enumerate()
        .filter(|(_, item)| relevant.binary_search(item).is_ok())
        .map(|(pos, _)| 1.0 / ((pos + 2) as f64).log2())
        .sum::<f64>();
    let ideal = (0..relevant.len().min(ranked.len()))
        .map(|pos| 1.0 / ((pos + 2) as f64).log2())
        .sum::<f64>();
    dcg / ideal
}


/// Probability that a randomly drawn relevant item scores above a
/// randomly drawn irrelevant one (the Mann-Whitney estimate of the
/// area under the ROC curve). Ties count half.
pub fn rank_auc(positive_scores: &[f64], negative_scores: &[f64]) -> f64 {
    if positive_scores.is_empty() || negative_scores.is_empty() {
        return 0.5;
    }

    let mut wins = 0.0;
    for &pos in positive_scores {
        for &neg in negative_scores {
            if pos > neg {
                wins += 1.0;
            } else if pos == neg {
                wins += 0.5;
            }
        }
    }
    wins / (positive_scores.len() * negative_scores.len()) as f64
}
