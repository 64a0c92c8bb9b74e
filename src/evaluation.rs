//! The files in `evaluation/` directory measure fitted recommenders
//! against a held-out test set.

mod metrics;
mod evaluator;

pub use self::metrics::{
    average_precision,
    ndcg_at,
    precision_at,
    rank_auc,
    recall_at,
    reciprocal_rank,
};
pub use self::evaluator::{Evaluator, MetricSet};
