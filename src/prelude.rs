//! Exports the types most runs touch.

pub use crate::errors::{Error, Result};
pub use crate::dataset::{
    Dataset,
    DatasetReader,
    Interaction,
    RatingMatrix,
};
pub use crate::split::{
    HoldoutSplit,
    KFold,
    UnlabeledPool,
};
pub use crate::recommender::{
    // The adapter trait and its label types
    LabelThresholds,
    LabeledSample,
    Recommender,

    // Name/parameter parsing
    BprParams,
    FunkSvdParams,
    KnnParams,
    RecommenderConfig,
    RecommenderName,
    Similarity,
    SlimParams,

    // Concrete adapters
    FunkSvd,
    ItemKnn,
    Slim,
    SlimBpr,
    TopPop,
    UserKnn,
};
pub use crate::evaluation::{Evaluator, MetricSet};
pub use crate::cotraining::{
    Checkpoint,
    CoTraining,
    LabelingPolicy,
    RunSummary,
    StopReason,
};
pub use crate::results::{
    aggregate,
    plot_metric,
    read_evaluation,
    EvaluationRow,
    LabelComparison,
    ResultsWriter,
};
