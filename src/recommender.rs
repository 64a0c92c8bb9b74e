//! The files in `recommender/` directory define the `Recommender`
//! trait and the concrete adapters the co-training driver can pair.

mod core;
mod config;
mod knn;
mod funk_svd;
mod slim;
mod slim_bpr;
mod top_pop;

pub use self::core::{LabelThresholds, LabeledSample, Recommender};
pub use self::config::{
    BprParams,
    FunkSvdParams,
    KnnParams,
    RecommenderConfig,
    RecommenderName,
    Similarity,
    SlimParams,
};
pub use self::knn::{ItemKnn, UserKnn};
pub use self::funk_svd::FunkSvd;
pub use self::slim::Slim;
pub use self::slim_bpr::SlimBpr;
pub use self::top_pop::TopPop;
