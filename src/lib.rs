#![warn(missing_docs)]

//! A co-training harness for recommender systems.
//!
//! Two recommenders are fitted on the same sparse rating matrix; each
//! iteration, every recommender labels the unrated user-item pairs it
//! is most confident about and hands them to its peer as extra
//! training data. The harness provides the dataset loader, the
//! holdout and k-fold splitters, seven recommender adapters behind one
//! trait, the driver itself, and CSV results with aggregation and
//! plotting.
//!
//! ```no_run
//! use std::path::Path;
//! use cotrec::prelude::*;
//!
//! fn main() -> cotrec::Result<()> {
//!     let data = DatasetReader::new()
//!         .file("ml100k.csv")
//!         .separator(b',')
//!         .read()?;
//!     let (train, test) = HoldoutSplit::new(&data)
//!         .train_fraction(0.8)?
//!         .seed(1234)
//!         .split();
//!
//!     let first = RecommenderConfig::parse("item_knn".parse()?, None)?;
//!     let second = RecommenderConfig::parse("FunkSVD".parse()?, None)?;
//!     let mut writer = ResultsWriter::new(
//!         Path::new("results"), "evaluation.csv", 0, false,
//!     )?;
//!     CoTraining::new(first.build(1234), second.build(1234), &train, &test)
//!         .iterations(30)
//!         .verbose(true)
//!         .run(&mut writer)?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod dataset;
pub mod split;
pub mod recommender;
pub mod evaluation;
pub mod cotraining;
pub mod results;
pub mod prelude;

pub use errors::{Error, Result};
pub use dataset::{Dataset, DatasetReader, Interaction, RatingMatrix};
pub use split::{HoldoutSplit, KFold, UnlabeledPool};
pub use recommender::{
    LabelThresholds,
    LabeledSample,
    Recommender,
    RecommenderConfig,
    RecommenderName,
};
pub use evaluation::{Evaluator, MetricSet};
pub use cotraining::{CoTraining, LabelingPolicy, RunSummary, StopReason};
pub use results::ResultsWriter;
