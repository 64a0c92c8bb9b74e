//! Error taxonomy shared by every stage of the harness.

use thiserror::Error;

/// A specialized `Result` for this crate.
pub type Result<T> = std::result::Result<T, Error>;


/// Failures a run can hit.
///
/// Configuration and data errors are raised before any computation
/// starts. A shortfall of the unlabeled pool is *not* represented here:
/// the driver caps the request at what is available and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    /// An invalid CLI/parameter combination.
    /// The message names the offending parameter.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A malformed dataset, e.g. a missing column or an unparsable cell.
    #[error("invalid dataset: {0}")]
    Data(String),

    /// A recommender received degenerate input or failed to converge.
    #[error("failed to fit recommender `{name}`: {reason}")]
    AdapterFit {
        /// The enumerated name of the recommender.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// A malformed results/checkpoint file.
    #[error("{path}:{line}: {reason}")]
    Parse {
        /// File that failed to parse.
        path: String,
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// A chart could not be rendered.
    #[error("failed to render chart: {0}")]
    Chart(String),

    /// An underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}


impl From<polars::prelude::PolarsError> for Error {
    fn from(e: polars::prelude::PolarsError) -> Self {
        Error::Data(e.to_string())
    }
}
