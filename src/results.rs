//! The files in `results/` directory persist per-iteration outcomes as
//! CSV and read them back for aggregation and plotting.

mod writer;
mod reader;
mod plot;

pub use self::writer::{
    LabelComparison,
    ResultsWriter,
    EVALUATION_HEADER,
    LABEL_COMPARISON_FILE,
    LABEL_COMPARISON_HEADER,
    NUMBER_LABELED_FILE,
    NUMBER_LABELED_HEADER,
    POPULARITY_BINS_FILE,
    POPULARITY_BINS_HEADER,
};
pub use self::reader::{
    aggregate,
    aggregate_counts,
    read_counts,
    read_evaluation,
    CountRow,
    EvaluationRow,
};
pub use self::plot::plot_metric;
