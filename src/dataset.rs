//! The files in `dataset/` directory define the interaction table,
//! the delimited-file reader, and the sparse rating matrix.

mod interaction;
mod reader;
mod matrix;

pub use interaction::{Dataset, Interaction};
pub use reader::DatasetReader;
pub use matrix::RatingMatrix;
