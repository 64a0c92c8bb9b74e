//! The files in `split/` directory define the holdout and k-fold
//! partitioners and the unlabeled pool used for co-training.

mod holdout;
mod kfold;
mod pool;

pub use holdout::HoldoutSplit;
pub use kfold::KFold;
pub use pool::UnlabeledPool;
