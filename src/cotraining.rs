//! The files in `cotraining/` directory define the driver that
//! alternates two recommenders over a shared pool of unrated pairs,
//! plus the checkpoint format that lets a run resume.

mod driver;
mod checkpoint;

pub use self::driver::{
    CoTraining,
    LabelingPolicy,
    RunSummary,
    StopReason,
};
pub use self::checkpoint::Checkpoint;
