//! Struct `Checkpoint` snapshots the mutable state of a co-training
//! run after each iteration.
//!
//! The base split is not stored: it is replayed from the run seed, so
//! a checkpoint only has to carry what the iterations accumulated.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::recommender::LabeledSample;


/// Everything a resumed run needs on top of the replayed split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Number of iterations already completed.
    pub iteration: usize,
    /// Labels the first recommender has received so far.
    pub labels_first: Vec<LabeledSample>,
    /// Labels the second recommender has received so far.
    pub labels_second: Vec<LabeledSample>,
    /// Pairs removed from the unlabeled universe, sorted by
    /// (user, item).
    pub consumed: Vec<(u32, u32)>,
}


impl Checkpoint {
    /// Serialize to a JSON file, replacing any previous snapshot.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        serde_json::to_writer(file, self).map_err(|e| Error::Parse {
            path: path.display().to_string(),
            line: 0,
            reason: e.to_string(),
        })
    }


    /// Deserialize a snapshot written by [`Checkpoint::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        serde_json::from_reader(file).map_err(|e| Error::Parse {
            path: path.display().to_string(),
            line: e.line(),
            reason: e.to_string(),
        })
    }
}
