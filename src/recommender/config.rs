//! Typed recommender selection and hyperparameter parsing.
//!
//! The CLI selects recommenders by an enumerated name and passes
//! hyperparameters as a `key=value,...` string. Both are resolved once
//! at configuration time: the name becomes a [`RecommenderName`]
//! variant, the string a [`RecommenderConfig`] with named, typed
//! fields, and any unrecognized key fails validation instead of being
//! silently ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use super::core::Recommender;
use super::funk_svd::FunkSvd;
use super::knn::{ItemKnn, UserKnn};
use super::slim::Slim;
use super::slim_bpr::SlimBpr;
use super::top_pop::TopPop;


/// The closed set of recommender names the CLI accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommenderName {
    /// Item-based k-nearest-neighbors.
    ItemKnn,
    /// User-based k-nearest-neighbors.
    UserKnn,
    /// Latent factors fitted by stochastic gradient descent.
    FunkSvd,
    /// Sparse linear regression over item co-occurrences.
    Slim,
    /// `Slim` solving its item subproblems in parallel.
    SlimMt,
    /// Sparse linear model under the BPR pairwise ranking loss.
    SlimBpr,
    /// Popularity baseline.
    TopPop,
}


const NAMES: [(&str, RecommenderName); 7] = [
    ("item_knn", RecommenderName::ItemKnn),
    ("user_knn", RecommenderName::UserKnn),
    ("FunkSVD", RecommenderName::FunkSvd),
    ("SLIM", RecommenderName::Slim),
    ("SLIM_mt", RecommenderName::SlimMt),
    ("SLIM_BPR", RecommenderName::SlimBpr),
    ("top_pop", RecommenderName::TopPop),
];


impl FromStr for RecommenderName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NAMES.iter()
            .find(|(name, _)| *name == s)
            .map(|&(_, variant)| variant)
            .ok_or_else(|| {
                let known = NAMES.map(|(name, _)| name).join(", ");
                Error::Configuration(format!(
                    "unknown recommender `{s}`; expected one of [{known}]"
                ))
            })
    }
}


impl fmt::Display for RecommenderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = NAMES.iter()
            .find(|(_, variant)| variant == self)
            .map(|(name, _)| *name)
            .unwrap();
        write!(f, "{name}")
    }
}


/// Similarity metric for the neighborhood models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Similarity {
    /// Plain cosine over co-rated entries.
    #[default]
    Cosine,
    /// Cosine after subtracting each rater's mean.
    AdjustedCosine,
    /// Pearson correlation (subtracts the compared vector's mean).
    Pearson,
}


impl FromStr for Similarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cosine" => Ok(Self::Cosine),
            "adjusted_cosine" => Ok(Self::AdjustedCosine),
            "pearson" => Ok(Self::Pearson),
            _ => Err(Error::Configuration(format!(
                "unknown similarity `{s}`; expected one of \
                 [cosine, adjusted_cosine, pearson]"
            ))),
        }
    }
}


/// Hyperparameters of the neighborhood models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnnParams {
    /// Number of neighbors kept per row. Default `50`.
    pub k: usize,
    /// Shrinkage added to the similarity denominator. Default `10.0`.
    pub shrinkage: f64,
    /// Similarity metric. Default cosine.
    pub similarity: Similarity,
    /// Normalize predictions by the summed similarity. Default `true`.
    pub normalize: bool,
}


impl Default for KnnParams {
    fn default() -> Self {
        Self {
            k: 50,
            shrinkage: 10.0,
            similarity: Similarity::Cosine,
            normalize: true,
        }
    }
}


impl KnnParams {
    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "k" => self.k = parse(key, value)?,
            "shrinkage" => self.shrinkage = parse(key, value)?,
            "similarity" => self.similarity = value.parse()?,
            "normalize" => self.normalize = parse(key, value)?,
            _ => return Err(unknown_key(key, "item_knn/user_knn")),
        }
        Ok(())
    }
}


/// Hyperparameters of the `FunkSVD` latent-factor model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunkSvdParams {
    /// Number of latent factors. Default `50`.
    pub num_factors: usize,
    /// Initial SGD learning rate. Default `0.01`.
    pub lrate: f64,
    /// L2 regularization. Default `0.015`.
    pub reg: f64,
    /// SGD epochs per fit. Default `10`.
    pub iters: usize,
    /// Mean of the factor initialization. Default `0.0`.
    pub init_mean: f64,
    /// Standard deviation of the factor initialization. Default `0.1`.
    pub init_std: f64,
    /// Multiplicative learning-rate decay per epoch. Default `1.0`.
    pub lrate_decay: f64,
}


impl Default for FunkSvdParams {
    fn default() -> Self {
        Self {
            num_factors: 50,
            lrate: 0.01,
            reg: 0.015,
            iters: 10,
            init_mean: 0.0,
            init_std: 0.1,
            lrate_decay: 1.0,
        }
    }
}


impl FunkSvdParams {
    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "num_factors" => self.num_factors = parse(key, value)?,
            "lrate" => self.lrate = parse(key, value)?,
            "reg" => self.reg = parse(key, value)?,
            "iters" => self.iters = parse(key, value)?,
            "init_mean" => self.init_mean = parse(key, value)?,
            "init_std" => self.init_std = parse(key, value)?,
            "lrate_decay" => self.lrate_decay = parse(key, value)?,
            _ => return Err(unknown_key(key, "FunkSVD")),
        }
        Ok(())
    }
}


/// Hyperparameters of the SLIM models.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlimParams {
    /// L1 penalty of the elastic net. Default `0.001`.
    pub l1_reg: f64,
    /// L2 penalty of the elastic net. Default `0.001`.
    pub l2_reg: f64,
    /// Coordinate-descent sweeps per item. Default `10`.
    pub iters: usize,
}


impl Default for SlimParams {
    fn default() -> Self {
        Self { l1_reg: 0.001, l2_reg: 0.001, iters: 10 }
    }
}


impl SlimParams {
    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "l1_reg" => self.l1_reg = parse(key, value)?,
            "l2_reg" => self.l2_reg = parse(key, value)?,
            "iters" => self.iters = parse(key, value)?,
            _ => return Err(unknown_key(key, "SLIM/SLIM_mt")),
        }
        Ok(())
    }
}


/// Hyperparameters of the `SLIM_BPR` ranking model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BprParams {
    /// SGD epochs per fit. Default `10`.
    pub iters: usize,
    /// Learning rate. Default `0.05`.
    pub lrate: f64,
    /// Regularization of the positive item's weights. Default `0.0025`.
    pub reg_positive: f64,
    /// Regularization of the negative item's weights. Default `0.00025`.
    pub reg_negative: f64,
    /// Weights kept per item after training. Default `100`.
    pub top_k: usize,
}


impl Default for BprParams {
    fn default() -> Self {
        Self {
            iters: 10,
            lrate: 0.05,
            reg_positive: 0.0025,
            reg_negative: 0.000_25,
            top_k: 100,
        }
    }
}


impl BprParams {
    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "iters" => self.iters = parse(key, value)?,
            "lrate" => self.lrate = parse(key, value)?,
            "reg_positive" => self.reg_positive = parse(key, value)?,
            "reg_negative" => self.reg_negative = parse(key, value)?,
            "top_k" => self.top_k = parse(key, value)?,
            _ => return Err(unknown_key(key, "SLIM_BPR")),
        }
        Ok(())
    }
}


/// A fully resolved recommender choice: the variant picked at
/// configuration time together with its typed hyperparameters.
/// Building an adapter from it never touches a string again.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommenderConfig {
    /// Item-based k-nearest-neighbors.
    ItemKnn(KnnParams),
    /// User-based k-nearest-neighbors.
    UserKnn(KnnParams),
    /// FunkSVD latent factors.
    FunkSvd(FunkSvdParams),
    /// Sequential SLIM.
    Slim(SlimParams),
    /// Multi-threaded SLIM.
    SlimMt(SlimParams),
    /// SLIM under the BPR ranking loss.
    SlimBpr(BprParams),
    /// Popularity baseline; takes no hyperparameters.
    TopPop,
}


impl RecommenderConfig {
    /// Resolve a recommender name and an optional `key=value,...`
    /// string into a typed configuration. Unknown keys and malformed
    /// pairs fail with a configuration error.
    pub fn parse(name: RecommenderName, params: Option<&str>) -> Result<Self> {
        let pairs = key_value_pairs(params)?;

        match name {
            RecommenderName::ItemKnn => {
                let mut p = KnnParams::default();
                for (k, v) in pairs { p.apply(k, v)?; }
                Ok(Self::ItemKnn(p))
            },
            RecommenderName::UserKnn => {
                let mut p = KnnParams::default();
                for (k, v) in pairs { p.apply(k, v)?; }
                Ok(Self::UserKnn(p))
            },
            RecommenderName::FunkSvd => {
                let mut p = FunkSvdParams::default();
                for (k, v) in pairs { p.apply(k, v)?; }
                Ok(Self::FunkSvd(p))
            },
            RecommenderName::Slim => {
                let mut p = SlimParams::default();
                for (k, v) in pairs { p.apply(k, v)?; }
                Ok(Self::Slim(p))
            },
            RecommenderName::SlimMt => {
                let mut p = SlimParams::default();
                for (k, v) in pairs { p.apply(k, v)?; }
                Ok(Self::SlimMt(p))
            },
            RecommenderName::SlimBpr => {
                let mut p = BprParams::default();
                for (k, v) in pairs { p.apply(k, v)?; }
                Ok(Self::SlimBpr(p))
            },
            RecommenderName::TopPop => {
                if let Some((key, _)) = pairs.first() {
                    return Err(unknown_key(key, "top_pop"));
                }
                Ok(Self::TopPop)
            },
        }
    }


    /// The name this configuration was resolved from.
    pub fn name(&self) -> RecommenderName {
        match self {
            Self::ItemKnn(_) => RecommenderName::ItemKnn,
            Self::UserKnn(_) => RecommenderName::UserKnn,
            Self::FunkSvd(_) => RecommenderName::FunkSvd,
            Self::Slim(_) => RecommenderName::Slim,
            Self::SlimMt(_) => RecommenderName::SlimMt,
            Self::SlimBpr(_) => RecommenderName::SlimBpr,
            Self::TopPop => RecommenderName::TopPop,
        }
    }


    /// Build an unfitted adapter.
    /// `seed` only matters to the SGD-based models.
    pub fn build(&self, seed: u64) -> Box<dyn Recommender> {
        match *self {
            Self::ItemKnn(p) => Box::new(ItemKnn::new(p)),
            Self::UserKnn(p) => Box::new(UserKnn::new(p)),
            Self::FunkSvd(p) => Box::new(FunkSvd::new(p, seed)),
            Self::Slim(p) => Box::new(Slim::new(p)),
            Self::SlimMt(p) => Box::new(Slim::new(p).parallel(true)),
            Self::SlimBpr(p) => Box::new(SlimBpr::new(p, seed)),
            Self::TopPop => Box::new(TopPop::new()),
        }
    }
}


fn key_value_pairs(params: Option<&str>) -> Result<Vec<(&str, &str)>> {
    let Some(params) = params else { return Ok(Vec::new()); };
    let params = params.trim();
    if params.is_empty() {
        return Ok(Vec::new());
    }

    params.split(',')
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| Error::Configuration(format!(
                    "malformed hyperparameter `{pair}`; \
                     expected `key=value`"
                )))
        })
        .collect()
}


fn unknown_key(key: &str, recommender: &str) -> Error {
    Error::Configuration(format!(
        "unknown hyperparameter `{key}` for recommender `{recommender}`"
    ))
}


fn parse<T>(key: &str, value: &str) -> Result<T>
    where T: FromStr,
          T::Err: fmt::Display,
{
    value.parse().map_err(|e| Error::Configuration(format!(
        "hyperparameter `{key}`: cannot parse `{value}` ({e})"
    )))
}
