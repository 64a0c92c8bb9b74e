use std::collections::HashMap;
use std::path::Path;

use polars::prelude::*;

use crate::errors::{Error, Result};
use super::interaction::{Dataset, Interaction};


/// A builder that reads a delimited user/item/rating table
/// into a [`Dataset`].
///
/// Raw user and item ids (numeric or not) are mapped to dense indices
/// in order of first appearance, so the same file always yields the
/// same index assignment.
///
/// # Example
/// ```no_run
/// use cotrec::DatasetReader;
///
/// let dataset = DatasetReader::new()
///     .file("ml-100k/u.data")
///     .separator(b'\t')
///     .has_header(false)
///     .read()?;
/// # Ok::<(), cotrec::Error>(())
/// ```
pub struct DatasetReader<P> {
    file: Option<P>,
    separator: u8,
    has_header: bool,
    user_key: String,
    item_key: String,
    rating_key: String,
    make_binary: bool,
    binary_th: f64,
}


impl<P> Default for DatasetReader<P> {
    fn default() -> Self {
        Self::new()
    }
}


impl<P> DatasetReader<P> {
    /// Construct a new instance of [`DatasetReader`].
    pub fn new() -> Self {
        Self {
            file: None,
            separator: b',',
            has_header: true,
            user_key: String::from("user_id"),
            item_key: String::from("item_id"),
            rating_key: String::from("rating"),
            make_binary: false,
            binary_th: 4.0,
        }
    }


    /// Set the field separator. Default is `b','`.
    pub fn separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }


    /// Set the flag whether the file has a header row or not.
    /// Default is `true`. Without a header the first three columns
    /// are taken as user, item, and rating, in that order.
    pub fn has_header(mut self, flag: bool) -> Self {
        self.has_header = flag;
        self
    }


    /// Set the name of the user column. Default is `user_id`.
    pub fn user_key<S: AsRef<str>>(mut self, key: S) -> Self {
        self.user_key = key.as_ref().to_string();
        self
    }


    /// Set the name of the item column. Default is `item_id`.
    pub fn item_key<S: AsRef<str>>(mut self, key: S) -> Self {
        self.item_key = key.as_ref().to_string();
        self
    }


    /// Set the name of the rating column. Default is `rating`.
    pub fn rating_key<S: AsRef<str>>(mut self, key: S) -> Self {
        self.rating_key = key.as_ref().to_string();
        self
    }


    /// Binarize the ratings against a threshold:
    /// rows rating at least `binary_th` are kept with rating `1.0`,
    /// the rest are dropped.
    pub fn make_binary(mut self, flag: bool, binary_th: f64) -> Self {
        self.make_binary = flag;
        self.binary_th = binary_th;
        self
    }
}


impl<P> DatasetReader<P>
    where P: AsRef<Path>
{
    /// Set the file name.
    pub fn file(mut self, file: P) -> Self {
        self.file = Some(file);
        self
    }


    /// Read the file based on the arguments and return a [`Dataset`].
    /// This method consumes `self`.
    pub fn read(self) -> Result<Dataset> {
        let file = self.file
            .as_ref()
            .ok_or_else(|| Error::Configuration(
                String::from("dataset: no input file was set")
            ))?;
        let df = CsvReader::from_path(file.as_ref())?
            .has_header(self.has_header)
            .with_separator(self.separator)
            .finish()?;

        let (users, items, ratings) = if self.has_header {
            (
                named_column(&df, &self.user_key)?,
                named_column(&df, &self.item_key)?,
                named_column(&df, &self.rating_key)?,
            )
        } else {
            (
                positional_column(&df, 0)?,
                positional_column(&df, 1)?,
                positional_column(&df, 2)?,
            )
        };

        let users = id_column(users)?;
        let items = id_column(items)?;
        let ratings = rating_column(ratings)?;

        let mut user_to_index = HashMap::<String, u32>::new();
        let mut item_to_index = HashMap::<String, u32>::new();
        let mut interactions = Vec::with_capacity(ratings.len());

        for ((user, item), rating) in users.into_iter()
            .zip(items)
            .zip(ratings)
        {
            let rating = if self.make_binary {
                if rating < self.binary_th { continue; }
                1.0
            } else {
                rating
            };

            let next = user_to_index.len() as u32;
            let user = *user_to_index.entry(user).or_insert(next);
            let next = item_to_index.len() as u32;
            let item = *item_to_index.entry(item).or_insert(next);

            interactions.push(Interaction { user, item, rating });
        }

        if interactions.is_empty() {
            return Err(Error::Data(format!(
                "{}: the file holds no interaction", display(file),
            )));
        }

        let n_users = user_to_index.len();
        let n_items = item_to_index.len();
        Ok(Dataset::new(interactions, n_users, n_items))
    }
}


fn display<P: AsRef<Path>>(path: P) -> String {
    path.as_ref().display().to_string()
}


fn named_column<'a>(df: &'a DataFrame, key: &str) -> Result<&'a Series> {
    df.column(key)
        .map_err(|_| Error::Data(format!(
            "missing required column `{key}`; available columns are [{}]",
            df.get_column_names().join(", "),
        )))
}


fn positional_column(df: &DataFrame, index: usize) -> Result<&Series> {
    df.get_columns()
        .get(index)
        .ok_or_else(|| Error::Data(format!(
            "the file has {} columns; at least {} are required",
            df.width(),
            index + 1,
        )))
}


/// Raw ids of any dtype become strings so that numeric and
/// non-numeric id spaces are handled alike.
fn id_column(series: &Series) -> Result<Vec<String>> {
    let name = series.name().to_string();
    let casted = series.cast(&DataType::Utf8)?;
    casted.utf8()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(str::to_string)
                .ok_or_else(|| Error::Data(format!(
                    "column `{name}`, row {row}: missing id"
                )))
        })
        .collect()
}


fn rating_column(series: &Series) -> Result<Vec<f64>> {
    let name = series.name().to_string();
    let casted = series.cast(&DataType::Float64)?;
    casted.f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| Error::Data(format!(
                "column `{name}`, row {row}: missing rating"
            )))
        })
        .collect()
}
