use serde::{Deserialize, Serialize};

use super::matrix::RatingMatrix;


/// A single `(user, item, rating)` triple.
/// User and item ids are dense indices assigned by the reader.
/// Immutable once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Dense user index.
    pub user: u32,
    /// Dense item index.
    pub item: u32,
    /// Observed rating, possibly binarized by the reader.
    pub rating: f64,
}


/// An ordered collection of [`Interaction`]s together with the
/// number of distinct users and items.
/// Owned by the loader; read-only to downstream stages.
#[derive(Debug, Clone)]
pub struct Dataset {
    interactions: Vec<Interaction>,
    n_users: usize,
    n_items: usize,
}


impl Dataset {
    /// Construct a dataset from triples and known dimensions.
    /// Panics when a triple points outside the given shape.
    pub fn new(
        interactions: Vec<Interaction>,
        n_users: usize,
        n_items: usize,
    ) -> Self
    {
        let in_bounds = interactions.iter()
            .all(|r| (r.user as usize) < n_users && (r.item as usize) < n_items);
        assert!(in_bounds, "an interaction lies outside the {n_users}x{n_items} shape");

        Self { interactions, n_users, n_items }
    }


    /// Construct a dataset from triples,
    /// deriving the shape from the largest indices.
    pub fn from_interactions(interactions: Vec<Interaction>) -> Self {
        let n_users = interactions.iter()
            .map(|r| r.user as usize + 1)
            .max()
            .unwrap_or(0);
        let n_items = interactions.iter()
            .map(|r| r.item as usize + 1)
            .max()
            .unwrap_or(0);

        Self { interactions, n_users, n_items }
    }


    /// The interaction triples in load order.
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions[..]
    }


    /// Number of interactions.
    pub fn len(&self) -> usize {
        self.interactions.len()
    }


    /// `true` when the dataset holds no interaction.
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }


    /// Returns the pair of the number of users and the number of items.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_users, self.n_items)
    }


    /// Number of distinct users.
    pub fn n_users(&self) -> usize {
        self.n_users
    }


    /// Number of distinct items.
    pub fn n_items(&self) -> usize {
        self.n_items
    }


    /// A new dataset holding the interactions at the given indices,
    /// keeping the full shape so user/item ids stay comparable
    /// across partitions.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let interactions = indices.iter()
            .map(|&ix| self.interactions[ix])
            .collect();
        Self {
            interactions,
            n_users: self.n_users,
            n_items: self.n_items,
        }
    }


    /// Build the user-major sparse rating matrix over this dataset.
    pub fn to_matrix(&self) -> RatingMatrix {
        RatingMatrix::from_dataset(self)
    }
}
