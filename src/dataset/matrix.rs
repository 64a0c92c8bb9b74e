use super::interaction::{Dataset, Interaction};


/// User-major sparse rating matrix.
/// Each row holds the user's `(item, rating)` pairs sorted by item id,
/// so lookups are binary searches and row scans stay cheap.
///
/// This is the view every recommender trains on. The co-training driver
/// injects pseudo-labels through [`RatingMatrix::set`].
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    n_users: usize,
    n_items: usize,
    rows: Vec<Vec<(u32, f64)>>,
    nnz: usize,
}


impl RatingMatrix {
    /// An empty matrix of the given shape.
    pub fn new(n_users: usize, n_items: usize) -> Self {
        Self {
            n_users,
            n_items,
            rows: vec![Vec::new(); n_users],
            nnz: 0,
        }
    }


    /// Build the matrix from a dataset.
    /// A pair rated twice keeps the last rating.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let (n_users, n_items) = dataset.shape();
        let mut matrix = Self::new(n_users, n_items);
        for r in dataset.interactions() {
            matrix.set(r.user, r.item, r.rating);
        }
        matrix
    }


    /// Returns the pair of the number of users and the number of items.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_users, self.n_items)
    }


    /// Number of stored ratings.
    pub fn nnz(&self) -> usize {
        self.nnz
    }


    /// The rating a user gave an item, if any.
    pub fn get(&self, user: u32, item: u32) -> Option<f64> {
        let row = self.rows.get(user as usize)?;
        row.binary_search_by_key(&item, |&(i, _)| i)
            .ok()
            .map(|pos| row[pos].1)
    }


    /// Insert or overwrite a rating.
    /// Rows stay sorted by item id.
    pub fn set(&mut self, user: u32, item: u32, rating: f64) {
        assert!(
            (user as usize) < self.n_users && (item as usize) < self.n_items,
            "({user}, {item}) lies outside the {}x{} shape",
            self.n_users, self.n_items,
        );
        let row = &mut self.rows[user as usize];
        match row.binary_search_by_key(&item, |&(i, _)| i) {
            Ok(pos) => row[pos].1 = rating,
            Err(pos) => {
                row.insert(pos, (item, rating));
                self.nnz += 1;
            },
        }
    }


    /// The user's `(item, rating)` pairs, sorted by item id.
    /// An out-of-range user yields an empty slice.
    pub fn user_ratings(&self, user: u32) -> &[(u32, f64)] {
        self.rows.get(user as usize)
            .map(|row| &row[..])
            .unwrap_or(&[])
    }


    /// Mean of all stored ratings. Zero for an empty matrix.
    pub fn global_mean(&self) -> f64 {
        if self.nnz == 0 {
            return 0.0;
        }
        let total = self.rows.iter()
            .flat_map(|row| row.iter().map(|&(_, r)| r))
            .sum::<f64>();
        total / self.nnz as f64
    }


    /// Number of ratings each item received.
    pub fn item_popularity(&self) -> Vec<usize> {
        let mut counts = vec![0_usize; self.n_items];
        for row in &self.rows {
            for &(item, _) in row {
                counts[item as usize] += 1;
            }
        }
        counts
    }


    /// The item-major transpose.
    /// Rows of the result are items, columns are users.
    pub fn transpose(&self) -> RatingMatrix {
        let mut cols = vec![Vec::new(); self.n_items];
        for (user, row) in self.rows.iter().enumerate() {
            for &(item, rating) in row {
                cols[item as usize].push((user as u32, rating));
            }
        }
        // Rows were scanned in ascending user order, so each column
        // is already sorted.
        RatingMatrix {
            n_users: self.n_items,
            n_items: self.n_users,
            rows: cols,
            nnz: self.nnz,
        }
    }


    /// Iterate over all stored triples in (user, item) order.
    pub fn iter(&self) -> impl Iterator<Item = Interaction> + '_ {
        self.rows.iter()
            .enumerate()
            .flat_map(|(user, row)| {
                row.iter().map(move |&(item, rating)| {
                    Interaction { user: user as u32, item, rating }
                })
            })
    }
}
