use crate::matrix::UserItemMatrix;
use crate::util::{cosine_with_norms, norm};

/// Symmetric user x user cosine similarity table, indexed by the same user
/// IDs (same order) as the rows of the matrix it was computed from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimilarityMatrix {
    users: Vec<i64>,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Pairwise cosine similarity over every row pair. O(U^2 * I): this is
    /// rerun in full after every rating mutation and bounds how large the
    /// rating set can usefully grow.
    pub fn compute(matrix: &UserItemMatrix) -> Self {
        let n = matrix.n_users();
        let norms: Vec<f64> = (0..n).map(|row| norm(matrix.row(row))).collect();
        let mut values = vec![0.0; n * n];

        for a in 0..n {
            let row_a = matrix.row(a);
            for b in a..n {
                let sim = cosine_with_norms(row_a, matrix.row(b), norms[a], norms[b]);
                values[a * n + b] = sim;
                values[b * n + a] = sim;
            }
        }

        Self {
            users: matrix.users().to_vec(),
            values,
        }
    }

    pub fn users(&self) -> &[i64] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Similarities of `user_id` against every user, in `users()` order.
    pub fn row(&self, user_id: i64) -> Option<&[f64]> {
        let n = self.users.len();
        let idx = self.users.binary_search(&user_id).ok()?;
        Some(&self.values[idx * n..(idx + 1) * n])
    }

    pub fn get(&self, a: i64, b: i64) -> Option<f64> {
        let col = self.users.binary_search(&b).ok()?;
        self.row(a).map(|row| row[col])
    }
}
