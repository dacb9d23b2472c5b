use std::collections::BTreeSet;

use crate::types::Rating;

/// Dense user x item table derived from the rating set.
///
/// Rows are the distinct user IDs and columns the distinct item IDs that
/// appear in the ratings, both ascending. A cell holds the rating value, or
/// `0.0` when the user never rated the item. Users and items that are only
/// registered (no ratings) have no row or column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserItemMatrix {
    users: Vec<i64>,
    items: Vec<i64>,
    values: Vec<f64>,
}

impl UserItemMatrix {
    /// Build the matrix from ratings in insertion order. When the same
    /// (user, item) pair was rated more than once, the last rating wins.
    pub fn build(ratings: &[Rating]) -> Self {
        let users: Vec<i64> = ratings
            .iter()
            .map(|r| r.user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let items: Vec<i64> = ratings
            .iter()
            .map(|r| r.item_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut values = vec![0.0; users.len() * items.len()];
        for r in ratings {
            if let (Ok(row), Ok(col)) = (
                users.binary_search(&r.user_id),
                items.binary_search(&r.item_id),
            ) {
                values[row * items.len() + col] = r.value;
            }
        }

        Self {
            users,
            items,
            values,
        }
    }

    pub fn users(&self) -> &[i64] {
        &self.users
    }

    pub fn items(&self) -> &[i64] {
        &self.items
    }

    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn row_index(&self, user_id: i64) -> Option<usize> {
        self.users.binary_search(&user_id).ok()
    }

    pub fn col_index(&self, item_id: i64) -> Option<usize> {
        self.items.binary_search(&item_id).ok()
    }

    /// Row by position. Panics if `row >= n_users()`.
    pub fn row(&self, row: usize) -> &[f64] {
        let width = self.items.len();
        &self.values[row * width..(row + 1) * width]
    }

    pub fn user_row(&self, user_id: i64) -> Option<&[f64]> {
        self.row_index(user_id).map(|row| self.row(row))
    }

    /// Cell value, `None` when the user or the item has no ratings at all.
    pub fn get(&self, user_id: i64, item_id: i64) -> Option<f64> {
        let row = self.row_index(user_id)?;
        let col = self.col_index(item_id)?;
        Some(self.values[row * self.items.len() + col])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings() -> Vec<Rating> {
        vec![
            Rating::new(2, 20, 3.0),
            Rating::new(1, 10, 5.0),
            Rating::new(3, 30, 1.0),
            Rating::new(1, 30, 4.0),
        ]
    }

    #[test]
    fn test_index_sets_are_sorted_and_distinct() {
        let m = UserItemMatrix::build(&ratings());
        assert_eq!(m.users(), &[1, 2, 3]);
        assert_eq!(m.items(), &[10, 20, 30]);
        assert_eq!(m.n_users(), 3);
        assert_eq!(m.n_items(), 3);
    }

    #[test]
    fn test_missing_cells_are_zero() {
        let m = UserItemMatrix::build(&ratings());
        assert_eq!(m.user_row(1).unwrap(), &[5.0, 0.0, 4.0]);
        assert_eq!(m.user_row(2).unwrap(), &[0.0, 3.0, 0.0]);
        assert_eq!(m.get(3, 10), Some(0.0));
    }

    #[test]
    fn test_unknown_ids_have_no_cell() {
        let m = UserItemMatrix::build(&ratings());
        assert_eq!(m.get(99, 10), None);
        assert_eq!(m.get(1, 99), None);
        assert!(m.user_row(99).is_none());
    }

    #[test]
    fn test_duplicate_pair_last_write_wins() {
        let m = UserItemMatrix::build(&[
            Rating::new(1, 10, 2.0),
            Rating::new(1, 10, 4.5),
            Rating::new(1, 10, 3.0),
        ]);
        assert_eq!(m.get(1, 10), Some(3.0));
        assert_eq!(m.n_items(), 1);
    }

    #[test]
    fn test_insertion_order_only_matters_for_duplicates() {
        let mut shuffled = ratings();
        shuffled.reverse();
        assert_eq!(
            UserItemMatrix::build(&ratings()),
            UserItemMatrix::build(&shuffled)
        );
    }

    #[test]
    fn test_empty_ratings() {
        let m = UserItemMatrix::build(&[]);
        assert!(m.is_empty());
        assert_eq!(m.n_items(), 0);
    }
}
