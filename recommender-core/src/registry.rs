use std::collections::BTreeSet;

/// Known user and item IDs, whether or not they have ratings yet.
/// Entries are never removed.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    users: BTreeSet<i64>,
    items: BTreeSet<i64>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the user was not known before.
    pub fn add_user(&mut self, user_id: i64) -> bool {
        self.users.insert(user_id)
    }

    /// Returns true if the item was not known before.
    pub fn add_item(&mut self, item_id: i64) -> bool {
        self.items.insert(item_id)
    }

    pub fn contains_user(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }

    pub fn contains_item(&self, item_id: i64) -> bool {
        self.items.contains(&item_id)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn users(&self) -> impl Iterator<Item = i64> + '_ {
        self.users.iter().copied()
    }

    pub fn items(&self) -> impl Iterator<Item = i64> + '_ {
        self.items.iter().copied()
    }
}
