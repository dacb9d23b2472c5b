use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::{Rating, Recommendation};
use crate::Recommender;

/// Cloneable handle for serving one engine from many threads.
///
/// Queries share a read lock. Mutations hold the write lock across the
/// append and the full retrain, so a reader sees either the model before the
/// mutation or the model after it, never a half-built one.
#[derive(Clone)]
pub struct SharedRecommender {
    inner: Arc<RwLock<Recommender>>,
}

impl SharedRecommender {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            inner: Arc::new(RwLock::new(recommender)),
        }
    }

    // Mutations build the new model before touching any field, so a panic
    // under the write lock leaves the previous state intact and the poison
    // flag can be ignored.
    fn read(&self) -> RwLockReadGuard<'_, Recommender> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Recommender> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn recommend(&self, user_id: i64, k: usize) -> Vec<Recommendation> {
        self.read().recommend(user_id, k)
    }

    pub fn recommend_default(&self, user_id: i64) -> Vec<Recommendation> {
        self.read().recommend_default(user_id)
    }

    pub fn add_rating(&self, user_id: i64, item_id: i64, value: f64) {
        self.write().add_rating(user_id, item_id, value);
    }

    pub fn add_user(&self, user_id: i64) -> bool {
        self.write().add_user(user_id)
    }

    pub fn add_item(&self, item_id: i64) -> bool {
        self.write().add_item(item_id)
    }

    /// Run `f` against a consistent snapshot of the engine.
    pub fn with<T>(&self, f: impl FnOnce(&Recommender) -> T) -> T {
        let guard = self.read();
        f(&*guard)
    }

    pub fn ratings(&self) -> Vec<Rating> {
        self.read().ratings().to_vec()
    }
}

impl From<Recommender> for SharedRecommender {
    fn from(recommender: Recommender) -> Self {
        Self::new(recommender)
    }
}
