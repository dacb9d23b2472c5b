pub mod matrix;
pub mod recommend;
pub mod registry;
pub mod schema;
pub mod shared;
pub mod similarity;
pub mod storage;
pub mod types;
pub mod util;

use std::path::Path;
use std::time::Instant;

use matrix::UserItemMatrix;
use recommend::Neighbor;
use registry::Registry;
use similarity::SimilarityMatrix;

pub use shared::SharedRecommender;
pub use types::{Rating, Recommendation, RecommenderConfig, RecommenderError, Result};

/// User-based collaborative filtering engine.
///
/// Owns the rating set, the registry of known users and items, and the two
/// matrices derived from the ratings. Every rating mutation rebuilds both
/// matrices from scratch.
pub struct Recommender {
    config: RecommenderConfig,
    ratings: Vec<Rating>,
    registry: Registry,
    matrix: UserItemMatrix,
    similarity: SimilarityMatrix,
}

impl Recommender {
    /// Load `config.ratings_path`. `.db`, `.sqlite` and `.sqlite3` files are
    /// read as SQLite databases, anything else as CSV.
    pub fn open(config: RecommenderConfig) -> Result<Self> {
        let path = config.ratings_path.clone();
        let ratings = if is_sqlite_path(&path) {
            storage::load_sqlite(&open_read_only(&path)?)?
        } else {
            storage::load_csv(&path)?
        };
        Ok(Self::with_config(ratings, config))
    }

    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_ratings(storage::load_csv(path)?))
    }

    /// Load the `ratings` table of an existing SQLite database, read-only.
    pub fn from_sqlite(path: impl AsRef<Path>) -> Result<Self> {
        let conn = open_read_only(path.as_ref())?;
        Self::from_connection(&conn)
    }

    pub fn from_connection(conn: &rusqlite::Connection) -> Result<Self> {
        Ok(Self::from_ratings(storage::load_sqlite(conn)?))
    }

    pub fn from_ratings(ratings: Vec<Rating>) -> Self {
        Self::with_config(ratings, RecommenderConfig::default())
    }

    pub fn with_config(ratings: Vec<Rating>, config: RecommenderConfig) -> Self {
        let mut registry = Registry::new();
        for r in &ratings {
            registry.add_user(r.user_id);
            registry.add_item(r.item_id);
        }

        let mut rec = Self {
            config: config.normalized(),
            ratings,
            registry,
            matrix: UserItemMatrix::default(),
            similarity: SimilarityMatrix::default(),
        };
        rec.retrain();
        tracing::info!(
            ratings = rec.ratings.len(),
            users = rec.registry.user_count(),
            items = rec.registry.item_count(),
            "recommender ready"
        );
        rec
    }

    /// Rebuild the user-item matrix and the similarity matrix from the
    /// current rating set. The new model replaces the old one only once both
    /// are complete.
    pub fn retrain(&mut self) {
        let (matrix, similarity) = train(&self.ratings);
        self.matrix = matrix;
        self.similarity = similarity;
    }

    /// Top `k` unrated items for `user_id`. Empty, not an error, when the
    /// user has no ratings or no similar neighbors.
    pub fn recommend(&self, user_id: i64, k: usize) -> Vec<Recommendation> {
        recommend::recommend(
            &self.matrix,
            &self.similarity,
            user_id,
            k,
            self.config.neighbors,
        )
    }

    pub fn recommend_default(&self, user_id: i64) -> Vec<Recommendation> {
        self.recommend(user_id, self.config.default_k)
    }

    /// The neighbors `recommend` would use for `user_id`.
    pub fn neighbors(&self, user_id: i64) -> Vec<Neighbor> {
        recommend::nearest_neighbors(&self.similarity, user_id, self.config.neighbors)
    }

    /// Record a rating and retrain. The value is not range-checked.
    ///
    /// The new model is built from a staged copy of the rating set; the
    /// ratings, registry and matrices are only updated once it is complete.
    pub fn add_rating(&mut self, user_id: i64, item_id: i64, value: f64) {
        let mut ratings = self.ratings.clone();
        ratings.push(Rating::new(user_id, item_id, value));
        let (matrix, similarity) = train(&ratings);

        self.ratings = ratings;
        self.registry.add_user(user_id);
        self.registry.add_item(item_id);
        self.matrix = matrix;
        self.similarity = similarity;
    }

    /// Register a user before its first rating. Returns false if already known.
    pub fn add_user(&mut self, user_id: i64) -> bool {
        self.registry.add_user(user_id)
    }

    /// Register an item before its first rating. Returns false if already known.
    pub fn add_item(&mut self, item_id: i64) -> bool {
        self.registry.add_item(item_id)
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn matrix(&self) -> &UserItemMatrix {
        &self.matrix
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
}

fn train(ratings: &[Rating]) -> (UserItemMatrix, SimilarityMatrix) {
    let started = Instant::now();
    let matrix = UserItemMatrix::build(ratings);
    let similarity = SimilarityMatrix::compute(&matrix);
    tracing::debug!(
        users = matrix.n_users(),
        items = matrix.n_items(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "model retrained"
    );
    (matrix, similarity)
}

fn open_read_only(path: &Path) -> Result<rusqlite::Connection> {
    let conn =
        rusqlite::Connection::open_with_flags(path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    Ok(conn)
}

fn is_sqlite_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("db" | "sqlite" | "sqlite3")
    )
}
