use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommenderError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing table: {0}")]
    MissingTable(String),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("row {row}: invalid {column} value {value:?}")]
    InvalidValue {
        row: u64,
        column: String,
        value: String,
    },
}

impl RecommenderError {
    /// True for errors caused by the shape or content of the ratings table
    /// rather than by the medium it was read from.
    pub fn is_data_format(&self) -> bool {
        match self {
            RecommenderError::MissingTable(_)
            | RecommenderError::MissingColumn(_)
            | RecommenderError::InvalidValue { .. } => true,
            RecommenderError::Csv(e) => matches!(
                e.kind(),
                csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. }
            ),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecommenderError>;

/// One observed preference. The store keeps every observation it is given,
/// duplicates included.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub user_id: i64,
    pub item_id: i64,
    pub value: f64,
}

impl Rating {
    pub fn new(user_id: i64, item_id: i64, value: f64) -> Self {
        Self {
            user_id,
            item_id,
            value,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub item_id: i64,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Ratings table loaded by `Recommender::open`. SQLite files are
    /// recognized by extension, anything else is read as CSV.
    pub ratings_path: PathBuf,
    /// How many of the most similar users contribute to an item's score.
    pub neighbors: usize,
    /// Result size used by `Recommender::recommend_default`.
    pub default_k: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            ratings_path: PathBuf::from("data/ratings.csv"),
            neighbors: 10,
            default_k: 10,
        }
    }
}

impl RecommenderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RecommenderConfig = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    pub(crate) fn normalized(mut self) -> Self {
        if self.neighbors == 0 {
            tracing::warn!("neighbors = 0 would never yield a score, using 1");
            self.neighbors = 1;
        }
        self
    }
}
