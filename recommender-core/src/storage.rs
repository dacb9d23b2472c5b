use std::fs::File;
use std::io;
use std::path::Path;

use rusqlite::params;
use rusqlite::types::Value;

use crate::schema::{
    self, ITEM_COLUMN, ITEM_COLUMN_ALIAS, RATINGS_TABLE, RATING_COLUMN, USER_COLUMN,
};
use crate::types::{Rating, RecommenderError, Result};

/// Positions of the required columns within a ratings table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    user: usize,
    item: usize,
    rating: usize,
}

impl Columns {
    fn locate(names: &[String]) -> Result<Self> {
        let find = |wanted: &str| names.iter().position(|n| n == wanted);

        let user = find(USER_COLUMN)
            .ok_or_else(|| RecommenderError::MissingColumn(USER_COLUMN.to_string()))?;
        let item = find(ITEM_COLUMN)
            .or_else(|| find(ITEM_COLUMN_ALIAS))
            .ok_or_else(|| {
                RecommenderError::MissingColumn(format!("{ITEM_COLUMN} (or {ITEM_COLUMN_ALIAS})"))
            })?;
        let rating = find(RATING_COLUMN)
            .ok_or_else(|| RecommenderError::MissingColumn(RATING_COLUMN.to_string()))?;

        Ok(Self { user, item, rating })
    }
}

fn invalid(row: u64, column: &str, value: impl Into<String>) -> RecommenderError {
    RecommenderError::InvalidValue {
        row,
        column: column.to_string(),
        value: value.into(),
    }
}

/// Parse an identifier. Integral reals such as `"7.0"` are accepted since
/// exported tables often widen integer columns to floats.
fn parse_id(raw: &str, row: u64, column: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(integral)
        .ok_or_else(|| invalid(row, column, raw))
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Ratings must be finite: a NaN or infinite cell would poison the norm of
/// its user row and every similarity computed against it.
fn parse_value(raw: &str, row: u64, column: &str) -> Result<f64> {
    let raw = raw.trim();
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .ok_or_else(|| invalid(row, column, raw))
}

/// Load a ratings table from a CSV file with a header row.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Rating>> {
    let path = path.as_ref();
    let ratings = read_csv(File::open(path)?)?;
    tracing::info!(path = %path.display(), rows = ratings.len(), "loaded ratings csv");
    Ok(ratings)
}

/// Read ratings from CSV text. The first line names the columns; a
/// `timestamp` column and any other extra columns are ignored.
pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<Rating>> {
    // Flexible so a short row surfaces as an invalid (empty) field rather
    // than a framing error.
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let cols = Columns::locate(&headers)?;

    let mut ratings = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = i as u64 + 2;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        ratings.push(Rating {
            user_id: parse_id(field(cols.user), row, &headers[cols.user])?,
            item_id: parse_id(field(cols.item), row, &headers[cols.item])?,
            value: parse_value(field(cols.rating), row, &headers[cols.rating])?,
        });
    }

    Ok(ratings)
}

fn value_to_id(value: Value, row: u64, column: &str) -> Result<i64> {
    match value {
        Value::Integer(i) => Ok(i),
        Value::Real(f) => integral(f).ok_or_else(|| invalid(row, column, f.to_string())),
        Value::Text(s) => parse_id(&s, row, column),
        Value::Null => Err(invalid(row, column, "NULL")),
        Value::Blob(_) => Err(invalid(row, column, "<blob>")),
    }
}

fn value_to_rating(value: Value, row: u64, column: &str) -> Result<f64> {
    match value {
        Value::Integer(i) => Ok(i as f64),
        Value::Real(f) if f.is_finite() => Ok(f),
        Value::Real(f) => Err(invalid(row, column, f.to_string())),
        Value::Text(s) => parse_value(&s, row, column),
        Value::Null => Err(invalid(row, column, "NULL")),
        Value::Blob(_) => Err(invalid(row, column, "<blob>")),
    }
}

/// Load every row of the `ratings` table in insertion (rowid) order.
pub fn load_sqlite(conn: &rusqlite::Connection) -> Result<Vec<Rating>> {
    let names = schema::ratings_columns(conn)?;
    if names.is_empty() {
        return Err(RecommenderError::MissingTable(RATINGS_TABLE.to_string()));
    }
    let cols = Columns::locate(&names)?;
    let (user_col, item_col, rating_col) =
        (&names[cols.user], &names[cols.item], &names[cols.rating]);

    let sql = format!(
        "SELECT \"{user_col}\", \"{item_col}\", \"{rating_col}\" \
         FROM {RATINGS_TABLE} ORDER BY rowid"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;

    let mut ratings = Vec::new();
    let mut row_num = 0u64;
    while let Some(row) = rows.next()? {
        row_num += 1;
        ratings.push(Rating {
            user_id: value_to_id(row.get(0)?, row_num, user_col)?,
            item_id: value_to_id(row.get(1)?, row_num, item_col)?,
            value: value_to_rating(row.get(2)?, row_num, rating_col)?,
        });
    }

    tracing::info!(rows = ratings.len(), "loaded ratings table");
    Ok(ratings)
}

/// Append ratings to the `ratings` table in one transaction, creating the
/// table if needed. Returns the number of rows written.
///
/// Staging only: prepares a table for [`load_sqlite`]. The engine keeps new
/// ratings in memory and never writes them back through here.
pub fn insert_ratings(conn: &mut rusqlite::Connection, ratings: &[Rating]) -> Result<usize> {
    schema::init_db(conn)?;
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO ratings (userId, movieId, rating, timestamp) VALUES (?1, ?2, ?3, 0)",
        )?;
        for r in ratings {
            stmt.execute(params![r.user_id, r.item_id, r.value])?;
        }
    }
    tx.commit()?;
    Ok(ratings.len())
}
