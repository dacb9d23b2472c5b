use rusqlite::Connection;

pub const RATINGS_TABLE: &str = "ratings";

pub const USER_COLUMN: &str = "userId";
pub const ITEM_COLUMN: &str = "itemId";
/// Item column name written by the dataset converter.
pub const ITEM_COLUMN_ALIAS: &str = "movieId";
pub const RATING_COLUMN: &str = "rating";

pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS ratings (
            userId     INTEGER NOT NULL,
            movieId    INTEGER NOT NULL,
            rating     REAL NOT NULL,
            timestamp  INTEGER NOT NULL DEFAULT 0
        );
        ",
    )
}

/// Column names of the ratings table, in declaration order. Empty when the
/// table does not exist.
pub fn ratings_columns(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let names = stmt
        .query_map([RATINGS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_db_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        init_db(&conn).unwrap();
        assert_eq!(
            ratings_columns(&conn).unwrap(),
            vec!["userId", "movieId", "rating", "timestamp"]
        );
    }

    #[test]
    fn test_missing_table_has_no_columns() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(ratings_columns(&conn).unwrap().is_empty());
    }
}
