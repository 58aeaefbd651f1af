//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order. A
//! `schema_migrations` table tracks which versions have been applied.

use rusqlite::Connection;
use rh_core::{Error, Result};

/// V1: stored files and the movie side of the aggregate.
const V1_MOVIES: &str = r#"
CREATE TABLE videos (
    id           TEXT PRIMARY KEY,
    url          TEXT NOT NULL,
    size_kb      INTEGER NOT NULL CHECK (size_kb > 0),
    duration     INTEGER CHECK (duration IS NULL OR duration > 0),
    content_type TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE thumbnails (
    id         TEXT PRIMARY KEY,
    url        TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE contents (
    id           TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    content_type TEXT NOT NULL CHECK (content_type IN ('MOVIE', 'TV_SHOW')),
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE movies (
    id           TEXT PRIMARY KEY,
    content_id   TEXT NOT NULL UNIQUE REFERENCES contents(id),
    video_id     TEXT NOT NULL UNIQUE REFERENCES videos(id),
    thumbnail_id TEXT UNIQUE REFERENCES thumbnails(id),
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);
"#;

/// V2: tv shows and their episodes.
const V2_TV_SHOWS: &str = r#"
CREATE TABLE tv_shows (
    id           TEXT PRIMARY KEY,
    content_id   TEXT NOT NULL UNIQUE REFERENCES contents(id),
    thumbnail_id TEXT UNIQUE REFERENCES thumbnails(id),
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL
);

CREATE TABLE episodes (
    id           TEXT PRIMARY KEY,
    tv_show_id   TEXT NOT NULL REFERENCES tv_shows(id),
    video_id     TEXT NOT NULL UNIQUE REFERENCES videos(id),
    thumbnail_id TEXT UNIQUE REFERENCES thumbnails(id),
    title        TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    season       INTEGER NOT NULL CHECK (season > 0),
    number       INTEGER NOT NULL CHECK (number > 0),
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    UNIQUE (tv_show_id, season, number)
);

CREATE INDEX idx_episodes_tv_show ON episodes(tv_show_id);
"#;

/// All migrations in order.
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_MOVIES), (2, V2_TV_SHOWS)];

/// Run all pending migrations against the given connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit()
            .map_err(|e| Error::database(e.to_string()))?;

        tracing::debug!(version, "Applied migration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        // second call is a no-op
        run_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, MIGRATIONS.len() as i64);
    }

    #[test]
    fn test_all_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();

        let tables = [
            "videos",
            "thumbnails",
            "contents",
            "movies",
            "tv_shows",
            "episodes",
            "schema_migrations",
        ];
        for t in &tables {
            let exists: bool = conn
                .query_row(
                    "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                    [t],
                    |row| row.get(0),
                )
                .unwrap();
            assert!(exists, "table {t} should exist");
        }
    }

    #[test]
    fn test_zero_duration_rejected_by_schema() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let res = conn.execute(
            "INSERT INTO videos (id, url, size_kb, duration, content_type, created_at, updated_at)
             VALUES ('v', '/upload/videos/v.mp4', 1, 0, 'video/mp4', 'now', 'now')",
            [],
        );
        assert!(res.is_err());
    }
}
