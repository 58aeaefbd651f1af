//! Thumbnail record queries.

use rusqlite::Connection;
use rh_core::domain::Thumbnail;
use rh_core::{Error, Result, ThumbnailId};

use super::db_err;
use crate::models::{format_time, ThumbnailRow, THUMBNAIL_COLS};

/// Insert a thumbnail record.
pub fn insert_thumbnail(conn: &Connection, thumbnail: &Thumbnail) -> Result<()> {
    conn.execute(
        "INSERT INTO thumbnails (id, url, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            thumbnail.id().to_string(),
            thumbnail.url(),
            format_time(thumbnail.created_at()),
            format_time(thumbnail.updated_at()),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

/// Load a thumbnail by ID.
pub fn find_thumbnail(conn: &Connection, id: ThumbnailId) -> Result<Thumbnail> {
    let q = format!("SELECT {THUMBNAIL_COLS} FROM thumbnails WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], ThumbnailRow::from_row) {
        Ok(row) => Ok(row.into_domain()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::not_found("thumbnail", id)),
        Err(e) => Err(db_err(e)),
    }
}
