//! Video record queries.

use rusqlite::Connection;
use rh_core::domain::Video;
use rh_core::{Error, Result, VideoId};

use super::db_err;
use crate::models::{format_time, VideoRow, VIDEO_COLS};

/// Insert a video record.
pub fn insert_video(conn: &Connection, video: &Video) -> Result<()> {
    let size_kb = i64::try_from(video.size_kb())
        .map_err(|_| Error::Internal(format!("video size {} overflows", video.size_kb())))?;

    conn.execute(
        "INSERT INTO videos (id, url, size_kb, duration, content_type, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            video.id().to_string(),
            video.url(),
            size_kb,
            video.duration(),
            video.content_type(),
            format_time(video.created_at()),
            format_time(video.updated_at()),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

/// Load a video by ID.
pub fn find_video(conn: &Connection, id: VideoId) -> Result<Video> {
    let q = format!("SELECT {VIDEO_COLS} FROM videos WHERE id = ?1");
    match conn.query_row(&q, [id.to_string()], VideoRow::from_row) {
        Ok(row) => Ok(row.into_domain()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::not_found("video", id)),
        Err(e) => Err(db_err(e)),
    }
}
