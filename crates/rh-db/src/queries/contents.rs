//! Content aggregate persistence.
//!
//! [`save_content`] writes a whole aggregate (content row, media row, and
//! every video, thumbnail and episode it owns) inside one transaction.
//! [`find_content`] reads it back inside one transaction and rebuilds the
//! typed aggregate.

use rusqlite::Connection;
use rh_core::domain::{Content, Media, Movie, TvShow};
use rh_core::{ContentId, Error, Result};

use super::db_err;
use super::episodes::{insert_episode, list_episodes};
use super::thumbnails::{find_thumbnail, insert_thumbnail};
use super::videos::{find_video, insert_video};
use crate::models::{format_time, ContentRow, MovieRow, TvShowRow, CONTENT_COLS, MOVIE_COLS, TV_SHOW_COLS};

/// Persist a new content aggregate atomically.
///
/// Insert order: owned files first, then the content row, then the media row
/// referencing both. Any failure rolls back every row written so far.
pub fn save_content(conn: &Connection, content: &Content) -> Result<()> {
    let tx = conn.unchecked_transaction().map_err(db_err)?;

    match content.media() {
        Media::Movie(movie) => {
            insert_video(&tx, movie.video())?;
            if let Some(thumb) = movie.thumbnail() {
                insert_thumbnail(&tx, thumb)?;
            }
            insert_content_row(&tx, content)?;
            insert_movie_row(&tx, content.id(), movie)?;
        }
        Media::TvShow(show) => {
            if let Some(thumb) = show.thumbnail() {
                insert_thumbnail(&tx, thumb)?;
            }
            insert_content_row(&tx, content)?;
            insert_tv_show_row(&tx, content.id(), show)?;
            for episode in show.episodes() {
                insert_episode(&tx, show.id(), episode)?;
            }
        }
    }

    tx.commit().map_err(db_err)?;

    tracing::debug!(
        content_id = %content.id(),
        content_type = %content.content_type(),
        "Content persisted"
    );
    Ok(())
}

fn insert_content_row(conn: &Connection, content: &Content) -> Result<()> {
    conn.execute(
        "INSERT INTO contents (id, title, description, content_type, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            content.id().to_string(),
            content.title(),
            content.description(),
            content.content_type().as_str(),
            format_time(content.created_at()),
            format_time(content.updated_at()),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn insert_movie_row(conn: &Connection, content_id: ContentId, movie: &Movie) -> Result<()> {
    conn.execute(
        "INSERT INTO movies (id, content_id, video_id, thumbnail_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            movie.id().to_string(),
            content_id.to_string(),
            movie.video().id().to_string(),
            movie.thumbnail().map(|t| t.id().to_string()),
            format_time(movie.created_at()),
            format_time(movie.updated_at()),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn insert_tv_show_row(conn: &Connection, content_id: ContentId, show: &TvShow) -> Result<()> {
    conn.execute(
        "INSERT INTO tv_shows (id, content_id, thumbnail_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            show.id().to_string(),
            content_id.to_string(),
            show.thumbnail().map(|t| t.id().to_string()),
            format_time(show.created_at()),
            format_time(show.updated_at()),
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

/// Load a content aggregate by ID.
///
/// A content row without its media row is an integrity fault, not a miss.
pub fn find_content(conn: &Connection, id: ContentId) -> Result<Content> {
    let tx = conn.unchecked_transaction().map_err(db_err)?;

    let q = format!("SELECT {CONTENT_COLS} FROM contents WHERE id = ?1");
    let row = match tx.query_row(&q, [id.to_string()], ContentRow::from_row) {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Err(Error::not_found("content", id)),
        Err(e) => return Err(db_err(e)),
    };

    let media = match row.content_type {
        rh_core::domain::ContentType::Movie => Media::Movie(load_movie(&tx, id)?),
        rh_core::domain::ContentType::TvShow => Media::TvShow(load_tv_show(&tx, id)?),
    };

    tx.commit().map_err(db_err)?;

    Content::hydrate(
        row.id,
        row.title,
        row.description,
        row.content_type,
        media,
        row.created_at,
        row.updated_at,
    )
    .map_err(|e| Error::Integrity(format!("content {id}: {e}")))
}

fn load_movie(conn: &Connection, content_id: ContentId) -> Result<Movie> {
    let q = format!("SELECT {MOVIE_COLS} FROM movies WHERE content_id = ?1");
    let row = match conn.query_row(&q, [content_id.to_string()], MovieRow::from_row) {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(Error::Integrity(format!(
                "content {content_id} is a movie but has no movie row"
            )))
        }
        Err(e) => return Err(db_err(e)),
    };

    let video = find_video(conn, row.video_id).map_err(|e| integrity(e, content_id, "video"))?;
    let thumbnail = row
        .thumbnail_id
        .map(|tid| find_thumbnail(conn, tid))
        .transpose()
        .map_err(|e| integrity(e, content_id, "thumbnail"))?;

    Ok(Movie::hydrate(row.id, video, thumbnail, row.created_at, row.updated_at))
}

fn load_tv_show(conn: &Connection, content_id: ContentId) -> Result<TvShow> {
    let q = format!("SELECT {TV_SHOW_COLS} FROM tv_shows WHERE content_id = ?1");
    let row = match conn.query_row(&q, [content_id.to_string()], TvShowRow::from_row) {
        Ok(row) => row,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(Error::Integrity(format!(
                "content {content_id} is a tv show but has no tv_show row"
            )))
        }
        Err(e) => return Err(db_err(e)),
    };

    let thumbnail = row
        .thumbnail_id
        .map(|tid| find_thumbnail(conn, tid))
        .transpose()
        .map_err(|e| integrity(e, content_id, "thumbnail"))?;
    let episodes = list_episodes(conn, row.id)?;

    Ok(TvShow::hydrate(row.id, thumbnail, episodes, row.created_at, row.updated_at))
}

fn integrity(e: Error, content_id: ContentId, part: &str) -> Error {
    match e {
        Error::NotFound { .. } => Error::Integrity(format!("content {content_id} has no {part} row")),
        other => other,
    }
}
