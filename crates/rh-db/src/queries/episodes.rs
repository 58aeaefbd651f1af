//! Tv show episode queries.

use rusqlite::Connection;
use rh_core::domain::Episode;
use rh_core::{Error, Result, TvShowId};

use super::{db_err, unique_violation_on};
use super::thumbnails::{find_thumbnail, insert_thumbnail};
use super::videos::{find_video, insert_video};
use crate::models::{format_time, EpisodeRow, EPISODE_COLS};

/// Insert an episode together with its video and thumbnail.
///
/// Runs on the caller's connection or transaction without opening its own.
pub(crate) fn insert_episode(conn: &Connection, tv_show_id: TvShowId, episode: &Episode) -> Result<()> {
    insert_video(conn, episode.video())?;
    if let Some(thumb) = episode.thumbnail() {
        insert_thumbnail(conn, thumb)?;
    }

    conn.execute(
        "INSERT INTO episodes (id, tv_show_id, video_id, thumbnail_id, title, description,
                               season, number, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            episode.id().to_string(),
            tv_show_id.to_string(),
            episode.video().id().to_string(),
            episode.thumbnail().map(|t| t.id().to_string()),
            episode.title(),
            episode.description(),
            episode.season(),
            episode.number(),
            format_time(episode.created_at()),
            format_time(episode.updated_at()),
        ],
    )
    .map_err(|e| {
        if unique_violation_on(&e, "episodes.season") {
            Error::from(rh_core::DomainError::DuplicateEpisode {
                season: episode.season(),
                number: episode.number(),
            })
        } else {
            db_err(e)
        }
    })?;
    Ok(())
}

/// Append one episode to an existing tv show in a single transaction.
pub fn add_episode(conn: &Connection, tv_show_id: TvShowId, episode: &Episode) -> Result<()> {
    let tx = conn.unchecked_transaction().map_err(db_err)?;

    let touched = tx
        .execute(
            "UPDATE tv_shows SET updated_at = ?1 WHERE id = ?2",
            rusqlite::params![format_time(episode.created_at()), tv_show_id.to_string()],
        )
        .map_err(db_err)?;
    if touched == 0 {
        return Err(Error::not_found("tv show", tv_show_id));
    }

    insert_episode(&tx, tv_show_id, episode)?;
    tx.commit().map_err(db_err)?;

    tracing::debug!(
        tv_show_id = %tv_show_id,
        episode_id = %episode.id(),
        season = episode.season(),
        number = episode.number(),
        "Episode persisted"
    );
    Ok(())
}

/// Load every episode of a tv show, ordered by season then number.
pub fn list_episodes(conn: &Connection, tv_show_id: TvShowId) -> Result<Vec<Episode>> {
    let q = format!(
        "SELECT {EPISODE_COLS} FROM episodes WHERE tv_show_id = ?1 ORDER BY season, number"
    );
    let mut stmt = conn.prepare(&q).map_err(db_err)?;
    let rows = stmt
        .query_map([tv_show_id.to_string()], EpisodeRow::from_row)
        .map_err(db_err)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(db_err)?;

    rows.into_iter()
        .map(|row| {
            let video = find_video(conn, row.video_id).map_err(|e| missing_part(e, "video", &row))?;
            let thumbnail = row
                .thumbnail_id
                .map(|id| find_thumbnail(conn, id))
                .transpose()
                .map_err(|e| missing_part(e, "thumbnail", &row))?;
            Ok(Episode::hydrate(
                row.id,
                row.title,
                row.description,
                row.season,
                row.number,
                video,
                thumbnail,
                row.created_at,
                row.updated_at,
            ))
        })
        .collect()
}

fn missing_part(e: Error, part: &str, row: &EpisodeRow) -> Error {
    match e {
        Error::NotFound { .. } => Error::Integrity(format!("episode {} has no {part} row", row.id)),
        other => other,
    }
}
