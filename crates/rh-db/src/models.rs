//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`, selected with the matching `*_COLS` list. Rows that map
//! one-to-one onto a domain entity convert with `into_domain`.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use uuid::Uuid;

use rh_core::domain::{ContentType, Thumbnail, Video};
use rh_core::{ContentId, EpisodeId, MovieId, ThumbnailId, TvShowId, VideoId};

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn conversion_error(
    idx: usize,
    ty: Type,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
}

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| conversion_error(idx, Type::Text, e))?;
    Ok(T::from(uuid))
}

fn parse_opt_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<T>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|v| {
        Uuid::parse_str(&v)
            .map(T::from)
            .map_err(|e| conversion_error(idx, Type::Text, e))
    })
    .transpose()
}

fn parse_time(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, Type::Text, e))
}

/// Timestamp text stored in every `created_at` / `updated_at` column.
pub fn format_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

pub const VIDEO_COLS: &str = "id, url, size_kb, duration, content_type, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct VideoRow {
    pub id: VideoId,
    pub url: String,
    pub size_kb: u64,
    pub duration: Option<u32>,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoRow {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let size_kb: i64 = row.get(2)?;
        Ok(Self {
            id: parse_id(row, 0)?,
            url: row.get(1)?,
            size_kb: u64::try_from(size_kb).map_err(|e| conversion_error(2, Type::Integer, e))?,
            duration: row.get(3)?,
            content_type: row.get(4)?,
            created_at: parse_time(row, 5)?,
            updated_at: parse_time(row, 6)?,
        })
    }

    pub fn into_domain(self) -> Video {
        Video::hydrate(
            self.id,
            self.url,
            self.size_kb,
            self.duration,
            self.content_type,
            self.created_at,
            self.updated_at,
        )
    }
}

// ---------------------------------------------------------------------------
// Thumbnail
// ---------------------------------------------------------------------------

pub const THUMBNAIL_COLS: &str = "id, url, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ThumbnailRow {
    pub id: ThumbnailId,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ThumbnailRow {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            url: row.get(1)?,
            created_at: parse_time(row, 2)?,
            updated_at: parse_time(row, 3)?,
        })
    }

    pub fn into_domain(self) -> Thumbnail {
        Thumbnail::hydrate(self.id, self.url, self.created_at, self.updated_at)
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

pub const CONTENT_COLS: &str = "id, title, description, content_type, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct ContentRow {
    pub id: ContentId,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentRow {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let content_type: String = row.get(3)?;
        Ok(Self {
            id: parse_id(row, 0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            content_type: content_type
                .parse()
                .map_err(|e| conversion_error(3, Type::Text, e))?,
            created_at: parse_time(row, 4)?,
            updated_at: parse_time(row, 5)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Movie
// ---------------------------------------------------------------------------

pub const MOVIE_COLS: &str = "id, content_id, video_id, thumbnail_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct MovieRow {
    pub id: MovieId,
    pub content_id: ContentId,
    pub video_id: VideoId,
    pub thumbnail_id: Option<ThumbnailId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRow {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            content_id: parse_id(row, 1)?,
            video_id: parse_id(row, 2)?,
            thumbnail_id: parse_opt_id(row, 3)?,
            created_at: parse_time(row, 4)?,
            updated_at: parse_time(row, 5)?,
        })
    }
}

// ---------------------------------------------------------------------------
// TvShow
// ---------------------------------------------------------------------------

pub const TV_SHOW_COLS: &str = "id, content_id, thumbnail_id, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct TvShowRow {
    pub id: TvShowId,
    pub content_id: ContentId,
    pub thumbnail_id: Option<ThumbnailId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TvShowRow {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            content_id: parse_id(row, 1)?,
            thumbnail_id: parse_opt_id(row, 2)?,
            created_at: parse_time(row, 3)?,
            updated_at: parse_time(row, 4)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Episode
// ---------------------------------------------------------------------------

pub const EPISODE_COLS: &str =
    "id, tv_show_id, video_id, thumbnail_id, title, description, season, number, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EpisodeRow {
    pub id: EpisodeId,
    pub tv_show_id: TvShowId,
    pub video_id: VideoId,
    pub thumbnail_id: Option<ThumbnailId>,
    pub title: String,
    pub description: String,
    pub season: u32,
    pub number: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EpisodeRow {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            tv_show_id: parse_id(row, 1)?,
            video_id: parse_id(row, 2)?,
            thumbnail_id: parse_opt_id(row, 3)?,
            title: row.get(4)?,
            description: row.get(5)?,
            season: row.get(6)?,
            number: row.get(7)?,
            created_at: parse_time(row, 8)?,
            updated_at: parse_time(row, 9)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_round_trips_through_text() {
        let now = Utc::now();
        let s = format_time(now);
        let back = DateTime::parse_from_rfc3339(&s).unwrap().with_timezone(&Utc);
        assert_eq!(back.timestamp_micros(), now.timestamp_micros());
        assert!(s.ends_with('Z'));
    }

    #[test]
    fn bad_uuid_is_conversion_failure() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let res: rusqlite::Result<VideoId> =
            conn.query_row("SELECT 'not-a-uuid'", [], |row| parse_id(row, 0));
        assert!(matches!(
            res,
            Err(rusqlite::Error::FromSqlConversionFailure(0, Type::Text, _))
        ));
    }

    #[test]
    fn null_optional_id() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let res: Option<ThumbnailId> = conn
            .query_row("SELECT NULL", [], |row| parse_opt_id(row, 0))
            .unwrap();
        assert!(res.is_none());
    }
}
