//! Content lookup.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use rh_core::domain::{Content, ContentType, Episode, Media, Movie, Thumbnail, TvShow, Video};
use rh_core::{ContentId, Error};

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VideoResponse {
    pub id: String,
    pub url: String,
    pub size_kb: u64,
    /// Whole seconds; absent when unknown.
    pub duration: Option<u32>,
    pub content_type: String,
    pub created_at: String,
}

impl From<&Video> for VideoResponse {
    fn from(v: &Video) -> Self {
        Self {
            id: v.id().to_string(),
            url: v.url().to_string(),
            size_kb: v.size_kb(),
            duration: v.duration(),
            content_type: v.content_type().to_string(),
            created_at: v.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ThumbnailResponse {
    pub id: String,
    pub url: String,
}

impl From<&Thumbnail> for ThumbnailResponse {
    fn from(t: &Thumbnail) -> Self {
        Self {
            id: t.id().to_string(),
            url: t.url().to_string(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MovieResponse {
    pub id: String,
    pub video: VideoResponse,
    pub thumbnail: Option<ThumbnailResponse>,
}

impl From<&Movie> for MovieResponse {
    fn from(m: &Movie) -> Self {
        Self {
            id: m.id().to_string(),
            video: m.video().into(),
            thumbnail: m.thumbnail().map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EpisodeResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub season: u32,
    pub number: u32,
    pub video: VideoResponse,
    pub thumbnail: Option<ThumbnailResponse>,
}

impl From<&Episode> for EpisodeResponse {
    fn from(e: &Episode) -> Self {
        Self {
            id: e.id().to_string(),
            title: e.title().to_string(),
            description: e.description().to_string(),
            season: e.season(),
            number: e.number(),
            video: e.video().into(),
            thumbnail: e.thumbnail().map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TvShowResponse {
    pub id: String,
    pub thumbnail: Option<ThumbnailResponse>,
    pub episodes: Vec<EpisodeResponse>,
}

impl From<&TvShow> for TvShowResponse {
    fn from(t: &TvShow) -> Self {
        Self {
            id: t.id().to_string(),
            thumbnail: t.thumbnail().map(Into::into),
            episodes: t.episodes().iter().map(Into::into).collect(),
        }
    }
}

/// A whole content aggregate. Exactly one of `movie` and `tv_show` is set.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ContentResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<MovieResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tv_show: Option<TvShowResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Content> for ContentResponse {
    fn from(c: &Content) -> Self {
        let (movie, tv_show) = match c.media() {
            Media::Movie(m) => (Some(m.into()), None),
            Media::TvShow(t) => (None, Some(t.into())),
        };
        Self {
            id: c.id().to_string(),
            title: c.title().to_string(),
            description: c.description().to_string(),
            content_type: c.content_type(),
            movie,
            tv_show,
            created_at: c.created_at().to_rfc3339(),
            updated_at: c.updated_at().to_rfc3339(),
        }
    }
}

/// GET /contents/{id}
#[utoipa::path(
    get,
    path = "/contents/{id}",
    params(("id" = String, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Content aggregate", body = ContentResponse),
        (status = 404, description = "Content not found")
    )
)]
pub async fn get_content(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<ContentResponse>, AppError> {
    let content_id: ContentId = id.parse().map_err(|_| Error::not_found("content", &id))?;

    let content = ctx
        .with_conn(move |conn| rh_db::queries::contents::find_content(conn, content_id))
        .await?;

    Ok(Json(ContentResponse::from(&content)))
}
