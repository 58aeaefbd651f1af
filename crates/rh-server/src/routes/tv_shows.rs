//! TV show creation and episode upload.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use rh_core::{ContentId, DomainError, Error};

use crate::context::AppContext;
use crate::error::AppError;
use crate::ingest::{self, UploadForm};

/// Multipart body for creating a tv show.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct TvShowForm {
    title: String,
    description: String,
    #[schema(value_type = Option<String>, format = Binary)]
    thumbnail: Option<Vec<u8>>,
}

/// Multipart body for adding an episode.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct EpisodeForm {
    title: String,
    description: String,
    season: u32,
    number: u32,
    #[schema(value_type = String, format = Binary)]
    video: Vec<u8>,
    #[schema(value_type = Option<String>, format = Binary)]
    thumbnail: Option<Vec<u8>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TvShowCreatedResponse {
    /// Content ID.
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EpisodeCreatedResponse {
    pub id: String,
    pub video_id: String,
    pub season: u32,
    pub number: u32,
}

/// POST /tv-shows
#[utoipa::path(
    post,
    path = "/tv-shows",
    request_body(content = TvShowForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "TV show created", body = TvShowCreatedResponse),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn create_tv_show(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = UploadForm::read(multipart, &["thumbnail"], ctx.staging_dir()).await?;
    let title = form.require_text("title")?.to_owned();
    let description = form.require_text("description")?.to_owned();
    let thumbnail = form.take_file("thumbnail");

    let assets = ingest::store_assets(&ctx, None, thumbnail.as_ref()).await?;
    let outcome = match ingest::build_tv_show(&title, &description, assets.thumbnail.as_ref()) {
        Ok(content) => {
            ctx.with_conn(move |conn| {
                rh_db::queries::contents::save_content(conn, &content)?;
                Ok(content)
            })
            .await
        }
        Err(e) => Err(e),
    };
    let content = assets.keep_if_ok(&ctx.blobs, outcome).await?;

    tracing::info!(content_id = %content.id(), "TV show created");

    Ok((
        StatusCode::CREATED,
        Json(TvShowCreatedResponse {
            id: content.id().to_string(),
            title: content.title().to_string(),
            description: content.description().to_string(),
            created_at: content.created_at().to_rfc3339(),
        }),
    ))
}

/// POST /tv-shows/{id}/episodes
#[utoipa::path(
    post,
    path = "/tv-shows/{id}/episodes",
    params(("id" = String, Path, description = "Content ID of the tv show")),
    request_body(content = EpisodeForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Episode added", body = EpisodeCreatedResponse),
        (status = 404, description = "TV show not found"),
        (status = 409, description = "Season and number already taken"),
        (status = 422, description = "Invalid upload")
    )
)]
pub async fn add_episode(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let content_id: ContentId = id.parse().map_err(|_| Error::not_found("content", &id))?;

    let mut form = UploadForm::read(multipart, &["video", "thumbnail"], ctx.staging_dir()).await?;
    let title = form.require_text("title")?.to_owned();
    let description = form.require_text("description")?.to_owned();
    let season = form.require_number("season")?;
    let number = form.require_number("number")?;
    let video = form.require_file("video")?;
    let thumbnail = form.take_file("thumbnail");

    // Resolve the show and reject taken slots before writing any blob.
    let content = ctx
        .with_conn(move |conn| rh_db::queries::contents::find_content(conn, content_id))
        .await?;
    let show = content.tv_show()?;
    if show.episode(season, number).is_some() {
        return Err(DomainError::DuplicateEpisode { season, number }.into());
    }
    let show_id = show.id();

    let assets = ingest::store_assets(&ctx, Some(&video), thumbnail.as_ref()).await?;
    let Some(stored_video) = assets.video.as_ref() else {
        return Err(Error::Internal("video was not stored".into()).into());
    };

    let outcome = match ingest::build_episode(
        &title,
        &description,
        season,
        number,
        stored_video,
        assets.thumbnail.as_ref(),
    ) {
        Ok(episode) => {
            ctx.with_conn(move |conn| {
                rh_db::queries::episodes::add_episode(conn, show_id, &episode)?;
                Ok(episode)
            })
            .await
        }
        Err(e) => Err(e),
    };
    let episode = assets.keep_if_ok(&ctx.blobs, outcome).await?;

    tracing::info!(
        content_id = %content_id,
        episode_id = %episode.id(),
        season,
        number,
        "Episode added"
    );

    Ok((
        StatusCode::CREATED,
        Json(EpisodeCreatedResponse {
            id: episode.id().to_string(),
            video_id: episode.video().id().to_string(),
            season,
            number,
        }),
    ))
}
