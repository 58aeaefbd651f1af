//! Movie upload.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use rh_core::domain::Content;
use rh_core::{Error, Result};

use crate::context::AppContext;
use crate::error::AppError;
use crate::ingest::{self, UploadForm};

/// Multipart body of a movie upload.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct MovieUploadForm {
    /// At most 255 characters.
    title: String,
    description: String,
    /// MP4 file.
    #[schema(value_type = String, format = Binary)]
    video: Vec<u8>,
    /// Optional JPEG or PNG image.
    #[schema(value_type = Option<String>, format = Binary)]
    thumbnail: Option<Vec<u8>>,
}

/// Response for a created movie.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// Content ID.
    pub id: String,
    /// ID to stream the video with.
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

impl UploadResponse {
    pub fn from_content(content: &Content) -> Result<Self> {
        let movie = content.movie()?;
        Ok(Self {
            id: content.id().to_string(),
            video_id: movie.video().id().to_string(),
            title: content.title().to_string(),
            description: content.description().to_string(),
            created_at: content.created_at().to_rfc3339(),
        })
    }
}

/// Per-route differences between the movie upload endpoints.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UploadRules {
    pub thumbnail_required: bool,
    pub max_description_chars: Option<usize>,
}

/// Parse, validate, store and persist one movie upload.
pub(crate) async fn ingest_movie(
    ctx: &AppContext,
    multipart: Multipart,
    rules: UploadRules,
) -> Result<Content> {
    let mut form = UploadForm::read(multipart, &["video", "thumbnail"], ctx.staging_dir()).await?;

    let title = form.require_text("title")?.to_owned();
    let description = form.require_nonempty_text("description")?.to_owned();
    if let Some(max) = rules.max_description_chars {
        if description.chars().count() > max {
            return Err(Error::Validation(format!(
                "description must be at most {max} characters"
            )));
        }
    }

    let video = form.require_file("video")?;
    let thumbnail = if rules.thumbnail_required {
        Some(form.require_file("thumbnail")?)
    } else {
        form.take_file("thumbnail")
    };

    let assets = ingest::store_assets(ctx, Some(&video), thumbnail.as_ref()).await?;
    let Some(stored_video) = assets.video.as_ref() else {
        return Err(Error::Internal("video was not stored".into()));
    };

    let outcome = match ingest::build_movie(
        &title,
        &description,
        stored_video,
        assets.thumbnail.as_ref(),
    ) {
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

    tracing::info!(
        content_id = %content.id(),
        locator = %stored_video.blob.locator,
        size_kb = stored_video.blob.size_kb(),
        duration = ?stored_video.duration,
        "Movie uploaded"
    );
    Ok(content)
}

/// POST /movies
#[utoipa::path(
    post,
    path = "/movies",
    request_body(content = MovieUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Movie created", body = UploadResponse),
        (status = 422, description = "Invalid upload")
    )
)]
pub async fn create_movie(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> std::result::Result<impl IntoResponse, AppError> {
    let rules = UploadRules {
        thumbnail_required: false,
        max_description_chars: None,
    };
    let content = ingest_movie(&ctx, multipart, rules).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse::from_content(&content)?)))
}
