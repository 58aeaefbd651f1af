//! Simple video upload.
//!
//! Same pipeline as `POST /movies`, with a required thumbnail, a shorter
//! description limit and 400 for rejected input.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::movies::{ingest_movie, UploadResponse, UploadRules};

/// Longest accepted description on this route.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Multipart body of a simple video upload.
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct VideoUploadForm {
    title: String,
    /// At most 500 characters.
    description: String,
    #[schema(value_type = String, format = Binary)]
    video: Vec<u8>,
    /// JPEG or PNG image.
    #[schema(value_type = String, format = Binary)]
    thumbnail: Vec<u8>,
}

/// POST /videos
#[utoipa::path(
    post,
    path = "/videos",
    request_body(content = VideoUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video created", body = UploadResponse),
        (status = 400, description = "Invalid upload")
    )
)]
pub async fn create_video(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let rules = UploadRules {
        thumbnail_required: true,
        max_description_chars: Some(MAX_DESCRIPTION_CHARS),
    };
    let bad_request = |e: rh_core::Error| AppError::new(e).invalid_input_as(StatusCode::BAD_REQUEST);

    let content = ingest_movie(&ctx, multipart, rules).await.map_err(bad_request)?;
    let body = UploadResponse::from_content(&content).map_err(bad_request)?;
    Ok((StatusCode::CREATED, Json(body)))
}
