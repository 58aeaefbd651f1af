//! Range-aware video delivery.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;

use rh_core::{Error, VideoId};

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::streaming_helpers::{guess_content_type, serve_file};

/// GET /videos/{id}/stream
#[utoipa::path(
    get,
    path = "/videos/{id}/stream",
    params(
        ("id" = String, Path, description = "Video ID"),
        ("Range" = Option<String>, Header, description = "Byte range, e.g. bytes=0-1023")
    ),
    responses(
        (status = 200, description = "Whole file"),
        (status = 206, description = "Requested byte range"),
        (status = 404, description = "Video not found"),
        (status = 416, description = "Range not satisfiable")
    )
)]
pub async fn stream_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    // An unparseable id cannot name a stored video.
    let video_id: VideoId = id.parse().map_err(|_| Error::not_found("video", &id))?;

    let video = ctx
        .with_conn(move |conn| rh_db::queries::videos::find_video(conn, video_id))
        .await?;

    let path = ctx.blobs.resolve(video.url()).map_err(|e| {
        tracing::error!(video_id = %video_id, url = video.url(), error = %e, "Stored locator is invalid");
        Error::Integrity(format!("video {video_id} has an invalid locator"))
    })?;

    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(video_id = %video_id, path = %path.display(), "Video file is missing");
            return Err(Error::not_found("video", video_id).into());
        }
        Err(e) => return Err(Error::from(e).into()),
    };

    let content_type = if video.content_type().is_empty() {
        guess_content_type(video.url())
    } else {
        video.content_type()
    };

    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    tracing::debug!(video_id = %video_id, range = ?range, "Streaming video");

    Ok(serve_file(file, content_type, range).await?)
}
