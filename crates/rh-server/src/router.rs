//! Axum router construction.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::movies::create_movie,
        routes::videos::create_video,
        routes::stream::stream_video,
        routes::tv_shows::create_tv_show,
        routes::tv_shows::add_episode,
        routes::contents::get_content,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::movies::MovieUploadForm,
        routes::movies::UploadResponse,
        routes::videos::VideoUploadForm,
        routes::tv_shows::TvShowForm,
        routes::tv_shows::EpisodeForm,
        routes::tv_shows::TvShowCreatedResponse,
        routes::tv_shows::EpisodeCreatedResponse,
        routes::contents::ContentResponse,
        routes::contents::MovieResponse,
        routes::contents::TvShowResponse,
        routes::contents::EpisodeResponse,
        routes::contents::VideoResponse,
        routes::contents::ThumbnailResponse,
        rh_core::domain::ContentType,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = usize::try_from(ctx.config.server.max_upload_bytes).unwrap_or(usize::MAX);

    let uploads = Router::new()
        .route("/movies", post(routes::movies::create_movie))
        .route("/videos", post(routes::videos::create_video))
        .route("/tv-shows", post(routes::tv_shows::create_tv_show))
        .route("/tv-shows/{id}/episodes", post(routes::tv_shows::add_episode))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/videos/{id}", get(routes::stream::stream_video))
        .route("/videos/{id}/stream", get(routes::stream::stream_video))
        .route("/contents/{id}", get(routes::contents::get_content))
        .merge(uploads)
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let db = rh_db::pool::init_memory_pool().unwrap();
        let ctx = AppContext::new(
            db,
            rh_core::config::Config::default(),
            Arc::new(rh_av::UnavailableProbe),
        );
        build_router(ctx)
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(get(app(), "/health").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn openapi_lists_upload_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/movies"));
        assert!(doc.paths.paths.contains_key("/videos/{id}/stream"));
        assert_eq!(
            get(app(), "/api-docs/openapi.json").await.status(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn unknown_video_is_404() {
        let id = uuid::Uuid::new_v4();
        let response = get(app(), &format!("/videos/{id}/stream")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn oversized_upload_is_413() {
        let storage = tempfile::tempdir().unwrap();
        let mut config = rh_core::config::Config::default();
        config.storage.root = storage.path().to_path_buf();
        config.server.max_upload_bytes = 1024;
        let ctx = AppContext::new(
            rh_db::pool::init_memory_pool().unwrap(),
            config,
            Arc::new(rh_av::UnavailableProbe),
        );

        let boundary = "reelhouse-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nBig\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"big.mp4\"\r\n\
             Content-Type: video/mp4\r\n\r\n"
        )
        .into_bytes();
        body.extend(std::iter::repeat(0u8).take(8192));
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::post("/movies")
            .header(
                axum::http::header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = build_router(ctx).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn malformed_id_is_404() {
        let response = get(app(), "/videos/not-a-uuid").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
