//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>`; `?` on any
//! [`rh_core::Result`] converts automatically. Every error body has the
//! single shape `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: rh_core::Error,
    client_status: Option<StatusCode>,
}

impl AppError {
    pub fn new(inner: rh_core::Error) -> Self {
        Self {
            inner,
            client_status: None,
        }
    }

    /// Report rejected input (normally 422) with `status` instead.
    ///
    /// Not-found, conflict and server errors keep their own status.
    pub fn invalid_input_as(mut self, status: StatusCode) -> Self {
        self.client_status = Some(status);
        self
    }

    pub fn inner(&self) -> &rh_core::Error {
        &self.inner
    }

    pub fn status(&self) -> StatusCode {
        let natural = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.client_status {
            Some(status) if natural == StatusCode::UNPROCESSABLE_ENTITY => status,
            _ => natural,
        }
    }
}

impl From<rh_core::Error> for AppError {
    fn from(e: rh_core::Error) -> Self {
        Self::new(e)
    }
}

impl From<rh_core::DomainError> for AppError {
    fn from(e: rh_core::DomainError) -> Self {
        Self::new(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        } else {
            tracing::debug!(status = %status, error = %self.inner, "Request rejected");
        }

        let body = json!({ "error": self.inner.public_message() });
        (status, axum::Json(body)).into_response()
    }
}
