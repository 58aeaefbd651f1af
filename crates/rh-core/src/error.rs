//! Unified error type for reelhouse.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`]
//! and a client-safe message via [`Error::public_message`].

use std::fmt;

use crate::domain::DomainError;

/// Unified error type covering all failure modes in reelhouse.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "content").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A domain entity rejected its construction arguments.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A conflicting resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The request body exceeded the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Writing an uploaded blob to local storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// An external tool (ffprobe) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Media probing produced output that could not be interpreted.
    #[error("Probe error: {0}")]
    Probe(String),

    /// Stored rows do not form a valid aggregate.
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 422,
            Error::Domain(DomainError::DuplicateEpisode { .. }) => 409,
            Error::Domain(_) => 422,
            Error::Conflict(_) => 409,
            Error::PayloadTooLarge(_) => 413,
            Error::Storage(_) => 500,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Tool { .. } => 500,
            Error::Probe(_) => 500,
            Error::Integrity(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// The message that may be shown to a client.
    ///
    /// Server-side failures collapse to a generic sentence; their detail
    /// belongs in the log only.
    pub fn public_message(&self) -> String {
        match self {
            Error::NotFound { entity, .. } => format!("{entity} not found"),
            Error::Validation(msg) | Error::Conflict(msg) | Error::PayloadTooLarge(msg) => {
                msg.clone()
            }
            Error::Domain(e) => e.to_string(),
            _ => "an unexpected error occurred".into(),
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether this error maps to a 5xx response.
    pub fn is_server_error(&self) -> bool {
        self.http_status() >= 500
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("video", "abc-123");
        assert_eq!(err.to_string(), "video not found: abc-123");
        assert_eq!(err.http_status(), 404);
        assert_eq!(err.public_message(), "video not found");
    }

    #[test]
    fn validation_display() {
        let err = Error::Validation("title is required".into());
        assert_eq!(err.to_string(), "Validation error: title is required");
        assert_eq!(err.http_status(), 422);
        assert_eq!(err.public_message(), "title is required");
    }

    #[test]
    fn domain_is_transparent() {
        let err = Error::from(DomainError::VideoUrlRequired);
        assert_eq!(err.to_string(), "video url is required");
        assert_eq!(err.http_status(), 422);
        assert_eq!(err.public_message(), "video url is required");
    }

    #[test]
    fn duplicate_episode_is_conflict() {
        let err = Error::from(DomainError::DuplicateEpisode { season: 1, number: 2 });
        assert_eq!(err.http_status(), 409);
        assert_eq!(err.public_message(), "episode S01E02 already exists");
    }

    #[test]
    fn payload_too_large_is_413() {
        let err = Error::PayloadTooLarge("upload is too large".into());
        assert_eq!(err.http_status(), 413);
        assert_eq!(err.public_message(), "upload is too large");
        assert!(!err.is_server_error());
    }

    #[test]
    fn conflict_display() {
        let err = Error::Conflict("video already exists".into());
        assert_eq!(err.to_string(), "Conflict: video already exists");
        assert_eq!(err.http_status(), 409);
    }

    #[test]
    fn database_hides_detail() {
        let err = Error::database("connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.http_status(), 500);
        assert_eq!(err.public_message(), "an unexpected error occurred");
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.is_server_error());
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("ffprobe", "exit code 1");
        assert_eq!(err.to_string(), "Tool error [ffprobe]: exit code 1");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn storage_and_integrity_are_server_errors() {
        assert!(Error::Storage("disk full".into()).is_server_error());
        assert!(Error::Integrity("movie row missing".into()).is_server_error());
        assert!(!Error::Validation("bad".into()).is_server_error());
    }

    #[test]
    fn result_alias() {
        fn ok_fn() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(ok_fn().unwrap(), 42);

        fn err_fn() -> Result<i32> {
            Err(Error::Internal("boom".into()))
        }
        assert!(err_fn().is_err());
    }
}
