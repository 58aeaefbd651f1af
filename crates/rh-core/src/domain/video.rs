//! Stored video file record.

use chrono::{DateTime, Utc};

use super::DomainError;
use crate::VideoId;

/// A video file held by the blob store.
///
/// `duration` is `None` when the probe could not determine it. A known
/// duration is always at least one second.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    id: VideoId,
    url: String,
    size_kb: u64,
    duration: Option<u32>,
    content_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Video {
    /// Create a new video record for a freshly stored file.
    pub fn new(
        url: impl Into<String>,
        size_kb: u64,
        duration: Option<u32>,
        content_type: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let url = url.into();
        if url.is_empty() {
            return Err(DomainError::VideoUrlRequired);
        }
        if size_kb == 0 {
            return Err(DomainError::VideoSizeNotPositive);
        }
        if duration == Some(0) {
            return Err(DomainError::VideoDurationNotPositive);
        }

        let now = Utc::now();
        Ok(Self {
            id: VideoId::new(),
            url,
            size_kb,
            duration,
            content_type: content_type.into(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a video from stored values.
    pub fn hydrate(
        id: VideoId,
        url: String,
        size_kb: u64,
        duration: Option<u32>,
        content_type: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            url,
            size_kb,
            duration,
            content_type,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> VideoId {
        self.id
    }

    /// Root-relative locator, e.g. `/upload/videos/<id>.mp4`.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn size_kb(&self) -> u64 {
        self.size_kb
    }

    pub fn duration(&self) -> Option<u32> {
        self.duration
    }

    /// MIME type sniffed at upload time.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
