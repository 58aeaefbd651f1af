//! Stored thumbnail image record.

use chrono::{DateTime, Utc};

use super::DomainError;
use crate::ThumbnailId;

#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    id: ThumbnailId,
    url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Thumbnail {
    pub fn new(url: impl Into<String>) -> Result<Self, DomainError> {
        let url = url.into();
        if url.is_empty() {
            return Err(DomainError::ThumbnailUrlRequired);
        }
        let now = Utc::now();
        Ok(Self {
            id: ThumbnailId::new(),
            url,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn hydrate(
        id: ThumbnailId,
        url: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            url,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> ThumbnailId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
