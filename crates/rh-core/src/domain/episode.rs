//! A single tv show episode.

use chrono::{DateTime, Utc};

use super::{DomainError, Thumbnail, Video};
use crate::EpisodeId;

#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    id: EpisodeId,
    title: String,
    description: String,
    season: u32,
    number: u32,
    video: Video,
    thumbnail: Option<Thumbnail>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Episode {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        season: u32,
        number: u32,
        video: Video,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        if title.is_empty() {
            return Err(DomainError::EpisodeTitleRequired);
        }
        if season == 0 {
            return Err(DomainError::EpisodeSeasonNotPositive);
        }
        if number == 0 {
            return Err(DomainError::EpisodeNumberNotPositive);
        }

        let now = Utc::now();
        Ok(Self {
            id: EpisodeId::new(),
            title,
            description: description.into(),
            season,
            number,
            video,
            thumbnail: None,
            created_at: now,
            updated_at: now,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: EpisodeId,
        title: String,
        description: String,
        season: u32,
        number: u32,
        video: Video,
        thumbnail: Option<Thumbnail>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            season,
            number,
            video,
            thumbnail,
            created_at,
            updated_at,
        }
    }

    pub fn add_thumbnail(&mut self, thumbnail: Thumbnail) {
        self.thumbnail = Some(thumbnail);
        self.updated_at = Utc::now();
    }

    pub fn id(&self) -> EpisodeId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn season(&self) -> u32 {
        self.season
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn video(&self) -> &Video {
        &self.video
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
