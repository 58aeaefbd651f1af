//! Content aggregate root.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{DomainError, Movie, TvShow, MAX_TITLE_CHARS};
use crate::ContentId;

/// Kind of media a content carries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    Movie,
    TvShow,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "MOVIE",
            Self::TvShow => "TV_SHOW",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOVIE" => Ok(Self::Movie),
            "TV_SHOW" => Ok(Self::TvShow),
            other => Err(DomainError::InvalidContentType(other.to_string())),
        }
    }
}

/// The payload owned by a [`Content`].
#[derive(Debug, Clone, PartialEq)]
pub enum Media {
    Movie(Movie),
    TvShow(TvShow),
}

impl Media {
    /// The content type this payload belongs to.
    pub fn content_type(&self) -> ContentType {
        match self {
            Media::Movie(_) => ContentType::Movie,
            Media::TvShow(_) => ContentType::TvShow,
        }
    }
}

impl From<Movie> for Media {
    fn from(m: Movie) -> Self {
        Media::Movie(m)
    }
}

impl From<TvShow> for Media {
    fn from(t: TvShow) -> Self {
        Media::TvShow(t)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    id: ContentId,
    title: String,
    description: String,
    content_type: ContentType,
    media: Media,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn check_title(title: &str, empty: DomainError) -> Result<(), DomainError> {
    if title.is_empty() {
        return Err(empty);
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(DomainError::ContentTitleTooLong {
            max: MAX_TITLE_CHARS,
        });
    }
    Ok(())
}

impl Content {
    /// Create a new content. The payload must match `content_type`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        content_type: ContentType,
        media: impl Into<Media>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        check_title(&title, DomainError::ContentTitleRequired)?;

        let media = media.into();
        if media.content_type() != content_type {
            return Err(DomainError::MediaTypeMismatch {
                expected: content_type,
            });
        }

        let now = Utc::now();
        Ok(Self {
            id: ContentId::new(),
            title,
            description: description.into(),
            content_type,
            media,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a stored content. Only the payload/type agreement is checked.
    pub fn hydrate(
        id: ContentId,
        title: String,
        description: String,
        content_type: ContentType,
        media: Media,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if media.content_type() != content_type {
            return Err(DomainError::MediaTypeMismatch {
                expected: content_type,
            });
        }
        Ok(Self {
            id,
            title,
            description,
            content_type,
            media,
            created_at,
            updated_at,
        })
    }

    pub fn change_title(&mut self, new_title: impl Into<String>) -> Result<(), DomainError> {
        let new_title = new_title.into();
        check_title(&new_title, DomainError::EmptyTitle)?;
        self.title = new_title;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn id(&self) -> ContentId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn media(&self) -> &Media {
        &self.media
    }

    pub fn movie(&self) -> Result<&Movie, DomainError> {
        match &self.media {
            Media::Movie(m) => Ok(m),
            Media::TvShow(_) => Err(DomainError::NotAMovie),
        }
    }

    pub fn tv_show(&self) -> Result<&TvShow, DomainError> {
        match &self.media {
            Media::TvShow(t) => Ok(t),
            Media::Movie(_) => Err(DomainError::NotATvShow),
        }
    }

    pub fn tv_show_mut(&mut self) -> Result<&mut TvShow, DomainError> {
        match &mut self.media {
            Media::TvShow(t) => Ok(t),
            Media::Movie(_) => Err(DomainError::NotATvShow),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Video;

    fn movie() -> Movie {
        Movie::new(Video::new("/upload/videos/a.mp4", 8, Some(10), "video/mp4").unwrap())
    }

    #[test]
    fn new_movie_content() {
        let c = Content::new("Heat", "1995", ContentType::Movie, movie()).unwrap();
        assert_eq!(c.title(), "Heat");
        assert_eq!(c.content_type(), ContentType::Movie);
        assert!(c.movie().is_ok());
        assert_eq!(c.tv_show().unwrap_err(), DomainError::NotATvShow);
    }

    #[test]
    fn new_tv_show_content() {
        let c = Content::new("Lost", "", ContentType::TvShow, TvShow::new()).unwrap();
        assert!(c.tv_show().unwrap().episodes().is_empty());
        assert_eq!(c.movie().unwrap_err(), DomainError::NotAMovie);
    }

    #[test]
    fn empty_title_rejected() {
        let err = Content::new("", "d", ContentType::Movie, movie()).unwrap_err();
        assert_eq!(err, DomainError::ContentTitleRequired);
    }

    #[test]
    fn long_title_rejected() {
        let title = "x".repeat(MAX_TITLE_CHARS + 1);
        let err = Content::new(title, "", ContentType::Movie, movie()).unwrap_err();
        assert_eq!(err, DomainError::ContentTitleTooLong { max: 255 });

        let title = "é".repeat(MAX_TITLE_CHARS);
        assert!(Content::new(title, "", ContentType::Movie, movie()).is_ok());
    }

    #[test]
    fn mismatched_media_rejected() {
        let err = Content::new("t", "", ContentType::TvShow, movie()).unwrap_err();
        assert_eq!(err.to_string(), "media type mismatch: expected TV_SHOW");

        let err = Content::new("t", "", ContentType::Movie, TvShow::new()).unwrap_err();
        assert_eq!(err.to_string(), "media type mismatch: expected MOVIE");
    }

    #[test]
    fn change_title() {
        let mut c = Content::new("Old", "", ContentType::Movie, movie()).unwrap();
        c.change_title("New").unwrap();
        assert_eq!(c.title(), "New");
        assert_eq!(c.change_title("").unwrap_err(), DomainError::EmptyTitle);
        assert_eq!(c.title(), "New");
    }

    #[test]
    fn hydrate_checks_type_agreement() {
        let now = Utc::now();
        let ok = Content::hydrate(
            ContentId::new(),
            "t".into(),
            String::new(),
            ContentType::Movie,
            Media::Movie(movie()),
            now,
            now,
        );
        assert!(ok.is_ok());

        let bad = Content::hydrate(
            ContentId::new(),
            "t".into(),
            String::new(),
            ContentType::TvShow,
            Media::Movie(movie()),
            now,
            now,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn content_type_strings() {
        assert_eq!(ContentType::Movie.to_string(), "MOVIE");
        assert_eq!("TV_SHOW".parse::<ContentType>().unwrap(), ContentType::TvShow);
        assert!("SERIES".parse::<ContentType>().is_err());
        assert_eq!(
            serde_json::to_string(&ContentType::TvShow).unwrap(),
            "\"TV_SHOW\""
        );
    }
}
