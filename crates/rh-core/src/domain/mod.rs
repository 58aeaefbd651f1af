//! The content aggregate.
//!
//! A [`Content`] is the root: it owns exactly one [`Media`] payload, which is
//! either a [`Movie`] or a [`TvShow`]. Movies and episodes own their
//! [`Video`] and optional [`Thumbnail`]. Constructors enforce the rules
//! listed on [`DomainError`]; `hydrate` constructors rebuild stored entities
//! without re-running them.

pub mod content;
pub mod episode;
pub mod movie;
pub mod thumbnail;
pub mod tv_show;
pub mod video;

pub use content::{Content, ContentType, Media};
pub use episode::Episode;
pub use movie::Movie;
pub use thumbnail::Thumbnail;
pub use tv_show::TvShow;
pub use video::Video;

/// Longest accepted content title, in characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// A rule of the content aggregate that a constructor or mutator refused to
/// break.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("content title is required")]
    ContentTitleRequired,

    #[error("content title must be at most {max} characters")]
    ContentTitleTooLong { max: usize },

    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("invalid content type: {0}")]
    InvalidContentType(String),

    #[error("media type mismatch: expected {expected}")]
    MediaTypeMismatch { expected: ContentType },

    #[error("content is not a movie")]
    NotAMovie,

    #[error("content is not a tv show")]
    NotATvShow,

    #[error("video url is required")]
    VideoUrlRequired,

    #[error("video size must be positive")]
    VideoSizeNotPositive,

    #[error("video duration must be positive")]
    VideoDurationNotPositive,

    #[error("thumbnail url is required")]
    ThumbnailUrlRequired,

    #[error("episode title is required")]
    EpisodeTitleRequired,

    #[error("episode season must be a positive number")]
    EpisodeSeasonNotPositive,

    #[error("episode number must be a positive number")]
    EpisodeNumberNotPositive,

    #[error("episode S{season:02}E{number:02} already exists")]
    DuplicateEpisode { season: u32, number: u32 },
}
