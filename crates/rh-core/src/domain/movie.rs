//! Movie payload: one video, optionally a thumbnail.

use chrono::{DateTime, Utc};

use super::{Thumbnail, Video};
use crate::MovieId;

#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    id: MovieId,
    video: Video,
    thumbnail: Option<Thumbnail>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Movie {
    /// A movie cannot exist without its video, so it is taken by value.
    pub fn new(video: Video) -> Self {
        let now = Utc::now();
        Self {
            id: MovieId::new(),
            video,
            thumbnail: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn hydrate(
        id: MovieId,
        video: Video,
        thumbnail: Option<Thumbnail>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            video,
            thumbnail,
            created_at,
            updated_at,
        }
    }

    /// Attach (or replace) the thumbnail.
    pub fn add_thumbnail(&mut self, thumbnail: Thumbnail) {
        self.thumbnail = Some(thumbnail);
        self.updated_at = Utc::now();
    }

    pub fn id(&self) -> MovieId {
        self.id
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

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> Video {
        Video::new("/upload/videos/m.mp4", 4, Some(60), "video/mp4").unwrap()
    }

    #[test]
    fn new_movie_has_no_thumbnail() {
        let m = Movie::new(video());
        assert!(m.thumbnail().is_none());
        assert_eq!(m.video().url(), "/upload/videos/m.mp4");
    }

    #[test]
    fn add_thumbnail_bumps_updated_at() {
        let mut m = Movie::new(video());
        let before = m.updated_at();
        m.add_thumbnail(Thumbnail::new("/upload/thumbs/t.jpg").unwrap());
        assert_eq!(m.thumbnail().unwrap().url(), "/upload/thumbs/t.jpg");
        assert!(m.updated_at() >= before);
        assert_eq!(m.created_at(), before);
    }
}
