//! Tv show payload: an optional thumbnail and an ordered list of episodes.

use chrono::{DateTime, Utc};

use super::{DomainError, Episode, Thumbnail};
use crate::TvShowId;

#[derive(Debug, Clone, PartialEq)]
pub struct TvShow {
    id: TvShowId,
    thumbnail: Option<Thumbnail>,
    episodes: Vec<Episode>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Default for TvShow {
    fn default() -> Self {
        Self::new()
    }
}

impl TvShow {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: TvShowId::new(),
            thumbnail: None,
            episodes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn hydrate(
        id: TvShowId,
        thumbnail: Option<Thumbnail>,
        episodes: Vec<Episode>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            thumbnail,
            episodes,
            created_at,
            updated_at,
        }
    }

    /// Append an episode. (season, number) pairs are unique within a show.
    pub fn add_episode(&mut self, episode: Episode) -> Result<(), DomainError> {
        if self.episode(episode.season(), episode.number()).is_some() {
            return Err(DomainError::DuplicateEpisode {
                season: episode.season(),
                number: episode.number(),
            });
        }
        self.episodes.push(episode);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn add_thumbnail(&mut self, thumbnail: Thumbnail) {
        self.thumbnail = Some(thumbnail);
        self.updated_at = Utc::now();
    }

    /// Look up an episode by its season and number.
    pub fn episode(&self, season: u32, number: u32) -> Option<&Episode> {
        self.episodes
            .iter()
            .find(|ep| ep.season() == season && ep.number() == number)
    }

    pub fn id(&self) -> TvShowId {
        self.id
    }

    pub fn thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnail.as_ref()
    }

    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
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

    fn episode(season: u32, number: u32) -> Episode {
        let video = Video::new("/upload/videos/e.mp4", 1, None, "video/mp4").unwrap();
        Episode::new(format!("S{season}E{number}"), "", season, number, video).unwrap()
    }

    #[test]
    fn add_episodes_in_order() {
        let mut show = TvShow::new();
        show.add_episode(episode(1, 2)).unwrap();
        show.add_episode(episode(1, 1)).unwrap();
        show.add_episode(episode(2, 1)).unwrap();
        let titles: Vec<_> = show.episodes().iter().map(|e| e.title()).collect();
        assert_eq!(titles, ["S1E2", "S1E1", "S2E1"]);
        assert!(show.episode(2, 1).is_some());
        assert!(show.episode(3, 1).is_none());
    }

    #[test]
    fn duplicate_episode_rejected() {
        let mut show = TvShow::new();
        show.add_episode(episode(1, 3)).unwrap();
        let err = show.add_episode(episode(1, 3)).unwrap_err();
        assert_eq!(err, DomainError::DuplicateEpisode { season: 1, number: 3 });
        assert_eq!(err.to_string(), "episode S01E03 already exists");
        assert_eq!(show.episodes().len(), 1);
    }
}
