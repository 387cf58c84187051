use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::progress::{ChapterProgress, EpisodeProgress, LatestUpdate};
use crate::{Format, MediaKind};

/// An anime catalog entry.
///
/// Fields typed as [`Value`] are provider payloads this crate never looks
/// inside; they are serialized back out exactly as they were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anime {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub trailer: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub current_episode: Option<f64>,
    #[serde(default)]
    pub mappings: Value,
    #[serde(default)]
    pub synonyms: Value,
    #[serde(default)]
    pub country_of_origin: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub rating: Value,
    #[serde(default)]
    pub popularity: Value,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub average_popularity: Option<f64>,
    #[serde(default)]
    pub genres: Value,
    pub format: Format,
    #[serde(default)]
    pub relations: Value,
    #[serde(default)]
    pub total_episodes: Option<f64>,
    pub episodes: EpisodeProgress,
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub artwork: Value,
    #[serde(default)]
    pub characters: Value,
}

/// A manga catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manga {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub mappings: Value,
    #[serde(default)]
    pub synonyms: Value,
    #[serde(default)]
    pub country_of_origin: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub current_chapter: Option<f64>,
    #[serde(default)]
    pub total_volumes: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub rating: Value,
    #[serde(default)]
    pub popularity: Value,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub average_popularity: Option<f64>,
    #[serde(default)]
    pub genres: Value,
    pub format: Format,
    #[serde(default)]
    pub relations: Value,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub total_chapters: Option<f64>,
    pub chapters: ChapterProgress,
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub artwork: Value,
    #[serde(default)]
    pub characters: Value,
}

/// Either kind of catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Media {
    Anime(Anime),
    Manga(Manga),
}

impl Media {
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Anime(_) => MediaKind::Anime,
            Self::Manga(_) => MediaKind::Manga,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Anime(anime) => &anime.id,
            Self::Manga(manga) => &manga.id,
        }
    }

    #[must_use]
    pub fn format(&self) -> Format {
        match self {
            Self::Anime(anime) => anime.format,
            Self::Manga(manga) => manga.format,
        }
    }

    /// The `latest` record under `episodes` or `chapters`.
    #[must_use]
    pub fn latest_update(&self) -> LatestUpdate<'_> {
        match self {
            Self::Anime(anime) => anime.episodes.latest.as_update(),
            Self::Manga(manga) => manga.chapters.latest.as_update(),
        }
    }
}

impl From<Anime> for Media {
    fn from(anime: Anime) -> Self {
        Self::Anime(anime)
    }
}

impl From<Manga> for Media {
    fn from(manga: Manga) -> Self {
        Self::Manga(manga)
    }
}
