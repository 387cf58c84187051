use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The catalog item types.
///
/// Each kind owns a table and a nested progress document. The progress
/// document keeps its most recent release under `latest`, keyed by a
/// kind-specific count field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    Anime,
    Manga,
}

impl MediaKind {
    /// Every supported kind.
    pub const ALL: [MediaKind; 2] = [MediaKind::Anime, MediaKind::Manga];

    /// The tag used on the wire and in configuration (`ANIME`, `MANGA`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Anime => "ANIME",
            Self::Manga => "MANGA",
        }
    }

    /// Table holding entities of this kind.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Manga => "manga",
        }
    }

    /// Column holding the progress document (`episodes` / `chapters`).
    #[must_use]
    pub const fn progress_column(&self) -> &'static str {
        match self {
            Self::Anime => "episodes",
            Self::Manga => "chapters",
        }
    }

    /// Key of the release count inside `<progress>.latest`.
    #[must_use]
    pub const fn latest_count_key(&self) -> &'static str {
        match self {
            Self::Anime => "latestEpisode",
            Self::Manga => "latestChapter",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    /// Parses a kind tag, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}
