use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Release-format tag.
///
/// This is a closed set: any string that reaches a query has first been
/// parsed into one of these variants, so filter values can never alter the
/// shape of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Format {
    Tv,
    TvShort,
    Movie,
    Special,
    Ova,
    Ona,
    Music,
    Manga,
    Novel,
    OneShot,
    Unknown,
}

impl Format {
    /// Every format tag, in declaration order.
    pub const ALL: [Format; 11] = [
        Format::Tv,
        Format::TvShort,
        Format::Movie,
        Format::Special,
        Format::Ova,
        Format::Ona,
        Format::Music,
        Format::Manga,
        Format::Novel,
        Format::OneShot,
        Format::Unknown,
    ];

    /// The tag as stored in the `format` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tv => "TV",
            Self::TvShort => "TV_SHORT",
            Self::Movie => "MOVIE",
            Self::Special => "SPECIAL",
            Self::Ova => "OVA",
            Self::Ona => "ONA",
            Self::Music => "MUSIC",
            Self::Manga => "MANGA",
            Self::Novel => "NOVEL",
            Self::OneShot => "ONE_SHOT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}
