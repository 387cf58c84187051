//! Release progress documents (`episodes` / `chapters`).
//!
//! Both kinds store the same shape under different key names:
//!
//! ```json
//! { "latest": { "latestEpisode": 12, "updatedAt": 1700000000000, "latestTitle": "..." },
//!   "data": [ ... ] }
//! ```
//!
//! `updatedAt` is written by several upstream providers and shows up as a
//! number, a numeric string, an empty string or not at all. The latest count
//! can likewise arrive as a number or a numeric string.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A progress document with a kind-specific `latest` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress<L> {
    pub latest: L,
    /// Per-provider release listing. Passed through untouched.
    #[serde(default)]
    pub data: Value,
}

/// Progress document of an anime.
pub type EpisodeProgress = Progress<LatestEpisode>;

/// Progress document of a manga.
pub type ChapterProgress = Progress<LatestChapter>;

/// The latest episode/chapter number, kept in its stored form.
///
/// Some providers write the count as a string (`"12"`); it still counts as a
/// release when the text is a positive number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReleaseCount {
    Number(Number),
    Text(String),
}

impl ReleaseCount {
    /// Numeric value; `None` for text that is not a finite number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }
}

impl Default for ReleaseCount {
    fn default() -> Self {
        Self::Number(Number::from(0))
    }
}

impl From<i64> for ReleaseCount {
    fn from(count: i64) -> Self {
        Self::Number(Number::from(count))
    }
}

/// Most recent episode release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestEpisode {
    #[serde(default)]
    pub latest_episode: ReleaseCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<UpdatedAt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_title: Option<String>,
}

impl LatestEpisode {
    #[must_use]
    pub fn as_update(&self) -> LatestUpdate<'_> {
        LatestUpdate {
            latest_count: &self.latest_episode,
            updated_at: self.updated_at.as_ref(),
        }
    }
}

/// Most recent chapter release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestChapter {
    #[serde(default)]
    pub latest_chapter: ReleaseCount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<UpdatedAt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_title: Option<String>,
}

impl LatestChapter {
    #[must_use]
    pub fn as_update(&self) -> LatestUpdate<'_> {
        LatestUpdate {
            latest_count: &self.latest_chapter,
            updated_at: self.updated_at.as_ref(),
        }
    }
}

/// The `updatedAt` value of a latest record, kept in its stored form so
/// entities serialize back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpdatedAt {
    Millis(Number),
    Text(String),
}

impl UpdatedAt {
    /// Milliseconds since the Unix epoch.
    ///
    /// Empty strings and values that do not look like a timestamp map to 0.
    /// Numeric strings are read as millis; RFC 3339 strings are accepted too.
    #[must_use]
    pub fn to_millis(&self) -> i64 {
        match self {
            Self::Millis(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or(0),
            Self::Text(s) => text_millis(s),
        }
    }
}

fn text_millis(raw: &str) -> i64 {
    let text = raw.trim();
    if text.is_empty() {
        return 0;
    }
    if let Ok(millis) = text.parse::<i64>() {
        return millis;
    }
    if let Ok(millis) = text.parse::<f64>() {
        return if millis.is_finite() { millis as i64 } else { 0 };
    }
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Kind-independent view over an entity's latest release record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestUpdate<'a> {
    pub latest_count: &'a ReleaseCount,
    pub updated_at: Option<&'a UpdatedAt>,
}

impl LatestUpdate<'_> {
    /// True when at least one episode/chapter has been released.
    #[must_use]
    pub fn has_releases(&self) -> bool {
        self.latest_count.as_f64().is_some_and(|count| count > 0.0)
    }

    /// `updatedAt` as epoch millis; absent values count as 0.
    #[must_use]
    pub fn updated_at_millis(&self) -> i64 {
        self.updated_at.map_or(0, UpdatedAt::to_millis)
    }
}
