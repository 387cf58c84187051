//! Raw rows and their normalization into [`Media`].
//!
//! Backends hand back rows as column → [`RawValue`] maps. JSON payloads arrive
//! either already structured ([`RawValue::Json`], from engines with native
//! nested types) or as text that still has to be parsed. Normalization is
//! per-row and best-effort: a row that cannot be read is logged and skipped so
//! the rest of the page still renders.

use std::collections::BTreeMap;
use std::fmt;

use mediacat_types::{Anime, Format, Manga, Media, MediaKind};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Columns selected for anime rows, in select-list order.
pub const ANIME_COLUMNS: &[&str] = &[
    "id",
    "slug",
    "cover_image",
    "banner_image",
    "trailer",
    "status",
    "season",
    "title",
    "current_episode",
    "mappings",
    "synonyms",
    "country_of_origin",
    "description",
    "duration",
    "color",
    "year",
    "rating",
    "popularity",
    "average_rating",
    "average_popularity",
    "genres",
    "format",
    "relations",
    "total_episodes",
    "episodes",
    "tags",
    "artwork",
    "characters",
];

/// Columns selected for manga rows, in select-list order.
pub const MANGA_COLUMNS: &[&str] = &[
    "id",
    "slug",
    "cover_image",
    "banner_image",
    "status",
    "title",
    "mappings",
    "synonyms",
    "country_of_origin",
    "description",
    "current_chapter",
    "total_volumes",
    "color",
    "year",
    "rating",
    "popularity",
    "average_rating",
    "average_popularity",
    "genres",
    "format",
    "relations",
    "publisher",
    "author",
    "total_chapters",
    "chapters",
    "tags",
    "artwork",
    "characters",
];

/// Columns read for `kind`.
#[must_use]
pub fn columns(kind: MediaKind) -> &'static [&'static str] {
    match kind {
        MediaKind::Anime => ANIME_COLUMNS,
        MediaKind::Manga => MANGA_COLUMNS,
    }
}

/// A single column value as the engine returned it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    /// Already-structured value (lists, structs).
    Json(Value),
}

impl RawValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Json(_) => "structured",
        }
    }
}

/// One result row: column name → value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: BTreeMap<String, RawValue>,
}

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: RawValue) {
        self.fields.insert(column.into(), value);
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: RawValue) -> Self {
        self.insert(column, value);
        self
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.fields.get(column)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn take(&mut self, column: &str) -> Option<RawValue> {
        self.fields.remove(column)
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Why a row was skipped.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("column `{column}` holds malformed JSON: {source}")]
    MalformedJson {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("column `{column}` holds an unexpected {found} value")]
    UnexpectedType {
        column: &'static str,
        found: &'static str,
    },

    #[error("column `{column}` does not match the progress layout: {source}")]
    Progress {
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid format: {0}")]
    Format(#[from] mediacat_types::Error),
}

/// Normalizes one row of the given kind.
pub fn normalize(kind: MediaKind, row: RawRow) -> Result<Media, RowError> {
    let mut fields = Fields { row };
    match kind {
        MediaKind::Anime => normalize_anime(&mut fields).map(Media::Anime),
        MediaKind::Manga => normalize_manga(&mut fields).map(Media::Manga),
    }
}

/// Normalizes every row, dropping (and logging) the ones that fail.
pub fn normalize_rows(kind: MediaKind, rows: Vec<RawRow>) -> Vec<Media> {
    let fetched = rows.len();
    let media: Vec<Media> = rows
        .into_iter()
        .filter_map(|row| {
            let id = RowId(row.get("id").cloned());
            match normalize(kind, row) {
                Ok(media) => Some(media),
                Err(e) => {
                    warn!("Dropping unreadable {} row {}: {}", kind, id, e);
                    None
                }
            }
        })
        .collect();
    if media.len() < fetched {
        debug!(
            "Normalized {} of {} {} rows",
            media.len(),
            fetched,
            kind
        );
    }
    media
}

struct RowId(Option<RawValue>);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(RawValue::Text(id)) => f.write_str(id),
            Some(RawValue::Integer(id)) => write!(f, "{id}"),
            Some(other) => write!(f, "<{}>", other.type_name()),
            None => f.write_str("<no id>"),
        }
    }
}

fn normalize_anime(fields: &mut Fields) -> Result<Anime, RowError> {
    Ok(Anime {
        id: fields.required_text("id")?,
        slug: fields.text("slug")?,
        cover_image: fields.text("cover_image")?,
        banner_image: fields.text("banner_image")?,
        trailer: fields.text("trailer")?,
        status: fields.text("status")?,
        // Some writers store the season JSON-quoted; it is plain text.
        season: fields.text("season")?.map(|s| s.replace('"', "")),
        title: fields.json("title")?,
        current_episode: fields.number("current_episode")?,
        mappings: fields.json("mappings")?,
        synonyms: fields.json("synonyms")?,
        country_of_origin: fields.text("country_of_origin")?,
        description: fields.text("description")?,
        duration: fields.number("duration")?,
        color: fields.text("color")?,
        year: fields.integer("year")?,
        rating: fields.json("rating")?,
        popularity: fields.json("popularity")?,
        average_rating: fields.number("average_rating")?,
        average_popularity: fields.number("average_popularity")?,
        genres: fields.json("genres")?,
        format: fields.format()?,
        relations: fields.json("relations")?,
        total_episodes: fields.number("total_episodes")?,
        episodes: fields.progress("episodes")?,
        tags: fields.json("tags")?,
        artwork: fields.json("artwork")?,
        characters: fields.json("characters")?,
    })
}

fn normalize_manga(fields: &mut Fields) -> Result<Manga, RowError> {
    Ok(Manga {
        id: fields.required_text("id")?,
        slug: fields.text("slug")?,
        cover_image: fields.text("cover_image")?,
        banner_image: fields.text("banner_image")?,
        status: fields.text("status")?,
        title: fields.json("title")?,
        mappings: fields.json("mappings")?,
        synonyms: fields.json("synonyms")?,
        country_of_origin: fields.text("country_of_origin")?,
        description: fields.text("description")?,
        current_chapter: fields.number("current_chapter")?,
        total_volumes: fields.number("total_volumes")?,
        color: fields.text("color")?,
        year: fields.integer("year")?,
        rating: fields.json("rating")?,
        popularity: fields.json("popularity")?,
        average_rating: fields.number("average_rating")?,
        average_popularity: fields.number("average_popularity")?,
        genres: fields.json("genres")?,
        format: fields.format()?,
        relations: fields.json("relations")?,
        publisher: fields.text("publisher")?,
        author: fields.text("author")?,
        total_chapters: fields.number("total_chapters")?,
        chapters: fields.progress("chapters")?,
        tags: fields.json("tags")?,
        artwork: fields.json("artwork")?,
        characters: fields.json("characters")?,
    })
}

/// Column accessors that coerce storage representations into Rust types.
struct Fields {
    row: RawRow,
}

impl Fields {
    fn required_text(&mut self, column: &'static str) -> Result<String, RowError> {
        self.text(column)?.ok_or(RowError::MissingColumn(column))
    }

    fn text(&mut self, column: &'static str) -> Result<Option<String>, RowError> {
        match self.row.take(column) {
            None | Some(RawValue::Null) | Some(RawValue::Json(Value::Null)) => Ok(None),
            Some(RawValue::Text(s)) | Some(RawValue::Json(Value::String(s))) => Ok(Some(s)),
            Some(RawValue::Integer(i)) => Ok(Some(i.to_string())),
            Some(RawValue::Real(f)) => Ok(Some(f.to_string())),
            Some(other) => Err(RowError::UnexpectedType {
                column,
                found: other.type_name(),
            }),
        }
    }

    fn number(&mut self, column: &'static str) -> Result<Option<f64>, RowError> {
        match self.row.take(column) {
            None | Some(RawValue::Null) | Some(RawValue::Json(Value::Null)) => Ok(None),
            Some(RawValue::Integer(i)) => Ok(Some(i as f64)),
            Some(RawValue::Real(f)) => Ok(Some(f)),
            Some(RawValue::Json(Value::Number(n))) => Ok(n.as_f64()),
            Some(RawValue::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(RawValue::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| RowError::UnexpectedType {
                    column,
                    found: "non-numeric text",
                }),
            Some(other) => Err(RowError::UnexpectedType {
                column,
                found: other.type_name(),
            }),
        }
    }

    fn integer(&mut self, column: &'static str) -> Result<Option<i64>, RowError> {
        match self.row.take(column) {
            None | Some(RawValue::Null) | Some(RawValue::Json(Value::Null)) => Ok(None),
            Some(RawValue::Integer(i)) => Ok(Some(i)),
            Some(RawValue::Real(f)) if f.fract() == 0.0 => Ok(Some(f as i64)),
            Some(RawValue::Json(Value::Number(n))) if n.as_i64().is_some() => Ok(n.as_i64()),
            Some(RawValue::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(RawValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| RowError::UnexpectedType {
                    column,
                    found: "non-integer text",
                }),
            Some(other) => Err(RowError::UnexpectedType {
                column,
                found: other.type_name(),
            }),
        }
    }

    fn json(&mut self, column: &'static str) -> Result<Value, RowError> {
        match self.row.take(column) {
            None | Some(RawValue::Null) => Ok(Value::Null),
            Some(RawValue::Json(value)) => Ok(value),
            Some(RawValue::Text(text)) => serde_json::from_str(&text)
                .map_err(|source| RowError::MalformedJson { column, source }),
            Some(RawValue::Blob(bytes)) => serde_json::from_slice(&bytes)
                .map_err(|source| RowError::MalformedJson { column, source }),
            Some(RawValue::Integer(i)) => Ok(Value::from(i)),
            Some(RawValue::Real(f)) => Ok(Value::from(f)),
            Some(RawValue::Bool(b)) => Ok(Value::Bool(b)),
        }
    }

    fn progress<T: DeserializeOwned>(&mut self, column: &'static str) -> Result<T, RowError> {
        match self.json(column)? {
            Value::Null => Err(RowError::MissingColumn(column)),
            value => serde_json::from_value(value)
                .map_err(|source| RowError::Progress { column, source }),
        }
    }

    fn format(&mut self) -> Result<Format, RowError> {
        let tag = self.required_text("format")?;
        Ok(tag.parse()?)
    }
}
