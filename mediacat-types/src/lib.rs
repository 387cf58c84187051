//! Core type definitions for mediacat.
//!
//! This crate defines the catalog vocabulary shared by every storage backend:
//! - [`MediaKind`]: the two catalog item types and where their data lives
//! - [`Format`]: the closed set of release-format tags used for filtering
//! - [`Anime`], [`Manga`] and [`Media`]: the canonical in-memory entities
//! - [`LatestUpdate`]: a view over an entity's most recent release record
//!
//! Opaque payloads (titles, artwork, relations, ...) are carried as
//! [`serde_json::Value`] and passed through untouched.

mod format;
mod kind;
mod media;
mod progress;

pub use format::Format;
pub use kind::MediaKind;
pub use media::{Anime, Manga, Media};
pub use progress::{
    ChapterProgress, EpisodeProgress, LatestChapter, LatestEpisode, LatestUpdate, Progress,
    ReleaseCount, UpdatedAt,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing catalog tags.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown media kind: {0:?}")]
    UnknownKind(String),

    #[error("unknown format tag: {0:?}")]
    UnknownFormat(String),
}
