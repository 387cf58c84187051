//! Request validation and pagination arithmetic.

use std::collections::BTreeSet;

use mediacat_types::{Format, Media, MediaKind};
use serde::Serialize;

use crate::error::{StorageError, StorageResult};

/// A validated "recently updated" request.
///
/// Construction is the reject-early point: unknown tags and a zero page size
/// never make it past here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentRequest {
    kind: MediaKind,
    formats: BTreeSet<Format>,
    window: PageWindow,
}

impl RecentRequest {
    pub fn new(
        kind: MediaKind,
        formats: impl IntoIterator<Item = Format>,
        page: u32,
        per_page: u32,
    ) -> StorageResult<Self> {
        Ok(Self {
            kind,
            formats: formats.into_iter().collect(),
            window: PageWindow::new(page, per_page)?,
        })
    }

    /// Builds a request from untrusted string tags.
    pub fn from_tags<'a>(
        kind: &str,
        formats: impl IntoIterator<Item = &'a str>,
        page: u32,
        per_page: u32,
    ) -> StorageResult<Self> {
        let kind: MediaKind = kind.parse()?;
        let formats = formats
            .into_iter()
            .map(str::parse::<Format>)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Self::new(kind, formats, page, per_page)
    }

    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// Requested formats; empty means "any format".
    #[must_use]
    pub fn formats(&self) -> &BTreeSet<Format> {
        &self.formats
    }

    #[must_use]
    pub fn window(&self) -> PageWindow {
        self.window
    }
}

/// Page number and size, with the derived LIMIT/OFFSET.
///
/// Pages are 1-based; page 0 is treated as the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u32,
    per_page: u32,
}

impl PageWindow {
    pub fn new(page: u32, per_page: u32) -> StorageResult<Self> {
        if per_page == 0 {
            return Err(StorageError::InvalidInput(
                "page size must be positive".into(),
            ));
        }
        Ok(Self { page, per_page })
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// The page actually served (page 0 is served as page 1).
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.page.max(1)
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        if self.page > 0 {
            u64::from(self.per_page) * u64::from(self.page - 1)
        } else {
            0
        }
    }

    /// `ceil(total / per_page)`.
    #[must_use]
    pub fn last_page(&self, total: u64) -> u64 {
        total.div_ceil(self.limit())
    }
}

/// A page of recently updated entries plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPage {
    pub items: Vec<Media>,
    /// Rows matching the filter across all pages.
    pub total: u64,
    pub current_page: u32,
    pub per_page: u32,
    pub last_page: u64,
    pub has_next_page: bool,
}

impl RecentPage {
    pub(crate) fn new(items: Vec<Media>, total: u64, window: PageWindow) -> Self {
        let last_page = window.last_page(total);
        Self {
            items,
            total,
            current_page: window.current_page(),
            per_page: window.per_page(),
            last_page,
            has_next_page: u64::from(window.current_page()) < last_page,
        }
    }
}
