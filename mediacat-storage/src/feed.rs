//! The recent listing: fetch, normalize, order.

use std::sync::Arc;
use std::time::Duration;

use mediacat_types::Media;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backend::RecentBackend;
use crate::config::{active_engine, StorageEngine};
use crate::error::{StorageError, StorageResult};
use crate::recency;
use crate::request::{RecentPage, RecentRequest};
use crate::row;

/// Serves "most recently updated" pages from one backend.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct RecentFeed {
    backend: Arc<dyn RecentBackend>,
}

impl RecentFeed {
    pub fn new(backend: Arc<dyn RecentBackend>) -> Self {
        Self { backend }
    }

    /// Like [`new`](Self::new), but fails unless `backend` matches the
    /// process-wide engine.
    pub fn from_active(backend: Arc<dyn RecentBackend>) -> StorageResult<Self> {
        let engine = active_engine()?;
        if backend.engine() != engine {
            return Err(StorageError::Config(format!(
                "backend is {} but the configured engine is {engine}",
                backend.engine()
            )));
        }
        Ok(Self::new(backend))
    }

    #[must_use]
    pub fn engine(&self) -> StorageEngine {
        self.backend.engine()
    }

    /// Entries with at least one release, newest `updatedAt` first.
    pub fn fetch_recent(&self, request: &RecentRequest) -> StorageResult<Vec<Media>> {
        Ok(self.fetch_recent_page(request)?.items)
    }

    /// Same listing as [`fetch_recent`](Self::fetch_recent), with the total
    /// row count and page bounds.
    pub fn fetch_recent_page(&self, request: &RecentRequest) -> StorageResult<RecentPage> {
        self.run(request, &CancellationToken::new())
    }

    /// Runs the listing on the blocking pool. Cancelling `cancel` aborts the
    /// count and page queries together.
    ///
    /// The token is checked before each statement and before each row, so a
    /// statement that is already executing finishes first; the request then
    /// fails with [`StorageError::Cancelled`] and its transaction is rolled
    /// back.
    pub async fn fetch_recent_async(
        &self,
        request: RecentRequest,
        cancel: CancellationToken,
    ) -> StorageResult<Vec<Media>> {
        let feed = self.clone();
        let page = tokio::task::spawn_blocking(move || feed.run(&request, &cancel)).await??;
        Ok(page.items)
    }

    /// [`fetch_recent_async`](Self::fetch_recent_async) with a deadline.
    ///
    /// On expiry the token is cancelled and the call waits for the blocking
    /// task to reach its next check. A single slow statement can therefore
    /// overrun `timeout` by its own running time.
    pub async fn fetch_recent_with_timeout(
        &self,
        request: RecentRequest,
        timeout: Duration,
    ) -> StorageResult<Vec<Media>> {
        let cancel = CancellationToken::new();
        let fetch = self.fetch_recent_async(request, cancel.clone());
        tokio::pin!(fetch);
        tokio::select! {
            result = &mut fetch => result,
            _ = tokio::time::sleep(timeout) => {
                debug!("recent listing exceeded {:?}, cancelling", timeout);
                cancel.cancel();
                fetch.await
            }
        }
    }

    fn run(&self, request: &RecentRequest, cancel: &CancellationToken) -> StorageResult<RecentPage> {
        let batch = self.backend.fetch_batch(request, cancel)?;
        let fetched = batch.rows.len();
        let media = row::normalize_rows(request.kind(), batch.rows);
        let items = recency::order_by_recency(media);
        debug!(
            "recent {} page {}: {} fetched, {} returned, {} total",
            request.kind(),
            request.window().current_page(),
            fetched,
            items.len(),
            batch.total
        );
        Ok(RecentPage::new(items, batch.total, request.window()))
    }
}
