//! Final filtering and ordering of a fetched page.
//!
//! Only the rows already fetched for the page are re-sorted. Which entries land
//! on which page is decided by the storage-level ORDER BY, which compares the
//! stored representation of `updatedAt`; this pass makes the order inside the
//! page exact.

use std::cmp::Reverse;

use mediacat_types::{LatestUpdate, Media};
use tracing::debug;

/// Sort key for an entry: `updatedAt` in epoch millis, 0 when empty or absent.
#[must_use]
pub fn derived_timestamp(latest: &LatestUpdate<'_>) -> i64 {
    latest.updated_at_millis()
}

/// Drops entries without a released episode/chapter and sorts the rest by
/// [`derived_timestamp`], newest first. Ties keep their storage order.
#[must_use]
pub fn order_by_recency(items: Vec<Media>) -> Vec<Media> {
    let mut decorated: Vec<(i64, Media)> = items
        .into_iter()
        .filter_map(|media| {
            let latest = media.latest_update();
            if !latest.has_releases() {
                debug!("Skipping {} {}: no releases yet", media.kind(), media.id());
                return None;
            }
            let key = derived_timestamp(&latest);
            Some((key, media))
        })
        .collect();

    decorated.sort_by_key(|(key, _)| Reverse(*key));
    decorated.into_iter().map(|(_, media)| media).collect()
}
