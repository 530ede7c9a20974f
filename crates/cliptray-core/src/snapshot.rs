//! Local snapshot cache.
//!
//! The cache holds the last successfully fetched entry set. It is only ever
//! replaced whole; nothing patches it in place, so a reader either sees the
//! previous snapshot or the next one.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;

use crate::models::ClipboardEntry;

/// One fully-formed fetch result.
#[derive(Debug, Clone)]
pub struct Snapshot {
    entries: Vec<ClipboardEntry>,
    /// Zero for the initial empty snapshot, then +1 per replacement.
    generation: u64,
    fetched_at: Option<Instant>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            generation: 0,
            fetched_at: None,
        }
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// When the backend response was applied; `None` before the first fetch.
    pub const fn fetched_at(&self) -> Option<Instant> {
        self.fetched_at
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn favourite_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_favourite).count()
    }
}

/// Shared handle to the current snapshot.
///
/// Cloning the cache clones the handle, not the data.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    sender: Arc<watch::Sender<Arc<Snapshot>>>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCache {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Snapshot::empty()));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Current snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.sender.borrow().clone()
    }

    /// Swap in a new entry set and return its generation.
    ///
    /// Whatever arrives last wins; there is no version check against the
    /// request that produced `entries`.
    pub fn replace(&self, entries: Vec<ClipboardEntry>) -> u64 {
        let mut generation = 0;
        self.sender.send_modify(|current| {
            generation = current.generation + 1;
            *current = Arc::new(Snapshot {
                entries,
                generation,
                fetched_at: Some(Instant::now()),
            });
        });
        generation
    }

    /// Receiver that wakes on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn entry(id: i64, favourite: bool) -> ClipboardEntry {
        ClipboardEntry::new(id, format!("entry {id}"), Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap())
            .favourite(favourite)
    }

    #[test]
    fn starts_empty_at_generation_zero() {
        let cache = SnapshotCache::new();
        let snapshot = cache.current();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generation(), 0);
        assert!(snapshot.fetched_at().is_none());
    }

    #[test]
    fn replace_swaps_whole_snapshot() {
        let cache = SnapshotCache::new();
        assert_eq!(cache.replace(vec![entry(1, false), entry(2, true)]), 1);
        assert_eq!(cache.replace(vec![entry(3, true)]), 2);

        let snapshot = cache.current();
        assert_eq!(snapshot.generation(), 2);
        assert_eq!(snapshot.entries().len(), 1);
        assert_eq!(snapshot.favourite_count(), 1);
    }

    #[test]
    fn readers_keep_their_snapshot_after_replace() {
        let cache = SnapshotCache::new();
        cache.replace(vec![entry(1, false)]);
        let held = cache.current();

        cache.replace(Vec::new());

        assert_eq!(held.entries().len(), 1);
        assert!(cache.current().is_empty());
    }

    #[tokio::test]
    async fn subscribers_wake_on_replace() {
        let cache = SnapshotCache::new();
        let mut receiver = cache.subscribe();

        let clone = cache.clone();
        clone.replace(vec![entry(1, true)]);

        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow_and_update().generation(), 1);
    }
}
