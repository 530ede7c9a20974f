//! cliptray-core - Core library for cliptray
//!
//! This crate keeps a local view of a clipboard-history backend in step with
//! the backend itself: it fetches entries over HTTP, caches the latest
//! snapshot, derives filtered and ordered views from it, polls on an
//! interval, and applies user mutations followed by a forced resync.

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod mutation;
pub mod notice;
pub mod snapshot;
pub mod sync;
pub mod view;

#[cfg(test)]
mod test_support;

pub use client::{HttpStore, RemoteStore};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{ClipboardEntry, EntryId, FlagKind, FlagUpdate};
pub use mutation::{
    BulkClearOutcome, BulkClearPlan, BulkClearReport, Confirmer, FixedAnswer, MutationCoordinator,
};
pub use notice::{Notice, NoticeBoard, NoticeLevel};
pub use snapshot::{Snapshot, SnapshotCache};
pub use sync::{PollHandle, Synchronizer};
pub use view::{View, ViewState};
