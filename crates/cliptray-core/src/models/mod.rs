//! Data models for cliptray

mod entry;

pub use entry::{parse_capture_timestamp, ClipboardEntry, EntryId, FlagKind, FlagUpdate};
pub(crate) use entry::EntryPayload;
