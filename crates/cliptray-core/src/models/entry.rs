//! Clipboard entry model

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier assigned by the capture backend.
///
/// The client never creates ids; it only echoes back what the backend sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for EntryId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for EntryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// One clipboard-history record as last seen from the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    /// Backend-assigned identifier
    pub id: EntryId,
    /// Captured clipboard text
    pub text: String,
    /// Favourite flag
    pub is_favourite: bool,
    /// Pinned flag
    pub is_pinned: bool,
    /// Original capture time
    pub captured_at: DateTime<Utc>,
}

impl ClipboardEntry {
    /// Create an unflagged entry
    #[must_use]
    pub fn new(id: impl Into<EntryId>, text: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_favourite: false,
            is_pinned: false,
            captured_at,
        }
    }

    #[must_use]
    pub fn favourite(mut self, value: bool) -> Self {
        self.is_favourite = value;
        self
    }

    #[must_use]
    pub fn pinned(mut self, value: bool) -> Self {
        self.is_pinned = value;
        self
    }

    /// Current value of the given flag
    #[must_use]
    pub const fn flag(&self, kind: FlagKind) -> bool {
        match kind {
            FlagKind::Pin => self.is_pinned,
            FlagKind::Favourite => self.is_favourite,
        }
    }
}

/// Which mutable flag a mutation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    Pin,
    Favourite,
}

impl FlagKind {
    /// Backend path segment for this flag
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Pin => "pin",
            Self::Favourite => "favourite",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// How a flag should change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlagUpdate {
    /// Flip whatever the backend currently holds
    #[default]
    Toggle,
    /// Force a specific value
    Set(bool),
}

/// `GET /history` element as the backend serializes it.
#[derive(Debug, Deserialize)]
pub(crate) struct EntryPayload {
    id: i64,
    content: String,
    #[serde(default)]
    is_favourite: bool,
    #[serde(default)]
    is_pinned: bool,
    timestamp: String,
}

impl TryFrom<EntryPayload> for ClipboardEntry {
    type Error = Error;

    fn try_from(value: EntryPayload) -> Result<Self> {
        let captured_at = parse_capture_timestamp(&value.timestamp)?;
        Ok(Self {
            id: EntryId(value.id),
            text: value.content,
            is_favourite: value.is_favourite,
            is_pinned: value.is_pinned,
            captured_at,
        })
    }
}

/// Parse a backend capture timestamp.
///
/// Accepts RFC 3339 and `SQLite`'s `CURRENT_TIMESTAMP` layout
/// (`YYYY-MM-DD HH:MM:SS`, UTC, optional fractional seconds).
pub fn parse_capture_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::MalformedResponse(format!("unrecognized timestamp '{raw}'")))
}
