//! In-memory `RemoteStore` used by the sync and mutation tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::client::RemoteStore;
use crate::error::{Error, Result};
use crate::models::{ClipboardEntry, EntryId, FlagKind, FlagUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    SetFlag(EntryId, FlagKind, FlagUpdate),
    Delete(EntryId),
    SetMonitoring(bool),
}

#[derive(Debug, Default)]
struct FakeState {
    entries: Vec<ClipboardEntry>,
    calls: Vec<Call>,
    capturing: bool,
    fail_list: bool,
    fail_writes: bool,
    scripted_lists: VecDeque<(Duration, Vec<ClipboardEntry>)>,
}

/// Behaves like the capture backend, with switchable failures.
#[derive(Debug, Default)]
pub struct FakeStore {
    state: Mutex<FakeState>,
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

impl FakeStore {
    pub fn with_entries(entries: Vec<ClipboardEntry>) -> Self {
        Self {
            state: Mutex::new(FakeState {
                entries,
                capturing: true,
                ..FakeState::default()
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut FakeState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with_state(|state| state.calls.clone())
    }

    pub fn clear_calls(&self) {
        self.with_state(|state| state.calls.clear());
    }

    pub fn entries(&self) -> Vec<ClipboardEntry> {
        self.with_state(|state| state.entries.clone())
    }

    pub fn set_entries(&self, entries: Vec<ClipboardEntry>) {
        self.with_state(|state| state.entries = entries);
    }

    pub fn capturing(&self) -> bool {
        self.with_state(|state| state.capturing)
    }

    pub fn fail_list(&self, fail: bool) {
        self.with_state(|state| state.fail_list = fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.with_state(|state| state.fail_writes = fail);
    }

    /// Queue a list response that arrives after `delay`.
    pub fn script_list(&self, delay: Duration, entries: Vec<ClipboardEntry>) {
        self.with_state(|state| state.scripted_lists.push_back((delay, entries)));
    }

    fn unreachable() -> Error {
        Error::UnreachableBackend("connection refused".to_string())
    }
}

impl RemoteStore for FakeStore {
    async fn list_entries(&self) -> Result<Vec<ClipboardEntry>> {
        let (scripted, fail, entries) = self.with_state(|state| {
            state.calls.push(Call::List);
            (
                state.scripted_lists.pop_front(),
                state.fail_list,
                state.entries.clone(),
            )
        });

        if let Some((delay, scripted_entries)) = scripted {
            tokio::time::sleep(delay).await;
            return Ok(scripted_entries);
        }
        if fail {
            return Err(Self::unreachable());
        }
        Ok(entries)
    }

    async fn set_flag(&self, id: EntryId, kind: FlagKind, update: FlagUpdate) -> Result<()> {
        self.with_state(|state| {
            state.calls.push(Call::SetFlag(id, kind, update));
            if state.fail_writes {
                return Err(Self::unreachable());
            }
            if let Some(entry) = state.entries.iter_mut().find(|entry| entry.id == id) {
                let next = match update {
                    FlagUpdate::Toggle => !entry.flag(kind),
                    FlagUpdate::Set(value) => value,
                };
                match kind {
                    FlagKind::Pin => entry.is_pinned = next,
                    FlagKind::Favourite => entry.is_favourite = next,
                }
            }
            Ok(())
        })
    }

    async fn delete_entry(&self, id: EntryId) -> Result<()> {
        self.with_state(|state| {
            state.calls.push(Call::Delete(id));
            if state.fail_writes {
                return Err(Self::unreachable());
            }
            state.entries.retain(|entry| entry.id != id);
            Ok(())
        })
    }

    async fn set_monitoring(&self, enabled: bool) -> Result<()> {
        self.with_state(|state| {
            state.calls.push(Call::SetMonitoring(enabled));
            if state.fail_writes {
                return Err(Self::unreachable());
            }
            state.capturing = enabled;
            Ok(())
        })
    }
}
