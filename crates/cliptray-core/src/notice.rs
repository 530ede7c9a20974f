//! Transient user-facing notices.
//!
//! The core only records notices; drawing them is up to the host. A board
//! keeps a small number of recent messages and forgets each one after its
//! time-to-live.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::config::{DEFAULT_MAX_NOTICES, DEFAULT_NOTICE_TTL_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug)]
struct PostedNotice {
    notice: Notice,
    expires_at: Instant,
}

/// Bounded, self-expiring notice queue shared between tasks.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    inner: Arc<Mutex<VecDeque<PostedNotice>>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(DEFAULT_NOTICE_TTL_MS),
            DEFAULT_MAX_NOTICES,
        )
    }
}

impl NoticeBoard {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.post(NoticeLevel::Info, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.post(NoticeLevel::Error, message.into());
    }

    fn post(&self, level: NoticeLevel, message: String) {
        tracing::debug!(?level, %message, "notice posted");

        let now = Instant::now();
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        queue.retain(|posted| posted.expires_at > now);
        while queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(PostedNotice {
            notice: Notice { level, message },
            expires_at: now + self.ttl,
        });
    }

    /// Live notices, oldest first. Expired ones are dropped.
    pub fn active(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        queue.retain(|posted| posted.expires_at > now);
        queue.iter().map(|posted| posted.notice.clone()).collect()
    }

    /// Remove and return every live notice.
    pub fn drain(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut queue = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        queue
            .drain(..)
            .filter(|posted| posted.expires_at > now)
            .map(|posted| posted.notice)
            .collect()
    }
}
