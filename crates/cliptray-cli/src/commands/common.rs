use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cliptray_core::view::{preview_text, DisplayRow, RenderedView, Span};
use cliptray_core::{
    BulkClearPlan, ClientConfig, ClipboardEntry, Confirmer, HttpStore, MutationCoordinator, Notice,
    NoticeBoard, NoticeLevel, Snapshot, SnapshotCache, Synchronizer, ViewState,
};
use serde::Serialize;

use crate::error::CliError;

/// Everything a command needs to talk to the backend.
pub struct Session {
    pub config: ClientConfig,
    pub coordinator: MutationCoordinator<HttpStore>,
}

impl Session {
    pub fn open(config: ClientConfig) -> Result<Self, CliError> {
        let store = HttpStore::from_config(&config)?;
        let notices = NoticeBoard::new(config.notice_ttl(), config.max_notices);
        let sync = Synchronizer::new(Arc::new(store), SnapshotCache::new(), notices);

        Ok(Self {
            config,
            coordinator: MutationCoordinator::new(sync),
        })
    }

    pub const fn sync(&self) -> &Synchronizer<HttpStore> {
        self.coordinator.synchronizer()
    }

    /// Fetch the backend's entries and return the fresh snapshot.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CliError> {
        self.sync().resync().await?;
        Ok(self.sync().cache().current())
    }
}

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub id: i64,
    pub preview: String,
    pub text: String,
    pub is_pinned: bool,
    pub is_favourite: bool,
    pub captured_at: DateTime<Utc>,
    pub relative_time: String,
}

pub fn entry_to_list_item(entry: &ClipboardEntry, now: DateTime<Utc>) -> EntryListItem {
    let (preview, _) = preview_text(&entry.text);
    EntryListItem {
        id: entry.id.get(),
        preview,
        text: entry.text.clone(),
        is_pinned: entry.is_pinned,
        is_favourite: entry.is_favourite,
        captured_at: entry.captured_at,
        relative_time: format_relative_time(entry.captured_at, now),
    }
}

/// Markers wrapped around search matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightStyle {
    pub open: &'static str,
    pub close: &'static str,
}

impl HighlightStyle {
    pub const ANSI: Self = Self {
        open: "\x1b[1;33m",
        close: "\x1b[0m",
    };
    pub const PLAIN: Self = Self {
        open: "[",
        close: "]",
    };

    pub fn for_stdout() -> Self {
        if io::stdout().is_terminal() {
            Self::ANSI
        } else {
            Self::PLAIN
        }
    }
}

pub fn render_spans(spans: &[Span], style: HighlightStyle) -> String {
    spans
        .iter()
        .map(|span| {
            if span.highlighted {
                format!("{}{}{}", style.open, span.text, style.close)
            } else {
                span.text.clone()
            }
        })
        .collect()
}

pub fn format_row_line(
    row: &DisplayRow,
    full: bool,
    style: HighlightStyle,
    now: DateTime<Utc>,
) -> String {
    let pin = if row.is_pinned { 'P' } else { ' ' };
    let favourite = if row.is_favourite { '*' } else { ' ' };
    let text = if full {
        render_spans(&row.full, style).replace('\n', "\n          ")
    } else {
        render_spans(&row.preview, style)
    };
    let relative_time = format_relative_time(row.captured_at, now);

    format!("{:>6} {pin}{favourite} {text}  ({relative_time})", row.id)
}

pub fn format_view_lines(
    rendered: &RenderedView,
    full: bool,
    style: HighlightStyle,
    now: DateTime<Utc>,
) -> Vec<String> {
    if let Some(message) = rendered.empty_message {
        return vec![message.to_string()];
    }
    rendered
        .rows
        .iter()
        .map(|row| format_row_line(row, full, style, now))
        .collect()
}

pub fn format_header(rendered: &RenderedView, state: &ViewState) -> String {
    let mut header = format!(
        "{} ({}) | favourites: {} | monitoring {}",
        rendered.view.label(),
        rendered.rows.len(),
        rendered.favourite_count,
        if state.monitoring { "on" } else { "paused" }
    );
    if !state.search_query.is_empty() {
        header.push_str(&format!(" | search: \"{}\"", state.search_query));
    }
    header
}

pub fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => format!("-- {}", notice.message),
        NoticeLevel::Error => format!("!! {}", notice.message),
    }
}

pub fn format_relative_time(captured_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now
        .signed_duration_since(captured_at)
        .num_milliseconds()
        .max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn confirmation_prompt(plan: &BulkClearPlan) -> String {
    format!("{} ({} entries) [y/N] ", plan.prompt(), plan.len())
}

/// Asks on the controlling terminal. Anything but `y`/`yes` declines.
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, plan: &BulkClearPlan) -> bool {
        let prompt = confirmation_prompt(plan);
        tokio::task::spawn_blocking(move || ask_yes_no(&prompt))
            .await
            .unwrap_or(false)
    }
}

pub fn ask_yes_no(prompt: &str) -> bool {
    print!("{prompt}");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().read_line(&mut answer) {
        Ok(_) => parse_yes(&answer),
        Err(_) => false,
    }
}
