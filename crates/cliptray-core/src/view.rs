//! View filtering, ordering and display shaping.
//!
//! Everything here is a pure function of the snapshot and the caller's
//! `ViewState`. Hosts re-run it whenever either changes.

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::models::{ClipboardEntry, EntryId};

/// Shown when a view has nothing to display.
pub const EMPTY_VIEW_MESSAGE: &str = "No clipboard items found.";

/// Number of whitespace-delimited words kept in a row preview.
pub const PREVIEW_WORD_LIMIT: usize = 8;

const ELLIPSIS: &str = "...";

/// Mutually exclusive display modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum View {
    /// Everything that is not a favourite
    #[default]
    All,
    /// Favourites only
    Favorites,
}

impl View {
    /// Whether `entry` belongs to this view.
    pub const fn includes(self, entry: &ClipboardEntry) -> bool {
        match self {
            Self::All => !entry.is_favourite,
            Self::Favorites => entry.is_favourite,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Favorites => "Favorites",
        }
    }

    /// Confirmation prompt for clearing this view.
    pub const fn clear_prompt(self) -> &'static str {
        match self {
            Self::All => "Are you sure you want to clear all items?",
            Self::Favorites => "Are you sure you want to clear all favorites?",
        }
    }

    pub const fn cleared_message(self) -> &'static str {
        match self {
            Self::All => "Cleared All Items",
            Self::Favorites => "Cleared Favorites",
        }
    }
}

/// Host-owned UI state fed into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub view: View,
    pub search_query: String,
    pub monitoring: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            view: View::All,
            search_query: String::new(),
            monitoring: true,
        }
    }
}

impl ViewState {
    /// Store a search query, trimmed the way the search box trims input.
    pub fn set_search(&mut self, raw: &str) {
        self.search_query = raw.trim().to_string();
    }
}

/// Entries visible in a view, in display order, plus the favourite badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredView {
    pub entries: Vec<ClipboardEntry>,
    /// Favourites across the whole snapshot, not just this view
    pub favourite_count: usize,
}

impl FilteredView {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Select, search and order entries for `view`.
pub fn filter_and_sort(entries: &[ClipboardEntry], view: View, search_query: &str) -> FilteredView {
    let matcher = Highlighter::new(search_query);

    let mut visible = entries
        .iter()
        .filter(|entry| view.includes(entry))
        .filter(|entry| matcher.is_match(&entry.text))
        .cloned()
        .collect::<Vec<_>>();
    sort_for_display(&mut visible);

    FilteredView {
        entries: visible,
        favourite_count: entries.iter().filter(|entry| entry.is_favourite).count(),
    }
}

/// Pinned first, newest first within each group.
///
/// Capture timestamps only have second resolution, so ties fall back to the
/// higher backend id. The result never depends on input order.
pub fn sort_for_display(entries: &mut [ClipboardEntry]) {
    entries.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.captured_at.cmp(&a.captured_at))
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// A run of text, optionally marked as a search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub highlighted: bool,
}

impl Span {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlighted: false,
        }
    }

    fn hit(text: &str) -> Self {
        Self {
            text: text.to_string(),
            highlighted: true,
        }
    }
}

/// Case-insensitive literal matcher for a search query.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(search_query: &str) -> Self {
        let query = search_query.trim();
        let pattern = if query.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self { pattern }
    }

    /// Whether `text` contains the query. An empty query matches everything.
    pub fn is_match(&self, text: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(text))
    }

    /// Split `text` into plain and highlighted spans.
    pub fn spans(&self, text: &str) -> Vec<Span> {
        let Some(pattern) = &self.pattern else {
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![Span::plain(text)]
            };
        };

        let mut spans = Vec::new();
        let mut cursor = 0;
        for found in pattern.find_iter(text) {
            if found.start() > cursor {
                spans.push(Span::plain(&text[cursor..found.start()]));
            }
            spans.push(Span::hit(found.as_str()));
            cursor = found.end();
        }
        if cursor < text.len() {
            spans.push(Span::plain(&text[cursor..]));
        }
        spans
    }
}

/// Highlight every occurrence of `search_query` in `text`.
pub fn highlight(text: &str, search_query: &str) -> Vec<Span> {
    Highlighter::new(search_query).spans(text)
}

/// First `PREVIEW_WORD_LIMIT` words of `text`, with `...` when cut.
///
/// Returns the preview and whether anything was dropped.
pub fn preview_text(text: &str) -> (String, bool) {
    let mut words = text.split_whitespace();
    let preview = words
        .by_ref()
        .take(PREVIEW_WORD_LIMIT)
        .collect::<Vec<_>>()
        .join(" ");
    if words.next().is_some() {
        (format!("{preview}{ELLIPSIS}"), true)
    } else {
        (preview, false)
    }
}

/// One list row ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub id: EntryId,
    pub preview: Vec<Span>,
    pub full: Vec<Span>,
    pub truncated: bool,
    pub is_pinned: bool,
    pub is_favourite: bool,
    pub captured_at: DateTime<Utc>,
}

impl DisplayRow {
    /// Preview without emphasis markers.
    pub fn preview_text(&self) -> String {
        self.preview.iter().map(|span| span.text.as_str()).collect()
    }
}

/// A fully derived view: rows, badge, and the empty-state message if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub view: View,
    pub rows: Vec<DisplayRow>,
    pub favourite_count: usize,
    pub empty_message: Option<&'static str>,
}

/// Derive everything a host needs to draw the list for `state`.
pub fn render(entries: &[ClipboardEntry], state: &ViewState) -> RenderedView {
    let filtered = filter_and_sort(entries, state.view, &state.search_query);
    let highlighter = Highlighter::new(&state.search_query);

    let rows = filtered
        .entries
        .iter()
        .map(|entry| {
            let (preview, truncated) = preview_text(&entry.text);
            DisplayRow {
                id: entry.id,
                preview: highlighter.spans(&preview),
                full: highlighter.spans(&entry.text),
                truncated,
                is_pinned: entry.is_pinned,
                is_favourite: entry.is_favourite,
                captured_at: entry.captured_at,
            }
        })
        .collect::<Vec<_>>();

    RenderedView {
        view: state.view,
        empty_message: rows.is_empty().then_some(EMPTY_VIEW_MESSAGE),
        rows,
        favourite_count: filtered.favourite_count,
    }
}
