//! Flat text export of a view.

use std::path::Path;

use crate::error::{Error, Result};
use crate::models::ClipboardEntry;
use crate::view::{filter_and_sort, View};

/// File name hosts offer by default.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "clipboard_history.txt";

/// Render entries as `- text` blocks separated by a blank line.
#[must_use]
pub fn render_text_export(entries: &[ClipboardEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("- {}", entry.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render every entry in `view`, in display order.
///
/// The search query is not applied: an export covers the
/// whole view.
pub fn render_view_export(entries: &[ClipboardEntry], view: View) -> Result<String> {
    let visible = filter_and_sort(entries, view, "");
    if visible.is_empty() {
        return Err(Error::EmptyTargetSet(format!(
            "no clipboard text to export in the {} view",
            view.label()
        )));
    }
    Ok(render_text_export(&visible.entries))
}

/// Write the export for `view` to `path`, returning how many entries it holds.
pub fn write_view_export(entries: &[ClipboardEntry], view: View, path: &Path) -> Result<usize> {
    let rendered = render_view_export(entries, view)?;
    let count = entries.iter().filter(|entry| view.includes(entry)).count();
    std::fs::write(path, rendered)?;
    tracing::info!(path = %path.display(), count, "exported clipboard view");
    Ok(count)
}
