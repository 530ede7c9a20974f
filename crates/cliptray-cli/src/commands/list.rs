use chrono::Utc;
use cliptray_core::view::{filter_and_sort, render};
use cliptray_core::{View, ViewState};

use crate::commands::common::{
    entry_to_list_item, format_header, format_view_lines, EntryListItem, HighlightStyle, Session,
};
use crate::error::CliError;

pub async fn run_list(
    session: &Session,
    view: View,
    search: Option<&str>,
    full: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let snapshot = session.refresh().await?;
    let mut state = ViewState {
        view,
        ..ViewState::default()
    };
    state.set_search(search.unwrap_or_default());
    let now = Utc::now();

    if as_json {
        let json_items = filter_and_sort(snapshot.entries(), state.view, &state.search_query)
            .entries
            .iter()
            .map(|entry| entry_to_list_item(entry, now))
            .collect::<Vec<EntryListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        let rendered = render(snapshot.entries(), &state);
        println!("{}", format_header(&rendered, &state));
        for line in format_view_lines(&rendered, full, HighlightStyle::for_stdout(), now) {
            println!("{line}");
        }
    }

    Ok(())
}
