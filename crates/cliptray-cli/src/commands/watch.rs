use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use cliptray_core::export::{write_view_export, DEFAULT_EXPORT_FILE_NAME};
use cliptray_core::view::{render, RenderedView};
use cliptray_core::{
    BulkClearPlan, BulkClearReport, EntryId, Error, HttpStore, Synchronizer, View, ViewState,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::commands::common::{
    confirmation_prompt, format_header, format_notice, format_view_lines, parse_yes,
    HighlightStyle, Session,
};
use crate::error::CliError;

const NOTICE_CHECK_INTERVAL: Duration = Duration::from_millis(250);

pub const WATCH_HELP: &str = "\
commands: all | fav | search [text] | pin <id> | fav <id> | del <id>
          clear | pause | resume | export [path] | refresh | help | quit";

/// One line typed into the watch prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Refresh,
    Show(View),
    Search(String),
    TogglePin(EntryId),
    ToggleFavourite(EntryId),
    Delete(EntryId),
    Clear,
    Monitoring(bool),
    Export(Option<PathBuf>),
    Help,
    Quit,
}

pub fn parse_watch_command(line: &str) -> Result<WatchCommand, CliError> {
    let line = line.trim();
    let (verb, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

    let entry_id = |rest: &str| {
        rest.parse::<EntryId>()
            .map_err(|_| CliError::InvalidCommand(format!("'{verb}' needs a numeric entry id")))
    };

    let command = match (verb.to_ascii_lowercase().as_str(), rest.is_empty()) {
        ("" | "refresh" | "r", true) => WatchCommand::Refresh,
        ("all", true) => WatchCommand::Show(View::All),
        ("fav" | "favs" | "favorites" | "favourites", true) => {
            WatchCommand::Show(View::Favorites)
        }
        ("fav" | "favourite" | "favorite" | "star", false) => {
            WatchCommand::ToggleFavourite(entry_id(rest)?)
        }
        ("search" | "/", _) => WatchCommand::Search(rest.to_string()),
        ("pin", false) => WatchCommand::TogglePin(entry_id(rest)?),
        ("del" | "delete" | "rm", false) => WatchCommand::Delete(entry_id(rest)?),
        ("clear", true) => WatchCommand::Clear,
        ("pause", true) => WatchCommand::Monitoring(false),
        ("resume", true) => WatchCommand::Monitoring(true),
        ("export", empty) => WatchCommand::Export((!empty).then(|| PathBuf::from(rest))),
        ("help" | "?", true) => WatchCommand::Help,
        ("quit" | "exit" | "q", true) => WatchCommand::Quit,
        _ => return Err(CliError::InvalidCommand(format!("unknown command '{line}'"))),
    };
    Ok(command)
}

/// Redraws only when the derived view or header actually changed.
#[derive(Default)]
struct Screen {
    last: Option<(RenderedView, String)>,
}

impl Screen {
    fn draw(&mut self, sync: &Synchronizer<HttpStore>, state: &ViewState, style: HighlightStyle) {
        for notice in sync.notices().drain() {
            eprintln!("{}", format_notice(&notice));
        }

        let snapshot = sync.cache().current();
        let rendered = render(snapshot.entries(), state);
        let header = format_header(&rendered, state);
        if self
            .last
            .as_ref()
            .is_some_and(|(last_rendered, last_header)| {
                *last_rendered == rendered && *last_header == header
            })
        {
            return;
        }

        println!();
        println!("{header}");
        for line in format_view_lines(&rendered, false, style, Utc::now()) {
            println!("{line}");
        }
        self.last = Some((rendered, header));
    }

    fn invalidate(&mut self) {
        self.last = None;
    }
}

pub async fn run_watch(session: &Session, state: ViewState) -> Result<(), CliError> {
    let stdin = BufReader::new(tokio::io::stdin());
    watch_loop(session, state, stdin, tokio::signal::ctrl_c()).await
}

/// Drive the live view from `input` until it ends, `quit` is typed or
/// `shutdown` resolves. The same `shutdown` future is kept across passes, so
/// one that completes while a command is being applied ends the next pass.
pub async fn watch_loop<R, F>(
    session: &Session,
    mut state: ViewState,
    input: R,
    shutdown: F,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    F: Future,
{
    let sync = session.sync().clone();
    let mut snapshots = sync.cache().subscribe();
    let poller = sync.start(session.config.poll_interval());
    let mut lines = input.lines();
    let mut notice_check = tokio::time::interval(NOTICE_CHECK_INTERVAL);
    let style = HighlightStyle::for_stdout();
    let mut screen = Screen::default();
    let mut pending_clear: Option<BulkClearPlan> = None;

    tokio::pin!(shutdown);

    println!("{WATCH_HELP}");
    loop {
        state.monitoring = sync.is_monitoring();
        screen.draw(&sync, &state, style);

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = notice_check.tick() => {}
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                if let Some(plan) = pending_clear.take() {
                    answer_pending_clear(session, plan, &line).await;
                    continue;
                }

                match parse_watch_command(&line) {
                    Ok(WatchCommand::Quit) => break,
                    Ok(WatchCommand::Help) => {
                        println!("{WATCH_HELP}");
                        screen.invalidate();
                    }
                    Ok(WatchCommand::Refresh) => {
                        let _ = sync.resync().await;
                        screen.invalidate();
                    }
                    Ok(command) => {
                        pending_clear = apply_command(session, &mut state, command).await;
                    }
                    Err(error) => eprintln!("{error}"),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    poller.stop().await;
    Ok(())
}

/// Run a command against the session. A `clear` returns its plan so the
/// next input line can confirm it.
async fn apply_command(
    session: &Session,
    state: &mut ViewState,
    command: WatchCommand,
) -> Option<BulkClearPlan> {
    let coordinator = &session.coordinator;
    let outcome = match command {
        WatchCommand::Show(view) => {
            state.view = view;
            Ok(())
        }
        WatchCommand::Search(query) => {
            state.set_search(&query);
            Ok(())
        }
        WatchCommand::TogglePin(id) => coordinator.toggle_pin(id).await,
        WatchCommand::ToggleFavourite(id) => coordinator.toggle_favourite(id).await,
        WatchCommand::Delete(id) => coordinator.delete(id).await,
        WatchCommand::Monitoring(enabled) => session.sync().set_monitoring(enabled).await,
        WatchCommand::Export(path) => {
            export_view(session, state.view, path.as_deref());
            Ok(())
        }
        WatchCommand::Clear => return plan_clear(session, state.view),
        WatchCommand::Refresh | WatchCommand::Help | WatchCommand::Quit => Ok(()),
    };

    // Failures have already been posted as notices.
    if let Err(error) = outcome {
        tracing::debug!(%error, "watch command failed");
    }
    None
}

/// Freeze the visible ids and print the prompt. An empty view only posts
/// its notice.
pub fn plan_clear(session: &Session, view: View) -> Option<BulkClearPlan> {
    match session.coordinator.plan_bulk_clear(view) {
        Ok(plan) => {
            println!("{}", confirmation_prompt(&plan));
            Some(plan)
        }
        Err(error) => {
            tracing::debug!(%error, "nothing to clear");
            None
        }
    }
}

/// Treat `answer` as the reply to a pending clear prompt.
pub async fn answer_pending_clear(
    session: &Session,
    plan: BulkClearPlan,
    answer: &str,
) -> Option<BulkClearReport> {
    if parse_yes(answer) {
        Some(session.coordinator.execute_bulk_clear(plan).await)
    } else {
        println!("Clear cancelled");
        None
    }
}

fn export_view(session: &Session, view: View, path: Option<&Path>) {
    let notices = session.sync().notices();
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE_NAME), Path::to_path_buf);
    let snapshot = session.sync().cache().current();

    match write_view_export(snapshot.entries(), view, &path) {
        Ok(_) => notices.info("Exported clipboard"),
        Err(Error::EmptyTargetSet(_)) => notices.info("No clipboard text to export!"),
        Err(error) => notices.error(format!("Export failed: {error}")),
    }
}
