use cliptray_core::{BulkClearOutcome, Confirmer, Error, FixedAnswer, View};

use crate::commands::common::{ask_yes_no, Session, TerminalConfirmer};
use crate::error::CliError;

const PURGE_PROMPT: &str = "Delete the entire clipboard history on the backend? [y/N] ";

pub async fn run_clear(session: &Session, view: View, skip_prompt: bool) -> Result<(), CliError> {
    session.refresh().await?;
    if skip_prompt {
        clear_view(session, view, &FixedAnswer(true)).await
    } else {
        clear_view(session, view, &TerminalConfirmer).await
    }
}

async fn clear_view<C: Confirmer>(
    session: &Session,
    view: View,
    confirmer: &C,
) -> Result<(), CliError> {
    let outcome = match session.coordinator.bulk_clear(view, confirmer).await {
        Ok(outcome) => outcome,
        Err(Error::EmptyTargetSet(_)) => {
            println!("No items to clear!");
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };

    match outcome {
        BulkClearOutcome::Cancelled => println!("Clear cancelled"),
        BulkClearOutcome::Cleared(report) => {
            if !report.failed.is_empty() {
                return Err(CliError::PartialClear {
                    failed: report.failed.len(),
                    total: report.failed.len() + report.deleted.len(),
                });
            }
            println!("{}", view.cleared_message());
        }
    }
    Ok(())
}

/// Whole-history wipe through the backend's bulk endpoint.
pub async fn run_purge(session: &Session, skip_prompt: bool) -> Result<(), CliError> {
    let confirmed = skip_prompt
        || tokio::task::spawn_blocking(|| ask_yes_no(PURGE_PROMPT))
            .await
            .unwrap_or(false);
    if !confirmed {
        println!("Clear cancelled");
        return Ok(());
    }

    session.sync().store().clear_all().await?;
    session.refresh().await?;
    println!("{}", View::All.cleared_message());
    Ok(())
}
