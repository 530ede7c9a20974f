//! cliptray - terminal host for a clipboard-history backend
//!
//! Lists, filters and edits captured clipboard entries, and can keep a live
//! view open that follows the backend as new text is captured.

mod cli;
mod commands;
mod error;


use clap::{CommandFactory, Parser};
use cliptray_core::{ClientConfig, FlagKind, ViewState};

use crate::cli::{Cli, Commands};
use crate::commands::clear::{run_clear, run_purge};
use crate::commands::common::Session;
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::export::run_export;
use crate::commands::flag::run_flag;
use crate::commands::list::run_list;
use crate::commands::monitoring::run_monitoring;
use crate::commands::watch::run_watch;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cliptray=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help().map_err(CliError::Io)?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output } = &command {
        return run_completions(*shell, output.as_deref());
    }

    let config = ClientConfig::resolve(cli.config.as_deref())?
        .with_backend_url(cli.backend_url)
        .validated()?;
    tracing::debug!(backend = %config.backend_url, "configuration resolved");
    let session = Session::open(config)?;

    match command {
        Commands::List {
            view,
            search,
            full,
            json,
        } => run_list(&session, view.view(), search.as_deref(), full, json).await?,
        Commands::Pin { id, state } => {
            run_flag(&session, id, FlagKind::Pin, state.update()).await?;
        }
        Commands::Favourite { id, state } => {
            run_flag(&session, id, FlagKind::Favourite, state.update()).await?;
        }
        Commands::Delete { id } => run_delete(&session, id).await?,
        Commands::Clear { view, yes } => run_clear(&session, view.view(), yes).await?,
        Commands::Purge { yes } => run_purge(&session, yes).await?,
        Commands::Pause => run_monitoring(&session, false).await?,
        Commands::Resume => run_monitoring(&session, true).await?,
        Commands::Export { view, output } => {
            run_export(&session, view.view(), output.as_deref()).await?;
        }
        Commands::Watch { view, search } => {
            let mut state = ViewState {
                view: view.view(),
                ..ViewState::default()
            };
            if let Some(query) = search {
                state.set_search(&query);
            }
            run_watch(&session, state).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
