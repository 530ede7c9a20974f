use cliptray_core::{EntryId, FlagKind, FlagUpdate};

use crate::commands::common::Session;
use crate::error::CliError;

pub async fn run_flag(
    session: &Session,
    id: EntryId,
    kind: FlagKind,
    update: FlagUpdate,
) -> Result<(), CliError> {
    session.coordinator.set_flag(id, kind, update).await?;

    let snapshot = session.sync().cache().current();
    match snapshot.entries().iter().find(|entry| entry.id == id) {
        Some(entry) => {
            let state = if entry.flag(kind) { "on" } else { "off" };
            println!("{id} {kind} {state}");
        }
        None => println!("{id}"),
    }
    Ok(())
}
