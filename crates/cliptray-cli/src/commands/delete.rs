use cliptray_core::EntryId;

use crate::commands::common::Session;
use crate::error::CliError;

pub async fn run_delete(session: &Session, id: EntryId) -> Result<(), CliError> {
    session.coordinator.delete(id).await?;
    println!("{id}");
    Ok(())
}
