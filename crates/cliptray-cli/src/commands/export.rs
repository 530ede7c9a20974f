use std::path::{Path, PathBuf};

use cliptray_core::export::{write_view_export, DEFAULT_EXPORT_FILE_NAME};
use cliptray_core::{Error, View};

use crate::commands::common::Session;
use crate::error::CliError;

pub async fn run_export(
    session: &Session,
    view: View,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let snapshot = session.refresh().await?;
    let path = output_path.map_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE_NAME), Path::to_path_buf);

    match write_view_export(snapshot.entries(), view, &path) {
        Ok(_) => {
            println!("{}", path.display());
            Ok(())
        }
        Err(Error::EmptyTargetSet(_)) => {
            println!("No clipboard text to export!");
            Ok(())
        }
        Err(error) => Err(error.into()),
    }
}
