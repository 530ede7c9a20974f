use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] cliptray_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("{0} (type 'help' for commands)")]
    InvalidCommand(String),
    #[error("{failed} of {total} deletions failed")]
    PartialClear { failed: usize, total: usize },
}
