use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use cliptray_core::{EntryId, FlagUpdate, View};

#[derive(Parser)]
#[command(name = "cliptray")]
#[command(about = "Browse and manage a clipboard-history backend from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL, overriding config file and environment
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Path to a JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List clipboard entries
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        view: ViewArgs,
        /// Case-insensitive substring filter
        #[arg(short, long)]
        search: Option<String>,
        /// Show full text instead of an eight-word preview
        #[arg(long)]
        full: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Pin or unpin an entry
    Pin {
        id: EntryId,
        #[command(flatten)]
        state: FlagArgs,
    },
    /// Mark or unmark an entry as favourite
    #[command(alias = "favorite", alias = "fav")]
    Favourite {
        id: EntryId,
        #[command(flatten)]
        state: FlagArgs,
    },
    /// Delete a single entry
    #[command(alias = "rm")]
    Delete { id: EntryId },
    /// Delete every entry in a view, after confirmation
    Clear {
        #[command(flatten)]
        view: ViewArgs,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Wipe the whole backend history in one request
    Purge {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Pause clipboard capture on the backend
    Pause,
    /// Resume clipboard capture on the backend
    Resume,
    /// Write a view to a text file
    Export {
        #[command(flatten)]
        view: ViewArgs,
        /// Output file path
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Keep a live view open, polling the backend
    Watch {
        #[command(flatten)]
        view: ViewArgs,
        /// Initial search query
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Output file path
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ViewArgs {
    /// Restrict to favourite entries
    #[arg(short, long, alias = "favourites")]
    pub favorites: bool,
}

impl ViewArgs {
    pub const fn view(self) -> View {
        if self.favorites {
            View::Favorites
        } else {
            View::All
        }
    }
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct FlagArgs {
    /// Set the flag instead of toggling it
    #[arg(long, conflicts_with = "off")]
    pub on: bool,
    /// Clear the flag instead of toggling it
    #[arg(long)]
    pub off: bool,
}

impl FlagArgs {
    pub const fn update(self) -> FlagUpdate {
        match (self.on, self.off) {
            (true, _) => FlagUpdate::Set(true),
            (false, true) => FlagUpdate::Set(false),
            (false, false) => FlagUpdate::Toggle,
        }
    }
}
