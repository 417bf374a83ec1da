//! Command line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use trashbox_core::{BackendKind, MatchMode, MatchStyle, Overrides};

/// Browse, list and restore trashed files
#[derive(Parser, Debug)]
#[command(name = "trashbox")]
#[command(version)]
#[command(about = "Browse, list and restore trashed files", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Root of the freedesktop trash (holds files/ and info/)
    #[arg(long, global = true, value_name = "DIR")]
    pub trash_dir: Option<PathBuf>,

    /// Trash store to use: sidecar or recycle-bin
    #[arg(long, global = true, value_parser = parse_backend)]
    pub backend: Option<BackendKind>,

    /// Recycle bin directory to read instead of the system drive's
    #[arg(long, global = true, value_name = "DIR")]
    pub recycle_bin: Option<PathBuf>,

    /// Verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every entry in the trash
    List,

    /// Restore the entry whose name matches PATTERN
    Restore(RestoreArgs),

    /// Move paths into the trash
    Move(MoveArgs),

    /// Interactive browser (default)
    Browse,
}

#[derive(Debug, Clone, Args)]
pub struct RestoreArgs {
    /// Name, substring or glob of the entry to restore
    pub pattern: String,

    /// Restore here instead of the original location
    #[arg(long, value_name = "PATH")]
    pub to: Option<PathBuf>,

    /// Treat PATTERN as a glob over the whole name
    #[arg(long)]
    pub glob: bool,

    /// Match names case-insensitively
    #[arg(long, short = 'i')]
    pub ignore_case: bool,
}

#[derive(Debug, Clone, Args)]
pub struct MoveArgs {
    /// Files or directories to trash
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        let match_mode = match &self.command {
            Some(Commands::Restore(args)) => MatchMode {
                style: if args.glob {
                    MatchStyle::Glob
                } else {
                    MatchStyle::Substring
                },
                ignore_case: args.ignore_case,
            },
            _ => MatchMode::default(),
        };

        Overrides {
            backend: self.backend,
            trash_dir: self.trash_dir.clone(),
            recycle_bin: self.recycle_bin.clone(),
            match_mode,
        }
    }
}

fn parse_backend(value: &str) -> Result<BackendKind, String> {
    value.parse().map_err(|err: trashbox_core::BackendError| err.to_string())
}
