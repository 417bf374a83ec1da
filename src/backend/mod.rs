//! Trash store backends.
//!
//! Both stores answer the same three requests. Which one is used is decided
//! once at start-up from [`BackendKind`].

pub mod recycle;
#[cfg(windows)]
mod shell;
pub mod sidecar;

use std::path::Path;
use std::str::FromStr;

use crate::config::Config;
use crate::errors::BackendError;
use crate::models::{TrashEntry, TrashedItem};

pub use recycle::{RecycleBinBackend, RecycleDirectory, RecycleNamespace};
pub use sidecar::SidecarBackend;

/// Capability set every trash store provides.
pub trait TrashBackend {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Lists the items currently in the store.
    ///
    /// Items whose content or metadata cannot be read are skipped with a
    /// warning; only a failure to read the store itself is an error.
    fn enumerate(&self) -> crate::Result<Vec<TrashedItem>>;

    /// Moves a live path into the store and records its metadata.
    fn move_in(&self, path: &Path) -> crate::Result<()>;

    /// Moves the content of `entry` to `destination` and drops its metadata.
    ///
    /// When the content rename fails nothing has changed. Once the content has
    /// moved, a failure to drop the metadata is only reported as a warning.
    fn restore_out(&self, entry: &TrashEntry, destination: &Path) -> crate::Result<RestoreReport>;
}

/// Non-fatal leftovers of a successful restore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub warnings: Vec<String>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BackendKind {
    /// `files/` + `info/*.trashinfo` directories.
    Sidecar,
    /// `$R`/`$I` pairs of a recycle bin.
    RecycleBin,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sidecar => "sidecar",
            Self::RecycleBin => "recycle-bin",
        }
    }

    pub fn native() -> Self {
        if cfg!(windows) {
            Self::RecycleBin
        } else {
            Self::Sidecar
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sidecar" | "freedesktop" | "xdg" => Ok(Self::Sidecar),
            "recycle-bin" | "recycle" | "windows" => Ok(Self::RecycleBin),
            other => Err(BackendError::invalid_input(format!("unknown backend {other:?}"))),
        }
    }
}

/// Opens the backend selected by `config`.
pub fn open(config: &Config) -> Box<dyn TrashBackend> {
    match config.backend {
        BackendKind::Sidecar => Box::new(SidecarBackend::new(config.trash_root.clone())),
        BackendKind::RecycleBin => Box::new(RecycleBinBackend::new(RecycleDirectory::new(
            config.recycle_root.clone(),
        ))),
    }
}
