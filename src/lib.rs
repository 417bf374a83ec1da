//! Trash catalog, restore engine and interactive browser for `trashbox`.
//!
//! Two very different stores are reconciled into one catalog: freedesktop
//! `files/` + `info/*.trashinfo` directories, and a recycle bin of `$R`
//! content with binary `$I` records.

pub mod backend;
pub mod browser;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod helpers;
pub mod models;

pub use backend::{BackendKind, RestoreReport, TrashBackend};
pub use catalog::{Candidate, Catalog, MatchMode, MatchStyle, Resolution, Row};
pub use config::{Config, Overrides};
pub use engine::{MoveOutcome, Restored, TrashEngine};
pub use errors::{BackendError, ErrorKind, Result};
pub use fs::{FileSystem, RealFileSystem};
pub use helpers::{print_size, sanitize_user_path, TRASHINFO_EXTENSION};
pub use models::{EntryId, MetadataRef, TrashDirectory, TrashEntry, TrashedItem};

/// Re-export a small stable API surface for the command crate.
pub mod prelude {
    pub use crate::{
        backend::{BackendKind, TrashBackend},
        catalog::*,
        config::{Config, Overrides},
        engine::*,
        errors::{BackendError, ErrorKind, Result},
        models::*,
    };
}
