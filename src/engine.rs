//! Restore and move-in orchestration on top of a backend and its catalog.
//!
//! A restore goes through matching, resolution (possibly asking the caller to
//! pick among candidates), then the backend's two-step restore. The catalog is
//! only touched once the backend reports success.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backend::{self, RestoreReport, TrashBackend};
use crate::catalog::{self, Candidate, Catalog, MatchMode, Resolution, Row};
use crate::config::Config;
use crate::errors::BackendError;
use crate::helpers::sanitize_user_path;
use crate::models::{EntryId, TrashEntry};

/// A successful restore.
#[derive(Debug, Clone)]
pub struct Restored {
    pub entry: TrashEntry,
    pub destination: PathBuf,
    pub report: RestoreReport,
}

/// Result of moving one path into the trash.
#[derive(Debug)]
pub struct MoveOutcome {
    pub path: PathBuf,
    pub result: crate::Result<()>,
}

pub struct TrashEngine {
    backend: Box<dyn TrashBackend>,
    catalog: Catalog,
    match_mode: MatchMode,
}

impl TrashEngine {
    /// Opens the configured backend and loads its catalog.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let mut engine = Self::new(backend::open(config))?;
        engine.match_mode = config.match_mode;
        Ok(engine)
    }

    pub fn new(backend: Box<dyn TrashBackend>) -> crate::Result<Self> {
        let catalog = Catalog::load(backend.as_ref())?;
        Ok(Self {
            backend,
            catalog,
            match_mode: MatchMode::default(),
        })
    }

    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rows(&self) -> Vec<Row> {
        self.catalog.rows()
    }

    /// Rebuilds the catalog from the store; previously issued ids go stale.
    pub fn reload(&mut self) -> crate::Result<()> {
        self.catalog = Catalog::load(self.backend.as_ref())?;
        Ok(())
    }

    pub fn resolve(&self, pattern: &str) -> crate::Result<Resolution> {
        self.catalog.resolve(pattern, self.match_mode)
    }

    /// Restores entry `id` to `destination`, or to its original path.
    ///
    /// On failure the catalog is left exactly as it was.
    pub fn restore(&mut self, id: EntryId, destination: Option<&Path>) -> crate::Result<Restored> {
        let entry = self
            .catalog
            .get(id)
            .ok_or_else(|| BackendError::UnknownEntry(id.to_string()))?;

        let destination = match destination {
            Some(path) => path.to_path_buf(),
            None if entry.original_path.as_os_str().is_empty() => {
                return Err(BackendError::invalid_input(format!(
                    "{} has no recorded original location, pass a destination",
                    entry.display_name
                )));
            }
            None => entry.original_path.clone(),
        };

        if fs::symlink_metadata(&destination).is_ok() {
            return Err(BackendError::conflict(format!(
                "{} already exists",
                sanitize_user_path(&destination)
            )));
        }

        debug!(
            "restoring {} (#{id}) to {}",
            entry.display_name,
            sanitize_user_path(&destination)
        );
        let report = self.backend.restore_out(entry, &destination)?;

        let entry = self
            .catalog
            .remove(id)
            .ok_or_else(|| BackendError::UnknownEntry(id.to_string()))?;
        Ok(Restored {
            entry,
            destination,
            report,
        })
    }

    /// Restores the entry whose name matches `pattern`.
    ///
    /// When several entries match, `choose` receives the candidates and returns
    /// the zero-based index to restore. An index out of range fails with
    /// `InvalidSelection`.
    pub fn restore_by_name<C>(
        &mut self,
        pattern: &str,
        destination: Option<&Path>,
        choose: C,
    ) -> crate::Result<Restored>
    where
        C: FnOnce(&[Candidate]) -> crate::Result<usize>,
    {
        let id = match self.resolve(pattern)? {
            Resolution::Unique(id) => id,
            Resolution::Ambiguous(candidates) => {
                debug!("{pattern:?} matches {} entries", candidates.len());
                let index = choose(&candidates)?;
                catalog::select(&candidates, index)?
            }
        };
        self.restore(id, destination)
    }

    /// Moves one path into the trash. The new entry shows up on the next reload.
    pub fn move_in(&self, path: &Path) -> crate::Result<()> {
        self.backend.move_in(path)
    }

    /// Moves every path, carrying on past failures. Reporting each failure is
    /// left to the caller.
    pub fn move_all<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<MoveOutcome> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let result = self.move_in(path);
                if let Err(err) = &result {
                    debug!("could not trash {}: {err}", sanitize_user_path(path));
                }
                MoveOutcome {
                    path: path.to_path_buf(),
                    result,
                }
            })
            .collect()
    }
}
