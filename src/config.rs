//! Start-up configuration: which store to open and how names are matched.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::backend::BackendKind;
use crate::catalog::MatchMode;
use crate::errors::BackendError;

pub const BACKEND_VAR: &str = "TRASHBOX_BACKEND";
pub const TRASH_DIR_VAR: &str = "TRASHBOX_TRASH_DIR";
pub const RECYCLE_BIN_VAR: &str = "TRASHBOX_RECYCLE_BIN";

/// Values given on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend: Option<BackendKind>,
    pub trash_dir: Option<PathBuf>,
    pub recycle_bin: Option<PathBuf>,
    pub match_mode: MatchMode,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    /// Root of the sidecar trash (holds `files/` and `info/`).
    pub trash_root: PathBuf,
    /// `$Recycle.Bin` directory or a single account directory inside it.
    pub recycle_root: PathBuf,
    pub match_mode: MatchMode,
}

impl Config {
    /// Resolves the configuration from the process environment.
    pub fn from_env(overrides: Overrides) -> crate::Result<Self> {
        let environ: HashMap<String, String> = env::vars().collect();
        Self::from_environ(&environ, overrides)
    }

    pub fn from_environ(environ: &HashMap<String, String>, overrides: Overrides) -> crate::Result<Self> {
        let backend = match overrides.backend {
            Some(kind) => kind,
            None => match non_empty(environ, BACKEND_VAR) {
                Some(value) => value.parse()?,
                None => BackendKind::native(),
            },
        };

        let trash_root = match overrides.trash_dir {
            Some(dir) => dir,
            None => home_trash_dir(environ).ok_or_else(|| {
                BackendError::invalid_input("cannot locate the trash: set HOME or TRASHBOX_TRASH_DIR")
            })?,
        };

        let recycle_root = overrides
            .recycle_bin
            .unwrap_or_else(|| default_recycle_root(environ));

        Ok(Self {
            backend,
            trash_root,
            recycle_root,
            match_mode: overrides.match_mode,
        })
    }
}

fn non_empty<'a>(environ: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    environ
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Per-user trash root, freedesktop lookup order.
pub fn home_trash_dir(environ: &HashMap<String, String>) -> Option<PathBuf> {
    if let Some(dir) = non_empty(environ, TRASH_DIR_VAR) {
        return Some(PathBuf::from(dir));
    }
    if let Some(xdg_data_home) = non_empty(environ, "XDG_DATA_HOME") {
        return Some(PathBuf::from(xdg_data_home).join("Trash"));
    }
    if let Some(home) = non_empty(environ, "HOME") {
        return Some(PathBuf::from(home).join(".local/share/Trash"));
    }
    dirs::data_dir().map(|dir| dir.join("Trash"))
}

pub fn default_recycle_root(environ: &HashMap<String, String>) -> PathBuf {
    if let Some(dir) = non_empty(environ, RECYCLE_BIN_VAR) {
        return PathBuf::from(dir);
    }
    let drive = non_empty(environ, "SystemDrive").unwrap_or("C:");
    PathBuf::from(format!("{drive}\\$Recycle.Bin"))
}
