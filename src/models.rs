use chrono::{DateTime, Local};
use std::ffi::OsStr;
use std::path::PathBuf;

use crate::helpers::TRASHINFO_EXTENSION;

/// Session-local handle of a catalog entry.
///
/// `load` identifies the catalog snapshot that issued the id, so an id kept
/// across a reload never resolves to a different entry.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct EntryId {
    pub load: u64,
    pub seq: u32,
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.seq)
    }
}

/// Freedesktop-style trash directory: content in `files/`, records in `info/`.
#[derive(Debug, Clone)]
pub struct TrashDirectory {
    pub path: PathBuf,
    pub files_dir: PathBuf,
    pub info_dir: PathBuf,
}

impl TrashDirectory {
    pub fn new(path: PathBuf, files_dir: PathBuf, info_dir: PathBuf) -> Self {
        Self {
            path,
            files_dir,
            info_dir,
        }
    }

    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let path = root.into();
        let files_dir = path.join("files");
        let info_dir = path.join("info");
        Self::new(path, files_dir, info_dir)
    }

    /// Sidecar record path for the content stored under `stored_name`.
    pub fn info_path_for(&self, stored_name: impl AsRef<OsStr>) -> PathBuf {
        let mut record_name = stored_name.as_ref().to_os_string();
        record_name.push(TRASHINFO_EXTENSION);
        self.info_dir.join(record_name)
    }

    pub fn files_path_for(&self, stored_name: impl AsRef<OsStr>) -> PathBuf {
        self.files_dir.join(stored_name.as_ref())
    }
}

/// The record that has to go away when an entry is restored.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MetadataRef {
    /// `.trashinfo` file of the sidecar backend.
    Sidecar(PathBuf),
    /// `$I` record next to the `$R` content of the recycle bin.
    RecycleRecord(PathBuf),
}

/// Entry as produced by a backend, before the catalog assigns an id.
#[derive(Debug, Clone)]
pub struct TrashedItem {
    pub display_name: String,
    pub original_path: PathBuf,
    pub storage_path: PathBuf,
    pub metadata: MetadataRef,
    pub deleted_at: Option<DateTime<Local>>,
    pub size_bytes: u64,
}

/// One item currently held in trash, as listed by a loaded catalog.
#[derive(Debug, Clone)]
pub struct TrashEntry {
    pub id: EntryId,
    pub display_name: String,
    pub original_path: PathBuf,
    pub storage_path: PathBuf,
    pub metadata: MetadataRef,
    pub deleted_at: Option<DateTime<Local>>,
    pub size_bytes: u64,
}

impl TrashEntry {
    pub fn from_item(id: EntryId, item: TrashedItem) -> Self {
        Self {
            id,
            display_name: item.display_name,
            original_path: item.original_path,
            storage_path: item.storage_path,
            metadata: item.metadata,
            deleted_at: item.deleted_at,
            size_bytes: item.size_bytes,
        }
    }

    /// Deletion time in RFC 3339, empty when unknown.
    pub fn deleted_at_rfc3339(&self) -> String {
        self.deleted_at
            .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
            .unwrap_or_default()
    }
}
