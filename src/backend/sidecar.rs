//! Freedesktop-style trash: content in `files/`, one `.trashinfo` per item in
//! `info/`.

use chrono::{DateTime, Local, Utc};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{RestoreReport, TrashBackend};
use crate::codec::trashinfo;
use crate::errors::BackendError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::helpers::{absolute_path, base_name, build_unique_basename, sanitize_user_path};
use crate::models::{MetadataRef, TrashDirectory, TrashEntry, TrashedItem};

pub struct SidecarBackend<F: FileSystem = RealFileSystem> {
    trash_dir: TrashDirectory,
    fs: F,
}

impl SidecarBackend {
    pub fn new(root: PathBuf) -> Self {
        Self::with_fs(root, RealFileSystem)
    }
}

impl<F: FileSystem> SidecarBackend<F> {
    pub fn with_fs(root: PathBuf, fs: F) -> Self {
        Self {
            trash_dir: TrashDirectory::from_root(root),
            fs,
        }
    }

    fn read_item(&self, content: &Path) -> crate::Result<TrashedItem> {
        let stored_name = content
            .file_name()
            .ok_or_else(|| BackendError::corrupt(content, "stored content has no name"))?;

        let info_path = self.trash_dir.info_path_for(stored_name);
        let bytes = self.fs.read(&info_path)?;
        let info = trashinfo::decode_bytes(&info_path, &bytes)?;
        let size_bytes = self.fs.size_of(content)?;

        let display_name = if info.path.as_os_str().is_empty() {
            stored_name.to_string_lossy().into_owned()
        } else {
            base_name(&info.path)
        };

        Ok(TrashedItem {
            display_name,
            original_path: info.path,
            storage_path: content.to_path_buf(),
            metadata: MetadataRef::Sidecar(info_path),
            deleted_at: info.deletion_date.map(|dt| dt.with_timezone(&Local)),
            size_bytes,
        })
    }

    /// First of `name`, `name.1`, `name.2`, ... free in both directories.
    fn unique_stored_name(&self, name: &OsStr) -> OsString {
        let mut suffix = 0u64;
        loop {
            let candidate = if suffix == 0 {
                name.to_os_string()
            } else {
                build_unique_basename(name, suffix)
            };
            let taken = self.fs.exists(&self.trash_dir.files_path_for(&candidate))
                || self.fs.exists(&self.trash_dir.info_path_for(&candidate));
            if !taken {
                return candidate;
            }
            suffix += 1;
        }
    }
}

impl<F: FileSystem> TrashBackend for SidecarBackend<F> {
    fn name(&self) -> &'static str {
        "sidecar"
    }

    fn enumerate(&self) -> crate::Result<Vec<TrashedItem>> {
        let files_dir = &self.trash_dir.files_dir;
        if !self.fs.exists(files_dir) {
            debug!("trash {} has no files directory", sanitize_user_path(files_dir));
            return Ok(Vec::new());
        }

        let mut items = Vec::new();
        for content in self.fs.list_dir(files_dir)? {
            match self.read_item(&content) {
                Ok(item) => items.push(item),
                Err(err) => warn!("skipping {}: {err}", sanitize_user_path(&content)),
            }
        }
        debug!("sidecar trash lists {} items", items.len());
        Ok(items)
    }

    fn move_in(&self, path: &Path) -> crate::Result<()> {
        let original = absolute_path(path)?;
        if !self.fs.exists(&original) {
            return Err(BackendError::io(
                &original,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
        if original.starts_with(&self.trash_dir.path) || self.trash_dir.path.starts_with(&original) {
            return Err(BackendError::invalid_input(format!(
                "refusing to trash {} which overlaps the trash directory",
                sanitize_user_path(&original)
            )));
        }

        self.fs.create_dir_all(&self.trash_dir.info_dir)?;
        self.fs.create_dir_all(&self.trash_dir.files_dir)?;

        let base = original.file_name().ok_or_else(|| {
            BackendError::invalid_input(format!(
                "{} has no file name to store",
                sanitize_user_path(&original)
            ))
        })?;
        let stored_name = self.unique_stored_name(base);
        let info_path = self.trash_dir.info_path_for(&stored_name);
        let files_path = self.trash_dir.files_path_for(&stored_name);

        let deleted_at: DateTime<Utc> = self.fs.now().into();
        self.fs
            .write_to_string(&info_path, &trashinfo::encode(&original, deleted_at))?;

        if let Err(err) = self.fs.rename(&original, &files_path) {
            debug!(
                "content of {} not moved, record {} left for a retry",
                sanitize_user_path(&original),
                sanitize_user_path(&info_path)
            );
            return Err(err);
        }

        debug!(
            "trashed {} as {}",
            sanitize_user_path(&original),
            sanitize_user_path(&files_path)
        );
        Ok(())
    }

    fn restore_out(&self, entry: &TrashEntry, destination: &Path) -> crate::Result<RestoreReport> {
        let MetadataRef::Sidecar(info_path) = &entry.metadata else {
            return Err(BackendError::invalid_input(format!(
                "entry {} does not belong to a sidecar trash",
                entry.display_name
            )));
        };

        self.fs.rename(&entry.storage_path, destination)?;

        let mut report = RestoreReport::default();
        if let Err(err) = self.fs.remove_file(info_path) {
            debug!("restored {} but kept its record: {err}", entry.display_name);
            report.warnings.push(format!(
                "could not remove {}: {err}",
                sanitize_user_path(info_path)
            ));
        }
        debug!(
            "restored {} to {}",
            entry.display_name,
            sanitize_user_path(destination)
        );
        Ok(report)
    }
}
