use crate::errors::BackendError;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Filesystem boundary used by the trash backends.
///
/// Keeping this trait narrow lets tests inject failures at a single step of a
/// two-phase move (metadata write, content rename, metadata removal) without
/// touching the real disk layout.
pub trait FileSystem {
    /// Returns the current time in wall-clock format.
    fn now(&self) -> SystemTime;

    /// Returns true when path exists (symlink-aware).
    fn exists(&self, path: &Path) -> bool;

    /// Size in bytes of the file (or directory inode) at path.
    fn size_of(&self, path: &Path) -> crate::Result<u64>;

    /// Creates a directory and all missing parent directories.
    fn create_dir_all(&self, path: &Path) -> crate::Result<()>;

    /// Writes UTF-8 text, replacing any previous content.
    fn write_to_string(&self, path: &Path, content: &str) -> crate::Result<()>;

    /// Reads raw bytes.
    fn read(&self, path: &Path) -> crate::Result<Vec<u8>>;

    /// Reads at most `limit` leading bytes.
    fn read_prefix(&self, path: &Path, limit: usize) -> crate::Result<Vec<u8>>;

    /// Removes a file.
    fn remove_file(&self, path: &Path) -> crate::Result<()>;

    /// Renames/moves a path.
    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()>;

    /// Lists directory children as concrete paths, sorted by name.
    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>>;
}

/// Default filesystem implementation backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn size_of(&self, path: &Path) -> crate::Result<u64> {
        match fs::metadata(path) {
            Ok(stat) => Ok(stat.len()),
            // dangling symlinks are still valid trash content
            Err(err) => match fs::symlink_metadata(path) {
                Ok(meta) if meta.file_type().is_symlink() => Ok(meta.len()),
                _ => Err(BackendError::io(path, err)),
            },
        }
    }

    fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
        fs::create_dir_all(path).map_err(|err| BackendError::io(path, err))
    }

    fn write_to_string(&self, path: &Path, content: &str) -> crate::Result<()> {
        fs::write(path, content).map_err(|err| BackendError::io(path, err))
    }

    fn read(&self, path: &Path) -> crate::Result<Vec<u8>> {
        fs::read(path).map_err(|err| BackendError::io(path, err))
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> crate::Result<Vec<u8>> {
        let file = fs::File::open(path).map_err(|err| BackendError::io(path, err))?;
        let mut buf = Vec::with_capacity(limit);
        file.take(limit as u64)
            .read_to_end(&mut buf)
            .map_err(|err| BackendError::io(path, err))?;
        Ok(buf)
    }

    fn remove_file(&self, path: &Path) -> crate::Result<()> {
        fs::remove_file(path).map_err(|err| BackendError::io(path, err))
    }

    fn rename(&self, from: &Path, to: &Path) -> crate::Result<()> {
        fs::rename(from, to).map_err(|err| BackendError::io(from, err))
    }

    fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>> {
        let mut children = fs::read_dir(path)
            .map_err(|err| BackendError::io(path, err))?
            .map(|entry| entry.map(|v| v.path()))
            .collect::<Result<Vec<PathBuf>, io::Error>>()
            .map_err(|err| BackendError::io(path, err))?;
        children.sort();
        Ok(children)
    }
}
