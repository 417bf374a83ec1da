#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use trashbox_core::backend::SidecarBackend;
use trashbox_core::{BackendError, FileSystem, RealFileSystem, TrashEngine};

/// Real filesystem with switchable failures on the steps of a move.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlakyFs {
    pub fail_write: bool,
    pub fail_rename: bool,
    /// Renames fail as if the target were on another filesystem.
    pub cross_device: bool,
    pub fail_remove: bool,
}

fn refused(path: &Path) -> BackendError {
    BackendError::io(path, std::io::Error::from(std::io::ErrorKind::PermissionDenied))
}

#[cfg(unix)]
fn cross_device(path: &Path) -> BackendError {
    BackendError::io(path, std::io::Error::from_raw_os_error(libc::EXDEV))
}

#[cfg(not(unix))]
fn cross_device(path: &Path) -> BackendError {
    // ERROR_NOT_SAME_DEVICE
    BackendError::io(path, std::io::Error::from_raw_os_error(17))
}

impl FileSystem for FlakyFs {
    fn now(&self) -> SystemTime {
        RealFileSystem.now()
    }

    fn exists(&self, path: &Path) -> bool {
        RealFileSystem.exists(path)
    }

    fn size_of(&self, path: &Path) -> trashbox_core::Result<u64> {
        RealFileSystem.size_of(path)
    }

    fn create_dir_all(&self, path: &Path) -> trashbox_core::Result<()> {
        RealFileSystem.create_dir_all(path)
    }

    fn write_to_string(&self, path: &Path, content: &str) -> trashbox_core::Result<()> {
        if self.fail_write {
            return Err(refused(path));
        }
        RealFileSystem.write_to_string(path, content)
    }

    fn read(&self, path: &Path) -> trashbox_core::Result<Vec<u8>> {
        RealFileSystem.read(path)
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> trashbox_core::Result<Vec<u8>> {
        RealFileSystem.read_prefix(path, limit)
    }

    fn remove_file(&self, path: &Path) -> trashbox_core::Result<()> {
        if self.fail_remove {
            return Err(refused(path));
        }
        RealFileSystem.remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> trashbox_core::Result<()> {
        if self.cross_device {
            return Err(cross_device(from));
        }
        if self.fail_rename {
            return Err(refused(from));
        }
        RealFileSystem.rename(from, to)
    }

    fn list_dir(&self, path: &Path) -> trashbox_core::Result<Vec<PathBuf>> {
        RealFileSystem.list_dir(path)
    }
}

pub fn sidecar_engine(root: &Path) -> TrashEngine {
    TrashEngine::new(Box::new(SidecarBackend::new(root.to_path_buf()))).unwrap()
}

pub fn flaky_engine(root: &Path, fs: FlakyFs) -> TrashEngine {
    TrashEngine::new(Box::new(SidecarBackend::with_fs(root.to_path_buf(), fs))).unwrap()
}

/// Writes `content` to `dir/name` and moves it into the trash at `root`.
pub fn trash_file(root: &Path, dir: &Path, name: &str, content: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    sidecar_engine(root).move_in(&path).unwrap();
    path
}
