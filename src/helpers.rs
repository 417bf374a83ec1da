//! Small shared helpers for paths, names and sizes.

use crate::errors::BackendError;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub const TRASHINFO_EXTENSION: &str = ".trashinfo";

/// Path as shown in logs and messages.
pub fn sanitize_user_path(path: &Path) -> String {
    path.display().to_string().trim().to_owned()
}

/// Stored name for the `suffix`-th item sharing `file_name`'s base name.
pub fn build_unique_basename(file_name: &OsStr, suffix: u64) -> OsString {
    let mut name = Path::new(file_name)
        .file_name()
        .unwrap_or_else(|| OsStr::new("item"))
        .to_os_string();
    name.push(format!(".{suffix}"));
    name
}

/// Size with binary units: bytes as is, larger sizes with one decimal.
pub fn print_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["K", "M", "G", "T"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut scaled = bytes as f64 / 1024.0;
    let mut unit = 0;
    while scaled >= 1024.0 && unit + 1 < UNITS.len() {
        scaled /= 1024.0;
        unit += 1;
    }
    format!("{scaled:.1} {}", UNITS[unit])
}

/// Makes `path` absolute against the current directory without touching the
/// filesystem, so dangling symlinks keep their own name.
pub fn absolute_path(path: &Path) -> crate::Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(BackendError::invalid_input("empty path"));
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|err| BackendError::io(".", err))?;
    Ok(cwd.join(path))
}

/// Final path component as a display string.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| sanitize_user_path(path))
}
