//! `.trashinfo` sidecar records.
//!
//! ```text
//! [Trash Info]
//! Path=/home/user/notes%20v2.txt
//! DeletionDate=2024-01-01T00:00:00Z
//! ```

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use std::path::{Path, PathBuf};
#[cfg(not(unix))]
use tracing::warn;
#[cfg(unix)]
use std::ffi::OsStr;
#[cfg(unix)]
use std::os::unix::ffi::OsStrExt;
#[cfg(unix)]
use urlencoding::{decode_binary, encode_binary};
#[cfg(not(unix))]
use urlencoding::{decode as url_decode, encode as url_encode};

use crate::errors::BackendError;

/// First line of every record written by this crate.
pub const TRASHINFO_HEADER: &str = "[Trash Info]";

/// Deletion date format used by freedesktop implementations (local, no offset).
pub const TRASHINFO_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const PATH_KEY: &str = "Path=";
const DELETION_DATE_KEY: &str = "DeletionDate=";

/// Logical content of a sidecar record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashInfo {
    /// Empty when the record carries no usable `Path=` line.
    pub path: PathBuf,
    pub deletion_date: Option<DateTime<Utc>>,
}

/// Renders a record for `path` deleted at `deleted_at`.
pub fn encode(path: &Path, deleted_at: DateTime<Utc>) -> String {
    format!(
        "{TRASHINFO_HEADER}\n{PATH_KEY}{}\n{DELETION_DATE_KEY}{}\n",
        encode_path(path),
        serialize_datetime(deleted_at)
    )
}

/// Percent-encodes every path component, keeping `/` separators literal.
///
/// Unix names are encoded byte for byte, so names that are not UTF-8 survive.
#[cfg(unix)]
pub fn encode_path(path: &Path) -> String {
    path.as_os_str()
        .as_bytes()
        .split(|byte| *byte == b'/')
        .map(|component| encode_binary(component).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(not(unix))]
pub fn encode_path(path: &Path) -> String {
    path.to_string_lossy()
        .split('/')
        .map(|component| url_encode(component).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn decode_path(encoded: &str) -> PathBuf {
    PathBuf::from(OsStr::from_bytes(&decode_binary(encoded.as_bytes())))
}

#[cfg(not(unix))]
fn decode_path(encoded: &str) -> PathBuf {
    match url_decode(encoded) {
        Ok(decoded) => PathBuf::from(decoded.into_owned()),
        Err(err) => {
            warn!("cannot percent-decode Path={encoded:?}: {err}");
            PathBuf::new()
        }
    }
}

/// RFC 3339 in UTC with second precision, e.g. `2024-01-01T00:00:00Z`.
pub fn serialize_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses RFC 3339, falling back to the freedesktop form read as UTC.
pub fn parse_trash_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, TRASHINFO_TIME_FORMAT)
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

/// Decodes a raw record read from `record_path`.
pub fn decode_bytes(record_path: &Path, bytes: &[u8]) -> crate::Result<TrashInfo> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| BackendError::corrupt(record_path, format!("not UTF-8: {err}")))?;
    Ok(decode(text))
}

/// Decodes record text.
///
/// Lines are scanned independently: keys may come in any order, the header is
/// not checked and unknown keys are ignored. The first occurrence of a key wins.
pub fn decode(content: &str) -> TrashInfo {
    let mut path: Option<PathBuf> = None;
    let mut deletion_date: Option<Option<DateTime<Utc>>> = None;

    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(encoded) = line.strip_prefix(PATH_KEY) {
            if path.is_some() {
                continue;
            }
            path = Some(decode_path(encoded));
        } else if let Some(value) = line.strip_prefix(DELETION_DATE_KEY) {
            if deletion_date.is_none() {
                deletion_date = Some(parse_trash_datetime(value.trim()));
            }
        }
    }

    TrashInfo {
        path: path.unwrap_or_default(),
        deletion_date: deletion_date.flatten(),
    }
}
