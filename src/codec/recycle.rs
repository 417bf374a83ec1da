//! `$I` records of the Windows recycle bin.
//!
//! Every `$R<id><ext>` content item has a sibling `$I<id><ext>` record:
//!
//! ```text
//! [0..8)   i64 LE  format version (1 or 2, not validated)
//! [8..16)  i64 LE  size of the content in bytes
//! [16..24) i64 LE  deletion time, FILETIME ticks since 1601-01-01 UTC
//! [24..)   original location (layout depends on the version)
//! ```

use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};

use crate::errors::BackendError;

pub const CONTENT_MARKER: &str = "$R";
pub const METADATA_MARKER: &str = "$I";

/// Bytes needed to decode size and deletion time.
pub const RECORD_PREFIX_LEN: usize = 24;

const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;
/// Seconds between 1601-01-01 and 1970-01-01.
const WINDOWS_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

const V1_PATH_FIELD_LEN: usize = 520;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecycleRecord {
    pub size_bytes: u64,
    pub deleted_at: DateTime<Local>,
}

/// `$RAB12CD.txt` -> `$IAB12CD.txt`; `None` when the name has no content marker.
pub fn metadata_name_for(content_name: &str) -> Option<String> {
    content_name
        .contains(CONTENT_MARKER)
        .then(|| content_name.replacen(CONTENT_MARKER, METADATA_MARKER, 1))
}

/// Sibling `$I` record of a `$R` content path.
pub fn metadata_path_for(storage_path: &Path) -> Option<PathBuf> {
    let name = storage_path.file_name()?.to_str()?;
    let record = metadata_name_for(name)?;
    Some(storage_path.with_file_name(record))
}

/// Converts FILETIME ticks to a UTC instant.
pub fn filetime_to_utc(ticks: i64) -> Option<DateTime<Utc>> {
    let secs = ticks.div_euclid(TICKS_PER_SECOND) - WINDOWS_EPOCH_OFFSET_SECS;
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
    DateTime::from_timestamp(secs, nanos as u32)
}

/// Decodes size and deletion time from the first 24 bytes of a record.
///
/// Anything past byte 24 is ignored.
pub fn decode_record(record_path: &Path, bytes: &[u8]) -> crate::Result<RecycleRecord> {
    if bytes.len() < RECORD_PREFIX_LEN {
        return Err(BackendError::corrupt(
            record_path,
            format!("record is {} bytes, need {RECORD_PREFIX_LEN}", bytes.len()),
        ));
    }

    let size = read_i64(&bytes[8..16]);
    let ticks = read_i64(&bytes[16..24]);

    let size_bytes = u64::try_from(size)
        .map_err(|_| BackendError::corrupt(record_path, format!("negative size {size}")))?;
    let deleted_at = filetime_to_utc(ticks)
        .ok_or_else(|| BackendError::corrupt(record_path, format!("timestamp {ticks} out of range")))?
        .with_timezone(&Local);

    Ok(RecycleRecord {
        size_bytes,
        deleted_at,
    })
}

/// Decodes the original location stored after the fixed prefix.
///
/// Version 2 keeps a `u32` character count at 24 followed by UTF-16LE text;
/// version 1 has a NUL-padded 520-byte UTF-16LE field.
pub fn decode_original_location(record_path: &Path, bytes: &[u8]) -> crate::Result<PathBuf> {
    if bytes.len() < RECORD_PREFIX_LEN {
        return Err(BackendError::corrupt(record_path, "record too short"));
    }

    let text = match read_i64(&bytes[0..8]) {
        2 => {
            let header = bytes
                .get(24..28)
                .ok_or_else(|| BackendError::corrupt(record_path, "missing path length"))?;
            let chars = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let end = 28 + chars * 2;
            let raw = bytes
                .get(28..end)
                .ok_or_else(|| BackendError::corrupt(record_path, "path length past end of record"))?;
            utf16_until_nul(raw)
        }
        _ => {
            let end = bytes.len().min(RECORD_PREFIX_LEN + V1_PATH_FIELD_LEN);
            utf16_until_nul(&bytes[RECORD_PREFIX_LEN..end])
        }
    };

    if text.is_empty() {
        return Err(BackendError::corrupt(record_path, "empty original location"));
    }
    Ok(PathBuf::from(text))
}

fn read_i64(raw: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(raw);
    i64::from_le_bytes(buf)
}

fn utf16_until_nul(raw: &[u8]) -> String {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|unit| *unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}
