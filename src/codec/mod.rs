//! On-disk metadata formats: freedesktop `.trashinfo` sidecars and the
//! recycle bin's binary `$I` records.

pub mod recycle;
pub mod trashinfo;

pub use recycle::{decode_record, metadata_path_for, RecycleRecord};
pub use trashinfo::{decode as decode_trashinfo, encode as encode_trashinfo, TrashInfo};
