//! Recycle bin store: `$R` content paired with binary `$I` records.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{RestoreReport, TrashBackend};
use crate::codec::recycle::{self, CONTENT_MARKER};
use crate::errors::BackendError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::helpers::{absolute_path, sanitize_user_path};
use crate::models::{MetadataRef, TrashEntry, TrashedItem};

/// The names a recycle namespace can report for one of its children.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DisplayNameKind {
    /// Name relative to its original folder.
    InFolder,
    /// Fully qualified original location.
    Normal,
    /// Path of the stored content inside the bin.
    ForParsing,
}

/// Read access to the recycle namespace plus the platform's recoverable delete.
pub trait RecycleNamespace {
    type Item;

    fn children(&self) -> crate::Result<Vec<Self::Item>>;

    fn display_name(&self, item: &Self::Item, kind: DisplayNameKind) -> crate::Result<String>;

    /// Silent, undoable, no-confirmation delete of `path` into the bin.
    fn delete_recoverable(&self, path: &Path) -> crate::Result<()>;
}

/// Names of one child, extracted before the record is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFields {
    pub display_name: String,
    pub original_path: PathBuf,
    pub storage_path: PathBuf,
}

/// Fields decoded from the `$I` record of one child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub record_path: PathBuf,
    pub deleted_at: DateTime<Local>,
    pub size_bytes: u64,
}

pub fn extract_names<N: RecycleNamespace>(namespace: &N, item: &N::Item) -> crate::Result<NameFields> {
    let display_name = namespace.display_name(item, DisplayNameKind::InFolder)?;
    let original_path = PathBuf::from(namespace.display_name(item, DisplayNameKind::Normal)?);
    let storage_path = PathBuf::from(namespace.display_name(item, DisplayNameKind::ForParsing)?);
    if storage_path.as_os_str().is_empty() {
        return Err(BackendError::platform("namespace reported an empty storage path"));
    }
    Ok(NameFields {
        display_name,
        original_path,
        storage_path,
    })
}

pub fn extract_record<F: FileSystem>(fs: &F, storage_path: &Path) -> crate::Result<RecordFields> {
    if !fs.exists(storage_path) {
        return Err(BackendError::io(
            storage_path,
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
    }
    let record_path = recycle::metadata_path_for(storage_path).ok_or_else(|| {
        BackendError::corrupt(storage_path, format!("stored name lacks the {CONTENT_MARKER} marker"))
    })?;
    let bytes = fs.read_prefix(&record_path, recycle::RECORD_PREFIX_LEN)?;
    let record = recycle::decode_record(&record_path, &bytes)?;
    Ok(RecordFields {
        record_path,
        deleted_at: record.deleted_at,
        size_bytes: record.size_bytes,
    })
}

fn merge(names: NameFields, record: RecordFields) -> TrashedItem {
    TrashedItem {
        display_name: names.display_name,
        original_path: names.original_path,
        storage_path: names.storage_path,
        metadata: MetadataRef::RecycleRecord(record.record_path),
        deleted_at: Some(record.deleted_at),
        size_bytes: record.size_bytes,
    }
}

pub struct RecycleBinBackend<N: RecycleNamespace, F: FileSystem = RealFileSystem> {
    namespace: N,
    fs: F,
}

impl<N: RecycleNamespace> RecycleBinBackend<N> {
    pub fn new(namespace: N) -> Self {
        Self::with_fs(namespace, RealFileSystem)
    }
}

impl<N: RecycleNamespace, F: FileSystem> RecycleBinBackend<N, F> {
    pub fn with_fs(namespace: N, fs: F) -> Self {
        Self { namespace, fs }
    }

    fn read_item(&self, item: &N::Item) -> crate::Result<TrashedItem> {
        let names = extract_names(&self.namespace, item)?;
        let record = extract_record(&self.fs, &names.storage_path)?;
        Ok(merge(names, record))
    }
}

impl<N: RecycleNamespace, F: FileSystem> TrashBackend for RecycleBinBackend<N, F> {
    fn name(&self) -> &'static str {
        "recycle-bin"
    }

    fn enumerate(&self) -> crate::Result<Vec<TrashedItem>> {
        let mut items = Vec::new();
        for child in self.namespace.children()? {
            match self.read_item(&child) {
                Ok(item) => items.push(item),
                Err(err) => warn!("skipping recycle bin item: {err}"),
            }
        }
        debug!("recycle bin lists {} items", items.len());
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
        self.namespace.delete_recoverable(&original)?;
        debug!("recycled {}", sanitize_user_path(&original));
        Ok(())
    }

    fn restore_out(&self, entry: &TrashEntry, destination: &Path) -> crate::Result<RestoreReport> {
        let MetadataRef::RecycleRecord(record_path) = &entry.metadata else {
            return Err(BackendError::invalid_input(format!(
                "entry {} does not belong to a recycle bin",
                entry.display_name
            )));
        };

        self.fs.rename(&entry.storage_path, destination)?;

        let mut report = RestoreReport::default();
        if let Err(err) = self.fs.remove_file(record_path) {
            debug!("restored {} but kept its $I record: {err}", entry.display_name);
            report.warnings.push(format!(
                "could not remove {}: {err}",
                sanitize_user_path(record_path)
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

/// Recycle namespace backed by a `$Recycle.Bin` directory.
///
/// `root` is either the bin itself (one subdirectory per account) or a single
/// account directory. Account directories that cannot be read are skipped.
pub struct RecycleDirectory<F: FileSystem = RealFileSystem> {
    root: PathBuf,
    fs: F,
}

/// `$R` content found in the bin, with the location decoded from its `$I` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecycledFile {
    pub content: PathBuf,
    pub original: PathBuf,
}

impl RecycleDirectory {
    pub fn new(root: PathBuf) -> Self {
        Self::with_fs(root, RealFileSystem)
    }
}

impl<F: FileSystem> RecycleDirectory<F> {
    pub fn with_fs(root: PathBuf, fs: F) -> Self {
        Self { root, fs }
    }

    fn content_paths(&self) -> crate::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for child in self.fs.list_dir(&self.root)? {
            if is_content_name(&child) {
                paths.push(child);
                continue;
            }
            // account directories; plain files such as desktop.ini fail here
            match self.fs.list_dir(&child) {
                Ok(grandchildren) => paths.extend(grandchildren.into_iter().filter(|p| is_content_name(p))),
                Err(err) => debug!("not walking {}: {err}", sanitize_user_path(&child)),
            }
        }
        Ok(paths)
    }

    fn original_location(&self, content: &Path) -> crate::Result<PathBuf> {
        let record_path = recycle::metadata_path_for(content).ok_or_else(|| {
            BackendError::corrupt(content, format!("stored name lacks the {CONTENT_MARKER} marker"))
        })?;
        let bytes = self.fs.read(&record_path)?;
        recycle::decode_original_location(&record_path, &bytes)
    }
}

fn is_content_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(CONTENT_MARKER))
}

/// Last component of a recorded location, which may use either separator.
fn leaf_name(location: &str) -> &str {
    location.rsplit(['\\', '/']).next().unwrap_or(location)
}

impl<F: FileSystem> RecycleNamespace for RecycleDirectory<F> {
    type Item = RecycledFile;

    /// Every `$R` item whose `$I` record names an original location; the
    /// record is read once here.
    fn children(&self) -> crate::Result<Vec<RecycledFile>> {
        let mut items = Vec::new();
        for content in self.content_paths()? {
            match self.original_location(&content) {
                Ok(original) => items.push(RecycledFile { content, original }),
                Err(err) => warn!("skipping {}: {err}", sanitize_user_path(&content)),
            }
        }
        Ok(items)
    }

    fn display_name(&self, item: &RecycledFile, kind: DisplayNameKind) -> crate::Result<String> {
        let original = item.original.to_string_lossy();
        Ok(match kind {
            DisplayNameKind::InFolder => leaf_name(&original).to_string(),
            DisplayNameKind::Normal => original.into_owned(),
            DisplayNameKind::ForParsing => item.content.to_string_lossy().into_owned(),
        })
    }

    #[cfg(windows)]
    fn delete_recoverable(&self, path: &Path) -> crate::Result<()> {
        super::shell::delete_recoverable(path)
    }

    #[cfg(not(windows))]
    fn delete_recoverable(&self, path: &Path) -> crate::Result<()> {
        Err(BackendError::platform(format!(
            "recycling {} needs the Windows shell",
            sanitize_user_path(path)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryId;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::fs;
    use tempfile::tempdir;

    const TICKS_2024: i64 = (1_704_067_200 + 11_644_473_600) * 10_000_000;

    fn write_pair(dir: &Path, id: &str, original: &str, content: &[u8]) -> PathBuf {
        let mut record = Vec::new();
        record.extend_from_slice(&2i64.to_le_bytes());
        record.extend_from_slice(&(content.len() as i64).to_le_bytes());
        record.extend_from_slice(&TICKS_2024.to_le_bytes());
        let units: Vec<u16> = original.encode_utf16().chain(Some(0)).collect();
        record.extend_from_slice(&(units.len() as u32).to_le_bytes());
        record.extend(units.iter().flat_map(|u| u.to_le_bytes()));
        fs::write(dir.join(format!("$I{id}")), record).unwrap();
        let stored = dir.join(format!("$R{id}"));
        fs::write(&stored, content).unwrap();
        stored
    }

    #[test]
    fn directory_namespace_walks_account_dirs() {
        let bin = tempdir().unwrap();
        let account = bin.path().join("S-1-5-21-1000");
        fs::create_dir_all(&account).unwrap();
        fs::write(account.join("desktop.ini"), "x").unwrap();
        fs::write(bin.path().join("desktop.ini"), "x").unwrap();
        write_pair(&account, "AB12CD.txt", "C:\\Users\\me\\report.txt", b"abc");

        let backend = RecycleBinBackend::new(RecycleDirectory::new(bin.path().to_path_buf()));
        let items = backend.enumerate().unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.display_name, "report.txt");
        assert_eq!(item.original_path, PathBuf::from("C:\\Users\\me\\report.txt"));
        assert_eq!(item.storage_path, account.join("$RAB12CD.txt"));
        assert_eq!(item.size_bytes, 3);
        assert_eq!(item.deleted_at.unwrap().timestamp(), 1_704_067_200);
    }

    #[test]
    fn content_without_record_is_skipped() {
        let bin = tempdir().unwrap();
        write_pair(bin.path(), "1.txt", "C:\\one.txt", b"1");
        fs::write(bin.path().join("$R2.txt"), "2").unwrap();

        let backend = RecycleBinBackend::new(RecycleDirectory::new(bin.path().to_path_buf()));
        let items = backend.enumerate().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].display_name, "one.txt");
    }

    #[test]
    fn restore_renames_content_and_removes_record() {
        let bin = tempdir().unwrap();
        let out = tempdir().unwrap();
        write_pair(bin.path(), "9.txt", "C:\\nine.txt", b"nine");

        let backend = RecycleBinBackend::new(RecycleDirectory::new(bin.path().to_path_buf()));
        let item = backend.enumerate().unwrap().remove(0);
        let entry = TrashEntry::from_item(EntryId { load: 0, seq: 1 }, item);
        let destination = out.path().join("nine.txt");

        let report = backend.restore_out(&entry, &destination).unwrap();
        assert!(report.is_clean());
        assert_eq!(fs::read(&destination).unwrap(), b"nine");
        assert!(!bin.path().join("$I9.txt").exists());
    }

    /// Counts whole and prefix reads of `$I` records.
    #[derive(Clone, Default)]
    struct CountingFs {
        record_reads: Rc<Cell<usize>>,
    }

    impl CountingFs {
        fn note(&self, path: &Path) {
            let is_record = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(recycle::METADATA_MARKER));
            if is_record {
                self.record_reads.set(self.record_reads.get() + 1);
            }
        }
    }

    impl FileSystem for CountingFs {
        fn now(&self) -> std::time::SystemTime {
            RealFileSystem.now()
        }
        fn exists(&self, path: &Path) -> bool {
            RealFileSystem.exists(path)
        }
        fn size_of(&self, path: &Path) -> crate::Result<u64> {
            RealFileSystem.size_of(path)
        }
        fn create_dir_all(&self, path: &Path) -> crate::Result<()> {
            RealFileSystem.create_dir_all(path)
        }
        fn write_to_string(&self, path: &Path, content: &str) -> crate::Result<()> {
            RealFileSystem.write_to_string(path, content)
        }
        fn read(&self, path: &Path) -> crate::Result<Vec<u8>> {
            self.note(path);
            RealFileSystem.read(path)
        }
        fn read_prefix(&self, path: &Path, limit: usize) -> crate::Result<Vec<u8>> {
            self.note(path);
            RealFileSystem.read_prefix(path, limit)
        }
        fn remove_file(&self, path: &Path) -> crate::Result<()> {
            RealFileSystem.remove_file(path)
        }
        fn rename(&self, from: &Path, to: &Path) -> crate::Result<()> {
            RealFileSystem.rename(from, to)
        }
        fn list_dir(&self, path: &Path) -> crate::Result<Vec<PathBuf>> {
            RealFileSystem.list_dir(path)
        }
    }

    #[test]
    fn each_record_is_read_once_for_names_and_once_for_the_header() {
        let bin = tempdir().unwrap();
        write_pair(bin.path(), "7.txt", "C:\\docs\\seven.txt", b"7");

        let fs = CountingFs::default();
        let backend = RecycleBinBackend::with_fs(
            RecycleDirectory::with_fs(bin.path().to_path_buf(), fs.clone()),
            fs.clone(),
        );
        let items = backend.enumerate().unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].display_name, "seven.txt");
        assert_eq!(fs.record_reads.get(), 2);
    }

    struct FakeShell {
        recycled: RefCell<Vec<PathBuf>>,
        code: Option<u32>,
    }

    impl RecycleNamespace for FakeShell {
        type Item = ();

        fn children(&self) -> crate::Result<Vec<()>> {
            Ok(Vec::new())
        }

        fn display_name(&self, _item: &(), _kind: DisplayNameKind) -> crate::Result<String> {
            Ok(String::new())
        }

        fn delete_recoverable(&self, path: &Path) -> crate::Result<()> {
            if let Some(code) = self.code {
                return Err(BackendError::platform(format!("shell returned {code:#x}")));
            }
            self.recycled.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    #[test]
    fn move_in_defers_to_shell_result() {
        let dir = tempdir().unwrap();
        let victim = dir.path().join("v.txt");
        fs::write(&victim, "v").unwrap();

        let ok = RecycleBinBackend::new(FakeShell {
            recycled: RefCell::new(Vec::new()),
            code: None,
        });
        ok.move_in(&victim).unwrap();
        assert_eq!(*ok.namespace.recycled.borrow(), vec![victim.clone()]);

        let failing = RecycleBinBackend::new(FakeShell {
            recycled: RefCell::new(Vec::new()),
            code: Some(0x78),
        });
        let err = failing.move_in(&victim).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::PlatformApi);
    }

    #[test]
    fn empty_storage_path_is_rejected() {
        let shell = FakeShell {
            recycled: RefCell::new(Vec::new()),
            code: None,
        };
        assert!(extract_names(&shell, &()).is_err());
    }
}
