//! The canonical, in-memory list of trashed items.
//!
//! A [`Catalog`] is one snapshot of a backend. Display rows are projected from
//! it on demand, so there is never a second list to keep in sync after a
//! restore.

use globset::{GlobBuilder, GlobMatcher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::backend::TrashBackend;
use crate::errors::BackendError;
use crate::models::{EntryId, TrashEntry, TrashedItem};

static NEXT_LOAD: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum MatchStyle {
    /// Pattern is contained in the name.
    #[default]
    Substring,
    /// Pattern is a glob over the whole name.
    Glob,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct MatchMode {
    pub style: MatchStyle,
    pub ignore_case: bool,
}

enum Matcher {
    Substring { needle: String, ignore_case: bool },
    Glob(GlobMatcher),
}

impl Matcher {
    fn compile(pattern: &str, mode: MatchMode) -> crate::Result<Self> {
        match mode.style {
            MatchStyle::Substring => Ok(Self::Substring {
                needle: if mode.ignore_case {
                    pattern.to_lowercase()
                } else {
                    pattern.to_string()
                },
                ignore_case: mode.ignore_case,
            }),
            MatchStyle::Glob => {
                let glob = GlobBuilder::new(pattern)
                    .case_insensitive(mode.ignore_case)
                    .literal_separator(true)
                    .build()
                    .map_err(|err| BackendError::invalid_input(format!("invalid glob pattern: {err}")))?;
                Ok(Self::Glob(glob.compile_matcher()))
            }
        }
    }

    fn is_match(&self, name: &str) -> bool {
        match self {
            Self::Substring { needle, ignore_case: true } => name.to_lowercase().contains(needle.as_str()),
            Self::Substring { needle, ignore_case: false } => name.contains(needle.as_str()),
            Self::Glob(glob) => glob.is_match(name),
        }
    }
}

/// Display projection of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: EntryId,
    pub name: String,
    pub size: u64,
    pub deleted: String,
    pub location: String,
}

impl Row {
    pub const HEADERS: [&'static str; 5] = ["#", "Name", "Size", "Date Deleted", "Location"];

    fn from_entry(entry: &TrashEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.display_name.clone(),
            size: entry.size_bytes,
            deleted: entry.deleted_at_rfc3339(),
            location: entry.original_path.to_string_lossy().into_owned(),
        }
    }

    pub fn columns(&self) -> [String; 5] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.size.to_string(),
            self.deleted.clone(),
            self.location.clone(),
        ]
    }

    /// Case-insensitive containment in any column.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.columns()
            .iter()
            .any(|column| column.to_lowercase().contains(&needle))
    }
}

/// One of several entries matching a restore request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Zero-based position the caller selects by.
    pub index: usize,
    pub id: EntryId,
    pub display_name: String,
    pub deleted_at: String,
    pub size_bytes: u64,
    pub original_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Unique(EntryId),
    /// More than one entry matched; the caller has to pick one.
    Ambiguous(Vec<Candidate>),
}

/// Picks candidate `index`; out of range is an error, never a default.
pub fn select(candidates: &[Candidate], index: usize) -> crate::Result<EntryId> {
    candidates
        .get(index)
        .map(|candidate| candidate.id)
        .ok_or(BackendError::InvalidSelection {
            index,
            count: candidates.len(),
        })
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    load: u64,
    entries: Vec<TrashEntry>,
}

impl Catalog {
    /// Enumerates `backend` into a fresh snapshot with its own ids.
    pub fn load(backend: &dyn TrashBackend) -> crate::Result<Self> {
        let items = backend.enumerate()?;
        let catalog = Self::from_items(items);
        debug!(
            "loaded {} entries from the {} store (load {})",
            catalog.len(),
            backend.name(),
            catalog.load
        );
        Ok(catalog)
    }

    pub fn from_items(items: Vec<TrashedItem>) -> Self {
        let load = NEXT_LOAD.fetch_add(1, Ordering::Relaxed);
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| {
                let id = EntryId {
                    load,
                    seq: idx as u32 + 1,
                };
                TrashEntry::from_item(id, item)
            })
            .collect();
        Self { load, entries }
    }

    pub fn entries(&self) -> &[TrashEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&TrashEntry> {
        if id.load != self.load {
            return None;
        }
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn remove(&mut self, id: EntryId) -> Option<TrashEntry> {
        let pos = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(pos))
    }

    pub fn rows(&self) -> Vec<Row> {
        self.entries.iter().map(Row::from_entry).collect()
    }

    /// Rows mentioning `needle` in any column; an empty needle keeps all rows.
    pub fn filter_rows(&self, needle: &str) -> Vec<Row> {
        let rows = self.rows();
        if needle.is_empty() {
            return rows;
        }
        rows.into_iter().filter(|row| row.mentions(needle)).collect()
    }

    /// Entries whose display name matches `pattern`, in catalog order.
    pub fn matching(&self, pattern: &str, mode: MatchMode) -> crate::Result<Vec<&TrashEntry>> {
        let matcher = Matcher::compile(pattern, mode)?;
        Ok(self
            .entries
            .iter()
            .filter(|entry| matcher.is_match(&entry.display_name))
            .collect())
    }

    pub fn resolve(&self, pattern: &str, mode: MatchMode) -> crate::Result<Resolution> {
        let matches = self.matching(pattern, mode)?;
        match matches.as_slice() {
            [] => Err(BackendError::NoMatch(pattern.to_string())),
            [only] => Ok(Resolution::Unique(only.id)),
            many => Ok(Resolution::Ambiguous(
                many.iter()
                    .enumerate()
                    .map(|(index, entry)| Candidate {
                        index,
                        id: entry.id,
                        display_name: entry.display_name.clone(),
                        deleted_at: entry.deleted_at_rfc3339(),
                        size_bytes: entry.size_bytes,
                        original_path: entry.original_path.clone(),
                    })
                    .collect(),
            )),
        }
    }
}
