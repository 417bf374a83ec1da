use std::{io, path::PathBuf};

/// Coarse classification of a failure so callers can decide retry vs. fatal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    /// A rename crossed a filesystem boundary.
    CrossDevice,
    /// A metadata record is unreadable or malformed.
    Corrupt,
    /// The underlying OS or shell call failed.
    PlatformApi,
    /// A disambiguation index was out of range.
    InvalidSelection,
    /// The destination of a restore is already occupied.
    Conflict,
    InvalidInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::PermissionDenied => "permission-denied",
            Self::CrossDevice => "cross-device",
            Self::Corrupt => "corrupt",
            Self::PlatformApi => "platform-api",
            Self::InvalidSelection => "invalid-selection",
            Self::Conflict => "conflict",
            Self::InvalidInput => "invalid-input",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type shared by the codec, the backends and the restore engine.
#[derive(thiserror::Error, Debug)]
pub enum BackendError {
    /// File system I/O failure.
    #[error("I/O error while accessing {0}: {1}")]
    Io(PathBuf, #[source] io::Error),

    /// A metadata record could not be decoded.
    #[error("corrupt metadata record {0}: {1}")]
    Corrupt(PathBuf, String),

    /// A platform facility reported failure.
    #[error("platform call failed: {0}")]
    Platform(String),

    /// No trashed item matches the request.
    #[error("no trashed item matches {0:?}")]
    NoMatch(String),

    /// A catalog id does not belong to the current catalog.
    #[error("unknown or stale entry id {0}")]
    UnknownEntry(String),

    /// The caller picked a candidate that does not exist.
    #[error("selection {index} is out of range ({count} candidates)")]
    InvalidSelection { index: usize, count: usize },

    /// A conflict prevented the operation from proceeding.
    #[error("resource conflict: {0}")]
    Conflict(String),

    /// An operation was rejected due to configuration/argument issues.
    #[error("invalid command input: {0}")]
    InvalidInput(String),
}

impl BackendError {
    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Self::Io(path.into(), error)
    }

    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt(path.into(), message.into())
    }

    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_, err) => classify_io(err),
            Self::Corrupt(..) => ErrorKind::Corrupt,
            Self::Platform(_) => ErrorKind::PlatformApi,
            Self::NoMatch(_) | Self::UnknownEntry(_) => ErrorKind::NotFound,
            Self::InvalidSelection { .. } => ErrorKind::InvalidSelection,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}

fn classify_io(err: &io::Error) -> ErrorKind {
    if is_cross_device(err) {
        return ErrorKind::CrossDevice;
    }
    match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
        io::ErrorKind::AlreadyExists => ErrorKind::Conflict,
        io::ErrorKind::InvalidData => ErrorKind::Corrupt,
        _ => ErrorKind::PlatformApi,
    }
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::EXDEV)
}

#[cfg(windows)]
fn is_cross_device(err: &io::Error) -> bool {
    err.raw_os_error() == Some(windows_sys::Win32::Foundation::ERROR_NOT_SAME_DEVICE as i32)
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

/// Shared result alias for the core crate.
pub type Result<T> = std::result::Result<T, BackendError>;
