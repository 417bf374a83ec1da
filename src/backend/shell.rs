use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows_sys::Win32::UI::Shell::{
    SHFileOperationW, FOF_ALLOWUNDO, FOF_NOCONFIRMATION, FOF_SILENT, FO_DELETE, SHFILEOPSTRUCTW,
};

use crate::errors::BackendError;
use crate::helpers::sanitize_user_path;

/// Sends `path` to the recycle bin through `SHFileOperationW`.
///
/// The return code of the call is authoritative; `GetLastError` is not
/// consulted.
pub(super) fn delete_recoverable(path: &Path) -> crate::Result<()> {
    // pFrom is a list of paths terminated by an extra NUL
    let mut from: Vec<u16> = path.as_os_str().encode_wide().collect();
    from.extend_from_slice(&[0, 0]);

    let mut op = SHFILEOPSTRUCTW {
        hwnd: std::ptr::null_mut(),
        wFunc: FO_DELETE as u32,
        pFrom: from.as_ptr(),
        pTo: std::ptr::null(),
        fFlags: (FOF_SILENT | FOF_ALLOWUNDO | FOF_NOCONFIRMATION) as u16,
        fAnyOperationsAborted: 0,
        hNameMappings: std::ptr::null_mut(),
        lpszProgressTitle: std::ptr::null(),
    };

    // SAFETY: `op` and the NUL-terminated `from` buffer outlive the call.
    let code = unsafe { SHFileOperationW(&mut op) };
    if code != 0 {
        return Err(BackendError::platform(format!(
            "SHFileOperationW({}) returned {code:#x}",
            sanitize_user_path(path)
        )));
    }
    if op.fAnyOperationsAborted != 0 {
        return Err(BackendError::platform(format!(
            "recycling {} was aborted",
            sanitize_user_path(path)
        )));
    }
    Ok(())
}
