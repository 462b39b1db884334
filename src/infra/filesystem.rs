//! Filesystem operations
//!
//! Handles file and directory operations.

use std::path::Path;
use std::time::SystemTime;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Modification time, `None` when the file does not exist
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Make a file writable by its owner
///
/// The SDK generators mark their outputs read-only, which breaks the next
/// regeneration.
pub fn clear_readonly(path: &Path) -> Result<(), FilesystemError> {
    let permission_error = |e: std::io::Error| FilesystemError::Permissions {
        path: path.to_path_buf(),
        error: e.to_string(),
    };
    let mut permissions = std::fs::metadata(path)
        .map_err(permission_error)?
        .permissions();
    if !permissions.readonly() {
        return Ok(());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(permissions.mode() | 0o200);
    }
    #[cfg(not(unix))]
    permissions.set_readonly(false);

    std::fs::set_permissions(path, permissions).map_err(permission_error)
}
