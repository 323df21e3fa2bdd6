// Uploaded-file handling: acceptance checks and scoped removal

use std::path::{Path, PathBuf};

use crate::sheet::extension_of;

/// Extensions accepted for uploads.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

/// Owns a temporary upload and deletes it when dropped.
///
/// Holding the guard across processing removes the file on every exit path,
/// including early returns and panics that unwind.
#[derive(Debug)]
pub struct UploadGuard {
    path: PathBuf,
}

impl UploadGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("removed upload {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("could not remove upload {}: {}", self.path.display(), e),
        }
    }
}

/// Reject uploads with a disallowed extension or above `max_bytes`.
pub fn check_upload(path: &Path, max_bytes: u64) -> Result<(), String> {
    let ext = extension_of(path).unwrap_or_default();
    if !ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()) {
        return Err(format!(
            "only {} files can be uploaded",
            ALLOWED_UPLOAD_EXTENSIONS
                .iter()
                .map(|e| format!(".{e}"))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let size = std::fs::metadata(path).map_err(|e| e.to_string())?.len();
    if size > max_bytes {
        return Err(format!("upload is {size} bytes; limit is {max_bytes}"));
    }
    Ok(())
}
