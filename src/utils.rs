//! Helpers for file naming, log formatting, and output directories.

use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Characters that cannot appear in a file name on common filesystems.
const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Map a title or attachment name to a filesystem-safe file name.
///
/// Every occurrence of `\ / : * ? " < > |` becomes `_`. Nothing else is
/// touched: no truncation, no Unicode normalization, and no collision
/// handling, so two names that differ only in forbidden characters map to
/// the same file and the later write wins.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_filename("a/b:c"), "a_b_c");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.replace(FORBIDDEN_FILENAME_CHARS, "_")
}

/// Truncate a string for logging purposes.
///
/// Cuts on a char boundary at or below `max` bytes and appends the number of
/// bytes dropped.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory (and parents) if needed, then writes and removes a
/// scratch file. Safe to call repeatedly.
///
/// # Arguments
///
/// * `path` - The directory to create and check
///
/// # Returns
///
/// `Ok(())` once the directory exists and accepted a test write.
///
/// # Errors
///
/// Returns the underlying I/O error if:
/// - The directory cannot be created (a file already sits at `path`, missing permissions)
/// - The test file cannot be written or removed
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path).await?;
    let check_path = path.join("..__write_check__");
    fs::write(&check_path, b"").await?;
    let _ = fs::remove_file(&check_path).await;
    info!("Output directory is writable");
    Ok(())
}
