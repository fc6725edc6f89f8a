use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `contents` to `path` atomically.
///
/// The text goes to a temporary file in the destination directory which is
/// renamed over `path` only once fully written, so a failed or interrupted
/// write never leaves a truncated subtitle file. An existing file keeps its
/// permissions; a new one is created world-readable. Returns the bytes written.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<u64> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    if let Some(permissions) = output_permissions(path) {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.persist(path).map_err(|e| e.error)?;
    Ok(contents.len() as u64)
}

// Temp files are created 0600; subtitles are read by players running as other users.
#[cfg(unix)]
fn output_permissions(path: &Path) -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;

    match fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(_) => Some(fs::Permissions::from_mode(0o644)),
    }
}

#[cfg(not(unix))]
fn output_permissions(path: &Path) -> Option<fs::Permissions> {
    fs::metadata(path).ok().map(|existing| existing.permissions())
}
