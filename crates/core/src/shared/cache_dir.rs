use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::constants::{CACHE_DIR_NAME, SHARED_CACHE_DIR_NAME};

/// Cache directory beside the current working directory: `./.subforge-cache`.
pub fn local_cache_dir() -> io::Result<PathBuf> {
    Ok(std::env::current_dir()?.join(CACHE_DIR_NAME))
}

/// Platform-specific per-user cache directory.
///
/// - macOS: `~/Library/Application Support/subforge/`
/// - Linux: `$XDG_CACHE_HOME/subforge/` or `~/.cache/subforge/`
/// - Windows: `%LOCALAPPDATA%/subforge/`
pub fn shared_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir().map(|d| d.join(SHARED_CACHE_DIR_NAME))
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir().map(|d| d.join(SHARED_CACHE_DIR_NAME))
    }
}

/// Create the cache directory hierarchy if absent and mark it hidden.
///
/// On Unix the dot-prefixed name already hides it; on Windows the hidden
/// attribute is set explicitly.
pub fn prepare(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    mark_hidden(dir);
    Ok(())
}

#[cfg(windows)]
fn mark_hidden(dir: &Path) {
    let status = std::process::Command::new("attrib")
        .arg("+h")
        .arg(dir)
        .status();
    match status {
        Ok(s) if s.success() => {}
        Ok(s) => log::warn!("attrib +h {} exited with {s}", dir.display()),
        Err(e) => log::warn!("could not hide {}: {e}", dir.display()),
    }
}

#[cfg(not(windows))]
fn mark_hidden(_dir: &Path) {}
