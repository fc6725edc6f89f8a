use std::fs;
use std::io::{self, Read, Seek, Write};
use std::path::Path;

use zip::ZipArchive;

use crate::provisioning::domain::acquisition_error::AcquisitionError;

/// Extract the file named `entry_name` (at any depth) from a zip archive to
/// `dest`, marking it executable on Unix.
///
/// The entry is written to a `.part` sibling and renamed into place, so a
/// failed extraction never leaves a truncated executable behind.
pub(crate) fn unpack_executable<R: Read + Seek>(
    archive: R,
    entry_name: &str,
    dest: &Path,
    target: &str,
) -> Result<(), AcquisitionError> {
    let mut zip = ZipArchive::new(archive).map_err(|e| AcquisitionError::Archive {
        target: target.to_string(),
        source: e,
    })?;

    let name = zip
        .file_names()
        .find(|n| !n.ends_with('/') && base_name(n) == entry_name)
        .map(str::to_owned)
        .ok_or_else(|| AcquisitionError::MissingEntry {
            target: target.to_string(),
            entry: entry_name.to_string(),
        })?;

    let mut entry = zip.by_name(&name).map_err(|e| AcquisitionError::Archive {
        target: target.to_string(),
        source: e,
    })?;

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| entry_name.to_string());
    let staging = dest.with_file_name(format!("{file_name}.part"));

    let result = write_executable(&mut entry, &staging).and_then(|()| fs::rename(&staging, dest));
    if let Err(e) = result {
        let _ = fs::remove_file(&staging);
        return Err(AcquisitionError::write(dest, e));
    }
    Ok(())
}

fn write_executable(entry: &mut impl Read, path: &Path) -> io::Result<()> {
    let mut out = fs::File::create(path)?;
    io::copy(entry, &mut out)?;
    out.flush()?;
    drop(out);
    make_executable(path)
}

fn base_name(entry: &str) -> &str {
    entry.rsplit(['/', '\\']).next().unwrap_or(entry)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
