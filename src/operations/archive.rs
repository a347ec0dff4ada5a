// Archive Handling
// ZIP extraction, staging of supplied archives and archive backup

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::core::error::{IoResultExt, SyncError};
use crate::utilities::{has_extension, PatternMatcher};

/// Extract a ZIP archive into `dest`, skipping entries matched by `excludes`
/// Returns the number of files written
pub fn extract_archive(
    archive_path: &Path,
    dest: &Path,
    excludes: &PatternMatcher,
) -> Result<usize, SyncError> {
    let corrupt = |reason: String| SyncError::CorruptArchive {
        path: archive_path.to_path_buf(),
        reason,
    };

    let file = File::open(archive_path).at(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| corrupt(e.to_string()))?;

    fs::create_dir_all(dest).at(dest)?;

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| corrupt(e.to_string()))?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(name = entry.name(), "skipping archive entry outside the extraction root");
            continue;
        };
        if excludes.should_exclude(&relative) {
            continue;
        }
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).at(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).at(parent)?;
        }

        let mut out = File::create(&out_path).at(&out_path)?;
        io::copy(&mut entry, &mut out).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                corrupt(format!("{}: {}", entry.name(), e))
            }
            _ => SyncError::io(&out_path, e),
        })?;

        if let Some(mode) = entry.unix_mode() {
            apply_mode(&out_path, mode)?;
        }

        written += 1;
    }

    debug!(archive = %archive_path.display(), files = written, "extracted archive");
    Ok(written)
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> Result<(), SyncError> {
    use std::os::unix::fs::PermissionsExt;

    let mode = mode & 0o777;
    if mode == 0 {
        return Ok(());
    }
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).at(path)
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: u32) -> Result<(), SyncError> {
    Ok(())
}

/// Hoist the contents of a lone top-level directory into `dir`
/// Returns true when something was hoisted
pub fn flatten_single_root(dir: &Path) -> Result<bool, SyncError> {
    let entries: Vec<PathBuf> = fs::read_dir(dir)
        .at(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();

    let [only] = entries.as_slice() else {
        return Ok(false);
    };
    if !only.is_dir() {
        return Ok(false);
    }

    // Move aside first so a child sharing the root's name cannot collide
    let holding = dir.join(".flatten-holding");
    fs::rename(only, &holding).at(only)?;

    for child in fs::read_dir(&holding).at(&holding)? {
        let child = child.at(&holding)?.path();
        if let Some(name) = child.file_name() {
            let target = dir.join(name);
            fs::rename(&child, &target).at(&target)?;
        }
    }
    fs::remove_dir(&holding).at(&holding)?;

    debug!(dir = %dir.display(), "flattened single top-level directory");
    Ok(true)
}

/// Copy a supplied archive to the fixed temporary path
pub fn stage_supplied_archive(source: &Path, temp_path: &Path) -> Result<(), SyncError> {
    if !source.is_file() {
        return Err(SyncError::NoFileSupplied);
    }
    // Copying a file onto itself truncates it
    if same_file(source, temp_path) {
        debug!(path = %temp_path.display(), "supplied archive already at the temporary path");
        return Ok(());
    }
    if let Some(parent) = temp_path.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    fs::copy(source, temp_path).at(temp_path)?;
    Ok(())
}

/// Whether two paths name the same existing file, however they are spelled
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Store `archive` as the single snapshot in `archives_dir`
/// Any previous archive with the same extension is removed
pub fn backup_archive(
    archive: &Path,
    archives_dir: &Path,
    file_name: &str,
    extension: &str,
) -> Result<PathBuf, SyncError> {
    fs::create_dir_all(archives_dir).at(archives_dir)?;

    let staged = archives_dir.join(format!(".{}{}", file_name, crate::constants::STAGING_SUFFIX));
    fs::copy(archive, &staged).at(&staged)?;

    for entry in fs::read_dir(archives_dir).at(archives_dir)? {
        let path = entry.at(archives_dir)?.path();
        if path.is_file() && path != staged && has_extension(&path, extension) {
            fs::remove_file(&path).at(&path)?;
        }
    }

    let target = archives_dir.join(file_name);
    fs::rename(&staged, &target).at(&target)?;
    Ok(target)
}
