//! Moving files between the desktop and the storage folder

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Pick a destination that does not collide with an existing entry.
///
/// Returns `desired` when it is free, otherwise the first free
/// `stem (n).ext` in the same directory, counting from 1.
pub fn resolve_collision(desired: &Path, exists: impl Fn(&Path) -> bool) -> PathBuf {
    if !exists(desired) {
        return desired.to_path_buf();
    }

    let dir = desired.parent().map(Path::to_path_buf).unwrap_or_default();
    let stem = desired
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    let ext = desired.extension().map(|s| s.to_os_string());

    let mut counter: u32 = 1;
    loop {
        let mut name = OsString::from(&stem);
        name.push(format!(" ({counter})"));
        if let Some(ref ext) = ext {
            name.push(".");
            name.push(ext);
        }

        let candidate = dir.join(name);
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Whether anything already occupies `path`, including dangling links
fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Move `source` to `dest`, renaming around collisions.
///
/// Returns the final destination, or `None` when the source is not a file
/// or the move failed for any reason.
pub fn try_move_file(source: &Path, dest: &Path) -> Option<PathBuf> {
    if !source.is_file() {
        tracing::debug!("Nothing to move at {}", source.display());
        return None;
    }

    let dest = resolve_collision(dest, occupied);

    match fs::rename(source, &dest) {
        Ok(()) => {
            tracing::debug!("Moved {} -> {}", source.display(), dest.display());
            Some(dest)
        }
        Err(rename_err) => match copy_then_remove(source, &dest) {
            Ok(()) => {
                tracing::debug!("Copied {} -> {}", source.display(), dest.display());
                Some(dest)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to move {} -> {}: {} ({})",
                    source.display(),
                    dest.display(),
                    rename_err,
                    e
                );
                None
            }
        },
    }
}

/// Fallback for moves a plain rename can't do, e.g. across volumes
fn copy_then_remove(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Err(e) = fs::copy(source, dest) {
        // Don't leave a truncated copy behind
        let _ = fs::remove_file(dest);
        return Err(e);
    }
    if let Err(e) = fs::remove_file(source) {
        // Leave exactly one copy behind
        let _ = fs::remove_file(dest);
        return Err(e);
    }
    Ok(())
}

/// Basename of a path as an owned string
pub fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|s| s.to_string_lossy().to_string())
}
