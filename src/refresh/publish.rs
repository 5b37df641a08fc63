//! Directory and symlink operations of a refresh cycle.
//!
//! Consumers only ever resolve the stable symlink. It is replaced by renaming a
//! fully prepared staging symlink over it, so a lookup sees either the previous
//! content directory or the new one.
//!
//! A symlink's target is resolved against the symlink's own directory. Content
//! directories next to the symlink are therefore linked by file name, and
//! targets read back are joined onto the symlink's directory.

use crate::constants::{CONFIG_STATUS_FILE, CONTENT_DIR_MODE};
use crate::credentials::write_credential_file;
use crate::error::{FsStep, RefreshError};
use crate::prelude::warn;
use std::fs::{self, DirBuilder};
use std::io::{self, ErrorKind};
use std::os::unix::fs::{symlink, DirBuilderExt};
use std::path::{Path, PathBuf};

/// Creates the cycle's content directory. Fails if it already exists.
pub(super) fn create_content_dir(dir: &Path) -> Result<(), RefreshError> {
    DirBuilder::new()
        .mode(CONTENT_DIR_MODE)
        .create(dir)
        .map_err(|e| RefreshError::fs(FsStep::CreateContentDir, dir, e))
}

pub(super) fn write_config_status(dir: &Path, status: &[u8]) -> Result<(), RefreshError> {
    let path = dir.join(CONFIG_STATUS_FILE);
    write_credential_file(&path, status)
        .map_err(|e| RefreshError::fs(FsStep::WriteConfigStatus, path, e))
}

/// Points `symlink` at `dir` if nothing exists at `symlink` yet.
///
/// Returns `true` if the symlink was created. This is the only non-atomic
/// update of the stable path, and only happens before any consumer can rely on it.
pub(super) fn bootstrap_symlink(symlink_path: &Path, dir: &Path) -> Result<bool, RefreshError> {
    match fs::symlink_metadata(symlink_path) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            link(symlink_path, dir)
                .map_err(|e| RefreshError::fs(FsStep::BootstrapSymlink, symlink_path, e))?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub(super) fn stage_symlink(temp: &Path, dir: &Path) -> Result<(), RefreshError> {
    link(temp, dir).map_err(|e| RefreshError::fs(FsStep::StageSymlink, temp, e))
}

/// Returns the directory `symlink` currently resolves to, or `None` if it cannot be read.
pub(super) fn snapshot_target(symlink_path: &Path) -> Option<PathBuf> {
    match read_target(symlink_path) {
        Ok(target) => Some(target),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(
                "Could not read current target of {}: {e}",
                symlink_path.display()
            );
            None
        }
    }
}

/// Atomically replaces `symlink` with `temp`.
///
/// On failure `temp` is left in place.
pub(super) fn publish(temp: &Path, symlink_path: &Path) -> Result<(), RefreshError> {
    fs::rename(temp, symlink_path).map_err(|e| {
        warn!(
            "Could not rename {} over {}, leaving staging symlink in place",
            temp.display(),
            symlink_path.display()
        );
        RefreshError::fs(FsStep::PublishSymlink, symlink_path, e)
    })
}

/// Removes `previous` if `symlink` no longer points at it.
///
/// Returns the removed directory. If the published symlink cannot be read back,
/// nothing is removed.
pub(super) fn remove_superseded(
    symlink_path: &Path,
    previous: Option<PathBuf>,
) -> Result<Option<PathBuf>, RefreshError> {
    let current = read_target(symlink_path)
        .map_err(|e| RefreshError::fs(FsStep::ReadPublishedSymlink, symlink_path, e))?;

    let Some(previous) = previous.filter(|p| *p != current) else {
        return Ok(None);
    };

    match fs::remove_dir_all(&previous) {
        Ok(()) => Ok(Some(previous)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RefreshError::fs(FsStep::RemoveSuperseded, previous, e)),
    }
}

/// Creates a symlink at `at` that resolves to `dir` regardless of the working directory.
fn link(at: &Path, dir: &Path) -> io::Result<()> {
    symlink(link_target(at, dir)?, at)
}

fn link_target(at: &Path, dir: &Path) -> io::Result<PathBuf> {
    match dir.file_name() {
        Some(name) if at.parent() == dir.parent() => Ok(PathBuf::from(name)),
        _ if dir.is_absolute() => Ok(dir.to_path_buf()),
        _ => Ok(std::env::current_dir()?.join(dir)),
    }
}

/// Reads `symlink_path` and resolves a relative target against its directory.
fn read_target(symlink_path: &Path) -> io::Result<PathBuf> {
    let target = fs::read_link(symlink_path)?;
    match symlink_path.parent() {
        Some(parent) if target.is_relative() => Ok(parent.join(target)),
        _ => Ok(target),
    }
}
