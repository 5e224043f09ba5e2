//! # Recursive Deleter
//!
//! Best-effort removal of a directory tree. A failed entry does not stop
//! the walk; the remaining siblings are still removed and the failure shows
//! up in the returned flag.

use crate::{FsHandle, FsHandleExt, FsPath};

/// Delete `root` and everything below it.
///
/// Returns `true` only if every entry and `root` itself are gone. Never
/// fails: errors from the handle count as an entry that could not be
/// deleted.
pub fn delete_tree<F>(fs: &F, root: &FsPath) -> bool
where
    F: FsHandle + ?Sized,
{
    if !delete_contents(fs, root) {
        return false;
    }
    delete_entry(fs, root)
}

/// Delete everything below `dir`, keeping `dir` itself.
///
/// An unlistable or missing `dir` has no contents and yields `true`.
pub fn delete_contents<F>(fs: &F, dir: &FsPath) -> bool
where
    F: FsHandle + ?Sized,
{
    if !fs.is_dir(dir).unwrap_or(false) {
        return true;
    }
    let entries = match fs.list(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %dir, error = %e, "listing failed; treating as empty");
            return true;
        }
    };

    let mut succeeded = true;
    for entry in entries {
        if !entry.is_dir {
            succeeded &= delete_entry(fs, &entry.path);
            continue;
        }
        // Empty directories go in one call; only full ones are walked.
        if delete_entry(fs, &entry.path) {
            continue;
        }
        succeeded &= delete_tree(fs, &entry.path);
    }
    succeeded
}

/// Non-recursive delete that counts an already-missing entry as deleted.
fn delete_entry<F>(fs: &F, path: &FsPath) -> bool
where
    F: FsHandle + ?Sized,
{
    match fs.delete(path, false) {
        Ok(true) => return true,
        Ok(false) => {}
        Err(e) => tracing::trace!(path = %path, error = %e, "direct delete refused"),
    }
    let still_there = fs.exists(path).unwrap_or(true);
    if still_there {
        tracing::debug!(path = %path, "failed to delete; it still exists");
    }
    !still_there
}
