//! Write side of a filesystem handle.

use std::io::Write;

use crate::{BridgeError, FsPath};

/// Write operations of a filesystem handle.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsWrite`.
pub trait FsWrite: Send + Sync {
    /// Create a file for streaming writes, creating missing parent directories.
    ///
    /// Callers should `flush` before dropping the stream so that write
    /// failures are observed; dropping closes it.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::AlreadyExists`] if the path names a directory, or a
    ///   file exists and `overwrite` is `false`
    /// - an error if a parent component is a regular file
    fn create(&self, path: &FsPath, overwrite: bool) -> Result<Box<dyn Write + Send>, BridgeError>;

    /// Delete a file or directory.
    ///
    /// A non-recursive delete of a non-empty directory fails. Returns
    /// `Ok(false)` when nothing was deleted (e.g. the path is absent).
    fn delete(&self, path: &FsPath, recursive: bool) -> Result<bool, BridgeError>;

    /// Rename `from` to `to`.
    ///
    /// Returns `Ok(false)` when the backend refused the rename, for example
    /// because `to` exists on a backend without replace-on-rename semantics.
    fn rename(&self, from: &FsPath, to: &FsPath) -> Result<bool, BridgeError>;
}
