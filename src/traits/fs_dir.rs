//! Directory operations of a filesystem handle.

use crate::{BridgeError, FileStatus, FsPath};

/// Directory operations of a filesystem handle.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsDir`.
pub trait FsDir: Send + Sync {
    /// List directory contents.
    ///
    /// Order is backend-defined but stable for an unchanged directory.
    /// Operations that depend on order (such as merging) follow it as given.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotFound`] if the path does not exist
    /// - [`BridgeError::NotADirectory`] if the path is not a directory
    fn list(&self, path: &FsPath) -> Result<Vec<FileStatus>, BridgeError>;

    /// Create a directory and all parent directories.
    ///
    /// Idempotent: succeeds if the directory already exists. Returns
    /// `Ok(false)` when a component exists as a regular file.
    fn mkdirs(&self, path: &FsPath) -> Result<bool, BridgeError>;
}
