//! # Extension Traits
//!
//! [`FsHandleExt`] adds the `is_file` / `is_dir` probes on top of
//! [`FsRead::stat`](crate::FsRead::stat). They are default methods with a
//! blanket implementation, so every handle (including `dyn FsHandle`) gets
//! them for free.

use crate::{BridgeError, FsHandle, FsPath};

/// Extension methods for any filesystem handle.
///
/// # Example
///
/// ```rust
/// use fsbridge::{BridgeError, FsHandle, FsHandleExt, FsPath};
///
/// fn ensure_dir(fs: &dyn FsHandle, path: &FsPath) -> Result<(), BridgeError> {
///     if !fs.is_dir(path)? {
///         fs.mkdirs(path)?;
///     }
///     Ok(())
/// }
/// ```
pub trait FsHandleExt: FsHandle {
    /// Check if the path points to a regular file.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    /// Returns `Err` only for actual I/O errors (permission denied, etc.).
    fn is_file(&self, path: &FsPath) -> Result<bool, BridgeError> {
        match self.stat(path) {
            Ok(s) => Ok(s.is_file),
            Err(BridgeError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if the path points to a directory.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    /// Returns `Err` only for actual I/O errors (permission denied, etc.).
    fn is_dir(&self, path: &FsPath) -> Result<bool, BridgeError> {
        match self.stat(path) {
            Ok(s) => Ok(s.is_dir),
            Err(BridgeError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

// Blanket implementation - any handle gets FsHandleExt for free
impl<B: FsHandle + ?Sized> FsHandleExt for B {}
