//! Read side of a filesystem handle.

use std::io::Read;

use crate::{BridgeError, FileStatus, FsPath};

/// Read operations of a filesystem handle.
///
/// All methods use `&self`; backends manage their own synchronization.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsRead`.
pub trait FsRead: Send + Sync {
    /// Check if a path exists.
    ///
    /// Returns `Ok(false)` for a missing path. Only unexpected failures are errors.
    fn exists(&self, path: &FsPath) -> Result<bool, BridgeError>;

    /// Status snapshot for a path (follows symlinks).
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotFound`] if the path does not exist
    fn stat(&self, path: &FsPath) -> Result<FileStatus, BridgeError>;

    /// Open a file for streaming reads.
    ///
    /// The stream is closed when the returned box is dropped.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotFound`] if the path does not exist
    fn open(&self, path: &FsPath) -> Result<Box<dyn Read + Send>, BridgeError>;
}
