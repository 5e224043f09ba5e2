//! # Handle Traits
//!
//! The capability interface every storage backend implements. Copy, delete
//! and replace operations only ever talk to a backend through these traits,
//! so the same algorithm moves data local-to-local, local-to-remote,
//! remote-to-local or remote-to-remote.
//!
//! ## Components
//!
//! | Trait | Methods |
//! |-------|---------|
//! | [`FsRead`] | `exists`, `stat`, `open` |
//! | [`FsWrite`] | `create`, `delete`, `rename` |
//! | [`FsDir`] | `list`, `mkdirs` |
//! | [`FsBackend`] | `backend_id`, `qualify` |
//!
//! [`FsHandle`] is the composite of all four and has a blanket
//! implementation: implement the components and the composite comes free.
//!
//! ## Object Safety
//!
//! All traits are object-safe:
//!
//! ```rust
//! use fsbridge::{BridgeError, FsHandle, FsPath};
//!
//! fn count_files(fs: &dyn FsHandle, dir: &FsPath) -> Result<usize, BridgeError> {
//!     Ok(fs.list(dir)?.iter().filter(|s| s.is_file).count())
//! }
//! ```

mod fs_backend;
mod fs_dir;
mod fs_read;
mod fs_write;

pub use fs_backend::FsBackend;
pub use fs_dir::FsDir;
pub use fs_read::FsRead;
pub use fs_write::FsWrite;

/// A bound reference to one filesystem backend.
///
/// Combines reading ([`FsRead`]), writing ([`FsWrite`]), directory
/// operations ([`FsDir`]) and backend identity ([`FsBackend`]).
///
/// # Blanket Implementation
///
/// Automatically implemented for any type that implements all four
/// component traits. You never need to implement `FsHandle` directly.
///
/// # Example
///
/// ```rust
/// use fsbridge::{BridgeError, FsHandle, FsPath};
/// use std::io::Read;
///
/// fn read_all(fs: &dyn FsHandle, path: &FsPath) -> Result<Vec<u8>, BridgeError> {
///     let mut buf = Vec::new();
///     fs.open(path)?
///         .read_to_end(&mut buf)
///         .map_err(|e| BridgeError::io("read", path, e))?;
///     Ok(buf)
/// }
/// ```
pub trait FsHandle: FsRead + FsWrite + FsDir + FsBackend {}

// Blanket implementation - any type implementing all four gets FsHandle for free
impl<T: FsRead + FsWrite + FsDir + FsBackend> FsHandle for T {}

/// Returns `true` when both handles address the same backend.
pub fn same_backend<S, D>(src: &S, dst: &D) -> bool
where
    S: FsBackend + ?Sized,
    D: FsBackend + ?Sized,
{
    src.backend_id() == dst.backend_id()
}
