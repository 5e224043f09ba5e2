//! Backend identity and path qualification.

use crate::{FsPath, QualifiedPath};

/// Identity of the backend behind a handle.
///
/// Two handles with equal [`backend_id`](Self::backend_id) address the same
/// namespace, so a path written through one is visible through the other.
/// Copy operations rely on this to refuse copying a tree into itself.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsBackend`.
pub trait FsBackend: Send + Sync {
    /// Identifier shared by every handle onto the same backend.
    fn backend_id(&self) -> &str;

    /// Absolute, backend-scoped form of `path`.
    ///
    /// Relative paths are resolved against the handle's working directory.
    fn qualify(&self, path: &FsPath) -> QualifiedPath;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_backend_is_object_safe() {
        fn _check(_: &dyn FsBackend) {}
    }
}
