//! Core value types: permission bits and file status snapshots.

use std::fmt;

use crate::FsPath;

/// A subset of `{read, write, execute}` for one permission class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FsAction(u8);

impl FsAction {
    /// No access.
    pub const NONE: Self = Self(0);
    /// Execute only.
    pub const EXECUTE: Self = Self(0o1);
    /// Write only.
    pub const WRITE: Self = Self(0o2);
    /// Read only.
    pub const READ: Self = Self(0o4);
    /// Read and execute.
    pub const READ_EXECUTE: Self = Self(0o5);
    /// Read and write.
    pub const READ_WRITE: Self = Self(0o6);
    /// Read, write and execute.
    pub const ALL: Self = Self(0o7);

    /// Build from the low three bits of `bits`.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0o7)
    }

    /// The raw `rwx` bits.
    #[inline]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `other` is granted here.
    #[inline]
    pub const fn implies(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of both sets.
    #[inline]
    pub const fn or(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl fmt::Display for FsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.implies(Self::READ) { 'r' } else { '-' };
        let w = if self.implies(Self::WRITE) { 'w' } else { '-' };
        let x = if self.implies(Self::EXECUTE) { 'x' } else { '-' };
        write!(f, "{r}{w}{x}")
    }
}

/// Owner, group and other access sets.
///
/// Only the nine `rwx` bits exist; anything not granted is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions {
    /// Owner access.
    pub user: FsAction,
    /// Group access.
    pub group: FsAction,
    /// Access for everyone else.
    pub other: FsAction,
}

impl Permissions {
    /// Build from the three access sets.
    #[inline]
    pub const fn new(user: FsAction, group: FsAction, other: FsAction) -> Self {
        Self { user, group, other }
    }

    /// Create permissions from a Unix mode (e.g., 0o755). Bits above `0o777` are dropped.
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self {
            user: FsAction::from_bits(((mode >> 6) & 0o7) as u8),
            group: FsAction::from_bits(((mode >> 3) & 0o7) as u8),
            other: FsAction::from_bits((mode & 0o7) as u8),
        }
    }

    /// Get the numeric mode value.
    #[inline]
    pub const fn mode(&self) -> u32 {
        ((self.user.bits() as u32) << 6)
            | ((self.group.bits() as u32) << 3)
            | self.other.bits() as u32
    }

    /// Zero-padded four digit octal form, as passed to `chmod` (`0755`).
    pub fn octal(&self) -> String {
        format!("{:04o}", self.mode())
    }

    /// Default permissions for a new file (0o644 = rw-r--r--).
    #[inline]
    pub const fn default_file() -> Self {
        Self::from_mode(0o644)
    }

    /// Default permissions for a new directory (0o755 = rwxr-xr-x).
    #[inline]
    pub const fn default_dir() -> Self {
        Self::from_mode(0o755)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::default_file()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.user, self.group, self.other)
    }
}

/// Snapshot of one entry as reported by a handle's `stat` or `list`.
///
/// No lock is held; the entry may change the moment after it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileStatus {
    /// Location of the entry within its handle.
    pub path: FsPath,
    /// `true` for directories.
    pub is_dir: bool,
    /// `true` for regular files. Both flags are `false` for special entries
    /// such as devices, FIFOs and sockets.
    pub is_file: bool,
    /// Length in bytes (0 for directories).
    pub len: u64,
    /// Permission bits.
    pub permission: Permissions,
}

impl FileStatus {
    /// Base name of the entry, empty for a root.
    pub fn name(&self) -> &str {
        self.path.name().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_from_mode() {
        let p = Permissions::from_mode(0o754);
        assert_eq!(p.user, FsAction::ALL);
        assert_eq!(p.group, FsAction::READ_EXECUTE);
        assert_eq!(p.other, FsAction::READ);
        assert_eq!(p.mode(), 0o754);
    }

    #[test]
    fn permissions_from_mode_masks_extra_bits() {
        let p = Permissions::from_mode(0o104755);
        assert_eq!(p.mode(), 0o755);
    }

    #[test]
    fn permissions_octal_is_zero_padded() {
        assert_eq!(Permissions::from_mode(0o755).octal(), "0755");
        assert_eq!(Permissions::from_mode(0o7).octal(), "0007");
    }

    #[test]
    fn permissions_display_is_symbolic() {
        assert_eq!(Permissions::from_mode(0o750).to_string(), "rwxr-x---");
    }

    #[test]
    fn permissions_defaults() {
        assert_eq!(Permissions::default_file().mode(), 0o644);
        assert_eq!(Permissions::default_dir().mode(), 0o755);
    }

    #[test]
    fn action_implies() {
        assert!(FsAction::ALL.implies(FsAction::READ_WRITE));
        assert!(FsAction::READ.implies(FsAction::NONE));
        assert!(!FsAction::READ.implies(FsAction::WRITE));
        assert_eq!(FsAction::READ.or(FsAction::EXECUTE), FsAction::READ_EXECUTE);
    }

    #[test]
    fn file_status_name_uses_last_component() {
        let status = FileStatus {
            path: FsPath::new("/data/part-0000"),
            is_dir: false,
            is_file: true,
            len: 3,
            permission: Permissions::default_file(),
        };
        assert_eq!(status.name(), "part-0000");
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FsAction>();
        assert_send_sync::<Permissions>();
        assert_send_sync::<FileStatus>();
    }
}
