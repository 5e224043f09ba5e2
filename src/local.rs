//! Local-disk handle backed by `std::fs`.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::{
    BridgeError, FileStatus, FsBackend, FsDir, FsPath, FsRead, FsWrite, Permissions,
    QualifiedPath,
};

/// Backend id shared by every [`LocalFs`]: all of them address the same disk.
pub const LOCAL_BACKEND_ID: &str = "file";

/// Handle onto the local filesystem.
///
/// Relative [`FsPath`]s resolve against the handle's working directory.
/// Listings are sorted by name so that order-sensitive operations such as
/// merging are deterministic.
#[derive(Debug, Clone)]
pub struct LocalFs {
    working_dir: PathBuf,
}

impl LocalFs {
    /// Handle rooted at the process working directory.
    pub fn new() -> Result<Self, BridgeError> {
        let working_dir =
            std::env::current_dir().map_err(|e| BridgeError::io("current_dir", ".", e))?;
        Ok(Self { working_dir })
    }

    /// Handle whose relative paths resolve against `dir`.
    pub fn with_working_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: dir.into(),
        }
    }

    /// The directory relative paths resolve against.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Native path for `path`.
    pub fn to_local(&self, path: &FsPath) -> PathBuf {
        if path.is_absolute() {
            PathBuf::from(path.as_str())
        } else {
            self.working_dir.join(path.as_str())
        }
    }

    fn status(&self, path: &FsPath, meta: &fs::Metadata) -> FileStatus {
        FileStatus {
            path: path.clone(),
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            len: if meta.is_file() { meta.len() } else { 0 },
            permission: permissions_of(meta),
        }
    }
}

#[cfg(unix)]
fn permissions_of(meta: &fs::Metadata) -> Permissions {
    use std::os::unix::fs::PermissionsExt;
    Permissions::from_mode(meta.permissions().mode())
}

#[cfg(not(unix))]
fn permissions_of(meta: &fs::Metadata) -> Permissions {
    let base = if meta.is_dir() { 0o755 } else { 0o644 };
    if meta.permissions().readonly() {
        Permissions::from_mode(base & !0o222)
    } else {
        Permissions::from_mode(base)
    }
}

impl FsRead for LocalFs {
    fn exists(&self, path: &FsPath) -> Result<bool, BridgeError> {
        match fs::metadata(self.to_local(path)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BridgeError::io("exists", path, e)),
        }
    }

    fn stat(&self, path: &FsPath) -> Result<FileStatus, BridgeError> {
        let meta = fs::metadata(self.to_local(path)).map_err(|e| BridgeError::io("stat", path, e))?;
        Ok(self.status(path, &meta))
    }

    fn open(&self, path: &FsPath) -> Result<Box<dyn Read + Send>, BridgeError> {
        let file = fs::File::open(self.to_local(path)).map_err(|e| BridgeError::io("open", path, e))?;
        Ok(Box::new(file))
    }
}

impl FsWrite for LocalFs {
    fn create(&self, path: &FsPath, overwrite: bool) -> Result<Box<dyn Write + Send>, BridgeError> {
        let local = self.to_local(path);
        if local.is_dir() {
            return Err(BridgeError::AlreadyExists {
                path: path.to_string(),
                operation: "create",
            });
        }
        if let Some(parent) = local.parent() {
            fs::create_dir_all(parent).map_err(|e| BridgeError::io("create", path, e))?;
        }
        let mut options = fs::OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let file = options
            .open(&local)
            .map_err(|e| BridgeError::io("create", path, e))?;
        Ok(Box::new(file))
    }

    fn delete(&self, path: &FsPath, recursive: bool) -> Result<bool, BridgeError> {
        let local = self.to_local(path);
        let meta = match fs::symlink_metadata(&local) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(BridgeError::io("delete", path, e)),
        };
        let result = if !meta.is_dir() {
            fs::remove_file(&local)
        } else if recursive {
            fs::remove_dir_all(&local)
        } else {
            fs::remove_dir(&local)
        };
        result.map_err(|e| BridgeError::io("delete", path, e))?;
        Ok(true)
    }

    fn rename(&self, from: &FsPath, to: &FsPath) -> Result<bool, BridgeError> {
        match fs::rename(self.to_local(from), self.to_local(to)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BridgeError::NotFound {
                path: from.to_string(),
            }),
            Err(e) => {
                tracing::debug!(from = %from, to = %to, error = %e, "rename refused");
                Ok(false)
            }
        }
    }
}

impl FsDir for LocalFs {
    fn list(&self, path: &FsPath) -> Result<Vec<FileStatus>, BridgeError> {
        let local = self.to_local(path);
        let entries = fs::read_dir(&local).map_err(|e| {
            if local.is_file() {
                BridgeError::NotADirectory {
                    path: path.to_string(),
                }
            } else {
                BridgeError::io("list", path, e)
            }
        })?;
        let mut statuses = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BridgeError::io("list", path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let child = path.join(&name);
            // Dangling symlinks have no target metadata; describe the link itself.
            let meta = match fs::metadata(entry.path()) {
                Ok(meta) => meta,
                Err(_) => entry
                    .metadata()
                    .map_err(|e| BridgeError::io("list", &child, e))?,
            };
            statuses.push(self.status(&child, &meta));
        }
        statuses.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(statuses)
    }

    fn mkdirs(&self, path: &FsPath) -> Result<bool, BridgeError> {
        let local = self.to_local(path);
        match fs::create_dir_all(&local) {
            Ok(()) => Ok(true),
            Err(_) if local.is_dir() => Ok(true),
            Err(e) => {
                if local.ancestors().any(Path::is_file) {
                    Ok(false)
                } else {
                    Err(BridgeError::io("mkdirs", path, e))
                }
            }
        }
    }
}

impl FsBackend for LocalFs {
    fn backend_id(&self) -> &str {
        LOCAL_BACKEND_ID
    }

    fn qualify(&self, path: &FsPath) -> QualifiedPath {
        let absolute = if path.is_absolute() {
            path.clone()
        } else {
            FsPath::from_local(&self.working_dir).join(path.as_str())
        };
        QualifiedPath::new("file", "", &absolute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FsHandleExt;

    fn scratch() -> (tempfile::TempDir, LocalFs) {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFs::with_working_dir(dir.path());
        (dir, fs)
    }

    fn write(fs: &LocalFs, path: &str, data: &[u8]) {
        let mut out = fs.create(&FsPath::new(path), true).unwrap();
        out.write_all(data).unwrap();
        out.flush().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn device_is_neither_file_nor_dir() {
        let fs = LocalFs::with_working_dir("/");
        let status = fs.stat(&FsPath::new("/dev/null")).unwrap();
        assert!(!status.is_file);
        assert!(!status.is_dir);
        assert_eq!(status.len, 0);
        assert!(!fs.is_file(&FsPath::new("/dev/null")).unwrap());
    }

    #[test]
    fn create_makes_parents_and_respects_overwrite() {
        let (_dir, fs) = scratch();
        write(&fs, "a/b/c.txt", b"one");
        assert!(fs.is_file(&FsPath::new("a/b/c.txt")).unwrap());

        let again = fs.create(&FsPath::new("a/b/c.txt"), false);
        assert!(matches!(again, Err(BridgeError::AlreadyExists { .. })));

        write(&fs, "a/b/c.txt", b"two");
        let mut buf = String::new();
        fs.open(&FsPath::new("a/b/c.txt"))
            .unwrap()
            .read_to_string(&mut buf)
            .unwrap();
        assert_eq!(buf, "two");
    }

    #[test]
    fn list_is_sorted_and_typed() {
        let (_dir, fs) = scratch();
        write(&fs, "d/zeta", b"z");
        write(&fs, "d/alpha", b"aa");
        fs.mkdirs(&FsPath::new("d/mid")).unwrap();

        let listing = fs.list(&FsPath::new("d")).unwrap();
        let names: Vec<_> = listing.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
        assert!(listing[1].is_dir);
        assert_eq!(listing[0].len, 2);
        assert_eq!(listing[0].path, FsPath::new("d/alpha"));
    }

    #[test]
    fn list_missing_is_not_found() {
        let (_dir, fs) = scratch();
        let result = fs.list(&FsPath::new("nope"));
        assert!(matches!(result, Err(BridgeError::NotFound { .. })));
    }

    #[test]
    fn delete_non_recursive_refuses_full_directory() {
        let (_dir, fs) = scratch();
        write(&fs, "d/f", b"x");
        assert!(fs.delete(&FsPath::new("d"), false).is_err());
        assert!(fs.delete(&FsPath::new("d"), true).unwrap());
        assert!(!fs.delete(&FsPath::new("d"), true).unwrap());
    }

    #[test]
    fn mkdirs_under_file_returns_false() {
        let (_dir, fs) = scratch();
        write(&fs, "f", b"x");
        assert!(!fs.mkdirs(&FsPath::new("f/sub")).unwrap());
        assert!(fs.mkdirs(&FsPath::new("g/sub")).unwrap());
        assert!(fs.mkdirs(&FsPath::new("g/sub")).unwrap());
    }

    #[test]
    fn qualify_resolves_against_working_dir() {
        let fs = LocalFs::with_working_dir("/work");
        assert_eq!(fs.qualify(&FsPath::new("x/../y")).as_str(), "file:///work/y");
        assert_eq!(fs.qualify(&FsPath::new("/abs")).as_str(), "file:///abs");
    }

    #[test]
    fn all_local_handles_share_one_backend() {
        let a = LocalFs::with_working_dir("/a");
        let b = LocalFs::with_working_dir("/b");
        assert!(crate::same_backend(&a, &b));
    }
}
