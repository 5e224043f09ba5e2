//! Small helpers around listings and local files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{BridgeError, FileStatus, FsPath};

/// Paths of a listing, in order.
pub fn stat_to_paths(stats: &[FileStatus]) -> Vec<FsPath> {
    stats.iter().map(|s| s.path.clone()).collect()
}

/// Like [`stat_to_paths`], but an absent listing yields `[path]`.
pub fn stat_to_paths_or(stats: Option<&[FileStatus]>, path: &FsPath) -> Vec<FsPath> {
    match stats {
        Some(stats) => stat_to_paths(stats),
        None => vec![path.clone()],
    }
}

/// Entries of the local directory `dir`, sorted by name.
///
/// # Errors
///
/// [`BridgeError::Io`] naming `dir` when it is missing, not a directory or
/// unreadable.
pub fn list_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, BridgeError> {
    let dir = dir.as_ref();
    let invalid = |e: io::Error| BridgeError::Io {
        operation: "list",
        path: dir.display().to_string(),
        source: io::Error::new(
            e.kind(),
            format!("Invalid directory or I/O error occurred for dir: {}", dir.display()),
        ),
    };
    let mut files = fs::read_dir(dir)
        .map_err(invalid)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(invalid)?;
    files.sort();
    Ok(files)
}

/// Names of the entries of the local directory `dir`, sorted.
///
/// # Errors
///
/// Same as [`list_files`].
pub fn list_names(dir: impl AsRef<Path>) -> Result<Vec<String>, BridgeError> {
    Ok(list_files(dir)?
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect())
}

/// Bytes used by the files at or below `path`.
///
/// A file counts its length, a missing path counts 0, and symbolic links
/// below `path` are not followed.
pub fn disk_usage(path: impl AsRef<Path>) -> u64 {
    let path = path.as_ref();
    let Ok(meta) = fs::metadata(path) else {
        return 0;
    };
    if !meta.is_dir() {
        return meta.len();
    }
    let Ok(entries) = fs::read_dir(path) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| !t.is_symlink()))
        .map(|entry| disk_usage(entry.path()))
        .sum()
}

/// Create an empty temporary file beside `basefile`, named
/// `<prefix><basefile name><random>`.
///
/// The file is removed when the handle drops unless
/// [`NamedTempFile::keep`] is called.
///
/// # Errors
///
/// [`BridgeError::InvalidPath`] if `basefile` has no name, otherwise any
/// error creating the file.
pub fn create_local_temp_file(
    basefile: impl AsRef<Path>,
    prefix: &str,
) -> Result<NamedTempFile, BridgeError> {
    let basefile = basefile.as_ref();
    let Some(name) = basefile.file_name() else {
        return Err(BridgeError::InvalidPath {
            path: basefile.display().to_string(),
            reason: "no file name",
        });
    };
    let dir = match basefile.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let stem = format!("{prefix}{}", name.to_string_lossy());
    tempfile::Builder::new()
        .prefix(&stem)
        .tempfile_in(&dir)
        .map_err(|e| BridgeError::io("create_temp", dir.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Permissions;

    fn status(path: &str) -> FileStatus {
        FileStatus {
            path: FsPath::new(path),
            is_dir: false,
            is_file: true,
            len: 0,
            permission: Permissions::default_file(),
        }
    }

    #[test]
    fn stat_paths_keep_order() {
        let stats = [status("/b"), status("/a")];
        assert_eq!(stat_to_paths(&stats), [FsPath::new("/b"), FsPath::new("/a")]);
        assert_eq!(
            stat_to_paths_or(None, &FsPath::new("/x")),
            [FsPath::new("/x")]
        );
        assert_eq!(stat_to_paths_or(Some(&stats[..1]), &FsPath::new("/x")).len(), 1);
    }

    #[test]
    fn list_helpers_sort_and_fail_loudly() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b"), "").unwrap();
        fs::write(dir.path().join("a"), "").unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        assert_eq!(list_names(dir.path()).unwrap(), ["a", "b", "c"]);
        assert_eq!(list_files(dir.path()).unwrap()[0], dir.path().join("a"));

        let err = list_files(dir.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("Invalid directory or I/O error occurred"));
    }

    #[test]
    fn disk_usage_sums_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "12345").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b"), "123").unwrap();

        assert_eq!(disk_usage(dir.path()), 8);
        assert_eq!(disk_usage(dir.path().join("a")), 5);
        assert_eq!(disk_usage(dir.path().join("missing")), 0);
    }

    #[cfg(unix)]
    #[test]
    fn disk_usage_ignores_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("big"), "0123456789").unwrap();
        fs::write(dir.path().join("own"), "12").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        assert_eq!(disk_usage(dir.path()), 2);
    }

    #[test]
    fn temp_file_sits_beside_base_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("report.csv");

        let temp = create_local_temp_file(&base, "tmp-").unwrap();
        let temp_path = temp.path().to_path_buf();
        assert_eq!(temp_path.parent(), Some(dir.path()));
        let name = temp_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("tmp-report.csv"));
        assert!(temp_path.exists());

        drop(temp);
        assert!(!temp_path.exists());
    }
}
