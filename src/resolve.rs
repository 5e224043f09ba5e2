//! Destination resolution for copy operations.

use crate::{BridgeError, FsHandle, FsHandleExt, FsPath};

/// Compute where a copy of an entry named `src_name` should land.
///
/// - `dst` is the empty path: the entry lands at `src_name` itself.
/// - `dst` is an existing directory: the entry goes inside it, as
///   `dst/src_name`, which is resolved again without a name.
/// - `dst` is an existing file: returned when `overwrite` is set.
/// - otherwise `dst` is returned unchanged.
///
/// # Errors
///
/// - [`BridgeError::DestinationIsDirectoryWithoutName`] when `dst` is a
///   directory and there is no name to append
/// - [`BridgeError::DestinationExists`] when `dst` is a file and
///   `overwrite` is `false`
/// - [`BridgeError::InvalidPath`] when `dst` is empty and there is no name
///
/// # Example
///
/// ```rust
/// use fsbridge::{resolve_destination, FsDir, FsPath, MemoryFs};
///
/// let fs = MemoryFs::new();
/// fs.mkdirs(&FsPath::new("/out"))?;
/// let target = resolve_destination(Some("a.txt"), &fs, &FsPath::new("/out"), false)?;
/// assert_eq!(target, FsPath::new("/out/a.txt"));
/// # Ok::<(), fsbridge::BridgeError>(())
/// ```
pub fn resolve_destination<D>(
    src_name: Option<&str>,
    dst_fs: &D,
    dst: &FsPath,
    overwrite: bool,
) -> Result<FsPath, BridgeError>
where
    D: FsHandle + ?Sized,
{
    // The empty path names no entry, even on handles that would read it as
    // their working directory.
    if dst.is_empty() {
        let Some(name) = src_name else {
            return Err(BridgeError::InvalidPath {
                path: String::new(),
                reason: "empty destination and no source name",
            });
        };
        return resolve_destination(None, dst_fs, &FsPath::new(name), overwrite);
    }
    if dst_fs.exists(dst)? {
        if dst_fs.is_dir(dst)? {
            let Some(name) = src_name else {
                return Err(BridgeError::DestinationIsDirectoryWithoutName {
                    path: dst.to_string(),
                });
            };
            return resolve_destination(None, dst_fs, &dst.join(name), overwrite);
        }
        if !overwrite {
            return Err(BridgeError::DestinationExists {
                path: dst.to_string(),
            });
        }
    }
    Ok(dst.clone())
}
