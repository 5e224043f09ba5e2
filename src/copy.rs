//! # Recursive Tree Copier
//!
//! Copies files and directory trees between any two handles: local to
//! remote, remote to local, or within one backend. Three entry points:
//!
//! - [`copy`]: one source, file or directory
//! - [`copy_all`]: many sources into one directory, failures aggregated
//! - [`copy_merge`]: every file of a directory concatenated into one file

use std::io::{self, Write};

use crate::{
    BridgeError, FsHandle, FsHandleExt, FsPath, QualifiedPath, resolve_destination, same_backend,
};

/// Copy `src` on `src_fs` to `dst` on `dst_fs`.
///
/// `dst` is first resolved by [`resolve_destination`], so copying into an
/// existing directory places the source inside it. Directories are copied
/// depth-first; a failure anywhere in the tree fails the whole call.
///
/// With `delete_source`, the source is removed recursively after the copy
/// and the return value is the result of that removal. Without it the
/// return value is `false` only when a destination directory could not be
/// created.
///
/// # Errors
///
/// - [`BridgeError::SelfCopy`] when both handles share a backend and the
///   destination is the source or lies below it; nothing is modified
/// - [`BridgeError::SourceMissing`] when `src` is neither file nor directory
/// - any resolution or I/O error from either handle
///
/// # Example
///
/// ```rust
/// use fsbridge::{copy, FsPath, MemoryFs};
///
/// let local = MemoryFs::new();
/// let remote = MemoryFs::new();
/// local.put("/data/part-0", "rows")?;
///
/// assert!(copy(&local, &FsPath::new("/data"), &remote, &FsPath::new("/backup"), false, false)?);
/// assert_eq!(remote.contents("/backup/part-0")?, b"rows");
/// # Ok::<(), fsbridge::BridgeError>(())
/// ```
pub fn copy<S, D>(
    src_fs: &S,
    src: &FsPath,
    dst_fs: &D,
    dst: &FsPath,
    delete_source: bool,
    overwrite: bool,
) -> Result<bool, BridgeError>
where
    S: FsHandle + ?Sized,
    D: FsHandle + ?Sized,
{
    let dst = resolve_destination(src.name(), dst_fs, dst, overwrite)?;
    check_not_self(src_fs, src, dst_fs, &dst)?;
    tracing::trace!(src = %src, dst = %dst, "copy");

    if src_fs.is_dir(src)? {
        if !dst_fs.mkdirs(&dst)? {
            return Ok(false);
        }
        for entry in src_fs.list(src)? {
            copy(
                src_fs,
                &entry.path,
                dst_fs,
                &dst.join(entry.name()),
                false,
                overwrite,
            )?;
        }
    } else if src_fs.is_file(src)? {
        let mut input = src_fs.open(src)?;
        let mut output = dst_fs.create(&dst, overwrite)?;
        io::copy(&mut input, &mut output).map_err(|e| BridgeError::io("copy", src, e))?;
        output
            .flush()
            .map_err(|e| BridgeError::io("copy", &dst, e))?;
    } else {
        return Err(BridgeError::SourceMissing {
            path: src.to_string(),
        });
    }

    if delete_source {
        src_fs.delete(src, true)
    } else {
        Ok(true)
    }
}

fn check_not_self<S, D>(src_fs: &S, src: &FsPath, dst_fs: &D, dst: &FsPath) -> Result<(), BridgeError>
where
    S: FsHandle + ?Sized,
    D: FsHandle + ?Sized,
{
    if !same_backend(src_fs, dst_fs) {
        return Ok(());
    }
    let qualified_src = src_fs.qualify(src);
    let qualified_dst = dst_fs.qualify(dst);
    if qualified_dst.is_within(&qualified_src) {
        return Err(BridgeError::SelfCopy {
            nested: qualified_dst != qualified_src,
            source_path: qualified_src.to_string(),
            destination: qualified_dst.to_string(),
        });
    }
    Ok(())
}

/// Copy several sources into the directory `dst`.
///
/// A single source behaves exactly like [`copy`]. Otherwise every source is
/// attempted even when earlier ones fail, and the return value is the AND
/// of the individual results.
///
/// # Errors
///
/// - [`BridgeError::DestinationMissing`] / [`BridgeError::DestinationNotDirectory`]
///   when `dst` is not an existing directory (checked before any copy)
/// - [`BridgeError::Aggregate`] holding one message per failed source
pub fn copy_all<S, D>(
    src_fs: &S,
    sources: &[FsPath],
    dst_fs: &D,
    dst: &FsPath,
    delete_source: bool,
    overwrite: bool,
) -> Result<bool, BridgeError>
where
    S: FsHandle + ?Sized,
    D: FsHandle + ?Sized,
{
    if let [single] = sources {
        return copy(src_fs, single, dst_fs, dst, delete_source, overwrite);
    }

    if !dst_fs.exists(dst)? {
        return Err(BridgeError::DestinationMissing {
            path: dst.to_string(),
        });
    }
    if !dst_fs.is_dir(dst)? {
        return Err(BridgeError::DestinationNotDirectory {
            path: dst.to_string(),
        });
    }

    let mut all_ok = true;
    let mut messages = Vec::new();
    for src in sources {
        match copy(src_fs, src, dst_fs, dst, delete_source, overwrite) {
            Ok(ok) => all_ok &= ok,
            Err(e) => {
                tracing::debug!(src = %src, error = %e, "copy failed; continuing");
                messages.push(e.to_string());
            }
        }
    }
    if messages.is_empty() {
        Ok(all_ok)
    } else {
        Err(BridgeError::Aggregate { messages })
    }
}

/// Concatenate the files directly inside `src_dir` into one file at `dst_file`.
///
/// Files are appended in listing order, each followed by `separator` when
/// given; subdirectories, special entries and the output itself are
/// skipped. `dst_file` is resolved with overwriting
/// disabled. Returns `Ok(false)` without touching anything when `src_dir` is
/// not a directory.
///
/// The output is flushed and closed once whether or not an entry failed. An
/// entry failure is reported in preference to a failure while closing.
pub fn copy_merge<S, D>(
    src_fs: &S,
    src_dir: &FsPath,
    dst_fs: &D,
    dst_file: &FsPath,
    delete_source: bool,
    separator: Option<&[u8]>,
) -> Result<bool, BridgeError>
where
    S: FsHandle + ?Sized,
    D: FsHandle + ?Sized,
{
    let dst_file = resolve_destination(src_dir.name(), dst_fs, dst_file, false)?;
    if !src_fs.is_dir(src_dir)? {
        return Ok(false);
    }

    // The output may land inside `src_dir` and show up in its listing.
    let output = same_backend(src_fs, dst_fs).then(|| dst_fs.qualify(&dst_file));
    let mut out = dst_fs.create(&dst_file, false)?;
    let appended = append_files(src_fs, src_dir, &mut out, output.as_ref(), separator);
    let closed = out
        .flush()
        .map_err(|e| BridgeError::io("merge", &dst_file, e));
    drop(out);
    appended?;
    closed?;

    if delete_source {
        src_fs.delete(src_dir, true)
    } else {
        Ok(true)
    }
}

fn append_files<S>(
    src_fs: &S,
    src_dir: &FsPath,
    out: &mut dyn Write,
    output: Option<&QualifiedPath>,
    separator: Option<&[u8]>,
) -> Result<(), BridgeError>
where
    S: FsHandle + ?Sized,
{
    for entry in src_fs.list(src_dir)? {
        if !entry.is_file || output.is_some_and(|o| *o == src_fs.qualify(&entry.path)) {
            continue;
        }
        let mut input = src_fs.open(&entry.path)?;
        io::copy(&mut input, &mut *out).map_err(|e| BridgeError::io("merge", &entry.path, e))?;
        if let Some(separator) = separator {
            out.write_all(separator)
                .map_err(|e| BridgeError::io("merge", &entry.path, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FsDir, FsRead, MemoryFs};

    fn tree(fs: &MemoryFs) {
        fs.put("/src/a", "alpha").unwrap();
        fs.put("/src/b", "bravo").unwrap();
        fs.put("/src/c/d", "delta").unwrap();
    }

    #[test]
    fn file_into_existing_directory() {
        let fs = MemoryFs::new();
        fs.put("/f.txt", "body").unwrap();
        fs.mkdirs(&FsPath::new("/out")).unwrap();
        assert!(copy(&fs, &FsPath::new("/f.txt"), &fs, &FsPath::new("/out"), false, false).unwrap());
        assert_eq!(fs.contents("/out/f.txt").unwrap(), b"body");
        assert!(fs.exists(&FsPath::new("/f.txt")).unwrap());
    }

    #[test]
    fn tree_across_backends_with_delete_source() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        tree(&src);

        let ok = copy(&src, &FsPath::new("/src"), &dst, &FsPath::new("/copy"), true, false).unwrap();
        assert!(ok);
        assert_eq!(dst.contents("/copy/a").unwrap(), b"alpha");
        assert_eq!(dst.contents("/copy/c/d").unwrap(), b"delta");
        assert!(!src.exists(&FsPath::new("/src")).unwrap());
    }

    #[test]
    fn failed_source_delete_is_reported_as_false() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        tree(&src);
        src.fail_deletes("/src", 1);

        let ok = copy(&src, &FsPath::new("/src"), &dst, &FsPath::new("/copy"), true, false).unwrap();
        assert!(!ok);
        assert_eq!(dst.contents("/copy/b").unwrap(), b"bravo");
    }

    #[test]
    fn self_copy_is_refused_before_any_write() {
        let fs = MemoryFs::new();
        tree(&fs);

        let nested = copy(&fs, &FsPath::new("/src"), &fs, &FsPath::new("/src/c/inner"), false, false);
        assert!(matches!(
            nested,
            Err(BridgeError::SelfCopy { nested: true, .. })
        ));
        assert!(!fs.exists(&FsPath::new("/src/c/inner")).unwrap());

        let same = copy(&fs, &FsPath::new("/src/a"), &fs, &FsPath::new("/src/a"), false, true);
        assert!(matches!(same, Err(BridgeError::SelfCopy { nested: false, .. })));
        assert_eq!(fs.contents("/src/a").unwrap(), b"alpha");
    }

    #[test]
    fn clone_of_handle_counts_as_same_backend() {
        let fs = MemoryFs::new();
        tree(&fs);
        let alias = fs.clone();
        let result = copy(&fs, &FsPath::new("/src"), &alias, &FsPath::new("/src/x"), false, false);
        assert!(matches!(result, Err(BridgeError::SelfCopy { .. })));
    }

    #[test]
    fn missing_source() {
        let fs = MemoryFs::new();
        let result = copy(&fs, &FsPath::new("/nope"), &MemoryFs::new(), &FsPath::new("/x"), false, false);
        assert!(matches!(result, Err(BridgeError::SourceMissing { .. })));
    }

    #[test]
    fn child_failure_fails_whole_tree() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        tree(&src);
        src.fail_opens("/src/b");
        let result = copy(&src, &FsPath::new("/src"), &dst, &FsPath::new("/copy"), true, false);
        assert!(matches!(result, Err(BridgeError::Io { .. })));
        assert!(src.exists(&FsPath::new("/src/a")).unwrap());
    }

    #[test]
    fn mkdirs_refusal_returns_false() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        tree(&src);
        dst.put("/blocker", "file").unwrap();
        let ok = copy(&src, &FsPath::new("/src"), &dst, &FsPath::new("/blocker/copy"), false, false).unwrap();
        assert!(!ok);
    }

    #[test]
    fn copy_all_aggregates_every_failure() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        src.put("/one", "1").unwrap();
        src.put("/three", "3").unwrap();
        dst.mkdirs(&FsPath::new("/out")).unwrap();

        let sources = [
            FsPath::new("/one"),
            FsPath::new("/missing"),
            FsPath::new("/three"),
            FsPath::new("/gone"),
        ];
        let err = copy_all(&src, &sources, &dst, &FsPath::new("/out"), false, false).unwrap_err();
        match err {
            BridgeError::Aggregate { messages } => {
                assert_eq!(messages.len(), 2);
                assert!(messages[0].contains("/missing"));
                assert!(messages[1].contains("/gone"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Later sources were still attempted.
        assert_eq!(dst.contents("/out/three").unwrap(), b"3");
    }

    #[test]
    fn copy_all_checks_destination_first() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        src.put("/a", "").unwrap();
        src.put("/b", "").unwrap();
        dst.put("/file", "").unwrap();
        let sources = [FsPath::new("/a"), FsPath::new("/b")];

        let missing = copy_all(&src, &sources, &dst, &FsPath::new("/none"), false, false);
        assert!(matches!(missing, Err(BridgeError::DestinationMissing { .. })));
        let not_dir = copy_all(&src, &sources, &dst, &FsPath::new("/file"), false, false);
        assert!(matches!(not_dir, Err(BridgeError::DestinationNotDirectory { .. })));
    }

    #[test]
    fn copy_all_single_source_delegates() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        src.put("/only", "o").unwrap();
        let ok = copy_all(&src, &[FsPath::new("/only")], &dst, &FsPath::new("/renamed"), false, false)
            .unwrap();
        assert!(ok);
        assert_eq!(dst.contents("/renamed").unwrap(), b"o");
    }

    #[test]
    fn merge_concatenates_in_listing_order() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        src.put("/parts/f2", "two").unwrap();
        src.put("/parts/f1", "one").unwrap();
        src.put("/parts/f3", "three").unwrap();
        src.put("/parts/sub/ignored", "x").unwrap();

        let ok = copy_merge(&src, &FsPath::new("/parts"), &dst, &FsPath::new("/merged"), true, Some(b"\n".as_slice()))
            .unwrap();
        assert!(ok);
        assert_eq!(dst.contents("/merged").unwrap(), b"one\ntwo\nthree\n");
        assert!(!src.exists(&FsPath::new("/parts")).unwrap());
    }

    #[test]
    fn merge_of_non_directory_is_false() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        src.put("/file", "x").unwrap();
        let ok = copy_merge(&src, &FsPath::new("/file"), &dst, &FsPath::new("/m"), false, None).unwrap();
        assert!(!ok);
        assert!(!dst.exists(&FsPath::new("/m")).unwrap());
    }

    #[test]
    fn merge_refuses_existing_output() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        src.put("/parts/f", "x").unwrap();
        dst.put("/merged", "old").unwrap();
        let result = copy_merge(&src, &FsPath::new("/parts"), &dst, &FsPath::new("/merged"), false, None);
        assert!(matches!(result, Err(BridgeError::DestinationExists { .. })));
    }

    #[test]
    fn merge_entry_error_wins_over_close_error() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        src.put("/parts/a", "a").unwrap();
        src.put("/parts/b", "b").unwrap();
        src.fail_opens("/parts/b");
        dst.fail_flushes("/merged");

        let result = copy_merge(&src, &FsPath::new("/parts"), &dst, &FsPath::new("/merged"), false, None);
        match result {
            Err(BridgeError::Io { path, operation, .. }) => {
                assert_eq!(operation, "open");
                assert_eq!(path, "/parts/b");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn merge_close_error_surfaces_when_entries_succeed() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        src.put("/parts/a", "a").unwrap();
        dst.fail_flushes("/merged");

        let result = copy_merge(&src, &FsPath::new("/parts"), &dst, &FsPath::new("/merged"), false, None);
        assert!(matches!(result, Err(BridgeError::Io { operation: "merge", .. })));
    }

    #[test]
    fn merge_into_source_directory_skips_output() {
        let fs = MemoryFs::new();
        fs.put("/parts/a", "a").unwrap();
        fs.put("/parts/b", "b").unwrap();
        let ok = copy_merge(&fs, &FsPath::new("/parts"), &fs, &FsPath::new("/parts/zz"), false, None).unwrap();
        assert!(ok);
        assert_eq!(fs.contents("/parts/zz").unwrap(), b"ab");
    }

    #[test]
    fn works_through_trait_objects() {
        let src = MemoryFs::new();
        let dst = MemoryFs::new();
        tree(&src);
        let src_dyn: &dyn FsHandle = &src;
        let dst_dyn: &dyn FsHandle = &dst;
        assert!(copy(src_dyn, &FsPath::new("/src"), dst_dyn, &FsPath::new("/t"), false, false).unwrap());
        assert_eq!(dst.list(&FsPath::new("/t")).unwrap().len(), 3);
    }
}
