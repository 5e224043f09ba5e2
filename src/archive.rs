//! # Archive Extractor
//!
//! Zip archives are read in-process with the `zip` crate; tar archives
//! (optionally gzip-compressed) are handed to the host `tar` through
//! [`ShellCommand`].

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use zip::ZipArchive;

use crate::BridgeError;
use crate::shell::{ShellCommand, shell_quote};

/// Extract every file entry of the zip at `archive` below `dest_dir`.
///
/// Entries are written in stored order. Directory entries are skipped;
/// parents are created from file paths. Existing files are overwritten.
///
/// # Errors
///
/// - [`BridgeError::Archive`] if the container cannot be read
/// - [`BridgeError::UnsafeArchiveEntry`] for a name that would land outside `dest_dir`
/// - [`BridgeError::MkdirsFailed`] if a parent directory cannot be created
pub fn extract_zip(archive: impl AsRef<Path>, dest_dir: impl AsRef<Path>) -> Result<(), BridgeError> {
    let archive = archive.as_ref();
    let dest_dir = dest_dir.as_ref();
    let zip_error = |source| BridgeError::Archive {
        archive: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(|e| BridgeError::io("open", archive.display(), e))?;
    let mut zip = ZipArchive::new(file).map_err(zip_error)?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(zip_error)?;
        if entry.is_dir() {
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            return Err(BridgeError::UnsafeArchiveEntry {
                archive: archive.to_path_buf(),
                entry: entry.name().to_string(),
            });
        };
        let target = dest_dir.join(relative);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }

        let mut out =
            File::create(&target).map_err(|e| BridgeError::io("create", target.display(), e))?;
        io::copy(&mut entry, &mut out).map_err(|e| BridgeError::io("extract", target.display(), e))?;
        out.flush()
            .map_err(|e| BridgeError::io("extract", target.display(), e))?;
    }
    Ok(())
}

/// Extract the tar at `archive` into `dest_dir` with the host `tar`.
///
/// A name ending in `gz` is piped through `gzip -dc` first.
///
/// # Errors
///
/// - [`BridgeError::MkdirsFailed`] if `dest_dir` cannot be created
/// - [`BridgeError::ExtractionFailed`] if the pipeline exits non-zero,
///   including when `archive` does not exist or either stage fails
pub fn extract_tar(archive: impl AsRef<Path>, dest_dir: impl AsRef<Path>) -> Result<(), BridgeError> {
    let archive = archive.as_ref();
    let dest_dir = dest_dir.as_ref();
    ensure_dir(dest_dir)?;

    // Absolute paths keep the `cd` in the pipeline from changing their meaning.
    // A missing archive is left for `tar`/`gzip` to report through the exit code.
    let archive_path = std::path::absolute(archive)
        .map_err(|e| BridgeError::io("extract", archive.display(), e))?;
    let dest_path = fs::canonicalize(dest_dir)
        .map_err(|e| BridgeError::io("extract", dest_dir.display(), e))?;
    let archive_arg = shell_quote(&archive_path.to_string_lossy());
    let dest_arg = shell_quote(&dest_path.to_string_lossy());

    let script = if archive.to_string_lossy().ends_with("gz") {
        format!("set -o pipefail ; gzip -dc {archive_arg} | (cd {dest_arg} ; tar -xf -)")
    } else {
        format!("cd {dest_arg} ; tar -xf {archive_arg}")
    };

    let result = ShellCommand::script(script).run()?;
    if !result.success() {
        tracing::debug!(
            archive = %archive.display(),
            exit_code = result.exit_code,
            stderr = %result.stderr_lossy().trim_end(),
            "tar extraction failed"
        );
        return Err(BridgeError::ExtractionFailed {
            archive: archive.to_path_buf(),
            exit_code: result.exit_code,
        });
    }
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), BridgeError> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(_) if dir.is_dir() => Ok(()),
        Err(e) => {
            tracing::debug!(path = %dir.display(), error = %e, "mkdirs failed");
            Err(BridgeError::MkdirsFailed {
                path: dir.to_path_buf(),
            })
        }
    }
}
