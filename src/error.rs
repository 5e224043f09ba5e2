//! Error types for filesystem bridging operations.

use std::path::PathBuf;

/// Error type shared by every bridging operation.
///
/// Variants carry the path (and where relevant the command or exit code)
/// that caused the failure. Uses `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use fsbridge::BridgeError;
///
/// let err = BridgeError::DestinationExists { path: "/out/a.txt".into() };
/// assert_eq!(err.to_string(), "target /out/a.txt already exists");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    // Destination policy
    /// Destination is a regular file and overwriting was not requested.
    #[error("target {path} already exists")]
    DestinationExists {
        /// The colliding destination.
        path: String,
    },

    /// Destination is a directory and there is no source name to append.
    #[error("target {path} is a directory")]
    DestinationIsDirectoryWithoutName {
        /// The destination directory.
        path: String,
    },

    /// Multi-source copy target exists but is not a directory.
    #[error("copying multiple files, but last argument `{path}' is not a directory")]
    DestinationNotDirectory {
        /// The destination that should have been a directory.
        path: String,
    },

    /// Multi-source copy target does not exist.
    #[error("`{path}': specified destination directory does not exist")]
    DestinationMissing {
        /// The missing destination.
        path: String,
    },

    /// Copy would write into its own source.
    #[error("{}", self_copy_message(.source_path, .destination, .nested))]
    SelfCopy {
        /// The source location.
        source_path: String,
        /// The destination location.
        destination: String,
        /// `true` when the destination is below the source rather than equal to it.
        nested: bool,
    },

    /// Source is neither a file nor a directory.
    #[error("{path}: No such file or directory")]
    SourceMissing {
        /// The missing source.
        path: String,
    },

    // Local filesystem
    /// A directory could not be created and is not already present.
    #[error("mkdirs failed to create {path}")]
    MkdirsFailed {
        /// The directory that could not be created.
        path: PathBuf,
    },

    /// An archive entry would be written outside the destination directory.
    #[error("unsafe archive entry {entry} in {archive}")]
    UnsafeArchiveEntry {
        /// The archive being extracted.
        archive: PathBuf,
        /// The offending entry name.
        entry: String,
    },

    /// The tar pipeline exited with a non-zero status.
    #[error("error untarring file {archive}. Tar process exited with exit code {exit_code}")]
    ExtractionFailed {
        /// The archive being extracted.
        archive: PathBuf,
        /// Exit status of the shell pipeline.
        exit_code: i32,
    },

    /// Zip container could not be read.
    #[error("invalid zip archive {archive}: {source}")]
    Archive {
        /// The archive being extracted.
        archive: PathBuf,
        /// The underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },

    // Replace
    /// Final rename attempt failed.
    #[error("unable to rename {source_path} to {target}")]
    ReplaceFailed {
        /// File being moved into place.
        source_path: String,
        /// Destination that could not be replaced.
        target: String,
    },

    /// Waiting between replace retries was cancelled.
    #[error("replace of {target} interrupted")]
    ReplaceInterrupted {
        /// Destination that was being replaced.
        target: String,
    },

    // Shell
    /// External command exited with a non-zero status.
    #[error("command `{command}` exited with code {exit_code}: {stderr}")]
    ShellCommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit status (`-1` when terminated by a signal).
        exit_code: i32,
        /// Captured standard error, lossily decoded.
        stderr: String,
    },

    // Aggregation
    /// One or more sources of a multi-source copy failed.
    #[error("{}", .messages.join("\n"))]
    Aggregate {
        /// One message per failed source, in attempt order.
        messages: Vec<String>,
    },

    // Backend
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The missing path.
        path: String,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The existing path.
        path: String,
        /// The operation that failed.
        operation: &'static str,
    },

    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: String,
    },

    /// Path is unusable for the requested operation.
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

fn self_copy_message(source: &str, destination: &str, nested: &bool) -> String {
    if *nested {
        format!("cannot copy {source} to its subdirectory {destination}")
    } else {
        format!("cannot copy {source} to itself")
    }
}

impl BridgeError {
    /// Wrap an I/O error with the operation and path it belongs to.
    pub fn io(operation: &'static str, path: impl ToString, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => BridgeError::NotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::AlreadyExists => BridgeError::AlreadyExists {
                path: path.to_string(),
                operation,
            },
            _ => BridgeError::Io {
                operation,
                path: path.to_string(),
                source,
            },
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(error: std::io::Error) -> Self {
        BridgeError::io("io", "", error)
    }
}
