//! # fsbridge
//!
//! Move, copy, delete and permission-manage files and directory trees across
//! two independently addressable storage backends, typically a local disk and
//! a remote store.
//!
//! Every algorithm talks to storage through the [`FsHandle`] capability
//! traits, so the same code copies local-to-remote, remote-to-local,
//! remote-to-remote or purely locally. Two handles are provided:
//! [`LocalFs`] over `std::fs`, and [`MemoryFs`], an in-process backend with
//! fault injection for tests.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use fsbridge::{copy, delete_tree, FsPath, FsRead, MemoryFs};
//!
//! let local = MemoryFs::new();
//! let remote = MemoryFs::new();
//! local.put("/job/out/part-0", "a")?;
//! local.put("/job/out/part-1", "b")?;
//!
//! // Copy the tree and remove the source once it has landed.
//! assert!(copy(&local, &FsPath::new("/job/out"), &remote, &FsPath::new("/archive"), true, false)?);
//! assert_eq!(remote.contents("/archive/part-1")?, b"b");
//! assert!(!local.exists(&FsPath::new("/job/out"))?);
//!
//! assert!(delete_tree(&remote, &FsPath::new("/archive")));
//! # Ok::<(), fsbridge::BridgeError>(())
//! ```
//!
//! ---
//!
//! ## Components
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`resolve_destination`] | Where a copy lands: inside a directory, over a file, or as named |
//! | [`copy`], [`copy_all`], [`copy_merge`] | Recursive tree copy, multi-source copy, concatenation |
//! | [`delete_tree`], [`delete_contents`] | Best-effort recursive delete |
//! | [`set_permission`], [`chmod`] | Tiered permission setting |
//! | [`extract_zip`], [`extract_tar`] | Archive extraction |
//! | [`Replacer`] | Rename into place with bounded retries |
//! | [`ShellCommand`], [`symlink`] | External command invocation |
//! | [`BridgeConfig`] | Capabilities and retry budget in one value |
//!
//! ---
//!
//! ## Error Handling
//!
//! Every fallible operation returns `Result<T, BridgeError>`. Errors carry
//! the path, command or exit code involved:
//!
//! ```rust
//! use fsbridge::BridgeError;
//!
//! let err = BridgeError::SourceMissing { path: "/in/x".into() };
//! assert_eq!(err.to_string(), "/in/x: No such file or directory");
//! ```
//!
//! Single-item operations fail fast. [`copy_all`] keeps going and reports
//! every failure at once as [`BridgeError::Aggregate`]. [`delete_tree`]
//! never fails; it returns `false` when anything survived.
//!
//! ---
//!
//! ## Logging
//!
//! Events are emitted with `tracing`: failed deletes, `chmod` failures and
//! replace retries at `debug`, failed symlinks and exhausted replaces at
//! `warn`. No subscriber is installed.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`FsPath`], [`FileStatus`], [`Permissions`], [`BridgeConfig`] and JSON config loading |

// Private modules
mod archive;
mod config;
mod copy;
mod delete;
mod error;
mod ext;
mod listing;
mod local;
mod memory;
mod path;
mod permission;
mod replace;
mod resolve;
mod shell;
mod traits;
mod types;

// Public re-exports - error types
pub use error::BridgeError;

// Public re-exports - core types
pub use path::{FsPath, QualifiedPath};
pub use types::{FileStatus, FsAction, Permissions};

// Public re-exports - handle traits
pub use ext::FsHandleExt;
pub use traits::{FsBackend, FsDir, FsHandle, FsRead, FsWrite, same_backend};

// Public re-exports - handles
pub use local::{LOCAL_BACKEND_ID, LocalFs};
pub use memory::MemoryFs;

// Public re-exports - tree operations
pub use copy::{copy, copy_all, copy_merge};
pub use delete::{delete_contents, delete_tree};
pub use replace::{CancelToken, ReplacePolicy, Replacer, replace};
pub use resolve::resolve_destination;

// Public re-exports - local primitives
pub use archive::{extract_tar, extract_zip};
pub use listing::{
    create_local_temp_file, disk_usage, list_files, list_names, stat_to_paths, stat_to_paths_or,
};
pub use permission::{
    Attribute, AttributeCall, Capabilities, PermissionOutcome, PermissionStrategy, chmod,
    set_permission,
};
pub use shell::{ShellCommand, ShellResult, shell_quote, symlink};

// Public re-exports - configuration
pub use config::BridgeConfig;
