//! # Permission Setter
//!
//! Applies a [`Permissions`] value to a local path using the first strategy
//! the host supports:
//!
//! 1. **Native**: `std::fs::set_permissions` with the numeric mode.
//! 2. **External command**: `chmod <%04o> <canonical path>`.
//! 3. **Bit fallback**: up to six per-attribute calls that can only express
//!    "everyone" or "owner only", so it is used just when group and other
//!    agree and no native call exists.
//!
//! Fallback calls that fail are recorded with `ignored = true` and never
//! raised; callers that care inspect [`PermissionOutcome::calls`].

use std::path::Path;

use crate::shell::{ShellCommand, shell_quote};
use crate::{BridgeError, FsAction, Permissions};

/// What the host can do natively, probed once and injected into
/// [`set_permission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capabilities {
    /// A numeric-mode chmod syscall is available.
    pub native_chmod: bool,
}

impl Capabilities {
    /// Capabilities of the current host.
    pub fn probe() -> Self {
        Self {
            native_chmod: cfg!(unix),
        }
    }

    /// No native support: forces the external command or bit fallback.
    pub fn none() -> Self {
        Self {
            native_chmod: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::probe()
    }
}

/// Which tier applied the permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStrategy {
    /// Numeric mode through the OS.
    Native,
    /// `chmod` subprocess.
    ExternalCommand,
    /// Per-attribute calls.
    BitFallback,
}

/// Which attribute a fallback call touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// Read bit.
    Readable,
    /// Write bit.
    Writable,
    /// Execute bit.
    Executable,
}

impl Attribute {
    fn action(self) -> FsAction {
        match self {
            Attribute::Readable => FsAction::READ,
            Attribute::Writable => FsAction::WRITE,
            Attribute::Executable => FsAction::EXECUTE,
        }
    }
}

/// One call made by the bit fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeCall {
    /// Attribute changed.
    pub attribute: Attribute,
    /// Whether it was granted or revoked.
    pub enabled: bool,
    /// `true` when only the owner bit was touched.
    pub owner_only: bool,
    /// Result reported by the underlying call.
    pub succeeded: bool,
    /// Set when the call failed and the failure was swallowed.
    pub ignored: bool,
}

/// Result of [`set_permission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionOutcome {
    /// Tier that ran.
    pub strategy: PermissionStrategy,
    /// Fallback calls in the order made; empty for the other tiers.
    pub calls: Vec<AttributeCall>,
}

impl PermissionOutcome {
    /// `true` if some fallback call failed and was ignored.
    pub fn any_ignored(&self) -> bool {
        self.calls.iter().any(|c| c.ignored)
    }
}

/// Set `permission` on the local entry at `path`.
///
/// # Errors
///
/// Native and external tiers fail fast: an OS error becomes
/// [`BridgeError::Io`] / [`BridgeError::NotFound`], a non-zero `chmod` exit
/// becomes [`BridgeError::ShellCommandFailed`]. The bit fallback never fails.
pub fn set_permission(
    path: impl AsRef<Path>,
    permission: Permissions,
    capabilities: &Capabilities,
) -> Result<PermissionOutcome, BridgeError> {
    let path = path.as_ref();
    if permission.group != permission.other || capabilities.native_chmod {
        let strategy = exec_set_permission(path, permission, capabilities)?;
        return Ok(PermissionOutcome {
            strategy,
            calls: Vec::new(),
        });
    }

    let mut calls = Vec::new();
    for attribute in [
        Attribute::Readable,
        Attribute::Writable,
        Attribute::Executable,
    ] {
        let action = attribute.action();
        let group_has = permission.group.implies(action);
        calls.push(attribute_call(path, attribute, group_has, false));
        let user_has = permission.user.implies(action);
        if user_has != group_has {
            calls.push(attribute_call(path, attribute, user_has, true));
        }
    }
    Ok(PermissionOutcome {
        strategy: PermissionStrategy::BitFallback,
        calls,
    })
}

fn exec_set_permission(
    path: &Path,
    permission: Permissions,
    capabilities: &Capabilities,
) -> Result<PermissionStrategy, BridgeError> {
    if capabilities.native_chmod && native_chmod(path, permission.mode())? {
        return Ok(PermissionStrategy::Native);
    }
    let canonical =
        std::fs::canonicalize(path).map_err(|e| BridgeError::io("chmod", path.display(), e))?;
    ShellCommand::new("chmod")
        .arg(permission.octal())
        .arg(canonical.to_string_lossy())
        .execute()?;
    Ok(PermissionStrategy::ExternalCommand)
}

/// Returns `Ok(false)` when the platform has no numeric mode call.
#[cfg(unix)]
fn native_chmod(path: &Path, mode: u32) -> Result<bool, BridgeError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(|e| BridgeError::io("chmod", path.display(), e))?;
    Ok(true)
}

#[cfg(not(unix))]
fn native_chmod(_path: &Path, _mode: u32) -> Result<bool, BridgeError> {
    Ok(false)
}

fn attribute_call(path: &Path, attribute: Attribute, enabled: bool, owner_only: bool) -> AttributeCall {
    let succeeded = set_attribute(path, attribute.action(), enabled, owner_only);
    if !succeeded {
        tracing::debug!(
            path = %path.display(),
            ?attribute,
            enabled,
            owner_only,
            "attribute change failed; ignored"
        );
    }
    AttributeCall {
        attribute,
        enabled,
        owner_only,
        succeeded,
        ignored: !succeeded,
    }
}

#[cfg(unix)]
fn set_attribute(path: &Path, action: FsAction, enabled: bool, owner_only: bool) -> bool {
    use std::os::unix::fs::PermissionsExt;
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    let user_bits = u32::from(action.bits()) << 6;
    let mask = if owner_only {
        user_bits
    } else {
        user_bits | (user_bits >> 3) | (user_bits >> 6)
    };
    let mode = meta.permissions().mode();
    let mode = if enabled { mode | mask } else { mode & !mask };
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).is_ok()
}

#[cfg(not(unix))]
fn set_attribute(path: &Path, action: FsAction, enabled: bool, _owner_only: bool) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if action == FsAction::WRITE {
        let mut perms = meta.permissions();
        perms.set_readonly(!enabled);
        std::fs::set_permissions(path, perms).is_ok()
    } else {
        // Read and execute cannot be revoked here.
        enabled
    }
}

/// Run `chmod [-R] <mode> <path>` through `bash -c`.
///
/// `mode` may be symbolic (`u+x`) or octal. Returns the exit code; failures
/// are logged at debug level and not raised.
pub fn chmod(path: impl AsRef<Path>, mode: &str, recursive: bool) -> i32 {
    let path = path.as_ref().to_string_lossy().into_owned();
    let flag = if recursive { "-R " } else { "" };
    let script = format!("chmod {flag}{mode} {}", shell_quote(&path));
    match ShellCommand::script(script.as_str()).run() {
        Ok(result) => {
            if !result.success() {
                tracing::debug!(
                    command = %script,
                    exit_code = result.exit_code,
                    stderr = %result.stderr_lossy().trim_end(),
                    "chmod failed"
                );
            }
            result.exit_code
        }
        Err(e) => {
            tracing::debug!(command = %script, error = %e, "chmod failed");
            -1
        }
    }
}
