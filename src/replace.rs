//! # Atomic Replacer
//!
//! Moves a file into place with a rename, retrying while an external holder
//! keeps the old target from being removed.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::{BridgeError, FsHandle, FsPath};

/// Retry budget for [`Replacer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReplacePolicy {
    /// Maximum number of waits before the final rename attempt.
    pub retries: u32,
    /// Pause between attempts to remove the old target.
    #[cfg_attr(feature = "serde", serde(rename = "delay_ms", with = "millis"))]
    pub delay: Duration,
}

impl Default for ReplacePolicy {
    fn default() -> Self {
        Self {
            retries: 5,
            delay: Duration::from_secs(1),
        }
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// Cancels a [`Replacer`] that is waiting between retries.
///
/// Clones share one flag; cancelling any clone wakes every waiter.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and wake all waiters.
    pub fn cancel(&self) {
        let (flag, wake) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wake.notify_all();
    }

    /// `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `timeout` unless cancelled first. Returns `true` if cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (flag, wake) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = flag.lock().unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = wake
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *cancelled
    }
}

/// Renames files into place under a [`ReplacePolicy`].
///
/// ```rust
/// use fsbridge::{FsPath, MemoryFs, Replacer};
///
/// let fs = MemoryFs::new();
/// fs.put("/tmp/part", "new")?;
/// fs.put("/data/current", "old")?;
///
/// Replacer::default().replace(&fs, &FsPath::new("/tmp/part"), &FsPath::new("/data/current"))?;
/// assert_eq!(fs.contents("/data/current")?, b"new");
/// # Ok::<(), fsbridge::BridgeError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Replacer {
    policy: ReplacePolicy,
    cancel: Option<CancelToken>,
}

impl Replacer {
    /// Replacer with the given budget and no cancellation.
    pub fn new(policy: ReplacePolicy) -> Self {
        Self {
            policy,
            cancel: None,
        }
    }

    /// Let `token` interrupt the wait between retries.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The retry budget in use.
    pub fn policy(&self) -> &ReplacePolicy {
        &self.policy
    }

    /// Rename `src` to `target`, replacing an existing `target`.
    ///
    /// The direct rename is tried first. If it is refused, the old `target`
    /// is deleted, waiting between attempts while it exists and cannot be
    /// deleted, up to `retries` waits. Then the rename is tried once more.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::ReplaceFailed`] when the final rename is refused
    /// - [`BridgeError::ReplaceInterrupted`] when the token is cancelled
    ///   during a wait
    pub fn replace<F>(&self, fs: &F, src: &FsPath, target: &FsPath) -> Result<(), BridgeError>
    where
        F: FsHandle + ?Sized,
    {
        if try_rename(fs, src, target) {
            return Ok(());
        }

        let mut waits = 0;
        while fs.exists(target)? && !try_delete(fs, target) && waits < self.policy.retries {
            waits += 1;
            tracing::debug!(
                target = %target,
                attempt = waits,
                retries = self.policy.retries,
                "target still present; waiting before retry"
            );
            self.pause(target)?;
        }

        if try_rename(fs, src, target) {
            Ok(())
        } else {
            tracing::warn!(src = %src, target = %target, waits, "replace failed");
            Err(BridgeError::ReplaceFailed {
                source_path: src.to_string(),
                target: target.to_string(),
            })
        }
    }

    fn pause(&self, target: &FsPath) -> Result<(), BridgeError> {
        let cancelled = match &self.cancel {
            Some(token) => token.wait(self.policy.delay),
            None => {
                std::thread::sleep(self.policy.delay);
                false
            }
        };
        if cancelled {
            return Err(BridgeError::ReplaceInterrupted {
                target: target.to_string(),
            });
        }
        Ok(())
    }
}

/// [`Replacer::replace`] with the default policy.
pub fn replace<F>(fs: &F, src: &FsPath, target: &FsPath) -> Result<(), BridgeError>
where
    F: FsHandle + ?Sized,
{
    Replacer::default().replace(fs, src, target)
}

fn try_rename<F: FsHandle + ?Sized>(fs: &F, src: &FsPath, target: &FsPath) -> bool {
    match fs.rename(src, target) {
        Ok(renamed) => renamed,
        Err(e) => {
            tracing::debug!(src = %src, target = %target, error = %e, "rename failed");
            false
        }
    }
}

fn try_delete<F: FsHandle + ?Sized>(fs: &F, target: &FsPath) -> bool {
    fs.delete(target, false).unwrap_or(false)
}
