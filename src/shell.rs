//! # Shell Bridge
//!
//! Runs external commands and captures their output. Used for `chmod`,
//! tar extraction and symbolic links, where the host tools are the
//! reference behavior.
//!
//! Commands block the calling thread until the child exits. There is no
//! timeout: a hung child hangs the caller.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::BridgeError;

/// Captured outcome of one command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellResult {
    /// Exit status; `-1` when the child was terminated by a signal.
    pub exit_code: i32,
    /// Everything the child wrote to standard output.
    pub stdout: Vec<u8>,
    /// Everything the child wrote to standard error.
    pub stderr: Vec<u8>,
}

impl ShellResult {
    /// `true` for exit status 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Standard output, lossily decoded.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error, lossily decoded.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Builder for one external command.
///
/// ```rust,no_run
/// use fsbridge::ShellCommand;
///
/// let result = ShellCommand::script("echo hi").run()?;
/// assert_eq!(result.stdout_lossy(), "hi\n");
/// # Ok::<(), fsbridge::BridgeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ShellCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl ShellCommand {
    /// Run `program` directly, without a shell.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Run `script` through `bash -c`.
    pub fn script(script: impl Into<String>) -> Self {
        Self::new("bash").arg("-c").arg(script)
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Working directory of the child.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Human-readable command line, for errors and logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion and capture both streams.
    ///
    /// Fails only when the child cannot be spawned; a non-zero exit is
    /// reported through [`ShellResult::exit_code`].
    pub fn run(&self) -> Result<ShellResult, BridgeError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        tracing::debug!(command = %self.command_line(), "running");
        let output = command.output().map_err(|e| BridgeError::Io {
            operation: "spawn",
            path: self.program.clone(),
            source: e,
        })?;

        Ok(ShellResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Run, turning a non-zero exit into [`BridgeError::ShellCommandFailed`].
    pub fn execute(&self) -> Result<ShellResult, BridgeError> {
        let result = self.run()?;
        if result.success() {
            Ok(result)
        } else {
            Err(BridgeError::ShellCommandFailed {
                command: self.command_line(),
                exit_code: result.exit_code,
                stderr: result.stderr_lossy().trim_end().to_string(),
            })
        }
    }
}

/// Quote `value` for interpolation into a `bash -c` script.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Create a symbolic link `link` pointing at `target` with `ln -s`.
///
/// Returns the exit code. Failures are logged, not raised; a command that
/// cannot be spawned reports `-1`.
pub fn symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> i32 {
    let target = target.as_ref().to_string_lossy().into_owned();
    let link = link.as_ref().to_string_lossy().into_owned();
    let command = ShellCommand::new("ln").args(["-s", target.as_str(), link.as_str()]);
    match command.run() {
        Ok(result) => {
            if !result.success() {
                tracing::warn!(
                    command = %command.command_line(),
                    exit_code = result.exit_code,
                    stderr = %result.stderr_lossy().trim_end(),
                    "symlink failed"
                );
            }
            result.exit_code
        }
        Err(e) => {
            tracing::warn!(command = %command.command_line(), error = %e, "symlink failed");
            -1
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn run_captures_stdout_and_exit_code() {
        let result = ShellCommand::script("printf out; printf err >&2; exit 3")
            .run()
            .unwrap();
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout, b"out");
        assert_eq!(result.stderr_lossy(), "err");
        assert!(!result.success());
    }

    #[test]
    fn execute_maps_failure_to_error() {
        let err = ShellCommand::script("echo nope >&2; exit 2")
            .execute()
            .unwrap_err();
        match err {
            BridgeError::ShellCommandFailed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, 2);
                assert_eq!(stderr, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn current_dir_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let result = ShellCommand::new("pwd").current_dir(dir.path()).execute().unwrap();
        let printed = PathBuf::from(result.stdout_lossy().trim_end());
        assert_eq!(
            printed.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = ShellCommand::new("definitely-not-a-real-binary-xyz")
            .run()
            .unwrap_err();
        assert!(matches!(err, BridgeError::Io { operation: "spawn", .. }));
    }

    #[test]
    fn shell_quote_survives_single_quotes() {
        let quoted = shell_quote("it's here");
        let result = ShellCommand::script(format!("printf %s {quoted}"))
            .execute()
            .unwrap();
        assert_eq!(result.stdout_lossy(), "it's here");
    }

    #[test]
    fn symlink_creates_link_and_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target.txt");
        std::fs::write(&target, "t").unwrap();
        let link = dir.path().join("link.txt");

        assert_eq!(symlink(&target, &link), 0);
        assert_eq!(std::fs::read_link(&link).unwrap(), target);
        assert_ne!(symlink(&target, &link), 0);
    }
}
