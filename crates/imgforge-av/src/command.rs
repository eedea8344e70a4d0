//! Builder for executing external tool commands with timeout support.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;

use crate::{Error, Result};

/// Default command timeout: 60 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use imgforge_av::ToolCommand;
/// use std::path::PathBuf;
///
/// let output = ToolCommand::new(PathBuf::from("sips"))
///     .arg("-s").arg("format").arg("png")
///     .arg("photo.heic")
///     .arg("--out").arg("photo.png")
///     .execute()?;
/// println!("{}", output.stdout);
/// # Ok::<(), imgforge_av::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Execute the command on a current-thread runtime, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - Returns [`Error::ToolNotFound`] if the program does not exist.
    /// - Returns [`Error::ToolFailed`] if the process times out (message
    ///   includes the timeout duration). The child is killed.
    /// - Returns [`Error::ToolFailed`] if the process exits with a non-zero
    ///   status (message is stderr, or stdout when stderr is empty).
    pub fn execute(&self) -> Result<ToolOutput> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::tool_failed(self.program_name(), format!("failed to start runtime: {e}")))?;

        runtime.block_on(self.execute_async())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// Same errors as [`execute`](Self::execute).
    pub async fn execute_async(&self) -> Result<ToolOutput> {
        let program_name = self.program_name();

        #[cfg(feature = "tracing")]
        tracing::trace!("Running {} {:?}", program_name, self.args);

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout kills the child.
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(&program_name)
                } else {
                    Error::tool_failed(&program_name, format!("failed to spawn: {e}"))
                }
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::tool_failed(
                    program_name,
                    format!("I/O error waiting for process: {e}"),
                ))
            }
            Err(_elapsed) => {
                return Err(Error::tool_failed(
                    program_name,
                    format!("timed out after {:?}", self.timeout),
                ))
            }
        };

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            let stderr = tool_output.stderr.trim();
            let detail = if stderr.is_empty() {
                tool_output.stdout.trim()
            } else {
                stderr
            };
            return Err(Error::tool_failed(
                program_name,
                format!("exited with status {}: {}", output.status, detail),
            ));
        }

        Ok(tool_output)
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn execute_echo() {
        let output = ToolCommand::new(PathBuf::from("echo"))
            .arg("hello")
            .execute()
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn execute_nonexistent_tool() {
        let result = ToolCommand::new(PathBuf::from("nonexistent_tool_xyz_12345")).execute();
        assert!(matches!(result, Err(Error::ToolNotFound { .. })));
    }

    #[test]
    fn execute_failure_reports_stderr() {
        let err = ToolCommand::new(PathBuf::from("sh"))
            .args(["-c", "echo broken >&2; exit 3"])
            .execute()
            .unwrap_err();
        match err {
            Error::ToolFailed { tool, message } => {
                assert_eq!(tool, "sh");
                assert!(message.contains("broken"), "message: {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn execute_failure_falls_back_to_stdout() {
        let err = ToolCommand::new(PathBuf::from("sh"))
            .args(["-c", "echo only-stdout; exit 1"])
            .execute()
            .unwrap_err();
        assert!(err.to_string().contains("only-stdout"));
    }

    #[tokio::test]
    async fn execute_async_echo() {
        let output = ToolCommand::new(PathBuf::from("echo"))
            .arg("async")
            .execute_async()
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "async");
    }

    #[test]
    fn execute_timeout_kills_child() {
        let started = Instant::now();
        let err = ToolCommand::new(PathBuf::from("sleep"))
            .arg("5")
            .timeout(Duration::from_millis(200))
            .execute()
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
