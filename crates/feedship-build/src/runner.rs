//! External tool execution
//!
//! Every `docker` and `aws` call of the pipeline is described as an
//! [`Invocation`] and handed to a [`ToolRunner`]. [`ProcessRunner`] spawns
//! real processes; [`DryRunRunner`] only logs what would run. Tests inject
//! their own runner to simulate failures at any step.

use crate::error::ToolError;
use async_trait::async_trait;
use feedship_core::Secret;
use std::fmt;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// A single command line plus its optional secret stdin payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    stdin: Option<Secret>,
    streamed: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            streamed: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feed a secret on stdin instead of the command line
    pub fn stdin(mut self, secret: Secret) -> Self {
        self.stdin = Some(secret);
        self
    }

    /// Let the tool write straight to the CI log instead of capturing output
    pub fn streamed(mut self) -> Self {
        self.streamed = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn secret_stdin(&self) -> Option<&Secret> {
        self.stdin.as_ref()
    }

    pub fn is_streamed(&self) -> bool {
        self.streamed
    }
}

/// Renders the command line; stdin payloads are never shown
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a successful invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// Capability to run an external tool
///
/// Implementations return `Err` for anything but a zero exit status, so the
/// pipeline can propagate with `?`.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;
}

#[async_trait]
impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        (**self).run(invocation).await
    }
}

#[async_trait]
impl<T: ToolRunner + ?Sized> ToolRunner for Box<T> {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        (**self).run(invocation).await
    }
}

/// Runs invocations as child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let program = invocation.program();

        let mut cmd = Command::new(program);
        cmd.args(invocation.arguments());
        cmd.stdin(if invocation.secret_stdin().is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        if invocation.is_streamed() {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        }

        tracing::debug!(command = %invocation, "Running external tool");

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ToolError::NotFound {
                program: program.to_string(),
            },
            _ => ToolError::Spawn {
                program: program.to_string(),
                source: e,
            },
        })?;

        if let Some(secret) = invocation.secret_stdin()
            && let Some(mut stdin) = child.stdin.take()
        {
            match stdin.write_all(secret.expose().as_bytes()).await {
                Ok(()) => {}
                // the tool exited before reading; its status and stderr say why
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!(command = %invocation, "stdin closed before the secret was written");
                }
                Err(e) => {
                    return Err(ToolError::Spawn {
                        program: program.to_string(),
                        source: e,
                    });
                }
            }
            // closing stdin lets `--password-stdin` readers see EOF
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ToolError::Spawn {
                program: program.to_string(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(ToolError::Failed {
                command: invocation.to_string(),
                status: output.status.code(),
                stderr,
            });
        }

        Ok(ToolOutput {
            status: output.status.code(),
            stdout,
            stderr,
        })
    }
}

/// Logs each invocation and reports success without spawning anything
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

#[async_trait]
impl ToolRunner for DryRunRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        tracing::info!(
            command = %invocation,
            secret_stdin = invocation.secret_stdin().is_some(),
            "dry-run: skipping external tool"
        );
        Ok(ToolOutput::success(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_hides_secret() {
        let invocation = Invocation::new("docker")
            .args(["login", "--username", "bot", "--password-stdin"])
            .stdin(Secret::new("hunter2"));

        let shown = invocation.to_string();
        assert_eq!(shown, "docker login --username bot --password-stdin");
        assert!(!format!("{:?}", invocation).contains("hunter2"));
    }

    #[tokio::test]
    async fn test_dry_run_succeeds() {
        let output = DryRunRunner
            .run(&Invocation::new("docker").arg("push").arg("x:latest"))
            .await
            .unwrap();
        assert_eq!(output.status, Some(0));
        assert!(output.stdout.is_empty());
    }

    #[tokio::test]
    async fn test_process_runner_missing_program() {
        let err = ProcessRunner::new()
            .run(&Invocation::new("feedship-definitely-not-installed"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_captures_stdout() {
        let output = ProcessRunner::new()
            .run(&Invocation::new("sh").args(["-c", "printf token"]))
            .await
            .unwrap();
        assert_eq!(output.stdout, "token");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_feeds_secret_on_stdin() {
        let output = ProcessRunner::new()
            .run(
                &Invocation::new("sh")
                    .args(["-c", "cat"])
                    .stdin(Secret::new("from-stdin")),
            )
            .await
            .unwrap();
        assert_eq!(output.stdout, "from-stdin");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_non_zero_exit() {
        let err = ProcessRunner::new()
            .run(&Invocation::new("sh").args(["-c", "echo denied >&2; exit 3"]))
            .await
            .unwrap_err();
        match err {
            ToolError::Failed { status, stderr, .. } => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr.trim(), "denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_early_exit_keeps_status() {
        // large enough to overflow the pipe buffer after the child is gone
        let secret = Secret::new("x".repeat(256 * 1024));
        let err = ProcessRunner::new()
            .run(
                &Invocation::new("sh")
                    .args(["-c", "echo bad flag >&2; exit 3"])
                    .stdin(secret),
            )
            .await
            .unwrap_err();
        match err {
            ToolError::Failed { status, stderr, .. } => {
                assert_eq!(status, Some(3));
                assert_eq!(stderr.trim(), "bad flag");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
