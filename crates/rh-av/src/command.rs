//! Running external tools (ffprobe) with captured output and a deadline.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use rh_core::{Error, Result};
use tokio::process::Command;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// What a finished tool printed.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    /// Lossy UTF-8.
    pub stdout: String,
    /// Lossy UTF-8.
    pub stderr: String,
}

/// One invocation of an external tool.
///
/// ```no_run
/// use rh_av::ToolCommand;
///
/// # async fn example() -> rh_core::Result<()> {
/// let output = ToolCommand::new("/usr/bin/ffprobe")
///     .args(["-v", "error", "-show_entries", "format=duration"])
///     .arg("/srv/upload/videos/clip.mp4")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    /// Short name used in errors and logs.
    name: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = tool_name(&program);
        Self {
            program,
            name,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Kill the tool if it runs longer than `d`.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    fn fail(&self, message: impl Into<String>) -> Error {
        Error::tool(&self.name, message)
    }

    /// Run to completion.
    ///
    /// Spawn failure, a non-zero exit (stderr is included in the message)
    /// and an expired deadline all yield [`Error::Tool`]. The child is
    /// killed when the deadline expires or the future is dropped.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.fail(format!("failed to spawn: {e}")))?;

        tracing::trace!(tool = %self.name, args = ?self.args, "Spawned tool");

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| self.fail(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| self.fail(format!("I/O error waiting for process: {e}")))?;

        let output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(self.fail(format!(
                "exited with status {}: {}",
                output.status,
                output.stderr.trim()
            )));
        }
        Ok(output)
    }
}

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn have(tool: &str) -> bool {
        which::which(tool).is_ok()
    }

    #[test]
    fn errors_use_the_file_name() {
        let err = ToolCommand::new("/opt/tools/bin/ffprobe").fail("boom");
        assert_eq!(err.to_string(), "Tool error [ffprobe]: boom");
    }

    #[tokio::test]
    async fn captures_stdout() {
        if !have("echo") {
            return;
        }
        let out = ToolCommand::new("echo").arg("12.5").execute().await.unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout.trim(), "12.5");
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let err = ToolCommand::new("nonexistent_tool_xyz_12345")
            .execute()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool { .. }));
        assert!(err.to_string().contains("failed to spawn"));
    }

    #[tokio::test]
    async fn non_zero_exit_includes_stderr() {
        if !have("sh") {
            return;
        }
        let err = ToolCommand::new("sh")
            .args(["-c", "echo 'moov atom not found' >&2; exit 1"])
            .execute()
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("exited with status"), "{err}");
        assert!(err.contains("moov atom not found"), "{err}");
    }

    #[tokio::test]
    async fn deadline_kills_slow_tools() {
        if !have("sleep") {
            return;
        }
        let err = ToolCommand::new("sleep")
            .arg("10")
            .timeout(Duration::from_millis(100))
            .execute()
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("timed out"), "{err}");
    }
}
