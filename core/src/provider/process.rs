//! External program execution for command-line backends

use crate::error::{ProviderError, Result};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration, Instant};

/// Captured outcome of one program run
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a failed run into a classified provider error.
    ///
    /// stderr carries the backend's message; stdout is used when stderr is
    /// empty because some `gh api` failures print the JSON error body there.
    pub fn into_result(self) -> std::result::Result<String, ProviderError> {
        if self.success() {
            return Ok(self.stdout);
        }

        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        Err(ProviderError::classify(format!(
            "exit status {}: {}",
            self.exit_code, detail
        )))
    }
}

/// Run `program` with `args`, killing it once `deadline` elapses.
///
/// A program that cannot be spawned at all is reported as
/// [`ProviderError::Unavailable`]; an elapsed deadline is an ordinary failure.
pub async fn run_program(
    program: &str,
    args: &[String],
    deadline: Duration,
) -> Result<CommandOutput> {
    let start_time = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| ProviderError::Unavailable {
        message: format!("failed to start {}: {}", program, e),
    })?;

    let output = match timeout(deadline, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            return Err(ProviderError::Other {
                message: format!(
                    "{} did not finish within {} seconds",
                    program,
                    deadline.as_secs()
                ),
            }
            .into())
        }
    };

    Ok(CommandOutput {
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration_ms: start_time.elapsed().as_millis() as u64,
    })
}
