use crate::{CommandResult, CommandSpec, RunnerError, RunnerResult};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Executes [`CommandSpec`]s as direct child processes, never through a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run the program once and wait for it, at most `spec.timeout`.
    ///
    /// A run past its deadline is killed and returns `Ok` with exit code 124.
    pub async fn run(&self, spec: &CommandSpec) -> RunnerResult<CommandResult> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        apply_non_interactive_env(&mut cmd);

        debug!(program = %spec.program, args = ?spec.args, "spawning command");
        let started = Instant::now();

        // Dropping the `output()` future on timeout kills the child.
        let output = match timeout(spec.timeout, cmd.output()).await {
            Err(_) => {
                warn!(
                    program = %spec.program,
                    timeout_ms = spec.timeout.as_millis() as u64,
                    "command timed out"
                );
                return Ok(CommandResult::timed_out(&spec.program));
            }
            Ok(Err(err)) => {
                return Err(if err.kind() == std::io::ErrorKind::NotFound {
                    RunnerError::NotInstalled {
                        program: spec.program.clone(),
                    }
                } else {
                    RunnerError::Spawn {
                        program: spec.program.clone(),
                        message: err.to_string(),
                    }
                });
            }
            Ok(Ok(output)) => output,
        };

        let result = CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: exit_code(output.status),
        };

        info!(
            program = %spec.program,
            exit_code = result.exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "command finished"
        );

        Ok(result)
    }
}

fn apply_non_interactive_env(cmd: &mut Command) {
    cmd.env("NO_COLOR", "1");
    cmd.env("TERM", "dumb");
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
