// ABOUTME: executes a command through the host shell with bounded runtime and output.
// ABOUTME: timeouts, overflow and spawn failures all resolve to structured outcomes.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use nlterm_common::{ExecOutcome, ShellType};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use super::CommandExecutor;
use crate::error::EngineError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ShellExecutor {
    timeout: Duration,
    max_output_bytes: usize,
}

impl ShellExecutor {
    pub fn new(timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            timeout,
            max_output_bytes,
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, DEFAULT_MAX_OUTPUT_BYTES)
    }
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn execute(&self, command: &str, shell: ShellType) -> Result<ExecOutcome, EngineError> {
        Ok(run(command, shell, self.timeout, self.max_output_bytes).await)
    }
}

struct Captured {
    bytes: Vec<u8>,
    overflowed: bool,
}

pub async fn run(
    command: &str,
    shell: ShellType,
    timeout: Duration,
    max_output_bytes: usize,
) -> ExecOutcome {
    let started = Instant::now();
    let (program, flags) = shell.invocation();

    let mut cmd = Command::new(program);
    cmd.args(flags)
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            warn!(%program, error = %err, "spawn failed");
            return failure(format!("exec failed: {err}"), started);
        }
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let finished = tokio::time::timeout(timeout, async {
        let (out, err) = tokio::join!(
            read_capped(stdout, max_output_bytes),
            read_capped(stderr, max_output_bytes)
        );
        let (out, err) = (out?, err?);
        if out.overflowed || err.overflowed {
            let _ = child.start_kill();
        }
        let status = child.wait().await?;
        Ok::<_, std::io::Error>((out, err, status))
    })
    .await;

    let (out, err, status) = match finished {
        Ok(Ok(parts)) => parts,
        Ok(Err(err)) => return failure(format!("exec failed: {err}"), started),
        Err(_) => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            warn!(timeout_secs = timeout.as_secs_f64(), "command timed out");
            return failure(
                format!("command timed out after {}s", timeout.as_secs_f64()),
                started,
            );
        }
    };

    let execution_time_ms = elapsed_ms(started);
    let stdout_text = String::from_utf8_lossy(&out.bytes).to_string();
    let stderr_text = String::from_utf8_lossy(&err.bytes).to_string();

    if out.overflowed || err.overflowed {
        let note = format!("[output exceeded {max_output_bytes} bytes]");
        warn!(max_output_bytes, "command output overflowed");
        return ExecOutcome {
            success: false,
            output: append_line(&stdout_text, &note),
            stderr: (!stderr_text.is_empty()).then(|| append_line(&stderr_text, &note)),
            execution_time_ms,
            exit_code: None,
        };
    }

    let exit_code = status.code();
    debug!(?exit_code, execution_time_ms, "command finished");

    let output = if !status.success() && stdout_text.is_empty() && stderr_text.is_empty() {
        match exit_code {
            Some(code) => format!("command exited with status {code}"),
            None => "command terminated by signal".to_string(),
        }
    } else {
        stdout_text
    };

    ExecOutcome {
        success: status.success(),
        output,
        stderr: (!stderr_text.is_empty()).then_some(stderr_text),
        execution_time_ms,
        exit_code,
    }
}

async fn read_capped<R: AsyncRead + Unpin>(
    reader: Option<R>,
    cap: usize,
) -> std::io::Result<Captured> {
    let mut bytes = Vec::new();
    if let Some(reader) = reader {
        // Reading one byte past the cap is enough to detect overflow; dropping
        // the pipe afterwards stops a chatty child.
        let mut limited = reader.take(cap as u64 + 1);
        limited.read_to_end(&mut bytes).await?;
    }
    let overflowed = bytes.len() > cap;
    bytes.truncate(cap);
    Ok(Captured { bytes, overflowed })
}

fn failure(message: String, started: Instant) -> ExecOutcome {
    ExecOutcome {
        success: false,
        output: message,
        stderr: None,
        execution_time_ms: elapsed_ms(started),
        exit_code: None,
    }
}

fn append_line(text: &str, line: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        format!("{text}{line}")
    } else {
        format!("{text}\n{line}")
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
