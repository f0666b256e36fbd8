//! External tool invocation.
//!
//! Runs one toolchain program inside a job's scratch directory with stderr
//! captured to the error-log artifact. Exit codes are reported upward
//! without interpretation; deciding what a non-zero exit means is the
//! pipeline's concern.

use std::process::Stdio;

use camino::{Utf8Path, Utf8PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::{BuildFault, Result};

/// One external program invocation.
#[derive(Debug)]
pub struct ToolInvocation {
    /// Program name or path.
    pub program: String,
    /// Arguments, usually bare artifact file names relative to `cwd`.
    pub args: Vec<String>,
    /// Working directory: the job's scratch directory.
    pub cwd: Utf8PathBuf,
    /// File receiving the program's stderr.
    pub stderr_to: Utf8PathBuf,
    /// File receiving the program's stdout; discarded when `None`.
    pub stdout_to: Option<Utf8PathBuf>,
}

/// How a tool run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process ran to completion with this exit code.
    Exited { code: i32 },
    /// Cancellation was observed before the spawn, during the wait, or
    /// right after it.
    Cancelled,
}

/// Run one tool to completion, or kill it on cancellation.
///
/// The cancel token is checked before spawning and after the wait, and the
/// wait itself races against it; a cancelled wait kills the child rather
/// than abandoning it. Failure to launch the program at all is a
/// [`BuildFault::Launch`], distinct from any exit code.
pub async fn run_tool(invocation: &ToolInvocation, cancel: &CancelToken) -> Result<RunOutcome> {
    if cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
    }

    let stderr = redirect_file(&invocation.stderr_to, "stderr")?;
    let stdout = match &invocation.stdout_to {
        Some(path) => Stdio::from(redirect_file(path, "stdout")?),
        None => Stdio::null(),
    };

    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .current_dir(&invocation.cwd)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(Stdio::from(stderr))
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| BuildFault::Launch {
            program: invocation.program.clone(),
            source,
        })?;

    debug!(program = %invocation.program, args = ?invocation.args, "spawned tool");

    let waited = tokio::select! {
        status = child.wait() => Some(status),
        _ = cancel.cancelled() => None,
    };

    let status = match waited {
        Some(status) => status.map_err(|source| BuildFault::Wait {
            program: invocation.program.clone(),
            source,
        })?,
        None => {
            // An aborted wait must not leave the child running.
            let _ = child.start_kill();
            let _ = child.wait().await;
            debug!(program = %invocation.program, "tool killed on cancellation");
            return Ok(RunOutcome::Cancelled);
        }
    };

    if cancel.is_cancelled() {
        return Ok(RunOutcome::Cancelled);
    }

    Ok(RunOutcome::Exited {
        code: status.code().unwrap_or(-1),
    })
}

fn redirect_file(path: &Utf8Path, stream: &'static str) -> Result<std::fs::File> {
    std::fs::File::create(path).map_err(|source| BuildFault::OpenRedirect {
        stream,
        path: path.to_owned(),
        source,
    })
}
