use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::process::ProcessError;

/// Capacity of the per-process event channel.
const EVENT_BUFFER: usize = 256;

/// One observation of a running child process.
///
/// A stream always begins with [`CommandEvent::Started`] and ends with
/// exactly one [`CommandEvent::Exited`] or [`CommandEvent::Failed`]. Lines
/// keep their order within each pipe; stdout and stderr interleave in
/// delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
    Started,
    StdoutLine(String),
    StderrLine(String),
    /// Exit code; `-1` when the process was terminated by a signal.
    Exited(i32),
    /// Output or exit status could not be observed; the lines seen so far
    /// are incomplete.
    Failed(String),
}

/// Abstraction over child process execution for testability.
///
/// Production code uses [`TokioProcessRunner`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner: Send + Sync {
    /// Launch `program` and stream its events. The exit code is reported,
    /// never validated.
    async fn spawn(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<mpsc::Receiver<CommandEvent>, ProcessError>;

    /// Run a credential-bearing command with all output discarded.
    ///
    /// Returns `true` when the command exited with a non-zero code.
    async fn run_quiet(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<bool, ProcessError>;

    /// Run a short query command and capture its stdout.
    async fn capture(&self, program: &str, args: &[String]) -> Result<String, ProcessError>;
}

/// Real executor backed by `tokio::process`.
pub struct TokioProcessRunner;

impl ProcessRunner for TokioProcessRunner {
    async fn spawn(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<mpsc::Receiver<CommandEvent>, ProcessError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProcessError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let program = program.to_owned();

        tokio::spawn(async move {
            if tx.send(CommandEvent::Started).await.is_err() {
                tracing::debug!(%program, "event receiver dropped before start");
                return;
            }

            let readers = [
                stdout.map(|pipe| tokio::spawn(forward_lines(pipe, tx.clone(), CommandEvent::StdoutLine))),
                stderr.map(|pipe| tokio::spawn(forward_lines(pipe, tx.clone(), CommandEvent::StderrLine))),
            ];
            for reader in readers.into_iter().flatten() {
                let failure = match reader.await {
                    Ok(Ok(())) => continue,
                    Ok(Err(e)) => format!("failed to read output: {e}"),
                    Err(e) => format!("output reader task failed: {e}"),
                };
                tracing::warn!(%program, %failure, "process output incomplete");
                if tx.send(CommandEvent::Failed(failure)).await.is_err() {
                    tracing::debug!(%program, "event receiver dropped before failure");
                }
                return;
            }

            let last = match child.wait().await {
                Ok(status) => CommandEvent::Exited(exit_code(status)),
                Err(e) => CommandEvent::Failed(format!("failed to wait for process: {e}")),
            };

            if tx.send(last).await.is_err() {
                tracing::debug!(%program, "event receiver dropped before exit");
            }
        });

        Ok(rx)
    }

    async fn run_quiet(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<bool, ProcessError> {
        let status = Command::new(program)
            .args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| ProcessError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        Ok(!status.success())
    }

    async fn capture(&self, program: &str, args: &[String]) -> Result<String, ProcessError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProcessError::NotFound {
                program: program.to_owned(),
                source: e,
            })?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| ProcessError::InvalidUtf8 {
                program: program.to_owned(),
                source: e,
            })
        } else {
            Err(ProcessError::CommandFailed {
                program: program.to_owned(),
                args: args.to_vec(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => {
            tracing::warn!(%status, "process terminated by a signal");
            -1
        }
    }
}

/// Forward each line of `pipe` as an event until EOF or the receiver goes away.
async fn forward_lines<R>(
    pipe: R,
    tx: mpsc::Sender<CommandEvent>,
    wrap: fn(String) -> CommandEvent,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']).to_owned();
        if tx.send(wrap(line)).await.is_err() {
            return Ok(());
        }
    }
}
