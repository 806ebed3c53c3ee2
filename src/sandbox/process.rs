//! Process-backed sandbox: one interpreter process per program, hard deadline.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use super::Executor;
use super::artifact::ScratchArtifact;
use crate::domain::{ExecutionResult, NO_EXIT_CODE, TimeoutSecs};

/// Default cap on captured bytes per output stream.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 1_000_000;

/// How long to keep reading output after the program itself has exited.
const OUTPUT_GRACE: Duration = Duration::from_millis(250);

/// Configuration for the process sandbox
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Interpreter used to run the program (looked up on PATH if relative)
    pub interpreter: PathBuf,
    /// Extra arguments placed before the program path
    pub interpreter_args: Vec<String>,
    /// Directory where scratch artifacts are written
    pub scratch_dir: PathBuf,
    /// File extension of scratch artifacts
    pub artifact_extension: String,
    /// Cap on captured bytes per stream
    pub max_output_bytes: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from("python3"),
            interpreter_args: Vec::new(),
            scratch_dir: std::env::temp_dir(),
            artifact_extension: "py".to_string(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl SandboxConfig {
    /// Config for the given interpreter, other fields defaulted
    pub fn with_interpreter(interpreter: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            artifact_extension: extension.into(),
            ..Default::default()
        }
    }

    /// Set the scratch directory
    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Set the per-stream output cap
    pub fn max_output_bytes(mut self, max: usize) -> Self {
        self.max_output_bytes = max;
        self
    }
}

/// Runs each program as a separate interpreter process.
///
/// Not an isolation boundary: the child shares the caller's user, network and
/// filesystem. What it guarantees is the deadline and removal of the scratch
/// file on every path.
#[derive(Debug, Clone, Default)]
pub struct ProcessSandbox {
    config: SandboxConfig,
}

impl ProcessSandbox {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Resolve the configured interpreter to an executable path
    pub fn resolve_interpreter(&self) -> Option<PathBuf> {
        which::which(&self.config.interpreter).ok()
    }

    async fn run_artifact(&self, path: &Path, timeout: TimeoutSecs) -> ExecutionResult {
        let spawned = Command::new(&self.config.interpreter)
            .args(&self.config.interpreter_args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("Sandbox: failed to start {}: {}", self.config.interpreter.display(), e);
                return ExecutionResult::launch_failed(format!(
                    "Failed to start {}: {}",
                    self.config.interpreter.display(),
                    e
                ));
            }
        };

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let mut out = Vec::new();
        let mut err = Vec::new();

        let finish = {
            let wait = child.wait();
            // Drain both pipes while waiting so a chatty program cannot block on a full pipe.
            let reads = async {
                let (o, e) = tokio::join!(drain(stdout.as_mut(), &mut out), drain(stderr.as_mut(), &mut err));
                o.and(e)
            };
            let deadline = tokio::time::sleep(timeout.as_duration());
            tokio::pin!(wait, reads, deadline);

            let mut reads_done = false;
            let finish = loop {
                tokio::select! {
                    status = &mut wait => break Finish::Exited(status),
                    read = &mut reads, if !reads_done => {
                        reads_done = true;
                        if let Err(e) = read {
                            debug!("Sandbox: reading program output failed: {}", e);
                        }
                    }
                    _ = &mut deadline => break Finish::DeadlineExceeded,
                }
            };

            // Background processes can inherit the pipes and keep them open after exit
            if matches!(finish, Finish::Exited(Ok(_))) && !reads_done {
                match tokio::time::timeout(OUTPUT_GRACE, &mut reads).await {
                    Ok(Err(e)) => debug!("Sandbox: reading program output failed: {}", e),
                    Ok(Ok(())) => {}
                    Err(_) => warn!(
                        "Sandbox: output still open {:?} after exit, keeping what was captured",
                        OUTPUT_GRACE
                    ),
                }
            }
            finish
        };

        match finish {
            Finish::Exited(Ok(status)) => {
                let exit_code = status.code().unwrap_or(NO_EXIT_CODE);
                info!("Sandbox: program exited with status {}", exit_code);
                ExecutionResult::completed(
                    exit_code,
                    capped_text(&out, self.config.max_output_bytes),
                    capped_text(&err, self.config.max_output_bytes),
                )
            }
            Finish::Exited(Err(e)) => {
                warn!("Sandbox: failed while waiting for program: {}", e);
                if let Err(e) = child.kill().await {
                    debug!("Sandbox: kill after wait failure failed: {}", e);
                }
                ExecutionResult::launch_failed(format!("Failed to wait for program: {}", e))
            }
            Finish::DeadlineExceeded => {
                warn!("Sandbox: deadline of {} exceeded, killing program", timeout);
                if let Err(e) = child.kill().await {
                    debug!("Sandbox: kill after deadline failed: {}", e);
                }
                ExecutionResult::deadline_exceeded(timeout.as_secs())
            }
        }
    }
}

enum Finish {
    Exited(io::Result<ExitStatus>),
    DeadlineExceeded,
}

#[async_trait]
impl Executor for ProcessSandbox {
    async fn execute(&self, source_code: &str, timeout: TimeoutSecs) -> ExecutionResult {
        info!(
            "Sandbox: running {} byte program with {} ({} deadline)",
            source_code.len(),
            self.config.interpreter.display(),
            timeout
        );

        let artifact = match ScratchArtifact::create(&self.config.scratch_dir, &self.config.artifact_extension, source_code)
        {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("Sandbox: could not materialize program: {}", e);
                return ExecutionResult::launch_failed(format!(
                    "Failed to write program to {}: {}",
                    self.config.scratch_dir.display(),
                    e
                ));
            }
        };

        let result = self.run_artifact(artifact.path(), timeout).await;
        drop(artifact);
        result
    }
}

/// Append everything `stream` yields to `buf`; bytes read before a cancel are kept.
async fn drain<R: AsyncRead + Unpin>(stream: Option<&mut R>, buf: &mut Vec<u8>) -> io::Result<()> {
    let Some(stream) = stream else {
        return Ok(());
    };
    let mut chunk = [0u8; 8192];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Lossy-decode captured bytes, truncating past `max_bytes`.
fn capped_text(bytes: &[u8], max_bytes: usize) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.len() > max_bytes {
        let mut cut = max_bytes;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("\n... [output truncated]");
    }
    text
}
