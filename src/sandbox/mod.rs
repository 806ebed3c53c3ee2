//! Execution sandbox
//!
//! Runs one program at a time as a separate process under a hard wall-clock
//! deadline and reports stdout, stderr and exit status. Every failure mode
//! (non-zero exit, deadline, launch failure) comes back as an
//! `ExecutionResult`; nothing here returns an error to the caller.

mod artifact;
mod process;

pub use artifact::ScratchArtifact;
pub use process::{DEFAULT_MAX_OUTPUT_BYTES, ProcessSandbox, SandboxConfig};

use async_trait::async_trait;

use crate::domain::{ExecutionResult, TimeoutSecs};

/// Something that can run a program and report how it went
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `source_code` to completion or until `timeout` elapses.
    async fn execute(&self, source_code: &str, timeout: TimeoutSecs) -> ExecutionResult;
}
