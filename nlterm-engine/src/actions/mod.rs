// ABOUTME: defines the executor seam between the session and whatever actually runs commands.
// ABOUTME: provides a real shell-backed executor and a deterministic mock for non-desktop use.

pub mod exec;
pub mod mock;

use async_trait::async_trait;
use nlterm_common::{ExecOutcome, ShellType};

use crate::error::EngineError;

#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs one already-validated command. Timeouts and output overflow are
    /// reported through the returned outcome, not as errors.
    async fn execute(&self, command: &str, shell: ShellType) -> Result<ExecOutcome, EngineError>;
}
