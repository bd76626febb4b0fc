// ABOUTME: produces a short plain-language explanation for a command's output.
// ABOUTME: template-based so results are reproducible; only the delay is simulated.

use async_trait::async_trait;

use crate::delay::DelayRange;
use crate::error::EngineError;

const ECHO_PREVIEW_CHARS: usize = 100;

const PERMISSION_DENIED: &str = "This error means you don't have sufficient permissions to perform this operation. You may need to use sudo (with caution) or change file permissions.";
const NOT_FOUND: &str = "The command or file was not found. Check that the name is spelled correctly and the file exists in the specified location.";
const NO_SUCH_FILE: &str =
    "The specified file or directory doesn't exist. Verify the path and filename are correct.";
const SUCCESS: &str = "Command executed successfully. The output shows the expected results.";

#[async_trait]
pub trait OutputExplainer: Send + Sync {
    async fn explain(
        &self,
        command: &str,
        output: &str,
        is_error: bool,
    ) -> Result<String, EngineError>;
}

#[derive(Debug, Clone)]
pub struct TemplateExplainer {
    delay: DelayRange,
}

impl TemplateExplainer {
    pub fn new(delay: DelayRange) -> Self {
        Self { delay }
    }

    pub fn instant() -> Self {
        Self::new(DelayRange::NONE)
    }
}

impl Default for TemplateExplainer {
    fn default() -> Self {
        Self::new(DelayRange::fixed(300))
    }
}

#[async_trait]
impl OutputExplainer for TemplateExplainer {
    async fn explain(
        &self,
        _command: &str,
        output: &str,
        is_error: bool,
    ) -> Result<String, EngineError> {
        self.delay.sleep().await;
        Ok(explain_output(output, is_error))
    }
}

pub fn explain_output(output: &str, is_error: bool) -> String {
    if !is_error {
        return SUCCESS.to_string();
    }

    if output.contains("permission denied") {
        return PERMISSION_DENIED.to_string();
    }
    if output.contains("not found") {
        return NOT_FOUND.to_string();
    }
    if output.contains("No such file") {
        return NO_SUCH_FILE.to_string();
    }

    let preview: String = output.chars().take(ECHO_PREVIEW_CHARS).collect();
    format!("This command encountered an error. The output suggests: {preview}...")
}
