//! ToolContext - shared collaborators for tool handlers

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::ToolError;
use crate::assistant::{AssistantInvoker, CliInvoker, InvokeRequest};
use crate::config::Config;
use crate::prompts::PromptLoader;

/// Execution context handed to every tool
///
/// Holds no per-call state; cloning is cheap.
#[derive(Clone)]
pub struct ToolContext {
    pub invoker: Arc<dyn AssistantInvoker>,
    pub prompts: Arc<PromptLoader>,
    pub config: Arc<Config>,
}

impl ToolContext {
    pub fn new(invoker: Arc<dyn AssistantInvoker>, prompts: Arc<PromptLoader>, config: Arc<Config>) -> Self {
        debug!("ToolContext::new: called");
        Self {
            invoker,
            prompts,
            config,
        }
    }

    /// Context backed by the real assistant CLI
    pub fn from_config(config: Config, prompts: PromptLoader) -> Self {
        let invoker = CliInvoker::from_config(&config.assistant);
        Self::new(Arc::new(invoker), Arc::new(prompts), Arc::new(config))
    }

    /// Render a prompt template
    pub fn render<T: Serialize>(&self, template: &str, context: &T) -> Result<String, ToolError> {
        self.prompts
            .render(template, context)
            .map_err(|e| ToolError::Unexpected(e.to_string()))
    }

    /// Send a prompt to the assistant and return its stdout
    ///
    /// A non-zero exit is turned into `ToolError::NonZeroExit`.
    pub async fn ask(&self, request: InvokeRequest) -> Result<String, ToolError> {
        debug!(timeout = ?request.timeout, "ToolContext::ask: called");
        let result = self.invoker.invoke(request).await?;
        if result.success() {
            Ok(result.stdout)
        } else {
            warn!(code = ?result.exit_code, "ToolContext::ask: assistant exited unsuccessfully");
            Err(ToolError::NonZeroExit {
                code: result.exit_code,
                stderr: result.stderr,
            })
        }
    }

    /// Send a `--prompt` request with a timeout in seconds
    pub async fn ask_prompt(&self, prompt: String, timeout_secs: u64) -> Result<String, ToolError> {
        self.ask(InvokeRequest::prompt(prompt, Duration::from_secs(timeout_secs)))
            .await
    }
}
