//! ask_gemini tool - free-form prompt passthrough

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::assistant::InvokeRequest;
use crate::tools::{ParamDefault, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolError};

const PARAMS: &[ParamSpec] = &[
    ParamSpec::required("prompt", ParamType::String, "Prompt to send to Gemini"),
    ParamSpec::optional(
        "include_all_files",
        ParamType::Boolean,
        "Include all files in context",
        ParamDefault::Bool(false),
    ),
];

/// Ask the assistant directly
pub struct AskGeminiTool;

#[async_trait]
impl Tool for AskGeminiTool {
    fn name(&self) -> &'static str {
        "ask_gemini"
    }

    fn description(&self) -> &'static str {
        "Ask Gemini directly for QA assistance"
    }

    fn params(&self) -> &'static [ParamSpec] {
        PARAMS
    }

    fn label(&self) -> &'static str {
        "Gemini request"
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let prompt = args.str("prompt")?;
        let include_all_files = args.bool("include_all_files")?;
        debug!(prompt_len = prompt.len(), include_all_files, "AskGeminiTool::execute: called");

        let mut request = InvokeRequest::prompt(prompt, Duration::from_secs(ctx.config.timeouts.ask_gemini));
        if include_all_files {
            request = request.with_arg("--all_files");
        }

        let response = ctx.ask(request).await?;
        Ok(format!("✅ Gemini Response:\n\n{}", response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::invoker::mock::MockInvoker;
    use crate::tools::context::test_support::mock_context;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_all_files_flag_passed() {
        let mock = Arc::new(MockInvoker::succeeding("pong"));
        let ctx = mock_context(mock.clone());
        let args = ToolArgs::resolve(PARAMS, &json!({"prompt": "ping", "include_all_files": true}));

        let out = AskGeminiTool.execute(&args, &ctx).await.unwrap();

        assert_eq!(out, "✅ Gemini Response:\n\npong");
        assert_eq!(mock.requests()[0].args, vec!["--prompt", "ping", "--all_files"]);
        assert_eq!(mock.requests()[0].timeout.as_secs(), 120);
    }

    #[tokio::test]
    async fn test_all_files_flag_absent_by_default() {
        let mock = Arc::new(MockInvoker::succeeding("pong"));
        let ctx = mock_context(mock.clone());
        let args = ToolArgs::resolve(PARAMS, &json!({"prompt": "ping"}));

        AskGeminiTool.execute(&args, &ctx).await.unwrap();

        assert_eq!(mock.requests()[0].args, vec!["--prompt", "ping"]);
    }

    #[tokio::test]
    async fn test_non_zero_exit() {
        let mock = Arc::new(MockInvoker::failing(3, ""));
        let ctx = mock_context(mock);
        let args = ToolArgs::resolve(PARAMS, &json!({"prompt": "ping"}));

        let err = AskGeminiTool.execute(&args, &ctx).await.unwrap_err();

        assert_eq!(err.to_string(), "Unknown error");
    }
}
