//! review_code tool - focused code review of a single file

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::prompts::{ReviewContext, ReviewType};
use crate::tools::files::read_source;
use crate::tools::{ParamDefault, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolError};

const PARAMS: &[ParamSpec] = &[
    ParamSpec::required("file_path", ParamType::String, "Path to code file to review"),
    ParamSpec::optional(
        "review_type",
        ParamType::String,
        "Type of review (security, performance, style, general)",
        ParamDefault::Str("general"),
    ),
];

/// Review a code file for security, performance, style or overall quality
pub struct ReviewCodeTool;

#[async_trait]
impl Tool for ReviewCodeTool {
    fn name(&self) -> &'static str {
        "review_code"
    }

    fn description(&self) -> &'static str {
        "Review code quality using Gemini CLI"
    }

    fn params(&self) -> &'static [ParamSpec] {
        PARAMS
    }

    fn label(&self) -> &'static str {
        "Code review"
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let file_path = args.str("file_path")?;
        let review_type = args.str("review_type")?;
        debug!(%file_path, %review_type, "ReviewCodeTool::execute: called");

        let code = read_source(Path::new(file_path), "File").await?;
        let template = ReviewType::from_label(review_type).template_name();
        let prompt = ctx.render(
            template,
            &ReviewContext {
                file_path,
                code: &code,
            },
        )?;

        info!("Reviewing {} ({})", file_path, review_type);
        let analysis = ctx.ask_prompt(prompt, ctx.config.timeouts.review_code).await?;

        Ok(format!(
            "✅ Code review completed!\n\nFile: {}\nReview Type: {}\n\nGemini Analysis:\n{}",
            file_path, review_type, analysis
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::invoker::mock::MockInvoker;
    use crate::tools::context::test_support::mock_context;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_security_review() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.py");
        fs::write(&path, "print(1)").unwrap();
        let path = path.to_str().unwrap().to_string();

        let mock = Arc::new(MockInvoker::succeeding("No issues."));
        let ctx = mock_context(mock.clone());
        let args = ToolArgs::resolve(PARAMS, &json!({"file_path": path, "review_type": "security"}));

        let out = ReviewCodeTool.execute(&args, &ctx).await.unwrap();

        let prompt = mock.prompt(0).unwrap();
        assert!(prompt.contains("print(1)"));
        assert!(prompt.contains("security review"));
        assert!(out.starts_with("✅ Code review completed!"));
        assert!(out.contains("a.py"));
        assert!(out.contains("Review Type: security"));
        assert!(out.ends_with("Gemini Analysis:\nNo issues."));
        assert_eq!(mock.requests()[0].timeout.as_secs(), 90);
    }

    #[tokio::test]
    async fn test_unknown_review_type_uses_general_template() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("b.rs");
        fs::write(&path, "fn main() {}").unwrap();

        let mock = Arc::new(MockInvoker::succeeding("ok"));
        let ctx = mock_context(mock.clone());
        let args = ToolArgs::resolve(
            PARAMS,
            &json!({"file_path": path.to_str().unwrap(), "review_type": "architecture"}),
        );

        let out = ReviewCodeTool.execute(&args, &ctx).await.unwrap();

        assert!(mock.prompt(0).unwrap().contains("comprehensive code review"));
        assert!(out.contains("Review Type: architecture"));
    }

    #[tokio::test]
    async fn test_missing_file_never_invokes() {
        let mock = Arc::new(MockInvoker::succeeding("unused"));
        let ctx = mock_context(mock.clone());
        let args = ToolArgs::resolve(PARAMS, &json!({"file_path": "/no/such/file.py"}));

        let err = ReviewCodeTool.execute(&args, &ctx).await.unwrap_err();

        assert!(err.to_string().contains("not found"));
        assert_eq!(mock.call_count(), 0);
    }
}
