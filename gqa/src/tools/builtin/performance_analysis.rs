//! performance_analysis tool - language-aware performance analysis

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::prompts::PerformanceContext;
use crate::tools::files::read_source;
use crate::tools::{ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolError};

const PARAMS: &[ParamSpec] = &[
    ParamSpec::required("file_path", ParamType::String, "Code file to analyze"),
    ParamSpec::required("language", ParamType::String, "Programming language"),
];

/// Analyze code performance and suggest optimizations
pub struct PerformanceAnalysisTool;

#[async_trait]
impl Tool for PerformanceAnalysisTool {
    fn name(&self) -> &'static str {
        "performance_analysis"
    }

    fn description(&self) -> &'static str {
        "Analyze code performance and suggest optimizations"
    }

    fn params(&self) -> &'static [ParamSpec] {
        PARAMS
    }

    fn label(&self) -> &'static str {
        "Performance analysis"
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let file_path = args.str("file_path")?;
        let language = args.str("language")?;
        debug!(%file_path, %language, "PerformanceAnalysisTool::execute: called");

        let code = read_source(Path::new(file_path), "File").await?;
        let prompt = ctx.render(
            "performance-analysis",
            &PerformanceContext {
                file_path,
                language,
                code: &code,
            },
        )?;
        let analysis = ctx.ask_prompt(prompt, ctx.config.timeouts.performance_analysis).await?;

        Ok(format!(
            "✅ Performance analysis completed!\n\nFile: {}\nLanguage: {}\n\nGemini Performance Analysis:\n{}",
            file_path, language, analysis
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
    async fn test_analysis() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("loop.go");
        fs::write(&path, "for i := range xs { sort(xs) }").unwrap();

        let mock = Arc::new(MockInvoker::succeeding("Hoist the sort out of the loop."));
        let ctx = mock_context(mock.clone());
        let args = ToolArgs::resolve(PARAMS, &json!({"file_path": path.to_str().unwrap(), "language": "go"}));

        let out = PerformanceAnalysisTool.execute(&args, &ctx).await.unwrap();

        assert!(out.starts_with("✅ Performance analysis completed!"));
        assert!(out.contains("Language: go"));
        assert!(out.ends_with("Gemini Performance Analysis:\nHoist the sort out of the loop."));
        let prompt = mock.prompt(0).unwrap();
        assert!(prompt.starts_with("Analyze this go code"));
        assert!(prompt.contains("for i := range xs { sort(xs) }"));
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("slow.py");
        fs::write(&path, "pass").unwrap();

        let mock = Arc::new(MockInvoker::with(|req| {
            Err(crate::assistant::InvokeError::Timeout { timeout: req.timeout })
        }));
        let ctx = mock_context(mock);
        let args = ToolArgs::resolve(PARAMS, &json!({"file_path": path.to_str().unwrap(), "language": "python"}));

        let err = PerformanceAnalysisTool.execute(&args, &ctx).await.unwrap_err();

        assert!(matches!(err, ToolError::Timeout { timeout_secs: 90 }));
    }
}
