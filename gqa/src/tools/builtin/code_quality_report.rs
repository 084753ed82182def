//! code_quality_report tool - project-wide quality report

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::prompts::QualityReportContext;
use crate::tools::files::{key_files, project_structure};
use crate::tools::{ParamDefault, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolError};

const PARAMS: &[ParamSpec] = &[
    ParamSpec::required("project_path", ParamType::String, "Project directory path"),
    ParamSpec::optional(
        "include_metrics",
        ParamType::Boolean,
        "Include quality metrics",
        ParamDefault::Bool(true),
    ),
];

/// Generate a comprehensive code quality report for a project
pub struct CodeQualityReportTool;

#[async_trait]
impl Tool for CodeQualityReportTool {
    fn name(&self) -> &'static str {
        "code_quality_report"
    }

    fn description(&self) -> &'static str {
        "Generate comprehensive code quality report"
    }

    fn params(&self) -> &'static [ParamSpec] {
        PARAMS
    }

    fn label(&self) -> &'static str {
        "Quality report generation"
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let project_path = args.str("project_path")?;
        let include_metrics = args.bool("include_metrics")?;
        debug!(%project_path, include_metrics, "CodeQualityReportTool::execute: called");

        let root = Path::new(project_path);
        if !root.exists() {
            return Err(ToolError::NotFound {
                kind: "Project path",
                path: project_path.to_string(),
            });
        }
        if !root.is_dir() {
            return Err(ToolError::InvalidArgument(format!("{} is not a directory", project_path)));
        }

        let limits = &ctx.config.report;
        let structure = project_structure(root, limits);
        let key_files = key_files(root, limits);
        info!(
            "Quality report for {}: {} structure lines, {} key files",
            project_path,
            structure.lines().count(),
            key_files.len()
        );

        let prompt = ctx.render(
            "code-quality-report",
            &QualityReportContext {
                project_path,
                include_metrics,
                structure: &structure,
                key_files: &key_files,
            },
        )?;
        let report = ctx.ask_prompt(prompt, ctx.config.timeouts.code_quality_report).await?;

        Ok(format!(
            "✅ Code quality report generated!\n\nProject: {}\nMetrics Included: {}\n\nGemini Quality Report:\n{}",
            project_path, include_metrics, report
        ))
    }
}
