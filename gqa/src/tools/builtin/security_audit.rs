//! security_audit tool - audit a file or every source file under a directory

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::prompts::ReviewContext;
use crate::tools::files::{collect_audit_files, read_source};
use crate::tools::{ParamDefault, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolError};

const PARAMS: &[ParamSpec] = &[
    ParamSpec::required("target_path", ParamType::String, "File or directory path to audit"),
    ParamSpec::optional(
        "audit_level",
        ParamType::String,
        "Audit depth (quick, deep)",
        ParamDefault::Str("quick"),
    ),
];

/// Perform a security audit, one assistant call per file
pub struct SecurityAuditTool;

impl SecurityAuditTool {
    /// Files to audit for a target; unknown levels get the quick limit
    fn targets(target: &Path, audit_level: &str, ctx: &ToolContext) -> Result<Vec<PathBuf>, ToolError> {
        if target.is_file() {
            return Ok(vec![target.to_path_buf()]);
        }
        if !target.is_dir() {
            return Err(ToolError::NotFound {
                kind: "Path",
                path: target.display().to_string(),
            });
        }

        let limits = &ctx.config.audit;
        let max_files = match audit_level {
            "deep" => limits.deep_max_files,
            _ => limits.quick_max_files,
        };
        Ok(collect_audit_files(target, max_files))
    }

    async fn audit_file(path: &Path, ctx: &ToolContext) -> Result<String, ToolError> {
        debug!(?path, "SecurityAuditTool::audit_file: called");
        let code = read_source(path, "File").await?;
        let file_path = path.to_string_lossy();
        let prompt = ctx.render(
            "security-audit",
            &ReviewContext {
                file_path: &file_path,
                code: &code,
            },
        )?;
        ctx.ask_prompt(prompt, ctx.config.timeouts.security_audit_per_file).await
    }
}

#[async_trait]
impl Tool for SecurityAuditTool {
    fn name(&self) -> &'static str {
        "security_audit"
    }

    fn description(&self) -> &'static str {
        "Perform security audit on code"
    }

    fn params(&self) -> &'static [ParamSpec] {
        PARAMS
    }

    fn label(&self) -> &'static str {
        "Security audit"
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let target_path = args.str("target_path")?;
        let audit_level = args.str("audit_level")?;
        debug!(%target_path, %audit_level, "SecurityAuditTool::execute: called");

        let files = Self::targets(Path::new(target_path), audit_level, ctx)?;
        info!("Auditing {} file(s) under {}", files.len(), target_path);

        let mut sections = Vec::with_capacity(files.len());
        for file in &files {
            let shown = file.display();
            match Self::audit_file(file, ctx).await {
                Ok(findings) => sections.push(format!("📁 File: {}\n{}\n{}", shown, findings, "=".repeat(80))),
                Err(e) => {
                    warn!("Failed to audit {}: {}", shown, e);
                    sections.push(format!("❌ Failed to audit {}: {}", shown, e));
                }
            }
        }

        Ok(format!(
            "✅ Security audit completed!\n\nTarget: {}\nAudited Files: {}\nAudit Level: {}\n\n{}",
            target_path,
            files.len(),
            audit_level,
            sections.join("\n\n")
        ))
    }
}
