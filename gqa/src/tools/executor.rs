//! ToolExecutor - the fixed catalog of QA operations and their dispatch

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::builtin::{
    AskGeminiTool, CodeQualityReportTool, GenerateTestsTool, PerformanceAnalysisTool, ReviewCodeTool,
    SecurityAuditTool,
};
use super::{ParamSpec, Tool, ToolArgs, ToolContext, ToolError, ToolResult};

/// Public description of one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Owns the tool catalog and runs calls against it
pub struct ToolExecutor {
    tools: HashMap<String, Box<dyn Tool>>,
    /// Catalog order for listings
    order: Vec<String>,
}

impl ToolExecutor {
    /// Create executor with the six QA tools
    pub fn standard() -> Self {
        debug!("ToolExecutor::standard: called");
        let mut executor = Self::empty();
        executor.add_tool(Box::new(ReviewCodeTool));
        executor.add_tool(Box::new(GenerateTestsTool));
        executor.add_tool(Box::new(SecurityAuditTool));
        executor.add_tool(Box::new(PerformanceAnalysisTool));
        executor.add_tool(Box::new(CodeQualityReportTool));
        executor.add_tool(Box::new(AskGeminiTool));
        executor
    }

    /// Create an empty executor (for testing)
    pub fn empty() -> Self {
        debug!("ToolExecutor::empty: called");
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Add a tool to the executor
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        debug!(tool_name = %tool.name(), "ToolExecutor::add_tool: called");
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn definition(tool: &dyn Tool) -> ToolDefinition {
        ToolDefinition {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.input_schema(),
        }
    }

    /// Look up one operation by exact name
    pub fn spec(&self, name: &str) -> Option<ToolDefinition> {
        debug!(%name, "ToolExecutor::spec: called");
        self.tools.get(name).map(|t| Self::definition(t.as_ref()))
    }

    /// Declared parameters of one operation, for validation at the call boundary
    pub fn params(&self, name: &str) -> Option<&'static [ParamSpec]> {
        self.tools.get(name).map(|t| t.params())
    }

    /// All operations in catalog order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        debug!("ToolExecutor::definitions: called");
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| Self::definition(t.as_ref()))
            .collect()
    }

    /// Execute a tool call
    ///
    /// Arguments are expected to have been checked against `params` by the
    /// caller. Returns `Err` only for an unknown tool; every failure after
    /// dispatch is rendered into an error `ToolResult`.
    pub async fn execute(&self, name: &str, input: &Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        debug!(tool_name = %name, "ToolExecutor::execute: called");
        let tool = match self.tools.get(name) {
            Some(tool) => tool,
            None => {
                debug!("ToolExecutor::execute: unknown tool");
                return Err(ToolError::UnknownTool { name: name.to_string() });
            }
        };

        let args = ToolArgs::resolve(tool.params(), input);

        info!("Running {}", name);
        match tool.execute(&args, ctx).await {
            Ok(content) => {
                debug!("ToolExecutor::execute: tool succeeded");
                Ok(ToolResult::success(content))
            }
            Err(e) => {
                warn!("{} failed: {}", name, e);
                Ok(render_failure(tool.as_ref(), &args, &e))
            }
        }
    }
}

/// `❌ <Label> failed: <error>` followed by the echoed parameters
fn render_failure(tool: &dyn Tool, args: &ToolArgs, err: &ToolError) -> ToolResult {
    let echo = args.echo(tool.params());
    let content = if echo.is_empty() {
        format!("❌ {} failed: {}", tool.label(), err)
    } else {
        format!("❌ {} failed: {}\n\n{}", tool.label(), err, echo)
    };
    ToolResult::error(content)
}
