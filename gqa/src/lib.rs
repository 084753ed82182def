//! Gemini QA Agent - code quality operations over MCP
//!
//! Exposes six QA operations (code review, test generation, security audit,
//! performance analysis, project quality report and a free-form prompt) to
//! MCP clients. Each operation reads the files it is pointed at, renders a
//! prompt template and runs the Gemini CLI as a bounded child process.
//!
//! # Modules
//!
//! - [`assistant`] - Locating and running the external assistant executable
//! - [`prompts`] - Handlebars prompt templates with user overrides
//! - [`tools`] - The tool catalog, handlers and failure rendering
//! - [`mcp`] - MCP server over stdio, built on `rmcp`
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface and preflight checks

pub mod assistant;
pub mod cli;
pub mod config;
pub mod mcp;
pub mod prompts;
pub mod tools;

// Re-export commonly used types
pub use assistant::{AssistantInvoker, CliInvoker, InvokeError, InvokeRequest, ProcessResult};
pub use config::Config;
pub use mcp::QaServer;
pub use prompts::PromptLoader;
pub use tools::{ToolContext, ToolError, ToolExecutor, ToolResult};
