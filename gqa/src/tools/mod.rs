//! QA tool system
//!
//! Each tool reads the files it is pointed at, renders a prompt template and
//! hands it to the external assistant through the `ToolContext`. The
//! `ToolExecutor` owns the fixed catalog and renders failures into text
//! payloads. Arguments are checked against each tool's declared parameters
//! with `validate_args` at the call boundary, before dispatch.

pub(crate) mod context;
mod error;
mod executor;
mod traits;

pub mod builtin;
pub mod files;

pub use context::ToolContext;
pub use error::ToolError;
pub use executor::{ToolDefinition, ToolExecutor};
pub use traits::{ParamDefault, ParamSpec, ParamType, Tool, ToolArgs, ToolResult, build_input_schema, validate_args};
