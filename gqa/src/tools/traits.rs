//! Tool trait and the declarative parameter schema

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::ToolError;
use super::context::ToolContext;

/// Primitive JSON type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Boolean,
}

impl ParamType {
    /// JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
        }
    }

    /// Check whether a JSON value has this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// Default value of an optional parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    None,
    Str(&'static str),
    Bool(bool),
}

impl ParamDefault {
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Str(s) => Some(Value::String(s.to_string())),
            Self::Bool(b) => Some(Value::Bool(*b)),
        }
    }
}

/// One declared parameter of a tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
    pub required: bool,
    pub default: ParamDefault,
}

impl ParamSpec {
    pub const fn required(name: &'static str, param_type: ParamType, description: &'static str) -> Self {
        Self {
            name,
            param_type,
            description,
            required: true,
            default: ParamDefault::None,
        }
    }

    pub const fn optional(
        name: &'static str,
        param_type: ParamType,
        description: &'static str,
        default: ParamDefault,
    ) -> Self {
        Self {
            name,
            param_type,
            description,
            required: false,
            default,
        }
    }
}

/// Build a JSON Schema object from parameter declarations
pub fn build_input_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    for param in params {
        let mut prop = json!({
            "type": param.param_type.as_str(),
            "description": param.description,
        });
        if let Some(default) = param.default.to_value() {
            prop["default"] = default;
        }
        properties.insert(param.name.to_string(), prop);
    }

    let required: Vec<&str> = params.iter().filter(|p| p.required).map(|p| p.name).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Check call arguments against parameter declarations
///
/// Required parameters must be present and every declared parameter that is
/// present must have its declared type. Undeclared keys are ignored.
pub fn validate_args(params: &[ParamSpec], input: &Value) -> Result<(), ToolError> {
    debug!("validate_args: called");
    let empty = Map::new();
    let object = match input {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => return Err(ToolError::InvalidArgument("arguments must be an object".to_string())),
    };

    for param in params {
        match object.get(param.name).filter(|v| !v.is_null()) {
            None if param.required => {
                return Err(ToolError::InvalidArgument(format!("{} is required", param.name)));
            }
            Some(value) if !param.param_type.matches(value) => {
                return Err(ToolError::InvalidArgument(format!(
                    "{} must be a {}",
                    param.name,
                    param.param_type.as_str()
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Arguments of one call, with declared defaults applied
#[derive(Debug, Clone)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    /// Overlay the caller's arguments on the declared defaults
    pub fn resolve(params: &[ParamSpec], input: &Value) -> Self {
        debug!("ToolArgs::resolve: called");
        let mut values = Map::new();
        for param in params {
            let given = input.get(param.name).filter(|v| !v.is_null()).cloned();
            if let Some(value) = given.or_else(|| param.default.to_value()) {
                values.insert(param.name.to_string(), value);
            }
        }
        Self { values }
    }

    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArgument(format!("{} must be a string", name)))
    }

    pub fn bool(&self, name: &str) -> Result<bool, ToolError> {
        self.values
            .get(name)
            .and_then(Value::as_bool)
            .ok_or_else(|| ToolError::InvalidArgument(format!("{} must be a boolean", name)))
    }

    /// `name: value` lines in declaration order, for echoing in responses
    pub fn echo(&self, params: &[ParamSpec]) -> String {
        params
            .iter()
            .filter_map(|p| {
                self.values.get(p.name).map(|v| match v {
                    Value::String(s) => format!("{}: {}", p.name, s),
                    other => format!("{}: {}", p.name, other),
                })
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A QA operation backed by the external assistant
#[async_trait]
pub trait Tool: Send + Sync {
    /// Operation name as exposed to callers
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Declared parameters
    fn params(&self) -> &'static [ParamSpec];

    /// Operation label used in failure messages, e.g. "Code review"
    fn label(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value {
        build_input_schema(self.params())
    }

    /// Run the operation and return the success payload
    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError>;
}

/// Result of a tool execution
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        debug!("ToolResult::success: called");
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(content: impl Into<String>) -> Self {
        debug!("ToolResult::error: called");
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}
