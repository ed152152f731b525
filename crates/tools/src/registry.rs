//! Tool registry and dispatcher.
//!
//! One registry serves every transport shape: adapters extract a tool name
//! plus a raw argument map and hand both to `dispatch`. Nothing here knows
//! which endpoint shape the caller used, and no handler logic lives in the
//! adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use bookery_core::config::ArgumentMode;
use bookery_core::domain::tool::{ArgValue, ParamSpec, ParamType, ToolArgs, ToolDescriptor, ToolResult};
use bookery_core::errors::DispatchError;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    /// Domain failures come back as `success = false` results; only the
    /// dispatcher itself raises errors, and only before a handler runs.
    async fn execute(&self, args: ToolArgs) -> ToolResult;
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Box<dyn ToolHandler>,
}

/// Process-wide mapping from tool name to handler. Populated once at
/// startup, read-only afterwards.
pub struct ToolRegistry {
    tools: HashMap<&'static str, RegisteredTool>,
    mode: ArgumentMode,
}

impl ToolRegistry {
    pub fn new(mode: ArgumentMode) -> Self {
        Self { tools: HashMap::new(), mode }
    }

    pub fn register<T>(&mut self, handler: T)
    where
        T: ToolHandler + 'static,
    {
        let descriptor = handler.descriptor();
        self.tools
            .insert(descriptor.name, RegisteredTool { descriptor, handler: Box::new(handler) });
    }

    pub fn mode(&self) -> ArgumentMode {
        self.mode
    }

    /// Static metadata for discovery, sorted by name for stable output.
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        let mut all: Vec<_> = self.tools.values().map(|tool| &tool.descriptor).collect();
        all.sort_by_key(|descriptor| descriptor.name);
        all
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn dispatch(
        &self,
        name: &str,
        raw: &Map<String, Value>,
    ) -> Result<ToolResult, DispatchError> {
        if name.trim().is_empty() {
            return Err(DispatchError::MissingToolName);
        }

        // Exact, case-sensitive lookup.
        let tool =
            self.tools.get(name).ok_or_else(|| DispatchError::UnknownTool(name.to_string()))?;

        let args = normalize_arguments(&tool.descriptor, raw, self.mode)?;
        debug!(tool = name, argument_count = args.len(), "dispatching tool call");

        Ok(tool.handler.execute(args).await)
    }
}

/// Walks the declared parameters, coercing each supplied value to its
/// declared type. Undeclared extras are dropped. A missing required
/// parameter is rejected in strict mode and replaced by the declared
/// fallback in permissive mode.
fn normalize_arguments(
    descriptor: &ToolDescriptor,
    raw: &Map<String, Value>,
    mode: ArgumentMode,
) -> Result<ToolArgs, DispatchError> {
    let mut args = ToolArgs::default();

    for param in &descriptor.params {
        match raw.get(param.name) {
            Some(value) => args.insert(param.name, coerce(param, value)?),
            None if param.required => match (mode, param.fallback) {
                (ArgumentMode::Permissive, Some(fallback)) => {
                    args.insert(param.name, ArgValue::Text(fallback.to_string()));
                }
                _ => return Err(DispatchError::MissingParameter(param.name.to_string())),
            },
            None => {}
        }
    }

    Ok(args)
}

fn coerce(param: &ParamSpec, value: &Value) -> Result<ArgValue, DispatchError> {
    match param.param_type {
        ParamType::String => match value {
            Value::String(text) => Ok(ArgValue::Text(text.clone())),
            Value::Number(number) => Ok(ArgValue::Text(number.to_string())),
            Value::Bool(flag) => Ok(ArgValue::Text(flag.to_string())),
            _ => Err(DispatchError::InvalidArgument {
                name: param.name.to_string(),
                expected: "a string",
            }),
        },
        ParamType::Integer => match value {
            Value::Number(number) => number.as_i64().map(ArgValue::Count).ok_or_else(|| {
                DispatchError::InvalidArgument {
                    name: param.name.to_string(),
                    expected: "an integer",
                }
            }),
            Value::String(text) => {
                text.trim().parse::<i64>().map(ArgValue::Count).map_err(|_| {
                    DispatchError::InvalidArgument {
                        name: param.name.to_string(),
                        expected: "an integer",
                    }
                })
            }
            _ => Err(DispatchError::InvalidArgument {
                name: param.name.to_string(),
                expected: "an integer",
            }),
        },
    }
}
