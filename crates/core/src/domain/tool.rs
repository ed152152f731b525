//! Static tool metadata and the runtime call/result types moved between the
//! dispatcher and its handlers.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: &'static str,
    pub required: bool,
    /// Substituted for an omitted required parameter when the dispatcher
    /// runs in permissive mode. Not serialized into discovery output.
    #[serde(skip_serializing)]
    pub fallback: Option<&'static str>,
}

impl ParamSpec {
    pub const fn required(
        name: &'static str,
        param_type: ParamType,
        description: &'static str,
        fallback: Option<&'static str>,
    ) -> Self {
        Self { name, param_type, description, required: true, fallback }
    }

    pub const fn optional(
        name: &'static str,
        param_type: ParamType,
        description: &'static str,
    ) -> Self {
        Self { name, param_type, description, required: false, fallback: None }
    }
}

/// Immutable descriptor enumerated verbatim for discovery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

/// One inbound invocation: a tool name plus the raw argument map, exactly as
/// the transport adapter extracted it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgValue {
    Text(String),
    Count(i64),
}

impl ArgValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Count(_) => None,
        }
    }

    pub fn as_count(&self) -> Option<i64> {
        match self {
            Self::Count(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

/// Arguments after dispatcher normalization: declared parameters only, each
/// coerced to its declared type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolArgs(BTreeMap<String, ArgValue>);

impl ToolArgs {
    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.0.insert(name.into(), value);
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(ArgValue::as_text)
    }

    pub fn count(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(ArgValue::as_count)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tagged handler outcome plus the narration read back to the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub narration: String,
    pub data: Value,
}

impl ToolResult {
    pub fn ok(narration: impl Into<String>, data: Value) -> Self {
        Self { success: true, narration: narration.into(), data }
    }

    pub fn failure(narration: impl Into<String>) -> Self {
        Self { success: false, narration: narration.into(), data: Value::Null }
    }
}
