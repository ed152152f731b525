//! Response formatting: pure renderings of a `ToolResult` into the envelope
//! a transport adapter expects.

use serde_json::{json, Value};

use bookery_core::domain::tool::ToolResult;

/// Narration wrapped in the text-content list shape voice integrations read
/// aloud.
pub fn text_envelope(result: &ToolResult) -> Value {
    json!({
        "content": [{ "type": "text", "text": result.narration }],
        "is_error": !result.success,
    })
}

/// Structured success/message/data shape for programmatic callers.
pub fn json_envelope(result: &ToolResult) -> Value {
    json!({
        "success": result.success,
        "message": result.narration,
        "data": result.data,
    })
}
