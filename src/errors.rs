use rust_mcp_sdk::schema::{CallToolResult, ContentBlock, TextContent};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{domain::request::Violation, webhook::PushError};

/// Failures reported to the model inside a successful `tools/call` result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Missing tool name")]
    MissingName,
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments:\n{}", format_violations(.0))]
    InvalidArguments(Vec<Violation>),
    #[error("Doc push: failed\nTitle: {title}\nError: {source}")]
    PushFailed { title: String, source: PushError },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingName => "missing_tool_name",
            Self::UnknownTool(_) => "unknown_tool",
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::PushFailed { .. } => "push_failed",
            Self::Internal(_) => "internal",
        }
    }

    pub fn into_call_result(self) -> Value {
        tool_text_result(self.to_string(), true)
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|violation| format!("- {violation}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serializes a single-text-block tool result.
pub fn tool_text_result(text: String, is_error: bool) -> Value {
    let result = CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(text.clone(), None, None))],
        is_error: Some(is_error),
        meta: None,
        structured_content: None,
    };

    serde_json::to_value(result).unwrap_or_else(|_| {
        json!({
            "content": [{ "type": "text", "text": text }],
            "isError": is_error,
        })
    })
}
