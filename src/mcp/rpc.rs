//! JSON-RPC protocol representations and formatting utilities
//!
//! Builds response envelopes with the MCP schema types, and falls back to plain JSON
//! for ids the schema cannot represent (null, fractional numbers).

use rust_mcp_sdk::schema::{
    JsonrpcErrorResponse, JsonrpcResultResponse, RequestId, Result as McpResult, RpcError,
};
use serde_json::{json, Value};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;

pub fn is_json_rpc_error(value: &Value) -> bool {
    value.get("error").is_some()
}

pub fn json_rpc_error(id: Option<&Value>, code: i64, message: &str) -> Value {
    let response = JsonrpcErrorResponse::new(
        RpcError {
            code,
            data: None,
            message: message.to_string(),
        },
        id.and_then(value_to_request_id),
    );

    let mut value = serde_json::to_value(response).unwrap_or_else(|_| {
        json!({
            "jsonrpc": "2.0",
            "error": { "code": code, "message": message }
        })
    });
    ensure_id(&mut value, id);
    value
}

pub fn json_rpc_result(id: Option<&Value>, result: Value) -> Value {
    if let Some(request_id) = id.and_then(value_to_request_id) {
        let extra = result.as_object().cloned();
        let response = JsonrpcResultResponse::new(request_id, McpResult { meta: None, extra });
        if let Ok(value) = serde_json::to_value(response) {
            return value;
        }
    }

    json!({
        "jsonrpc": "2.0",
        "id": id.cloned().unwrap_or(Value::Null),
        "result": result
    })
}

/// Every response carries an `id`, `null` when the request's id was absent or unusable.
fn ensure_id(response: &mut Value, id: Option<&Value>) {
    if let Some(object) = response.as_object_mut() {
        object
            .entry("id")
            .or_insert_with(|| id.cloned().unwrap_or(Value::Null));
    }
}

pub fn value_to_request_id(value: &Value) -> Option<RequestId> {
    if let Some(string_id) = value.as_str() {
        return Some(RequestId::String(string_id.to_string()));
    }

    value.as_i64().map(RequestId::Integer)
}
