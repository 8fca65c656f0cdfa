//! The central Model Context Protocol engine
//!
//! Parses single and batched JSON-RPC envelopes, applies notification semantics,
//! and routes each request to capability negotiation (`initialize`), the tool
//! catalogue, or tool execution.

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::domain::text::clip_for_log;
use crate::domain::tools::{build_tools_list, handle_tools_call};
use crate::mcp::rpc::{
    is_json_rpc_error, json_rpc_error, json_rpc_result, INVALID_REQUEST, METHOD_NOT_FOUND,
};
use crate::AppState;

pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2024-11-05", "2025-03-26", "2025-06-18"];

/// A structurally valid envelope. `id` is `None` for notifications.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcMessage {
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    Initialize,
    Initialized,
    Ping,
    ToolsList,
    ToolsCall,
    Unknown,
}

impl RpcMethod {
    pub fn parse(method: &str) -> Self {
        match method {
            "initialize" => Self::Initialize,
            "initialized" | "notifications/initialized" => Self::Initialized,
            "ping" => Self::Ping,
            "tools/list" => Self::ToolsList,
            "tools/call" => Self::ToolsCall,
            _ => Self::Unknown,
        }
    }
}

/// Handles a decoded request body. `None` means nothing warrants a response.
pub async fn handle_json_rpc_body(
    state: &AppState,
    correlation_id: &str,
    payload: Value,
) -> Option<Value> {
    let Value::Array(batch) = payload else {
        return handle_json_rpc_value(state, correlation_id, &payload).await;
    };

    let mut responses = Vec::new();
    for item in &batch {
        if let Some(response) = handle_json_rpc_value(state, correlation_id, item).await {
            responses.push(response);
        }
    }

    info!(
        correlation_id,
        batch_size = batch.len(),
        responses = responses.len(),
        "batch handled"
    );

    if responses.is_empty() {
        None
    } else {
        Some(Value::Array(responses))
    }
}

pub async fn handle_json_rpc_value(
    state: &AppState,
    correlation_id: &str,
    payload: &Value,
) -> Option<Value> {
    let message = match parse_envelope(payload) {
        Ok(message) => message,
        Err(error_response) => {
            warn!(
                correlation_id,
                id = %clip_for_log(&error_response["id"].to_string()),
                "invalid json-rpc envelope"
            );
            return Some(error_response);
        }
    };

    let method = RpcMethod::parse(&message.method);
    let Some(id) = message.id.as_ref() else {
        match method {
            RpcMethod::Initialized => info!(
                correlation_id,
                method = %clip_for_log(&message.method),
                "client initialized"
            ),
            _ => info!(
                correlation_id,
                method = %clip_for_log(&message.method),
                "notification without id dropped"
            ),
        }
        return None;
    };

    let response = match method {
        RpcMethod::Initialize => json_rpc_result(
            Some(id),
            initialize_result(message.params.as_ref()),
        ),
        RpcMethod::Initialized | RpcMethod::Ping => json_rpc_result(Some(id), json!({})),
        RpcMethod::ToolsList => json_rpc_result(Some(id), json!({ "tools": build_tools_list() })),
        RpcMethod::ToolsCall => json_rpc_result(
            Some(id),
            handle_tools_call(state, correlation_id, message.params.as_ref()).await,
        ),
        RpcMethod::Unknown => json_rpc_error(Some(id), METHOD_NOT_FOUND, "Method not found"),
    };

    info!(
        correlation_id,
        method = %clip_for_log(&message.method),
        id = %clip_for_log(&id.to_string()),
        outcome = if is_json_rpc_error(&response) { "failure" } else { "success" },
        "mcp request handled"
    );

    Some(response)
}

/// Checks the envelope shape, returning a ready `-32600` response when it is unusable.
pub fn parse_envelope(payload: &Value) -> Result<JsonRpcMessage, Value> {
    let invalid = |id: Option<&Value>| json_rpc_error(id, INVALID_REQUEST, "Invalid Request");

    let Some(object) = payload.as_object() else {
        return Err(invalid(None));
    };

    let id = match object.get("id") {
        None | Some(Value::Null) => None,
        Some(value @ (Value::String(_) | Value::Number(_))) => Some(value.clone()),
        Some(_) => return Err(invalid(None)),
    };

    if object.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(invalid(id.as_ref()));
    }

    let Some(method) = object
        .get("method")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|method| !method.is_empty())
    else {
        return Err(invalid(id.as_ref()));
    };

    Ok(JsonRpcMessage {
        method: method.to_string(),
        params: object.get("params").cloned(),
        id,
    })
}

pub fn negotiate_protocol_version(params: Option<&Value>) -> &'static str {
    let offered = params
        .and_then(|params| params.get("protocolVersion"))
        .and_then(Value::as_str)
        .map(str::trim);

    SUPPORTED_PROTOCOL_VERSIONS
        .into_iter()
        .find(|version| Some(*version) == offered)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION)
}

pub fn initialize_result(params: Option<&Value>) -> Value {
    json!({
        "protocolVersion": negotiate_protocol_version(params),
        "capabilities": {
            "tools": {
                "listChanged": false
            }
        },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}
