//! Interactive tools exposed via Model Context Protocol
//!
//! Provides `healthcheck` and `summarize_context`. The summarizer validates the
//! deal context, renders it to Markdown and hands it to the configured `DocSink`;
//! the caller only learns the push outcome, never the rendered document.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::domain::{
    formatter::{document_title, render_markdown},
    request::validate_summarize_request,
    text::clip_for_log,
};
use crate::errors::{tool_text_result, ToolError};
use crate::webhook::DocPush;
use crate::AppState;

pub const HEALTHCHECK_TOOL: &str = "healthcheck";
pub const SUMMARIZE_CONTEXT_TOOL: &str = "summarize_context";

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub version: &'static str,
    pub uptime: u64,
    pub server_time: String,
}

pub fn health_snapshot(state: &AppState) -> HealthSnapshot {
    HealthSnapshot {
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        server_time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn build_tools_list() -> Value {
    json!([
        {
            "name": HEALTHCHECK_TOOL,
            "description": "Report server version, uptime in seconds and current server time",
            "inputSchema": {
                "type": "object",
                "properties": {},
                "additionalProperties": false
            }
        },
        {
            "name": SUMMARIZE_CONTEXT_TOOL,
            "description": "Render a deal context as Markdown and push it to the configured document webhook. Returns only the push status and document title.",
            "inputSchema": summarize_context_schema()
        }
    ])
}

fn optional_text_schema(description: &str) -> Value {
    json!({ "type": "string", "minLength": 1, "description": description })
}

fn closed_object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn summarize_context_schema() -> Value {
    let text = json!({ "type": "string", "minLength": 1 });
    let list_of = |item: Value| json!({ "type": "array", "items": item });

    let context = closed_object(
        json!({
            "summary": text,
            "key_points": list_of(text.clone()),
            "open_questions": list_of(closed_object(
                json!({ "question": text, "owner": text, "due": text }),
                &["question"],
            )),
            "next_steps": list_of(closed_object(
                json!({
                    "action": text,
                    "owner": text,
                    "due": text,
                    "status": { "type": "string", "enum": ["open", "done"] }
                }),
                &["action", "status"],
            )),
            "risks": list_of(closed_object(
                json!({
                    "risk": text,
                    "severity": { "type": "string", "enum": ["low", "med", "high"] },
                    "mitigation": text
                }),
                &["risk", "severity"],
            )),
            "stakeholders": list_of(closed_object(
                json!({ "name": text, "role": text, "influence": text }),
                &["name"],
            )),
            "evidence": list_of(closed_object(
                json!({
                    "type": { "type": "string", "enum": ["conversation", "canvas"] },
                    "pointer": text,
                    "excerpt": text
                }),
                &["type", "pointer", "excerpt"],
            )),
            "last_updated": {
                "type": "string",
                "pattern": "^[0-9]{4}-[0-9]{2}-[0-9]{2}$",
                "description": "YYYY-MM-DD"
            }
        }),
        &["summary"],
    );

    closed_object(
        json!({
            "deal_id": optional_text_schema("CRM deal identifier"),
            "deal_name": optional_text_schema("Human readable deal name"),
            "source_canvas_name": optional_text_schema("Canvas the context was collected from"),
            "doc_title": optional_text_schema("Title of the pushed document"),
            "output_format": {
                "type": "string",
                "enum": ["exec_bullets", "se_deal_update", "memo"]
            },
            "context": context
        }),
        &["output_format", "context"],
    )
}

pub async fn handle_tools_call(
    state: &AppState,
    correlation_id: &str,
    params: Option<&Value>,
) -> Value {
    let Some(name) = params
        .and_then(|params| params.get("name"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
    else {
        warn!(correlation_id, "tools/call without tool name");
        return ToolError::MissingName.into_call_result();
    };

    let arguments = params
        .and_then(|params| params.get("arguments"))
        .cloned()
        .unwrap_or_else(|| json!({}));

    let outcome = match name {
        HEALTHCHECK_TOOL => serde_json::to_string(&health_snapshot(state))
            .map_err(|err| ToolError::Internal(err.to_string())),
        SUMMARIZE_CONTEXT_TOOL => summarize_context(state, correlation_id, &arguments).await,
        other => Err(ToolError::UnknownTool(clip_for_log(other))),
    };

    match outcome {
        Ok(text) => {
            info!(correlation_id, tool = name, outcome = "success", "tool call handled");
            tool_text_result(text, false)
        }
        Err(err) => {
            warn!(
                correlation_id,
                tool = %clip_for_log(name),
                error_kind = err.kind(),
                "tool call failed"
            );
            err.into_call_result()
        }
    }
}

async fn summarize_context(
    state: &AppState,
    correlation_id: &str,
    arguments: &Value,
) -> Result<String, ToolError> {
    let request = validate_summarize_request(arguments).map_err(|violations| {
        warn!(
            correlation_id,
            violations = violations.len(),
            "summarize_context arguments rejected"
        );
        ToolError::InvalidArguments(violations)
    })?;

    let counts = request.context.list_counts();
    info!(
        correlation_id,
        output_format = %request.output_format,
        key_points = counts.key_points,
        open_questions = counts.open_questions,
        next_steps = counts.next_steps,
        risks = counts.risks,
        stakeholders = counts.stakeholders,
        evidence = counts.evidence,
        "summarize_context validated"
    );

    let title = document_title(&request);
    let doc = DocPush {
        text: render_markdown(&request),
        title,
    };

    match state.doc_sink.push(&doc).await {
        Ok(receipt) => {
            info!(
                correlation_id,
                status = receipt.status,
                title = %clip_for_log(&doc.title),
                "doc pushed"
            );
            Ok(format!("Doc push: ok\nTitle: {}", doc.title))
        }
        Err(source) => {
            warn!(
                correlation_id,
                error = %clip_for_log(&source.to_string()),
                title = %clip_for_log(&doc.title),
                "doc push failed"
            );
            Err(ToolError::PushFailed {
                title: doc.title,
                source,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_lists_both_tools_with_schemas() {
        let tools = build_tools_list();
        let tools = tools.as_array().expect("tools array");

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], HEALTHCHECK_TOOL);
        assert_eq!(tools[0]["inputSchema"]["properties"], json!({}));
        assert_eq!(tools[1]["name"], SUMMARIZE_CONTEXT_TOOL);

        let schema = &tools[1]["inputSchema"];
        assert_eq!(schema["required"], json!(["output_format", "context"]));
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(
            schema["properties"]["context"]["properties"]["risks"]["items"]["properties"]
                ["severity"]["enum"],
            json!(["low", "med", "high"])
        );
        assert_eq!(
            schema["properties"]["context"]["required"],
            json!(["summary"])
        );
    }
}
