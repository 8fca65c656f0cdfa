//! Deterministic Markdown rendering of a validated summarization request

use crate::domain::{
    request::{Evidence, NextStep, OpenQuestion, OutputFormat, Risk, Stakeholder, SummarizeRequest},
    text::collapse_whitespace,
};

pub const MAX_SECTION_ITEMS: usize = 8;
pub const FALLBACK_TITLE: &str = "Deal Context Summary";
pub const UNSPECIFIED_DEAL: &str = "Unspecified";
pub const EMPTY_SECTION_LINE: &str = "- None";

/// Document title: explicit doc title, then deal name, then deal id.
pub fn document_title(request: &SummarizeRequest) -> String {
    [&request.doc_title, &request.deal_name, &request.deal_id]
        .into_iter()
        .flatten()
        .map(|value| collapse_whitespace(value))
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

pub fn render_markdown(request: &SummarizeRequest) -> String {
    let context = &request.context;
    let mut lines = vec![format!("# {}", document_title(request)), String::new()];

    let deal_label = request
        .deal_name
        .as_deref()
        .or(request.deal_id.as_deref())
        .map(collapse_whitespace)
        .unwrap_or_else(|| UNSPECIFIED_DEAL.to_string());
    lines.push(format!("**Deal:** {deal_label}"));
    if let (Some(_), Some(deal_id)) = (&request.deal_name, &request.deal_id) {
        lines.push(format!("**Deal ID:** {}", collapse_whitespace(deal_id)));
    }
    lines.push(format!("**Format:** {}", request.output_format));
    if let Some(canvas) = &request.source_canvas_name {
        lines.push(format!("**Source canvas:** {}", collapse_whitespace(canvas)));
    }
    if let Some(last_updated) = &context.last_updated {
        lines.push(format!("**Last updated:** {last_updated}"));
    }

    lines.push(String::new());
    lines.push("## Summary".to_string());
    lines.push(collapse_whitespace(&context.summary));

    push_section(&mut lines, "Key points", &context.key_points, |point| {
        collapse_whitespace(point)
    });
    push_section(&mut lines, "Open questions", &context.open_questions, open_question_line);
    push_section(&mut lines, "Next steps", &context.next_steps, next_step_line);
    push_section(&mut lines, "Risks", &context.risks, risk_line);
    push_section(&mut lines, "Stakeholders", &context.stakeholders, stakeholder_line);
    push_section(&mut lines, "Evidence", &context.evidence, evidence_line);

    if request.output_format != OutputFormat::ExecBullets {
        // Serializing plain structs of strings and enums cannot fail.
        if let Ok(data) = serde_json::to_string_pretty(request) {
            lines.push(String::new());
            lines.push("## Data".to_string());
            lines.push(format!("```json\n{data}\n```"));
        }
    }

    let mut document = lines.join("\n");
    document.push('\n');
    document
}

/// Bullet lines for one list section, capped at [`MAX_SECTION_ITEMS`] entries.
pub fn bullet_lines<T>(items: &[T], render: impl Fn(&T) -> String) -> Vec<String> {
    if items.is_empty() {
        return vec![EMPTY_SECTION_LINE.to_string()];
    }

    let mut lines = items
        .iter()
        .take(MAX_SECTION_ITEMS)
        .map(|item| format!("- {}", render(item)))
        .collect::<Vec<_>>();
    if items.len() > MAX_SECTION_ITEMS {
        lines.push(format!("- ... (+{} more)", items.len() - MAX_SECTION_ITEMS));
    }
    lines
}

fn push_section<T>(
    lines: &mut Vec<String>,
    heading: &str,
    items: &[T],
    render: impl Fn(&T) -> String,
) {
    lines.push(String::new());
    lines.push(format!("## {heading}"));
    lines.extend(bullet_lines(items, render));
}

/// Formats `(Label: value; Label: value)` for the present parts, or nothing.
fn annotations(parts: &[(&str, Option<&String>)]) -> String {
    let present = parts
        .iter()
        .filter_map(|(label, value)| {
            value.map(|value| {
                if label.is_empty() {
                    collapse_whitespace(value)
                } else {
                    format!("{label}: {}", collapse_whitespace(value))
                }
            })
        })
        .collect::<Vec<_>>();

    if present.is_empty() {
        String::new()
    } else {
        format!(" ({})", present.join("; "))
    }
}

fn open_question_line(item: &OpenQuestion) -> String {
    format!(
        "{}{}",
        collapse_whitespace(&item.question),
        annotations(&[("Owner", item.owner.as_ref()), ("Due", item.due.as_ref())])
    )
}

fn next_step_line(item: &NextStep) -> String {
    format!(
        "[{}] {}{}",
        item.status,
        collapse_whitespace(&item.action),
        annotations(&[("Owner", item.owner.as_ref()), ("Due", item.due.as_ref())])
    )
}

fn risk_line(item: &Risk) -> String {
    format!(
        "[{}] {}{}",
        item.severity.to_string().to_uppercase(),
        collapse_whitespace(&item.risk),
        annotations(&[("Mitigation", item.mitigation.as_ref())])
    )
}

fn stakeholder_line(item: &Stakeholder) -> String {
    format!(
        "{}{}",
        collapse_whitespace(&item.name),
        annotations(&[("", item.role.as_ref()), ("Influence", item.influence.as_ref())])
    )
}

fn evidence_line(item: &Evidence) -> String {
    format!(
        "[{}] {}: \"{}\"",
        item.kind,
        collapse_whitespace(&item.pointer),
        collapse_whitespace(&item.excerpt)
    )
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::request::validate_summarize_request;

    fn request(value: Value) -> SummarizeRequest {
        validate_summarize_request(&value).expect("valid request")
    }

    fn section<'a>(document: &'a str, heading: &str) -> Vec<&'a str> {
        document
            .lines()
            .skip_while(|line| *line != format!("## {heading}"))
            .skip(1)
            .take_while(|line| !line.is_empty())
            .collect()
    }

    #[test]
    fn empty_sections_render_none() {
        let document = render_markdown(&request(json!({
            "output_format": "exec_bullets",
            "context": { "summary": "Renewal in negotiation" }
        })));

        for heading in [
            "Key points",
            "Open questions",
            "Next steps",
            "Risks",
            "Stakeholders",
            "Evidence",
        ] {
            assert_eq!(section(&document, heading), vec!["- None"], "{heading}");
        }
        assert_eq!(section(&document, "Summary"), vec!["Renewal in negotiation"]);
        assert!(document.contains("**Deal:** Unspecified"));
        assert!(document.starts_with("# Deal Context Summary\n"));
    }

    #[test]
    fn caps_sections_at_eight_items() {
        let points = (1..=11).map(|n| format!("point {n}")).collect::<Vec<_>>();
        let document = render_markdown(&request(json!({
            "output_format": "exec_bullets",
            "context": { "summary": "s", "key_points": points }
        })));

        let lines = section(&document, "Key points");
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "- point 1");
        assert_eq!(lines[7], "- point 8");
        assert_eq!(lines[8], "- ... (+3 more)");
    }

    #[test]
    fn caps_structured_sections_at_eight_items() {
        let questions = (1..=10)
            .map(|n| json!({ "question": format!("question {n}") }))
            .collect::<Vec<_>>();
        let risks = (1..=12)
            .map(|n| json!({ "risk": format!("risk {n}"), "severity": "high" }))
            .collect::<Vec<_>>();
        let stakeholders = (1..=9)
            .map(|n| json!({ "name": format!("person {n}") }))
            .collect::<Vec<_>>();
        let document = render_markdown(&request(json!({
            "output_format": "exec_bullets",
            "context": {
                "summary": "s",
                "open_questions": questions,
                "risks": risks,
                "stakeholders": stakeholders
            }
        })));

        let lines = section(&document, "Open questions");
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[7], "- question 8");
        assert_eq!(lines[8], "- ... (+2 more)");

        let lines = section(&document, "Risks");
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "- [HIGH] risk 1");
        assert_eq!(lines[7], "- [HIGH] risk 8");
        assert_eq!(lines[8], "- ... (+4 more)");

        let lines = section(&document, "Stakeholders");
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[7], "- person 8");
        assert_eq!(lines[8], "- ... (+1 more)");
    }

    #[test]
    fn exactly_eight_items_have_no_overflow_line() {
        let points = (1..=8).map(|n| format!("point {n}")).collect::<Vec<_>>();
        let document = render_markdown(&request(json!({
            "output_format": "exec_bullets",
            "context": { "summary": "s", "key_points": points }
        })));

        let lines = section(&document, "Key points");
        assert_eq!(lines.len(), 8);
        assert!(lines.iter().all(|line| !line.contains("more)")));
    }

    #[test]
    fn renders_section_specific_item_lines() {
        let document = render_markdown(&request(json!({
            "output_format": "exec_bullets",
            "context": {
                "summary": "s",
                "open_questions": [
                    { "question": "Who signs?", "owner": "Dana", "due": "2025-03-01" },
                    { "question": "Budget?", "due": "Q2" },
                    { "question": "Timeline?" }
                ],
                "next_steps": [
                    { "action": "Send\n order   form", "owner": "Sam", "status": "open" },
                    { "action": "Kickoff", "status": "done" }
                ],
                "risks": [
                    { "risk": "Legal slips", "severity": "high", "mitigation": "Escalate early" },
                    { "risk": "Champion leaves", "severity": "med" }
                ],
                "stakeholders": [
                    { "name": "Dana", "role": "CFO", "influence": "high" },
                    { "name": "Lee", "influence": "low" },
                    { "name": "Kim" }
                ],
                "evidence": [
                    { "type": "conversation", "pointer": "call 3", "excerpt": "we are\n aligned" }
                ]
            }
        })));

        assert_eq!(
            section(&document, "Open questions"),
            vec![
                "- Who signs? (Owner: Dana; Due: 2025-03-01)",
                "- Budget? (Due: Q2)",
                "- Timeline?"
            ]
        );
        assert_eq!(
            section(&document, "Next steps"),
            vec!["- [open] Send order form (Owner: Sam)", "- [done] Kickoff"]
        );
        assert_eq!(
            section(&document, "Risks"),
            vec![
                "- [HIGH] Legal slips (Mitigation: Escalate early)",
                "- [MED] Champion leaves"
            ]
        );
        assert_eq!(
            section(&document, "Stakeholders"),
            vec!["- Dana (CFO; Influence: high)", "- Lee (Influence: low)", "- Kim"]
        );
        assert_eq!(
            section(&document, "Evidence"),
            vec!["- [conversation] call 3: \"we are aligned\""]
        );
    }

    #[test]
    fn deal_identity_prefers_name_and_keeps_id_line() {
        let both = render_markdown(&request(json!({
            "deal_id": "D-42",
            "deal_name": "Acme  renewal",
            "output_format": "exec_bullets",
            "context": { "summary": "s" }
        })));
        assert!(both.contains("**Deal:** Acme renewal\n**Deal ID:** D-42\n"));
        assert!(both.starts_with("# Acme renewal\n"));

        let id_only = render_markdown(&request(json!({
            "deal_id": "D-42",
            "output_format": "exec_bullets",
            "context": { "summary": "s" }
        })));
        assert!(id_only.contains("**Deal:** D-42\n"));
        assert!(!id_only.contains("**Deal ID:**"));
    }

    #[test]
    fn document_title_prefers_doc_title() {
        let titled = request(json!({
            "doc_title": "Weekly  update",
            "deal_name": "Acme",
            "output_format": "exec_bullets",
            "context": { "summary": "s" }
        }));
        assert_eq!(document_title(&titled), "Weekly update");
    }

    #[test]
    fn rendering_is_idempotent() {
        let validated = request(json!({
            "deal_name": "Acme",
            "output_format": "memo",
            "context": {
                "summary": "s",
                "key_points": ["a", "b"],
                "risks": [{ "risk": "r", "severity": "low" }]
            }
        }));

        assert_eq!(render_markdown(&validated), render_markdown(&validated));
    }

    #[test]
    fn non_bullet_formats_embed_request_json() {
        let input = json!({
            "deal_name": "Acme",
            "source_canvas_name": "Acme canvas",
            "output_format": "se_deal_update",
            "context": {
                "summary": "Multi\nline   summary",
                "next_steps": [{ "action": "Call", "status": "done" }],
                "last_updated": "2025-02-14"
            }
        });
        let validated = request(input.clone());
        let document = render_markdown(&validated);

        let block = document
            .split("```json\n")
            .nth(1)
            .and_then(|rest| rest.split("\n```").next())
            .expect("fenced json block");
        let embedded: Value = serde_json::from_str(block).expect("embedded json parses");

        assert_eq!(
            embedded,
            serde_json::to_value(&validated).expect("serialize request")
        );
        assert_eq!(embedded["context"]["summary"], "Multi\nline   summary");
        assert_eq!(embedded["context"]["key_points"], json!([]));
        assert_eq!(embedded["deal_name"], input["deal_name"]);
        assert!(document.ends_with("```\n"));
    }

    #[test]
    fn exec_bullets_omit_request_json() {
        let document = render_markdown(&request(json!({
            "output_format": "exec_bullets",
            "context": { "summary": "s" }
        })));

        assert!(!document.contains("```"));
    }
}
