//! Summarization request model and its closed-schema validator
//!
//! Arguments of the `summarize_context` tool arrive as untyped JSON. The validator
//! walks that value once, collecting every field-level violation, and only yields a
//! [`SummarizeRequest`] when the whole payload is acceptable. Absent optional lists
//! are normalized to empty vectors so rendering never distinguishes the two.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date pattern"));

const ROOT_PATH: &str = "(root)";

const REQUEST_FIELDS: [&str; 6] = [
    "deal_id",
    "deal_name",
    "source_canvas_name",
    "doc_title",
    "output_format",
    "context",
];
const CONTEXT_FIELDS: [&str; 8] = [
    "summary",
    "key_points",
    "open_questions",
    "next_steps",
    "risks",
    "stakeholders",
    "evidence",
    "last_updated",
];

/// String-valued enumerations accepted by the validator.
pub trait Literal: Sized + Copy {
    const VALUES: &'static [&'static str];

    fn from_literal(value: &str) -> Option<Self>;
    fn as_str(&self) -> &'static str;
}

macro_rules! literal_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl Literal for $name {
            const VALUES: &'static [&'static str] = &[$($text),+];

            fn from_literal(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

literal_enum!(OutputFormat {
    ExecBullets => "exec_bullets",
    SeDealUpdate => "se_deal_update",
    Memo => "memo",
});

literal_enum!(StepStatus {
    Open => "open",
    Done => "done",
});

literal_enum!(Severity {
    Low => "low",
    Med => "med",
    High => "high",
});

literal_enum!(EvidenceKind {
    Conversation => "conversation",
    Canvas => "canvas",
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_canvas_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_title: Option<String>,
    pub output_format: OutputFormat,
    pub context: Context,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Context {
    pub summary: String,
    pub key_points: Vec<String>,
    pub open_questions: Vec<OpenQuestion>,
    pub next_steps: Vec<NextStep>,
    pub risks: Vec<Risk>,
    pub stakeholders: Vec<Stakeholder>,
    pub evidence: Vec<Evidence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenQuestion {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextStep {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Risk {
    pub risk: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stakeholder {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub influence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evidence {
    #[serde(rename = "type")]
    pub kind: EvidenceKind,
    pub pointer: String,
    pub excerpt: String,
}

/// Sizes of the context lists, reported in diagnostics instead of their contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCounts {
    pub key_points: usize,
    pub open_questions: usize,
    pub next_steps: usize,
    pub risks: usize,
    pub stakeholders: usize,
    pub evidence: usize,
}

impl Context {
    pub fn list_counts(&self) -> ListCounts {
        ListCounts {
            key_points: self.key_points.len(),
            open_questions: self.open_questions.len(),
            next_steps: self.next_steps.len(),
            risks: self.risks.len(),
            stakeholders: self.stakeholders.len(),
            evidence: self.evidence.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

pub fn validate_summarize_request(input: &Value) -> Result<SummarizeRequest, Vec<Violation>> {
    let mut checker = Checker::default();
    match checker.summarize_request(input) {
        Some(request) if checker.violations.is_empty() => Ok(request),
        _ => Err(checker.violations),
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Accumulates violations while walking the payload. A `None` from anything but
/// `optional_text` implies a violation was recorded.
#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn fail(&mut self, path: &str, message: impl Into<String>) {
        let path = if path.is_empty() { ROOT_PATH } else { path };
        self.violations.push(Violation {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn summarize_request(&mut self, value: &Value) -> Option<SummarizeRequest> {
        let map = self.object(value, "", &REQUEST_FIELDS)?;

        let deal_id = self.optional_text(map, "deal_id", "");
        let deal_name = self.optional_text(map, "deal_name", "");
        let source_canvas_name = self.optional_text(map, "source_canvas_name", "");
        let doc_title = self.optional_text(map, "doc_title", "");
        let output_format = self.required_literal::<OutputFormat>(map, "output_format", "");
        let context = match map.get("context") {
            Some(value) => self.context(value, "context"),
            None => {
                self.fail("context", "is required");
                None
            }
        };

        Some(SummarizeRequest {
            deal_id,
            deal_name,
            source_canvas_name,
            doc_title,
            output_format: output_format?,
            context: context?,
        })
    }

    fn context(&mut self, value: &Value, path: &str) -> Option<Context> {
        let map = self.object(value, path, &CONTEXT_FIELDS)?;

        let summary = self.required_text(map, "summary", path);
        let key_points = self.list(map, "key_points", path, Self::text);
        let open_questions = self.list(map, "open_questions", path, Self::open_question);
        let next_steps = self.list(map, "next_steps", path, Self::next_step);
        let risks = self.list(map, "risks", path, Self::risk);
        let stakeholders = self.list(map, "stakeholders", path, Self::stakeholder);
        let evidence = self.list(map, "evidence", path, Self::evidence);
        let last_updated = self.optional_text(map, "last_updated", path).filter(|date| {
            let matches = DATE_PATTERN.is_match(date);
            if !matches {
                self.fail(&child_path(path, "last_updated"), "must match YYYY-MM-DD");
            }
            matches
        });

        Some(Context {
            summary: summary?,
            key_points,
            open_questions,
            next_steps,
            risks,
            stakeholders,
            evidence,
            last_updated,
        })
    }

    fn open_question(&mut self, value: &Value, path: &str) -> Option<OpenQuestion> {
        let map = self.object(value, path, &["question", "owner", "due"])?;
        let question = self.required_text(map, "question", path);
        let owner = self.optional_text(map, "owner", path);
        let due = self.optional_text(map, "due", path);

        Some(OpenQuestion {
            question: question?,
            owner,
            due,
        })
    }

    fn next_step(&mut self, value: &Value, path: &str) -> Option<NextStep> {
        let map = self.object(value, path, &["action", "owner", "due", "status"])?;
        let action = self.required_text(map, "action", path);
        let owner = self.optional_text(map, "owner", path);
        let due = self.optional_text(map, "due", path);
        let status = self.required_literal::<StepStatus>(map, "status", path);

        Some(NextStep {
            action: action?,
            owner,
            due,
            status: status?,
        })
    }

    fn risk(&mut self, value: &Value, path: &str) -> Option<Risk> {
        let map = self.object(value, path, &["risk", "severity", "mitigation"])?;
        let risk = self.required_text(map, "risk", path);
        let severity = self.required_literal::<Severity>(map, "severity", path);
        let mitigation = self.optional_text(map, "mitigation", path);

        Some(Risk {
            risk: risk?,
            severity: severity?,
            mitigation,
        })
    }

    fn stakeholder(&mut self, value: &Value, path: &str) -> Option<Stakeholder> {
        let map = self.object(value, path, &["name", "role", "influence"])?;
        let name = self.required_text(map, "name", path);
        let role = self.optional_text(map, "role", path);
        let influence = self.optional_text(map, "influence", path);

        Some(Stakeholder {
            name: name?,
            role,
            influence,
        })
    }

    fn evidence(&mut self, value: &Value, path: &str) -> Option<Evidence> {
        let map = self.object(value, path, &["type", "pointer", "excerpt"])?;
        let kind = self.required_literal::<EvidenceKind>(map, "type", path);
        let pointer = self.required_text(map, "pointer", path);
        let excerpt = self.required_text(map, "excerpt", path);

        Some(Evidence {
            kind: kind?,
            pointer: pointer?,
            excerpt: excerpt?,
        })
    }

    fn object<'a>(
        &mut self,
        value: &'a Value,
        path: &str,
        allowed: &[&str],
    ) -> Option<&'a Map<String, Value>> {
        let Some(map) = value.as_object() else {
            self.fail(path, "must be an object");
            return None;
        };

        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                self.fail(&child_path(path, key), "unknown property");
            }
        }

        Some(map)
    }

    fn text(&mut self, value: &Value, path: &str) -> Option<String> {
        match value.as_str() {
            Some(text) if !text.trim().is_empty() => Some(text.to_string()),
            Some(_) => {
                self.fail(path, "must not be empty");
                None
            }
            None => {
                self.fail(path, "must be a string");
                None
            }
        }
    }

    fn required_text(&mut self, map: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        let path = child_path(path, key);
        match map.get(key) {
            Some(value) => self.text(value, &path),
            None => {
                self.fail(&path, "is required");
                None
            }
        }
    }

    fn optional_text(&mut self, map: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        let value = map.get(key)?;
        self.text(value, &child_path(path, key))
    }

    fn required_literal<T: Literal>(
        &mut self,
        map: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<T> {
        let path = child_path(path, key);
        let Some(value) = map.get(key) else {
            self.fail(&path, "is required");
            return None;
        };

        let parsed = value.as_str().and_then(T::from_literal);
        if parsed.is_none() {
            self.fail(&path, format!("must be one of: {}", T::VALUES.join(", ")));
        }
        parsed
    }

    fn list<T>(
        &mut self,
        map: &Map<String, Value>,
        key: &str,
        path: &str,
        mut item: impl FnMut(&mut Self, &Value, &str) -> Option<T>,
    ) -> Vec<T> {
        let path = child_path(path, key);
        let Some(value) = map.get(key) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.fail(&path, "must be an array");
            return Vec::new();
        };

        items
            .iter()
            .enumerate()
            .filter_map(|(index, value)| item(self, value, &format!("{path}[{index}]")))
            .collect()
    }
}
