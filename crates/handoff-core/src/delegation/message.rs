//! Message model of the expert stream
//!
//! The expert emits newline-delimited JSON objects tagged by `type`. They are
//! mapped onto a closed set of variants; anything unrecognized lands in an
//! `Other` arm. Parsing never fails on shape problems: missing fields become
//! empty strings, empty lists or `null`.

use serde_json::{Map, Value};

use crate::constants::expert::{SKILL_INPUT_KEY, SKILL_TOOL_NAME, UNKNOWN_SKILL};

/// One message read from the expert stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Assistant turn with ordered content blocks
    Assistant { content: Vec<ContentBlock> },
    /// Terminal result; payload holds every field except the `type` tag
    Result { payload: Map<String, Value> },
    /// System, status, user (tool result) or future message kinds
    Other { kind: String },
}

/// One content block inside an assistant message
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    Text {
        text: String,
    },
    /// Thinking and any other block kind, with its text when it has one
    Other {
        kind: String,
        text: Option<String>,
    },
}

fn str_field<'a>(json: &'a Value, key: &str) -> Option<&'a str> {
    json.get(key).and_then(|v| v.as_str())
}

impl StreamMessage {
    /// Classify a decoded stream-json object
    pub fn from_json(json: Value) -> Self {
        let kind = str_field(&json, "type").unwrap_or("").to_string();

        match kind.as_str() {
            "assistant" => {
                let content = json
                    .get("message")
                    .and_then(|m| m.get("content"))
                    .and_then(|c| c.as_array())
                    .map(|blocks| blocks.iter().map(ContentBlock::from_json).collect())
                    .unwrap_or_default();
                StreamMessage::Assistant { content }
            }
            "result" => {
                let mut payload = match json {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                payload.remove("type");
                StreamMessage::Result { payload }
            }
            _ => {
                let base = if kind.is_empty() { "unknown" } else { &kind };
                let kind = match str_field(&json, "subtype") {
                    Some(subtype) => format!("{}:{}", base, subtype),
                    None => base.to_string(),
                };
                StreamMessage::Other { kind }
            }
        }
    }

    /// Short kind label for logs
    pub fn kind(&self) -> &str {
        match self {
            StreamMessage::Assistant { .. } => "assistant",
            StreamMessage::Result { .. } => "result",
            StreamMessage::Other { kind } => kind,
        }
    }
}

impl ContentBlock {
    pub fn from_json(json: &Value) -> Self {
        let kind = str_field(json, "type").unwrap_or("unknown");

        match kind {
            "tool_use" => ContentBlock::ToolUse {
                id: str_field(json, "id").unwrap_or("").to_string(),
                name: str_field(json, "name").unwrap_or("").to_string(),
                input: json.get("input").cloned().unwrap_or(Value::Null),
            },
            "text" => ContentBlock::Text {
                text: str_field(json, "text").unwrap_or("").to_string(),
            },
            _ => ContentBlock::Other {
                kind: kind.to_string(),
                text: str_field(json, "text")
                    .or_else(|| str_field(json, "thinking"))
                    .map(str::to_string),
            },
        }
    }

    /// Short kind label for logs
    pub fn kind(&self) -> &str {
        match self {
            ContentBlock::ToolUse { .. } => "tool_use",
            ContentBlock::Text { .. } => "text",
            ContentBlock::Other { kind, .. } => kind,
        }
    }

    /// Skill named by a skill invocation, `None` for anything else.
    ///
    /// A skill invocation without a usable `skill` key yields "unknown".
    pub fn skill_name(&self) -> Option<&str> {
        match self {
            ContentBlock::ToolUse { name, input, .. } if name == SKILL_TOOL_NAME => Some(
                input
                    .get(SKILL_INPUT_KEY)
                    .and_then(|s| s.as_str())
                    .unwrap_or(UNKNOWN_SKILL),
            ),
            _ => None,
        }
    }
}
