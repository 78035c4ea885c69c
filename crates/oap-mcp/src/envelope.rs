//! Uniform tool result envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One content block of a tool result. Only text is produced by this server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

/// Result of a `tools/call`, serialized as
/// `{"content":[{"type":"text","text":...}], "isError": true?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<Content>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self { content: vec![Content::Text { text: text.into() }], is_error: false }
    }

    /// Pretty-print `value` (two-space indent) into a text block.
    pub fn json(value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text)
    }

    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            content: vec![Content::Text { text: format!("Error: {message}") }],
            is_error: true,
        }
    }

    /// Concatenated text of all blocks.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                Content::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_omits_is_error() {
        let v = serde_json::to_value(ToolResult::text("hi")).unwrap();
        assert_eq!(v, json!({ "content": [{ "type": "text", "text": "hi" }] }));
    }

    #[test]
    fn error_is_flagged_and_prefixed() {
        let v = serde_json::to_value(ToolResult::error("boom")).unwrap();
        assert_eq!(v["isError"], true);
        assert_eq!(v["content"][0]["text"], "Error: boom");
    }

    #[test]
    fn json_is_pretty_printed() {
        let r = ToolResult::json(&json!({ "a": 1 }));
        assert_eq!(r.joined_text(), "{\n  \"a\": 1\n}");
    }
}
