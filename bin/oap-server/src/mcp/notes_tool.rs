use std::sync::Arc;

use async_trait::async_trait;
use oap_mcp::{ToolError, ToolHandler, ToolResult};
use serde_json::Value;

use crate::entities::{Note, NoteStore};

/// `listNotes`: every note in the database as a numbered text list.
///
/// MCP requests carry no user identity, so there is no owner filter.
pub struct ListNotesTool<S> {
    store: Arc<S>,
}

impl<S> ListNotesTool<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: NoteStore> ToolHandler for ListNotesTool<S> {
    async fn call(&self, _args: Value) -> Result<ToolResult, ToolError> {
        let notes = self
            .store
            .list_notes(None)
            .await
            .map_err(|e| ToolError::Internal(format!("failed to list notes: {e}")))?;
        Ok(ToolResult::text(format_notes(&notes)))
    }
}

pub fn format_notes(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "You have no notes.".to_owned();
    }
    notes
        .iter()
        .enumerate()
        .map(|(i, note)| {
            let title = if note.title.is_empty() { "Untitled" } else { &note.title };
            let content = if note.content.is_empty() { "(no content)" } else { &note.content };
            format!("{}. **{title}**\n   {content}", i + 1)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
