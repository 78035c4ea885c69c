//! Tool registry.
//!
//! [`ToolCatalog`] maps a tool name to its description, JSON Schema and
//! handler. Arguments are validated against the schema before the handler
//! runs, and every failure is folded into an error [`ToolResult`] so callers
//! always get the same envelope back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::envelope::ToolResult;
use crate::error::ToolError;

/// A callable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Value) -> Result<ToolResult, ToolError>;
}

/// A registered tool: metadata plus its compiled input schema.
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    validator: jsonschema::Validator,
    handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl ToolDefinition {
    /// The `tools/list` entry for this tool.
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }

    fn validate(&self, args: &Value) -> Result<(), ToolError> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(args)
            .map(|e| e.to_string())
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ToolError::InvalidArguments(violations.join("; ")))
        }
    }
}

/// Ordered collection of tools, looked up by name.
#[derive(Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ToolCatalog({} tools)", self.tools.len())
    }
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Re-registering a name replaces the earlier tool in
    /// place, keeping its position in the listing.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<&mut Self, ToolError> {
        let name = name.into();
        let validator = jsonschema::validator_for(&input_schema).map_err(|e| {
            ToolError::Internal(format!("invalid input schema for tool '{name}': {e}"))
        })?;
        let definition = ToolDefinition {
            name: name.clone(),
            description: description.into(),
            input_schema,
            validator,
            handler,
        };
        match self.index.get(&name) {
            Some(&pos) => self.tools[pos] = definition,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(definition);
            }
        }
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&pos| &self.tools[pos])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    /// Validate and run a tool. Never fails: errors become an error envelope.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        let started = Instant::now();
        let result = self.try_call(name, arguments.unwrap_or_else(|| json!({}))).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(result) => {
                info!(tool = name, elapsed_ms, is_error = result.is_error, "tool call finished");
                result
            }
            Err(e) => {
                warn!(tool = name, elapsed_ms, error = %e, "tool call failed");
                ToolResult::error(e)
            }
        }
    }

    async fn try_call(&self, name: &str, args: Value) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_owned()))?;
        tool.validate(&args)?;
        tool.handler.call(args).await
    }
}
