//! Tool descriptors, handlers and the registry that dispatches to them.
//!
//! # Architecture
//!
//! - [`ToolDescriptor`]: immutable metadata advertised to callers
//! - [`ToolHandler`]: an invocable tool, owning its descriptor
//! - [`ToolRegistry`]: name → handler map answering list and call queries
//!
//! Adding an operation means implementing [`ToolHandler`] and registering
//! it; dispatch itself does not change.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use schemars::Schema;
use tracing::{debug, instrument, warn};

use crate::{
    JsonObject,
    error::{RegistryError, ToolError},
};

/// Behavioral hints advertised alongside a tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolHints {
    /// The tool does not modify its environment.
    pub read_only: bool,
    /// Repeating a call with the same arguments has no additional effect.
    pub idempotent: bool,
    /// The tool talks to an open, external world whose contents are not
    /// exhaustively enumerable.
    pub open_world: bool,
}

/// Immutable metadata describing a tool.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    /// Name callers use to invoke the tool.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema of the accepted arguments.
    pub input_schema: Schema,
    /// Behavioral hints.
    pub hints: ToolHints,
}

/// An invocable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Returns the tool's metadata.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Runs the tool with raw arguments and returns its text output.
    async fn call(&self, arguments: JsonObject) -> Result<String, ToolError>;
}

/// Registry of tools keyed by name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its descriptor name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if the name is already taken.
    pub fn register(&mut self, tool: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let name = tool.descriptor().name.clone();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateId(name));
        }
        debug!(tool = %name, "Registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Returns the descriptors of all registered tools, ordered by name.
    pub fn list(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values().map(|tool| tool.descriptor())
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invokes the tool registered as `name`.
    ///
    /// # Errors
    ///
    /// - [`ToolError::UnknownOperation`] if no tool has that name; the
    ///   handler is never reached
    /// - [`ToolError::MissingArguments`] if `arguments` is `None`
    /// - any error returned by the handler, unchanged
    #[instrument(skip(self, arguments))]
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<String, ToolError> {
        let Some(tool) = self.tools.get(name) else {
            warn!("Unknown tool requested");
            return Err(ToolError::UnknownOperation(name.to_string()));
        };
        let arguments = arguments.ok_or(ToolError::MissingArguments)?;
        tool.call(arguments).await
    }
}
