//! MCP server for Lambda Capture macroeconomic semantic search.
//!
//! Wires the `macroecon_semantic_search` tool from `lambda_capture_core`
//! into an [`McpService`] served over stdio.

use std::sync::Arc;

use anyhow::{Context, Result};
use lambda_capture_core::{
    Clock, SearchClientConfig, SemanticSearchClient, SemanticSearchTool, ToolRegistry,
};

pub mod config;
pub mod server;

pub use config::{API_KEY_VAR, ConfigError, ServeArgs};
pub use server::{McpService, run_stdio};

/// Server name reported during `initialize`.
pub const SERVER_NAME: &str = "lambda-capture-mcp";

/// Builds the registry holding the semantic search tool.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the tool cannot be
/// registered.
pub fn search_registry(config: SearchClientConfig, clock: Arc<dyn Clock>) -> Result<ToolRegistry> {
    let client = SemanticSearchClient::new(config).context("failed to build search client")?;
    let mut registry = ToolRegistry::new();
    registry
        .register(Arc::new(SemanticSearchTool::new(client, clock)))
        .context("failed to register semantic search tool")?;
    Ok(registry)
}

/// Resolves configuration and builds the service, without opening any
/// transport.
///
/// # Errors
///
/// Returns [`ConfigError::MissingApiKey`] if `lookup` yields no API key, or
/// an error if the registry cannot be built.
pub fn build_service<F>(args: &ServeArgs, lookup: F, clock: Arc<dyn Clock>) -> Result<McpService>
where
    F: Fn(&str) -> Option<String>,
{
    let config = args.client_config(lookup)?;
    let registry = search_registry(config, clock)?;
    Ok(McpService::new(Arc::new(registry)))
}
