//! Model Context Protocol (MCP) transport.
//!
//! [`McpService`] implements `rmcp::ServerHandler` over a [`ToolRegistry`].
//! Tool failures are not protocol errors: they come back as a normal
//! `tools/call` result with `isError: true` and the failure message as text.

use std::{borrow::Cow, sync::Arc};

use anyhow::{Context, Result};
use lambda_capture_core::{ToolDescriptor, ToolRegistry};
use rmcp::{
    ErrorData, RoleServer, ServiceExt,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool, ToolAnnotations,
    },
    service::RequestContext,
    transport::stdio,
};
use tokio::signal;
use tracing::{info, warn};

use crate::SERVER_NAME;

const INSTRUCTIONS: &str = "Semantic search over macroeconomic publications from the Federal \
                            Reserve, European Central Bank, Bank of England and related sources.";

/// MCP server exposing the tools of a [`ToolRegistry`].
#[derive(Clone)]
pub struct McpService {
    registry: Arc<ToolRegistry>,
    info: ServerInfo,
}

impl McpService {
    /// Creates a service serving the tools of `registry`.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            info: default_server_info(),
        }
    }

    /// Returns a reference to the server info.
    #[must_use]
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Returns the MCP tool listing for every registered tool.
    pub fn tools(&self) -> Vec<Tool> {
        self.registry.list().map(descriptor_to_mcp).collect()
    }
}

impl ServerHandler for McpService {
    fn get_info(&self) -> ServerInfo {
        self.info.clone()
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        let tools = self.tools();
        async move { Ok(ListToolsResult::with_all_items(tools)) }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        let registry = Arc::clone(&self.registry);
        async move {
            match registry.dispatch(&request.name, request.arguments).await {
                Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
                Err(err) => {
                    warn!(tool = %request.name, error = %err, "Tool call failed");
                    Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
                }
            }
        }
    }
}

fn default_server_info() -> ServerInfo {
    let mut implementation = Implementation::from_build_env();
    implementation.name = SERVER_NAME.to_string();
    implementation.version = env!("CARGO_PKG_VERSION").to_string();

    ServerInfo {
        capabilities: ServerCapabilities::builder().enable_tools().build(),
        server_info: implementation,
        instructions: Some(INSTRUCTIONS.to_string()),
        ..Default::default()
    }
}

/// Converts a core tool descriptor into its MCP listing.
pub fn descriptor_to_mcp(descriptor: &ToolDescriptor) -> Tool {
    let input_schema = descriptor
        .input_schema
        .as_object()
        .cloned()
        .unwrap_or_default();
    let annotations = ToolAnnotations::new()
        .read_only(descriptor.hints.read_only)
        .idempotent(descriptor.hints.idempotent)
        .open_world(descriptor.hints.open_world);

    Tool {
        name: Cow::Owned(descriptor.name.clone()),
        title: None,
        description: Some(Cow::Owned(descriptor.description.clone())),
        input_schema: Arc::new(input_schema),
        output_schema: None,
        annotations: Some(annotations),
        icons: None,
        meta: None,
    }
}

/// Serves `service` over stdin/stdout until the client disconnects or
/// Ctrl+C is received.
///
/// # Errors
///
/// Returns an error if the MCP handshake fails or the server task exits
/// abnormally.
pub async fn run_stdio(service: McpService) -> Result<()> {
    let (stdin, stdout) = stdio();
    info!("Lambda Capture MCP Server running on stdio");

    let running = service
        .serve((stdin, stdout))
        .await
        .context("failed to start MCP stdio server")?;

    let cancel = running.cancellation_token();
    let mut waiting = Box::pin(running.waiting());

    tokio::select! {
        result = &mut waiting => {
            result.context("mcp stdio server exited")?;
        }
        _ = signal::ctrl_c() => {
            info!("Received shutdown signal");
            cancel.cancel();
            let _ = waiting.await;
        }
    }

    info!("Lambda Capture MCP Server stopped");
    Ok(())
}
