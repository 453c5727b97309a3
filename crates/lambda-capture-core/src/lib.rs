//! Core library for the Lambda Capture semantic search tool.
//!
//! This crate holds everything between an incoming tool invocation and the
//! text handed back to the caller:
//!
//! - [`schema`]: the declarative field table, its validator, and the JSON
//!   Schema projection advertised to callers
//! - [`tool`]: tool descriptors, the [`ToolHandler`] trait and the
//!   [`ToolRegistry`] that dispatches invocations by name
//! - [`search`]: the HTTP client for the remote semantic-search endpoint and
//!   the `macroecon_semantic_search` handler
//! - [`shaper`]: the token-budget truncation applied to search results
//! - [`error`]: the failure taxonomy and its normalized messages
//! - [`clock`]: the injectable source of "today"
//!
//! Transport concerns (MCP over stdio, configuration, logging setup) live in
//! the `lambda-capture-mcp` crate.

pub mod clock;
pub mod error;
pub mod schema;
pub mod search;
pub mod shaper;
pub mod tool;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ClientError, RegistryError, ToolError, Violation};
pub use schema::{ContentType, SearchRequest, Source};
pub use search::{
    DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, SEMANTIC_SEARCH_TOOL, SearchClientConfig,
    SemanticSearchClient, SemanticSearchTool, semantic_search_descriptor,
};
pub use shaper::{TOKEN_BUDGET, shape_results};
pub use tool::{ToolDescriptor, ToolHandler, ToolHints, ToolRegistry};

/// JSON object type used for tool arguments.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
