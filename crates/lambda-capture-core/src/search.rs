//! The `macroecon_semantic_search` tool and its HTTP client.
//!
//! The remote endpoint takes a `GET` request whose JSON body carries the API
//! key alongside the search parameters, and answers with a JSON array of
//! result items.

use std::{error::Error as _, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    JsonObject,
    clock::Clock,
    error::{ClientError, ToolError},
    schema::{SearchRequest, input_schema},
    shaper::{TOKEN_BUDGET, render_results, shape_results},
    tool::{ToolDescriptor, ToolHandler, ToolHints},
};

/// Name of the semantic search tool.
pub const SEMANTIC_SEARCH_TOOL: &str = "macroecon_semantic_search";

/// Production semantic-search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://app.lambda-capture.com/semantic-search/";

const DESCRIPTION: &str = "Perform semantic search on Macroeconomic Data Knowledge Base from \
                           Federal Reserve, Bank of England, and European Central Bank.";

/// Request timeout applied unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings for [`SemanticSearchClient`].
#[derive(Clone)]
pub struct SearchClientConfig {
    /// API key sent in the request body.
    pub api_key: String,
    /// Absolute URL of the semantic-search endpoint.
    pub endpoint: String,
    /// Per-request timeout; `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl SearchClientConfig {
    /// Creates a config for the production endpoint with
    /// [`DEFAULT_TIMEOUT`].
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Overrides the endpoint URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for SearchClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClientConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Request body sent to the remote endpoint.
#[derive(Serialize)]
struct SearchPayload<'a> {
    api_key: &'a str,
    #[serde(flatten)]
    request: &'a SearchRequest,
}

/// HTTP client for the semantic-search endpoint.
#[derive(Clone)]
pub struct SemanticSearchClient {
    http: reqwest::Client,
    endpoint: reqwest::Url,
    api_key: String,
}

impl SemanticSearchClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidEndpoint`] if the endpoint is not an
    /// absolute URL, or [`ClientError::Http`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: SearchClientConfig) -> Result<Self, ClientError> {
        let endpoint =
            reqwest::Url::parse(config.endpoint.trim()).map_err(|e| ClientError::InvalidEndpoint {
                url: config.endpoint.clone(),
                reason: e.to_string(),
            })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint,
            api_key: config.api_key,
        })
    }

    /// Returns the endpoint this client queries.
    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    /// Runs a search and returns the raw result items in remote order.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::RemoteCallFailed`] if the request cannot be sent,
    /// the remote answers with a non-success status, or the body is not a
    /// JSON array.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<Value>, ToolError> {
        let payload = SearchPayload {
            api_key: &self.api_key,
            request,
        };

        let response = self
            .http
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ToolError::RemoteCallFailed(error_chain(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = remote_error_message(&body)
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            return Err(ToolError::RemoteCallFailed(message));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| ToolError::RemoteCallFailed(format!("invalid response body: {e}")))
    }
}

/// Extracts the `error` field from a structured error body.
///
/// Falsy values (`null`, `false`, `0`, `""`) count as absent.
fn remote_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}

/// Formats an error with its chain of causes.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Returns the descriptor advertised for `macroecon_semantic_search`.
pub fn semantic_search_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: SEMANTIC_SEARCH_TOOL.to_string(),
        description: DESCRIPTION.to_string(),
        input_schema: input_schema(),
        hints: ToolHints {
            read_only: true,
            idempotent: true,
            open_world: true,
        },
    }
}

/// The `macroecon_semantic_search` tool.
///
/// Validates arguments, queries the remote endpoint, and trims the results
/// to [`TOKEN_BUDGET`] before rendering them as JSON text.
pub struct SemanticSearchTool {
    descriptor: ToolDescriptor,
    client: SemanticSearchClient,
    clock: Arc<dyn Clock>,
}

impl SemanticSearchTool {
    /// Creates the tool around `client`, resolving date defaults with `clock`.
    pub fn new(client: SemanticSearchClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            descriptor: semantic_search_descriptor(),
            client,
            clock,
        }
    }

    /// Validates, searches and shapes in one step.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidInput`] for schema violations and
    /// [`ToolError::RemoteCallFailed`] for remote failures.
    pub async fn run(&self, arguments: &JsonObject) -> Result<String, ToolError> {
        let request = SearchRequest::from_arguments(arguments, self.clock.as_ref())?;
        debug!(
            max_results = request.max_results,
            score = request.score,
            start_date = %request.start_date,
            end_date = %request.end_date,
            "Running semantic search"
        );

        let items = self.client.search(&request).await?;
        let received = items.len();
        let shaped = shape_results(items, TOKEN_BUDGET);
        info!(received, returned = shaped.len(), "Semantic search completed");

        Ok(render_results(&shaped)?)
    }
}

#[async_trait]
impl ToolHandler for SemanticSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, arguments: JsonObject) -> Result<String, ToolError> {
        self.run(&arguments).await
    }
}
