//! Server configuration.
//!
//! Endpoint and timeout come from CLI flags or their environment variables.
//! The API key is read only from [`API_KEY_VAR`], never from the command
//! line.

use std::time::Duration;

use clap::Args;
use lambda_capture_core::{DEFAULT_ENDPOINT, SearchClientConfig};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "LAMBDA_CAPTURE_API_KEY";

/// Errors raised while resolving configuration at startup.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The API key variable is unset or empty.
    #[error("LAMBDA_CAPTURE_API_KEY not set in environment")]
    MissingApiKey,
}

/// Command-line arguments for serving the tool.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Semantic-search endpoint URL.
    #[arg(long, env = "LAMBDA_CAPTURE_API_URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Timeout for each search request, in seconds (0 disables it).
    #[arg(long, env = "LAMBDA_CAPTURE_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

impl ServeArgs {
    /// Resolves the search client settings, reading the API key through
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] if the key is absent or blank.
    pub fn client_config<F>(&self, lookup: F) -> Result<SearchClientConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));

        Ok(SearchClientConfig::new(api_key)
            .with_endpoint(self.endpoint.clone())
            .with_timeout(timeout))
    }
}
