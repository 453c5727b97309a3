//! Lambda Capture MCP server.
//!
//! Usage:
//! ```bash
//! LAMBDA_CAPTURE_API_KEY=... lambda-capture-mcp            # Serve over stdio
//! lambda-capture-mcp describe                              # Print the tool listing
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lambda_capture_core::{SystemClock, semantic_search_descriptor};
use lambda_capture_mcp::{ServeArgs, build_service, run_stdio, server};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Serve the search tool over MCP stdio (default)
    Serve,

    /// Print the advertised tool listing as JSON
    Describe,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().context("failed to parse log directive")?),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli.serve).await,
        Command::Describe => describe(),
    };
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "Fatal error");
    }
    result
}

async fn serve(args: &ServeArgs) -> Result<()> {
    let service = build_service(args, |key| std::env::var(key).ok(), Arc::new(SystemClock))?;
    run_stdio(service).await
}

fn describe() -> Result<()> {
    let tools = vec![server::descriptor_to_mcp(&semantic_search_descriptor())];
    let rendered =
        serde_json::to_string_pretty(&tools).context("failed to serialize tool listing")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use lambda_capture_core::DEFAULT_ENDPOINT;

    use super::*;

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["lambda-capture-mcp"]).expect("no args should parse");

        assert_eq!(cli.command, None);
        assert_eq!(cli.serve.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cli.serve.timeout_secs, 60);
    }

    #[test]
    fn test_cli_parses_describe() {
        let cli =
            Cli::try_parse_from(["lambda-capture-mcp", "describe"]).expect("describe parses");
        assert_eq!(cli.command, Some(Command::Describe));
    }

    #[test]
    fn test_cli_rejects_api_key_flag() {
        let err = Cli::try_parse_from(["lambda-capture-mcp", "--api-key", "secret"])
            .expect_err("api key is not a flag");
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
