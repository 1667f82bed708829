//! CLI binary for markdown2pdf-mcp.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ServerConfig` and serves MCP over stdin/stdout. Logs go to stderr;
//! stdout carries nothing but protocol responses.

use anyhow::{Context, Result};
use clap::Parser;
use markdown2pdf_mcp::{serve_stdio, Converter, Dispatcher, ServerConfig};
use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve with defaults (QA backend)
  markdown2pdf-mcp

  # Point at another backend, poll every second, give up after 10 minutes
  markdown2pdf-mcp --base-url https://api.example.com --poll-interval-ms 1000 --max-poll-attempts 600

  # Claude Desktop / MCP client configuration
  {
    "mcpServers": {
      "markdown2pdf": { "command": "markdown2pdf-mcp" }
    }
  }

ENVIRONMENT VARIABLES:
  MARKDOWN2PDF_BASE_URL           Backend base URL
  MARKDOWN2PDF_SUBMIT_PATH        Submission endpoint path
  MARKDOWN2PDF_POLL_INTERVAL_MS   Delay between job status checks
  MARKDOWN2PDF_MAX_POLL_ATTEMPTS  Stop polling after this many checks
  MARKDOWN2PDF_HTTP_TIMEOUT       Per-request HTTP timeout in seconds
  RUST_LOG                        Log filter (overrides --verbose/--quiet)
"#;

/// Serve the markdown2pdf MCP tool over stdin/stdout.
#[derive(Parser, Debug)]
#[command(
    name = "markdown2pdf-mcp",
    version,
    about = "MCP server: convert Markdown to PDF, paid with Lightning",
    long_about = "Speaks newline-delimited JSON-RPC 2.0 (Model Context Protocol) on stdin/stdout \
and exposes a single `markdown2pdf` tool. Each conversion is submitted to a Lightning-paywalled \
backend; when payment is required the tool returns the invoice and QR code, and the client \
resubmits the same request after paying.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Conversion backend base URL.
    #[arg(long, env = "MARKDOWN2PDF_BASE_URL", default_value = markdown2pdf_mcp::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Submission endpoint path, relative to the base URL.
    #[arg(long, env = "MARKDOWN2PDF_SUBMIT_PATH", default_value = markdown2pdf_mcp::config::DEFAULT_SUBMIT_PATH)]
    submit_path: String,

    /// Delay between job status checks, in milliseconds.
    #[arg(long, env = "MARKDOWN2PDF_POLL_INTERVAL_MS", default_value_t = 3000)]
    poll_interval_ms: u64,

    /// Stop polling a job after this many status checks (default: never).
    #[arg(long, env = "MARKDOWN2PDF_MAX_POLL_ATTEMPTS",
          value_parser = clap::value_parser!(u32).range(1..))]
    max_poll_attempts: Option<u32>,

    /// Per-request HTTP timeout in seconds (default: none).
    #[arg(long, env = "MARKDOWN2PDF_HTTP_TIMEOUT")]
    http_timeout: Option<u64>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MARKDOWN2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, env = "MARKDOWN2PDF_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // stdout is the protocol channel; every diagnostic goes to stderr.
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    let config = build_config(&cli)?;
    tracing::info!(
        base_url = %config.base_url,
        submit_path = %config.submit_path,
        poll_interval_ms = config.poll.interval.as_millis() as u64,
        "Starting markdown2pdf MCP server"
    );

    let converter = Converter::from_config(config).context("Failed to create HTTP client")?;
    let dispatcher = Dispatcher::new(converter);

    serve_stdio(&dispatcher)
        .await
        .context("MCP stdio transport failed")?;
    Ok(())
}

/// Map CLI args to `ServerConfig`.
fn build_config(cli: &Cli) -> Result<ServerConfig> {
    ServerConfig::builder()
        .base_url(cli.base_url.clone())
        .submit_path(cli.submit_path.clone())
        .poll_interval(Duration::from_millis(cli.poll_interval_ms))
        .max_poll_attempts(cli.max_poll_attempts)
        .http_timeout_secs(cli.http_timeout)
        .build()
        .context("Invalid configuration")
}
