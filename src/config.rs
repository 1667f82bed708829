//! Configuration types for the MCP server and its conversion backend.
//!
//! Everything the server needs to know about the outside world lives in
//! [`ServerConfig`], built via its [`ServerConfigBuilder`]. The binary maps
//! command-line flags and environment variables onto the builder; tests
//! build one pointing at a fake backend with a zero poll interval.

use crate::error::Markdown2PdfError;
use reqwest::Url;
use std::time::Duration;

/// Default conversion backend host.
pub const DEFAULT_BASE_URL: &str = "https://intelligence-api-qa.ent.sdy.ai";

/// Default submission endpoint, relative to [`DEFAULT_BASE_URL`].
pub const DEFAULT_SUBMIT_PATH: &str = "/v1/document/l402/markdown";

/// Default delay between two job status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Configuration for the server and the backend it talks to.
///
/// Built via [`ServerConfig::builder()`]; `ServerConfig::builder().build()`
/// yields the defaults.
///
/// # Example
/// ```rust
/// use markdown2pdf_mcp::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::builder()
///     .base_url("http://localhost:8080")
///     .poll_interval(Duration::from_millis(500))
///     .build()
///     .unwrap();
/// assert_eq!(
///     config.submit_url().unwrap().as_str(),
///     "http://localhost:8080/v1/document/l402/markdown"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Backend base URL. Backend-relative follow-up paths resolve against it.
    pub base_url: Url,

    /// Path of the submission endpoint, relative to `base_url`.
    pub submit_path: String,

    /// How the workflow waits on a running job.
    pub poll: PollPolicy,

    /// Per-request HTTP timeout in seconds. Default: none.
    ///
    /// A job the backend never finishes is polled forever regardless; this
    /// only bounds a single round trip.
    pub http_timeout_secs: Option<u64>,

    /// Name reported in the `initialize` handshake.
    pub server_name: String,

    /// Version reported in the `initialize` handshake.
    pub server_version: String,
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`, preloaded with the defaults.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Full URL of the submission endpoint.
    pub fn submit_url(&self) -> Result<Url, url::ParseError> {
        resolve_location(&self.base_url, &self.submit_path)
    }
}

/// Turn a backend-supplied location into an absolute URL.
///
/// Absolute `http(s)` URLs are used as-is. Paths starting with `/` are
/// appended to the base URL verbatim, so a base carrying a path prefix keeps
/// it. Anything else is joined with standard relative-reference rules.
pub fn resolve_location(base: &Url, location: &str) -> Result<Url, url::ParseError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Url::parse(location)
    } else if location.starts_with('/') {
        Url::parse(&format!("{}{}", base.as_str().trim_end_matches('/'), location))
    } else {
        base.join(location)
    }
}

/// Builder for [`ServerConfig`].
///
/// The base URL is kept as text until [`build`](Self::build), which is the
/// only place it is parsed.
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    base_url: String,
    submit_path: String,
    poll: PollPolicy,
    http_timeout_secs: Option<u64>,
    server_name: String,
    server_version: String,
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            submit_path: DEFAULT_SUBMIT_PATH.to_string(),
            poll: PollPolicy::default(),
            http_timeout_secs: None,
            server_name: "markdown2pdf".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn submit_path(mut self, path: impl Into<String>) -> Self {
        self.submit_path = path.into();
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    pub fn max_poll_attempts(mut self, attempts: Option<u32>) -> Self {
        self.poll.max_attempts = attempts;
        self
    }

    pub fn http_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.http_timeout_secs = secs;
        self
    }

    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn server_version(mut self, version: impl Into<String>) -> Self {
        self.server_version = version.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, Markdown2PdfError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| {
            Markdown2PdfError::InvalidConfig(format!("base URL '{}' is not valid: {e}", self.base_url))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Markdown2PdfError::InvalidConfig(format!(
                "base URL must be http or https, got '{}'",
                base_url.scheme()
            )));
        }

        if self.submit_path.trim().is_empty() {
            return Err(Markdown2PdfError::InvalidConfig(
                "submit path must not be empty".into(),
            ));
        }
        resolve_location(&base_url, &self.submit_path).map_err(|e| {
            Markdown2PdfError::InvalidConfig(format!(
                "submit path '{}' does not resolve against '{base_url}': {e}",
                self.submit_path
            ))
        })?;
        if self.poll.max_attempts == Some(0) {
            return Err(Markdown2PdfError::InvalidConfig(
                "max poll attempts must be ≥ 1 when set".into(),
            ));
        }
        if self.server_name.trim().is_empty() {
            return Err(Markdown2PdfError::InvalidConfig(
                "server name must not be empty".into(),
            ));
        }

        Ok(ServerConfig {
            base_url,
            submit_path: self.submit_path,
            poll: self.poll,
            http_timeout_secs: self.http_timeout_secs,
            server_name: self.server_name,
            server_version: self.server_version,
        })
    }
}

// ── Policies ─────────────────────────────────────────────────────────────

/// How a running job is polled.
///
/// The interval is fixed rather than exponential: conversions are usually
/// short, and a fixed cadence keeps the time-to-result predictable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between two status requests. Default: 3 s.
    pub interval: Duration,
    /// Give up after this many status requests. Default: never.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_l402_endpoint() {
        let config = ServerConfig::builder().build().unwrap();
        assert_eq!(
            config.submit_url().unwrap().as_str(),
            "https://intelligence-api-qa.ent.sdy.ai/v1/document/l402/markdown"
        );
        assert_eq!(config.poll.interval, Duration::from_secs(3));
        assert_eq!(config.poll.max_attempts, None);
        assert_eq!(config.server_name, "markdown2pdf");
    }

    #[test]
    fn builder_rejects_bad_base_url() {
        let err = ServerConfig::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, Markdown2PdfError::InvalidConfig(_)));

        let err = ServerConfig::builder()
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn builder_rejects_zero_attempts() {
        let err = ServerConfig::builder()
            .max_poll_attempts(Some(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, Markdown2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn resolve_absolute_and_relative_locations() {
        let base = Url::parse("https://api.example.com").unwrap();
        assert_eq!(
            resolve_location(&base, "/job/42").unwrap().as_str(),
            "https://api.example.com/job/42"
        );
        assert_eq!(
            resolve_location(&base, "https://cdn.example.com/x").unwrap().as_str(),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn rooted_paths_keep_base_prefix() {
        let base = Url::parse("https://api.example.com/qa/").unwrap();
        assert_eq!(
            resolve_location(&base, "/job/42/result").unwrap().as_str(),
            "https://api.example.com/qa/job/42/result"
        );
    }
}
