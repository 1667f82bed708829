//! The conversion entry point.
//!
//! [`Converter::convert`] runs the three phases in order and stops at the
//! first one that ends the call:
//!
//! ```text
//! validate ─▶ submit ─┬─(402)──────────────────────▶ PaymentRequired
//!                     └─(200)─▶ poll ─▶ fetch ─────▶ Complete { url }
//! ```
//!
//! Nothing is retried and nothing outlives the call. A transient failure
//! mid-poll loses the job from the caller's point of view, since no job
//! identifier is handed out; the caller resubmits from scratch.

use crate::config::ServerConfig;
use crate::error::Markdown2PdfError;
use crate::output::ConversionOutcome;
use crate::workflow::request::ConversionRequest;
use crate::workflow::submit::{submit, Submission};
use crate::workflow::transport::{HttpTransport, ReqwestTransport};
use crate::workflow::{fetch, poll};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Drives conversion jobs against one backend.
#[derive(Clone)]
pub struct Converter {
    transport: Arc<dyn HttpTransport>,
    config: ServerConfig,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("transport", &"<dyn HttpTransport>")
            .field("config", &self.config)
            .finish()
    }
}

impl Converter {
    /// Use an explicit transport (a scripted one in tests).
    pub fn new(config: ServerConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, config }
    }

    /// Talk to the configured backend over HTTP.
    pub fn from_config(config: ServerConfig) -> Result<Self, Markdown2PdfError> {
        let timeout = config.http_timeout_secs.map(Duration::from_secs);
        let transport = ReqwestTransport::new(timeout)
            .map_err(|e| Markdown2PdfError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Convert the document described by `params`.
    ///
    /// # Errors
    /// - [`Markdown2PdfError::InvalidParams`] before any network I/O when
    ///   `text_body` or `title` is missing or empty
    /// - a phase-specific variant when the backend refuses or a round trip
    ///   fails
    pub async fn convert(&self, params: Option<&Value>) -> Result<ConversionOutcome, Markdown2PdfError> {
        let request = ConversionRequest::from_params(params)?;
        let start = Instant::now();

        let outcome = self.run(&request).await;
        match &outcome {
            Ok(ConversionOutcome::Complete { url }) => info!(
                title = %request.title,
                %url,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Conversion complete"
            ),
            Ok(ConversionOutcome::PaymentRequired(_)) => {
                info!(title = %request.title, "Conversion awaiting payment")
            }
            Err(e) => warn!(title = %request.title, error = %e, "Conversion failed"),
        }
        outcome
    }

    async fn run(&self, request: &ConversionRequest) -> Result<ConversionOutcome, Markdown2PdfError> {
        let base = &self.config.base_url;
        let submit_url = self
            .config
            .submit_url()
            .map_err(|e| Markdown2PdfError::InvalidConfig(format!("submit URL: {e}")))?;
        let transport = self.transport.as_ref();

        // ── Phase 1: submit ──────────────────────────────────────────────
        let location = match submit(transport, base, &submit_url, request).await? {
            Submission::PaymentRequired(challenge) => {
                return Ok(ConversionOutcome::PaymentRequired(challenge));
            }
            Submission::Accepted { location } => location,
        };

        // ── Phase 2: poll ────────────────────────────────────────────────
        let result_location = poll::wait_for_result(transport, base, location, &self.config.poll).await?;

        // ── Phase 3: fetch ───────────────────────────────────────────────
        let url = fetch::fetch_result(transport, &result_location).await?;
        Ok(ConversionOutcome::Complete { url })
    }
}
