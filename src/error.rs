//! Error types for the markdown2pdf-mcp library.
//!
//! Two error types reflect two layers:
//!
//! * [`Markdown2PdfError`]: a conversion could not produce an outcome
//!   (bad parameters, backend refused, transport failed mid-job). Each
//!   variant maps onto a fixed JSON-RPC error code via
//!   [`Markdown2PdfError::code`], and the `Display` text becomes the wire
//!   `message`.
//!
//! * [`crate::workflow::transport::TransportError`]: a single HTTP exchange
//!   failed. Always wrapped in the variant naming the phase it happened in,
//!   so the caller learns *where* the job was lost.
//!
//! A payment challenge is not an error. It is returned as
//! [`crate::output::ConversionOutcome::PaymentRequired`].

use crate::protocol::RpcError;
use crate::workflow::transport::TransportError;
use thiserror::Error;

/// All failures returned by [`crate::convert::Converter::convert`] and by
/// configuration building.
#[derive(Debug, Error)]
pub enum Markdown2PdfError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// The request parameters are missing or malformed. No network I/O happened.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    // ── Submit phase ──────────────────────────────────────────────────────
    /// POST to the submission endpoint failed at the transport level.
    #[error("Request failed: {source}")]
    SubmitFailed {
        #[source]
        source: TransportError,
    },

    /// The submission endpoint answered with a status other than 200 or 402.
    #[error("Request failed: Unexpected response: {status}")]
    UnexpectedStatus { status: u16 },

    /// The submission endpoint accepted the job but gave no follow-up path.
    #[error("Request failed: accepted response did not include a job path")]
    MissingJobPath,

    /// The 402 body matched neither known challenge shape.
    #[error("Request failed: unrecognised payment challenge: {detail}")]
    UnrecognisedChallenge { detail: String },

    /// Obtaining an invoice for the selected offer failed.
    #[error("Payment request failed: {reason}")]
    PaymentRequestFailed { reason: String },

    // ── Poll phase ────────────────────────────────────────────────────────
    /// GET on the job location failed at the transport level.
    #[error("Polling failed: {source}")]
    PollTransport {
        #[source]
        source: TransportError,
    },

    /// The job reached a state it cannot leave.
    #[error("Polling failed: {reason}")]
    PollFailed { reason: String },

    // ── Fetch phase ───────────────────────────────────────────────────────
    /// GET on the final location failed at the transport level.
    #[error("Failed to fetch PDF: {source}")]
    FetchFailed {
        #[source]
        source: TransportError,
    },

    /// The final resource did not carry a result URL.
    #[error("PDF URL not found in response")]
    ResultUrlMissing,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Markdown2PdfError {
    /// The JSON-RPC error code this failure is reported with.
    pub fn code(&self) -> i32 {
        match self {
            Markdown2PdfError::InvalidParams(_) => RpcError::INVALID_PARAMS,
            _ => RpcError::INTERNAL_ERROR,
        }
    }
}

impl From<Markdown2PdfError> for RpcError {
    fn from(err: Markdown2PdfError) -> Self {
        RpcError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_params_display_matches_wire_message() {
        let e = Markdown2PdfError::InvalidParams("text_body and title are required".into());
        assert_eq!(
            e.to_string(),
            "Invalid params: text_body and title are required"
        );
        assert_eq!(e.code(), -32602);
    }

    #[test]
    fn unexpected_status_mentions_code() {
        let e = Markdown2PdfError::UnexpectedStatus { status: 500 };
        let msg = e.to_string();
        assert!(msg.contains("500"), "got: {msg}");
        assert_eq!(e.code(), -32603);
    }

    #[test]
    fn transport_failures_name_their_phase() {
        let poll = Markdown2PdfError::PollTransport {
            source: TransportError::Other("connection reset".into()),
        };
        assert!(poll.to_string().starts_with("Polling failed:"));
        assert!(poll.to_string().contains("connection reset"));

        let fetch = Markdown2PdfError::FetchFailed {
            source: TransportError::Other("dns".into()),
        };
        assert!(fetch.to_string().starts_with("Failed to fetch PDF:"));
    }

    #[test]
    fn converts_into_rpc_error() {
        let rpc: RpcError = Markdown2PdfError::ResultUrlMissing.into();
        assert_eq!(rpc.code, RpcError::INTERNAL_ERROR);
        assert_eq!(rpc.message, "PDF URL not found in response");
        assert!(rpc.data.is_none());
    }
}
