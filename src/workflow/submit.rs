//! Phase 1: submit the document.
//!
//! The payment gate can only be discovered by trying: there is no "do I
//! need to pay?" endpoint. A 402 therefore ends this call successfully with
//! a [`PaymentChallenge`]; the caller pays out of band and resubmits the
//! whole request, which performs a brand-new POST.

use crate::config::resolve_location;
use crate::error::Markdown2PdfError;
use crate::workflow::payment::{Challenge, PaymentChallenge};
use crate::workflow::request::ConversionRequest;
use crate::workflow::transport::{HttpTransport, TransportError};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

const STATUS_OK: u16 = 200;
const STATUS_PAYMENT_REQUIRED: u16 = 402;

/// What the submission endpoint decided.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The job is running at `location`.
    Accepted { location: Url },
    /// Nothing runs until the caller pays.
    PaymentRequired(PaymentChallenge),
}

#[derive(Debug, Deserialize)]
struct Accepted {
    #[serde(default)]
    path: Option<String>,
}

/// POST `request` to `submit_url` and classify the reply.
pub async fn submit(
    transport: &dyn HttpTransport,
    base: &Url,
    submit_url: &Url,
    request: &ConversionRequest,
) -> Result<Submission, Markdown2PdfError> {
    info!(url = %submit_url, title = %request.title, "Submitting document");

    let reply = transport
        .post_json(submit_url, &request.payload())
        .await
        .map_err(submit_failed)?;

    match reply.status {
        STATUS_PAYMENT_REQUIRED => {
            let body: Value = reply.json().map_err(submit_failed)?;
            let challenge = Challenge::from_body(&body)?.resolve(transport, base).await?;
            info!("Backend requires payment before conversion");
            Ok(Submission::PaymentRequired(challenge))
        }
        STATUS_OK => {
            let accepted: Accepted = reply.json().map_err(submit_failed)?;
            let path = accepted
                .path
                .filter(|p| !p.is_empty())
                .ok_or(Markdown2PdfError::MissingJobPath)?;
            let location = resolve_location(base, &path).map_err(|e| {
                submit_failed(TransportError::Other(format!("invalid job path '{path}': {e}")))
            })?;
            info!(%location, "Job accepted");
            Ok(Submission::Accepted { location })
        }
        status => {
            warn!(status, "Unexpected submission status");
            Err(Markdown2PdfError::UnexpectedStatus { status })
        }
    }
}

fn submit_failed(source: TransportError) -> Markdown2PdfError {
    Markdown2PdfError::SubmitFailed { source }
}
