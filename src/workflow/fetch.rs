//! Phase 3: read the finished job's result.

use crate::error::Markdown2PdfError;
use crate::workflow::transport::HttpTransport;
use reqwest::Url;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct FinalResource {
    #[serde(default)]
    url: Option<String>,
}

/// GET the final location once and return the PDF URL it names.
pub async fn fetch_result(transport: &dyn HttpTransport, location: &Url) -> Result<String, Markdown2PdfError> {
    let reply = transport
        .get(location)
        .await
        .map_err(|source| Markdown2PdfError::FetchFailed { source })?;
    let resource: FinalResource = reply
        .json()
        .map_err(|source| Markdown2PdfError::FetchFailed { source })?;

    let url = resource
        .url
        .filter(|u| !u.is_empty())
        .ok_or(Markdown2PdfError::ResultUrlMissing)?;
    info!(%url, "PDF ready");
    Ok(url)
}
