//! HTTP transport seam between the workflow and the conversion backend.
//!
//! The workflow never touches `reqwest` directly. It issues JSON POSTs and
//! plain GETs through [`HttpTransport`] and gets back the status code plus
//! the raw body text. The body is decoded by the caller because whether a
//! body has to be JSON depends on the status (a 500 page may be HTML, and
//! that is still "unexpected status 500", not "malformed body").
//!
//! Tests swap in a scripted transport; the binary uses [`ReqwestTransport`].

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// A failed HTTP exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout, or body read failure.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The body was expected to be JSON of a given shape but was not.
    #[error("invalid JSON body: {0}")]
    Body(#[from] serde_json::Error),

    /// Anything else, including failures injected by test transports.
    #[error("{0}")]
    Other(String),
}

/// Status and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Shorthand for a reply whose body is the given JSON value.
    pub fn json_body(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// The two HTTP verbs the workflow needs.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as `application/json` to `url`.
    async fn post_json(&self, url: &Url, body: &Value) -> Result<HttpReply, TransportError>;

    /// GET `url`.
    async fn get(&self, url: &Url) -> Result<HttpReply, TransportError>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport, optionally bounding each request with `timeout`.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("markdown2pdf-mcp/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn into_reply(response: reqwest::Response) -> Result<HttpReply, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpReply { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &Url, body: &Value) -> Result<HttpReply, TransportError> {
        debug!(%url, "POST");
        let response = self.client.post(url.clone()).json(body).send().await?;
        let reply = Self::into_reply(response).await?;
        debug!(%url, status = reply.status, "POST complete");
        Ok(reply)
    }

    async fn get(&self, url: &Url) -> Result<HttpReply, TransportError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let reply = Self::into_reply(response).await?;
        debug!(%url, status = reply.status, "GET complete");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_success_range() {
        assert!(HttpReply::new(200, "").is_success());
        assert!(HttpReply::new(204, "").is_success());
        assert!(!HttpReply::new(402, "").is_success());
        assert!(!HttpReply::new(500, "").is_success());
    }

    #[test]
    fn reply_json_decodes_or_reports_body_error() {
        let reply = HttpReply::json_body(200, &json!({"path": "/job/1"}));
        let v: Value = reply.json().unwrap();
        assert_eq!(v["path"], "/job/1");

        let bad = HttpReply::new(200, "<html>oops</html>");
        let err = bad.json::<Value>().unwrap_err();
        assert!(matches!(err, TransportError::Body(_)));
        assert!(err.to_string().starts_with("invalid JSON body"));
    }

    #[test]
    fn reqwest_transport_builds_with_and_without_timeout() {
        assert!(ReqwestTransport::new(None).is_ok());
        assert!(ReqwestTransport::new(Some(Duration::from_secs(5))).is_ok());
    }
}
