//! Shared helpers for integration tests: a scripted backend and a
//! dispatcher wired to it.

#![allow(dead_code)]

use async_trait::async_trait;
use markdown2pdf_mcp::{
    Converter, Dispatcher, HttpReply, HttpTransport, ServerConfig, TransportError,
};
use reqwest::Url;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const BASE_URL: &str = "https://backend.test";

/// One request the scripted backend received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Post { url: String, body: Value },
    Get { url: String },
}

impl Call {
    pub fn url(&self) -> &str {
        match self {
            Call::Post { url, .. } | Call::Get { url } => url,
        }
    }
}

/// Replies handed out in order; every request is recorded.
///
/// Running out of replies is reported as a transport failure so a test
/// that under-scripts fails loudly instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<HttpReply, String>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, status: u16, body: Value) -> &Self {
        self.push(Ok(HttpReply::json_body(status, &body)))
    }

    pub fn reply_raw(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(HttpReply::new(status, body)))
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.push(Err(message.to_string()))
    }

    fn push(&self, reply: Result<HttpReply, String>) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    fn next(&self, call: Call) -> Result<HttpReply, TransportError> {
        self.calls.lock().unwrap().push(call);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(TransportError::Other(message)),
            None => Err(TransportError::Other("script exhausted".into())),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedBackend {
    async fn post_json(&self, url: &Url, body: &Value) -> Result<HttpReply, TransportError> {
        self.next(Call::Post {
            url: url.to_string(),
            body: body.clone(),
        })
    }

    async fn get(&self, url: &Url) -> Result<HttpReply, TransportError> {
        self.next(Call::Get {
            url: url.to_string(),
        })
    }
}

/// Route library logs to the test harness. `RUST_LOG=debug` shows them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config pointing at [`BASE_URL`] with no delay between polls.
pub fn test_config() -> ServerConfig {
    ServerConfig::builder()
        .base_url(BASE_URL)
        .poll_interval(Duration::ZERO)
        .build()
        .unwrap()
}

pub fn dispatcher_with(backend: &Arc<ScriptedBackend>, config: ServerConfig) -> Dispatcher {
    let transport: Arc<dyn HttpTransport> = backend.clone();
    Dispatcher::new(Converter::new(config, transport))
}

pub fn dispatcher(backend: &Arc<ScriptedBackend>) -> Dispatcher {
    dispatcher_with(backend, test_config())
}

/// Handle one frame and return the response as JSON.
pub async fn roundtrip(dispatcher: &Dispatcher, frame: &str) -> Option<Value> {
    let response = dispatcher.handle_frame(frame).await?;
    Some(serde_json::from_str(&response.to_line().unwrap()).unwrap())
}

/// Decode the domain payload carried in a tool result's text block.
pub fn tool_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("tool result carries a text block");
    serde_json::from_str(text).unwrap()
}
