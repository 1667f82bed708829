//! Routes decoded requests to protocol handlers or the conversion workflow.
//!
//! One frame in, at most one [`Response`] out. Every failure inside a
//! request, from a bad envelope to a dropped backend connection, becomes an
//! error response for that request; nothing propagates past
//! [`Dispatcher::handle_frame`].

use crate::config::ServerConfig;
use crate::convert::Converter;
use crate::prompts::{self, PROMPT_NAME, PROTOCOL_VERSION, TOOL_NAME};
use crate::protocol::{self, Incoming, Request, Response, RpcError};
use serde_json::{json, Value};
use tracing::debug;

/// Stateless request router. Requests are handled one at a time by the
/// caller; the dispatcher holds no per-request state.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    converter: Converter,
}

impl Dispatcher {
    pub fn new(converter: Converter) -> Self {
        Self { converter }
    }

    fn config(&self) -> &ServerConfig {
        self.converter.config()
    }

    /// Decode and handle one frame. `None` means nothing must be written.
    pub async fn handle_frame(&self, frame: &str) -> Option<Response> {
        match protocol::decode(frame) {
            Incoming::Call(request) => self.handle_request(request).await,
            Incoming::Ignored => {
                debug!("Ignoring initialized notification");
                None
            }
            Incoming::Rejected(response) => {
                debug!(
                    code = response.rpc_error().map(|e| e.code),
                    "Rejected frame"
                );
                Some(response)
            }
        }
    }

    /// Handle a request whose envelope is already valid.
    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        debug!(method = %request.method, id = %request.id, "Handling request");

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request),
            "resources/list" => Response::success(request.id, json!({ "resources": [] })),
            "prompts/list" => Response::success(
                request.id,
                json!({ "prompts": [prompts::prompt_descriptor()] }),
            ),
            "prompts/get" => handle_prompts_get(request),
            "tools/list" => Response::success(
                request.id,
                json!({ "tools": [prompts::tool_descriptor()] }),
            ),
            "tools/call" => self.handle_tools_call(request).await,
            "ping" => Response::success(request.id, Value::Null),
            TOOL_NAME => self.handle_convert(request.id, request.params.as_ref()).await,
            method if method.starts_with("notifications/") && request.is_notification() => {
                debug!(%method, "Ignoring notification");
                return None;
            }
            method => {
                debug!(%method, "Method not found");
                Response::error(request.id, RpcError::method_not_found(method))
            }
        };
        Some(response)
    }

    fn handle_initialize(&self, request: &Request) -> Response {
        debug!(
            request = %json!({"id": request.id, "params": request.params}),
            "Received initialize request"
        );
        let config = self.config();
        let response = Response::success(
            request.id.clone(),
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": { "listChanged": true },
                    "prompts": { "listChanged": true },
                    "resources": {}
                },
                "serverInfo": {
                    "name": config.server_name,
                    "version": config.server_version
                }
            }),
        );
        debug!(protocol_version = PROTOCOL_VERSION, "Sending initialize response");
        response
    }

    async fn handle_tools_call(&self, request: Request) -> Response {
        if request.param("name").and_then(Value::as_str) != Some(TOOL_NAME) {
            return Response::error(request.id, RpcError::invalid_params("Invalid tool name"));
        }
        let arguments = request.param("arguments");
        self.handle_convert(request.id.clone(), arguments).await
    }

    async fn handle_convert(&self, id: Value, params: Option<&Value>) -> Response {
        match self.converter.convert(params).await {
            Ok(outcome) => Response::success(id, outcome.to_tool_result()),
            Err(e) => Response::error(id, e.into()),
        }
    }
}

fn handle_prompts_get(request: Request) -> Response {
    if request.param("name").and_then(Value::as_str) != Some(PROMPT_NAME) {
        return Response::error(request.id, RpcError::invalid_params("Invalid prompt name"));
    }
    let rendered = prompts::render_prompt(request.param("arguments"));
    Response::success(request.id, rendered)
}
