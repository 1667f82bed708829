//! JSON-RPC 2.0 envelope types.
//!
//! Incoming frames are parsed into a [`serde_json::Value`] first and only then
//! inspected field by field. Deserializing straight into a rigid struct would
//! collapse "not JSON", "wrong version" and "no method" into one serde error,
//! but each of those has its own error code and its own rule for which `id`
//! the reply carries.
//!
//! ## Decode order
//!
//! ```text
//! frame ─▶ JSON? ──no──▶ -32700, id null
//!           │
//!           ├─ method == notifications/initialized ─▶ ignored
//!           ├─ jsonrpc != "2.0" ─▶ -32600, id null
//!           ├─ id not string/number/null ─▶ -32600, id null
//!           ├─ method missing / not a string ─▶ -32600, request id
//!           └─▶ Request
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// The only protocol version tag accepted or emitted.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method name of the client's post-handshake notification.
pub const INITIALIZED_NOTIFICATION: &str = "notifications/initialized";

// ── Errors ───────────────────────────────────────────────────────────────

/// Wire-format JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error() -> Self {
        Self::new(Self::PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request() -> Self {
        Self::new(Self::INVALID_REQUEST, "Invalid Request")
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, "Method not found").with_data(json!({ "method": method }))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, message)
    }
}

// ── Response ─────────────────────────────────────────────────────────────

/// Exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(RpcError),
}

/// JSON-RPC 2.0 response. `id` is always serialized, `null` included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn error(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(error),
        }
    }

    /// The error object, if this is an error response.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match &self.outcome {
            Outcome::Error(e) => Some(e),
            Outcome::Result(_) => None,
        }
    }

    /// Serialize as a single line (no trailing newline).
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

// ── Request ──────────────────────────────────────────────────────────────

/// A request whose envelope has been validated.
///
/// `params` is left as an open bag; handlers pull out the fields they need
/// and validate each one where it is used.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// `Value::Null` when the frame had no `id` or an explicit `null`.
    pub id: Value,
    pub method: String,
    pub params: Option<Value>,
}

impl Request {
    /// Absent or null id.
    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }

    /// `params` as an object, if it is one.
    pub fn params_object(&self) -> Option<&Map<String, Value>> {
        self.params.as_ref().and_then(Value::as_object)
    }

    /// Look up a single named parameter.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params_object().and_then(|p| p.get(key))
    }
}

/// Result of decoding one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// A well-formed request to route.
    Call(Request),
    /// A message that must not be answered.
    Ignored,
    /// The frame was rejected; send this response and move on.
    Rejected(Response),
}

/// Decode one frame into an [`Incoming`] message.
pub fn decode(frame: &str) -> Incoming {
    let value: Value = match serde_json::from_str(frame) {
        Ok(v) => v,
        Err(e) => {
            return Incoming::Rejected(Response::error(
                Value::Null,
                RpcError::parse_error().with_data(Value::String(e.to_string())),
            ));
        }
    };

    let Some(obj) = value.as_object() else {
        return Incoming::Rejected(Response::error(Value::Null, RpcError::invalid_request()));
    };

    if obj.get("method").and_then(Value::as_str) == Some(INITIALIZED_NOTIFICATION) {
        return Incoming::Ignored;
    }

    if obj.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
        return Incoming::Rejected(Response::error(Value::Null, RpcError::invalid_request()));
    }

    let id = match obj.get("id") {
        None => Value::Null,
        Some(id @ (Value::Null | Value::String(_) | Value::Number(_))) => id.clone(),
        Some(_) => {
            return Incoming::Rejected(Response::error(Value::Null, RpcError::invalid_request()));
        }
    };

    let Some(method) = obj.get("method").and_then(Value::as_str) else {
        return Incoming::Rejected(Response::error(id, RpcError::invalid_request()));
    };

    Incoming::Call(Request {
        id,
        method: method.to_string(),
        params: obj.get("params").cloned(),
    })
}
