//! Core type definitions for JSON-RPC requests and per-call dispatch envelopes.
//!
//! # Type Categories
//!
//! ## JSON-RPC Protocol Types
//! - [`JsonRpcRequest`], [`JsonRpcResponse`], [`JsonRpcError`]: Protocol conformance
//!
//! ## Dispatch Types
//! - [`RequestEnvelope`]: One outgoing call, built fresh for every `send`
//! - [`RequestOptions`]: Transport-specific options passed through untouched

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, time::Duration};

/// JSON-RPC protocol version constant to avoid repeated allocations.
pub const JSONRPC_VERSION: &str = "2.0";

/// Pre-allocated `Cow` for JSON-RPC version - zero allocation for static usage.
pub const JSONRPC_VERSION_COW: Cow<'static, str> = Cow::Borrowed(JSONRPC_VERSION);

/// JSON-RPC 2.0 request structure.
///
/// Parameters are always an ordered list. Upstream endpoints receive the request
/// serialized exactly as shown here.
///
/// # Example
///
/// ```
/// use relay_core::types::JsonRpcRequest;
/// use serde_json::json;
///
/// let request = JsonRpcRequest::new("getBalance", vec![json!("dv3qDFk1DTF36Z62bNvrCXe9sKATA6xvVy6A798xxAS")], 7);
///
/// assert_eq!(request.method, "getBalance");
/// assert_eq!(request.id, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: Cow<'static, str>,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Vec<serde_json::Value>,
}

impl JsonRpcRequest {
    #[must_use]
    pub fn new(method: impl Into<String>, params: Vec<serde_json::Value>, id: u64) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, id, method: method.into(), params }
    }
}

/// JSON-RPC 2.0 response structure.
///
/// A response contains either a `result` (success) or an `error` (failure), but never both.
/// The dispatch client hands responses back to callers without inspecting them.
///
/// # Example
///
/// ```
/// use relay_core::types::JsonRpcResponse;
/// use serde_json::json;
///
/// let response = JsonRpcResponse::success(json!({"value": 42}), json!(1));
/// assert!(response.result.is_some());
/// assert!(response.error.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: serde_json::Value,
}

impl JsonRpcResponse {
    #[must_use]
    pub fn success(result: serde_json::Value, id: serde_json::Value) -> Self {
        Self { jsonrpc: JSONRPC_VERSION_COW, result: Some(result), error: None, id }
    }

    #[must_use]
    pub fn error(code: i32, message: impl Into<String>, id: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION_COW,
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
            id,
        }
    }
}

/// JSON-RPC 2.0 error object.
///
/// Standard codes: `-32700` parse error, `-32600` invalid request, `-32601` method not
/// found, `-32602` invalid params, `-32603` internal error, `-32000..=-32099` server errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Transport-specific options attached to a single call.
///
/// The dispatch core never reads these; they are forwarded to whichever transport
/// the policy selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the endpoint's default request timeout for this call only.
    pub timeout: Option<Duration>,
    /// Extra headers added by HTTP transports.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A single outgoing call: the JSON-RPC request plus its transport options.
///
/// Envelopes are ephemeral. One is built per `send` and dropped once the transport
/// returns.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEnvelope {
    pub request: JsonRpcRequest,
    pub options: RequestOptions,
}

impl RequestEnvelope {
    #[must_use]
    pub fn new(request: JsonRpcRequest, options: RequestOptions) -> Self {
        Self { request, options }
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.request.method
    }
}
