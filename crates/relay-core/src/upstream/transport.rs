use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

use crate::{
    types::{JsonRpcResponse, RequestEnvelope},
    upstream::{http_client::HttpClient, UpstreamError},
};

/// Default per-request timeout for HTTP transports.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends one request envelope to one fixed upstream endpoint.
///
/// The dispatch core depends only on this shape. It never looks at the wire encoding,
/// never retries, and treats every `Err` as final for that call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the network round trip for `envelope`.
    ///
    /// Cancellation and timeouts are the implementation's responsibility; the envelope's
    /// [`RequestOptions`](crate::types::RequestOptions) carry any per-call overrides.
    async fn send(&self, envelope: &RequestEnvelope) -> Result<JsonRpcResponse, UpstreamError>;
}

/// JSON-RPC 2.0 over HTTP POST, bound to a single URL.
///
/// Server-reported RPC errors (a response carrying an `error` member) are surfaced as
/// [`UpstreamError::RpcError`] so callers see every upstream failure through one channel.
pub struct HttpTransport {
    url: String,
    http_client: Arc<HttpClient>,
    default_timeout: Duration,
}

impl HttpTransport {
    #[must_use]
    pub fn new(url: impl Into<String>, http_client: Arc<HttpClient>) -> Self {
        Self::with_timeout(url, http_client, DEFAULT_REQUEST_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(
        url: impl Into<String>,
        http_client: Arc<HttpClient>,
        default_timeout: Duration,
    ) -> Self {
        Self { url: url.into(), http_client, default_timeout }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, envelope: &RequestEnvelope) -> Result<JsonRpcResponse, UpstreamError> {
        let timeout = envelope.options.timeout.unwrap_or(self.default_timeout);

        let body = serde_json::to_vec(&envelope.request).map_err(|e| {
            UpstreamError::InvalidRequest(format!("Failed to serialize request: {e}"))
        })?;

        let start_time = std::time::Instant::now();
        let response_bytes = self
            .http_client
            .send_request(&self.url, bytes::Bytes::from(body), timeout, &envelope.options.headers)
            .await?;

        tracing::debug!(
            method = %envelope.request.method,
            request_id = envelope.request.id,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "upstream responded"
        );

        let response: JsonRpcResponse = serde_json::from_slice(&response_bytes)
            .map_err(|e| UpstreamError::InvalidResponse(format!("Invalid JSON: {e}")))?;

        if let Some(error) = &response.error {
            return Err(UpstreamError::RpcError(error.code, error.message.clone()));
        }

        Ok(response)
    }
}
