//! In-process transport that records what it was asked to send.

use async_trait::async_trait;
use relay_core::{
    types::{JsonRpcResponse, RequestEnvelope},
    upstream::{Transport, UpstreamError},
};
use serde_json::json;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// One call as seen by a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub method: String,
    pub request_id: u64,
    pub params: Vec<serde_json::Value>,
    pub timeout: Option<Duration>,
    pub headers: Vec<(String, String)>,
}

/// Call log shared by every transport in a pool, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Endpoints that served each call, in arrival order.
    #[must_use]
    pub fn endpoints(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.endpoint.clone()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Records every envelope into a [`CallLog`], then answers with
/// `{"servedBy": <endpoint>, "method": <method>}` or a configured error.
pub struct RecordingTransport {
    endpoint: String,
    log: CallLog,
    delay: Option<Duration>,
    failure: Option<UpstreamError>,
}

impl RecordingTransport {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, log: CallLog) -> Self {
        Self { endpoint: endpoint.into(), log, delay: None, failure: None }
    }

    /// Sleeps before answering, so concurrent calls overlap.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails every call with a clone of `error` after recording it.
    #[must_use]
    pub fn failing_with(mut self, error: UpstreamError) -> Self {
        self.failure = Some(error);
        self
    }

    #[must_use]
    pub fn into_transport(self) -> Arc<dyn Transport> {
        Arc::new(self)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, envelope: &RequestEnvelope) -> Result<JsonRpcResponse, UpstreamError> {
        self.log.push(RecordedCall {
            endpoint: self.endpoint.clone(),
            method: envelope.method().to_string(),
            request_id: envelope.request.id,
            params: envelope.request.params.clone(),
            timeout: envelope.options.timeout,
            headers: envelope.options.headers.clone(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        Ok(JsonRpcResponse::success(
            json!({ "servedBy": self.endpoint, "method": envelope.method() }),
            json!(envelope.request.id),
        ))
    }
}
