//! In-process transports and a tracing capture layer for unit tests.

use async_trait::async_trait;
use serde_json::json;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};
use tracing::{
    field::{Field, Visit},
    Event, Subscriber,
};
use tracing_subscriber::layer::{Context, Layer};

use crate::{
    types::{JsonRpcResponse, RequestEnvelope},
    upstream::{Transport, UpstreamError},
};

/// Answers every request with `{"servedBy": <id>, "method": <method>}`, echoing the
/// request id.
pub(crate) struct StaticTransport {
    id: String,
}

impl StaticTransport {
    pub(crate) fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn send(&self, envelope: &RequestEnvelope) -> Result<JsonRpcResponse, UpstreamError> {
        Ok(JsonRpcResponse::success(
            json!({ "servedBy": self.id, "method": envelope.method() }),
            json!(envelope.request.id),
        ))
    }
}

/// Fails every request with the error produced by `make_error`.
pub(crate) struct FailingTransport {
    make_error: Box<dyn Fn() -> UpstreamError + Send + Sync>,
}

impl FailingTransport {
    pub(crate) fn new(make_error: impl Fn() -> UpstreamError + Send + Sync + 'static) -> Self {
        Self { make_error: Box::new(make_error) }
    }
}

#[async_trait]
impl Transport for FailingTransport {
    async fn send(&self, _envelope: &RequestEnvelope) -> Result<JsonRpcResponse, UpstreamError> {
        Err((self.make_error)())
    }
}

/// Records every event's fields as strings, keyed by field name.
#[derive(Clone, Default)]
pub(crate) struct CapturedEvents {
    events: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl CapturedEvents {
    /// Events whose `message` field equals `message`, in emission order.
    pub(crate) fn with_message(&self, message: &str) -> Vec<HashMap<String, String>> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|fields| fields.get("message").map(String::as_str) == Some(message))
            .cloned()
            .collect()
    }
}

struct FieldRecorder<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldRecorder<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldRecorder(&mut fields));
        self.events.lock().unwrap().push(fields);
    }
}
