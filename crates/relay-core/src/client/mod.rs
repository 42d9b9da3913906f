//! The dispatch client: every outgoing call passes through here.
//!
//! ```text
//! send(method, params, options)
//!       │
//!       ▼
//! ┌──────────────────┐
//! │ RequestEnvelope  │  id assigned, params + options attached
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │  DispatchPolicy  │  index chosen (serialization point)
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   EndpointPool   │  transport resolved, dispatch logged
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │    Transport     │  single attempt, result returned unchanged
//! └──────────────────┘
//! ```

pub mod builder;
pub mod stats;

pub use builder::DispatchClientBuilder;
pub use stats::{DispatchStats, EndpointStats};

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use crate::{
    config::AppConfig,
    dispatch::{DispatchError, DispatchPolicy, MethodShardMap, PolicyKind},
    metrics,
    types::{JsonRpcRequest, JsonRpcResponse, RequestEnvelope, RequestOptions},
    upstream::EndpointPool,
};
use stats::DispatchCounters;

/// Routes JSON-RPC calls across an [`EndpointPool`] according to a [`DispatchPolicy`].
///
/// The client holds no per-call state. The only shared mutable state is the policy's
/// own (the round-robin cursor) plus observability counters that never influence
/// routing. Share one client across tasks with `Arc`.
pub struct DispatchClient {
    pool: EndpointPool,
    policy: Arc<dyn DispatchPolicy>,
    next_id: AtomicU64,
    counters: DispatchCounters,
}

impl DispatchClient {
    /// Wraps `pool` and `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PolicyMisconfigured`] if the pool is empty or the policy
    /// was built for a pool of a different size.
    pub fn new(pool: EndpointPool, policy: Arc<dyn DispatchPolicy>) -> Result<Self, DispatchError> {
        if pool.is_empty() {
            return Err(DispatchError::PolicyMisconfigured(
                "dispatch client requires at least one endpoint".to_string(),
            ));
        }

        if policy.pool_size() != pool.size() {
            return Err(DispatchError::PolicyMisconfigured(format!(
                "{} policy built for {} endpoints, pool has {}",
                policy.kind(),
                policy.pool_size(),
                pool.size()
            )));
        }

        tracing::info!(
            endpoints = pool.size(),
            policy = %policy.kind(),
            "dispatch client created"
        );

        let counters = DispatchCounters::new(pool.size());
        Ok(Self { pool, policy, next_id: AtomicU64::new(1), counters })
    }

    #[must_use]
    pub fn builder() -> DispatchClientBuilder {
        DispatchClientBuilder::new()
    }

    /// Builds an HTTP-backed client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Config`] if validation fails, or any construction error
    /// from [`DispatchClientBuilder::build`].
    pub fn from_config(config: &AppConfig) -> Result<Self, DispatchError> {
        config.validate().map_err(DispatchError::Config)?;

        let mut builder = DispatchClientBuilder::new()
            .urls(config.endpoints.urls.iter().cloned())
            .policy(config.dispatch.policy)
            .http_client_config(config.http_client_config())
            .request_timeout(config.request_timeout());

        if config.dispatch.policy == PolicyKind::MethodSharded {
            builder = builder.shard_map(config.shard_map());
        }

        builder.build()
    }

    /// Sends `method` with `params` to the endpoint chosen by the policy.
    ///
    /// Any method name is accepted. The response is returned exactly as the transport
    /// produced it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Transport`] wrapping the transport's failure, with the
    /// method and endpoint attached. No other endpoint is tried.
    pub async fn send(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<JsonRpcResponse, DispatchError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.send_request(JsonRpcRequest::new(method, params, id), options).await
    }

    /// [`send`](Self::send) with default options.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<JsonRpcResponse, DispatchError> {
        self.send(method, params, RequestOptions::default()).await
    }

    /// Dispatches a prebuilt request, keeping its id.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_request(
        &self,
        request: JsonRpcRequest,
        options: RequestOptions,
    ) -> Result<JsonRpcResponse, DispatchError> {
        let envelope = RequestEnvelope::new(request, options);

        // Selection completes before the first await so concurrent calls are ordered
        // by the policy, not by the runtime.
        let index = self.policy.select_index(envelope.method())?;
        let endpoint = self.pool.endpoint_at(index)?;
        let identifier = endpoint.identifier();

        tracing::info!(
            endpoint = %identifier,
            index,
            method = %envelope.method(),
            request_id = envelope.request.id,
            policy = %self.policy.kind(),
            "dispatching request"
        );
        metrics::record_dispatch(identifier, envelope.method());
        self.counters.record_dispatch(index);

        let start = Instant::now();
        match endpoint.transport().send(&envelope).await {
            Ok(response) => {
                metrics::record_completion(identifier, envelope.method(), start.elapsed());
                Ok(response)
            }
            Err(source) => {
                tracing::warn!(
                    endpoint = %identifier,
                    index,
                    method = %envelope.method(),
                    request_id = envelope.request.id,
                    error = %source,
                    "upstream request failed"
                );
                metrics::record_error(identifier, envelope.method(), &source);
                self.counters.record_failure(index);

                Err(DispatchError::Transport {
                    method: envelope.request.method,
                    index,
                    endpoint: Arc::clone(identifier),
                    source,
                })
            }
        }
    }

    #[must_use]
    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    #[must_use]
    pub fn policy_kind(&self) -> PolicyKind {
        self.policy.kind()
    }

    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.pool.size()
    }

    /// Per-endpoint dispatch and failure counts since construction.
    #[must_use]
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot(&self.pool)
    }
}

/// Builds an HTTP-backed client over `endpoint_identifiers` (URLs).
///
/// For [`PolicyKind::MethodSharded`] without a `shard_map`, every method routes to the
/// last endpoint. `shard_map` is ignored by [`PolicyKind::RoundRobin`].
///
/// # Errors
///
/// Returns [`DispatchError::PolicyMisconfigured`] for an empty endpoint list or an
/// out-of-bounds shard map, and [`DispatchError::HttpClientInit`] if the HTTP client
/// cannot be built.
pub fn create_client<I, S>(
    endpoint_identifiers: I,
    policy_kind: PolicyKind,
    shard_map: Option<MethodShardMap>,
) -> Result<DispatchClient, DispatchError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut builder = DispatchClientBuilder::new().urls(endpoint_identifiers).policy(policy_kind);
    if let Some(map) = shard_map {
        builder = builder.shard_map(map);
    }
    builder.build()
}
