//! Builder pattern for constructing a [`DispatchClient`] over HTTP or custom transports.

use std::{sync::Arc, time::Duration};

use super::DispatchClient;
use crate::{
    dispatch::{
        DispatchError, DispatchPolicy, MethodShardMap, MethodShardedPolicy, PolicyKind,
        RoundRobinPolicy,
    },
    upstream::{
        Endpoint, EndpointPool, HttpClient, HttpClientConfig, HttpTransport, Transport,
        DEFAULT_REQUEST_TIMEOUT,
    },
};

enum PendingEndpoint {
    Url(String),
    Custom(Endpoint),
}

/// Builder for a [`DispatchClient`].
///
/// Endpoints keep the order in which they are added, whether given as URLs or as
/// prebuilt [`Endpoint`]s. URL endpoints share one [`HttpClient`].
///
/// # Examples
///
/// ```no_run
/// # use relay_core::{DispatchClientBuilder, PolicyKind, dispatch::MethodShardMap};
/// # fn example() -> Result<(), relay_core::DispatchError> {
/// let map = MethodShardMap::with_overflow_last(2)?.with_shard("getAccountInfo", 0);
///
/// let client = DispatchClientBuilder::new()
///     .url("https://rpc-a.example.com")
///     .url("https://rpc-b.example.com")
///     .policy(PolicyKind::MethodSharded)
///     .shard_map(map)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct DispatchClientBuilder {
    endpoints: Vec<PendingEndpoint>,
    policy: PolicyKind,
    shard_map: Option<MethodShardMap>,
    http_client: Option<Arc<HttpClient>>,
    http_client_config: HttpClientConfig,
    request_timeout: Duration,
}

impl DispatchClientBuilder {
    /// Creates a builder with the round-robin policy and default HTTP settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            policy: PolicyKind::RoundRobin,
            shard_map: None,
            http_client: None,
            http_client_config: HttpClientConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.endpoints.push(PendingEndpoint::Url(url.into()));
        self
    }

    #[must_use]
    pub fn urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints.extend(urls.into_iter().map(|url| PendingEndpoint::Url(url.into())));
        self
    }

    /// Adds an endpoint backed by a caller-supplied transport.
    #[must_use]
    pub fn endpoint(mut self, identifier: impl Into<Arc<str>>, transport: Arc<dyn Transport>) -> Self {
        self.endpoints.push(PendingEndpoint::Custom(Endpoint::new(identifier, transport)));
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Shard table for [`PolicyKind::MethodSharded`]. Without one, every method goes to
    /// the last endpoint. Ignored by round-robin.
    #[must_use]
    pub fn shard_map(mut self, map: MethodShardMap) -> Self {
        self.shard_map = Some(map);
        self
    }

    /// Shares an existing HTTP client instead of creating one at build time.
    #[must_use]
    pub fn http_client(mut self, client: Arc<HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    #[must_use]
    pub fn http_client_config(mut self, config: HttpClientConfig) -> Self {
        self.http_client_config = config;
        self
    }

    /// Default per-request timeout for URL endpoints.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::PolicyMisconfigured`] if no endpoints were added or the shard
    ///   map does not fit the pool
    /// - [`DispatchError::HttpClientInit`] if the shared HTTP client cannot be created
    pub fn build(self) -> Result<DispatchClient, DispatchError> {
        let pool_size = self.endpoints.len();
        if pool_size == 0 {
            return Err(DispatchError::PolicyMisconfigured(
                "at least one endpoint is required".to_string(),
            ));
        }

        let policy: Arc<dyn DispatchPolicy> = match self.policy {
            PolicyKind::RoundRobin => Arc::new(RoundRobinPolicy::new(pool_size)?),
            PolicyKind::MethodSharded => {
                let map = match self.shard_map {
                    Some(map) => map,
                    None => MethodShardMap::with_overflow_last(pool_size)?,
                };
                Arc::new(MethodShardedPolicy::new(map, pool_size)?)
            }
        };

        let needs_http =
            self.endpoints.iter().any(|pending| matches!(pending, PendingEndpoint::Url(_)));
        let http_client = match (self.http_client, needs_http) {
            (Some(client), _) => Some(client),
            (None, true) => Some(Arc::new(
                HttpClient::with_config(self.http_client_config)
                    .map_err(|e| DispatchError::HttpClientInit(e.to_string()))?,
            )),
            (None, false) => None,
        };

        let mut endpoints = Vec::with_capacity(pool_size);
        for pending in self.endpoints {
            let endpoint = match (pending, &http_client) {
                (PendingEndpoint::Custom(endpoint), _) => endpoint,
                (PendingEndpoint::Url(url), Some(client)) => {
                    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::with_timeout(
                        url.as_str(),
                        client.clone(),
                        self.request_timeout,
                    ));
                    Endpoint::new(url, transport)
                }
                (PendingEndpoint::Url(url), None) => {
                    return Err(DispatchError::HttpClientInit(format!(
                        "no HTTP client available for endpoint {url}"
                    )));
                }
            };
            endpoints.push(endpoint);
        }

        DispatchClient::new(EndpointPool::new(endpoints), policy)
    }
}

impl Default for DispatchClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
