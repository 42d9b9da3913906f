use std::{sync::Arc, time::Duration};

use crate::{
    dispatch::DispatchError,
    upstream::{
        endpoint::Endpoint,
        http_client::HttpClient,
        transport::{HttpTransport, Transport},
    },
};

/// Ordered, fixed set of upstream endpoints.
///
/// Order matters: it defines the round-robin sequence and the meaning of shard
/// indices. The pool is read-only after construction and shared without locks.
#[derive(Debug, Clone)]
pub struct EndpointPool {
    endpoints: Arc<[Endpoint]>,
}

impl EndpointPool {
    #[must_use]
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints: endpoints.into() }
    }

    /// Builds one transport per identifier, preserving order.
    ///
    /// Any side effects of transport construction (opening connections, validating
    /// URLs) belong to `factory`; its first error aborts construction.
    ///
    /// # Errors
    ///
    /// Returns the factory's error unchanged.
    pub fn from_identifiers<I, S, F, E>(identifiers: I, mut factory: F) -> Result<Self, E>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&str) -> Result<Arc<dyn Transport>, E>,
    {
        let endpoints = identifiers
            .into_iter()
            .map(|id| {
                let id = id.as_ref();
                factory(id).map(|transport| Endpoint::new(id, transport))
            })
            .collect::<Result<Vec<_>, E>>()?;

        Ok(Self::new(endpoints))
    }

    /// Builds an HTTP pool where every URL gets its own [`HttpTransport`] on a shared
    /// client.
    #[must_use]
    pub fn http<S: AsRef<str>>(
        urls: &[S],
        http_client: &Arc<HttpClient>,
        request_timeout: Duration,
    ) -> Self {
        let endpoints = urls
            .iter()
            .map(|url| {
                let url = url.as_ref();
                let transport: Arc<dyn Transport> =
                    Arc::new(HttpTransport::with_timeout(url, http_client.clone(), request_timeout));
                Endpoint::new(url, transport)
            })
            .collect();

        Self::new(endpoints)
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`DispatchError::IndexOutOfRange`] if `index >= size()`.
    pub fn endpoint_at(&self, index: usize) -> Result<&Endpoint, DispatchError> {
        self.endpoints
            .get(index)
            .ok_or(DispatchError::IndexOutOfRange { index, size: self.endpoints.len() })
    }

    /// # Errors
    ///
    /// Returns [`DispatchError::IndexOutOfRange`] if `index >= size()`.
    pub fn transport_at(&self, index: usize) -> Result<&Arc<dyn Transport>, DispatchError> {
        self.endpoint_at(index).map(Endpoint::transport)
    }

    /// # Errors
    ///
    /// Returns [`DispatchError::IndexOutOfRange`] if `index >= size()`.
    pub fn identifier_at(&self, index: usize) -> Result<&Arc<str>, DispatchError> {
        self.endpoint_at(index).map(Endpoint::identifier)
    }

    #[must_use]
    pub fn identifiers(&self) -> Vec<Arc<str>> {
        self.endpoints.iter().map(|e| Arc::clone(e.identifier())).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }
}
