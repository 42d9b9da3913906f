use std::sync::Arc;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Errors surfaced by the dispatch layer.
///
/// Nothing here is recovered locally. Transport failures keep their original cause
/// reachable through [`std::error::Error::source`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DispatchError {
    /// A pool index outside `[0, size)` was requested. Always a programming error.
    #[error("endpoint index {index} out of range for pool of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// The pool is empty or the shard map points outside the pool.
    #[error("dispatch policy misconfigured: {0}")]
    PolicyMisconfigured(String),

    /// The selected endpoint failed. No other endpoint was attempted.
    #[error("transport error calling `{method}` on endpoint {index} ({endpoint}): {source}")]
    Transport {
        method: String,
        index: usize,
        endpoint: Arc<str>,
        #[source]
        source: UpstreamError,
    },

    /// Configuration could not be loaded or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The shared HTTP client backing URL endpoints could not be built.
    #[error("failed to initialize HTTP client: {0}")]
    HttpClientInit(String),
}

impl DispatchError {
    /// Returns the underlying transport failure, if this error wraps one.
    #[must_use]
    pub fn upstream_error(&self) -> Option<&UpstreamError> {
        match self {
            Self::Transport { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the identifier of the endpoint that failed, if this error wraps a
    /// transport failure.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Transport { endpoint, .. } => Some(endpoint.as_ref()),
            _ => None,
        }
    }
}
