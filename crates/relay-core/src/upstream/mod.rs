//! Upstream endpoints and the transports that reach them.
//!
//! - [`Transport`]: one network round trip to one fixed endpoint
//! - [`HttpTransport`] / [`HttpClient`]: JSON-RPC over HTTP with shared concurrency control
//! - [`Endpoint`] / [`EndpointPool`]: the ordered, immutable set of upstreams a client owns

pub mod endpoint;
pub mod errors;
pub mod http_client;
pub mod pool;
pub mod transport;

pub use endpoint::Endpoint;
pub use errors::UpstreamError;
pub use http_client::{HttpClient, HttpClientConfig};
pub use pool::EndpointPool;
pub use transport::{HttpTransport, Transport, DEFAULT_REQUEST_TIMEOUT};
