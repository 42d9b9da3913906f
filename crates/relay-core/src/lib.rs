//! # Relay Core
//!
//! Client-side dispatch of JSON-RPC calls across a fixed pool of upstream endpoints.
//!
//! This crate provides:
//!
//! - **[`dispatch`]**: Dispatch policies. Round-robin walks the pool in order; method
//!   sharding pins each method to a configured endpoint with an overflow shard for the rest.
//!
//! - **[`upstream`]**: Endpoints, the ordered endpoint pool, and the HTTP transport with
//!   shared concurrency control.
//!
//! - **[`client`]**: [`DispatchClient`], which selects an endpoint, logs the routing
//!   decision and forwards the call exactly once.
//!
//! - **[`config`]**: Layered TOML/environment configuration.
//!
//! - **[`logging`]** and **[`metrics`]**: `tracing` subscriber setup and dispatch counters.
//!
//! ## Request Flow
//!
//! ```text
//! client.send("getTransaction", params, options)
//!       │
//!       ▼
//! ┌──────────────────┐
//! │  DispatchPolicy  │ ─── empty pool ──► PolicyMisconfigured
//! └────────┬─────────┘
//!          │ index
//!          ▼
//! ┌──────────────────┐
//! │   EndpointPool   │ ─── log: endpoint, index, method
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │    Transport     │ ─── failure ──► DispatchError::Transport
//! └────────┬─────────┘
//!          │
//!          ▼
//!   JsonRpcResponse (unchanged)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use relay_core::{create_client, dispatch::MethodShardMap, PolicyKind};
//!
//! # async fn example() -> Result<(), relay_core::DispatchError> {
//! let urls = ["https://rpc-a.example.com", "https://rpc-b.example.com"];
//! let map = MethodShardMap::with_overflow_last(urls.len())?.with_shard("getAccountInfo", 0);
//!
//! let client = create_client(urls, PolicyKind::MethodSharded, Some(map))?;
//! let response = client.call("getAccountInfo", vec![serde_json::json!("Vote111")]).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod metrics;
pub mod types;
pub mod upstream;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{create_client, DispatchClient, DispatchClientBuilder, DispatchStats};
pub use dispatch::{DispatchError, PolicyKind};
