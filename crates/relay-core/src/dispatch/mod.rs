//! Dispatch policies: deciding which endpoint handles each outgoing call.
//!
//! Two strategies are provided behind the [`DispatchPolicy`] trait:
//!
//! 1. **Round-robin** ([`RoundRobinPolicy`]) - ignores the method name and walks the pool
//!    in order, wrapping at the end. The cursor is advanced with a compare-and-swap loop,
//!    so concurrent callers always get distinct, consecutive indices.
//!
//! 2. **Method-sharded** ([`MethodShardedPolicy`]) - looks the method name up in an
//!    immutable [`MethodShardMap`]. Methods without an entry go to the map's default
//!    (overflow) shard, conventionally the last slot of the pool.
//!
//! ```text
//! send("getTransaction", ..)
//!        │
//!        ▼
//! ┌────────────────┐   index   ┌──────────────┐   envelope   ┌───────────┐
//! │ DispatchPolicy │ ────────► │ EndpointPool │ ───────────► │ Transport │
//! └────────────────┘           └──────────────┘              └───────────┘
//! ```
//!
//! Both policies validate against the pool size at construction and never return an
//! index outside `[0, pool size)`.

pub mod errors;
pub mod round_robin;
pub mod sharded;

pub use errors::DispatchError;
pub use round_robin::RoundRobinPolicy;
pub use sharded::{MethodShardMap, MethodShardedPolicy};

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Strategy choosing the pool index that handles a call.
pub trait DispatchPolicy: Send + Sync {
    /// Returns the index of the endpoint that should handle `method`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PolicyMisconfigured`] if the policy has no endpoints to
    /// choose from.
    fn select_index(&self, method: &str) -> Result<usize, DispatchError>;

    fn kind(&self) -> PolicyKind;

    /// Number of endpoints the policy was built for. Every index it returns is below this.
    fn pool_size(&self) -> usize;
}

/// Which dispatch strategy a client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    RoundRobin,
    MethodSharded,
}

impl PolicyKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::MethodSharded => "method_sharded",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "method_sharded" | "sharded" => Ok(Self::MethodSharded),
            other => Err(DispatchError::Config(format!("unknown dispatch policy: {other}"))),
        }
    }
}
