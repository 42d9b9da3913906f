use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{DispatchError, DispatchPolicy, PolicyKind};

/// Method name → pool index table with a default (overflow) shard.
///
/// Methods without an entry always resolve to `default_shard`. This is the intended
/// fallback: unknown or rarely used methods share the overflow endpoint instead of
/// competing with the explicitly sharded ones.
///
/// # Example
///
/// ```
/// use relay_core::dispatch::MethodShardMap;
///
/// let map = MethodShardMap::with_overflow_last(4)
///     .unwrap()
///     .with_shard("getAccountInfo", 0)
///     .with_shard("getTransaction", 1);
///
/// assert_eq!(map.resolve("getAccountInfo"), 0);
/// assert_eq!(map.resolve("getSlotLeader"), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodShardMap {
    #[serde(default)]
    shards: HashMap<String, usize>,
    default_shard: usize,
}

impl MethodShardMap {
    #[must_use]
    pub fn new(shards: HashMap<String, usize>, default_shard: usize) -> Self {
        Self { shards, default_shard }
    }

    /// Creates an empty map whose overflow shard is the last slot of a pool of
    /// `pool_size` endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PolicyMisconfigured`] if `pool_size` is zero.
    pub fn with_overflow_last(pool_size: usize) -> Result<Self, DispatchError> {
        let default_shard = pool_size.checked_sub(1).ok_or_else(|| {
            DispatchError::PolicyMisconfigured(
                "cannot place overflow shard in an empty pool".to_string(),
            )
        })?;
        Ok(Self::new(HashMap::new(), default_shard))
    }

    #[must_use]
    pub fn with_shard(mut self, method: impl Into<String>, index: usize) -> Self {
        self.shards.insert(method.into(), index);
        self
    }

    #[must_use]
    pub fn resolve(&self, method: &str) -> usize {
        self.shards.get(method).copied().unwrap_or(self.default_shard)
    }

    #[must_use]
    pub fn is_mapped(&self, method: &str) -> bool {
        self.shards.contains_key(method)
    }

    #[must_use]
    pub fn default_shard(&self) -> usize {
        self.default_shard
    }

    #[must_use]
    pub fn shards(&self) -> &HashMap<String, usize> {
        &self.shards
    }

    /// Checks that every index, including the default shard, fits a pool of
    /// `pool_size` endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PolicyMisconfigured`] naming the first offending entry.
    pub fn validate(&self, pool_size: usize) -> Result<(), DispatchError> {
        if pool_size == 0 {
            return Err(DispatchError::PolicyMisconfigured(
                "method-sharded policy requires at least one endpoint".to_string(),
            ));
        }

        if self.default_shard >= pool_size {
            return Err(DispatchError::PolicyMisconfigured(format!(
                "default shard {} is outside pool of size {pool_size}",
                self.default_shard
            )));
        }

        let mut entries: Vec<_> = self.shards.iter().collect();
        entries.sort();
        if let Some((method, index)) = entries.into_iter().find(|(_, index)| **index >= pool_size)
        {
            return Err(DispatchError::PolicyMisconfigured(format!(
                "method `{method}` mapped to shard {index}, outside pool of size {pool_size}"
            )));
        }

        Ok(())
    }
}

/// Routes each method to a fixed endpoint according to a [`MethodShardMap`].
///
/// Selection is a pure lookup: the same method always yields the same index.
#[derive(Debug)]
pub struct MethodShardedPolicy {
    map: MethodShardMap,
    pool_size: usize,
}

impl MethodShardedPolicy {
    /// Validates `map` against the pool eagerly so misconfiguration fails at
    /// construction rather than on the first call.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PolicyMisconfigured`] if the pool is empty or any shard
    /// index is out of bounds.
    pub fn new(map: MethodShardMap, pool_size: usize) -> Result<Self, DispatchError> {
        map.validate(pool_size)?;
        Ok(Self { map, pool_size })
    }

    #[must_use]
    pub fn map(&self) -> &MethodShardMap {
        &self.map
    }
}

impl DispatchPolicy for MethodShardedPolicy {
    fn select_index(&self, method: &str) -> Result<usize, DispatchError> {
        let index = self.map.resolve(method);
        if !self.map.is_mapped(method) {
            tracing::trace!(method, index, "method not sharded, using overflow shard");
        }
        Ok(index)
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::MethodSharded
    }

    fn pool_size(&self) -> usize {
        self.pool_size
    }
}
