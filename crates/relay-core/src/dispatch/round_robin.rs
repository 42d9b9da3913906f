use std::sync::atomic::{AtomicUsize, Ordering};

use super::{DispatchError, DispatchPolicy, PolicyKind};

/// Walks the pool in order, one step per selection, wrapping at the end.
///
/// The cursor always stays in `[0, pool_size)`. Each selection returns the current
/// cursor and stores its successor in a single compare-and-swap, so two concurrent
/// selections can never observe the same value or skip one.
#[derive(Debug)]
pub struct RoundRobinPolicy {
    cursor: AtomicUsize,
    pool_size: usize,
}

impl RoundRobinPolicy {
    /// # Errors
    ///
    /// Returns [`DispatchError::PolicyMisconfigured`] if `pool_size` is zero.
    pub fn new(pool_size: usize) -> Result<Self, DispatchError> {
        if pool_size == 0 {
            return Err(DispatchError::PolicyMisconfigured(
                "round-robin policy requires at least one endpoint".to_string(),
            ));
        }
        Ok(Self { cursor: AtomicUsize::new(0), pool_size })
    }

    /// Index the next selection will return.
    #[must_use]
    pub fn peek(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }
}

impl DispatchPolicy for RoundRobinPolicy {
    fn select_index(&self, _method: &str) -> Result<usize, DispatchError> {
        let pool_size = self.pool_size;
        let previous = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some((current + 1) % pool_size)
            })
            .unwrap_or_else(|current| current);

        tracing::trace!(index = previous, pool_size, "round-robin selection");
        Ok(previous)
    }

    fn kind(&self) -> PolicyKind {
        PolicyKind::RoundRobin
    }

    fn pool_size(&self) -> usize {
        self.pool_size
    }
}
