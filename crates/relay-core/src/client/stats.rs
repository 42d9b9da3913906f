use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::upstream::EndpointPool;

/// Point-in-time counts for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointStats {
    pub index: usize,
    pub identifier: String,
    pub dispatched: u64,
    pub failed: u64,
}

/// Snapshot returned by [`DispatchClient::stats`](super::DispatchClient::stats), in pool
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub endpoints: Vec<EndpointStats>,
}

impl DispatchStats {
    #[must_use]
    pub fn total_dispatched(&self) -> u64 {
        self.endpoints.iter().map(|e| e.dispatched).sum()
    }

    #[must_use]
    pub fn total_failed(&self) -> u64 {
        self.endpoints.iter().map(|e| e.failed).sum()
    }
}

/// Lock-free per-slot counters. Observability only; routing never reads them.
pub(crate) struct DispatchCounters {
    dispatched: Box<[AtomicU64]>,
    failed: Box<[AtomicU64]>,
}

impl DispatchCounters {
    pub(crate) fn new(slots: usize) -> Self {
        Self {
            dispatched: (0..slots).map(|_| AtomicU64::new(0)).collect(),
            failed: (0..slots).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub(crate) fn record_dispatch(&self, index: usize) {
        if let Some(counter) = self.dispatched.get(index) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_failure(&self, index: usize) {
        if let Some(counter) = self.failed.get(index) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self, pool: &EndpointPool) -> DispatchStats {
        let endpoints = pool
            .iter()
            .enumerate()
            .map(|(index, endpoint)| EndpointStats {
                index,
                identifier: endpoint.identifier().to_string(),
                dispatched: self.dispatched.get(index).map_or(0, |c| c.load(Ordering::Relaxed)),
                failed: self.failed.get(index).map_or(0, |c| c.load(Ordering::Relaxed)),
            })
            .collect();

        DispatchStats { endpoints }
    }
}
