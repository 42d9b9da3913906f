//! Dispatch metrics recorded through the `metrics` facade.
//!
//! Nothing here installs a recorder; with none installed every call is a no-op. Hosts
//! that want Prometheus output install an exporter once at startup.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `relay_dispatch_requests_total` | counter | `endpoint`, `method` |
//! | `relay_dispatch_errors_total` | counter | `endpoint`, `method`, `error_type` |
//! | `relay_dispatch_duration_seconds` | histogram | `endpoint`, `method` |

use metrics::{counter, histogram};
use std::time::Duration;

use crate::upstream::UpstreamError;

// SECURITY NOTE: endpoint identifiers are usually URLs and may embed API keys. They are
// exposed as labels for operational visibility; keep the metrics endpoint internal.

pub fn record_dispatch(endpoint: &str, method: &str) {
    counter!(
        "relay_dispatch_requests_total",
        "endpoint" => endpoint.to_string(),
        "method" => method.to_string()
    )
    .increment(1);
}

pub fn record_completion(endpoint: &str, method: &str, elapsed: Duration) {
    histogram!(
        "relay_dispatch_duration_seconds",
        "endpoint" => endpoint.to_string(),
        "method" => method.to_string()
    )
    .record(elapsed.as_secs_f64());
}

pub fn record_error(endpoint: &str, method: &str, error: &UpstreamError) {
    counter!(
        "relay_dispatch_errors_total",
        "endpoint" => endpoint.to_string(),
        "method" => method.to_string(),
        "error_type" => error.as_str()
    )
    .increment(1);
}
