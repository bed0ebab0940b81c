//! Aggregate usage metrics for the format endpoint.
//!
//! One [`Metrics`] is built at startup and handed to every component that
//! records or reports. Clones share the same counters.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;

/// Thread-safe request/error/latency/payload accumulator.
///
/// Every operation takes the same lock, so multi-field updates are atomic
/// with respect to [`snapshot`](Metrics::snapshot). The critical sections
/// only touch counters; parsing and I/O happen outside.
#[derive(Clone, Debug, Default)]
pub struct Metrics {
    inner: Arc<Mutex<Counters>>,
}

#[derive(Debug, Default)]
struct Counters {
    requests: u64,
    errors: u64,
    total: Duration,
    max_payload: u64,
}

/// Point-in-time view of [`Metrics`], serialized as the `/metrics` body.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub request_count: u64,
    pub error_count: u64,
    pub total_duration_ms: u64,
    pub average_duration_ms: u64,
    pub max_payload_size_bytes: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one request as it arrives, with its body size.
    ///
    /// Called before the handler runs, so any error the handler records is
    /// already matched by a counted request.
    pub fn record_arrival(&self, payload_size: usize) {
        let payload = u64::try_from(payload_size).unwrap_or(u64::MAX);
        let mut counters = self.counters();
        counters.requests += 1;
        counters.max_payload = counters.max_payload.max(payload);
    }

    /// Adds the handling time of a request already counted by
    /// [`record_arrival`](Metrics::record_arrival).
    pub fn record_duration(&self, elapsed: Duration) {
        let mut counters = self.counters();
        counters.total = counters.total.saturating_add(elapsed);
    }

    /// Counts one failed request.
    pub fn record_error(&self) {
        self.counters().errors += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let (requests, errors, total, max_payload) = {
            let c = self.counters();
            (c.requests, c.errors, c.total, c.max_payload)
        };

        let average = if requests == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(saturate(total.as_nanos() / u128::from(requests)))
        };

        MetricsSnapshot {
            request_count: requests,
            error_count: errors,
            total_duration_ms: saturate(total.as_millis()),
            average_duration_ms: saturate(average.as_millis()),
            max_payload_size_bytes: max_payload,
        }
    }

    // A panic while holding the lock cannot leave the counters half-updated
    // in a way that matters, so poisoning is ignored.
    fn counters(&self) -> MutexGuard<'_, Counters> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn saturate(n: u128) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
