use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Process-wide request counters
#[derive(Debug, Default)]
pub struct RequestMetrics {
    total_requests: AtomicU64,
    // Milliseconds since the epoch, 0 until the first request
    last_request_ms: AtomicI64,
}

/// Point-in-time view of [`RequestMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub last_request_at: Option<DateTime<Utc>>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request issued at `now` and return its sequence number
    pub fn record(&self, now: DateTime<Utc>) -> u64 {
        self.last_request_ms
            .store(now.timestamp_millis(), Ordering::Relaxed);
        self.total_requests.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let last_ms = self.last_request_ms.load(Ordering::Relaxed);
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            last_request_at: if last_ms == 0 {
                None
            } else {
                Utc.timestamp_millis_opt(last_ms).single()
            },
        }
    }
}
