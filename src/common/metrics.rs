//! Request counters and health metadata
//!
//! Each service owns one [`RequestStats`], shares it through an `Arc`, and
//! wraps its router in [`track_requests`]. Counters are relaxed atomics:
//! concurrent requests never block each other, and a snapshot taken while
//! requests are in flight may mix values from different moments.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    middleware::Next,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Counter for tracking request counts
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Process-wide request statistics for one service
#[derive(Debug)]
pub struct RequestStats {
    pub total_calls: Counter,
    pub error_calls: Counter,
    total_request_nanos: Counter,
    boot_time: DateTime<Utc>,
    started: Instant,
}

impl RequestStats {
    pub fn new() -> Self {
        Self {
            total_calls: Counter::new(),
            error_calls: Counter::new(),
            total_request_nanos: Counter::new(),
            boot_time: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Called before a request is handled.
    pub fn begin(&self) {
        self.total_calls.inc();
    }

    /// Called after a request is handled.
    pub fn finish(&self, status: u16, elapsed: Duration) {
        if status >= 400 {
            self.error_calls.inc();
        }
        self.total_request_nanos
            .add(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX));
    }

    pub fn total_request_time(&self) -> Duration {
        Duration::from_nanos(self.total_request_nanos.get())
    }

    pub fn average_request_time(&self) -> Duration {
        match self.total_calls.get() {
            0 => Duration::ZERO,
            n => Duration::from_nanos(self.total_request_nanos.get() / n),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "ok".to_string(),
            uptime: format_duration(self.uptime()),
            total_api_calls: self.total_calls.get(),
            total_api_calls_error: self.error_calls.get(),
            boot_time: self.boot_time,
            total_request_time: format_duration(self.total_request_time()),
            average_request_time: format_duration(self.average_request_time()),
        }
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Body of `GET /<resource>/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub uptime: String,
    #[serde(rename = "totalAPICalls")]
    pub total_api_calls: u64,
    #[serde(rename = "totalAPICallsError")]
    pub total_api_calls_error: u64,
    #[serde(rename = "bootTime")]
    pub boot_time: DateTime<Utc>,
    #[serde(rename = "totalRequestTime")]
    pub total_request_time: String,
    #[serde(rename = "averageRequestTime")]
    pub average_request_time: String,
}

/// `1.5s`, `250µs`, `0ns`
pub fn format_duration(d: Duration) -> String {
    format!("{:?}", d)
}

/// Middleware updating [`RequestStats`] around every request
pub async fn track_requests(
    State(stats): State<Arc<RequestStats>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    stats.begin();
    let start = Instant::now();

    let response = next.run(request).await;

    stats.finish(response.status().as_u16(), start.elapsed());
    response
}
