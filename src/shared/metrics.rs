//! Dispatch metrics
//!
//! Prometheus counters and a latency histogram kept in a private registry,
//! exposed as text on the metrics endpoint.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::shared::error::AppResult;

/// How a single HTTP request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Method ran and its result was written (or suppressed).
    Success,
    /// Decode, lookup or bind failure answered with an error envelope.
    ProtocolError,
    /// The method itself returned an error.
    MethodError,
    /// Refused at the transport level with a plain-text status.
    Rejected,
}

impl Outcome {
    pub const ALL: [Outcome; 4] = [
        Outcome::Success,
        Outcome::ProtocolError,
        Outcome::MethodError,
        Outcome::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::ProtocolError => "protocol_error",
            Outcome::MethodError => "method_error",
            Outcome::Rejected => "rejected",
        }
    }
}

/// Snapshot served by the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub uptime_seconds: u64,
}

/// Metrics for one dispatcher
pub struct DispatchMetrics {
    registry: Registry,
    requests: IntCounterVec,
    duration: Histogram,
    started_at: Instant,
}

impl DispatchMetrics {
    pub fn new() -> AppResult<Self> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("rpc_requests_total", "Total number of RPC requests by outcome"),
            &["outcome"],
        )?;
        let duration = Histogram::with_opts(HistogramOpts::new(
            "rpc_dispatch_duration_seconds",
            "Time spent dispatching one RPC request",
        ))?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        // Pre-create every series so scrapes see zeros instead of gaps.
        for outcome in Outcome::ALL {
            requests.with_label_values(&[outcome.as_str()]);
        }

        Ok(Self {
            registry,
            requests,
            duration,
            started_at: Instant::now(),
        })
    }

    pub fn record(&self, outcome: Outcome, elapsed: Duration) {
        self.requests.with_label_values(&[outcome.as_str()]).inc();
        self.duration.observe(elapsed.as_secs_f64());
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.requests.with_label_values(&[outcome.as_str()]).get()
    }

    pub fn summary(&self) -> MetricsSummary {
        let successful_requests = self.count(Outcome::Success);
        let failed_requests = Outcome::ALL
            .iter()
            .filter(|outcome| **outcome != Outcome::Success)
            .map(|outcome| self.count(*outcome))
            .sum();

        MetricsSummary {
            total_requests: successful_requests + failed_requests,
            successful_requests,
            failed_requests,
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }

    /// Prometheus text exposition of every registered metric
    pub fn gather_text(&self) -> AppResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
