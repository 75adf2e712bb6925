//! Per-upstream circuit breakers.
//!
//! A breaker counts consecutive service failures. At the threshold it opens
//! and rejects calls without touching the network until the reset timeout
//! elapses; the next call after that is a half-open probe whose outcome
//! closes or re-opens the circuit.
//!
//! Only [`FetchError::is_service_failure`] outcomes count against the
//! service. A 404 means the service is up and answering.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::FetchError;

/// Success rate (percent) below which a closed breaker counts as unhealthy.
pub const HEALTHY_SUCCESS_RATE: f64 = 90.0;

/// Longest cooldown a breaker will honour; larger timeouts are clamped.
pub const MAX_RESET_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    /// Normal operation; calls are allowed.
    Closed,
    /// Too many consecutive failures; calls blocked until `until`.
    Open { until: Instant },
    /// Cooldown elapsed; calls are probes.
    HalfOpen,
}

impl CircuitState {
    const fn label(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Open { .. } => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    failure_count: u32,
    success_count: u64,
    total_requests: u64,
    total_failures: u64,
    total_successes: u64,
    rejected_requests: u64,
    circuit_opened_count: u64,
    last_failure_time: Option<DateTime<Utc>>,
    last_success_time: Option<DateTime<Utc>>,
}

impl Inner {
    const fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            total_requests: 0,
            total_failures: 0,
            total_successes: 0,
            rejected_requests: 0,
            circuit_opened_count: 0,
            last_failure_time: None,
            last_success_time: None,
        }
    }
}

/// Point-in-time view of one breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitMetrics {
    pub name: String,
    pub state: &'static str,
    pub is_open: bool,
    /// Consecutive failures in the current window.
    pub failure_count: u32,
    pub success_count: u64,
    pub total_requests: u64,
    pub total_failures: u64,
    pub total_successes: u64,
    pub rejected_requests: u64,
    /// 100 when nothing has been attempted yet.
    pub success_rate_percent: f64,
    pub circuit_opened_count: u64,
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
    /// Seconds until an open circuit admits a probe.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_in_seconds: Option<u64>,
    pub last_failure_time: Option<DateTime<Utc>>,
    pub last_success_time: Option<DateTime<Utc>>,
}

impl CircuitMetrics {
    /// Open, or closed with a poor success rate.
    #[must_use]
    pub fn is_unhealthy(&self) -> bool {
        self.is_open || self.success_rate_percent < HEALTHY_SUCCESS_RATE
    }

    /// Operator guidance keyed by severity.
    #[must_use]
    pub fn recommendations(&self) -> BTreeMap<&'static str, String> {
        let mut out = BTreeMap::new();
        if self.is_open {
            out.insert(
                "immediate",
                "Circuit is OPEN - external service is likely down. Check service health."
                    .to_string(),
            );
            out.insert(
                "action",
                format!(
                    "Wait {} seconds for automatic retry or check external service status.",
                    self.timeout_seconds
                ),
            );
        } else if self.success_rate_percent < HEALTHY_SUCCESS_RATE {
            out.insert(
                "warning",
                format!(
                    "Success rate is {}% - monitor external service closely.",
                    self.success_rate_percent
                ),
            );
            out.insert(
                "action",
                "Consider increasing timeout or checking external service performance."
                    .to_string(),
            );
        } else if self.failure_count > 0 {
            out.insert(
                "info",
                format!(
                    "Recent failures detected ({}). Monitor for patterns.",
                    self.failure_count
                ),
            );
        } else {
            out.insert(
                "status",
                "Circuit breaker is healthy and operating normally.".to_string(),
            );
        }
        if self.circuit_opened_count > 5 {
            out.insert(
                "concern",
                format!(
                    "Circuit has opened {} times. Consider adjusting thresholds or improving external service reliability.",
                    self.circuit_opened_count
                ),
            );
        }
        out
    }
}

/// Circuit breaker for a single upstream.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    reset_timeout: Duration,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            failure_threshold: failure_threshold.max(1),
            reset_timeout: reset_timeout.min(MAX_RESET_TIMEOUT),
            inner: Mutex::new(Inner::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `op` through the breaker.
    ///
    /// # Errors
    ///
    /// [`FetchError::CircuitOpen`] without calling `op` while the circuit is
    /// open; otherwise whatever `op` returns.
    pub async fn call<T, F, Fut>(&self, op: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        self.acquire()?;
        let result = op().await;
        match &result {
            Err(err) if err.is_service_failure() => self.record_failure(err),
            _ => self.record_success(),
        }
        result
    }

    /// Admit or reject a call, moving Open → HalfOpen once the cooldown ends.
    fn acquire(&self) -> Result<(), FetchError> {
        let mut inner = self.inner.lock();
        if let CircuitState::Open { until } = inner.state {
            if Instant::now() < until {
                inner.rejected_requests += 1;
                return Err(FetchError::CircuitOpen {
                    name: self.name.clone(),
                });
            }
            info!(circuit = %self.name, "Circuit half-open, admitting probe");
            inner.state = CircuitState::HalfOpen;
        }
        inner.total_requests += 1;
        Ok(())
    }

    fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.success_count += 1;
        inner.total_successes += 1;
        inner.last_success_time = Some(Utc::now());
        inner.failure_count = 0;
        if inner.state == CircuitState::HalfOpen {
            info!(circuit = %self.name, "Circuit closed after successful probe");
            inner.state = CircuitState::Closed;
        }
    }

    fn record_failure(&self, err: &FetchError) {
        let mut inner = self.inner.lock();
        inner.failure_count += 1;
        inner.total_failures += 1;
        inner.success_count = 0;
        inner.last_failure_time = Some(Utc::now());

        let trip = inner.state == CircuitState::HalfOpen
            || (inner.state == CircuitState::Closed && inner.failure_count >= self.failure_threshold);
        if trip {
            let now = Instant::now();
            inner.state = CircuitState::Open {
                until: now.checked_add(self.reset_timeout).unwrap_or(now),
            };
            inner.circuit_opened_count += 1;
            warn!(
                circuit = %self.name,
                failures = inner.failure_count,
                timeout_secs = self.reset_timeout.as_secs(),
                error = %err,
                "Circuit opened"
            );
        }
    }

    /// Whether calls are currently being rejected.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.inner.lock().state, CircuitState::Open { until } if Instant::now() < until)
    }

    /// Back to a fresh closed state; counters cleared.
    pub fn reset(&self) {
        *self.inner.lock() = Inner::new();
        info!(circuit = %self.name, "Circuit reset");
    }

    #[must_use]
    pub fn metrics(&self) -> CircuitMetrics {
        let inner = self.inner.lock();
        let now = Instant::now();
        let (state, retry_in) = match inner.state {
            CircuitState::Open { until } if now < until => {
                (inner.state, Some((until - now).as_secs_f64().ceil() as u64))
            }
            // Cooldown elapsed but no call has probed yet.
            CircuitState::Open { .. } => (CircuitState::HalfOpen, None),
            other => (other, None),
        };
        let success_rate = if inner.total_requests == 0 {
            100.0
        } else {
            let rate = inner.total_successes as f64 / inner.total_requests as f64 * 100.0;
            (rate * 100.0).round() / 100.0
        };

        CircuitMetrics {
            name: self.name.clone(),
            state: state.label(),
            is_open: matches!(state, CircuitState::Open { .. }),
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            total_requests: inner.total_requests,
            total_failures: inner.total_failures,
            total_successes: inner.total_successes,
            rejected_requests: inner.rejected_requests,
            success_rate_percent: success_rate,
            circuit_opened_count: inner.circuit_opened_count,
            failure_threshold: self.failure_threshold,
            timeout_seconds: self.reset_timeout.as_secs(),
            retry_in_seconds: retry_in,
            last_failure_time: inner.last_failure_time,
            last_success_time: inner.last_success_time,
        }
    }
}

/// Overall health derived from every breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistrySummary {
    pub total_circuits: usize,
    pub healthy_circuits: usize,
    pub unhealthy_circuits: usize,
    pub open_circuits: usize,
    pub total_requests: u64,
    pub total_failures: u64,
    pub total_successes: u64,
    pub overall_success_rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegistryReport {
    pub status: OverallStatus,
    pub timestamp: DateTime<Utc>,
    pub summary: RegistrySummary,
    pub unhealthy_circuit_names: Vec<String>,
    pub open_circuit_names: Vec<String>,
    pub circuit_breakers: BTreeMap<String, CircuitMetrics>,
}

/// Named breakers shared across the process.
#[derive(Debug, Default)]
pub struct CircuitBreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl CircuitBreakerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing breaker named `name`, or a new one with these settings.
    pub fn register(
        &self,
        name: &str,
        failure_threshold: u32,
        reset_timeout: Duration,
    ) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(name, failure_threshold, reset_timeout)))
            .clone()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|b| Arc::clone(b.value()))
    }

    /// Breaker names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.breakers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn metrics(&self) -> BTreeMap<String, CircuitMetrics> {
        self.breakers
            .iter()
            .map(|e| (e.key().clone(), e.value().metrics()))
            .collect()
    }

    #[must_use]
    pub fn any_open(&self) -> bool {
        self.breakers.iter().any(|e| e.value().is_open())
    }

    /// Reset one breaker. Returns `false` if the name is unknown.
    pub fn reset(&self, name: &str) -> bool {
        match self.get(name) {
            Some(breaker) => {
                breaker.reset();
                true
            }
            None => false,
        }
    }

    pub fn reset_all(&self) {
        for entry in &self.breakers {
            entry.value().reset();
        }
    }

    /// Health report across all breakers: critical if any is open, degraded
    /// if any is below the healthy success rate.
    #[must_use]
    pub fn report(&self) -> RegistryReport {
        let metrics = self.metrics();

        let open: Vec<String> = metrics
            .values()
            .filter(|m| m.is_open)
            .map(|m| m.name.clone())
            .collect();
        let unhealthy: Vec<String> = metrics
            .values()
            .filter(|m| m.is_unhealthy())
            .map(|m| m.name.clone())
            .collect();

        let status = if !open.is_empty() {
            OverallStatus::Critical
        } else if !unhealthy.is_empty() {
            OverallStatus::Degraded
        } else {
            OverallStatus::Healthy
        };

        let average = if metrics.is_empty() {
            100.0
        } else {
            let sum: f64 = metrics.values().map(|m| m.success_rate_percent).sum();
            (sum / metrics.len() as f64 * 100.0).round() / 100.0
        };

        RegistryReport {
            status,
            timestamp: Utc::now(),
            summary: RegistrySummary {
                total_circuits: metrics.len(),
                healthy_circuits: metrics.len() - unhealthy.len(),
                unhealthy_circuits: unhealthy.len(),
                open_circuits: open.len(),
                total_requests: metrics.values().map(|m| m.total_requests).sum(),
                total_failures: metrics.values().map(|m| m.total_failures).sum(),
                total_successes: metrics.values().map(|m| m.total_successes).sum(),
                overall_success_rate_percent: average,
            },
            unhealthy_circuit_names: unhealthy,
            open_circuit_names: open,
            circuit_breakers: metrics,
        }
    }
}
