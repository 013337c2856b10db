//! Circuit Breaker for Provider Slots
//!
//! Each provider slot of the orchestrator carries one breaker. An open
//! breaker makes the orchestrator skip the slot without I/O, exactly as if
//! the provider were unavailable.
//!
//! ## States
//!
//! - **Closed**: calls flow through
//! - **Open**: calls are rejected until `open_timeout` elapses
//! - **HalfOpen**: a limited number of probe calls decide recovery
//!
//! ```text
//! Closed --[failure_threshold reached]--> Open
//! Open --[open_timeout elapsed]--> HalfOpen
//! HalfOpen --[success_threshold successes]--> Closed
//! HalfOpen --[any failure]--> Open
//! ```
//!
//! A half-open probe that ends without a transition (a success short of the
//! threshold, or a credential error) releases its probe slot.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::constants::circuit_breaker as cb_constants;
use crate::types::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening
    pub failure_threshold: u32,
    /// Consecutive half-open successes before closing
    pub success_threshold: u32,
    pub open_timeout: Duration,
    /// Probe calls admitted while half-open
    pub half_open_max_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: cb_constants::FAILURE_THRESHOLD,
            success_threshold: cb_constants::SUCCESS_THRESHOLD,
            open_timeout: Duration::from_secs(cb_constants::RECOVERY_TIMEOUT_SECS),
            half_open_max_requests: cb_constants::HALF_OPEN_MAX_REQUESTS,
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failures: u32,
    successes: u32,
    probes: u32,
    opened_at: Option<Instant>,
    blocked: u64,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failures: 0,
            successes: 0,
            probes: 0,
            opened_at: None,
            blocked: 0,
        }
    }

    fn open(&mut self) {
        self.state = CircuitState::Open;
        self.opened_at = Some(Instant::now());
        self.failures = 0;
        self.successes = 0;
        self.probes = 0;
    }

    /// Open -> HalfOpen once the timeout has elapsed
    fn advance(&mut self, open_timeout: Duration, slot: &str) {
        if self.state != CircuitState::Open {
            return;
        }
        if self.opened_at.is_some_and(|t| t.elapsed() >= open_timeout) {
            self.state = CircuitState::HalfOpen;
            self.probes = 0;
            self.successes = 0;
            tracing::info!(slot, "Circuit breaker half-open, probing provider");
        }
    }

    /// A finished probe that did not change state frees its slot.
    fn release_probe(&mut self) {
        if self.state == CircuitState::HalfOpen {
            self.probes = self.probes.saturating_sub(1);
        }
    }
}

/// Thread-safe breaker; every transition happens under one lock.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    slot: String,
    inner: Mutex<BreakerState>,
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("slot", &self.slot)
            .field("state", &self.state())
            .finish()
    }
}

impl CircuitBreaker {
    pub fn new(slot: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            slot: slot.into(),
            inner: Mutex::new(BreakerState::closed()),
        }
    }

    pub fn with_defaults(slot: impl Into<String>) -> Self {
        Self::new(slot, CircuitBreakerConfig::default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        inner.advance(self.config.open_timeout, &self.slot);
        inner.state
    }

    /// Whether a call may proceed; counts rejected calls.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.lock();
        inner.advance(self.config.open_timeout, &self.slot);

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen if inner.probes < self.config.half_open_max_requests => {
                inner.probes += 1;
                true
            }
            CircuitState::Open | CircuitState::HalfOpen => {
                inner.blocked += 1;
                tracing::debug!(slot = %self.slot, state = %inner.state, "Call blocked by circuit breaker");
                false
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.failures = 0;

        if inner.state == CircuitState::HalfOpen {
            inner.successes += 1;
            if inner.successes >= self.config.success_threshold {
                let blocked = inner.blocked;
                *inner = BreakerState::closed();
                inner.blocked = blocked;
                tracing::info!(slot = %self.slot, "Circuit breaker closed, provider recovered");
            } else {
                inner.release_probe();
            }
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.successes = 0;

        match inner.state {
            CircuitState::Closed => {
                inner.failures += 1;
                if inner.failures >= self.config.failure_threshold {
                    inner.open();
                    tracing::warn!(
                        slot = %self.slot,
                        failures = self.config.failure_threshold,
                        "Circuit breaker opened"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.open();
                tracing::warn!(slot = %self.slot, "Circuit breaker re-opened during probe");
            }
            CircuitState::Open => {}
        }
    }

    /// Record a provider outcome; credential errors never count as failures.
    pub fn record<T>(&self, outcome: &Result<T, ProviderError>) {
        match outcome {
            Ok(_) => self.record_success(),
            Err(e) if e.kind.trips_breaker() => self.record_failure(),
            Err(_) => self.lock().release_probe(),
        }
    }

    pub fn stats(&self) -> CircuitBreakerStats {
        let inner = self.lock();
        CircuitBreakerStats {
            slot: self.slot.clone(),
            state: inner.state,
            failure_count: inner.failures,
            success_count: inner.successes,
            blocked_count: inner.blocked,
            time_in_state: inner.opened_at.map(|t| t.elapsed()),
        }
    }

    pub fn reset(&self) {
        *self.lock() = BreakerState::closed();
        tracing::info!(slot = %self.slot, "Circuit breaker reset");
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerStats {
    pub slot: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub blocked_count: u64,
    pub time_in_state: Option<Duration>,
}

impl CircuitBreakerStats {
    pub fn summary(&self) -> String {
        let time_str = self
            .time_in_state
            .map(|d| format!(" for {:.1}s", d.as_secs_f64()))
            .unwrap_or_default();

        format!(
            "[{}] {} | failures={} successes={} blocked={}{}",
            self.slot,
            self.state,
            self.failure_count,
            self.success_count,
            self.blocked_count,
            time_str
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderErrorKind;

    fn quick(failure_threshold: u32) -> CircuitBreaker {
        CircuitBreaker::new(
            "primary",
            CircuitBreakerConfig {
                failure_threshold,
                success_threshold: 2,
                open_timeout: Duration::from_millis(1),
                half_open_max_requests: 1,
            },
        )
    }

    #[test]
    fn test_initial_state_is_closed() {
        let cb = CircuitBreaker::with_defaults("primary");
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.allow_request());
    }

    #[test]
    fn test_opens_after_threshold_failures() {
        let cb = CircuitBreaker::new(
            "primary",
            CircuitBreakerConfig {
                failure_threshold: 3,
                ..Default::default()
            },
        );
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);

        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.allow_request());
        assert_eq!(cb.stats().blocked_count, 1);
    }

    #[test]
    fn test_unauthenticated_does_not_trip() {
        let cb = quick(1);
        let outcome: Result<(), ProviderError> = Err(ProviderError::not_configured("openai"));
        cb.record(&outcome);
        cb.record(&outcome);
        assert_eq!(cb.state(), CircuitState::Closed);

        let outcome: Result<(), ProviderError> =
            Err(ProviderError::new(ProviderErrorKind::RateLimited, "slow down"));
        cb.record(&outcome);
        assert_eq!(cb.stats().state, CircuitState::Open);
    }

    #[test]
    fn test_half_open_admits_limited_probes() {
        let cb = quick(1);
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(10));

        assert!(cb.allow_request());
        assert!(!cb.allow_request());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn test_half_open_recovery_and_relapse() {
        let cb = quick(1);
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        cb.record_failure();
        assert_eq!(cb.stats().state, CircuitState::Open);

        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_unauthenticated_releases_probe() {
        let cb = CircuitBreaker::new(
            "secondary",
            CircuitBreakerConfig {
                failure_threshold: 1,
                success_threshold: 1,
                open_timeout: Duration::from_millis(1),
                half_open_max_requests: 3,
            },
        );
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(10));

        let revoked: Result<(), ProviderError> = Err(ProviderError::with_provider(
            ProviderErrorKind::Unauthenticated,
            "401",
            "anthropic",
        ));
        for _ in 0..3 {
            assert!(cb.allow_request());
        }
        for _ in 0..3 {
            cb.record(&revoked);
        }

        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(cb.allow_request());
        cb.record(&Ok::<(), ProviderError>(()));
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_partial_success_keeps_probing() {
        let cb = quick(1);
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(10));

        assert!(cb.allow_request());
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert!(cb.allow_request());
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_manual_reset() {
        let cb = quick(1);
        cb.record_failure();
        cb.reset();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.stats().summary().contains("CLOSED"));
    }
}
