// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Bounded retry with exponential backoff for health check queries.
//!
//! Health check reads are retried a fixed number of times on transient errors
//! (unreachable control plane, timeout), with every attempt bounded by its own
//! timeout. Record-set writes are never retried here; a failed publish fails
//! the cycle and the external scheduler retries on its own schedule.

use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::errors::HealthCheckError;
use crate::health::HealthCheckId;

/// Initial retry interval (100ms)
const INITIAL_INTERVAL_MILLIS: u64 = 100;

/// Maximum interval between retries (1 second)
const MAX_INTERVAL_MILLIS: u64 = 1_000;

/// Backoff multiplier (exponential growth factor)
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Randomization factor to prevent thundering herd (±10%)
const RANDOMIZATION_FACTOR: f64 = 0.1;

/// Simple exponential backoff implementation.
///
/// Provides exponential backoff with randomization (jitter) to prevent thundering herd.
pub struct ExponentialBackoff {
    /// Current interval duration
    pub current_interval: Duration,
    /// Maximum interval duration
    pub max_interval: Duration,
    /// Backoff multiplier (typically 2.0 for doubling)
    pub multiplier: f64,
    /// Randomization factor (e.g., 0.1 for ±10%)
    pub randomization_factor: f64,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with specified parameters.
    fn new(
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
        randomization_factor: f64,
    ) -> Self {
        Self {
            current_interval: initial_interval,
            max_interval,
            multiplier,
            randomization_factor,
        }
    }

    /// Get the next backoff interval and advance the schedule.
    pub fn next_backoff(&mut self) -> Duration {
        let interval = self.current_interval;
        let jittered = self.apply_jitter(interval);

        let next = interval.as_secs_f64() * self.multiplier;
        self.current_interval = Duration::from_secs_f64(next).min(self.max_interval);

        jittered
    }

    /// Apply randomization (jitter) to an interval.
    fn apply_jitter(&self, interval: Duration) -> Duration {
        if self.randomization_factor == 0.0 {
            return interval;
        }

        let secs = interval.as_secs_f64();
        let delta = secs * self.randomization_factor;
        let min = secs - delta;
        let max = secs + delta;

        let jittered = rand::rng().random_range(min..=max);

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

/// Create the backoff schedule used between health check attempts.
///
/// # Configuration
///
/// - **Initial interval**: 100ms
/// - **Max interval**: 1 second
/// - **Multiplier**: 2.0 (exponential growth)
/// - **Randomization**: ±10% (prevents thundering herd)
///
/// The number of attempts is bounded by the caller, not by elapsed time.
#[must_use]
pub fn health_check_backoff() -> ExponentialBackoff {
    ExponentialBackoff::new(
        Duration::from_millis(INITIAL_INTERVAL_MILLIS),
        Duration::from_millis(MAX_INTERVAL_MILLIS),
        BACKOFF_MULTIPLIER,
        RANDOMIZATION_FACTOR,
    )
}

/// Query a health check with a per-attempt timeout and bounded retries.
///
/// Every attempt is cut off after `attempt_timeout` and reported as
/// [`HealthCheckError::Timeout`]. Retryable errors are retried until
/// `max_attempts` is reached; non-retryable errors return immediately.
///
/// # Errors
///
/// Returns the last error once attempts are exhausted, or the first
/// non-retryable error.
pub async fn retry_health_query<T, F, Fut>(
    mut operation: F,
    id: &HealthCheckId,
    max_attempts: u32,
    attempt_timeout: Duration,
) -> Result<T, HealthCheckError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HealthCheckError>>,
{
    let mut backoff = health_check_backoff();
    let start_time = Instant::now();
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let result = match tokio::time::timeout(attempt_timeout, operation()).await {
            Ok(result) => result,
            Err(_) => Err(HealthCheckError::Timeout {
                id: id.to_string(),
                timeout_ms: u64::try_from(attempt_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        match result {
            Ok(value) => {
                if attempt > 1 {
                    debug!(
                        health_check_id = %id,
                        attempt = attempt,
                        elapsed = ?start_time.elapsed(),
                        "Health check query succeeded after retries"
                    );
                }
                return Ok(value);
            }
            Err(e) if !e.is_retryable() || attempt >= max_attempts => {
                return Err(e);
            }
            Err(e) => {
                let duration = backoff.next_backoff();
                warn!(
                    health_check_id = %id,
                    attempt = attempt,
                    retry_after = ?duration,
                    error = %e,
                    "Retryable health check error, will retry"
                );
                tokio::time::sleep(duration).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod retry_tests;
