// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the skyshift failover controller.
//!
//! All metrics carry the `skyshift` namespace prefix and live in one global
//! registry, exposed by the HTTP trigger server at `/metrics`.
//!
//! # Metrics Categories
//!
//! - **Cycle Metrics** - Count evaluation cycles by outcome and time them
//! - **Health Metrics** - Last observed status of every health check target
//! - **Routing Metrics** - Last published weight per provider
//! - **Error Metrics** - Health query and publish failures by kind
//!
//! # Example
//!
//! ```rust,no_run
//! use skyshift::metrics::record_cycle;
//!
//! record_cycle("published", std::time::Duration::from_millis(120));
//! ```

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

use crate::health::{HealthCheckTarget, HealthStatus, Provider};
use crate::records::TrafficWeight;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all skyshift metrics
const METRICS_NAMESPACE: &str = "skyshift";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Cycle Metrics
// ============================================================================

/// Total number of evaluation cycles by outcome
///
/// Labels:
/// - `outcome`: `published`, `held` or `failed`
pub static CYCLES_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_cycles_total"),
        "Total number of evaluation cycles by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of evaluation cycles in seconds
///
/// Labels:
/// - `outcome`: `published`, `held` or `failed`
pub static CYCLE_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_cycle_duration_seconds"),
        "Duration of evaluation cycles in seconds by outcome",
    )
    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Health Metrics
// ============================================================================

/// Last observed status per health check target
///
/// Labels:
/// - `target`: e.g. `aws_alb`, `gcp_cluster_1`
/// - `provider`: `aws` or `gcp`
///
/// Value: 1 healthy, 0 unhealthy, -1 unknown
pub static HEALTH_STATUS: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_health_status"),
        "Last observed health status (1 = healthy, 0 = unhealthy, -1 = unknown)",
    );
    let gauge = GaugeVec::new(opts, &["target", "provider"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Routing Metrics
// ============================================================================

/// Last successfully published weight per provider
///
/// Labels:
/// - `provider`: `aws` or `gcp`
pub static PUBLISHED_WEIGHT: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_published_weight"),
        "Last successfully published weighted record value by provider",
    );
    let gauge = GaugeVec::new(opts, &["provider"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of failed health check queries
///
/// Labels:
/// - `target`: Health check target
/// - `kind`: `unavailable`, `no_observations` or `timeout`
pub static HEALTH_QUERY_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_health_query_errors_total"),
        "Total number of failed health check queries by target and kind",
    );
    let counter = CounterVec::new(opts, &["target", "kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of failed publish calls
///
/// Labels:
/// - `kind`: `rejected`, `timeout` or `invalid_record`
pub static PUBLISH_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_publish_errors_total"),
        "Total number of failed weighted record publishes by kind",
    );
    let counter = CounterVec::new(opts, &["kind"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a finished evaluation cycle
///
/// # Arguments
/// * `outcome` - `published`, `held` or `failed`
/// * `duration` - Duration of the cycle
pub fn record_cycle(outcome: &str, duration: Duration) {
    CYCLES_TOTAL.with_label_values(&[outcome]).inc();
    CYCLE_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(duration.as_secs_f64());
}

/// Record the status observed for one target
pub fn record_health_status(target: HealthCheckTarget, status: HealthStatus) {
    HEALTH_STATUS
        .with_label_values(&[target.as_str(), target.provider().as_str()])
        .set(status.gauge_value());
}

/// Record a successfully published weight pair
pub fn record_published_weights(weight_aws: TrafficWeight, weight_gcp: TrafficWeight) {
    PUBLISHED_WEIGHT
        .with_label_values(&[Provider::Aws.as_str()])
        .set(f64::from(weight_aws.value()));
    PUBLISHED_WEIGHT
        .with_label_values(&[Provider::Gcp.as_str()])
        .set(f64::from(weight_gcp.value()));
}

/// Record a failed health check query
pub fn record_health_query_error(target: HealthCheckTarget, kind: &str) {
    HEALTH_QUERY_ERRORS_TOTAL
        .with_label_values(&[target.as_str(), kind])
        .inc();
}

/// Record a failed publish
pub fn record_publish_error(kind: &str) {
    PUBLISH_ERRORS_TOTAL.with_label_values(&[kind]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
