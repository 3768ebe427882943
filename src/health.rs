// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Health check types and the health check client seam.
//!
//! Six health checks are tracked, one per monitored endpoint: the load balancer
//! and two cluster ingresses on each provider. Status report text from the
//! control plane is decoded exactly once, here, into [`HealthStatus`]; nothing
//! downstream compares strings.
//!
//! # Example
//!
//! ```rust
//! use skyshift::health::HealthStatus;
//!
//! assert_eq!(
//!     HealthStatus::from_report("Failure: Connection timed out."),
//!     HealthStatus::Unhealthy
//! );
//! assert_eq!(
//!     HealthStatus::from_report("Success: HTTP Status Code 200, OK"),
//!     HealthStatus::Healthy
//! );
//! assert_eq!(HealthStatus::from_report(""), HealthStatus::Unknown);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{
    ENV_ALB_HEALTH_CHECK_ID, ENV_EKS_HEALTH_CHECK1_ID, ENV_EKS_HEALTH_CHECK2_ID,
    ENV_GCP_HEALTH_CHECK_ID, ENV_GKE_HEALTH_CHECK1_ID, ENV_GKE_HEALTH_CHECK2_ID,
};
use crate::errors::HealthCheckError;

/// Substring the control plane uses to mark a failing checker report
const REPORT_FAILURE_MARKER: &str = "Failure";

/// Substring the control plane uses to mark a passing checker report
const REPORT_SUCCESS_MARKER: &str = "Success";

/// Opaque identifier of a control-plane health check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HealthCheckId(String);

impl HealthCheckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HealthCheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cloud provider that can receive traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Aws,
    Gcp,
}

impl Provider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Gcp => "gcp",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the six monitored endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCheckTarget {
    /// AWS application load balancer
    AwsAlb,
    /// First AWS cluster ingress
    AwsCluster1,
    /// Second AWS cluster ingress
    AwsCluster2,
    /// GCP load balancer
    GcpLb,
    /// First GCP cluster ingress
    GcpCluster1,
    /// Second GCP cluster ingress
    GcpCluster2,
}

impl HealthCheckTarget {
    /// Every tracked target, AWS first
    pub const ALL: [HealthCheckTarget; 6] = [
        Self::AwsAlb,
        Self::AwsCluster1,
        Self::AwsCluster2,
        Self::GcpLb,
        Self::GcpCluster1,
        Self::GcpCluster2,
    ];

    #[must_use]
    pub fn provider(self) -> Provider {
        match self {
            Self::AwsAlb | Self::AwsCluster1 | Self::AwsCluster2 => Provider::Aws,
            Self::GcpLb | Self::GcpCluster1 | Self::GcpCluster2 => Provider::Gcp,
        }
    }

    /// Environment variable holding this target's health check identifier.
    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            Self::AwsAlb => ENV_ALB_HEALTH_CHECK_ID,
            Self::AwsCluster1 => ENV_EKS_HEALTH_CHECK1_ID,
            Self::AwsCluster2 => ENV_EKS_HEALTH_CHECK2_ID,
            Self::GcpLb => ENV_GCP_HEALTH_CHECK_ID,
            Self::GcpCluster1 => ENV_GKE_HEALTH_CHECK1_ID,
            Self::GcpCluster2 => ENV_GKE_HEALTH_CHECK2_ID,
        }
    }

    /// Stable label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwsAlb => "aws_alb",
            Self::AwsCluster1 => "aws_cluster_1",
            Self::AwsCluster2 => "aws_cluster_2",
            Self::GcpLb => "gcp_lb",
            Self::GcpCluster1 => "gcp_cluster_1",
            Self::GcpCluster2 => "gcp_cluster_2",
        }
    }
}

impl fmt::Display for HealthCheckTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time health of one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    /// No usable signal. Never interpreted as `Healthy` by this crate; the
    /// failover policy decides explicitly what it means.
    Unknown,
}

impl HealthStatus {
    /// Decode a checker status report.
    ///
    /// A report mentioning `Failure` is unhealthy even if it also mentions
    /// `Success`. Anything carrying neither marker is `Unknown`.
    #[must_use]
    pub fn from_report(report: &str) -> Self {
        if report.contains(REPORT_FAILURE_MARKER) {
            Self::Unhealthy
        } else if report.contains(REPORT_SUCCESS_MARKER) {
            Self::Healthy
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Unknown => "unknown",
        }
    }

    /// Gauge encoding: 1 healthy, 0 unhealthy, -1 unknown.
    #[must_use]
    pub fn gauge_value(self) -> f64 {
        match self {
            Self::Healthy => 1.0,
            Self::Unhealthy => 0.0,
            Self::Unknown => -1.0,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One checker's report as returned by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservationReport {
    /// Raw status text, if the checker produced one
    pub status: Option<String>,
    /// When the checker last ran
    pub checked_at: Option<DateTime<Utc>>,
}

/// Decode the latest report from a health check's observation list.
///
/// The most recently checked report wins. Reports without a timestamp only win
/// when no report carries one, in which case the first report is used.
///
/// # Errors
///
/// Returns [`HealthCheckError::NoObservations`] when `reports` is empty.
pub fn decode_observations(
    id: &HealthCheckId,
    reports: &[ObservationReport],
) -> Result<HealthStatus, HealthCheckError> {
    let latest = reports
        .iter()
        .filter(|report| report.checked_at.is_some())
        .max_by_key(|report| report.checked_at)
        .or_else(|| reports.first())
        .ok_or_else(|| HealthCheckError::NoObservations { id: id.to_string() })?;

    Ok(latest
        .status
        .as_deref()
        .map_or(HealthStatus::Unknown, HealthStatus::from_report))
}

/// Client for point-in-time health check status.
///
/// Implementations query the control plane once per call and have no side
/// effects. Timeouts and retries are applied by the caller.
#[async_trait]
pub trait HealthCheckClient: Send + Sync {
    /// Fetch the latest status for `id`.
    ///
    /// # Errors
    ///
    /// Returns a [`HealthCheckError`] when the control plane cannot be reached
    /// or reports no observations. Callers must treat this as `Unknown`.
    async fn get_status(&self, id: &HealthCheckId) -> Result<HealthStatus, HealthCheckError>;
}

/// The three statuses observed for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderGroup {
    pub load_balancer: HealthStatus,
    pub cluster1: HealthStatus,
    pub cluster2: HealthStatus,
}

impl ProviderGroup {
    #[must_use]
    pub fn statuses(&self) -> [HealthStatus; 3] {
        [self.load_balancer, self.cluster1, self.cluster2]
    }

    #[must_use]
    pub fn contains(&self, status: HealthStatus) -> bool {
        self.statuses().contains(&status)
    }
}

/// Statuses gathered during one evaluation cycle, keyed by target.
///
/// A target with no recorded status reads as `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observations(BTreeMap<HealthCheckTarget, HealthStatus>);

impl Observations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, target: HealthCheckTarget, status: HealthStatus) {
        self.0.insert(target, status);
    }

    #[must_use]
    pub fn get(&self, target: HealthCheckTarget) -> HealthStatus {
        self.0
            .get(&target)
            .copied()
            .unwrap_or(HealthStatus::Unknown)
    }

    #[must_use]
    pub fn group(&self, provider: Provider) -> ProviderGroup {
        match provider {
            Provider::Aws => ProviderGroup {
                load_balancer: self.get(HealthCheckTarget::AwsAlb),
                cluster1: self.get(HealthCheckTarget::AwsCluster1),
                cluster2: self.get(HealthCheckTarget::AwsCluster2),
            },
            Provider::Gcp => ProviderGroup {
                load_balancer: self.get(HealthCheckTarget::GcpLb),
                cluster1: self.get(HealthCheckTarget::GcpCluster1),
                cluster2: self.get(HealthCheckTarget::GcpCluster2),
            },
        }
    }

    /// Targets whose status is `Unknown`, in [`HealthCheckTarget::ALL`] order.
    #[must_use]
    pub fn unknown_targets(&self) -> Vec<HealthCheckTarget> {
        HealthCheckTarget::ALL
            .into_iter()
            .filter(|target| self.get(*target) == HealthStatus::Unknown)
            .collect()
    }
}

impl FromIterator<(HealthCheckTarget, HealthStatus)> for Observations {
    fn from_iter<I: IntoIterator<Item = (HealthCheckTarget, HealthStatus)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod health_tests;
