// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Failover decision policy.
//!
//! [`FailoverPolicy::decide`] is a pure function from the six observed
//! statuses to a pair of traffic weights. Rules are evaluated in the order of
//! [`FailoverRule::PRIORITY`] and the first match wins:
//!
//! | Priority | Rule          | Matches when                    | Weights (AWS, GCP)   |
//! |----------|---------------|---------------------------------|----------------------|
//! | 1        | `GcpDegraded` | any GCP status is unhealthy     | (`full`, `off`)      |
//! | 2        | `AwsDegraded` | any AWS status is unhealthy     | (`off`, `full`)      |
//! | 3        | `Nominal`     | always                          | (`base_aws`, `base_gcp`) |
//!
//! Because `GcpDegraded` is checked first, a simultaneous failure on both
//! providers sends all traffic to AWS.
//!
//! What `Unknown` means is chosen by [`UnknownStatusPolicy`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BASE_AWS_WEIGHT, DEFAULT_BASE_GCP_WEIGHT, DEFAULT_FULL_WEIGHT, DEFAULT_OFF_WEIGHT,
};
use crate::health::{HealthStatus, ProviderGroup};
use crate::records::TrafficWeight;

/// Weights the policy can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    /// Weight of the surviving provider during failover
    pub full: TrafficWeight,
    /// Nominal AWS weight
    pub base_aws: TrafficWeight,
    /// Nominal GCP weight
    pub base_gcp: TrafficWeight,
    /// Weight of the degraded provider during failover
    pub off: TrafficWeight,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            full: TrafficWeight::new(DEFAULT_FULL_WEIGHT),
            base_aws: TrafficWeight::new(DEFAULT_BASE_AWS_WEIGHT),
            base_gcp: TrafficWeight::new(DEFAULT_BASE_GCP_WEIGHT),
            off: TrafficWeight::new(DEFAULT_OFF_WEIGHT),
        }
    }
}

/// How an `Unknown` health status is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownStatusPolicy {
    /// Unknown never triggers failover
    #[default]
    TreatAsHealthy,
    /// Unknown counts as unhealthy
    TreatAsUnhealthy,
    /// Any Unknown status holds the previously published weights
    Hold,
}

impl UnknownStatusPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TreatAsHealthy => "treat-as-healthy",
            Self::TreatAsUnhealthy => "treat-as-unhealthy",
            Self::Hold => "hold",
        }
    }
}

impl fmt::Display for UnknownStatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnknownStatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "treat-as-healthy" | "healthy" => Ok(Self::TreatAsHealthy),
            "treat-as-unhealthy" | "unhealthy" => Ok(Self::TreatAsUnhealthy),
            "hold" => Ok(Self::Hold),
            _ => Err("expected one of: treat-as-healthy, treat-as-unhealthy, hold".to_string()),
        }
    }
}

/// A row of the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailoverRule {
    /// GCP is degraded: route everything to AWS
    GcpDegraded,
    /// AWS is degraded: route everything to GCP
    AwsDegraded,
    /// Neither is degraded: nominal split
    Nominal,
}

impl FailoverRule {
    /// Evaluation order. `GcpDegraded` before `AwsDegraded` is the tie-break.
    pub const PRIORITY: [FailoverRule; 3] = [Self::GcpDegraded, Self::AwsDegraded, Self::Nominal];

    fn matches(self, gcp_degraded: bool, aws_degraded: bool) -> bool {
        match self {
            Self::GcpDegraded => gcp_degraded,
            Self::AwsDegraded => aws_degraded,
            Self::Nominal => true,
        }
    }

    /// `(weight_aws, weight_gcp)` for this rule.
    fn weights(self, table: &WeightTable) -> (TrafficWeight, TrafficWeight) {
        match self {
            Self::GcpDegraded => (table.full, table.off),
            Self::AwsDegraded => (table.off, table.full),
            Self::Nominal => (table.base_aws, table.base_gcp),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GcpDegraded => "gcp_degraded",
            Self::AwsDegraded => "aws_degraded",
            Self::Nominal => "nominal",
        }
    }
}

impl fmt::Display for FailoverRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weights chosen for one cycle and the rule that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub rule: FailoverRule,
    pub weight_aws: TrafficWeight,
    pub weight_gcp: TrafficWeight,
}

/// Policy result: publish a decision, or leave the current weights alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PolicyOutcome {
    Publish(Decision),
    Hold,
}

/// The failover decision table with its configured weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailoverPolicy {
    weights: WeightTable,
    unknown: UnknownStatusPolicy,
}

impl FailoverPolicy {
    #[must_use]
    pub fn new(weights: WeightTable, unknown: UnknownStatusPolicy) -> Self {
        Self { weights, unknown }
    }

    #[must_use]
    pub fn unknown_policy(&self) -> UnknownStatusPolicy {
        self.unknown
    }

    /// Decide the weights for the given provider groups.
    #[must_use]
    pub fn decide(&self, gcp: &ProviderGroup, aws: &ProviderGroup) -> PolicyOutcome {
        if self.unknown == UnknownStatusPolicy::Hold
            && (gcp.contains(HealthStatus::Unknown) || aws.contains(HealthStatus::Unknown))
        {
            return PolicyOutcome::Hold;
        }

        let gcp_degraded = self.is_degraded(gcp);
        let aws_degraded = self.is_degraded(aws);

        let rule = FailoverRule::PRIORITY
            .into_iter()
            .find(|rule| rule.matches(gcp_degraded, aws_degraded))
            .unwrap_or(FailoverRule::Nominal);
        let (weight_aws, weight_gcp) = rule.weights(&self.weights);

        PolicyOutcome::Publish(Decision {
            rule,
            weight_aws,
            weight_gcp,
        })
    }

    fn is_degraded(&self, group: &ProviderGroup) -> bool {
        group.statuses().into_iter().any(|status| match status {
            HealthStatus::Unhealthy => true,
            HealthStatus::Healthy => false,
            HealthStatus::Unknown => self.unknown == UnknownStatusPolicy::TreatAsUnhealthy,
        })
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod policy_tests;
