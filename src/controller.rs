// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! One evaluation cycle: gather health, apply the policy, publish weights.
//!
//! Each cycle is self-contained. The six health queries run concurrently and
//! all of them resolve (or fail) before the policy runs. A failed query is
//! logged and degraded to `Unknown`. The weights are recomputed from scratch
//! and republished every cycle, never diffed against what is live, so a
//! failed publish is corrected by the next successful cycle.
//!
//! The controller holds no mutable state. Overlapping cycles are tolerated and
//! the last write wins.
//!
//! # Example
//!
//! ```rust,no_run
//! use skyshift::config::FailoverConfig;
//! use skyshift::controller::Controller;
//! use skyshift::route53::Route53ControlPlane;
//! use std::sync::Arc;
//!
//! # async fn example(plane: Arc<Route53ControlPlane>) -> anyhow::Result<()> {
//! let config = FailoverConfig::from_env()?;
//! let controller = Controller::new(&config, plane.clone(), plane);
//! let result = controller.run_cycle().await?;
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{FailoverConfig, HealthCheckIds};
use crate::errors::PublishError;
use crate::health::{
    HealthCheckClient, HealthCheckTarget, HealthStatus, Observations, Provider,
};
use crate::metrics;
use crate::policy::{Decision, FailoverPolicy, PolicyOutcome};
use crate::records::{RecordSetWriter, WeightPublisher};
use crate::retry::retry_health_query;

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// New weights were written
    Published,
    /// The policy held; nothing was written
    Held,
    /// The write failed; the prior weights remain in effect
    Failed,
}

impl CycleOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Held => "held",
            Self::Failed => "failed",
        }
    }
}

/// Outcome of one controller cycle, used for logging and the trigger result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub evaluated_at: DateTime<Utc>,
    pub observations: Observations,
    /// `None` when the policy held
    pub decision: Option<Decision>,
    pub outcome: CycleOutcome,
    pub elapsed_ms: u64,
}

/// Errors surfaced to the trigger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CycleError {
    /// The weighted record write failed
    #[error("Evaluation cycle failed: {source}")]
    CycleFailed {
        /// What was observed and decided before the write failed
        result: Box<EvaluationResult>,
        /// The publish error, unmodified
        source: PublishError,
    },
}

/// Runs evaluation cycles against the configured control plane.
pub struct Controller {
    health: Arc<dyn HealthCheckClient>,
    health_checks: HealthCheckIds,
    health_check_timeout: Duration,
    health_check_attempts: u32,
    policy: FailoverPolicy,
    publisher: WeightPublisher,
}

impl Controller {
    /// Build a controller from the startup configuration.
    #[must_use]
    pub fn new(
        config: &FailoverConfig,
        health: Arc<dyn HealthCheckClient>,
        writer: Arc<dyn RecordSetWriter>,
    ) -> Self {
        Self {
            health,
            health_checks: config.health_checks.clone(),
            health_check_timeout: config.health_check_timeout,
            health_check_attempts: config.health_check_attempts,
            policy: FailoverPolicy::new(config.weights, config.unknown_policy),
            publisher: WeightPublisher::new(config.dns.clone(), writer, config.publish_timeout),
        }
    }

    /// Query all six health checks concurrently.
    ///
    /// Returns only once every query has resolved. Failed queries read as
    /// `Unknown`.
    pub async fn gather(&self) -> Observations {
        let queries = self.health_checks.iter().map(|(target, id)| async move {
            let result = retry_health_query(
                || self.health.get_status(id),
                id,
                self.health_check_attempts,
                self.health_check_timeout,
            )
            .await;

            let status = match result {
                Ok(status) => status,
                Err(e) => {
                    warn!(
                        target_name = %target,
                        health_check_id = %id,
                        error = %e,
                        "Health check query failed, treating status as unknown"
                    );
                    metrics::record_health_query_error(target, e.kind());
                    HealthStatus::Unknown
                }
            };
            metrics::record_health_status(target, status);
            (target, status)
        });

        join_all(queries).await.into_iter().collect()
    }

    /// Run one evaluation cycle.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::CycleFailed`] if the weighted records could not
    /// be published. Health query failures never fail the cycle.
    pub async fn run_cycle(&self) -> Result<EvaluationResult, CycleError> {
        let start_time = Instant::now();
        let evaluated_at = Utc::now();

        let observations = self.gather().await;
        let gcp = observations.group(Provider::Gcp);
        let aws = observations.group(Provider::Aws);
        let outcome = self.policy.decide(&gcp, &aws);

        let decision = match outcome {
            PolicyOutcome::Publish(decision) => decision,
            PolicyOutcome::Hold => {
                let result = self.finish(
                    evaluated_at,
                    observations,
                    None,
                    CycleOutcome::Held,
                    start_time,
                );
                info!(
                    unknown = ?result.observations.unknown_targets(),
                    "Health signal incomplete, holding current weights"
                );
                return Ok(result);
            }
        };

        match self
            .publisher
            .publish(decision.weight_aws, decision.weight_gcp)
            .await
        {
            Ok(()) => {
                metrics::record_published_weights(decision.weight_aws, decision.weight_gcp);
                Ok(self.finish(
                    evaluated_at,
                    observations,
                    Some(decision),
                    CycleOutcome::Published,
                    start_time,
                ))
            }
            Err(source) => {
                metrics::record_publish_error(source.kind());
                let result = self.finish(
                    evaluated_at,
                    observations,
                    Some(decision),
                    CycleOutcome::Failed,
                    start_time,
                );
                Err(CycleError::CycleFailed {
                    result: Box::new(result),
                    source,
                })
            }
        }
    }

    /// Log the cycle summary, record cycle metrics and build the result.
    fn finish(
        &self,
        evaluated_at: DateTime<Utc>,
        observations: Observations,
        decision: Option<Decision>,
        outcome: CycleOutcome,
        start_time: Instant,
    ) -> EvaluationResult {
        let elapsed = start_time.elapsed();
        metrics::record_cycle(outcome.as_str(), elapsed);

        info!(
            aws_alb = %observations.get(HealthCheckTarget::AwsAlb),
            aws_cluster_1 = %observations.get(HealthCheckTarget::AwsCluster1),
            aws_cluster_2 = %observations.get(HealthCheckTarget::AwsCluster2),
            gcp_lb = %observations.get(HealthCheckTarget::GcpLb),
            gcp_cluster_1 = %observations.get(HealthCheckTarget::GcpCluster1),
            gcp_cluster_2 = %observations.get(HealthCheckTarget::GcpCluster2),
            rule = decision.map_or("none", |d| d.rule.as_str()),
            weight_aws = ?decision.map(|d| d.weight_aws.value()),
            weight_gcp = ?decision.map(|d| d.weight_gcp.value()),
            unknown_policy = %self.policy.unknown_policy(),
            outcome = outcome.as_str(),
            elapsed = ?elapsed,
            "Evaluation cycle finished"
        );

        EvaluationResult {
            evaluated_at,
            observations,
            decision,
            outcome,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
