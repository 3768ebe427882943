// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route 53 implementation of the DNS control plane.
//!
//! [`Route53ControlPlane`] serves both seams of the controller: it reads
//! health check status with `GetHealthCheckStatus` and writes the weighted
//! record pair with `ChangeResourceRecordSets`. Route 53 applies a change
//! batch atomically, which is what keeps the two sibling records consistent.
//!
//! The SDK's own retry layer is left as configured by the caller. Health
//! queries are additionally bounded and retried by the controller.

use async_trait::async_trait;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types;
use aws_sdk_route53::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::constants::MAX_ROUTE53_WEIGHT;
use crate::errors::{HealthCheckError, PublishError};
use crate::health::{
    decode_observations, HealthCheckClient, HealthCheckId, HealthStatus, ObservationReport,
};
use crate::records::{ChangeAction, ChangeBatch, RecordSetWriter, RecordTarget, WeightedRecordSet};

/// Route 53 backed health reader and record writer.
#[derive(Clone, Debug)]
pub struct Route53ControlPlane {
    client: Client,
}

impl Route53ControlPlane {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a control plane from a loaded shared AWS configuration.
    #[must_use]
    pub fn from_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl HealthCheckClient for Route53ControlPlane {
    async fn get_status(&self, id: &HealthCheckId) -> Result<HealthStatus, HealthCheckError> {
        let output = self
            .client
            .get_health_check_status()
            .health_check_id(id.as_str())
            .send()
            .await
            .map_err(|e| HealthCheckError::Unavailable {
                id: id.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let reports: Vec<ObservationReport> = output
            .health_check_observations()
            .iter()
            .map(observation_report)
            .collect();

        debug!(
            health_check_id = %id,
            observations = reports.len(),
            "Fetched health check status"
        );

        decode_observations(id, &reports)
    }
}

#[async_trait]
impl RecordSetWriter for Route53ControlPlane {
    async fn change_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<(), PublishError> {
        let sdk_batch = to_sdk_change_batch(batch)?;
        let domain = batch
            .changes
            .first()
            .map(|change| change.record_set.name.clone())
            .unwrap_or_default();

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(sdk_batch)
            .send()
            .await
            .map_err(|e| PublishError::Rejected {
                zone_id: zone_id.to_string(),
                domain: domain.clone(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        debug!(zone_id = %zone_id, domain = %domain, "Change batch accepted");

        Ok(())
    }
}

/// Convert one SDK observation into the provider-neutral report.
fn observation_report(observation: &types::HealthCheckObservation) -> ObservationReport {
    let report = observation.status_report();
    ObservationReport {
        status: report.and_then(types::StatusReport::status).map(str::to_string),
        checked_at: report
            .and_then(types::StatusReport::checked_time)
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())),
    }
}

/// Convert a change batch into its Route 53 request shape.
///
/// # Errors
///
/// Returns [`PublishError::InvalidRecord`] if a record cannot be expressed to
/// Route 53, for example a weight above [`MAX_ROUTE53_WEIGHT`].
pub fn to_sdk_change_batch(batch: &ChangeBatch) -> Result<types::ChangeBatch, PublishError> {
    let changes = batch
        .changes
        .iter()
        .map(|change| {
            let action = match change.action {
                ChangeAction::Upsert => types::ChangeAction::Upsert,
            };
            types::Change::builder()
                .action(action)
                .resource_record_set(to_sdk_record_set(&change.record_set)?)
                .build()
                .map_err(|e| invalid(&change.record_set, &e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    types::ChangeBatch::builder()
        .set_comment(batch.comment.clone())
        .set_changes(Some(changes))
        .build()
        .map_err(|e| PublishError::InvalidRecord {
            set_identifier: String::new(),
            reason: e.to_string(),
        })
}

/// Convert one weighted record into a Route 53 resource record set.
///
/// # Errors
///
/// Returns [`PublishError::InvalidRecord`] if the weight is out of range or
/// the SDK rejects a required field.
pub fn to_sdk_record_set(
    record: &WeightedRecordSet,
) -> Result<types::ResourceRecordSet, PublishError> {
    if record.weight.value() > MAX_ROUTE53_WEIGHT {
        return Err(PublishError::InvalidRecord {
            set_identifier: record.set_identifier.clone(),
            reason: format!(
                "weight {} exceeds the maximum of {MAX_ROUTE53_WEIGHT}",
                record.weight
            ),
        });
    }

    let builder = types::ResourceRecordSet::builder()
        .name(&record.name)
        .r#type(types::RrType::from(record.record_type.as_str()))
        .set_identifier(&record.set_identifier)
        .weight(i64::from(record.weight.value()));

    let builder = match &record.target {
        RecordTarget::Alias {
            hosted_zone_id,
            dns_name,
            evaluate_target_health,
        } => {
            let alias = types::AliasTarget::builder()
                .hosted_zone_id(hosted_zone_id)
                .dns_name(dns_name)
                .evaluate_target_health(*evaluate_target_health)
                .build()
                .map_err(|e| invalid(record, &e))?;
            builder.alias_target(alias)
        }
        RecordTarget::Address { ip, ttl } => {
            let value = types::ResourceRecord::builder()
                .value(ip.to_string())
                .build()
                .map_err(|e| invalid(record, &e))?;
            builder.ttl(*ttl).resource_records(value)
        }
    };

    builder.build().map_err(|e| invalid(record, &e))
}

fn invalid(record: &WeightedRecordSet, e: &impl std::fmt::Display) -> PublishError {
    PublishError::InvalidRecord {
        set_identifier: record.set_identifier.clone(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
#[path = "route53_tests.rs"]
mod route53_tests;
