// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Weighted record sets and the publisher that rewrites them.
//!
//! Two sibling weighted records share one domain name: an alias record that
//! sends traffic to AWS (through the CDN distribution) and a literal-address
//! record that sends traffic to GCP. Weighted routing requires every sibling
//! to be present and consistent, so [`WeightPublisher::publish`] always
//! submits both records in one atomic batch, even when only one weight moved.
//!
//! # Example
//!
//! ```rust,no_run
//! use skyshift::records::{TrafficWeight, WeightPublisher};
//!
//! # async fn example(publisher: WeightPublisher) -> Result<(), skyshift::errors::PublishError> {
//! // Route everything to AWS
//! publisher.publish(TrafficWeight::new(50), TrafficWeight::new(0)).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::config::DnsConfig;
use crate::constants::{CHANGE_BATCH_COMMENT, WEIGHTED_RECORD_TYPE};
use crate::errors::PublishError;

/// Relative share of resolved traffic routed to a provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TrafficWeight(u32);

impl TrafficWeight {
    #[must_use]
    pub const fn new(weight: u32) -> Self {
        Self(weight)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for TrafficWeight {
    fn from(weight: u32) -> Self {
        Self(weight)
    }
}

impl fmt::Display for TrafficWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a weighted record resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordTarget {
    /// Alias to another control-plane resource (no TTL of its own)
    Alias {
        hosted_zone_id: String,
        dns_name: String,
        evaluate_target_health: bool,
    },
    /// Literal IPv4 address with an explicit TTL
    Address { ip: Ipv4Addr, ttl: i64 },
}

/// One weighted DNS record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedRecordSet {
    pub name: String,
    pub record_type: String,
    /// Distinguishes this record from its siblings sharing `name`
    pub set_identifier: String,
    pub weight: TrafficWeight,
    pub target: RecordTarget,
}

/// Change action applied to a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create the record, or overwrite it if it exists
    Upsert,
}

/// One entry of a change batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub record_set: WeightedRecordSet,
}

/// Changes applied by the control plane as a single all-or-nothing unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub comment: Option<String>,
    pub changes: Vec<RecordChange>,
}

/// Write side of the DNS control plane.
#[async_trait]
pub trait RecordSetWriter: Send + Sync {
    /// Submit `batch` to hosted zone `zone_id`.
    ///
    /// The control plane applies every change or none of them.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] if the batch is rejected or cannot be sent.
    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch)
        -> Result<(), PublishError>;
}

/// Builds and publishes the weighted record pair for one domain.
#[derive(Clone)]
pub struct WeightPublisher {
    dns: DnsConfig,
    writer: Arc<dyn RecordSetWriter>,
    timeout: Duration,
}

impl WeightPublisher {
    #[must_use]
    pub fn new(dns: DnsConfig, writer: Arc<dyn RecordSetWriter>, timeout: Duration) -> Self {
        Self {
            dns,
            writer,
            timeout,
        }
    }

    /// Build the two-record UPSERT batch for the given weights.
    ///
    /// The AWS alias record comes first, then the GCP address record. Both
    /// share the configured domain name and carry distinct set-identifiers.
    #[must_use]
    pub fn build_change_batch(
        &self,
        weight_aws: TrafficWeight,
        weight_gcp: TrafficWeight,
    ) -> ChangeBatch {
        let aws = WeightedRecordSet {
            name: self.dns.domain.clone(),
            record_type: WEIGHTED_RECORD_TYPE.to_string(),
            set_identifier: self.dns.aws.set_identifier.clone(),
            weight: weight_aws,
            target: RecordTarget::Alias {
                hosted_zone_id: self.dns.aws.alias_hosted_zone_id.clone(),
                dns_name: self.dns.aws.alias_dns_name.clone(),
                evaluate_target_health: false,
            },
        };

        let gcp = WeightedRecordSet {
            name: self.dns.domain.clone(),
            record_type: WEIGHTED_RECORD_TYPE.to_string(),
            set_identifier: self.dns.gcp.set_identifier.clone(),
            weight: weight_gcp,
            target: RecordTarget::Address {
                ip: self.dns.gcp.ip,
                ttl: self.dns.gcp.ttl,
            },
        };

        ChangeBatch {
            comment: Some(CHANGE_BATCH_COMMENT.to_string()),
            changes: vec![
                RecordChange {
                    action: ChangeAction::Upsert,
                    record_set: aws,
                },
                RecordChange {
                    action: ChangeAction::Upsert,
                    record_set: gcp,
                },
            ],
        }
    }

    /// Publish both weighted records in one atomic batch.
    ///
    /// Always issues a write, even if the weights are unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Timeout`] if the write does not complete within
    /// the configured timeout, or whatever error the writer reports.
    pub async fn publish(
        &self,
        weight_aws: TrafficWeight,
        weight_gcp: TrafficWeight,
    ) -> Result<(), PublishError> {
        let batch = self.build_change_batch(weight_aws, weight_gcp);
        let start_time = Instant::now();

        debug!(
            zone_id = %self.dns.zone_id,
            domain = %self.dns.domain,
            changes = batch.changes.len(),
            "Submitting weighted record change batch"
        );

        let result = tokio::time::timeout(
            self.timeout,
            self.writer.change_record_sets(&self.dns.zone_id, &batch),
        )
        .await
        .unwrap_or_else(|_| {
            Err(PublishError::Timeout {
                zone_id: self.dns.zone_id.clone(),
                domain: self.dns.domain.clone(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            })
        });

        match &result {
            Ok(()) => info!(
                domain = %self.dns.domain,
                weight_aws = %weight_aws,
                weight_gcp = %weight_gcp,
                elapsed = ?start_time.elapsed(),
                "Published weighted records"
            ),
            Err(e) => error!(
                domain = %self.dns.domain,
                weight_aws = %weight_aws,
                weight_gcp = %weight_gcp,
                error = %e,
                "Failed to publish weighted records"
            ),
        }

        result
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
