// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory control plane shared by the unit tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

use crate::config::FailoverConfig;
use crate::errors::{HealthCheckError, PublishError};
use crate::health::{HealthCheckClient, HealthCheckId, HealthStatus};
use crate::policy::UnknownStatusPolicy;
use crate::records::{ChangeBatch, RecordSetWriter, TrafficWeight};

// =====================================================
// Configuration
// =====================================================

pub(crate) fn test_config() -> FailoverConfig {
    test_config_with(UnknownStatusPolicy::TreatAsHealthy)
}

pub(crate) fn test_config_with(unknown_policy: UnknownStatusPolicy) -> FailoverConfig {
    let env: HashMap<&str, &str> = [
        ("ALB_HEALTH_CHECK_ID", "alb"),
        ("EKS_HEALTH_CHECK1_ID", "eks1"),
        ("EKS_HEALTH_CHECK2_ID", "eks2"),
        ("GCP_HEALTH_CHECK_ID", "gcp"),
        ("GKE_HEALTH_CHECK1_ID", "gke1"),
        ("GKE_HEALTH_CHECK2_ID", "gke2"),
        ("ROUTE53_ZONE_ID", "Z0123456789"),
        ("AWS_API_RECORD_ID", "aws-api"),
        ("GCP_API_RECORD_ID", "gcp-api"),
        ("ROUTE53_API_DOMAIN", "api.example.com"),
        ("GCP_API_IP", "203.0.113.10"),
        ("CLOUDFRONT_HOSTED_ZONE_ID", "Z2FDTNDATAQYW2"),
        ("CLOUDFRONT_DNS_NAME", "d111111abcdef8.cloudfront.net"),
        ("HEALTH_CHECK_TIMEOUT_MS", "50"),
        ("HEALTH_CHECK_ATTEMPTS", "1"),
        ("PUBLISH_TIMEOUT_MS", "500"),
    ]
    .into_iter()
    .collect();

    let mut config =
        FailoverConfig::from_lookup(|name| env.get(name).map(|v| (*v).to_string())).unwrap();
    config.unknown_policy = unknown_policy;
    config
}

// =====================================================
// Health Check Fake
// =====================================================

/// What the fake answers for one health check id
#[derive(Clone)]
pub(crate) enum Reply {
    Status(HealthStatus),
    Error(HealthCheckError),
    Hang,
}

/// Health client answering from a fixed table. Unlisted ids are healthy.
#[derive(Default)]
pub(crate) struct ScriptedHealth {
    replies: HashMap<String, Reply>,
}

impl ScriptedHealth {
    pub(crate) fn healthy() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, id: &str, reply: Reply) -> Self {
        self.replies.insert(id.to_string(), reply);
        self
    }

    pub(crate) fn with_status(self, id: &str, status: HealthStatus) -> Self {
        self.with(id, Reply::Status(status))
    }
}

#[async_trait]
impl HealthCheckClient for ScriptedHealth {
    async fn get_status(&self, id: &HealthCheckId) -> Result<HealthStatus, HealthCheckError> {
        match self.replies.get(id.as_str()) {
            None => Ok(HealthStatus::Healthy),
            Some(Reply::Status(status)) => Ok(*status),
            Some(Reply::Error(e)) => Err(e.clone()),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(HealthStatus::Healthy)
            }
        }
    }
}

// =====================================================
// Record Store Fake
// =====================================================

/// Weighted records keyed by set-identifier, applied all-or-nothing.
#[derive(Default)]
pub(crate) struct InMemoryRecords {
    records: Mutex<BTreeMap<String, TrafficWeight>>,
    writes: Mutex<u32>,
    /// Reject any batch whose change at this index is reached
    fail_at_change: Option<usize>,
}

impl InMemoryRecords {
    pub(crate) fn failing_at(index: usize) -> Self {
        Self {
            fail_at_change: Some(index),
            ..Self::default()
        }
    }

    pub(crate) fn with_weights(self, weights: &[(&str, u32)]) -> Self {
        {
            let mut records = self.records.lock().unwrap();
            for (set_identifier, weight) in weights {
                records.insert((*set_identifier).to_string(), TrafficWeight::new(*weight));
            }
        }
        self
    }

    pub(crate) fn weight(&self, set_identifier: &str) -> Option<u32> {
        self.records
            .lock()
            .unwrap()
            .get(set_identifier)
            .map(|w| w.value())
    }

    pub(crate) fn writes(&self) -> u32 {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl RecordSetWriter for InMemoryRecords {
    async fn change_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<(), PublishError> {
        *self.writes.lock().unwrap() += 1;

        // Stage the whole batch, then commit it in one step
        let mut staged = self.records.lock().unwrap().clone();
        for (index, change) in batch.changes.iter().enumerate() {
            if self.fail_at_change == Some(index) {
                return Err(PublishError::Rejected {
                    zone_id: zone_id.to_string(),
                    domain: change.record_set.name.clone(),
                    reason: format!("change {index} rejected"),
                });
            }
            staged.insert(
                change.record_set.set_identifier.clone(),
                change.record_set.weight,
            );
        }
        *self.records.lock().unwrap() = staged;
        Ok(())
    }
}
