// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use skyshift::config::FailoverConfig;
use skyshift::errors::{HealthCheckError, PublishError};
use skyshift::health::{HealthCheckClient, HealthCheckId, HealthStatus};
use skyshift::records::{ChangeBatch, RecordSetWriter, RecordTarget, WeightedRecordSet};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Environment shared by every integration test
pub fn base_env() -> HashMap<String, String> {
    [
        ("ALB_HEALTH_CHECK_ID", "hc-alb"),
        ("EKS_HEALTH_CHECK1_ID", "hc-eks-1"),
        ("EKS_HEALTH_CHECK2_ID", "hc-eks-2"),
        ("GCP_HEALTH_CHECK_ID", "hc-gcp"),
        ("GKE_HEALTH_CHECK1_ID", "hc-gke-1"),
        ("GKE_HEALTH_CHECK2_ID", "hc-gke-2"),
        ("ROUTE53_ZONE_ID", "Z1D633PJN98FT9"),
        ("AWS_API_RECORD_ID", "aws-primary"),
        ("GCP_API_RECORD_ID", "gcp-secondary"),
        ("ROUTE53_API_DOMAIN", "api.skyshift.test"),
        ("GCP_API_IP", "198.51.100.7"),
        ("CLOUDFRONT_HOSTED_ZONE_ID", "Z2FDTNDATAQYW2"),
        ("CLOUDFRONT_DNS_NAME", "d3example.cloudfront.net"),
        ("HEALTH_CHECK_TIMEOUT_MS", "200"),
        ("PUBLISH_TIMEOUT_MS", "2000"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Load a config from `base_env` with `overrides` applied
pub fn config_with(overrides: &[(&str, &str)]) -> FailoverConfig {
    let mut env = base_env();
    for (name, value) in overrides {
        env.insert((*name).to_string(), (*value).to_string());
    }
    FailoverConfig::from_lookup(|name| env.get(name).cloned()).expect("valid test config")
}

/// Health checks answered from a mutable table. Unlisted ids are healthy.
#[derive(Default)]
pub struct FakeHealthChecks {
    statuses: Mutex<HashMap<String, Result<HealthStatus, HealthCheckError>>>,
    queries: Mutex<Vec<String>>,
}

impl FakeHealthChecks {
    pub fn set(&self, id: &str, status: HealthStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(id.to_string(), Ok(status));
    }

    pub fn fail(&self, id: &str) {
        self.statuses.lock().unwrap().insert(
            id.to_string(),
            Err(HealthCheckError::Unavailable {
                id: id.to_string(),
                reason: "connection reset".to_string(),
            }),
        );
    }

    pub fn reset(&self) {
        self.statuses.lock().unwrap().clear();
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl HealthCheckClient for FakeHealthChecks {
    async fn get_status(&self, id: &HealthCheckId) -> Result<HealthStatus, HealthCheckError> {
        self.queries.lock().unwrap().push(id.to_string());
        self.statuses
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .unwrap_or(Ok(HealthStatus::Healthy))
    }
}

/// A hosted zone holding weighted record sets keyed by set-identifier.
#[derive(Default)]
pub struct FakeHostedZone {
    records: Mutex<BTreeMap<String, WeightedRecordSet>>,
    batches: Mutex<Vec<(String, ChangeBatch)>>,
    reject: Mutex<bool>,
}

impl FakeHostedZone {
    pub fn reject_writes(&self, reject: bool) {
        *self.reject.lock().unwrap() = reject;
    }

    pub fn weights(&self) -> (u32, u32) {
        let records = self.records.lock().unwrap();
        let weight = |set_identifier: &str| {
            records
                .get(set_identifier)
                .map_or(u32::MAX, |record| record.weight.value())
        };
        (weight("aws-primary"), weight("gcp-secondary"))
    }

    pub fn record(&self, set_identifier: &str) -> Option<WeightedRecordSet> {
        self.records.lock().unwrap().get(set_identifier).cloned()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    pub fn last_zone(&self) -> Option<String> {
        self.batches
            .lock()
            .unwrap()
            .last()
            .map(|(zone, _)| zone.clone())
    }
}

#[async_trait]
impl RecordSetWriter for FakeHostedZone {
    async fn change_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<(), PublishError> {
        self.batches
            .lock()
            .unwrap()
            .push((zone_id.to_string(), batch.clone()));

        if *self.reject.lock().unwrap() {
            return Err(PublishError::Rejected {
                zone_id: zone_id.to_string(),
                domain: batch
                    .changes
                    .first()
                    .map(|change| change.record_set.name.clone())
                    .unwrap_or_default(),
                reason: "PriorRequestNotComplete".to_string(),
            });
        }

        let mut records = self.records.lock().unwrap();
        for change in &batch.changes {
            records.insert(
                change.record_set.set_identifier.clone(),
                change.record_set.clone(),
            );
        }
        Ok(())
    }
}

/// True if the record is an alias with target health evaluation disabled
pub fn is_plain_alias(record: &WeightedRecordSet) -> bool {
    matches!(
        record.target,
        RecordTarget::Alias {
            evaluate_target_health: false,
            ..
        }
    )
}
