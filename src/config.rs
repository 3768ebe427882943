// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Startup configuration.
//!
//! Configuration is read once, before the first cycle, into an immutable
//! [`FailoverConfig`] that is passed by reference to the controller. Required
//! settings have no defaults: if any is missing, every missing name is
//! reported together and the process must not start. Optional tunables
//! (weights, timeouts, the unknown-status policy) fall back to the defaults in
//! [`crate::constants`].
//!
//! # Example
//!
//! ```rust
//! use skyshift::config::FailoverConfig;
//!
//! // Nothing set: every required variable is reported
//! let err = FailoverConfig::from_lookup(|_| None).unwrap_err();
//! assert!(err.to_string().contains("ROUTE53_ZONE_ID"));
//! ```

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BASE_AWS_WEIGHT, DEFAULT_BASE_GCP_WEIGHT, DEFAULT_FULL_WEIGHT,
    DEFAULT_GCP_RECORD_TTL_SECS, DEFAULT_HEALTH_CHECK_ATTEMPTS, DEFAULT_HEALTH_CHECK_TIMEOUT_MS,
    DEFAULT_OFF_WEIGHT, DEFAULT_PUBLISH_TIMEOUT_MS, ENV_AWS_API_RECORD_ID, ENV_BASE_AWS_WEIGHT,
    ENV_BASE_GCP_WEIGHT, ENV_CLOUDFRONT_DNS_NAME, ENV_CLOUDFRONT_HOSTED_ZONE_ID, ENV_FULL_WEIGHT,
    ENV_GCP_API_IP, ENV_GCP_API_RECORD_ID, ENV_GCP_RECORD_TTL, ENV_HEALTH_CHECK_ATTEMPTS,
    ENV_HEALTH_CHECK_TIMEOUT_MS, ENV_OFF_WEIGHT, ENV_PUBLISH_TIMEOUT_MS, ENV_ROUTE53_API_DOMAIN,
    ENV_ROUTE53_ZONE_ID, ENV_UNKNOWN_POLICY, MAX_ROUTE53_WEIGHT,
};
use crate::errors::ConfigError;
use crate::health::{HealthCheckId, HealthCheckTarget};
use crate::policy::{UnknownStatusPolicy, WeightTable};
use crate::records::TrafficWeight;

/// The AWS-side weighted record: an alias to the CDN distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsRecordConfig {
    pub set_identifier: String,
    pub alias_hosted_zone_id: String,
    pub alias_dns_name: String,
}

/// The GCP-side weighted record: a literal address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcpRecordConfig {
    pub set_identifier: String,
    pub ip: Ipv4Addr,
    pub ttl: i64,
}

/// Everything the publisher needs to address the weighted record pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsConfig {
    /// Hosted zone owning the records
    pub zone_id: String,
    /// Domain name shared by both records
    pub domain: String,
    pub aws: AwsRecordConfig,
    pub gcp: GcpRecordConfig,
}

/// Health check identifiers for all six targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckIds(BTreeMap<HealthCheckTarget, HealthCheckId>);

impl HealthCheckIds {
    /// Build from an id per target.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the environment variable of
    /// every target without an id.
    pub fn new(ids: BTreeMap<HealthCheckTarget, HealthCheckId>) -> Result<Self, ConfigError> {
        let missing: Vec<String> = HealthCheckTarget::ALL
            .into_iter()
            .filter(|target| !ids.contains_key(target))
            .map(|target| target.env_var().to_string())
            .collect();

        if missing.is_empty() {
            Ok(Self(ids))
        } else {
            Err(ConfigError::Missing { names: missing })
        }
    }

    /// The id of `target`. Every target is present by construction.
    #[must_use]
    pub fn id(&self, target: HealthCheckTarget) -> &HealthCheckId {
        &self.0[&target]
    }

    pub fn iter(&self) -> impl Iterator<Item = (HealthCheckTarget, &HealthCheckId)> {
        self.0.iter().map(|(target, id)| (*target, id))
    }
}

/// Immutable controller configuration, built once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailoverConfig {
    pub health_checks: HealthCheckIds,
    pub dns: DnsConfig,
    pub weights: WeightTable,
    pub unknown_policy: UnknownStatusPolicy,
    /// Timeout of each health check attempt
    pub health_check_timeout: Duration,
    /// Attempts per health check query (at least one)
    pub health_check_attempts: u32,
    /// Timeout of the record-set batch write
    pub publish_timeout: Duration,
}

impl FailoverConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required variable is missing or any
    /// variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty and whitespace-only values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] listing every required variable that
    /// is unset, or [`ConfigError::Invalid`] for the first unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut missing = Vec::new();
        let mut require = |name: &'static str| {
            let value = get(name);
            if value.is_none() {
                missing.push(name.to_string());
            }
            value.unwrap_or_default()
        };

        let mut ids = BTreeMap::new();
        for target in HealthCheckTarget::ALL {
            ids.insert(target, HealthCheckId::new(require(target.env_var())));
        }
        let zone_id = require(ENV_ROUTE53_ZONE_ID);
        let aws_set_identifier = require(ENV_AWS_API_RECORD_ID);
        let gcp_set_identifier = require(ENV_GCP_API_RECORD_ID);
        let domain = require(ENV_ROUTE53_API_DOMAIN);
        let gcp_ip = require(ENV_GCP_API_IP);
        let alias_hosted_zone_id = require(ENV_CLOUDFRONT_HOSTED_ZONE_ID);
        let alias_dns_name = require(ENV_CLOUDFRONT_DNS_NAME);

        if !missing.is_empty() {
            return Err(ConfigError::Missing { names: missing });
        }

        let ip = parse_value::<Ipv4Addr>(ENV_GCP_API_IP, &gcp_ip, "expected an IPv4 address")?;

        let weights = WeightTable {
            full: TrafficWeight::new(optional(&get, ENV_FULL_WEIGHT, DEFAULT_FULL_WEIGHT)?),
            base_aws: TrafficWeight::new(optional(
                &get,
                ENV_BASE_AWS_WEIGHT,
                DEFAULT_BASE_AWS_WEIGHT,
            )?),
            base_gcp: TrafficWeight::new(optional(
                &get,
                ENV_BASE_GCP_WEIGHT,
                DEFAULT_BASE_GCP_WEIGHT,
            )?),
            off: TrafficWeight::new(optional(&get, ENV_OFF_WEIGHT, DEFAULT_OFF_WEIGHT)?),
        };
        for (name, weight) in [
            (ENV_FULL_WEIGHT, weights.full),
            (ENV_BASE_AWS_WEIGHT, weights.base_aws),
            (ENV_BASE_GCP_WEIGHT, weights.base_gcp),
            (ENV_OFF_WEIGHT, weights.off),
        ] {
            if weight.value() > MAX_ROUTE53_WEIGHT {
                return Err(ConfigError::Invalid {
                    name: name.to_string(),
                    value: weight.to_string(),
                    reason: format!("weight must not exceed {MAX_ROUTE53_WEIGHT}"),
                });
            }
        }

        let unknown_policy = match get(ENV_UNKNOWN_POLICY) {
            Some(raw) => raw
                .parse::<UnknownStatusPolicy>()
                .map_err(|reason| ConfigError::Invalid {
                    name: ENV_UNKNOWN_POLICY.to_string(),
                    value: raw.clone(),
                    reason,
                })?,
            None => UnknownStatusPolicy::default(),
        };

        let ttl: i64 = optional(&get, ENV_GCP_RECORD_TTL, DEFAULT_GCP_RECORD_TTL_SECS)?;
        if ttl < 0 {
            return Err(ConfigError::Invalid {
                name: ENV_GCP_RECORD_TTL.to_string(),
                value: ttl.to_string(),
                reason: "TTL must not be negative".to_string(),
            });
        }

        let health_check_attempts: u32 =
            optional(&get, ENV_HEALTH_CHECK_ATTEMPTS, DEFAULT_HEALTH_CHECK_ATTEMPTS)?;
        if health_check_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: ENV_HEALTH_CHECK_ATTEMPTS.to_string(),
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }

        Ok(Self {
            health_checks: HealthCheckIds::new(ids)?,
            dns: DnsConfig {
                zone_id,
                domain,
                aws: AwsRecordConfig {
                    set_identifier: aws_set_identifier,
                    alias_hosted_zone_id,
                    alias_dns_name,
                },
                gcp: GcpRecordConfig {
                    set_identifier: gcp_set_identifier,
                    ip,
                    ttl,
                },
            },
            weights,
            unknown_policy,
            health_check_timeout: Duration::from_millis(optional(
                &get,
                ENV_HEALTH_CHECK_TIMEOUT_MS,
                DEFAULT_HEALTH_CHECK_TIMEOUT_MS,
            )?),
            health_check_attempts,
            publish_timeout: Duration::from_millis(optional(
                &get,
                ENV_PUBLISH_TIMEOUT_MS,
                DEFAULT_PUBLISH_TIMEOUT_MS,
            )?),
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn optional<T, G>(get: &G, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => parse_value(name, &raw, "expected a non-negative integer"),
        None => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str, reason: &str) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::Invalid {
        name: name.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
