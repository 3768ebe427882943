// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for skyshift.
//!
//! This module provides specialized error types for:
//! - Health check status queries against the DNS control plane
//! - Weighted record-set batch writes
//! - Startup configuration loading
//!
//! Health check errors are absorbed by the controller (the status degrades to
//! `Unknown`), publish errors fail the cycle, and configuration errors are fatal
//! before the first cycle runs.

use thiserror::Error;

/// Errors that can occur while querying a health check's status.
///
/// None of these ever surface to the trigger. The controller logs them and
/// treats the affected health check as `Unknown`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HealthCheckError {
    /// The control plane could not be reached or rejected the query
    #[error("Health check '{id}' unavailable: {reason}")]
    Unavailable {
        /// The health check identifier that was queried
        id: String,
        /// Reason reported by the client or control plane
        reason: String,
    },

    /// The control plane answered but reported no observations
    #[error("Health check '{id}' returned no observations")]
    NoObservations {
        /// The health check identifier that was queried
        id: String,
    },

    /// The query did not complete within the configured timeout
    #[error("Health check '{id}' query timed out after {timeout_ms}ms")]
    Timeout {
        /// The health check identifier that was queried
        id: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },
}

impl HealthCheckError {
    /// Whether another attempt could return a different answer.
    ///
    /// An empty observation list is a valid answer from the control plane, so
    /// only transport failures and timeouts are retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }

    /// Short label used for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "unavailable",
            Self::NoObservations { .. } => "no_observations",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Errors that can occur while publishing the weighted record pair.
///
/// The record-set batch write is all-or-nothing, so any of these leaves the
/// previously published weights in effect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The control plane rejected the batch or could not be reached
    #[error("Change batch for '{domain}' in zone {zone_id} rejected: {reason}")]
    Rejected {
        /// Hosted zone the batch was submitted to
        zone_id: String,
        /// Domain name of the weighted records
        domain: String,
        /// Reason reported by the client or control plane
        reason: String,
    },

    /// The write did not complete within the configured timeout
    #[error("Change batch for '{domain}' in zone {zone_id} timed out after {timeout_ms}ms")]
    Timeout {
        /// Hosted zone the batch was submitted to
        zone_id: String,
        /// Domain name of the weighted records
        domain: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// A record in the batch cannot be expressed to the control plane
    #[error("Invalid weighted record '{set_identifier}': {reason}")]
    InvalidRecord {
        /// Set-identifier of the offending record
        set_identifier: String,
        /// Explanation of what is invalid
        reason: String,
    },
}

impl PublishError {
    /// Short label used for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Timeout { .. } => "timeout",
            Self::InvalidRecord { .. } => "invalid_record",
        }
    }
}

/// Errors raised while loading configuration at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required environment variables are unset or empty
    #[error("Missing required environment variable(s): {}", .names.join(", "))]
    Missing {
        /// Names of every missing variable, in lookup order
        names: Vec<String>,
    },

    /// An environment variable is set but cannot be parsed
    #[error("Environment variable {name} has invalid value '{value}': {reason}")]
    Invalid {
        /// Name of the variable
        name: String,
        /// The raw value that failed to parse
        value: String,
        /// Explanation of what is invalid
        reason: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
