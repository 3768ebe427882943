// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Skyshift - Multi-Cloud DNS Failover Controller
//!
//! Skyshift keeps one public domain name pointed at whichever of two cloud
//! providers is currently healthy. It reads six DNS control-plane health checks
//! (a load balancer and two cluster ingresses per provider), reduces them to a
//! weight pair, and rewrites two sibling weighted DNS records in one atomic
//! batch.
//!
//! ## Overview
//!
//! Every invocation runs exactly one stateless evaluation cycle:
//!
//! 1. Query all six health checks concurrently
//! 2. Apply the failover policy to the two provider groups
//! 3. Publish both weighted records, or hold if the policy says so
//!
//! Scheduling is external. The binary exposes a one-shot mode and an HTTP
//! trigger server; neither runs cycles on its own.
//!
//! ## Modules
//!
//! - [`health`] - Health status model and the client seam
//! - [`policy`] - Pure failover decision table
//! - [`records`] - Weighted record sets and the publisher
//! - [`controller`] - One evaluation cycle
//! - [`trigger`] - Invocation entry point with `{statusCode, body}` results
//! - [`route53`] - Route 53 implementation of the control plane
//! - [`server`] - HTTP trigger server
//! - [`config`] - Environment configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use skyshift::policy::{FailoverPolicy, PolicyOutcome, UnknownStatusPolicy, WeightTable};
//! use skyshift::health::{HealthStatus, ProviderGroup};
//!
//! let policy = FailoverPolicy::new(WeightTable::default(), UnknownStatusPolicy::TreatAsHealthy);
//! let healthy = ProviderGroup {
//!     load_balancer: HealthStatus::Healthy,
//!     cluster1: HealthStatus::Healthy,
//!     cluster2: HealthStatus::Healthy,
//! };
//! let gcp_down = ProviderGroup {
//!     load_balancer: HealthStatus::Unhealthy,
//!     ..healthy
//! };
//!
//! match policy.decide(&gcp_down, &healthy) {
//!     PolicyOutcome::Publish(decision) => {
//!         assert_eq!(decision.weight_aws.value(), 50);
//!         assert_eq!(decision.weight_gcp.value(), 0);
//!     }
//!     PolicyOutcome::Hold => unreachable!(),
//! }
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod policy;
pub mod records;
pub mod retry;
pub mod route53;
pub mod server;
pub mod trigger;

#[cfg(test)]
mod test_helpers;
