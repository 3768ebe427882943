// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the skyshift failover controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Environment Variable Names (required)
// ============================================================================

/// Health check ID of the AWS application load balancer
pub const ENV_ALB_HEALTH_CHECK_ID: &str = "ALB_HEALTH_CHECK_ID";

/// Health check ID of the first AWS (EKS) cluster ingress
pub const ENV_EKS_HEALTH_CHECK1_ID: &str = "EKS_HEALTH_CHECK1_ID";

/// Health check ID of the second AWS (EKS) cluster ingress
pub const ENV_EKS_HEALTH_CHECK2_ID: &str = "EKS_HEALTH_CHECK2_ID";

/// Health check ID of the GCP load balancer
pub const ENV_GCP_HEALTH_CHECK_ID: &str = "GCP_HEALTH_CHECK_ID";

/// Health check ID of the first GCP (GKE) cluster ingress
pub const ENV_GKE_HEALTH_CHECK1_ID: &str = "GKE_HEALTH_CHECK1_ID";

/// Health check ID of the second GCP (GKE) cluster ingress
pub const ENV_GKE_HEALTH_CHECK2_ID: &str = "GKE_HEALTH_CHECK2_ID";

/// Hosted zone that owns the weighted records
pub const ENV_ROUTE53_ZONE_ID: &str = "ROUTE53_ZONE_ID";

/// Set-identifier of the AWS weighted record
pub const ENV_AWS_API_RECORD_ID: &str = "AWS_API_RECORD_ID";

/// Set-identifier of the GCP weighted record
pub const ENV_GCP_API_RECORD_ID: &str = "GCP_API_RECORD_ID";

/// Domain name shared by both weighted records
pub const ENV_ROUTE53_API_DOMAIN: &str = "ROUTE53_API_DOMAIN";

/// Literal address the GCP record resolves to
pub const ENV_GCP_API_IP: &str = "GCP_API_IP";

/// Hosted zone of the CDN distribution the AWS alias points at
pub const ENV_CLOUDFRONT_HOSTED_ZONE_ID: &str = "CLOUDFRONT_HOSTED_ZONE_ID";

/// DNS name of the CDN distribution the AWS alias points at
pub const ENV_CLOUDFRONT_DNS_NAME: &str = "CLOUDFRONT_DNS_NAME";

// ============================================================================
// Environment Variable Names (optional tunables)
// ============================================================================

/// Weight given to the surviving provider during failover
pub const ENV_FULL_WEIGHT: &str = "FAILOVER_FULL_WEIGHT";

/// Nominal AWS weight when both providers are healthy
pub const ENV_BASE_AWS_WEIGHT: &str = "FAILOVER_BASE_AWS_WEIGHT";

/// Nominal GCP weight when both providers are healthy
pub const ENV_BASE_GCP_WEIGHT: &str = "FAILOVER_BASE_GCP_WEIGHT";

/// Weight given to the degraded provider during failover
pub const ENV_OFF_WEIGHT: &str = "FAILOVER_OFF_WEIGHT";

/// How the policy treats `Unknown` health statuses
pub const ENV_UNKNOWN_POLICY: &str = "FAILOVER_UNKNOWN_POLICY";

/// TTL of the GCP literal-address record
pub const ENV_GCP_RECORD_TTL: &str = "GCP_RECORD_TTL";

/// Per-attempt timeout of a health check query, in milliseconds
pub const ENV_HEALTH_CHECK_TIMEOUT_MS: &str = "HEALTH_CHECK_TIMEOUT_MS";

/// Number of attempts per health check query
pub const ENV_HEALTH_CHECK_ATTEMPTS: &str = "HEALTH_CHECK_ATTEMPTS";

/// Timeout of the record-set batch write, in milliseconds
pub const ENV_PUBLISH_TIMEOUT_MS: &str = "PUBLISH_TIMEOUT_MS";

/// Listen address of the HTTP trigger server
pub const ENV_BIND_ADDR: &str = "SKYSHIFT_BIND_ADDR";

// ============================================================================
// Weight Defaults
// ============================================================================

/// Default weight of the surviving provider during failover
pub const DEFAULT_FULL_WEIGHT: u32 = 50;

/// Default nominal AWS weight
pub const DEFAULT_BASE_AWS_WEIGHT: u32 = 50;

/// Default nominal GCP weight
pub const DEFAULT_BASE_GCP_WEIGHT: u32 = 50;

/// Default weight of the degraded provider during failover
pub const DEFAULT_OFF_WEIGHT: u32 = 0;

// ============================================================================
// DNS Constants
// ============================================================================

/// Default TTL for the GCP literal-address record (5 minutes)
pub const DEFAULT_GCP_RECORD_TTL_SECS: i64 = 300;

/// Largest weight Route 53 accepts on a weighted record
pub const MAX_ROUTE53_WEIGHT: u32 = 255;

/// Record type of both weighted records
pub const WEIGHTED_RECORD_TYPE: &str = "A";

/// Comment attached to every change batch
pub const CHANGE_BATCH_COMMENT: &str = "skyshift weighted failover update";

// ============================================================================
// Timeout and Retry Constants
// ============================================================================

/// Default per-attempt health check timeout (5 seconds)
pub const DEFAULT_HEALTH_CHECK_TIMEOUT_MS: u64 = 5_000;

/// Default number of attempts per health check query
pub const DEFAULT_HEALTH_CHECK_ATTEMPTS: u32 = 2;

/// Default publish timeout (10 seconds)
pub const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// Trigger Constants
// ============================================================================

/// Body returned when a cycle published new weights
pub const TRIGGER_BODY_UPDATED: &str = "Route 53 weights updated successfully";

/// Body returned when a cycle held the prior weights
pub const TRIGGER_BODY_HELD: &str = "Route 53 weights held: health signal incomplete";

/// Default listen address of the HTTP trigger server
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
