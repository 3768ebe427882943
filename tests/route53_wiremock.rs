// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Route 53 adapter tests against a mock Route 53 endpoint.
//!
//! The SDK client is pointed at a local `wiremock` server, so these tests
//! cover the real request and response wire shapes without AWS credentials.

mod common;

use aws_sdk_route53::config::retry::RetryConfig;
use aws_sdk_route53::config::{BehaviorVersion, Credentials, Region};
use common::config_with;
use serde_json::json;
use skyshift::controller::Controller;
use skyshift::errors::{HealthCheckError, PublishError};
use skyshift::health::{HealthCheckClient, HealthCheckId, HealthStatus};
use skyshift::records::{RecordSetWriter, TrafficWeight, WeightPublisher};
use skyshift::route53::Route53ControlPlane;
use skyshift::trigger::handle_invocation;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";

fn control_plane(server: &MockServer) -> Route53ControlPlane {
    let config = aws_sdk_route53::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new(
            "AKIDEXAMPLE",
            "secret",
            None,
            None,
            "wiremock",
        ))
        .endpoint_url(server.uri())
        .retry_config(RetryConfig::disabled())
        .build();
    Route53ControlPlane::new(aws_sdk_route53::Client::from_conf(config))
}

fn observation(region: &str, status: &str, checked_at: &str) -> String {
    format!(
        "<HealthCheckObservation>\
           <Region>{region}</Region>\
           <IPAddress>15.177.2.1</IPAddress>\
           <StatusReport>\
             <Status>{status}</Status>\
             <CheckedTime>{checked_at}</CheckedTime>\
           </StatusReport>\
         </HealthCheckObservation>"
    )
}

fn status_response(observations: &[String]) -> ResponseTemplate {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <GetHealthCheckStatusResponse xmlns=\"{XMLNS}\">\
           <HealthCheckObservations>{}</HealthCheckObservations>\
         </GetHealthCheckStatusResponse>",
        observations.concat()
    );
    ResponseTemplate::new(200).set_body_raw(body, "text/xml")
}

fn change_response() -> ResponseTemplate {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <ChangeResourceRecordSetsResponse xmlns=\"{XMLNS}\">\
           <ChangeInfo>\
             <Id>/change/C2682N5HXP0BZ4</Id>\
             <Status>PENDING</Status>\
             <SubmittedAt>2026-10-14T12:00:00.000Z</SubmittedAt>\
           </ChangeInfo>\
         </ChangeResourceRecordSetsResponse>"
    );
    ResponseTemplate::new(200).set_body_raw(body, "text/xml")
}

fn error_response(status: u16, code: &str, message: &str) -> ResponseTemplate {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <ErrorResponse xmlns=\"{XMLNS}\">\
           <Error><Type>Sender</Type><Code>{code}</Code><Message>{message}</Message></Error>\
           <RequestId>f1e2d3c4-0000-4000-8000-000000000000</RequestId>\
         </ErrorResponse>"
    );
    ResponseTemplate::new(status).set_body_raw(body, "text/xml")
}

// =====================================================
// Health Check Status
// =====================================================

#[tokio::test]
async fn test_success_report_is_healthy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2013-04-01/healthcheck/hc-alb/status"))
        .respond_with(status_response(&[observation(
            "us-east-1",
            "Success: HTTP Status Code 200, OK",
            "2026-10-14T12:00:00.000Z",
        )]))
        .expect(1)
        .mount(&server)
        .await;

    let status = control_plane(&server)
        .get_status(&HealthCheckId::new("hc-alb"))
        .await
        .unwrap();

    assert_eq!(status, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_most_recent_observation_wins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2013-04-01/healthcheck/hc-gcp/status"))
        .respond_with(status_response(&[
            observation(
                "us-west-1",
                "Success: HTTP Status Code 200, OK",
                "2026-10-14T11:59:00.000Z",
            ),
            observation(
                "eu-west-1",
                "Failure: Connection timed out",
                "2026-10-14T12:00:30.000Z",
            ),
            observation(
                "ap-southeast-1",
                "Success: HTTP Status Code 200, OK",
                "2026-10-14T11:58:00.000Z",
            ),
        ]))
        .mount(&server)
        .await;

    let status = control_plane(&server)
        .get_status(&HealthCheckId::new("hc-gcp"))
        .await
        .unwrap();

    assert_eq!(status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_empty_observations_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2013-04-01/healthcheck/hc-eks-1/status"))
        .respond_with(status_response(&[]))
        .mount(&server)
        .await;

    let err = control_plane(&server)
        .get_status(&HealthCheckId::new("hc-eks-1"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        HealthCheckError::NoObservations {
            id: "hc-eks-1".to_string()
        }
    );
}

#[tokio::test]
async fn test_unknown_health_check_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2013-04-01/healthcheck/missing/status"))
        .respond_with(error_response(
            404,
            "NoSuchHealthCheck",
            "No health check exists with the specified ID",
        ))
        .mount(&server)
        .await;

    let err = control_plane(&server)
        .get_status(&HealthCheckId::new("missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, HealthCheckError::Unavailable { ref id, .. } if id == "missing"));
    assert!(err.is_retryable());
}

// =====================================================
// Change Resource Record Sets
// =====================================================

#[tokio::test]
async fn test_publish_sends_both_records_in_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/2013-04-01/hostedzone/Z1D633PJN98FT9/rrset/?$"))
        .and(body_string_contains("<Action>UPSERT</Action>"))
        .and(body_string_contains("<SetIdentifier>aws-primary</SetIdentifier>"))
        .and(body_string_contains("<SetIdentifier>gcp-secondary</SetIdentifier>"))
        .and(body_string_contains("<DNSName>d3example.cloudfront.net</DNSName>"))
        .and(body_string_contains("<Value>198.51.100.7</Value>"))
        .and(body_string_contains("<TTL>300</TTL>"))
        .respond_with(change_response())
        .expect(1)
        .mount(&server)
        .await;

    let config = config_with(&[]);
    let publisher = WeightPublisher::new(
        config.dns.clone(),
        Arc::new(control_plane(&server)),
        Duration::from_secs(5),
    );

    publisher
        .publish(TrafficWeight::new(50), TrafficWeight::new(0))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rejected_batch_surfaces_as_publish_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/2013-04-01/hostedzone/Z1D633PJN98FT9/rrset/?$"))
        .respond_with(error_response(
            400,
            "InvalidChangeBatch",
            "Tried to create resource record set but it already exists",
        ))
        .mount(&server)
        .await;

    let config = config_with(&[]);
    let batch = WeightPublisher::new(
        config.dns.clone(),
        Arc::new(control_plane(&server)),
        Duration::from_secs(5),
    )
    .build_change_batch(TrafficWeight::new(50), TrafficWeight::new(50));

    let err = control_plane(&server)
        .change_record_sets("Z1D633PJN98FT9", &batch)
        .await
        .unwrap_err();

    match err {
        PublishError::Rejected {
            zone_id, domain, ..
        } => {
            assert_eq!(zone_id, "Z1D633PJN98FT9");
            assert_eq!(domain, "api.skyshift.test");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// =====================================================
// Full Cycle
// =====================================================

#[tokio::test]
async fn test_full_cycle_over_route53() {
    let server = MockServer::start().await;

    for id in ["hc-alb", "hc-eks-1", "hc-eks-2", "hc-gcp", "hc-gke-1"] {
        Mock::given(method("GET"))
            .and(path(format!("/2013-04-01/healthcheck/{id}/status")))
            .respond_with(status_response(&[observation(
                "us-east-1",
                "Success: HTTP Status Code 200, OK",
                "2026-10-14T12:00:00.000Z",
            )]))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/2013-04-01/healthcheck/hc-gke-2/status"))
        .respond_with(status_response(&[observation(
            "us-east-1",
            "Failure: HTTP Status Code 503, Service Unavailable",
            "2026-10-14T12:00:00.000Z",
        )]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/2013-04-01/hostedzone/Z1D633PJN98FT9/rrset/?$"))
        .and(body_string_contains("<Weight>50</Weight>"))
        .and(body_string_contains("<Weight>0</Weight>"))
        .respond_with(change_response())
        .expect(1)
        .mount(&server)
        .await;

    let plane = Arc::new(control_plane(&server));
    let controller = Controller::new(&config_with(&[]), plane.clone(), plane);

    let response =
        handle_invocation(&controller, &json!({"source": "scheduler"}), &json!({})).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "Route 53 weights updated successfully");
}
