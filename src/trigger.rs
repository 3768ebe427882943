// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Invocation entry point.
//!
//! An external scheduler fires the trigger with an opaque event and an opaque
//! invocation context. Neither is interpreted; both are only logged. One
//! invocation runs exactly one evaluation cycle and maps its outcome to a
//! `{statusCode, body}` result.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::constants::{TRIGGER_BODY_HELD, TRIGGER_BODY_UPDATED};
use crate::controller::{Controller, CycleOutcome};

/// Status code returned for published and held cycles
pub const STATUS_OK: u16 = 200;

/// Status code returned when the weighted record write failed
pub const STATUS_BAD_GATEWAY: u16 = 502;

/// Structured result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub status_code: u16,
    pub body: String,
}

impl TriggerResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

/// Run one evaluation cycle for an invocation event.
///
/// Never fails: a publish error becomes a 502 response whose body names the
/// error.
pub async fn handle_invocation(
    controller: &Controller,
    event: &serde_json::Value,
    context: &serde_json::Value,
) -> TriggerResponse {
    debug!(event = %event, context = %context, "Received invocation");

    match controller.run_cycle().await {
        Ok(result) => {
            let body = if result.outcome == CycleOutcome::Held {
                TRIGGER_BODY_HELD
            } else {
                TRIGGER_BODY_UPDATED
            };
            TriggerResponse {
                status_code: STATUS_OK,
                body: body.to_string(),
            }
        }
        Err(e) => {
            error!(error = %e, "Invocation failed");
            TriggerResponse {
                status_code: STATUS_BAD_GATEWAY,
                body: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod trigger_tests;
