use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::CustomerLookup;
use crate::domain::customer::UpdateCommand;
use crate::models::UpdateRequestStatus;

use super::{FlowError, FlowKind, FlowOrchestrator};

// ============================================================================
// Update-and-Verify Workflow
// ============================================================================
//
// The caller already holds an updateRequestID. Poll get-update-request until
// `active` or `error`; on `active` re-fetch the customer. Running out of
// polling budget is an error here, unlike the create flow.
//
// ============================================================================

#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    Active {
        update_request_id: String,
        attempts: u32,
        updated: Box<CustomerLookup>,
    },
    /// Terminal but not `active`; `error` is the backend's reason
    Failed {
        update_request_id: String,
        attempts: u32,
        status: Option<String>,
        error: Option<String>,
    },
}

impl UpdateOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            UpdateOutcome::Active { .. } => "active",
            UpdateOutcome::Failed { .. } => "error",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, UpdateOutcome::Active { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UpdateOutcome::Failed { error, .. } => error.as_deref(),
            UpdateOutcome::Active { .. } => None,
        }
    }
}

/// Submission plus polling, for callers that start from a command
#[derive(Debug, Clone)]
pub enum UpdateSubmissionOutcome {
    /// Synchronous rejection, e.g. `Missing fields for license: number`
    Rejected {
        status: u16,
        api_error: Option<String>,
        body: Value,
    },
    Completed(UpdateOutcome),
}

impl UpdateSubmissionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            UpdateSubmissionOutcome::Rejected { .. } => "rejected",
            UpdateSubmissionOutcome::Completed(outcome) => outcome.label(),
        }
    }
}

impl FlowOrchestrator {
    /// Wait for an accepted update to settle and fetch the result
    pub async fn update_and_verify(
        &self,
        update_request_id: &str,
        global_id: &str,
    ) -> Result<UpdateOutcome, FlowError> {
        let span = tracing::info_span!(
            "update_flow",
            flow_id = %Uuid::new_v4(),
            global_id = %global_id
        );

        async {
            let result = self.run_update(update_request_id, global_id).await;
            match &result {
                Ok(outcome) => self.record_outcome(FlowKind::Update, outcome.label()),
                Err(FlowError::PollExhausted { .. }) => {
                    self.record_outcome(FlowKind::Update, "exhausted")
                }
                Err(_) => self.record_outcome(FlowKind::Update, "flow_error"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_update(&self, update_request_id: &str, global_id: &str) -> Result<UpdateOutcome, FlowError> {
        let client = self.client();
        let polled = self
            .poll_status(FlowKind::Update, update_request_id, |_attempt| {
                client.get_update_request(update_request_id, global_id)
            })
            .await?;

        let attempts = polled.attempts();
        let last = polled.into_last();

        tracing::info!(
            update_request_id = %update_request_id,
            attempts = attempts,
            status = last.status.as_deref().unwrap_or("N/A"),
            "Final update request status"
        );

        if last.update_status() != Some(UpdateRequestStatus::Active) {
            tracing::warn!(
                update_request_id = %update_request_id,
                error = last.error.as_deref().unwrap_or("N/A"),
                "Update did not become active"
            );
            return Ok(UpdateOutcome::Failed {
                update_request_id: update_request_id.to_string(),
                attempts,
                status: last.status,
                error: last.error,
            });
        }

        let updated = client.get_customer_by_global_id(global_id).await?;
        Ok(UpdateOutcome::Active {
            update_request_id: update_request_id.to_string(),
            attempts,
            updated: Box::new(updated),
        })
    }

    /// PATCH the command, then run the update flow if the backend accepted it
    pub async fn submit_update_and_verify(
        &self,
        global_id: &str,
        command: &UpdateCommand,
    ) -> Result<UpdateSubmissionOutcome, FlowError> {
        let submission = self.client().update_customer(global_id, command).await?;

        if !submission.is_success() {
            tracing::warn!(
                global_id = %global_id,
                action = command.action_name(),
                status = submission.status,
                api_error = submission.api_error.as_deref().unwrap_or("Unknown"),
                "Update rejected"
            );
            self.record_outcome(FlowKind::Update, "rejected");
            return Ok(UpdateSubmissionOutcome::Rejected {
                status: submission.status,
                api_error: submission.api_error,
                body: submission.body,
            });
        }

        let update_request_id = submission
            .correlation_id
            .ok_or(FlowError::MissingUpdateRequestId {
                status: submission.status,
            })?;

        let outcome = self.update_and_verify(&update_request_id, global_id).await?;
        Ok(UpdateSubmissionOutcome::Completed(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{LicenseUpdate, PaymentDetails};
    use crate::test_support::*;
    use crate::utils::PollConfig;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn orchestrator(server: &MockServer) -> FlowOrchestrator {
        FlowOrchestrator::new(client_for(server))
            .with_poll_config(FlowKind::Update, PollConfig::new(10, Duration::from_millis(1)))
    }

    async fn mount_update_status(server: &MockServer, body: serde_json::Value, times: u64) {
        Mock::given(method("GET"))
            .and(path("/get-update-request"))
            .and(body_json(json!({"updateRequestID": "UPD-1", "globalID": "GID-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_active_update_refetches_customer() {
        let server = MockServer::start().await;
        mount_update_status(&server, json!({"data": {"status": "active"}}), 1).await;
        mount_customer_by_global_id(&server, "GID-1", customer_body("GID-1", "SMITH & JONES")).await;

        let outcome = orchestrator(&server)
            .update_and_verify("UPD-1", "GID-1")
            .await
            .unwrap();

        match outcome {
            UpdateOutcome::Active { updated, attempts, .. } => {
                assert_eq!(attempts, 1);
                assert_eq!(updated.customer.account_name.as_deref(), Some("SMITH & JONES"));
            }
            other => panic!("expected active, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_carries_backend_reason() {
        let server = MockServer::start().await;
        mount_update_status(
            &server,
            json!({"data": {"status": "error", "error": "License type not allowed"}}),
            1,
        )
        .await;

        let outcome = orchestrator(&server)
            .update_and_verify("UPD-1", "GID-1")
            .await
            .unwrap();

        assert!(!outcome.is_active());
        assert_eq!(outcome.error(), Some("License type not allowed"));
    }

    #[tokio::test]
    async fn test_exhaustion_is_a_hard_error() {
        let server = MockServer::start().await;
        mount_update_status(&server, json!({"data": {"status": "pending"}}), 10).await;

        let err = orchestrator(&server)
            .update_and_verify("UPD-1", "GID-1")
            .await
            .unwrap_err();

        match err {
            FlowError::PollExhausted {
                workflow,
                attempts,
                last_status,
                ..
            } => {
                assert_eq!(workflow, FlowKind::Update);
                assert_eq!(attempts, 10);
                assert_eq!(last_status.as_deref(), Some("pending"));
            }
            other => panic!("expected exhaustion, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_non_200_lookup_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get-update-request"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = orchestrator(&server)
            .update_and_verify("UPD-1", "GID-1")
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::Api(_)));
    }

    #[tokio::test]
    async fn test_missing_license_number_is_rejected_synchronously() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/customer/GID-1"))
            .and(query_param("action", "license"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "Error",
                "error": "Missing fields for license: number"
            })))
            .mount(&server)
            .await;

        let command = UpdateCommand::License(LicenseUpdate::missing_number());
        let outcome = orchestrator(&server)
            .submit_update_and_verify("GID-1", &command)
            .await
            .unwrap();

        match outcome {
            UpdateSubmissionOutcome::Rejected { status, api_error, .. } => {
                assert_eq!(status, 500);
                assert_eq!(api_error.as_deref(), Some("Missing fields for license: number"));
            }
            other => panic!("expected rejection, got {}", other.label()),
        }
    }

    #[tokio::test]
    async fn test_accepted_update_without_request_id_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/customer/GID-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Success"})))
            .mount(&server)
            .await;

        let command = UpdateCommand::PaymentDetails(PaymentDetails::valid());
        let err = orchestrator(&server)
            .submit_update_and_verify("GID-1", &command)
            .await
            .unwrap_err();

        assert!(matches!(err, FlowError::MissingUpdateRequestId { status: 200 }));
    }

    #[tokio::test]
    async fn test_submit_then_poll_to_active() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/customer/GID-1"))
            .and(query_param("action", "paymentDetails"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updateRequestID": "UPD-1"})))
            .mount(&server)
            .await;
        mount_update_status(&server, json!({"data": {"status": "active"}}), 1).await;
        mount_customer_by_global_id(&server, "GID-1", customer_body("GID-1", "ACME")).await;

        let command = UpdateCommand::PaymentDetails(PaymentDetails::valid());
        let outcome = orchestrator(&server)
            .submit_update_and_verify("GID-1", &command)
            .await
            .unwrap();

        assert_eq!(outcome.label(), "active");
    }
}
