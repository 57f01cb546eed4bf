use std::fmt;
use std::path::Path;

use serde_json::{json, Value};

use crate::domain::customer::{generate_payload, CustomerPayload};
use crate::models::{Customer, CustomerAddress};
use crate::utils::{retry_on_transient, IsTransient, RetryConfig, RetryResult};

use super::create::CreateOptions;
use super::{FlowError, FlowOrchestrator};

// ============================================================================
// Baseline Builder
// ============================================================================
//
// Seeds one known-good customer for update suites. A single payload is
// generated and run through create-and-verify until an attempt yields a
// globalID; that customer is fetched again and written to a side file.
//
// Exhaustion is an error. Rejected credentials and permanent API failures
// stop at the first attempt.
//
// ============================================================================

pub const DEFAULT_BASELINE_RETRIES: u32 = 6;

#[derive(Debug, Clone)]
pub struct Baseline {
    pub global_id: String,
    pub licence_number: Option<String>,
    /// First stored address, including its addressID
    pub address: Option<CustomerAddress>,
    pub customer: Customer,
}

#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("Baseline creation failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("Baseline creation rejected the API key: {0}")]
    Unauthorized(String),

    #[error("Baseline creation hit a permanent failure: {0}")]
    Permanent(String),
}

/// Why a single baseline attempt did not produce a customer
#[derive(Debug)]
enum AttemptError {
    Unauthorized(String),
    NoGlobalId(&'static str),
    Mismatched(usize),
    Flow(FlowError),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptError::Unauthorized(detail) => write!(f, "unauthorized: {}", detail),
            AttemptError::NoGlobalId(outcome) => {
                write!(f, "GlobalID not returned from create flow ({})", outcome)
            }
            AttemptError::Mismatched(count) => write!(f, "{} field mismatches", count),
            AttemptError::Flow(e) => write!(f, "{}", e),
        }
    }
}

impl IsTransient for AttemptError {
    fn is_transient(&self) -> bool {
        match self {
            AttemptError::Unauthorized(_) => false,
            AttemptError::Flow(FlowError::Api(e)) => e.is_transient(),
            AttemptError::NoGlobalId(_) | AttemptError::Mismatched(_) | AttemptError::Flow(_) => true,
        }
    }
}

impl From<FlowError> for AttemptError {
    fn from(error: FlowError) -> Self {
        if error.is_unauthorized() {
            AttemptError::Unauthorized(error.to_string())
        } else {
            AttemptError::Flow(error)
        }
    }
}

impl FlowOrchestrator {
    /// Create a baseline customer, retrying up to `max_retries` times
    pub async fn build_baseline(&self, path: &Path, max_retries: u32) -> Result<Baseline, BaselineError> {
        let payload = generate_payload();
        self.build_baseline_from(&payload, path, max_retries).await
    }

    pub async fn build_baseline_from(
        &self,
        payload: &CustomerPayload,
        path: &Path,
        max_retries: u32,
    ) -> Result<Baseline, BaselineError> {
        let config = RetryConfig::baseline(max_retries);
        let attempts = config.max_attempts;

        tracing::info!(
            max_attempts = attempts,
            path = %path.display(),
            "Creating baseline customer"
        );

        let result = retry_on_transient(config, |attempt| async move {
            let outcome = self.baseline_attempt(payload, path).await;
            if let Some(metrics) = &self.metrics {
                metrics.record_baseline_attempt(match &outcome {
                    Ok(_) => "success",
                    Err(AttemptError::Unauthorized(_)) => "unauthorized",
                    Err(e) if !e.is_transient() => "permanent",
                    Err(_) => "failed",
                });
            }
            if let Err(e) = &outcome {
                tracing::warn!(attempt = attempt, error = %e, "Baseline creation attempt failed");
            }
            outcome
        })
        .await;

        match result {
            RetryResult::Success(baseline) => {
                tracing::info!(global_id = %baseline.global_id, "Baseline customer ready");
                Ok(baseline)
            }
            RetryResult::PermanentFailure(AttemptError::Unauthorized(detail)) => {
                Err(BaselineError::Unauthorized(detail))
            }
            RetryResult::PermanentFailure(e) => Err(BaselineError::Permanent(e.to_string())),
            RetryResult::Failed(e) => Err(BaselineError::Exhausted {
                attempts,
                last_error: e.to_string(),
            }),
        }
    }

    async fn baseline_attempt(&self, payload: &CustomerPayload, path: &Path) -> Result<Baseline, AttemptError> {
        let outcome = self.create_and_verify(payload, &CreateOptions::default()).await?;

        if outcome.is_unauthorized() {
            return Err(AttemptError::Unauthorized(outcome.label().to_string()));
        }

        let Some(active) = outcome.active() else {
            return Err(AttemptError::NoGlobalId(outcome.label()));
        };
        if !active.mismatches.is_empty() {
            return Err(AttemptError::Mismatched(active.mismatches.len()));
        }

        let global_id = active.global_id.clone();
        let licence_number = active.alcohol_license_number.clone();
        tracing::debug!(global_id = %global_id, "Re-fetching baseline customer");

        let lookup = self
            .client()
            .get_customer_by_global_id(&global_id)
            .await
            .map_err(FlowError::from)?;

        write_baseline_file(path, &global_id, &lookup.body).await;

        Ok(Baseline {
            address: lookup.customer.first_address().cloned(),
            global_id,
            licence_number,
            customer: lookup.customer,
        })
    }
}

/// Best effort: a failed write is logged and the baseline is still returned
async fn write_baseline_file(path: &Path, global_id: &str, customer_body: &Value) {
    let document = json!({
        "globalID": global_id,
        "baselineCustomer": customer_body,
    });

    let contents = match serde_json::to_string_pretty(&document) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize baseline file");
            return;
        }
    };

    if let Err(e) = tokio::fs::write(path, contents).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to write baseline file");
    }
}

// ============================================================================
// Identity handed to update suites
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineIdentity {
    pub global_id: String,
    pub licence_number: Option<String>,
    pub address_id: Option<String>,
}

impl BaselineIdentity {
    pub fn new(global_id: impl Into<String>) -> Self {
        Self {
            global_id: global_id.into(),
            licence_number: None,
            address_id: None,
        }
    }

    /// The freshly built baseline, or `fallback` when building failed
    pub fn resolve(result: Result<Baseline, BaselineError>, fallback: BaselineIdentity) -> Self {
        match result {
            Ok(baseline) => BaselineIdentity::from(&baseline),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback_global_id = %fallback.global_id,
                    "Baseline unavailable, using static identity"
                );
                fallback
            }
        }
    }
}

impl From<&Baseline> for BaselineIdentity {
    fn from(baseline: &Baseline) -> Self {
        Self {
            global_id: baseline.global_id.clone(),
            licence_number: baseline.licence_number.clone(),
            address_id: baseline.address.as_ref().and_then(|a| a.address_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowKind;
    use crate::metrics::Metrics;
    use crate::test_support::*;
    use crate::utils::PollConfig;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn orchestrator(server: &MockServer) -> FlowOrchestrator {
        FlowOrchestrator::new(client_for(server))
            .with_poll_config(FlowKind::Create, PollConfig::new(3, Duration::from_millis(1)))
    }

    async fn mount_happy_path(server: &MockServer, payload: &CustomerPayload) {
        let license = payload.alcohol_license_number.clone().unwrap();
        mount_create(server, 200, json!({"requestID": "REQ-1"})).await;
        mount_get_request(
            server,
            "REQ-1",
            json!({"data": {"status": "Active", "globalID": "GID-1", "alcoholLicenseNumber": license}}),
        )
        .await;
        mount_customer_by_global_id(server, "GID-1", stored_customer_body("GID-1", payload)).await;
        mount_customer_by_license(server, &license, 200, stored_customer_body("GID-1", payload)).await;
    }

    #[tokio::test]
    async fn test_baseline_writes_identity_file() {
        let server = MockServer::start().await;
        let payload = generate_payload();
        mount_happy_path(&server, &payload).await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("baseline.json");

        let baseline = orchestrator(&server)
            .build_baseline_from(&payload, &file, DEFAULT_BASELINE_RETRIES)
            .await
            .unwrap();

        assert_eq!(baseline.global_id, "GID-1");
        assert_eq!(baseline.licence_number, payload.alcohol_license_number);
        assert_eq!(
            baseline.address.as_ref().and_then(|a| a.address_id.as_deref()),
            Some("ADDR-1")
        );

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
        assert_eq!(written["globalID"], "GID-1");
        assert_eq!(written["baselineCustomer"]["data"]["customer"]["globalID"], "GID-1");
    }

    #[tokio::test]
    async fn test_unwritable_path_still_returns_baseline() {
        let server = MockServer::start().await;
        let payload = generate_payload();
        mount_happy_path(&server, &payload).await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("missing-dir").join("baseline.json");

        let baseline = orchestrator(&server)
            .build_baseline_from(&payload, &file, 1)
            .await
            .unwrap();

        assert_eq!(baseline.global_id, "GID-1");
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_exhaustion_is_an_explicit_error() {
        let server = MockServer::start().await;
        mount_create(&server, 200, json!({"requestID": "REQ-1"})).await;
        mount_get_request(&server, "REQ-1", json!({"data": {"status": "Error"}})).await;

        let metrics = Arc::new(Metrics::new().unwrap());
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("baseline.json");

        let err = orchestrator(&server)
            .with_metrics(metrics.clone())
            .build_baseline_from(&generate_payload(), &file, 3)
            .await
            .unwrap_err();

        match err {
            BaselineError::Exhausted { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("error_terminal"));
            }
            other => panic!("expected exhaustion, got {}", other),
        }
        assert_eq!(metrics.baseline_attempts.with_label_values(&["failed"]).get(), 3);
        assert!(!file.exists());
    }

    #[tokio::test]
    async fn test_rejected_key_stops_after_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/customer"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = orchestrator(&server)
            .build_baseline_from(&generate_payload(), &dir.path().join("baseline.json"), 6)
            .await
            .unwrap_err();

        assert!(matches!(err, BaselineError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_missing_customer_record_stops_after_one_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(url_path("/customer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"requestID": "REQ-1"})))
            .expect(1)
            .mount(&server)
            .await;
        mount_get_request(
            &server,
            "REQ-1",
            json!({"data": {"status": "Active", "globalID": "GID-1"}}),
        )
        .await;
        Mock::given(method("GET"))
            .and(url_path("/get-customer"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
            .expect(1)
            .mount(&server)
            .await;

        let metrics = Arc::new(Metrics::new().unwrap());
        let dir = tempfile::tempdir().unwrap();
        let err = orchestrator(&server)
            .with_metrics(metrics.clone())
            .build_baseline_from(&generate_payload(), &dir.path().join("baseline.json"), 6)
            .await
            .unwrap_err();

        match err {
            BaselineError::Permanent(detail) => assert!(detail.contains("404")),
            other => panic!("expected permanent failure, got {}", other),
        }
        assert_eq!(metrics.baseline_attempts.with_label_values(&["permanent"]).get(), 1);
    }

    #[tokio::test]
    async fn test_server_error_on_fetch_is_retried() {
        let server = MockServer::start().await;
        mount_create(&server, 200, json!({"requestID": "REQ-1"})).await;
        mount_get_request(
            &server,
            "REQ-1",
            json!({"data": {"status": "Active", "globalID": "GID-1"}}),
        )
        .await;
        Mock::given(method("GET"))
            .and(url_path("/get-customer"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = orchestrator(&server)
            .build_baseline_from(&generate_payload(), &dir.path().join("baseline.json"), 2)
            .await
            .unwrap_err();

        assert!(matches!(err, BaselineError::Exhausted { attempts: 2, .. }));
    }

    #[test]
    fn test_resolve_falls_back_to_static_identity() {
        let fallback = BaselineIdentity::new("STATIC-GID");
        let resolved = BaselineIdentity::resolve(
            Err(BaselineError::Exhausted {
                attempts: 6,
                last_error: "pending_exhausted".to_string(),
            }),
            fallback.clone(),
        );
        assert_eq!(resolved, fallback);
    }

    #[test]
    fn test_resolve_prefers_fresh_baseline() {
        let baseline = Baseline {
            global_id: "GID-9".to_string(),
            licence_number: Some("LIC9".to_string()),
            address: Some(CustomerAddress {
                address_id: Some("ADDR-9".to_string()),
                ..CustomerAddress::default()
            }),
            customer: Customer::default(),
        };

        let resolved = BaselineIdentity::resolve(Ok(baseline), BaselineIdentity::new("STATIC-GID"));
        assert_eq!(resolved.global_id, "GID-9");
        assert_eq!(resolved.address_id.as_deref(), Some("ADDR-9"));
    }
}
