use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::api::{ApiError, ApiResult, CustomerApiClient};
use crate::metrics::Metrics;
use crate::models::{UpdateRequestStatus, WorkRequestStatus};
use crate::utils::{poll_until_terminal, HasStatus, PollConfig, PollOutcome};

pub mod baseline;
pub mod create;
pub mod update;
pub mod verify;

pub use baseline::{Baseline, BaselineError, BaselineIdentity, DEFAULT_BASELINE_RETRIES};
pub use create::{ActiveCustomer, CreateOptions, CreateOutcome, FetchStrategy, LicenseCheck};
pub use update::{UpdateOutcome, UpdateSubmissionOutcome};
pub use verify::{canonical_account_name, verify_customer, FieldMismatch, LookupKey, VerificationRules};

// ============================================================================
// Flow Orchestrator
// ============================================================================
//
// One orchestrator runs both asynchronous workflows:
//
//   create:  submit -> poll get-request -> fetch + verify
//   update:  (submitted) -> poll get-update-request -> fetch
//
// Each workflow is a `FlowKind` whose settings carry the poll budget, the
// terminal status set and what running out of budget means.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowKind {
    Create,
    Update,
}

impl FlowKind {
    pub fn label(&self) -> &'static str {
        match self {
            FlowKind::Create => "create",
            FlowKind::Update => "update",
        }
    }

    pub fn default_settings(&self) -> FlowSettings {
        match self {
            FlowKind::Create => FlowSettings {
                poll: PollConfig::create_flow(),
                terminal: &WorkRequestStatus::TERMINAL,
                exhaustion: ExhaustionPolicy::SoftResult,
            },
            FlowKind::Update => FlowSettings {
                poll: PollConfig::update_flow(),
                terminal: &UpdateRequestStatus::TERMINAL,
                exhaustion: ExhaustionPolicy::HardError,
            },
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a poll that never reached a terminal status turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionPolicy {
    /// Returned as a partial result the caller inspects
    SoftResult,
    /// Raised as `FlowError::PollExhausted`
    HardError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowSettings {
    pub poll: PollConfig,
    pub terminal: &'static [&'static str],
    pub exhaustion: ExhaustionPolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("updateRequestID not returned from update API (HTTP {status})")]
    MissingUpdateRequestId { status: u16 },

    #[error("{workflow} request {correlation_id} did not reach a final state after {attempts} attempts (last status: {last_status:?})")]
    PollExhausted {
        workflow: FlowKind,
        correlation_id: String,
        attempts: u32,
        last_status: Option<String>,
    },

    #[error("No alcohol license number for customer {global_id}")]
    MissingLicenseNumber { global_id: String },
}

impl FlowError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FlowError::Api(ApiError::Unauthorized { .. }))
    }
}

#[derive(Clone)]
pub struct FlowOrchestrator {
    client: CustomerApiClient,
    metrics: Option<Arc<Metrics>>,
    create: FlowSettings,
    update: FlowSettings,
}

impl FlowOrchestrator {
    pub fn new(client: CustomerApiClient) -> Self {
        Self {
            client,
            metrics: None,
            create: FlowKind::Create.default_settings(),
            update: FlowKind::Update.default_settings(),
        }
    }

    /// Attach metrics to the orchestrator and its client
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.client = self.client.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    pub fn with_poll_config(mut self, kind: FlowKind, poll: PollConfig) -> Self {
        match kind {
            FlowKind::Create => self.create.poll = poll,
            FlowKind::Update => self.update.poll = poll,
        }
        self
    }

    pub fn client(&self) -> &CustomerApiClient {
        &self.client
    }

    pub fn settings(&self, kind: FlowKind) -> &FlowSettings {
        match kind {
            FlowKind::Create => &self.create,
            FlowKind::Update => &self.update,
        }
    }

    /// Poll with the workflow's settings and apply its exhaustion policy
    async fn poll_status<F, Fut, T>(
        &self,
        kind: FlowKind,
        correlation_id: &str,
        lookup: F,
    ) -> Result<PollOutcome<T>, FlowError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = ApiResult<T>>,
        T: HasStatus,
    {
        let settings = self.settings(kind);
        let outcome = poll_until_terminal(&settings.poll, settings.terminal, lookup).await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_poll(kind.label(), outcome.attempts());
        }

        if outcome.is_exhausted() && settings.exhaustion == ExhaustionPolicy::HardError {
            return Err(FlowError::PollExhausted {
                workflow: kind,
                correlation_id: correlation_id.to_string(),
                attempts: outcome.attempts(),
                last_status: outcome.last().status().map(str::to_string),
            });
        }

        Ok(outcome)
    }

    fn record_outcome(&self, kind: FlowKind, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_flow_outcome(kind.label(), outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_keep_exhaustion_asymmetry() {
        let create = FlowKind::Create.default_settings();
        assert_eq!(create.poll.max_attempts, 15);
        assert_eq!(create.terminal, &["Active", "Error"]);
        assert_eq!(create.exhaustion, ExhaustionPolicy::SoftResult);

        let update = FlowKind::Update.default_settings();
        assert_eq!(update.poll.max_attempts, 10);
        assert_eq!(update.terminal, &["active", "error"]);
        assert_eq!(update.exhaustion, ExhaustionPolicy::HardError);
    }
}
