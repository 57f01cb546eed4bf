use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::{LicenseLookup, RequestLookup};
use crate::domain::customer::CustomerPayload;
use crate::models::{Customer, WorkRequestStatus};

use super::verify::{verify_customer, FieldMismatch, LookupKey, VerificationRules};
use super::{FlowError, FlowKind, FlowOrchestrator};

// ============================================================================
// Create-and-Verify Workflow
// ============================================================================
//
//   submit ──┬─ rejected ──────────────> SubmissionFailed
//            ├─ no requestID ──────────> MissingRequestId
//            └─ poll get-request ─┬─ Active + globalID ─> fetch, verify ─> ActiveVerified
//                                 ├─ Active, no globalID ─────────────────> ActiveWithoutGlobalId
//                                 ├─ Error ───────────────────────────────> ErrorTerminal
//                                 └─ budget spent ────────────────────────> PendingExhausted
//
// ============================================================================

/// Which lookups run once a customer is Active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    GlobalIdOnly,
    #[default]
    GlobalIdAndLicense,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOptions {
    pub fetch: FetchStrategy,
    pub rules: VerificationRules,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseCheck {
    /// Lookup returned a single customer; its mismatches are in the report
    Verified,
    /// The license is shared, which the backend reports as an accepted 500
    MultipleCustomers { error: String },
    Skipped,
}

#[derive(Debug, Clone)]
pub struct ActiveCustomer {
    pub request_id: String,
    pub global_id: String,
    pub attempts: u32,
    /// Echo from get-request, falling back to the submitted number
    pub alcohol_license_number: Option<String>,
    pub customer: Customer,
    pub license_check: LicenseCheck,
    pub mismatches: Vec<FieldMismatch>,
}

#[derive(Debug, Clone)]
pub enum CreateOutcome {
    SubmissionFailed {
        status: u16,
        api_error: Option<String>,
        body: Value,
    },
    MissingRequestId {
        status: u16,
        body: Value,
    },
    ActiveVerified(Box<ActiveCustomer>),
    ActiveWithoutGlobalId {
        request_id: String,
        attempts: u32,
        last: RequestLookup,
    },
    ErrorTerminal {
        request_id: String,
        attempts: u32,
        last: RequestLookup,
    },
    PendingExhausted {
        request_id: String,
        attempts: u32,
        last: RequestLookup,
    },
}

impl CreateOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CreateOutcome::SubmissionFailed { .. } => "submission_failed",
            CreateOutcome::MissingRequestId { .. } => "missing_request_id",
            CreateOutcome::ActiveVerified(_) => "active_verified",
            CreateOutcome::ActiveWithoutGlobalId { .. } => "active_without_global_id",
            CreateOutcome::ErrorTerminal { .. } => "error_terminal",
            CreateOutcome::PendingExhausted { .. } => "pending_exhausted",
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            CreateOutcome::SubmissionFailed { .. } | CreateOutcome::MissingRequestId { .. } => None,
            CreateOutcome::ActiveVerified(active) => Some(active.request_id.as_str()),
            CreateOutcome::ActiveWithoutGlobalId { request_id, .. }
            | CreateOutcome::ErrorTerminal { request_id, .. }
            | CreateOutcome::PendingExhausted { request_id, .. } => Some(request_id.as_str()),
        }
    }

    pub fn global_id(&self) -> Option<&str> {
        match self {
            CreateOutcome::ActiveVerified(active) => Some(active.global_id.as_str()),
            _ => None,
        }
    }

    pub fn active(&self) -> Option<&ActiveCustomer> {
        match self {
            CreateOutcome::ActiveVerified(active) => Some(active.as_ref()),
            _ => None,
        }
    }

    pub fn mismatches(&self) -> &[FieldMismatch] {
        match self {
            CreateOutcome::ActiveVerified(active) => active.mismatches.as_slice(),
            _ => &[],
        }
    }

    /// Active, fetched, and every compared field matched
    pub fn is_clean(&self) -> bool {
        matches!(self, CreateOutcome::ActiveVerified(active) if active.mismatches.is_empty())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CreateOutcome::SubmissionFailed { status: 401 | 403, .. })
    }
}

impl FlowOrchestrator {
    /// Submit `payload`, wait for the backend to settle and check what it stored
    pub async fn create_and_verify(
        &self,
        payload: &CustomerPayload,
        options: &CreateOptions,
    ) -> Result<CreateOutcome, FlowError> {
        let span = tracing::info_span!("create_flow", flow_id = %Uuid::new_v4());

        async {
            let result = self.run_create(payload, options).await;
            match &result {
                Ok(outcome) => self.record_outcome(FlowKind::Create, outcome.label()),
                Err(_) => self.record_outcome(FlowKind::Create, "flow_error"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_create(
        &self,
        payload: &CustomerPayload,
        options: &CreateOptions,
    ) -> Result<CreateOutcome, FlowError> {
        let submission = self.client().create_customer(payload).await?;

        if !submission.is_success() {
            tracing::warn!(
                status = submission.status,
                api_error = submission.api_error.as_deref().unwrap_or("Unknown"),
                "Create customer failed"
            );
            return Ok(CreateOutcome::SubmissionFailed {
                status: submission.status,
                api_error: submission.api_error,
                body: submission.body,
            });
        }

        let Some(request_id) = submission.correlation_id else {
            tracing::warn!(status = submission.status, "No requestID returned, cannot continue flow");
            return Ok(CreateOutcome::MissingRequestId {
                status: submission.status,
                body: submission.body,
            });
        };

        let client = self.client();
        let polled = self
            .poll_status(FlowKind::Create, &request_id, |_attempt| client.get_request(&request_id))
            .await?;

        let attempts = polled.attempts();
        let exhausted = polled.is_exhausted();
        let last = polled.into_last();

        tracing::info!(
            request_id = %request_id,
            attempts = attempts,
            status = last.status.as_deref().unwrap_or("N/A"),
            global_id = last.global_id.as_deref().unwrap_or("N/A"),
            "Polling complete"
        );

        if exhausted {
            tracing::warn!(request_id = %request_id, "Customer remained Pending after retries");
            return Ok(CreateOutcome::PendingExhausted {
                request_id,
                attempts,
                last,
            });
        }

        match (last.work_status(), last.global_id.clone()) {
            (Some(WorkRequestStatus::Active), Some(global_id)) => {
                let active = self
                    .fetch_and_verify(payload, options, request_id, global_id, attempts, last)
                    .await?;
                Ok(CreateOutcome::ActiveVerified(Box::new(active)))
            }
            (Some(WorkRequestStatus::Active), None) => {
                tracing::warn!(request_id = %request_id, "Customer Active without a globalID");
                Ok(CreateOutcome::ActiveWithoutGlobalId {
                    request_id,
                    attempts,
                    last,
                })
            }
            _ => {
                tracing::error!(request_id = %request_id, "Customer creation failed (Status: Error)");
                Ok(CreateOutcome::ErrorTerminal {
                    request_id,
                    attempts,
                    last,
                })
            }
        }
    }

    async fn fetch_and_verify(
        &self,
        payload: &CustomerPayload,
        options: &CreateOptions,
        request_id: String,
        global_id: String,
        attempts: u32,
        last: RequestLookup,
    ) -> Result<ActiveCustomer, FlowError> {
        let by_global_id = self.client().get_customer_by_global_id(&global_id).await?;
        let mut mismatches = verify_customer(
            &by_global_id.customer,
            payload,
            &global_id,
            &options.rules,
            LookupKey::GlobalId,
        );

        let alcohol_license_number = last
            .alcohol_license_number
            .clone()
            .or_else(|| payload.alcohol_license_number.clone());

        let license_check = match options.fetch {
            FetchStrategy::GlobalIdOnly => LicenseCheck::Skipped,
            FetchStrategy::GlobalIdAndLicense => {
                let number = alcohol_license_number
                    .as_deref()
                    .ok_or_else(|| FlowError::MissingLicenseNumber {
                        global_id: global_id.clone(),
                    })?;

                match self.client().get_customer_by_license_number(number).await? {
                    LicenseLookup::Found(lookup) => {
                        mismatches.extend(verify_customer(
                            &lookup.customer,
                            payload,
                            &global_id,
                            &options.rules,
                            LookupKey::LicenseNumber,
                        ));
                        LicenseCheck::Verified
                    }
                    LicenseLookup::MultipleCustomers { error, .. } => {
                        LicenseCheck::MultipleCustomers { error }
                    }
                }
            }
        };

        if mismatches.is_empty() {
            tracing::info!(global_id = %global_id, "Customer Active and verified");
        } else {
            for mismatch in &mismatches {
                tracing::warn!(global_id = %global_id, mismatch = %mismatch, "Field mismatch");
            }
        }

        Ok(ActiveCustomer {
            request_id,
            global_id,
            attempts,
            alcohol_license_number,
            customer: by_global_id.customer,
            license_check,
            mismatches,
        })
    }
}
