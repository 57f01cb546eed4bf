use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};

use crate::config::ApiConfig;
use crate::domain::customer::{BrowsePayload, CustomerPayload, UpdateCommand};
use crate::metrics::Metrics;
use crate::models::{api_error_of, string_at, Customer, UpdateRequestStatus, WorkRequestStatus};
use crate::utils::poll::HasStatus;

use super::error::{ApiError, ApiResult};

// ============================================================================
// Customer API Client
// ============================================================================
//
// Thin action client: one method per endpoint, one HTTP call per method.
// No retries here; polling and baseline retries live in the flows.
//
// Read endpoints are GETs that carry a JSON body, as the gateway expects.
//
// ============================================================================

const API_KEY_HEADER: &str = "x-api-key";
const MULTIPLE_CUSTOMERS_MARKER: &str = "Multiple customers with licenseID";

/// Result of a mutating call (create or update). Never an error on status.
#[derive(Debug, Clone)]
pub struct SubmissionResponse {
    pub status: u16,
    pub body: Value,
    pub api_error: Option<String>,
    /// `requestID` for creates, `updateRequestID` for updates
    pub correlation_id: Option<String>,
}

impl SubmissionResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.api_error.is_none()
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }
}

/// One get-request observation
#[derive(Debug, Clone, PartialEq)]
pub struct RequestLookup {
    pub http_status: u16,
    pub status: Option<String>,
    pub global_id: Option<String>,
    pub alcohol_license_number: Option<String>,
    pub raw_body: Value,
}

impl RequestLookup {
    pub fn work_status(&self) -> Option<WorkRequestStatus> {
        self.status.as_deref().map(WorkRequestStatus::parse)
    }
}

impl HasStatus for RequestLookup {
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct CustomerLookup {
    pub status: u16,
    pub body: Value,
    pub customer: Customer,
}

/// Outcome of a lookup by alcohol license number
#[derive(Debug, Clone)]
pub enum LicenseLookup {
    Found(CustomerLookup),
    /// The accepted 500: the license is shared by several customers
    MultipleCustomers { body: Value, error: String },
}

#[derive(Debug, Clone)]
pub struct BrowseResponse {
    pub status: u16,
    pub body: Value,
}

impl BrowseResponse {
    pub fn records(&self) -> &[Value] {
        self.body
            .get("records")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// One get-update-request observation
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequestLookup {
    pub status: Option<String>,
    pub error: Option<String>,
    pub raw_body: Value,
}

impl UpdateRequestLookup {
    pub fn update_status(&self) -> Option<UpdateRequestStatus> {
        self.status.as_deref().map(UpdateRequestStatus::parse)
    }
}

impl HasStatus for UpdateRequestLookup {
    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

#[derive(Clone)]
pub struct CustomerApiClient {
    http: Client,
    config: Arc<ApiConfig>,
    metrics: Option<Arc<Metrics>>,
}

impl CustomerApiClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let http = Client::builder().build()?;

        tracing::debug!(base_url = %config.base_url, "Customer API client created");

        Ok(Self {
            http,
            config: Arc::new(config),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------------

    pub async fn create_customer(&self, payload: &CustomerPayload) -> ApiResult<SubmissionResponse> {
        let url = self.config.url(&self.config.paths.create_customer);
        let request = self.http.post(url).json(payload);

        let (status, body) = self
            .send("create_customer", request, self.config.submit_timeout)
            .await?;

        let correlation_id =
            string_at(&body, "/data/requestID").or_else(|| string_at(&body, "/requestID"));
        let api_error = api_error_of(&body);

        tracing::debug!(
            status = status,
            request_id = ?correlation_id,
            api_error = ?api_error,
            "Create customer submitted"
        );

        Ok(SubmissionResponse {
            status,
            body,
            api_error,
            correlation_id,
        })
    }

    /// Single get-request lookup; the poller decides whether to ask again
    pub async fn get_request(&self, request_id: &str) -> ApiResult<RequestLookup> {
        let url = self.config.url(&self.config.paths.get_request);
        let request = self.http.get(url).json(&json!({ "requestID": request_id }));

        let (http_status, raw_body) = self
            .send("get_request", request, self.config.lookup_timeout)
            .await?;

        // A rejected key never yields a status; polling on would only burn the budget
        if matches!(http_status, 401 | 403) {
            return Err(ApiError::from_status("get_request", http_status, raw_body.to_string()));
        }

        Ok(RequestLookup {
            http_status,
            status: string_at(&raw_body, "/data/status"),
            global_id: string_at(&raw_body, "/data/globalID"),
            alcohol_license_number: string_at(&raw_body, "/data/alcoholLicenseNumber"),
            raw_body,
        })
    }

    // ------------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------------

    pub async fn get_customer_by_global_id(&self, global_id: &str) -> ApiResult<CustomerLookup> {
        let body = json!({ "globalID": global_id });
        let (status, body) = self.get_customer("get_customer_by_global_id", &body).await?;

        if !(200..300).contains(&status) {
            return Err(ApiError::from_status(
                "get_customer_by_global_id",
                status,
                body.to_string(),
            ));
        }

        let customer = customer_of(&body, global_id)?;
        Ok(CustomerLookup {
            status,
            body,
            customer,
        })
    }

    pub async fn get_customer_by_license_number(&self, license_number: &str) -> ApiResult<LicenseLookup> {
        let body = json!({ "alcoholLicenseNumber": license_number });
        let (status, body) = self
            .get_customer("get_customer_by_license_number", &body)
            .await?;

        if let Some(error) = multiple_customers_error(status, &body) {
            tracing::info!(
                license_number = %license_number,
                "License shared by multiple customers"
            );
            return Ok(LicenseLookup::MultipleCustomers { body, error });
        }

        if status != 200 {
            return Err(ApiError::from_status(
                "get_customer_by_license_number",
                status,
                body.to_string(),
            ));
        }

        let customer = customer_of(&body, license_number)?;
        Ok(LicenseLookup::Found(CustomerLookup {
            status,
            body,
            customer,
        }))
    }

    async fn get_customer(&self, operation: &'static str, body: &Value) -> ApiResult<(u16, Value)> {
        let url = self.config.url(&self.config.paths.get_customer);
        let request = self.http.get(url).json(body);
        self.send(operation, request, self.config.lookup_timeout).await
    }

    pub async fn browse_customers(&self, payload: &BrowsePayload) -> ApiResult<BrowseResponse> {
        let url = self.config.url(&self.config.paths.browse_customer);
        let request = self.http.get(url).json(payload);

        let (status, body) = self
            .send("browse_customers", request, self.config.submit_timeout)
            .await?;

        Ok(BrowseResponse { status, body })
    }

    // ------------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------------

    /// `PATCH <update path>/<globalID>?action=<name>` with the command body
    pub async fn update_customer(
        &self,
        global_id: &str,
        command: &UpdateCommand,
    ) -> ApiResult<SubmissionResponse> {
        let url = format!(
            "{}/{}",
            self.config.url(&self.config.paths.update_customer),
            global_id
        );
        let request = self
            .http
            .patch(url)
            .query(&[("action", command.action_name())])
            .json(command);

        let (status, body) = self
            .send("update_customer", request, self.config.submit_timeout)
            .await?;

        let correlation_id = string_at(&body, "/updateRequestID")
            .or_else(|| string_at(&body, "/data/updateRequestID"));
        let api_error = api_error_of(&body);

        tracing::debug!(
            global_id = %global_id,
            action = command.action_name(),
            status = status,
            update_request_id = ?correlation_id,
            api_error = ?api_error,
            "Update submitted"
        );

        Ok(SubmissionResponse {
            status,
            body,
            api_error,
            correlation_id,
        })
    }

    /// Single get-update-request lookup. Anything but 200 is an error.
    pub async fn get_update_request(
        &self,
        update_request_id: &str,
        global_id: &str,
    ) -> ApiResult<UpdateRequestLookup> {
        let url = self.config.url(&self.config.paths.get_update_request);
        let request = self.http.get(url).json(&json!({
            "updateRequestID": update_request_id,
            "globalID": global_id,
        }));

        let (status, raw_body) = self
            .send("get_update_request", request, self.config.lookup_timeout)
            .await?;

        if status != 200 {
            return Err(ApiError::from_status(
                "get_update_request",
                status,
                raw_body.to_string(),
            ));
        }

        Ok(UpdateRequestLookup {
            status: string_at(&raw_body, "/data/status"),
            error: string_at(&raw_body, "/data/error"),
            raw_body,
        })
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> ApiResult<(u16, Value)> {
        let result = request
            .header(API_KEY_HEADER, &self.config.api_key)
            .timeout(timeout)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(operation = operation, error = %e, "Request failed");
                self.record(operation, "transport_error");
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        self.record(operation, &status.to_string());

        let body = read_json_body(operation, response).await?;
        Ok((status, body))
    }

    fn record(&self, operation: &str, status: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_api_request(operation, status);
        }
    }
}

/// Non-JSON or empty bodies read as `{}`
async fn read_json_body(operation: &'static str, response: Response) -> ApiResult<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(json!({}));
    }

    match serde_json::from_str(&text) {
        Ok(body) => Ok(body),
        Err(e) => {
            tracing::warn!(operation = operation, error = %e, "Response not JSON");
            Ok(json!({}))
        }
    }
}

fn customer_of(body: &Value, key: &str) -> ApiResult<Customer> {
    match body.pointer("/data/customer") {
        Some(value) if !value.is_null() => Ok(serde_json::from_value(value.clone())?),
        _ => Err(ApiError::MissingCustomer {
            key: key.to_string(),
        }),
    }
}

fn multiple_customers_error(status: u16, body: &Value) -> Option<String> {
    if status != 500 || body.get("message").and_then(Value::as_str) != Some("Error") {
        return None;
    }

    body.get("error")
        .and_then(Value::as_str)
        .filter(|e| e.contains(MULTIPLE_CUSTOMERS_MARKER))
        .map(str::to_string)
}
