use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::api::CustomerApiClient;
use crate::config::ApiConfig;
use crate::domain::customer::CustomerPayload;

// ============================================================================
// Shared test fixtures for wiremock-backed API tests
// ============================================================================

pub const TEST_API_KEY: &str = "test-api-key";

pub fn client_for(server: &MockServer) -> CustomerApiClient {
    CustomerApiClient::new(ApiConfig::new(server.uri(), TEST_API_KEY)).unwrap()
}

/// Minimal get-customer body
pub fn customer_body(global_id: &str, account_name: &str) -> Value {
    json!({
        "data": {
            "customer": {
                "globalID": global_id,
                "accountName": account_name,
                "addresses": [{"addressID": "ADDR-1", "addressType": "Shipping"}]
            }
        }
    })
}

/// get-customer body that mirrors what the backend stores for `payload`
pub fn stored_customer_body(global_id: &str, payload: &CustomerPayload) -> Value {
    let address = payload.first_address().cloned().unwrap_or_default();
    let upper = |v: &Option<String>| v.as_deref().map(str::to_uppercase);

    json!({
        "data": {
            "customer": {
                "globalID": global_id,
                "accountName": upper(&payload.account_name),
                "legalOwnerName": upper(&payload.legal_owner_name),
                "licenses": [{
                    "number": payload.alcohol_license_number,
                    "type": payload.license_type,
                }],
                "addresses": [{
                    "addressID": "ADDR-1",
                    "addressType": "Shipping",
                    "addressLine1": address.address_line1,
                    "city": upper(&address.city),
                    "county": upper(&address.county),
                    "state": upper(&address.state),
                    "postalCode": address.postal_code,
                    "country": upper(&address.country),
                }],
            }
        }
    })
}

pub async fn mount_create(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/customer"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_get_request(server: &MockServer, request_id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/get-request"))
        .and(body_json(json!({ "requestID": request_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_customer_by_global_id(server: &MockServer, global_id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/get-customer"))
        .and(body_json(json!({ "globalID": global_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_customer_by_license(server: &MockServer, license: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path("/get-customer"))
        .and(body_json(json!({ "alcoholLicenseNumber": license })))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}
