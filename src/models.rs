use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Read Models
// These mirror what the customer API returns. Unknown fields are ignored so
// backend additions never break a lookup.
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    #[serde(rename = "globalID")]
    pub global_id: Option<String>,
    pub account_name: Option<String>,
    pub legal_owner_name: Option<String>,
    pub licenses: Vec<License>,
    pub addresses: Vec<CustomerAddress>,
    pub payment_terms: Option<PaymentTerms>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub primary_email: Option<String>,
    pub phone: Option<String>,
}

impl Customer {
    pub fn first_license(&self) -> Option<&License> {
        self.licenses.first()
    }

    pub fn first_address(&self) -> Option<&CustomerAddress> {
        self.addresses.first()
    }

    pub fn address_of_type(&self, address_type: AddressType) -> Option<&CustomerAddress> {
        self.addresses
            .iter()
            .find(|a| a.address_type.as_deref() == Some(address_type.as_str()))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct License {
    pub number: Option<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    #[serde(rename = "type")]
    pub license_type: Option<String>,
    pub legal_regulation: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerAddress {
    #[serde(rename = "addressID")]
    pub address_id: Option<String>,
    pub address_type: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub locations: Vec<DropLocation>,
}

/// Drop point attached to an address
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DropLocation {
    pub name: Option<String>,
    #[serde(rename = "locationID")]
    pub location_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentTerms {
    pub term: Option<String>,
    pub cadence: Option<String>,
    /// Sent back as either a number or a string depending on the backend
    pub credit_limit: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Shipping,
    Billing,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Shipping => "Shipping",
            AddressType::Billing => "Billing",
        }
    }
}

// ============================================================================
// Asynchronous Request Statuses
// ============================================================================

/// Status of a create request as reported by get-request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkRequestStatus {
    Pending,
    Active,
    Error,
    Unknown(String),
}

impl WorkRequestStatus {
    pub const TERMINAL: [&'static str; 2] = ["Active", "Error"];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "Pending" => WorkRequestStatus::Pending,
            "Active" => WorkRequestStatus::Active,
            "Error" => WorkRequestStatus::Error,
            other => WorkRequestStatus::Unknown(other.to_string()),
        }
    }
}

/// Status of an update request; the update service reports lower-case values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRequestStatus {
    Pending,
    Active,
    Error,
    Unknown(String),
}

impl UpdateRequestStatus {
    pub const TERMINAL: [&'static str; 2] = ["active", "error"];

    pub fn parse(raw: &str) -> Self {
        match raw {
            "pending" => UpdateRequestStatus::Pending,
            "active" => UpdateRequestStatus::Active,
            "error" => UpdateRequestStatus::Error,
            other => UpdateRequestStatus::Unknown(other.to_string()),
        }
    }
}

// ============================================================================
// Body helpers
// ============================================================================

/// Read a string field, tolerating numbers the backend sometimes sends instead
pub(crate) fn string_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Human-readable error carried by a response body, if any.
///
/// `error` wins when present; a bare `message: "Error"` still counts as a failure.
pub(crate) fn api_error_of(body: &Value) -> Option<String> {
    match body.get("error") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Value::Null) | None => {}
        Some(other) => return Some(other.to_string()),
    }

    match body.get("message").and_then(Value::as_str) {
        Some("Error") => Some("Error".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_deserializes_with_unknown_fields() {
        let body = json!({
            "globalID": "GID-1",
            "accountName": "SMITH & JONES",
            "legalOwnerName": "ACME LLC",
            "licenses": [{"number": "ABC123", "type": "ZGAL", "legalRegulation": "1"}],
            "addresses": [{
                "addressID": "A-1",
                "addressType": "Shipping",
                "city": "BENTONVILLE",
                "locations": [{"name": "Dock"}]
            }],
            "paymentTerms": {"term": "credit", "cadence": "NT15", "creditLimit": 2500},
            "somethingNew": true
        });

        let customer: Customer = serde_json::from_value(body).unwrap();
        assert_eq!(customer.global_id.as_deref(), Some("GID-1"));
        assert_eq!(customer.first_license().unwrap().license_type.as_deref(), Some("ZGAL"));
        assert_eq!(customer.first_address().unwrap().address_id.as_deref(), Some("A-1"));
        assert_eq!(customer.first_address().unwrap().locations[0].name.as_deref(), Some("Dock"));
        assert!(customer.address_of_type(AddressType::Shipping).is_some());
        assert!(customer.address_of_type(AddressType::Billing).is_none());
        assert_eq!(customer.payment_terms.unwrap().credit_limit, Some(json!(2500)));
    }

    #[test]
    fn test_status_parsing_is_case_sensitive() {
        assert_eq!(WorkRequestStatus::parse("Active"), WorkRequestStatus::Active);
        assert!(matches!(WorkRequestStatus::parse("active"), WorkRequestStatus::Unknown(_)));
        assert_eq!(UpdateRequestStatus::parse("active"), UpdateRequestStatus::Active);
        assert!(matches!(UpdateRequestStatus::parse("Active"), UpdateRequestStatus::Unknown(_)));
    }

    #[test]
    fn test_api_error_extraction() {
        assert_eq!(
            api_error_of(&json!({"message": "Error", "error": "accountName is required"})),
            Some("accountName is required".to_string())
        );
        assert_eq!(api_error_of(&json!({"message": "Error"})), Some("Error".to_string()));
        assert_eq!(api_error_of(&json!({"message": "Success", "requestID": "R1"})), None);
        assert_eq!(api_error_of(&json!({"error": null})), None);
    }

    #[test]
    fn test_string_at_accepts_numbers() {
        let body = json!({"data": {"requestID": 42, "empty": ""}});
        assert_eq!(string_at(&body, "/data/requestID"), Some("42".to_string()));
        assert_eq!(string_at(&body, "/data/empty"), None);
        assert_eq!(string_at(&body, "/data/missing"), None);
    }
}
