use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::payload::{company_name, email_for, license_number, national_phone, pick, street_address};
use super::value_objects::*;

// ============================================================================
// Customer Update Commands
// ============================================================================
//
// Each command is the body of one `PATCH .../<globalID>?action=<name>` call.
// The body is `{ "<name>": { ... } }`; `UpdateCommand::Missing` sends `{}`
// to exercise the missing-object path.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    AccountDetails,
    BillingAddress,
    DropPoint,
    License,
    PaymentDetails,
}

impl UpdateKind {
    pub const ALL: [UpdateKind; 5] = [
        UpdateKind::AccountDetails,
        UpdateKind::BillingAddress,
        UpdateKind::DropPoint,
        UpdateKind::License,
        UpdateKind::PaymentDetails,
    ];

    /// Value of the `action` query parameter and the body key
    pub fn action_name(&self) -> &'static str {
        match self {
            UpdateKind::AccountDetails => "accountDetails",
            UpdateKind::BillingAddress => "billingAddress",
            UpdateKind::DropPoint => "dropPoint",
            UpdateKind::License => "license",
            UpdateKind::PaymentDetails => "paymentDetails",
        }
    }

    pub fn from_action_name(name: &str) -> Option<Self> {
        UpdateKind::ALL.into_iter().find(|k| k.action_name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateCommand {
    AccountDetails(AccountDetails),
    BillingAddress(BillingAddress),
    DropPoint(DropPoint),
    License(LicenseUpdate),
    PaymentDetails(PaymentDetails),
    /// Right action selector, no body object
    Missing(UpdateKind),
}

impl UpdateCommand {
    pub fn kind(&self) -> UpdateKind {
        match self {
            UpdateCommand::AccountDetails(_) => UpdateKind::AccountDetails,
            UpdateCommand::BillingAddress(_) => UpdateKind::BillingAddress,
            UpdateCommand::DropPoint(_) => UpdateKind::DropPoint,
            UpdateCommand::License(_) => UpdateKind::License,
            UpdateCommand::PaymentDetails(_) => UpdateKind::PaymentDetails,
            UpdateCommand::Missing(kind) => *kind,
        }
    }

    pub fn action_name(&self) -> &'static str {
        self.kind().action_name()
    }

    /// A valid command of the given kind. Drop points need an existing address.
    pub fn valid(kind: UpdateKind, address_id: Option<&str>) -> Self {
        match kind {
            UpdateKind::AccountDetails => UpdateCommand::AccountDetails(AccountDetails::valid()),
            UpdateKind::BillingAddress => UpdateCommand::BillingAddress(BillingAddress::valid()),
            UpdateKind::DropPoint => match address_id {
                Some(id) => UpdateCommand::DropPoint(DropPoint::valid(id)),
                None => UpdateCommand::DropPoint(DropPoint::missing_address_id()),
            },
            UpdateKind::License => UpdateCommand::License(LicenseUpdate::valid()),
            UpdateKind::PaymentDetails => UpdateCommand::PaymentDetails(PaymentDetails::valid()),
        }
    }
}

impl Serialize for UpdateCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let key = self.action_name();
        match self {
            UpdateCommand::Missing(_) => serializer.serialize_map(Some(0))?.end(),
            UpdateCommand::AccountDetails(body) => single_entry(serializer, key, body),
            UpdateCommand::BillingAddress(body) => single_entry(serializer, key, body),
            UpdateCommand::DropPoint(body) => single_entry(serializer, key, body),
            UpdateCommand::License(body) => single_entry(serializer, key, body),
            UpdateCommand::PaymentDetails(body) => single_entry(serializer, key, body),
        }
    }
}

fn single_entry<S: Serializer, T: Serialize>(serializer: S, key: &str, value: &T) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(1))?;
    map.serialize_entry(key, value)?;
    map.end()
}

// ============================================================================
// Account details
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    pub contact_first_name: String,
    pub contact_last_name: String,
    pub primary_email: String,
    pub phone: String,
}

impl AccountDetails {
    pub fn valid() -> Self {
        let mut rng = rand::thread_rng();
        let first = pick(&mut rng, &FIRST_NAMES).to_string();
        let last = pick(&mut rng, &LAST_NAMES).to_string();
        Self {
            primary_email: email_for(&mut rng, &first, &last),
            phone: national_phone(&mut rng),
            contact_first_name: first,
            contact_last_name: last,
        }
    }

    /// Email without an `@`
    pub fn invalid_email() -> Self {
        Self {
            primary_email: "dave.chappellecontact.com".to_string(),
            ..Self::valid()
        }
    }

    /// Phone with letters in it
    pub fn invalid_phone() -> Self {
        Self {
            phone: "(512)234-TEST".to_string(),
            ..Self::valid()
        }
    }
}

// ============================================================================
// Billing address
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    pub same_as_shipping: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_entity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl BillingAddress {
    pub fn valid() -> Self {
        let mut rng = rand::thread_rng();
        let location = *pick(&mut rng, &US_LOCATIONS);
        Self {
            same_as_shipping: false,
            billing_entity_name: Some(company_name(&mut rng)),
            address_line1: Some(street_address(&mut rng)),
            city: Some(location.city.to_string()),
            state: Some(location.state.to_string()),
            postal_code: Some(location.postal_code.to_string()),
            country: None,
        }
    }

    pub fn invalid_state() -> Self {
        Self {
            state: Some("InvalidState".to_string()),
            postal_code: Some("InvalidPostalCode".to_string()),
            ..Self::valid()
        }
    }

    pub fn same_as_shipping() -> Self {
        Self {
            same_as_shipping: true,
            billing_entity_name: None,
            address_line1: None,
            city: None,
            state: None,
            postal_code: None,
            country: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            same_as_shipping: false,
            billing_entity_name: Some(String::new()),
            address_line1: Some(String::new()),
            city: Some(String::new()),
            state: Some(String::new()),
            postal_code: Some(String::new()),
            country: None,
        }
    }

    /// Street line and postal code blank, the rest filled in
    pub fn partially_empty() -> Self {
        Self {
            address_line1: Some(String::new()),
            postal_code: Some(String::new()),
            ..Self::valid()
        }
    }

    pub fn non_us() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            city: Some("Toronto".to_string()),
            state: Some("ON".to_string()),
            postal_code: Some(format!("M5V {}A{}", rng.gen_range(1..10), rng.gen_range(1..10))),
            country: Some("CA".to_string()),
            ..Self::valid()
        }
    }
}

// ============================================================================
// Drop point
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropPoint {
    #[serde(rename = "addressID", skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DropPoint {
    pub fn valid(address_id: &str) -> Self {
        Self {
            address_id: Some(address_id.to_string()),
            name: Some(random_drop_point_name()),
        }
    }

    pub fn missing_address_id() -> Self {
        Self {
            address_id: None,
            name: Some(random_drop_point_name()),
        }
    }

    pub fn empty_name(address_id: &str) -> Self {
        Self {
            address_id: Some(address_id.to_string()),
            name: Some(String::new()),
        }
    }

    pub fn invalid_address_id() -> Self {
        Self {
            address_id: Some("InvalidAddressID".to_string()),
            name: Some(random_drop_point_name()),
        }
    }
}

fn random_drop_point_name() -> String {
    pick(&mut rand::thread_rng(), &DROP_POINT_NAMES).to_string()
}

// ============================================================================
// License add / edit
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,
    /// Empty for an edit, `"add"` to attach a new license
    pub operation: String,
}

impl LicenseUpdate {
    pub fn valid() -> Self {
        let mut rng = rand::thread_rng();
        let len = rng.gen_range(9..=40);
        Self {
            number: Some(license_number(&mut rng, len)),
            effective_date: Some(format_date(past_date(&mut rng))),
            expiration_date: Some(format_date(future_date(&mut rng))),
            license_type: Some(pick(&mut rng, &UPDATE_LICENSE_TYPES).to_string()),
            operation: String::new(),
        }
    }

    /// Valid edit carrying a specific number: the customer's own, or one
    /// another customer already holds to provoke the duplicate path
    pub fn with_number(number: &str) -> Self {
        Self {
            number: Some(number.to_string()),
            ..Self::valid()
        }
    }

    pub fn invalid_type() -> Self {
        Self {
            license_type: Some("invalid_type".to_string()),
            ..Self::valid()
        }
    }

    /// Effective date in the future, expiration in the past
    pub fn inverted_dates() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            effective_date: Some(format_date(future_date(&mut rng))),
            expiration_date: Some(format_date(past_date(&mut rng))),
            ..Self::valid()
        }
    }

    pub fn missing_number() -> Self {
        Self {
            number: None,
            ..Self::valid()
        }
    }

    pub fn missing_dates() -> Self {
        Self {
            effective_date: None,
            expiration_date: None,
            ..Self::valid()
        }
    }

    pub fn missing_type() -> Self {
        Self {
            license_type: None,
            ..Self::valid()
        }
    }

    pub fn add_new() -> Self {
        Self {
            operation: "add".to_string(),
            ..Self::valid()
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn past_date<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
    let today = today();
    today
        .checked_sub_days(Days::new(rng.gen_range(1..=365)))
        .unwrap_or(today)
}

fn future_date<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
    let today = today();
    today
        .checked_add_days(Days::new(rng.gen_range(1..=365)))
        .unwrap_or(today)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ============================================================================
// Payment details
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    pub cadence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<u32>,
}

impl PaymentDetails {
    pub fn valid() -> Self {
        let mut rng = rand::thread_rng();
        let term = *pick(&mut rng, &PaymentTerm::ALL);
        Self {
            terms: Some(term.as_str().to_string()),
            cadence: term.cadence().to_string(),
            credit_limit: Some(rng.gen_range(1000..=10_000)),
        }
    }

    pub fn missing_terms() -> Self {
        Self {
            terms: None,
            cadence: PaymentTerm::Credit.cadence().to_string(),
            credit_limit: Some(rand::thread_rng().gen_range(1000..=10_000)),
        }
    }

    pub fn missing_credit_limit() -> Self {
        let term = *pick(&mut rand::thread_rng(), &PaymentTerm::ALL);
        Self {
            terms: Some(term.as_str().to_string()),
            cadence: PaymentTerm::Credit.cadence().to_string(),
            credit_limit: None,
        }
    }
}
