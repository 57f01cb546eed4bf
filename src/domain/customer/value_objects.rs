use serde::{Deserialize, Serialize};

// ============================================================================
// Customer Value Objects
// ============================================================================

/// Sales channel the account buys through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ChannelWire", try_from = "ChannelWire")]
pub enum DistributionChannel {
    OffPremise,
    OnPremise,
}

impl DistributionChannel {
    pub const ALL: [DistributionChannel; 2] =
        [DistributionChannel::OffPremise, DistributionChannel::OnPremise];

    pub fn code(&self) -> &'static str {
        match self {
            DistributionChannel::OffPremise => "20",
            DistributionChannel::OnPremise => "10",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistributionChannel::OffPremise => "Off Premise",
            DistributionChannel::OnPremise => "On Premise",
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ChannelWire {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Name")]
    name: String,
}

impl From<DistributionChannel> for ChannelWire {
    fn from(channel: DistributionChannel) -> Self {
        Self {
            code: channel.code().to_string(),
            name: channel.name().to_string(),
        }
    }
}

impl TryFrom<ChannelWire> for DistributionChannel {
    type Error = String;

    fn try_from(wire: ChannelWire) -> Result<Self, Self::Error> {
        DistributionChannel::ALL
            .into_iter()
            .find(|c| c.code() == wire.code)
            .ok_or_else(|| format!("unknown distribution channel code {}", wire.code))
    }
}

/// Address as submitted on customer creation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadAddress {
    pub address_type: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

/// A city the backend accepts, with its county and postal code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationEntry {
    pub state: &'static str,
    pub city: &'static str,
    pub county: &'static str,
    pub postal_code: &'static str,
}

/// Locations the QA backend is provisioned for
pub const US_LOCATIONS: [LocationEntry; 2] = [
    LocationEntry { state: "AR", city: "Bentonville", county: "Benton", postal_code: "72712" },
    LocationEntry { state: "TN", city: "Murfreesboro", county: "Rutherford", postal_code: "37130" },
];

pub fn is_supported_state(state: &str) -> bool {
    US_LOCATIONS.iter().any(|l| l.state == state)
}

/// License type submitted with a new customer. TN only accepts "8".
pub const CREATE_LICENSE_TYPES: [&str; 3] = ["5A", "3A", "8"];
pub const TN_LICENSE_TYPE: &str = "8";

/// License type codes accepted by the license add/edit actions
pub const UPDATE_LICENSE_TYPES: [&str; 18] = [
    "AL", "B", "CC", "CL", "HR", "IA", "L", "LD", "LP", "LR", "M", "MA", "MD", "ML", "N", "NA",
    "NO", "PC",
];

pub const DROP_POINT_NAMES: [&str; 7] = [
    "Garage",
    "Front Doorstep",
    "Back Doorstep",
    "Dock",
    "Back Porch",
    "Mailbox",
    "Reception",
];

/// Payment term with the cadence code the backend pairs it with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTerm {
    Credit,
    Cod,
}

impl PaymentTerm {
    pub const ALL: [PaymentTerm; 2] = [PaymentTerm::Credit, PaymentTerm::Cod];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentTerm::Credit => "credit",
            PaymentTerm::Cod => "cod",
        }
    }

    pub fn cadence(&self) -> &'static str {
        match self {
            PaymentTerm::Credit => "NT15",
            PaymentTerm::Cod => "CCOD",
        }
    }
}

// Word pools for generated contact and company data

pub(crate) const FIRST_NAMES: [&str; 16] = [
    "Olivia", "Liam", "Emma", "Noah", "Ava", "Elijah", "Sophia", "James", "Isabella", "Lucas",
    "Mia", "Mason", "Harper", "Ethan", "Amelia", "Logan",
];

pub(crate) const LAST_NAMES: [&str; 16] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Wilson", "Anderson", "Thomas", "Taylor",
];

pub(crate) const COMPANY_WORDS: [&str; 16] = [
    "Summit", "Riverbend", "Oak", "Harbor", "Pioneer", "Granite", "Cedar", "Liberty", "Copper",
    "Prairie", "Lakeside", "Highland", "Maple", "Frontier", "Heritage", "Crescent",
];

pub(crate) const COMPANY_SUFFIXES: [&str; 6] =
    ["Spirits", "Beverages", "Market", "Liquors", "Wine Shop", "Provisions"];

pub(crate) const STREET_NAMES: [&str; 10] = [
    "Main St", "Oak Ave", "Walnut St", "Elm St", "Maple Dr", "Cedar Ln", "Park Ave", "Lake Rd",
    "Hill St", "Church St",
];

pub(crate) const EMAIL_DOMAINS: [&str; 4] = ["example.com", "example.net", "example.org", "test.com"];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_distribution_channel_wire_shape() {
        let value = serde_json::to_value(DistributionChannel::OffPremise).unwrap();
        assert_eq!(value, json!({"Code": "20", "Name": "Off Premise"}));

        let parsed: DistributionChannel =
            serde_json::from_value(json!({"Code": "10", "Name": "On Premise"})).unwrap();
        assert_eq!(parsed, DistributionChannel::OnPremise);

        let bad = serde_json::from_value::<DistributionChannel>(json!({"Code": "99", "Name": "?"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_payment_term_cadence() {
        assert_eq!(PaymentTerm::Credit.cadence(), "NT15");
        assert_eq!(PaymentTerm::Cod.cadence(), "CCOD");
    }

    #[test]
    fn test_supported_states() {
        assert!(is_supported_state("TN"));
        assert!(is_supported_state("AR"));
        assert!(!is_supported_state("ZZ"));
    }
}
