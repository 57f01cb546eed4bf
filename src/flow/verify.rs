use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::customer::CustomerPayload;
use crate::models::Customer;

// ============================================================================
// Customer Verification
// ============================================================================
//
// Compares a fetched customer against the payload that created it. The
// backend stores reference fields upper-cased and rewrites account names,
// so both sides are normalized before comparing. Mismatches are returned,
// never asserted.
//
// ============================================================================

static AMPERSAND_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:&|\bAND\b)\s*").expect("literal pattern compiles"));

/// Upper-case, turn `AND`/`&` with any surrounding whitespace into a single
/// ` & `, collapse remaining whitespace and trim.
pub fn canonical_account_name(name: &str) -> String {
    let upper = name.to_uppercase();
    let joined = AMPERSAND_SEPARATOR.replace_all(&upper, " & ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Which lookup produced the customer being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKey {
    GlobalId,
    LicenseNumber,
}

impl LookupKey {
    pub fn label(&self) -> &'static str {
        match self {
            LookupKey::GlobalId => "globalID",
            LookupKey::LicenseNumber => "alcoholLicenseNumber",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub lookup: LookupKey,
    pub field: &'static str,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (by {}): expected {:?}, got {:?}",
            self.field,
            self.lookup.label(),
            self.expected,
            self.actual
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationRules {
    /// Compare the account name against this instead of the payload's
    pub expected_account_name: Option<String>,
}

impl VerificationRules {
    pub fn expecting_account_name(name: impl Into<String>) -> Self {
        Self {
            expected_account_name: Some(name.into()),
        }
    }
}

pub fn verify_customer(
    customer: &Customer,
    payload: &CustomerPayload,
    global_id: &str,
    rules: &VerificationRules,
    lookup: LookupKey,
) -> Vec<FieldMismatch> {
    let mut mismatches = Vec::new();
    let mut check = |field: &'static str, expected: Option<String>, actual: Option<String>| {
        if expected != actual {
            mismatches.push(FieldMismatch {
                lookup,
                field,
                expected,
                actual,
            });
        }
    };

    let expected_name = rules
        .expected_account_name
        .as_deref()
        .or(payload.account_name.as_deref())
        .map(canonical_account_name);
    check(
        "accountName",
        expected_name,
        customer.account_name.as_deref().map(canonical_account_name),
    );

    check(
        "legalOwnerName",
        upper(payload.legal_owner_name.as_deref()),
        customer.legal_owner_name.clone(),
    );

    check(
        "licenses[0].number",
        payload.alcohol_license_number.clone(),
        customer.first_license().and_then(|l| l.number.clone()),
    );

    let sent = payload.first_address();
    let stored = customer.first_address();

    check(
        "addresses[0].city",
        upper(sent.and_then(|a| a.city.as_deref())),
        stored.and_then(|a| a.city.clone()),
    );
    check(
        "addresses[0].state",
        upper(sent.and_then(|a| a.state.as_deref())),
        stored.and_then(|a| a.state.clone()),
    );
    check(
        "addresses[0].postalCode",
        sent.and_then(|a| a.postal_code.clone()),
        stored.and_then(|a| a.postal_code.clone()),
    );
    check(
        "addresses[0].country",
        upper(sent.and_then(|a| a.country.as_deref())),
        stored.and_then(|a| a.country.clone()),
    );
    check(
        "addresses[0].county",
        upper(sent.and_then(|a| a.county.as_deref())),
        stored.and_then(|a| a.county.clone()),
    );

    check(
        "globalID",
        Some(global_id.to_string()),
        customer.global_id.clone(),
    );

    mismatches
}

fn upper(value: Option<&str>) -> Option<String> {
    value.map(str::to_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::generate_payload;
    use crate::test_support::stored_customer_body;

    fn stored(global_id: &str, payload: &CustomerPayload) -> Customer {
        let body = stored_customer_body(global_id, payload);
        serde_json::from_value(body["data"]["customer"].clone()).unwrap()
    }

    #[test]
    fn test_and_and_ampersand_canonicalize_identically() {
        assert_eq!(canonical_account_name("Smith AND Jones"), "SMITH & JONES");
        assert_eq!(canonical_account_name("Smith & Jones"), "SMITH & JONES");
        assert_eq!(canonical_account_name("smith and jones"), "SMITH & JONES");
        assert_eq!(canonical_account_name("Smith&Jones"), "SMITH & JONES");
        assert_eq!(canonical_account_name("  Smith   &   Jones  "), "SMITH & JONES");
    }

    #[test]
    fn test_and_inside_words_is_kept() {
        assert_eq!(canonical_account_name("Brandon Sandlin Co"), "BRANDON SANDLIN CO");
    }

    #[test]
    fn test_stored_customer_matches_payload() {
        let payload = generate_payload();
        let customer = stored("GID-1", &payload);

        let mismatches = verify_customer(
            &customer,
            &payload,
            "GID-1",
            &VerificationRules::default(),
            LookupKey::GlobalId,
        );
        assert!(mismatches.is_empty(), "{:?}", mismatches);
    }

    #[test]
    fn test_mismatches_name_field_and_values() {
        let payload = generate_payload();
        let mut customer = stored("GID-1", &payload);
        customer.addresses[0].postal_code = Some("00000".to_string());

        let mismatches = verify_customer(
            &customer,
            &payload,
            "GID-2",
            &VerificationRules::default(),
            LookupKey::LicenseNumber,
        );

        let fields: Vec<_> = mismatches.iter().map(|m| m.field).collect();
        assert_eq!(fields, vec!["addresses[0].postalCode", "globalID"]);
        assert_eq!(mismatches[1].expected.as_deref(), Some("GID-2"));
        assert_eq!(mismatches[1].actual.as_deref(), Some("GID-1"));
        assert_eq!(mismatches[1].lookup, LookupKey::LicenseNumber);
    }

    #[test]
    fn test_expected_account_name_override() {
        let mut payload = generate_payload();
        payload.account_name = Some("Smith and Jones".to_string());
        let mut customer = stored("GID-1", &payload);
        customer.account_name = Some("SMITH & JONES".to_string());

        let rules = VerificationRules::expecting_account_name("SMITH & JONES");
        assert!(verify_customer(&customer, &payload, "GID-1", &rules, LookupKey::GlobalId).is_empty());

        let rules = VerificationRules::expecting_account_name("SMITH & SONS");
        let mismatches = verify_customer(&customer, &payload, "GID-1", &rules, LookupKey::GlobalId);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].field, "accountName");
    }
}
