use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::AddressType;

use super::errors::PayloadViolation;
use super::value_objects::*;

// ============================================================================
// Customer Payload - the record submitted to create a customer
// ============================================================================

/// Length ceilings the backend enforces asynchronously.
///
/// The license bound is inferred from observed behaviour (40 accepted, 41
/// rejected), so it stays configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLimits {
    pub max_license_number_len: usize,
    pub max_name_len: usize,
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self {
            max_license_number_len: 40,
            max_name_len: 100,
        }
    }
}

const MIN_LICENSE_NUMBER_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub account_name: Option<String>,
    pub legal_owner_name: Option<String>,
    pub distribution_channel: Option<DistributionChannel>,
    #[serde(rename = "Address")]
    pub addresses: Vec<PayloadAddress>,
    pub contact_first_name: Option<String>,
    pub contact_last_name: Option<String>,
    pub primary_email: Option<String>,
    pub phone: Option<String>,
    pub alcohol_license_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_type: Option<String>,
}

/// Structurally valid default instance with every text field blank
pub fn base_payload() -> CustomerPayload {
    CustomerPayload {
        account_name: Some(String::new()),
        legal_owner_name: Some(String::new()),
        distribution_channel: Some(DistributionChannel::OffPremise),
        addresses: vec![PayloadAddress {
            address_type: Some(AddressType::Shipping.as_str().to_string()),
            address_line1: Some(String::new()),
            city: Some(String::new()),
            county: Some(String::new()),
            state: Some(String::new()),
            postal_code: Some(String::new()),
            country: Some("US".to_string()),
        }],
        contact_first_name: Some(String::new()),
        contact_last_name: Some(String::new()),
        primary_email: Some(String::new()),
        phone: Some(String::new()),
        alcohol_license_number: Some(String::new()),
        license_type: Some(String::new()),
    }
}

/// Fresh randomized payload; every call produces new contact, address and license data
pub fn generate_payload() -> CustomerPayload {
    generate_payload_with(&mut rand::thread_rng(), &PayloadLimits::default())
}

pub fn generate_payload_with<R: Rng + ?Sized>(rng: &mut R, limits: &PayloadLimits) -> CustomerPayload {
    let mut payload = base_payload();

    let first_name = pick(rng, &FIRST_NAMES).to_string();
    let last_name = pick(rng, &LAST_NAMES).to_string();
    let location = *pick(rng, &US_LOCATIONS);

    payload.account_name = Some(company_name(rng));
    payload.legal_owner_name = Some(format!("{} LLC", company_name(rng)));
    payload.distribution_channel = Some(*pick(rng, &DistributionChannel::ALL));

    if let Some(address) = payload.addresses.first_mut() {
        address.address_line1 = Some(street_address(rng));
        address.city = Some(location.city.to_string());
        address.county = Some(location.county.to_string());
        address.state = Some(location.state.to_string());
        address.postal_code = Some(location.postal_code.to_string());
        address.country = Some("US".to_string());
    }

    payload.primary_email = Some(email_for(rng, &first_name, &last_name));
    payload.contact_first_name = Some(first_name);
    payload.contact_last_name = Some(last_name);
    payload.phone = Some(national_phone(rng));

    let max_len = limits.max_license_number_len.max(MIN_LICENSE_NUMBER_LEN);
    let len = rng.gen_range(MIN_LICENSE_NUMBER_LEN..=max_len);
    payload.alcohol_license_number = Some(license_number(rng, len));

    payload.license_type = Some(if location.state == "TN" {
        TN_LICENSE_TYPE.to_string()
    } else {
        pick(rng, &CREATE_LICENSE_TYPES).to_string()
    });

    payload
}

// ============================================================================
// Negative-path variants
// ============================================================================

/// Ways to break an otherwise valid payload, one constraint at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidVariant {
    MissingAccountName,
    InvalidEmail,
    InvalidPhone,
    OversizedLicenseNumber,
    OversizedLegalOwnerName,
    OversizedAccountName,
    UnsupportedState,
    NullDistributionChannel,
}

impl InvalidVariant {
    pub const ALL: [InvalidVariant; 8] = [
        InvalidVariant::MissingAccountName,
        InvalidVariant::InvalidEmail,
        InvalidVariant::InvalidPhone,
        InvalidVariant::OversizedLicenseNumber,
        InvalidVariant::OversizedLegalOwnerName,
        InvalidVariant::OversizedAccountName,
        InvalidVariant::UnsupportedState,
        InvalidVariant::NullDistributionChannel,
    ];

    pub fn apply(self, mut payload: CustomerPayload, limits: &PayloadLimits) -> CustomerPayload {
        match self {
            InvalidVariant::MissingAccountName => payload.account_name = Some(String::new()),
            InvalidVariant::InvalidEmail => {
                payload.primary_email = Some("dave.chappellecontact.com".to_string())
            }
            InvalidVariant::InvalidPhone => payload.phone = Some("(512)234-TEST".to_string()),
            InvalidVariant::OversizedLicenseNumber => {
                payload.alcohol_license_number =
                    Some("L".repeat(limits.max_license_number_len + 1))
            }
            InvalidVariant::OversizedLegalOwnerName => {
                payload.legal_owner_name = Some("L".repeat(limits.max_name_len + 1))
            }
            InvalidVariant::OversizedAccountName => {
                payload.account_name = Some("L".repeat(limits.max_name_len + 1))
            }
            InvalidVariant::UnsupportedState => {
                if let Some(address) = payload.addresses.first_mut() {
                    address.state = Some("ZZ".to_string());
                }
                // Keep the license type valid for any state so only the state is wrong.
                payload.license_type = Some(TN_LICENSE_TYPE.to_string());
            }
            InvalidVariant::NullDistributionChannel => payload.distribution_channel = None,
        }
        payload
    }
}

pub fn generate_invalid_payload(variant: InvalidVariant, limits: &PayloadLimits) -> CustomerPayload {
    variant.apply(generate_payload_with(&mut rand::thread_rng(), limits), limits)
}

impl CustomerPayload {
    pub fn first_address(&self) -> Option<&PayloadAddress> {
        self.addresses.first()
    }

    pub fn state(&self) -> Option<&str> {
        self.first_address().and_then(|a| a.state.as_deref())
    }

    /// Every constraint this payload breaks, checked locally
    pub fn violations(&self, limits: &PayloadLimits) -> Vec<PayloadViolation> {
        let mut violations = Vec::new();

        match self.account_name.as_deref().map(str::trim) {
            None | Some("") => violations.push(PayloadViolation::EmptyAccountName),
            Some(name) if name.chars().count() > limits.max_name_len => {
                violations.push(PayloadViolation::AccountNameTooLong {
                    len: name.chars().count(),
                    max: limits.max_name_len,
                })
            }
            Some(_) => {}
        }

        if let Some(owner) = self.legal_owner_name.as_deref() {
            let len = owner.chars().count();
            if len > limits.max_name_len {
                violations.push(PayloadViolation::LegalOwnerNameTooLong {
                    len,
                    max: limits.max_name_len,
                });
            }
        }

        if self.distribution_channel.is_none() {
            violations.push(PayloadViolation::MissingDistributionChannel);
        }

        if let Some(email) = self.primary_email.as_deref().filter(|e| !e.is_empty()) {
            if !is_valid_email(email) {
                violations.push(PayloadViolation::InvalidEmail(email.to_string()));
            }
        }

        if let Some(phone) = self.phone.as_deref().filter(|p| !p.is_empty()) {
            if !is_valid_phone(phone) {
                violations.push(PayloadViolation::InvalidPhone(phone.to_string()));
            }
        }

        match self.alcohol_license_number.as_deref() {
            None | Some("") => violations.push(PayloadViolation::EmptyLicenseNumber),
            Some(number) if number.chars().count() > limits.max_license_number_len => {
                violations.push(PayloadViolation::LicenseNumberTooLong {
                    len: number.chars().count(),
                    max: limits.max_license_number_len,
                })
            }
            Some(_) => {}
        }

        match self.state() {
            _ if self.addresses.is_empty() => violations.push(PayloadViolation::MissingAddress),
            Some(state) if !state.is_empty() && !is_supported_state(state) => {
                violations.push(PayloadViolation::UnsupportedState(state.to_string()))
            }
            Some("TN") => {
                if let Some(license_type) = self.license_type.as_deref() {
                    if license_type != TN_LICENSE_TYPE {
                        violations.push(PayloadViolation::LicenseTypeNotAllowed {
                            license_type: license_type.to_string(),
                            state: "TN".to_string(),
                        });
                    }
                }
            }
            _ => {}
        }

        violations
    }
}

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        _ => false,
    }
}

fn is_valid_phone(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    digits >= 7
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '(' | ')' | '-' | '+' | '.'))
}

// ============================================================================
// Random data helpers
// ============================================================================

pub(crate) fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

pub(crate) fn company_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = pick(rng, &COMPANY_WORDS);
    let suffix = pick(rng, &COMPANY_SUFFIXES);
    match rng.gen_range(0..3) {
        0 => format!("{} {}", first, suffix),
        1 => format!("{} & {} {}", first, pick(rng, &COMPANY_WORDS), suffix),
        _ => format!("{} and {}", first, pick(rng, &COMPANY_WORDS)),
    }
}

pub(crate) fn street_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", rng.gen_range(100..10_000), pick(rng, &STREET_NAMES))
}

pub(crate) fn email_for<R: Rng + ?Sized>(rng: &mut R, first: &str, last: &str) -> String {
    format!(
        "{}.{}{}@{}",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.gen_range(10..10_000),
        pick(rng, &EMAIL_DOMAINS)
    )
}

pub(crate) fn national_phone<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "({}) {}-{:04}",
        rng.gen_range(201..990),
        rng.gen_range(200..1000),
        rng.gen_range(0..10_000)
    )
}

/// Upper-case alphanumeric license number of exactly `len` characters
pub(crate) fn license_number<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_uppercase())
        .collect()
}
