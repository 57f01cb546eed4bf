// ============================================================================
// Customer Payload Constraint Violations
// ============================================================================
//
// Reported by the local constraint checker. Each invalid payload variant is
// built to trip exactly one of these.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadViolation {
    #[error("Account name cannot be empty")]
    EmptyAccountName,

    #[error("Account name exceeds {max} characters (got {len})")]
    AccountNameTooLong { len: usize, max: usize },

    #[error("Legal owner name exceeds {max} characters (got {len})")]
    LegalOwnerNameTooLong { len: usize, max: usize },

    #[error("Distribution channel is missing")]
    MissingDistributionChannel,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Alcohol license number exceeds {max} characters (got {len})")]
    LicenseNumberTooLong { len: usize, max: usize },

    #[error("Alcohol license number cannot be empty")]
    EmptyLicenseNumber,

    #[error("Unsupported state code: {0}")]
    UnsupportedState(String),

    #[error("License type {license_type} is not allowed in {state}")]
    LicenseTypeNotAllowed { license_type: String, state: String },

    #[error("At least one address is required")]
    MissingAddress,
}
