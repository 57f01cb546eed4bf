use rand::Rng;
use serde::Serialize;

use super::payload::pick;

// ============================================================================
// Browse Customer Payloads
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowsePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<String>,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<String>,
}

/// Fixture values the browse scenarios are built from
#[derive(Debug, Clone)]
pub struct BrowseFixtures {
    pub page_size: u32,
    pub valid_state: String,
    pub account_name_filter: String,
    pub license_filter: String,
    pub sort_token_time: String,
    pub sort_token_account_name: String,
}

impl Default for BrowseFixtures {
    fn default() -> Self {
        Self {
            page_size: 10,
            valid_state: "AR".to_string(),
            account_name_filter: "Test Account".to_string(),
            license_filter: "BQ1116872".to_string(),
            sort_token_time: "time".to_string(),
            sort_token_account_name: "accountName".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseScenario {
    ValidStateOnly,
    ValidStateWithAccountName,
    ValidStateWithLicense,
    ValidStateWithNonMatchingFilter,
    ValidStateWithUnsupportedFilter,
    InvalidState,
    MissingState,
    /// Same body as `ValidStateOnly`; sent with a bad API key
    Unauthorized,
}

impl BrowseScenario {
    pub const ALL: [BrowseScenario; 8] = [
        BrowseScenario::ValidStateOnly,
        BrowseScenario::ValidStateWithAccountName,
        BrowseScenario::ValidStateWithLicense,
        BrowseScenario::ValidStateWithNonMatchingFilter,
        BrowseScenario::ValidStateWithUnsupportedFilter,
        BrowseScenario::InvalidState,
        BrowseScenario::MissingState,
        BrowseScenario::Unauthorized,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BrowseScenario::ValidStateOnly => "validStateOnly",
            BrowseScenario::ValidStateWithAccountName => "validStateWithAccountName",
            BrowseScenario::ValidStateWithLicense => "validStateWithLicense",
            BrowseScenario::ValidStateWithNonMatchingFilter => "validStateWithNonMatchingFilter",
            BrowseScenario::ValidStateWithUnsupportedFilter => "validStateWithUnsupportedFilter",
            BrowseScenario::InvalidState => "invalidState",
            BrowseScenario::MissingState => "missingState",
            BrowseScenario::Unauthorized => "unauthorized",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        BrowseScenario::ALL.into_iter().find(|s| s.name() == name)
    }
}

pub fn generate_browse_payload(scenario: BrowseScenario, fixtures: &BrowseFixtures) -> BrowsePayload {
    generate_browse_payload_with(&mut rand::thread_rng(), scenario, fixtures)
}

pub fn generate_browse_payload_with<R: Rng + ?Sized>(
    rng: &mut R,
    scenario: BrowseScenario,
    fixtures: &BrowseFixtures,
) -> BrowsePayload {
    // Blank sort settings are valid and leave ordering to the backend.
    let sort_tokens = [
        "",
        fixtures.sort_token_time.as_str(),
        fixtures.sort_token_account_name.as_str(),
    ];
    let sort_directions = ["", "asc", "desc"];

    let base = BrowsePayload {
        sort_token: Some(pick(rng, &sort_tokens).to_string()),
        sort_direction: Some(pick(rng, &sort_directions).to_string()),
        page_size: fixtures.page_size,
        state: None,
        filter_value: None,
    };
    let valid_state = Some(fixtures.valid_state.clone());

    match scenario {
        BrowseScenario::ValidStateOnly | BrowseScenario::Unauthorized => BrowsePayload {
            state: valid_state,
            ..base
        },
        BrowseScenario::ValidStateWithAccountName => BrowsePayload {
            state: valid_state,
            filter_value: Some(fixtures.account_name_filter.clone()),
            ..base
        },
        BrowseScenario::ValidStateWithLicense => BrowsePayload {
            state: valid_state,
            filter_value: Some(fixtures.license_filter.clone()),
            ..base
        },
        BrowseScenario::ValidStateWithNonMatchingFilter => BrowsePayload {
            state: valid_state,
            filter_value: Some("NONEXISTENT".to_string()),
            ..base
        },
        BrowseScenario::ValidStateWithUnsupportedFilter => BrowsePayload {
            state: valid_state,
            filter_value: Some("InvalidKey".to_string()),
            ..base
        },
        BrowseScenario::InvalidState => BrowsePayload {
            state: Some("ZZ".to_string()),
            filter_value: Some(fixtures.account_name_filter.clone()),
            ..base
        },
        BrowseScenario::MissingState => BrowsePayload {
            filter_value: Some(fixtures.account_name_filter.clone()),
            ..base
        },
    }
}
