use crate::utils::IsTransient;

// ============================================================================
// API Errors
// ============================================================================
//
// Only transport problems and loud lookup failures become errors. Submission
// rejections and accepted 500s are result values the caller inspects.
//
// ============================================================================

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection failures, timeouts, TLS errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{operation} rejected the API key (HTTP {status})")]
    Unauthorized { operation: &'static str, status: u16 },

    #[error("{operation} failed with HTTP {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("No customer in get-customer response for {key}")]
    MissingCustomer { key: String },
}

impl ApiError {
    /// Map a non-success status to the matching error variant
    pub(crate) fn from_status(operation: &'static str, status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized { operation, status },
            _ => ApiError::UnexpectedStatus {
                operation,
                status,
                body,
            },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            ApiError::Unauthorized { status, .. } | ApiError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            ApiError::Json(_) | ApiError::MissingCustomer { .. } => None,
        }
    }
}

impl IsTransient for ApiError {
    fn is_transient(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::UnexpectedStatus { status, .. } => *status >= 500,
            // Eventual consistency: the customer may not be readable yet
            ApiError::MissingCustomer { .. } => true,
            ApiError::Unauthorized { .. } | ApiError::Json(_) => false,
        }
    }
}
