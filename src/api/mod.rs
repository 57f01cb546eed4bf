// ============================================================================
// Customer API - HTTP action client and its error type
// ============================================================================

pub mod client;
pub mod error;

pub use client::{
    BrowseResponse, CustomerApiClient, CustomerLookup, LicenseLookup, RequestLookup,
    SubmissionResponse, UpdateRequestLookup,
};
pub use error::{ApiError, ApiResult};
