// ============================================================================
// Customer Flow E2E - polling orchestration for the customer API
// ============================================================================
//
// Layers, bottom up:
// - domain:  payloads, update commands, browse scenarios
// - api:     one-call-per-endpoint HTTP client
// - utils:   bounded status polling, transient-aware retry
// - flow:    create/update orchestration, verification, baseline seeding
//
// ============================================================================

pub mod api;
pub mod config;
pub mod domain;
pub mod flow;
pub mod metrics;
pub mod models;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use api::{ApiError, CustomerApiClient};
pub use config::{ApiConfig, ConfigError};
pub use flow::{FlowError, FlowKind, FlowOrchestrator};
