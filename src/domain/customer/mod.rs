// ============================================================================
// Customer Domain - everything the harness sends to the customer API
// ============================================================================
//
// - Value objects (distribution channel, addresses, location table)
// - Payload (create body, randomized generation, invalid variants)
// - Commands (update action bodies)
// - Browse payloads
// - Errors (local constraint violations)
//
// ============================================================================

pub mod value_objects;
pub mod payload;
pub mod commands;
pub mod browse;
pub mod errors;

// Re-export for convenience
pub use value_objects::*;
pub use payload::{
    base_payload, generate_invalid_payload, generate_payload, generate_payload_with,
    CustomerPayload, InvalidVariant, PayloadLimits,
};
pub use commands::*;
pub use browse::*;
pub use errors::*;
