// ============================================================================
// Domain Layer - request bodies and their local constraints
// ============================================================================
//
// Nothing in here talks to the network; the API client serializes these
// types and the flows decide what to send.
//
// ============================================================================

pub mod customer;
