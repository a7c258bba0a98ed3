//! Core business logic - framework-agnostic fulfillment, pool, and catalog
//! operations.
//!
//! Every function takes an explicitly passed-in database handle so the core
//! can be driven from the HTTP layer, from tests against an in-memory
//! store, or from any future surface without global state.

/// License pool operations - claiming, importing, availability
pub mod license;
/// Order fulfillment, processing, and deletion
pub mod order;
/// Software catalog operations
pub mod software;
/// Software version (variant) operations
pub mod version;
