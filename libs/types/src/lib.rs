//! Types library for the marketplace client
//!
//! This library provides the core type definitions shared by the marketplace
//! view components, ensuring type safety and a single source of truth for
//! the listing model.
//!
//! # Modules
//! - `ids`: Unique identifiers (ListingId, Username)
//! - `listing`: Market listing model and item units
//! - `errors`: Error taxonomy for listing construction

// Public modules
pub mod errors;
pub mod ids;
pub mod listing;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::listing::*;
}
