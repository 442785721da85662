//! Error types for listing construction
//!
//! Validation errors surfaced when building a `Listing` from untrusted
//! input, using thiserror.

use thiserror::Error;

/// Listing validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("Listing quantity must be positive")]
    ZeroQuantity,

    #[error("Listing price must be non-negative: {price}")]
    NegativePrice { price: String },
}
