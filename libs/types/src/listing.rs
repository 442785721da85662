//! Market listing model
//!
//! A `Listing` is an active sell offer in the marketplace. The view only
//! ever contains active listings with a strictly positive quantity; a
//! listing whose quantity is exhausted is removed rather than kept at zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ListingError;
use crate::ids::{ListingId, Username};

/// Unit of measure for a listed item.
///
/// The wire format sends uppercase names; absent or unknown units fall back
/// to the canonical `Piece`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemUnit {
    #[default]
    Piece,
    Kg,
    Meter,
    Liter,
}

impl ItemUnit {
    /// Lenient parse: trims, uppercases, returns None for unknown values.
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PIECE" => Some(ItemUnit::Piece),
            "KG" => Some(ItemUnit::Kg),
            "METER" => Some(ItemUnit::Meter),
            "LITER" => Some(ItemUnit::Liter),
            _ => None,
        }
    }

    /// Uppercase wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemUnit::Piece => "PIECE",
            ItemUnit::Kg => "KG",
            ItemUnit::Meter => "METER",
            ItemUnit::Liter => "LITER",
        }
    }
}

/// Minimal reference to a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub name: String,
}

impl ItemRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// An active sell offer in the marketplace.
///
/// Invariant: `quantity > 0` while the listing is active. The quantity is
/// unsigned, so a negative displayed quantity is unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    pub item: ItemRef,
    pub quantity: u32,
    pub price: Decimal,
    pub seller: Username,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<Decimal>,
    #[serde(default)]
    pub item_unit: ItemUnit,
}

impl Listing {
    /// Build a validated listing.
    ///
    /// Rejects zero quantity and negative prices; the resulting listing is
    /// always active.
    pub fn try_new(
        id: ListingId,
        item: ItemRef,
        quantity: u32,
        price: Decimal,
        seller: Username,
    ) -> Result<Self, ListingError> {
        if quantity == 0 {
            return Err(ListingError::ZeroQuantity);
        }
        if price < Decimal::ZERO {
            return Err(ListingError::NegativePrice {
                price: price.to_string(),
            });
        }

        Ok(Self {
            id,
            item,
            quantity,
            price,
            seller,
            is_active: true,
            quality_score: None,
            item_unit: ItemUnit::default(),
        })
    }

    /// Attach a quality score (display-only attribute).
    pub fn with_quality_score(mut self, score: Decimal) -> Self {
        self.quality_score = Some(score);
        self
    }

    /// Override the unit of measure.
    pub fn with_unit(mut self, unit: ItemUnit) -> Self {
        self.item_unit = unit;
        self
    }
}
