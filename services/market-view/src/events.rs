//! Market event definitions and frame decoding
//!
//! Defines the `MarketEvent` union for the three live-feed deltas and the
//! decoder for inbound push frames. Events carry no sequence numbers; the
//! channel's arrival order is the only ordering the reconciler relies on.

use rust_decimal::Decimal;
use serde::Deserialize;

use types::ids::{ListingId, Username};
use types::listing::ItemUnit;

/// Errors raised while decoding an inbound frame.
///
/// A decode error never tears down the connection; the frame is logged and
/// dropped by the channel.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed event frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{event_type} frame missing required field `{field}`")]
    MissingField {
        event_type: &'static str,
        field: &'static str,
    },
}

/// A live marketplace delta, in wire arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketEvent {
    /// A new listing went up for sale.
    List {
        id: ListingId,
        item_name: String,
        quantity: u32,
        price: Decimal,
        seller_name: Username,
        quality_score: Option<Decimal>,
        item_unit: Option<ItemUnit>,
    },

    /// Part (or all) of a listing was purchased. `quantity` is the amount
    /// bought, not the remaining amount.
    Buy {
        id: ListingId,
        quantity: u32,
        total_price: Option<Decimal>,
        seller_name: Option<Username>,
    },

    /// A listing was withdrawn by its seller.
    Cancel { id: ListingId },
}

impl MarketEvent {
    /// Event type as a string label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            MarketEvent::List { .. } => "LIST",
            MarketEvent::Buy { .. } => "BUY",
            MarketEvent::Cancel { .. } => "CANCEL",
        }
    }

    /// Listing id this event refers to.
    pub fn listing_id(&self) -> &ListingId {
        match self {
            MarketEvent::List { id, .. } => id,
            MarketEvent::Buy { id, .. } => id,
            MarketEvent::Cancel { id } => id,
        }
    }
}

/// Raw wire shape of a push frame. Every field except `type` is optional;
/// per-event requirements are enforced after the tag is known.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    id: Option<ListingId>,
    item_name: Option<String>,
    quantity: Option<u32>,
    price: Option<Decimal>,
    seller_name: Option<String>,
    quality_score: Option<Decimal>,
    item_unit: Option<String>,
    total_price: Option<Decimal>,
}

fn require<T>(
    value: Option<T>,
    event_type: &'static str,
    field: &'static str,
) -> Result<T, DecodeError> {
    value.ok_or(DecodeError::MissingField { event_type, field })
}

/// Decode a push frame into a `MarketEvent`.
///
/// Returns `Ok(None)` for unknown event types, which the channel ignores,
/// and `Err` for malformed JSON or a known type missing required fields.
pub fn decode_frame(payload: &str) -> Result<Option<MarketEvent>, DecodeError> {
    let frame: RawFrame = serde_json::from_str(payload)?;

    match frame.kind.as_str() {
        "LIST" => Ok(Some(MarketEvent::List {
            id: require(frame.id, "LIST", "id")?,
            item_name: require(frame.item_name, "LIST", "itemName")?,
            quantity: require(frame.quantity, "LIST", "quantity")?,
            price: require(frame.price, "LIST", "price")?,
            seller_name: Username::new(require(frame.seller_name, "LIST", "sellerName")?),
            quality_score: frame.quality_score,
            // Unknown unit strings degrade to the canonical default later.
            item_unit: frame.item_unit.as_deref().and_then(ItemUnit::from_str_lenient),
        })),
        "BUY" => Ok(Some(MarketEvent::Buy {
            id: require(frame.id, "BUY", "id")?,
            quantity: require(frame.quantity, "BUY", "quantity")?,
            total_price: frame.total_price,
            seller_name: frame.seller_name.map(Username::new),
        })),
        "CANCEL" => Ok(Some(MarketEvent::Cancel {
            id: require(frame.id, "CANCEL", "id")?,
        })),
        _ => Ok(None),
    }
}
