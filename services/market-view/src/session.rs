//! Collaborator seams for the reconciler
//!
//! The reconciler is constructed with these injected collaborators instead
//! of reaching for process-wide singletons, so tests can observe side
//! effects and multiple independent views can coexist.

use rust_decimal::Decimal;

use crate::format::format_currency;

/// Authenticated-user collaborator.
///
/// Identity lookup plus a fire-and-forget balance refresh; the engine never
/// owns account state.
pub trait Session: Send + Sync {
    /// Username of the locally authenticated user.
    fn username(&self) -> &str;

    /// Request a balance refresh (e.g. after a self-sale). Fire-and-forget.
    fn refresh_balance(&self);
}

/// Where a feedback notification appears on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPosition {
    pub x: f32,
    pub y: f32,
}

impl ScreenPosition {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Normalized screen center; the sink maps it to real coordinates.
    pub const fn center() -> Self {
        Self::new(0.5, 0.5)
    }
}

/// Visual style of a feedback notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackStyle {
    /// Accent color as a hex string.
    pub color: &'static str,
}

impl FeedbackStyle {
    /// Green accent used for incoming money.
    pub const fn gain() -> Self {
        Self { color: "#10b981" }
    }
}

/// Audio/visual feedback collaborator. Fire-and-forget; the engine never
/// consumes a return value.
pub trait FeedbackSink: Send + Sync {
    fn notify(&self, amount_formatted: &str, position: ScreenPosition, style: FeedbackStyle);
}

/// Render the proceeds of a sale for the feedback overlay.
pub fn sale_proceeds_text(total_price: Decimal) -> String {
    format!("+{}", format_currency(total_price))
}
