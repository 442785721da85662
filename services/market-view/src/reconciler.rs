//! Market event reconciler
//!
//! The scope-aware merge policy: applies each live event to the snapshot
//! store in arrival order. LIST events only touch the live scope; BUY and
//! CANCEL apply to whatever page is loaded, since a listing visible on any
//! page may be purchased or withdrawn while the user is looking at it.
//!
//! Events are applied exactly as delivered: no deduplication and no
//! reordering. A redelivered BUY double-decrements; the stream is assumed
//! not to redeliver.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use types::ids::Username;
use types::listing::{ItemRef, Listing};

use crate::events::MarketEvent;
use crate::gateway::ListingPage;
use crate::scope::ViewScope;
use crate::session::{sale_proceeds_text, FeedbackSink, FeedbackStyle, ScreenPosition, Session};
use crate::store::{PurchaseOutcome, SnapshotStore};

/// Owns the snapshot store and scope state; all mutation flows through
/// this type on a single logical thread of control.
pub struct Reconciler {
    store: SnapshotStore,
    scope: ViewScope,
    session: Arc<dyn Session>,
    feedback: Arc<dyn FeedbackSink>,
}

impl Reconciler {
    pub fn new(
        page_size: usize,
        session: Arc<dyn Session>,
        feedback: Arc<dyn FeedbackSink>,
    ) -> Self {
        Self {
            store: SnapshotStore::new(page_size),
            scope: ViewScope::new(),
            session,
            feedback,
        }
    }

    /// Read access for rendering.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Apply one live event in arrival order.
    pub fn apply(&mut self, event: MarketEvent) {
        match event {
            MarketEvent::List {
                id,
                item_name,
                quantity,
                price,
                seller_name,
                quality_score,
                item_unit,
            } => {
                if !self.scope.is_live() {
                    debug!(
                        listing_id = %id,
                        page = self.scope.page(),
                        search = self.scope.search(),
                        "Ignoring LIST outside live scope"
                    );
                    return;
                }

                let listing = match Listing::try_new(
                    id,
                    ItemRef::new(item_name),
                    quantity,
                    price,
                    seller_name,
                ) {
                    Ok(listing) => listing,
                    Err(err) => {
                        warn!(listing_id = %id, error = %err, "Dropping invalid LIST event");
                        return;
                    }
                };
                let listing = match quality_score {
                    Some(score) => listing.with_quality_score(score),
                    None => listing,
                };
                let listing = listing.with_unit(item_unit.unwrap_or_default());

                self.store.insert_front(listing);
                debug!(listing_id = %id, rows = self.store.len(), "Inserted live listing");
            }

            MarketEvent::Buy {
                id,
                quantity,
                total_price,
                seller_name,
            } => {
                // In-view update happens regardless of scope.
                match self.store.apply_purchase(&id, quantity) {
                    PurchaseOutcome::Reduced(remaining) => {
                        debug!(listing_id = %id, remaining, "Purchase reduced listing")
                    }
                    PurchaseOutcome::SoldOut => {
                        debug!(listing_id = %id, "Purchase sold out listing")
                    }
                    PurchaseOutcome::NotFound => {
                        debug!(listing_id = %id, "Purchase for listing outside view")
                    }
                }

                // Self-sale feedback fires whether or not the row was in view.
                if let Some(seller) = seller_name {
                    self.dispatch_self_sale(&seller, total_price);
                }
            }

            MarketEvent::Cancel { id } => {
                let removed = self.store.remove(&id);
                debug!(listing_id = %id, removed, "Cancel applied");
            }
        }
    }

    fn dispatch_self_sale(&self, seller: &Username, total_price: Option<Decimal>) {
        if seller.as_str() != self.session.username() {
            return;
        }

        let proceeds = total_price.unwrap_or(Decimal::ZERO);
        info!(proceeds = %proceeds, "Self-sale detected");
        self.feedback.notify(
            &sale_proceeds_text(proceeds),
            ScreenPosition::center(),
            FeedbackStyle::gain(),
        );
        self.session.refresh_balance();
    }

    /// Record a scope change and overwrite the snapshot with a freshly
    /// pulled page. Called only after the pull has succeeded, so a failed
    /// pull leaves both scope and store untouched.
    pub(crate) fn accept_pull(&mut self, page: u32, search: String, pulled: ListingPage) {
        self.scope.set(page, search);
        self.store.replace(pulled.content, pulled.total_pages);
    }
}
