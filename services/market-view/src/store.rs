//! Snapshot store for the rendered listing page
//!
//! Holds the ordered sequence of listings for the current scope plus the
//! `total_pages` count from the last pull. Mutated only by the scope
//! controller (full replace) and the reconciler (incremental merges);
//! everything else gets read access.

use tracing::debug;

use types::ids::ListingId;
use types::listing::Listing;

/// Outcome of applying a purchase to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Quantity reduced; listing stays with the remaining amount.
    Reduced(u32),
    /// Quantity exhausted; listing removed from the store.
    SoldOut,
    /// Listing not in the current view; nothing to update.
    NotFound,
}

/// The in-memory page of listings currently rendered.
///
/// Ordered reverse-chronologically: newest first. Length never exceeds
/// `page_size`: live inserts drop the oldest visible row instead of
/// growing the page.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    listings: Vec<Listing>,
    total_pages: u32,
    page_size: usize,
}

impl SnapshotStore {
    /// Create an empty store with a fixed positive page size.
    pub fn new(page_size: usize) -> Self {
        assert!(page_size > 0, "page_size must be positive");
        Self {
            listings: Vec::with_capacity(page_size),
            total_pages: 0,
            page_size,
        }
    }

    /// Authoritative overwrite from a snapshot pull. Any rows beyond the
    /// page size are truncated defensively; the server owns page slicing.
    pub fn replace(&mut self, mut content: Vec<Listing>, total_pages: u32) {
        content.truncate(self.page_size);
        debug!(
            rows = content.len(),
            total_pages, "Replacing snapshot contents"
        );
        self.listings = content;
        self.total_pages = total_pages;
    }

    /// Insert a listing at the front of the feed, evicting the last row
    /// when the page cap is exceeded.
    pub fn insert_front(&mut self, listing: Listing) {
        self.listings.insert(0, listing);
        if self.listings.len() > self.page_size {
            self.listings.pop();
        }
    }

    /// Remove a listing by id. Returns whether anything was removed;
    /// removing an absent id is a no-op, so removal is idempotent.
    pub fn remove(&mut self, id: &ListingId) -> bool {
        let before = self.listings.len();
        self.listings.retain(|l| &l.id != id);
        before != self.listings.len()
    }

    /// Subtract a purchased amount from a listing's quantity.
    ///
    /// An exhausted listing is removed entirely, so the store never holds
    /// a row with zero (or negative) quantity.
    pub fn apply_purchase(&mut self, id: &ListingId, amount: u32) -> PurchaseOutcome {
        let Some(listing) = self.listings.iter_mut().find(|l| &l.id == id) else {
            return PurchaseOutcome::NotFound;
        };

        if amount >= listing.quantity {
            self.remove(id);
            PurchaseOutcome::SoldOut
        } else {
            listing.quantity -= amount;
            PurchaseOutcome::Reduced(listing.quantity)
        }
    }

    /// Rendered rows, newest first.
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// Look up a listing by id.
    pub fn get(&self, id: &ListingId) -> Option<&Listing> {
        self.listings.iter().find(|l| &l.id == id)
    }

    /// Number of rendered rows.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the page is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Page count reported by the last successful pull.
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Fixed page cap.
    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use types::ids::Username;
    use types::listing::ItemRef;

    fn listing(name: &str, quantity: u32) -> Listing {
        Listing::try_new(
            ListingId::new(),
            ItemRef::new(name),
            quantity,
            Decimal::from(10),
            Username::new("seller"),
        )
        .unwrap()
    }

    #[test]
    fn test_replace_is_authoritative() {
        let mut store = SnapshotStore::new(4);
        store.insert_front(listing("Old", 1));

        let fresh = vec![listing("A", 2), listing("B", 3)];
        store.replace(fresh.clone(), 7);

        assert_eq!(store.listings(), fresh.as_slice());
        assert_eq!(store.total_pages(), 7);
    }

    #[test]
    fn test_replace_truncates_to_page_size() {
        let mut store = SnapshotStore::new(2);
        store.replace(vec![listing("A", 1), listing("B", 1), listing("C", 1)], 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_insert_front_orders_newest_first() {
        let mut store = SnapshotStore::new(3);
        let a = listing("A", 1);
        let b = listing("B", 1);
        store.insert_front(a.clone());
        store.insert_front(b.clone());

        assert_eq!(store.listings()[0].id, b.id);
        assert_eq!(store.listings()[1].id, a.id);
    }

    #[test]
    fn test_insert_front_enforces_cap() {
        let mut store = SnapshotStore::new(2);
        let a = listing("A", 1);
        let b = listing("B", 1);
        let c = listing("C", 1);
        store.insert_front(a.clone());
        store.insert_front(b.clone());
        store.insert_front(c.clone());

        assert_eq!(store.len(), 2);
        assert_eq!(store.listings()[0].id, c.id);
        assert_eq!(store.listings()[1].id, b.id);
        assert!(store.get(&a.id).is_none(), "oldest row should be evicted");
    }

    #[test]
    fn test_partial_purchase_reduces_quantity() {
        let mut store = SnapshotStore::new(4);
        let l = listing("Wheat", 5);
        let id = l.id;
        store.insert_front(l);

        assert_eq!(store.apply_purchase(&id, 2), PurchaseOutcome::Reduced(3));
        assert_eq!(store.get(&id).unwrap().quantity, 3);
    }

    #[test]
    fn test_exact_purchase_removes_listing() {
        let mut store = SnapshotStore::new(4);
        let l = listing("Wheat", 5);
        let id = l.id;
        store.insert_front(l);

        assert_eq!(store.apply_purchase(&id, 5), PurchaseOutcome::SoldOut);
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn test_over_purchase_removes_listing() {
        let mut store = SnapshotStore::new(4);
        let l = listing("Wheat", 5);
        let id = l.id;
        store.insert_front(l);

        // More bought than visible (stale view): still just removal,
        // never a negative quantity.
        assert_eq!(store.apply_purchase(&id, 9), PurchaseOutcome::SoldOut);
        assert!(store.is_empty());
    }

    #[test]
    fn test_purchase_unknown_id_is_noop() {
        let mut store = SnapshotStore::new(4);
        store.insert_front(listing("Wheat", 5));

        let unknown = ListingId::new();
        assert_eq!(store.apply_purchase(&unknown, 1), PurchaseOutcome::NotFound);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = SnapshotStore::new(4);
        let l = listing("Wheat", 5);
        let id = l.id;
        store.insert_front(l);

        assert!(store.remove(&id));
        let after_first = store.listings().to_vec();
        assert!(!store.remove(&id));
        assert_eq!(store.listings(), after_first.as_slice());
    }

    #[test]
    #[should_panic(expected = "page_size must be positive")]
    fn test_zero_page_size_rejected() {
        SnapshotStore::new(0);
    }
}
