//! View scope state
//!
//! Tracks which page and search term are currently rendered and decides
//! whether streamed deltas may touch the snapshot. Only the default view
//! (first page, no search) is live; every other scope is frozen and must
//! be refreshed by a fresh pull when the user returns to it.

/// The (page, search) pair currently rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewScope {
    page: u32,
    search: String,
}

impl ViewScope {
    /// Start at the live scope: first page, no search.
    pub fn new() -> Self {
        Self {
            page: 0,
            search: String::new(),
        }
    }

    /// Move to a new (page, search) pair.
    pub fn set(&mut self, page: u32, search: impl Into<String>) {
        self.page = page;
        self.search = search.into();
    }

    /// Whether streamed LIST events may mutate the snapshot.
    ///
    /// True iff on the first page with no active search.
    pub fn is_live(&self) -> bool {
        self.page == 0 && self.search.is_empty()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_scope_is_live() {
        assert!(ViewScope::new().is_live());
    }

    #[test]
    fn test_paging_freezes_scope() {
        let mut scope = ViewScope::new();
        scope.set(1, "");
        assert!(!scope.is_live());
    }

    #[test]
    fn test_search_freezes_scope() {
        let mut scope = ViewScope::new();
        scope.set(0, "shoes");
        assert!(!scope.is_live());
    }

    #[test]
    fn test_returning_to_default_is_live_again() {
        let mut scope = ViewScope::new();
        scope.set(3, "shoes");
        scope.set(0, "");
        assert!(scope.is_live());
        assert_eq!(scope.page(), 0);
        assert_eq!(scope.search(), "");
    }
}
