//! REST gateway to the market service
//!
//! Snapshot pulls and the three write operations (list, buy, cancel) go
//! over HTTP; the trait seam lets the view service run against an
//! in-memory gateway in tests.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use types::ids::ListingId;
use types::listing::Listing;

/// One page of listings as returned by the market service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub content: Vec<Listing>,
    pub total_pages: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum PullError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("market service returned status {status}")]
    Status { status: u16 },
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

/// Market service operations the view layer depends on.
#[async_trait]
pub trait MarketGateway: Send + Sync {
    /// Fetch one page of listings matching an optional search term.
    async fn fetch_listings(&self, page: u32, search: &str) -> Result<ListingPage, PullError>;

    /// Put an item up for sale.
    async fn list_item(
        &self,
        item_id: Uuid,
        quantity: u32,
        price: Decimal,
    ) -> Result<(), PullError>;

    /// Buy from an existing listing.
    async fn buy_item(&self, listing_id: ListingId, quantity: u32) -> Result<(), PullError>;

    /// Withdraw one of the caller's own listings.
    async fn cancel_listing(&self, listing_id: ListingId) -> Result<(), PullError>;
}

#[derive(Serialize)]
struct ListItemBody {
    quantity: u32,
    price: Decimal,
}

#[derive(Serialize)]
struct BuyItemBody {
    quantity: u32,
}

/// reqwest-backed gateway against the market REST API.
pub struct HttpMarketGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMarketGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, PullError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response, PullError> {
        let status = response.status();
        if !status.is_success() {
            return Err(PullError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl MarketGateway for HttpMarketGateway {
    async fn fetch_listings(&self, page: u32, search: &str) -> Result<ListingPage, PullError> {
        debug!(page, search, "Fetching listings page");
        let response = self
            .client
            .get(self.url("/market/listings"))
            .query(&[("page", page.to_string()), ("search", search.to_string())])
            .send()
            .await?;
        let response = Self::expect_ok(response).await?;
        let body = response.json::<ListingPage>().await?;
        Ok(body)
    }

    async fn list_item(
        &self,
        item_id: Uuid,
        quantity: u32,
        price: Decimal,
    ) -> Result<(), PullError> {
        debug!(%item_id, quantity, %price, "Listing item for sale");
        let response = self
            .client
            .post(self.url(&format!("/market/list/{item_id}")))
            .json(&ListItemBody { quantity, price })
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    async fn buy_item(&self, listing_id: ListingId, quantity: u32) -> Result<(), PullError> {
        debug!(%listing_id, quantity, "Buying from listing");
        let response = self
            .client
            .post(self.url(&format!("/market/buy/{listing_id}")))
            .json(&BuyItemBody { quantity })
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }

    async fn cancel_listing(&self, listing_id: ListingId) -> Result<(), PullError> {
        debug!(%listing_id, "Cancelling listing");
        let response = self
            .client
            .post(self.url(&format!("/market/cancel/{listing_id}")))
            .send()
            .await?;
        Self::expect_ok(response).await?;
        Ok(())
    }
}
