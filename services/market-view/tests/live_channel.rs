//! Live channel tests against an in-process WebSocket server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use market_view::channel::{ChannelConfig, ConnectionStatus, LiveChannel};
use market_view::gateway::{ListingPage, MarketGateway, PullError};
use market_view::reconciler::Reconciler;
use market_view::service::{MarketViewHandle, MarketViewService};
use market_view::session::{FeedbackSink, FeedbackStyle, ScreenPosition, Session};
use types::ids::ListingId;

struct NullSession;

impl Session for NullSession {
    fn username(&self) -> &str {
        "tester"
    }

    fn refresh_balance(&self) {}
}

struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn notify(&self, _amount: &str, _position: ScreenPosition, _style: FeedbackStyle) {}
}

struct EmptyGateway;

#[async_trait]
impl MarketGateway for EmptyGateway {
    async fn fetch_listings(&self, _page: u32, _search: &str) -> Result<ListingPage, PullError> {
        Ok(ListingPage {
            content: vec![],
            total_pages: 1,
        })
    }

    async fn list_item(
        &self,
        _item_id: Uuid,
        _quantity: u32,
        _price: Decimal,
    ) -> Result<(), PullError> {
        Ok(())
    }

    async fn buy_item(&self, _listing_id: ListingId, _quantity: u32) -> Result<(), PullError> {
        Ok(())
    }

    async fn cancel_listing(&self, _listing_id: ListingId) -> Result<(), PullError> {
        Ok(())
    }
}

fn spawn_view() -> MarketViewHandle {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let reconciler = Reconciler::new(50, Arc::new(NullSession), Arc::new(NullFeedback));
    let (handle, _join) = MarketViewService::spawn(reconciler, Arc::new(EmptyGateway));
    handle
}

/// One-shot server: accepts a single connection, asserts the subscribe
/// frame, then plays the given frames and holds the socket open.
async fn spawn_server(frames: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();

        let subscribe = ws.next().await.unwrap().unwrap();
        let text = subscribe.into_text().unwrap();
        assert!(text.contains("/topic/market"), "expected subscribe frame, got {text}");

        for frame in frames {
            ws.send(Message::Text(frame)).await.unwrap();
        }

        // Keep the connection open until the client goes away.
        while let Some(Ok(_)) = ws.next().await {}
    });

    format!("ws://{addr}/ws")
}

async fn wait_for_rows(handle: &MarketViewHandle, rows: usize) -> bool {
    for _ in 0..100 {
        let view = handle.snapshot().await.unwrap();
        if view.listings.len() == rows {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

fn config(ws_url: String) -> ChannelConfig {
    ChannelConfig {
        ws_url,
        ..ChannelConfig::default()
    }
}

#[tokio::test]
async fn test_streamed_frames_reach_the_view() {
    let id = ListingId::new();
    let list = format!(
        r#"{{"type":"LIST","id":"{id}","itemName":"Wheat","quantity":5,"price":"12.50","sellerName":"bob"}}"#
    );
    let url = spawn_server(vec![list]).await;

    let handle = spawn_view();
    handle.set_scope(0, "").await.unwrap();

    let mut channel = LiveChannel::new(config(url), handle.clone());
    channel.connect().await.unwrap();
    assert_eq!(channel.status(), ConnectionStatus::Connected);

    assert!(wait_for_rows(&handle, 1).await, "LIST frame never applied");
    let view = handle.snapshot().await.unwrap();
    assert_eq!(view.listings[0].id, id);
    assert_eq!(view.listings[0].item.name, "Wheat");

    channel.disconnect().await;
}

#[tokio::test]
async fn test_buy_frame_decrements_listing() {
    let id = ListingId::new();
    let list = format!(
        r#"{{"type":"LIST","id":"{id}","itemName":"Wheat","quantity":5,"price":"10","sellerName":"bob"}}"#
    );
    let buy = format!(r#"{{"type":"BUY","id":"{id}","quantity":2}}"#);
    let url = spawn_server(vec![list, buy]).await;

    let handle = spawn_view();
    handle.set_scope(0, "").await.unwrap();

    let mut channel = LiveChannel::new(config(url), handle.clone());
    channel.connect().await.unwrap();

    assert!(wait_for_rows(&handle, 1).await);
    // Wait for the quantity to drop as well.
    let mut reduced = false;
    for _ in 0..100 {
        let view = handle.snapshot().await.unwrap();
        if view.listings.first().map(|l| l.quantity) == Some(3) {
            reduced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(reduced, "BUY frame never applied");

    channel.disconnect().await;
}

#[tokio::test]
async fn test_malformed_frames_are_dropped() {
    let id = ListingId::new();
    let garbage = "not json at all".to_string();
    let unknown = format!(r#"{{"type":"AUCTION","id":"{id}"}}"#);
    let list = format!(
        r#"{{"type":"LIST","id":"{id}","itemName":"Iron","quantity":1,"price":"3","sellerName":"bob"}}"#
    );
    let url = spawn_server(vec![garbage, unknown, list]).await;

    let handle = spawn_view();
    handle.set_scope(0, "").await.unwrap();

    let mut channel = LiveChannel::new(config(url), handle.clone());
    channel.connect().await.unwrap();

    assert!(wait_for_rows(&handle, 1).await, "valid frame after garbage never applied");

    channel.disconnect().await;
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let url = spawn_server(vec![]).await;

    let handle = spawn_view();
    let mut channel = LiveChannel::new(config(url), handle);
    channel.connect().await.unwrap();
    // Second call must not open a second socket (the server only accepts
    // one connection; a second handshake would hang past the timeout).
    channel.connect().await.unwrap();
    assert_eq!(channel.status(), ConnectionStatus::Connected);

    channel.disconnect().await;
}

#[tokio::test]
async fn test_disconnect_stops_event_flow() {
    let url = spawn_server(vec![]).await;

    let handle = spawn_view();
    handle.set_scope(0, "").await.unwrap();

    let mut channel = LiveChannel::new(config(url), handle.clone());
    channel.connect().await.unwrap();
    channel.disconnect().await;
    assert_eq!(channel.status(), ConnectionStatus::Disconnected);

    // Give any straggling reader a chance to misbehave, then confirm the
    // view stayed empty.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let view = handle.snapshot().await.unwrap();
    assert!(view.listings.is_empty());
}
