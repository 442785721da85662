//! Market View Service
//!
//! Keeps a paginated, searchable view of active marketplace listings
//! consistent while a live event stream (new listings, purchases,
//! cancellations) arrives concurrently with REST snapshot pulls:
//! - Snapshot store holding the rendered page of listings
//! - Scope state gating which live events apply to the rendered view
//! - Reconciler merging events into the snapshot in arrival order
//! - Actor-style view service serializing all mutation through one mailbox
//! - WebSocket live channel and REST gateway for the two data feeds
//!
//! # Architecture
//!
//! ```text
//!  REST pull (page, search)        WebSocket push (/topic/market)
//!          │                                  │
//!     ┌────▼────┐                        ┌────▼────┐
//!     │ Gateway │                        │ Channel │ ← decode, drop bad frames
//!     └────┬────┘                        └────┬────┘
//!          │ SetScope                         │ Event
//!        ┌─▼─────────────────────────────────▼─┐
//!        │        MarketViewService mailbox     │ ← single consumer
//!        └──────────────────┬──────────────────┘
//!                      ┌────▼──────┐
//!                      │Reconciler │ ← scope-aware merge policy
//!                      └────┬──────┘
//!                      ┌────▼──────┐
//!                      │ Snapshot  │
//!                      │  Store    │
//!                      └───────────┘
//! ```
//!
//! All snapshot-store mutation happens on the service task; events queued
//! behind an in-flight pull are applied after the pull resolves.

pub mod channel;
pub mod events;
pub mod format;
pub mod gateway;
pub mod reconciler;
pub mod scope;
pub mod service;
pub mod session;
pub mod store;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
