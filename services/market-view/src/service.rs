//! Market view actor
//!
//! A single task owns the reconciler and drains a command mailbox, so
//! every mutation of the snapshot (scope changes, pull results, streamed
//! events) is applied in one serialized order. Events that arrive while a
//! pull is in flight queue behind the scope command and are applied
//! afterwards against the fresh snapshot.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use types::listing::Listing;

use crate::events::MarketEvent;
use crate::gateway::{MarketGateway, PullError};
use crate::reconciler::Reconciler;

const MAILBOX_CAPACITY: usize = 256;

/// Commands accepted by the view actor.
enum Command {
    Event(MarketEvent),
    SetScope {
        page: u32,
        search: String,
        reply: oneshot::Sender<Result<PageInfo, PullError>>,
    },
    Query {
        reply: oneshot::Sender<ViewSnapshot>,
    },
    Shutdown,
}

/// Pagination state after a successful pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u32,
    pub total_pages: u32,
}

/// Point-in-time copy of the rendered view.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub listings: Vec<Listing>,
    pub page: u32,
    pub search: String,
    pub total_pages: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("market view service has stopped")]
    Stopped,
    #[error(transparent)]
    Pull(#[from] PullError),
}

/// Cloneable handle to the view actor.
#[derive(Clone)]
pub struct MarketViewHandle {
    tx: mpsc::Sender<Command>,
}

impl MarketViewHandle {
    /// Move the view to a new (page, search) scope. Pulls the page before
    /// replying; on failure the previous view is left intact.
    pub async fn set_scope(
        &self,
        page: u32,
        search: impl Into<String>,
    ) -> Result<PageInfo, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::SetScope {
                page,
                search: search.into(),
                reply,
            })
            .await
            .map_err(|_| ServiceError::Stopped)?;
        let result = rx.await.map_err(|_| ServiceError::Stopped)?;
        Ok(result?)
    }

    /// Deliver one streamed market event to the actor.
    pub async fn send_event(&self, event: MarketEvent) -> Result<(), ServiceError> {
        self.tx
            .send(Command::Event(event))
            .await
            .map_err(|_| ServiceError::Stopped)
    }

    /// Read the current view.
    pub async fn snapshot(&self) -> Result<ViewSnapshot, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Query { reply })
            .await
            .map_err(|_| ServiceError::Stopped)?;
        rx.await.map_err(|_| ServiceError::Stopped)
    }

    /// Stop the actor after it drains commands already queued ahead.
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| ServiceError::Stopped)
    }
}

/// The actor itself; constructed via [`MarketViewService::spawn`].
pub struct MarketViewService {
    reconciler: Reconciler,
    gateway: Arc<dyn MarketGateway>,
    rx: mpsc::Receiver<Command>,
}

impl MarketViewService {
    /// Spawn the actor task and return a handle to it.
    pub fn spawn(
        reconciler: Reconciler,
        gateway: Arc<dyn MarketGateway>,
    ) -> (MarketViewHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let service = Self {
            reconciler,
            gateway,
            rx,
        };
        let join = tokio::spawn(service.run());
        (MarketViewHandle { tx }, join)
    }

    async fn run(mut self) {
        info!("Market view service started");
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Event(event) => {
                    debug!(event = event.label(), "Applying streamed event");
                    self.reconciler.apply(event);
                }
                Command::SetScope { page, search, reply } => {
                    let result = self.change_scope(page, search).await;
                    if reply.send(result).is_err() {
                        warn!("Scope change reply dropped by caller");
                    }
                }
                Command::Query { reply } => {
                    let _ = reply.send(self.view_snapshot());
                }
                Command::Shutdown => break,
            }
        }
        info!("Market view service stopped");
    }

    /// Pull the target page, then commit scope and snapshot together.
    /// Commands sent while the pull is in flight are queued in the mailbox
    /// and applied after the fresh snapshot lands.
    async fn change_scope(&mut self, page: u32, search: String) -> Result<PageInfo, PullError> {
        let pulled = match self.gateway.fetch_listings(page, &search).await {
            Ok(pulled) => pulled,
            Err(err) => {
                warn!(page, search = %search, error = %err, "Snapshot pull failed, keeping previous view");
                return Err(err);
            }
        };

        let total_pages = pulled.total_pages;
        self.reconciler.accept_pull(page, search, pulled);
        Ok(PageInfo { page, total_pages })
    }

    fn view_snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            listings: self.reconciler.store().listings().to_vec(),
            page: self.reconciler.scope().page(),
            search: self.reconciler.scope().search().to_string(),
            total_pages: self.reconciler.store().total_pages(),
        }
    }
}
