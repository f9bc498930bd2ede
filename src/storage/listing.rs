//! Bounded listing channel
//!
//! A producer task pushes `ObjectInfo` records into a channel of
//! `LISTING_BUFFER` slots while the request handler drains it. The first
//! error ends the listing. Dropping the `Listing` closes the channel, which
//! stops the producer at its next send.

use std::future::Future;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::{GatewayError, Result};
use crate::storage::ObjectInfo;

/// Capacity of the listing channel
pub const LISTING_BUFFER: usize = 10;

/// Producer side of a listing
pub struct ListingSender {
    tx: mpsc::Sender<Result<ObjectInfo>>,
}

impl ListingSender {
    /// Send one item; returns false once the consumer has gone away.
    pub async fn send(&self, item: Result<ObjectInfo>) -> bool {
        self.tx.send(item).await.is_ok()
    }
}

/// Consumer side of a listing: a finite, non-restartable sequence of entries
pub struct Listing {
    rx: mpsc::Receiver<Result<ObjectInfo>>,
    producer: Option<JoinHandle<()>>,
}

impl Listing {
    /// Run `producer` on its own task, feeding the returned listing.
    pub fn spawn<F, Fut>(producer: F) -> Self
    where
        F: FnOnce(ListingSender) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(LISTING_BUFFER);
        let handle = tokio::spawn(producer(ListingSender { tx }));
        Self {
            rx,
            producer: Some(handle),
        }
    }

    /// Drain every entry in order, stopping at the first error.
    ///
    /// Completion is only reported once the producer task has finished, so
    /// a producer that panics yields an error rather than a short listing.
    pub async fn drain(mut self) -> Result<Vec<ObjectInfo>> {
        let mut entries = Vec::new();
        while let Some(item) = self.rx.recv().await {
            entries.push(item?);
        }
        if let Some(producer) = self.producer.take() {
            producer
                .await
                .map_err(|e| GatewayError::Listing(e.to_string()))?;
        }
        Ok(entries)
    }
}
