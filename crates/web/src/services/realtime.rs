//! Change notification and snapshot streams.
//!
//! Writers call [`ChangeHub::publish`] after a successful commit. Readers
//! turn a fetch function into a stream with [`watch`]: one snapshot on
//! subscribe, then a fresh snapshot after every matching change. SSE
//! handlers forward that stream to the browser; dropping it (client
//! disconnect) is the unsubscribe.

use std::future::Future;

use async_stream::stream;
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};

use tokoku_core::{ChatSessionId, UserId};

/// Broadcast channel capacity. Slow subscribers past this many pending
/// changes are lagged and re-fetch.
const BROADCAST_CAPACITY: usize = 256;

/// A per-user record collection that can be watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Inventory,
    Sales,
    ChatSessions,
    ChatMessages(ChatSessionId),
}

/// Something in `collection` changed for `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub user_id: UserId,
    pub collection: Collection,
}

/// Fan-out of change notifications to every open subscription.
#[derive(Clone)]
pub struct ChangeHub {
    tx: broadcast::Sender<Change>,
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }
}

impl ChangeHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Notify subscribers. A send with no subscribers is not an error.
    pub fn publish(&self, user_id: UserId, collection: Collection) {
        let _ = self.tx.send(Change {
            user_id,
            collection,
        });
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.tx.subscribe()
    }

    /// Number of open subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Snapshot stream for one user's collection.
///
/// Subscribes before the first fetch so no change between fetch and
/// subscription is lost. A fetch error is yielded and ends the stream.
pub fn watch<T, E, F, Fut>(
    hub: &ChangeHub,
    user_id: UserId,
    collection: Collection,
    fetch: F,
) -> impl Stream<Item = Result<T, E>> + use<T, E, F, Fut>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut rx = hub.subscribe();
    stream! {
        match fetch().await {
            Ok(snapshot) => yield Ok(snapshot),
            Err(e) => {
                yield Err(e);
                return;
            }
        }

        loop {
            match rx.recv().await {
                Ok(change) if change.user_id == user_id && change.collection == collection => {}
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, ?collection, "subscription lagged, re-fetching");
                }
                Err(RecvError::Closed) => break,
            }

            match fetch().await {
                Ok(snapshot) => yield Ok(snapshot),
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
    }
}
