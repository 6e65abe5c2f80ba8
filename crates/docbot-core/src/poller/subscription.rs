// ── Resource subscriptions ──
//
// Handle returned by `Poller::subscribe`. Holding one keeps the key's
// timer alive; dropping it (or the stream made from it) releases it.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::Poller;
use crate::resource::{ResourceKey, ResourceState};

/// Releases the subscription on drop.
struct SubscriptionGuard {
    poller: Poller,
    key: ResourceKey,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.poller.unsubscribe(self.key);
    }
}

/// A live view of one cached resource.
///
/// Provides point-in-time access and change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct ResourceSubscription {
    key: ResourceKey,
    current: ResourceState,
    receiver: watch::Receiver<ResourceState>,
    guard: SubscriptionGuard,
}

impl ResourceSubscription {
    pub(super) fn new(key: ResourceKey, receiver: watch::Receiver<ResourceState>, poller: Poller) -> Self {
        let current = receiver.borrow().clone();
        Self {
            key,
            current,
            receiver,
            guard: SubscriptionGuard { poller, key },
        }
    }

    pub fn key(&self) -> ResourceKey {
        self.key
    }

    /// State captured at creation or at the last `changed()`.
    pub fn current(&self) -> &ResourceState {
        &self.current
    }

    /// Latest published state.
    pub fn latest(&self) -> ResourceState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next transition. `None` once the poller is gone.
    pub async fn changed(&mut self) -> Option<ResourceState> {
        self.receiver.changed().await.ok()?;
        let state = self.receiver.borrow_and_update().clone();
        self.current = state.clone();
        Some(state)
    }

    /// Force a refresh of this key, joining one already in flight.
    pub fn refresh(&self) {
        self.guard.poller.invalidate(self.key);
    }

    /// Convert into a `Stream` yielding the current state, then each
    /// transition.
    pub fn into_stream(self) -> ResourceWatchStream {
        ResourceWatchStream {
            inner: WatchStream::new(self.receiver),
            _guard: self.guard,
        }
    }
}

/// `Stream` adapter that keeps its subscription alive.
pub struct ResourceWatchStream {
    inner: WatchStream<ResourceState>,
    _guard: SubscriptionGuard,
}

impl Stream for ResourceWatchStream {
    type Item = ResourceState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
