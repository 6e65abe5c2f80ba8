// ── Keyed polling cache ──
//
// One entry per `ResourceKey`, shared by every subscriber of that key.
// The first subscriber starts a timer, the last one stops it and drops the
// entry. Each issued fetch gets a poller-wide stamp; a completion whose
// stamp is no longer its entry's current one is dropped, which keeps
// responses ordered and makes cancellation stick, even across an entry
// being dropped and recreated. No lock is held across an await.

mod subscription;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use docbot_api::AdminClient;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::PollIntervals;
use crate::error::CoreError;
use crate::resource::{ResourceData, ResourceKey, ResourceState};

pub use subscription::{ResourceSubscription, ResourceWatchStream};

/// Shared cache of remote resources with per-key polling.
///
/// Cheaply cloneable. Subscribing and issuing fetches spawn tokio tasks,
/// so those calls must happen inside a runtime.
#[derive(Clone)]
pub struct Poller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    client: AdminClient,
    intervals: PollIntervals,
    entries: DashMap<ResourceKey, Entry>,
    /// Source of fetch stamps. Starts at 1; 0 means "no current fetch".
    stamps: AtomicU64,
    /// Parent of every entry token. Cancelled by `shutdown()`.
    cancel: CancellationToken,
}

struct Entry {
    state: watch::Sender<ResourceState>,
    subscribers: usize,
    /// Stamp of the fetch allowed to commit, 0 when none is.
    generation: u64,
    in_flight: bool,
    /// Transport calls issued since this entry was created.
    requests: u64,
    /// Stops the timer and any in-flight fetch. Replaced after each cancel.
    cancel: CancellationToken,
    timer: Option<JoinHandle<()>>,
}

impl Entry {
    fn new(parent: &CancellationToken) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        Self {
            state,
            subscribers: 0,
            generation: 0,
            in_flight: false,
            requests: 0,
            cancel: parent.child_token(),
            timer: None,
        }
    }

    /// Forget the in-flight fetch and drop its `Loading` status.
    fn settle_cancelled(&mut self) {
        self.in_flight = false;
        self.generation = 0;
        let settled = self.state.borrow().settled();
        self.state.send_replace(settled);
    }
}

impl Poller {
    pub fn new(client: AdminClient, intervals: PollIntervals) -> Self {
        Self {
            inner: Arc::new(PollerInner {
                client,
                intervals,
                entries: DashMap::new(),
                stamps: AtomicU64::new(1),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn client(&self) -> &AdminClient {
        &self.inner.client
    }

    pub fn intervals(&self) -> &PollIntervals {
        &self.inner.intervals
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to `key` at its configured interval.
    pub fn subscribe(&self, key: ResourceKey) -> ResourceSubscription {
        let period = self.inner.intervals.for_kind(key.kind());
        self.subscribe_with_interval(key, period)
    }

    /// Subscribe to `key`, polling every `period` if this is the first
    /// subscriber. Later subscribers share the running timer, whatever
    /// period they ask for.
    ///
    /// The first fetch starts immediately. Dropping the returned
    /// subscription releases it.
    pub fn subscribe_with_interval(&self, key: ResourceKey, period: Duration) -> ResourceSubscription {
        let receiver = {
            let mut entry = self.entry(key);
            entry.subscribers += 1;
            if entry.subscribers == 1 {
                debug!(%key, ?period, "starting poll timer");
                let cancel = entry.cancel.clone();
                entry.timer = Some(tokio::spawn(poll_task(
                    Arc::downgrade(&self.inner),
                    key,
                    period,
                    cancel,
                )));
            } else {
                trace!(%key, subscribers = entry.subscribers, "attached to running timer");
            }
            entry.state.subscribe()
        };
        ResourceSubscription::new(key, receiver, self.clone())
    }

    /// Release one subscription. The last release stops the timer, cancels
    /// an in-flight fetch, reverts a pending `Loading` status and drops the
    /// entry.
    fn unsubscribe(&self, key: ResourceKey) {
        {
            let Some(mut entry) = self.inner.entries.get_mut(&key) else {
                return;
            };
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers > 0 {
                return;
            }

            debug!(%key, "last subscriber left; stopping poll timer");
            entry.cancel.cancel();
            entry.cancel = self.inner.cancel.child_token();
            entry.timer = None;
            if entry.in_flight {
                entry.settle_cancelled();
            }
        }
        // A one-shot fetch issued in between keeps the entry alive.
        self.inner
            .entries
            .remove_if(&key, |_, entry| entry.subscribers == 0 && !entry.in_flight);
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Fetch `key` once and wait for the outcome.
    ///
    /// Joins a fetch already in flight instead of issuing another. The
    /// returned state carries the previous data when this fetch failed.
    pub async fn fetch(&self, key: ResourceKey) -> ResourceState {
        let Some(mut receiver) = spawn_fetch(&self.inner, key, None) else {
            return self.state(key);
        };
        match receiver.wait_for(|state| !state.status.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(key),
        }
    }

    /// Refresh `key` now. Joins a fetch already in flight.
    pub fn invalidate(&self, key: ResourceKey) {
        self.spawn_fetch(key);
    }

    fn spawn_fetch(&self, key: ResourceKey) {
        let _ = spawn_fetch(&self.inner, key, None);
    }

    // ── Inspection ───────────────────────────────────────────────────

    /// Current state for `key`; `Idle` for keys never touched.
    pub fn state(&self, key: ResourceKey) -> ResourceState {
        self.inner
            .entries
            .get(&key)
            .map(|entry| entry.state.borrow().clone())
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self, key: ResourceKey) -> usize {
        self.inner.entries.get(&key).map_or(0, |entry| entry.subscribers)
    }

    /// Number of transport calls issued for `key` since its entry was
    /// created. Resets once the last subscriber leaves.
    pub fn request_count(&self, key: ResourceKey) -> u64 {
        self.inner.entries.get(&key).map_or(0, |entry| entry.requests)
    }

    /// Keys currently holding an entry.
    pub fn entry_count(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_polling(&self, key: ResourceKey) -> bool {
        self.inner
            .entries
            .get(&key)
            .is_some_and(|entry| entry.timer.as_ref().is_some_and(|t| !t.is_finished()))
    }

    /// Stop every timer and in-flight fetch. Subscriptions stay valid but
    /// no longer update.
    pub fn shutdown(&self) {
        debug!("shutting down poller");
        self.inner.cancel.cancel();
    }

    fn entry(&self, key: ResourceKey) -> RefMut<'_, ResourceKey, Entry> {
        self.inner
            .entries
            .entry(key)
            .or_insert_with(|| Entry::new(&self.inner.cancel))
    }
}

// ── Fetch lifecycle ──────────────────────────────────────────────────

/// Issue a fetch for `key` unless one is already in flight, returning a
/// receiver on the entry that will publish the outcome.
///
/// `timer` is the token of the calling poll task, checked under the entry
/// lock so a tick racing the last unsubscribe issues nothing. A timer never
/// recreates a dropped entry.
fn spawn_fetch(
    inner: &Arc<PollerInner>,
    key: ResourceKey,
    timer: Option<&CancellationToken>,
) -> Option<watch::Receiver<ResourceState>> {
    let (generation, cancel, receiver) = {
        let mut entry = match timer {
            Some(token) => match inner.entries.get_mut(&key) {
                Some(entry) if !token.is_cancelled() => entry,
                _ => return None,
            },
            None => inner
                .entries
                .entry(key)
                .or_insert_with(|| Entry::new(&inner.cancel)),
        };
        if entry.in_flight {
            trace!(%key, "fetch already in flight; attaching");
            return Some(entry.state.subscribe());
        }
        entry.in_flight = true;
        entry.generation = inner.stamps.fetch_add(1, Ordering::Relaxed);
        entry.requests += 1;
        let loading = entry.state.borrow().loading();
        entry.state.send_replace(loading);
        (entry.generation, entry.cancel.clone(), entry.state.subscribe())
    };

    let weak = Arc::downgrade(inner);
    let client = inner.client.clone();
    tokio::spawn(async move {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(%key, generation, "fetch cancelled");
                if let Some(inner) = weak.upgrade() {
                    abandon(&inner, key, generation);
                }
            }
            result = key.fetch(&client) => {
                if let Some(inner) = weak.upgrade() {
                    commit(&inner, key, generation, result);
                }
            }
        }
    });
    Some(receiver)
}

/// Publish a completed fetch if it is still the current one.
fn commit(
    inner: &PollerInner,
    key: ResourceKey,
    generation: u64,
    result: Result<ResourceData, docbot_api::Error>,
) {
    let Some(mut entry) = inner.entries.get_mut(&key) else {
        return;
    };
    if entry.generation != generation {
        debug!(%key, generation, current = entry.generation, "discarding superseded response");
        return;
    }
    entry.in_flight = false;

    let next = match result {
        Ok(data) => {
            trace!(%key, "fetch succeeded");
            ResourceState::succeeded(data)
        }
        Err(e) => {
            let err = CoreError::from(e);
            warn!(%key, error = %err, "fetch failed");
            entry.state.borrow().failed(err)
        }
    };
    entry.state.send_replace(next);
}

/// Revert a cancelled fetch that is still current (e.g. after `shutdown()`).
fn abandon(inner: &PollerInner, key: ResourceKey, generation: u64) {
    let Some(mut entry) = inner.entries.get_mut(&key) else {
        return;
    };
    if entry.generation == generation {
        entry.settle_cancelled();
    }
}

/// Per-key timer. The first tick fires immediately.
async fn poll_task(
    inner: Weak<PollerInner>,
    key: ResourceKey,
    period: Duration,
    cancel: CancellationToken,
) {
    if period.is_zero() {
        if let Some(inner) = inner.upgrade() {
            spawn_fetch(&inner, key, Some(&cancel));
        }
        return;
    }

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(inner) = inner.upgrade() else { break };
                spawn_fetch(&inner, key, Some(&cancel));
            }
        }
    }
    trace!(%key, "poll timer stopped");
}
