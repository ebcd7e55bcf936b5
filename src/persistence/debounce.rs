//! Debounced, ordered writes of deck state.
//!
//! Every mutation schedules a save; saves for the same deck coalesce until
//! the deck has been quiet for `window`, but never wait longer than
//! `max_delay` after the first unsaved change. Writes for one deck go
//! through a per-deck gate so they land in the order they were taken.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use super::DeckPersistence;
use crate::deck::DeckState;

struct Pending {
    state: DeckState,
    deadline: Instant,
    hard_deadline: Instant,
}

struct Inner {
    persistence: Arc<DeckPersistence>,
    window: Duration,
    max_delay: Duration,
    pending: Mutex<HashMap<String, Pending>>,
    gates: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

#[derive(Clone)]
pub struct SaveDebouncer {
    inner: Arc<Inner>,
    handle: Handle,
}

impl SaveDebouncer {
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(persistence: Arc<DeckPersistence>, window: Duration, max_delay: Duration) -> Self {
        Self::with_handle(persistence, window, max_delay, Handle::current())
    }

    pub fn with_handle(
        persistence: Arc<DeckPersistence>,
        window: Duration,
        max_delay: Duration,
        handle: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                persistence,
                window,
                max_delay: max_delay.max(window),
                pending: Mutex::new(HashMap::new()),
                gates: Mutex::new(HashMap::new()),
            }),
            handle,
        }
    }

    pub fn persistence(&self) -> &Arc<DeckPersistence> {
        &self.inner.persistence
    }

    /// Replaces the pending payload for the deck and restarts its quiet window.
    pub fn schedule(&self, state: DeckState) {
        let key = state.id.clone();
        let now = Instant::now();
        let mut pending = self.inner.pending.lock();
        if let Some(entry) = pending.get_mut(&key) {
            entry.state = state;
            entry.deadline = (now + self.inner.window).min(entry.hard_deadline);
            return;
        }
        pending.insert(
            key.clone(),
            Pending {
                state,
                deadline: now + self.inner.window,
                hard_deadline: now + self.inner.max_delay,
            },
        );
        drop(pending);
        self.handle.spawn(run_timer(Arc::clone(&self.inner), key));
    }

    pub fn is_pending(&self, deck_id: &str) -> bool {
        self.inner.pending.lock().contains_key(deck_id)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Drops any unsaved payload for the deck, waiting out a write already in
    /// flight. Returns whether something was discarded.
    pub async fn cancel(&self, deck_id: &str) -> bool {
        let gate = self.inner.gate(deck_id);
        let _guard = gate.lock().await;
        let discarded = self.inner.pending.lock().remove(deck_id).is_some();
        self.inner.gates.lock().remove(deck_id);
        discarded
    }

    /// Writes every pending payload now.
    pub async fn flush(&self) {
        let keys: Vec<String> = self.inner.pending.lock().keys().cloned().collect();
        if keys.is_empty() {
            return;
        }
        debug!(decks = keys.len(), "flushing pending deck saves");
        join_all(keys.iter().map(|key| self.inner.write(key))).await;
    }
}

impl Inner {
    fn gate(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        Arc::clone(self.gates.lock().entry(key.to_string()).or_default())
    }

    async fn write(&self, key: &str) {
        let gate = self.gate(key);
        let _guard = gate.lock().await;
        let Some(entry) = self.pending.lock().remove(key) else {
            return;
        };
        match self.persistence.save(&entry.state).await {
            Ok(()) => debug!(deck_id = key, counter = entry.state.counter, "deck state saved"),
            Err(err) => warn!(deck_id = key, error = %err, "failed to save deck state"),
        }
    }
}

async fn run_timer(inner: Arc<Inner>, key: String) {
    loop {
        let deadline = match inner.pending.lock().get(&key) {
            Some(entry) => entry.deadline,
            None => return,
        };
        sleep_until(deadline).await;
        let due = match inner.pending.lock().get(&key) {
            Some(entry) => entry.deadline <= Instant::now(),
            None => return,
        };
        if due {
            break;
        }
    }
    inner.write(&key).await;
}
