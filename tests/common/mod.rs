#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use tier_deck::persistence::{KeyValueStore, MemoryStore, StoreError, StoreResult};
use tier_deck::{Card, CardSeed, Deck, DeckConfig, DeckRegistry, DeckState, RegistryOptions, Tier};

pub fn no_jitter() -> DeckConfig {
    DeckConfig {
        jitter: 0,
        ..Default::default()
    }
}

pub fn seed(id: &str, tier: Tier) -> CardSeed {
    CardSeed::new(id, id.to_uppercase(), tier)
}

pub fn card(id: &str, tier: Tier, cooldown: u32, last_seen_at: u64) -> Card {
    Card {
        id: id.to_string(),
        label: id.to_uppercase(),
        tier,
        cooldown,
        last_seen_at,
    }
}

/// Deck rebuilt from hand-written queues.
pub fn deck_from_queues(
    counter: u64,
    current_tier: Tier,
    new_queue: Vec<Card>,
    cooldown_queue: Vec<Card>,
    review_queue: Vec<Card>,
) -> Deck {
    let mut state = Deck::with_config("fixture", no_jitter()).to_state();
    state.counter = counter;
    state.current_tier = current_tier;
    state.new_queue = new_queue;
    state.cooldown_queue = cooldown_queue;
    state.review_queue = review_queue;
    DeckState::into_deck(state)
}

pub fn test_options() -> RegistryOptions {
    RegistryOptions {
        default_config: no_jitter(),
        seed: Some(11),
        debounce: Duration::from_millis(500),
        max_delay: Duration::from_secs(5),
    }
}

pub fn registry_over(store: Arc<dyn KeyValueStore>) -> DeckRegistry {
    DeckRegistry::with_store(store, test_options())
}

/// Backend whose writes always fail; counts attempts.
#[derive(Debug, Default)]
pub struct FailingStore {
    pub put_attempts: AtomicUsize,
}

impl FailingStore {
    pub fn attempts(&self) -> usize {
        self.put_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: String) -> StoreResult<()> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Backend("disk on fire".to_string()))
    }

    async fn delete(&self, _key: &str) -> StoreResult<()> {
        Err(StoreError::Backend("disk on fire".to_string()))
    }
}

/// Backend that rejects the first `failures` writes, then behaves like a
/// `MemoryStore`.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn failing(failures: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            failures: AtomicUsize::new(failures),
        }
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: String) -> StoreResult<()> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Backend("write rejected".to_string()));
        }
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.delete(key).await
    }
}
