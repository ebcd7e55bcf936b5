//! Keyed collection of live decks.
//!
//! Each deck sits behind its own lock together with its scheduler, so decks
//! never contend with each other; the map lock is only held to look up,
//! insert or remove an entry. Every mutation schedules a debounced save.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{info, warn};

use crate::deck::{Card, CardSeed, ConfigError, Deck, DeckConfig, DeckMeta, Tier};
use crate::persistence::keys::{DEFAULT_DEBOUNCE, DEFAULT_MAX_DELAY};
use crate::persistence::{DeckPersistence, KeyValueStore, SaveDebouncer};
use crate::scheduler::{self, AnswerOutcome, Draw, Scheduler};

#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Config given to decks that have none persisted.
    pub default_config: DeckConfig,
    /// Fixed seed for every deck's scheduler; entropy when `None`.
    pub seed: Option<u64>,
    pub debounce: Duration,
    pub max_delay: Duration,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            default_config: DeckConfig::default(),
            seed: None,
            debounce: DEFAULT_DEBOUNCE,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

/// Listing row for one loaded deck.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub id: String,
    pub meta: DeckMeta,
    pub current_tier: Tier,
    pub total_cards: usize,
    pub active: bool,
}

/// Partial update of a deck's descriptive fields; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct MetaUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
}

struct DeckEntry {
    deck: Deck,
    scheduler: Scheduler,
    /// Set by `remove`; holders of a stale handle must not schedule saves.
    removed: bool,
}

pub struct DeckRegistry {
    decks: RwLock<HashMap<String, Arc<Mutex<DeckEntry>>>>,
    active: RwLock<Option<String>>,
    saver: SaveDebouncer,
    options: RegistryOptions,
}

impl DeckRegistry {
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(persistence: Arc<DeckPersistence>, options: RegistryOptions) -> Self {
        let saver = SaveDebouncer::new(persistence, options.debounce, options.max_delay);
        Self {
            decks: RwLock::new(HashMap::new()),
            active: RwLock::new(None),
            saver,
            options,
        }
    }

    pub fn with_store(store: Arc<dyn KeyValueStore>, options: RegistryOptions) -> Self {
        Self::new(Arc::new(DeckPersistence::new(store)), options)
    }

    /// Makes `deck_id` the active deck, loading it first if it is not in
    /// memory. A persisted record is merged over a fresh default deck.
    /// Returns whether persisted state was found.
    pub async fn activate(&self, deck_id: &str, display_name: Option<&str>) -> bool {
        if self.decks.read().contains_key(deck_id) {
            *self.active.write() = Some(deck_id.to_string());
            return false;
        }

        let mut defaults = Deck::with_config(deck_id, self.options.default_config.clone());
        if let Some(name) = display_name {
            defaults.meta.name = name.to_string();
        }

        let (deck, restored) = match self
            .saver
            .persistence()
            .load(deck_id, defaults.to_state())
            .await
        {
            Ok(Some(state)) => (state.into_deck(), true),
            Ok(None) => (defaults, false),
            Err(err) => {
                warn!(deck_id, error = %err, "failed to load deck state, starting fresh");
                (defaults, false)
            }
        };

        info!(
            deck_id,
            restored,
            cards = deck.cards().len(),
            tier = %deck.current_tier(),
            "deck activated"
        );

        let entry = DeckEntry {
            deck,
            scheduler: self.new_scheduler(),
            removed: false,
        };
        self.decks
            .write()
            .entry(deck_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(entry)));
        *self.active.write() = Some(deck_id.to_string());
        restored
    }

    /// Drops the deck from memory and deletes its durable record.
    pub async fn remove(&self, deck_id: &str) -> bool {
        let removed = self.decks.write().remove(deck_id);
        let existed = removed.is_some();
        if let Some(entry) = removed {
            // saves scheduled before this point are dropped by `cancel` below
            entry.lock().removed = true;
        }
        {
            let mut active = self.active.write();
            if active.as_deref() == Some(deck_id) {
                *active = None;
            }
        }

        self.saver.cancel(deck_id).await;
        if let Err(err) = self.saver.persistence().delete(deck_id).await {
            warn!(deck_id, error = %err, "failed to delete deck state");
        }
        info!(deck_id, existed, "deck removed");
        existed
    }

    pub fn deactivate(&self) {
        self.active.write().take();
    }

    pub fn active_id(&self) -> Option<String> {
        self.active.read().clone()
    }

    /// Snapshot of the active deck.
    pub fn get_active(&self) -> Option<Deck> {
        let id = self.active_id()?;
        self.get(&id)
    }

    /// Snapshot of a loaded deck.
    pub fn get(&self, deck_id: &str) -> Option<Deck> {
        self.with_deck(deck_id, Deck::clone)
    }

    pub fn contains(&self, deck_id: &str) -> bool {
        self.decks.read().contains_key(deck_id)
    }

    pub fn len(&self) -> usize {
        self.decks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.read().is_empty()
    }

    /// Loaded decks, favorites first, then oldest first.
    pub fn list(&self) -> Vec<DeckSummary> {
        let active = self.active_id();
        let entries: Vec<Arc<Mutex<DeckEntry>>> = self.decks.read().values().cloned().collect();
        let mut summaries: Vec<DeckSummary> = entries
            .iter()
            .map(|entry| {
                let entry = entry.lock();
                let deck = &entry.deck;
                DeckSummary {
                    id: deck.id().to_string(),
                    meta: deck.meta.clone(),
                    current_tier: deck.current_tier(),
                    total_cards: deck.cards().len(),
                    active: active.as_deref() == Some(deck.id()),
                }
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.meta
                .favorite
                .cmp(&a.meta.favorite)
                .then(a.meta.created_at.cmp(&b.meta.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        summaries
    }

    /// Runs a read-only view over a loaded deck.
    pub fn with_deck<T>(&self, deck_id: &str, view: impl FnOnce(&Deck) -> T) -> Option<T> {
        let entry = self.entry(deck_id)?;
        let entry = entry.lock();
        Some(view(&entry.deck))
    }

    pub fn admit<I>(&self, deck_id: &str, seeds: I) -> usize
    where
        I: IntoIterator<Item = CardSeed>,
    {
        self.mutate(deck_id, |entry| {
            let admitted = scheduler::admit(&mut entry.deck, seeds);
            (admitted, admitted > 0)
        })
        .unwrap_or(0)
    }

    pub fn peek_next(&self, deck_id: &str) -> Option<Card> {
        let entry = self.entry(deck_id)?;
        let mut entry = entry.lock();
        let DeckEntry { deck, scheduler, .. } = &mut *entry;
        scheduler.peek_next(deck).cloned()
    }

    /// Peek that advances through exhausted tiers.
    pub fn draw_next(&self, deck_id: &str) -> Option<Draw> {
        self.mutate(deck_id, |entry| {
            let DeckEntry { deck, scheduler, .. } = entry;
            let draw = scheduler.draw_next(deck);
            let changed = draw.tiers_advanced > 0;
            (draw, changed)
        })
    }

    pub fn answer(&self, deck_id: &str, card_id: &str, was_correct: bool) -> Option<AnswerOutcome> {
        self.mutate(deck_id, |entry| {
            let DeckEntry { deck, scheduler, .. } = entry;
            let outcome = scheduler.answer(deck, card_id, was_correct);
            let changed = outcome.is_some();
            (outcome, changed)
        })
        .flatten()
    }

    pub fn can_advance(&self, deck_id: &str) -> bool {
        self.with_deck(deck_id, scheduler::can_advance)
            .unwrap_or(false)
    }

    pub fn advance(&self, deck_id: &str) -> bool {
        self.mutate(deck_id, |entry| {
            let advanced = scheduler::advance(&mut entry.deck);
            (advanced, advanced)
        })
        .unwrap_or(false)
    }

    pub fn set_favorite(&self, deck_id: &str, favorite: bool) -> bool {
        self.mutate(deck_id, |entry| {
            let meta = &mut entry.deck.meta;
            let changed = meta.favorite != favorite;
            if changed {
                meta.favorite = favorite;
                meta.touch();
            }
            (true, changed)
        })
        .unwrap_or(false)
    }

    pub fn update_meta(&self, deck_id: &str, update: MetaUpdate) -> bool {
        self.mutate(deck_id, |entry| {
            let meta = &mut entry.deck.meta;
            if let Some(name) = update.name {
                meta.name = name;
            }
            if let Some(description) = update.description {
                meta.description = description;
            }
            if let Some(source) = update.source {
                meta.source = source;
            }
            meta.touch();
            (true, true)
        })
        .unwrap_or(false)
    }

    /// Replaces a deck's parameters. `Ok(false)` when the deck is not loaded.
    pub fn update_config(&self, deck_id: &str, config: DeckConfig) -> Result<bool, ConfigError> {
        config.validate()?;
        let updated = self.mutate(deck_id, |entry| {
            let result = entry.deck.set_config(config);
            let changed = result.is_ok();
            (result, changed)
        });
        match updated {
            Some(result) => result.map(|()| true),
            None => Ok(false),
        }
    }

    /// Writes every pending save now.
    pub async fn flush(&self) {
        self.saver.flush().await;
    }

    pub fn pending_saves(&self) -> usize {
        self.saver.pending_count()
    }

    fn entry(&self, deck_id: &str) -> Option<Arc<Mutex<DeckEntry>>> {
        self.decks.read().get(deck_id).cloned()
    }

    /// Runs `op` under the deck's lock; when it reports a change the new
    /// state is handed to the saver before the lock is released, so saves
    /// for one deck are scheduled in mutation order.
    fn mutate<T>(&self, deck_id: &str, op: impl FnOnce(&mut DeckEntry) -> (T, bool)) -> Option<T> {
        let entry = self.entry(deck_id)?;
        self.mutate_entry(&entry, op)
    }

    fn mutate_entry<T>(
        &self,
        entry: &Mutex<DeckEntry>,
        op: impl FnOnce(&mut DeckEntry) -> (T, bool),
    ) -> Option<T> {
        let mut entry = entry.lock();
        if entry.removed {
            return None;
        }
        let (result, changed) = op(&mut *entry);
        if changed {
            self.saver.schedule(entry.deck.to_state());
        }
        Some(result)
    }

    fn new_scheduler(&self) -> Scheduler {
        match self.options.seed {
            Some(seed) => Scheduler::with_seed(seed),
            None => Scheduler::from_entropy(),
        }
    }
}
