//! Serialized form of a deck and the best-effort rehydration merge.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::card::{Card, QueueKind};
use super::config::DeckConfig;
use super::tier::Tier;
use super::{Deck, DeckMeta};

/// Snapshot written to the durable store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckState {
    pub id: String,
    pub meta: DeckMeta,
    pub counter: u64,
    pub current_tier: Tier,
    pub new_queue: Vec<Card>,
    pub cooldown_queue: Vec<Card>,
    pub review_queue: Vec<Card>,
    pub config: DeckConfig,
}

impl DeckState {
    pub fn capture(deck: &Deck) -> Self {
        let owned = |cards: Vec<&Card>| cards.into_iter().cloned().collect::<Vec<_>>();
        Self {
            id: deck.id().to_string(),
            meta: deck.meta.clone(),
            counter: deck.counter(),
            current_tier: deck.current_tier(),
            new_queue: owned(deck.new_queue()),
            cooldown_queue: owned(deck.cooldown_queue()),
            review_queue: owned(deck.review_queue()),
            config: deck.config().clone(),
        }
    }

    /// Lays a persisted record over `defaults`, field by field.
    ///
    /// Fields that fail to decode keep their default, cards that fail to
    /// decode are dropped, and config/meta keys are applied one at a time so a
    /// single bad key does not discard the rest.
    pub fn merge_over(defaults: DeckState, raw: &Value) -> DeckState {
        let deck_id = defaults.id.clone();
        let Some(obj) = raw.as_object() else {
            warn!(deck_id = %deck_id, "persisted deck state is not an object, using defaults");
            return defaults;
        };

        DeckState {
            id: defaults.id,
            meta: overlay(defaults.meta, obj.get("meta"), &deck_id, "meta", |_| true),
            counter: field(obj, "counter", &deck_id).unwrap_or(defaults.counter),
            current_tier: field(obj, "currentTier", &deck_id).unwrap_or(defaults.current_tier),
            new_queue: cards_field(obj, "newQueue", &deck_id).unwrap_or(defaults.new_queue),
            cooldown_queue: cards_field(obj, "cooldownQueue", &deck_id)
                .unwrap_or(defaults.cooldown_queue),
            review_queue: cards_field(obj, "reviewQueue", &deck_id)
                .unwrap_or(defaults.review_queue),
            config: overlay(defaults.config, obj.get("config"), &deck_id, "config", |c| {
                c.validate().is_ok()
            }),
        }
    }

    /// Rebuilds a live deck. A card id seen twice keeps its first occurrence,
    /// checking the cooldown queue first, then review, then new.
    pub fn into_deck(self) -> Deck {
        let config = match self.config.validate() {
            Ok(()) => self.config,
            Err(err) => {
                warn!(deck_id = %self.id, error = %err, "invalid deck config, using defaults");
                DeckConfig::default()
            }
        };

        let mut deck = Deck::with_config(self.id, config);
        deck.meta = self.meta;
        deck.counter = self.counter;
        deck.current_tier = self.current_tier;

        let queues = [
            (QueueKind::Cooldown, self.cooldown_queue),
            (QueueKind::Review, self.review_queue),
            (QueueKind::New, self.new_queue),
        ];
        for (queue, cards) in queues {
            for mut card in cards {
                if card.last_seen_at > deck.counter {
                    warn!(deck_id = %deck.id(), card_id = %card.id, "card seen after deck counter, clamping");
                    card.last_seen_at = deck.counter;
                }
                let card_id = card.id.clone();
                if !deck.cards.insert(card, queue) {
                    warn!(deck_id = %deck.id(), card_id = %card_id, queue = %queue, "duplicate card in persisted state, dropped");
                }
            }
        }
        deck
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &'static str, deck_id: &str) -> Option<T> {
    let value = obj.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(deck_id = %deck_id, field = key, error = %err, "discarding persisted field");
            None
        }
    }
}

fn cards_field(obj: &Map<String, Value>, key: &'static str, deck_id: &str) -> Option<Vec<Card>> {
    let value = obj.get(key)?;
    let Some(items) = value.as_array() else {
        warn!(deck_id = %deck_id, field = key, "persisted queue is not an array, discarding");
        return None;
    };

    let cards = items
        .iter()
        .filter_map(|item| match Card::deserialize(item) {
            Ok(card) => Some(card),
            Err(err) => {
                warn!(deck_id = %deck_id, field = key, error = %err, "discarding persisted card");
                None
            }
        })
        .collect();
    Some(cards)
}

fn overlay<T, F>(base: T, patch: Option<&Value>, deck_id: &str, name: &'static str, accept: F) -> T
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> bool,
{
    let Some(patch) = patch else {
        return base;
    };
    let Some(patch) = patch.as_object() else {
        warn!(deck_id = %deck_id, field = name, "persisted field is not an object, discarding");
        return base;
    };

    let mut current = base;
    for (key, value) in patch {
        let mut candidate = match serde_json::to_value(&current) {
            Ok(Value::Object(map)) => map,
            _ => return current,
        };
        candidate.insert(key.clone(), value.clone());
        match serde_json::from_value::<T>(Value::Object(candidate)) {
            Ok(next) if accept(&next) => current = next,
            Ok(_) => {
                warn!(deck_id = %deck_id, field = name, key = %key, "persisted value out of range, discarding");
            }
            Err(err) => {
                warn!(deck_id = %deck_id, field = name, key = %key, error = %err, "discarding persisted value");
            }
        }
    }
    current
}
