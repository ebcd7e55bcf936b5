//! Deck data model
//!
//! A deck owns its cards (through [`CardStore`]), its scheduling parameters
//! and its progression state. All mutation of counters, queues and tiers goes
//! through [`crate::scheduler::Scheduler`].

pub mod card;
pub mod config;
pub mod state;
pub mod store;
pub mod tier;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use card::{Card, CardSeed, QueueKind};
pub use config::{ConfigError, DeckConfig};
pub use state::DeckState;
pub use store::CardStore;
pub use tier::Tier;

/// Descriptive data shown in deck listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Where the cards came from (provider name, "curated", ...).
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeckMeta {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: String::new(),
            source: String::new(),
            favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone)]
pub struct Deck {
    id: String,
    pub meta: DeckMeta,
    pub(crate) counter: u64,
    pub(crate) current_tier: Tier,
    config: DeckConfig,
    pub(crate) cards: CardStore,
}

impl Deck {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_config(id, DeckConfig::default())
    }

    pub fn with_config(id: impl Into<String>, config: DeckConfig) -> Self {
        let id = id.into();
        Self {
            meta: DeckMeta::new(id.clone()),
            id,
            counter: 0,
            current_tier: Tier::default(),
            config,
            cards: CardStore::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Logical clock: number of answers recorded so far.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn current_tier(&self) -> Tier {
        self.current_tier
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DeckConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.meta.touch();
        Ok(())
    }

    pub fn cards(&self) -> &CardStore {
        &self.cards
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    pub fn queue_of(&self, id: &str) -> Option<QueueKind> {
        self.cards.queue_of(id)
    }

    pub fn new_queue(&self) -> Vec<&Card> {
        self.cards.cards_in(QueueKind::New)
    }

    pub fn cooldown_queue(&self) -> Vec<&Card> {
        self.cards.cards_in(QueueKind::Cooldown)
    }

    pub fn review_queue(&self) -> Vec<&Card> {
        self.cards.cards_in(QueueKind::Review)
    }

    pub fn to_state(&self) -> DeckState {
        DeckState::capture(self)
    }
}
