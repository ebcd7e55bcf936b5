use serde::{Deserialize, Serialize};

use super::tier::Tier;

/// The schedulable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    /// Display key (taxon name or similar), never interpreted here.
    #[serde(default)]
    pub label: String,
    pub tier: Tier,
    /// Turns that must elapse after `last_seen_at` before the card may be
    /// reviewed again.
    #[serde(default)]
    pub cooldown: u32,
    /// Deck counter value at the card's last answer; 0 if never answered.
    #[serde(default)]
    pub last_seen_at: u64,
}

impl Card {
    /// Turn at which the card leaves the cooldown queue.
    pub fn ready_at(&self) -> u64 {
        self.last_seen_at.saturating_add(u64::from(self.cooldown))
    }
}

/// Descriptor handed in by collaborators when admitting cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSeed {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub tier: Tier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<u32>,
}

impl CardSeed {
    pub fn new(id: impl Into<String>, label: impl Into<String>, tier: Tier) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            tier,
            cooldown: None,
        }
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = Some(cooldown);
        self
    }
}

/// The queue a card currently belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueueKind {
    /// Awaiting first exposure.
    New,
    /// Answered at least once, resting.
    Cooldown,
    /// Rest elapsed, eligible for re-study.
    Review,
}

impl QueueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueueKind::New => "new",
            QueueKind::Cooldown => "cooldown",
            QueueKind::Review => "review",
        }
    }
}

impl std::fmt::Display for QueueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
