//! Read-only progress views over a deck.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::deck::{Card, Deck, QueueKind, Tier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueCounts {
    pub new: usize,
    pub review: usize,
    pub cooldown: usize,
}

impl QueueCounts {
    pub fn total(&self) -> usize {
        self.new + self.review + self.cooldown
    }

    fn bump(&mut self, queue: QueueKind) {
        match queue {
            QueueKind::New => self.new += 1,
            QueueKind::Review => self.review += 1,
            QueueKind::Cooldown => self.cooldown += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStats {
    pub tier: Tier,
    #[serde(flatten)]
    pub counts: QueueCounts,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub total_cards: usize,
    #[serde(flatten)]
    pub counts: QueueCounts,
    pub counter: u64,
    pub current_tier: Tier,
}

/// Counts restricted to the tier currently being introduced.
pub fn current_tier_stats(deck: &Deck) -> TierStats {
    let tier = deck.current_tier();
    let mut counts = QueueCounts::default();
    for (card, queue) in deck.cards().iter() {
        if card.tier == tier {
            counts.bump(queue);
        }
    }
    TierStats {
        tier,
        counts,
        total: counts.total(),
    }
}

pub fn deck_stats(deck: &Deck) -> DeckStats {
    let cards = deck.cards();
    let counts = QueueCounts {
        new: cards.queue_len(QueueKind::New),
        review: cards.queue_len(QueueKind::Review),
        cooldown: cards.queue_len(QueueKind::Cooldown),
    };
    DeckStats {
        total_cards: cards.len(),
        counts,
        counter: deck.counter(),
        current_tier: deck.current_tier(),
    }
}

/// Queue distribution for every tier, including empty ones.
pub fn cards_by_tier(deck: &Deck) -> BTreeMap<Tier, QueueCounts> {
    let mut distribution: BTreeMap<Tier, QueueCounts> =
        Tier::ALL.iter().map(|tier| (*tier, QueueCounts::default())).collect();
    for (card, queue) in deck.cards().iter() {
        distribution.entry(card.tier).or_default().bump(queue);
    }
    distribution
}

pub fn next_tier(deck: &Deck) -> Option<Tier> {
    deck.current_tier().next()
}

pub fn has_current_tier_reviews(deck: &Deck) -> bool {
    let tier = deck.current_tier();
    deck.review_queue().iter().any(|card| card.tier == tier)
}

/// New cards of the current tier in the order they will be introduced.
pub fn drawable_new(deck: &Deck) -> Vec<&Card> {
    deck.cards().new_cards_of(deck.current_tier())
}
