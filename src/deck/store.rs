//! Single owner of a deck's cards.
//!
//! Every card lives in exactly one slot, and the slot carries the tag of the
//! queue it belongs to. The per-queue orderings are private indexes derived
//! from that tag, so a card can never sit in two queues or in none.

use std::collections::{BTreeMap, HashMap};

use super::card::{Card, QueueKind};
use super::tier::Tier;

#[derive(Debug, Clone)]
struct Slot {
    card: Card,
    queue: QueueKind,
    seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CardStore {
    slots: HashMap<String, Slot>,
    /// New cards per tier, keyed by arrival sequence.
    new_index: [BTreeMap<u64, String>; Tier::COUNT],
    /// Resting cards keyed by (turn they become ready, arrival).
    cooldown_index: BTreeMap<(u64, u64), String>,
    /// Review cards keyed by (last seen, arrival): oldest exposure first.
    review_index: BTreeMap<(u64, u64), String>,
    next_seq: u64,
}

impl CardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.slots.get(id).map(|slot| &slot.card)
    }

    pub fn queue_of(&self, id: &str) -> Option<QueueKind> {
        self.slots.get(id).map(|slot| slot.queue)
    }

    pub fn queue_len(&self, queue: QueueKind) -> usize {
        match queue {
            QueueKind::New => self.new_index.iter().map(BTreeMap::len).sum(),
            QueueKind::Cooldown => self.cooldown_index.len(),
            QueueKind::Review => self.review_index.len(),
        }
    }

    pub fn new_len(&self, tier: Tier) -> usize {
        self.new_index[tier.index()].len()
    }

    /// Places a card that is not yet in the store. Returns `false` and leaves
    /// the store untouched when the id is already present.
    pub fn insert(&mut self, card: Card, queue: QueueKind) -> bool {
        if self.slots.contains_key(&card.id) {
            return false;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let slot = Slot { card, queue, seq };
        self.index_slot(&slot);
        self.slots.insert(slot.card.id.clone(), slot);
        true
    }

    /// Places a card into `queue`, replacing any existing card with the same
    /// id wherever it currently lives.
    pub fn upsert(&mut self, card: Card, queue: QueueKind) {
        self.detach(&card.id);
        self.insert(card, queue);
    }

    /// Takes a card out of the store entirely.
    pub fn detach(&mut self, id: &str) -> Option<(Card, QueueKind)> {
        let slot = self.slots.remove(id)?;
        self.unindex_slot(&slot);
        Some((slot.card, slot.queue))
    }

    /// Oldest new card of `tier`.
    pub fn head_new(&self, tier: Tier) -> Option<&Card> {
        self.new_index[tier.index()]
            .values()
            .next()
            .and_then(|id| self.get(id))
    }

    /// Review card with the smallest `last_seen_at`.
    pub fn head_review(&self) -> Option<&Card> {
        self.review_index
            .values()
            .next()
            .and_then(|id| self.get(id))
    }

    /// Moves every resting card whose cooldown has elapsed at turn `counter`
    /// into the review queue, oldest exposure first. Returns how many moved.
    pub fn promote_ready(&mut self, counter: u64) -> usize {
        let mut ready: Vec<(u64, u64, String)> = self
            .cooldown_index
            .range(..=(counter, u64::MAX))
            .filter_map(|(_, id)| {
                self.slots
                    .get(id)
                    .map(|slot| (slot.card.last_seen_at, slot.seq, id.clone()))
            })
            .collect();
        ready.sort_unstable();

        for (_, _, id) in &ready {
            if let Some((card, _)) = self.detach(id) {
                self.insert(card, QueueKind::Review);
            }
        }
        ready.len()
    }

    /// Cards of one queue in queue order.
    pub fn cards_in(&self, queue: QueueKind) -> Vec<&Card> {
        match queue {
            QueueKind::New => {
                let mut merged: Vec<(u64, &String)> = self
                    .new_index
                    .iter()
                    .flat_map(|index| index.iter().map(|(seq, id)| (*seq, id)))
                    .collect();
                merged.sort_unstable_by_key(|(seq, _)| *seq);
                merged
                    .into_iter()
                    .filter_map(|(_, id)| self.get(id))
                    .collect()
            }
            QueueKind::Cooldown => self
                .cooldown_index
                .values()
                .filter_map(|id| self.get(id))
                .collect(),
            QueueKind::Review => self
                .review_index
                .values()
                .filter_map(|id| self.get(id))
                .collect(),
        }
    }

    /// New cards of one tier in introduction order.
    pub fn new_cards_of(&self, tier: Tier) -> Vec<&Card> {
        self.new_index[tier.index()]
            .values()
            .filter_map(|id| self.get(id))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Card, QueueKind)> {
        self.slots.values().map(|slot| (&slot.card, slot.queue))
    }

    fn index_slot(&mut self, slot: &Slot) {
        let id = slot.card.id.clone();
        match slot.queue {
            QueueKind::New => {
                self.new_index[slot.card.tier.index()].insert(slot.seq, id);
            }
            QueueKind::Cooldown => {
                self.cooldown_index
                    .insert((slot.card.ready_at(), slot.seq), id);
            }
            QueueKind::Review => {
                self.review_index
                    .insert((slot.card.last_seen_at, slot.seq), id);
            }
        }
    }

    fn unindex_slot(&mut self, slot: &Slot) {
        match slot.queue {
            QueueKind::New => {
                self.new_index[slot.card.tier.index()].remove(&slot.seq);
            }
            QueueKind::Cooldown => {
                self.cooldown_index
                    .remove(&(slot.card.ready_at(), slot.seq));
            }
            QueueKind::Review => {
                self.review_index
                    .remove(&(slot.card.last_seen_at, slot.seq));
            }
        }
    }
}
