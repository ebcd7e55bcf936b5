//! Turn-by-turn scheduling for tiered decks
//!
//! - Admission of new cards with tier-dependent starting cooldowns
//! - Weighted choice between the current tier's new cards and due reviews
//! - Cooldown recomputation with jitter on every answer
//! - Cooldown → review migration driven by the deck counter
//! - Tier progression once the current tier has no new cards left
//!
//! Operations that need randomness are methods on [`Scheduler`], which owns
//! an injectable generator; the deterministic ones are free functions here.

pub mod stats;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::deck::{Card, CardSeed, Deck, QueueKind, Tier};

/// Result of recording one answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub card_id: String,
    /// Queue the card was answered from.
    pub from: QueueKind,
    pub cooldown: u32,
    pub counter: u64,
    /// Cards moved from cooldown to review by this turn.
    pub promoted: usize,
}

/// Result of [`Scheduler::draw_next`].
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub card: Option<Card>,
    pub tiers_advanced: usize,
}

pub struct Scheduler<R = ChaCha8Rng> {
    rng: R,
}

impl Scheduler<ChaCha8Rng> {
    pub fn with_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_rng(&mut rand::rng()))
    }
}

impl Default for Scheduler<ChaCha8Rng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng> Scheduler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Chooses the card to show next without touching any queue.
    pub fn peek_next<'d>(&mut self, deck: &'d Deck) -> Option<&'d Card> {
        let tier = deck.current_tier();
        let new_head = deck.cards.head_new(tier);
        let review_head = deck.cards.head_review();

        match (new_head, review_head) {
            (None, None) => None,
            (None, Some(review)) => Some(review),
            (Some(new), None) => Some(new),
            (Some(new), Some(review)) => {
                let new_weight = deck.cards.new_len(tier) as f64;
                let review_weight =
                    deck.cards.queue_len(QueueKind::Review) as f64 * deck.config().review_weight;
                let draw = self.rng.random::<f64>() * (new_weight + review_weight);
                if draw < review_weight {
                    Some(review)
                } else {
                    Some(new)
                }
            }
        }
    }

    /// Like [`Scheduler::peek_next`], but unlocks following tiers while
    /// nothing is drawable and a later tier still holds new cards. Stops at
    /// the first such tier; never advances an empty or resting deck.
    pub fn draw_next(&mut self, deck: &mut Deck) -> Draw {
        let mut tiers_advanced = 0;
        for _ in 0..Tier::COUNT {
            if has_drawable(deck) || !has_new_cards_ahead(deck) || !advance(deck) {
                break;
            }
            tiers_advanced += 1;
        }
        Draw {
            card: self.peek_next(deck).cloned(),
            tiers_advanced,
        }
    }

    /// Records one answer. Returns `None` without touching the deck when the
    /// card is unknown.
    pub fn answer(&mut self, deck: &mut Deck, card_id: &str, was_correct: bool) -> Option<AnswerOutcome> {
        if !deck.cards.contains(card_id) {
            return None;
        }

        deck.counter += 1;
        let promoted = refresh_review_queue(deck);

        let (mut card, from) = deck.cards.detach(card_id)?;
        let config = deck.config();
        let base = if card.cooldown == 0 {
            config.default_cooldown(card.tier)
        } else {
            card.cooldown
        };
        let scaled = if was_correct {
            (f64::from(base) * config.correct_multiplier).round()
        } else {
            (f64::from(base) * config.incorrect_multiplier)
                .round()
                .max(f64::from(config.min_cooldown))
        };
        let jitter = self.jitter(config.jitter);
        let cooldown = (scaled as i64 + jitter).clamp(0, i64::from(u32::MAX)) as u32;

        card.cooldown = cooldown;
        card.last_seen_at = deck.counter;
        deck.cards.upsert(card, QueueKind::Cooldown);

        debug!(
            deck_id = %deck.id(),
            card_id,
            was_correct,
            cooldown,
            counter = deck.counter,
            "answer recorded"
        );

        Some(AnswerOutcome {
            card_id: card_id.to_string(),
            from,
            cooldown,
            counter: deck.counter,
            promoted,
        })
    }

    fn jitter(&mut self, magnitude: u32) -> i64 {
        if magnitude == 0 {
            return 0;
        }
        let bound = i64::from(magnitude);
        self.rng.random_range(-bound..=bound)
    }
}

/// Appends every seed whose id is not yet in the deck to the new queue.
/// Returns how many cards were admitted.
pub fn admit<I>(deck: &mut Deck, seeds: I) -> usize
where
    I: IntoIterator<Item = CardSeed>,
{
    let mut admitted = 0;
    for seed in seeds {
        if deck.cards.contains(&seed.id) {
            continue;
        }
        let cooldown = seed
            .cooldown
            .unwrap_or_else(|| deck.config().default_cooldown(seed.tier));
        let card = Card {
            id: seed.id,
            label: seed.label,
            tier: seed.tier,
            cooldown,
            last_seen_at: 0,
        };
        if deck.cards.insert(card, QueueKind::New) {
            admitted += 1;
        }
    }
    if admitted > 0 {
        debug!(deck_id = %deck.id(), admitted, "cards admitted");
    }
    admitted
}

/// Moves resting cards whose cooldown has elapsed into the review queue.
pub fn refresh_review_queue(deck: &mut Deck) -> usize {
    let counter = deck.counter;
    deck.cards.promote_ready(counter)
}

pub fn can_advance(deck: &Deck) -> bool {
    !deck.current_tier().is_last() && deck.cards.new_len(deck.current_tier()) == 0
}

pub fn advance(deck: &mut Deck) -> bool {
    if !can_advance(deck) {
        return false;
    }
    let Some(next) = deck.current_tier().next() else {
        return false;
    };
    info!(deck_id = %deck.id(), from = %deck.current_tier(), to = %next, "tier advanced");
    deck.current_tier = next;
    true
}

fn has_new_cards_ahead(deck: &Deck) -> bool {
    Tier::ALL[deck.current_tier().index() + 1..]
        .iter()
        .any(|tier| deck.cards.new_len(*tier) > 0)
}

fn has_drawable(deck: &Deck) -> bool {
    deck.cards.new_len(deck.current_tier()) > 0 || deck.cards.queue_len(QueueKind::Review) > 0
}
