use serde::{Deserialize, Serialize};

use super::tier::Tier;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("correct multiplier must be greater than 1, got {0}")]
    CorrectMultiplier(f64),
    #[error("incorrect multiplier must be in (0, 1), got {0}")]
    IncorrectMultiplier(f64),
    #[error("review weight must be in (0, 1], got {0}")]
    ReviewWeight(f64),
}

/// Tunable scheduling parameters of one deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckConfig {
    /// Cooldown growth on a correct answer.
    pub correct_multiplier: f64,
    /// Cooldown shrink on a wrong answer.
    pub incorrect_multiplier: f64,
    /// Floor applied after a wrong answer, before jitter.
    pub min_cooldown: u32,
    /// Dampens the review queue's share of the selection draw.
    pub review_weight: f64,
    /// Jitter is drawn uniformly from `[-jitter, jitter]`.
    #[serde(default = "default_jitter")]
    pub jitter: u32,
}

fn default_jitter() -> u32 {
    1
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            correct_multiplier: 2.0,
            incorrect_multiplier: 0.5,
            min_cooldown: 3,
            review_weight: 0.3,
            jitter: default_jitter(),
        }
    }
}

impl DeckConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.correct_multiplier.is_finite() && self.correct_multiplier > 1.0) {
            return Err(ConfigError::CorrectMultiplier(self.correct_multiplier));
        }
        if !(self.incorrect_multiplier > 0.0 && self.incorrect_multiplier < 1.0) {
            return Err(ConfigError::IncorrectMultiplier(self.incorrect_multiplier));
        }
        if !(self.review_weight > 0.0 && self.review_weight <= 1.0) {
            return Err(ConfigError::ReviewWeight(self.review_weight));
        }
        Ok(())
    }

    /// Starting cooldown for a card of `tier` that has none.
    pub fn default_cooldown(&self, tier: Tier) -> u32 {
        self.min_cooldown.saturating_add(tier.cooldown_bonus())
    }
}
