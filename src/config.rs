use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::deck::DeckConfig;
use crate::persistence::keys::{DEFAULT_DEBOUNCE, DEFAULT_MAX_DELAY};
use crate::registry::RegistryOptions;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub data_dir: PathBuf,
    pub debounce: Duration,
    pub max_delay: Duration,
    pub seed: Option<u64>,
    pub deck: DeckConfig,
}

const DEFAULT_LOG_LEVEL: &str = "info";

/// Log filter from `RUST_LOG`, readable before the rest of the config so
/// tracing is up when settings are parsed.
pub fn log_level_from_env() -> String {
    log_level_from(|key| std::env::var(key).ok())
}

fn log_level_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("RUST_LOG")
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparseable values keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_level = log_level_from(&lookup);

        let data_dir = lookup("DECK_DATA_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let debounce = parsed::<u64>(&lookup, "DECK_PERSIST_DEBOUNCE_MS")
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE);
        let max_delay = parsed::<u64>(&lookup, "DECK_PERSIST_MAX_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_MAX_DELAY);

        let seed = parsed::<u64>(&lookup, "DECK_SEED");

        let defaults = DeckConfig::default();
        let deck = DeckConfig {
            correct_multiplier: parsed(&lookup, "DECK_CORRECT_MULTIPLIER")
                .unwrap_or(defaults.correct_multiplier),
            incorrect_multiplier: parsed(&lookup, "DECK_INCORRECT_MULTIPLIER")
                .unwrap_or(defaults.incorrect_multiplier),
            min_cooldown: parsed(&lookup, "DECK_MIN_COOLDOWN").unwrap_or(defaults.min_cooldown),
            review_weight: parsed(&lookup, "DECK_REVIEW_WEIGHT").unwrap_or(defaults.review_weight),
            jitter: parsed(&lookup, "DECK_JITTER").unwrap_or(defaults.jitter),
        };
        let deck = match deck.validate() {
            Ok(()) => deck,
            Err(err) => {
                warn!(error = %err, "invalid deck parameters in environment, using defaults");
                defaults
            }
        };

        Self {
            log_level,
            data_dir,
            debounce,
            max_delay,
            seed,
            deck,
        }
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            default_config: self.deck.clone(),
            seed: self.seed,
            debounce: self.debounce,
            max_delay: self.max_delay,
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tier-deck")
}
