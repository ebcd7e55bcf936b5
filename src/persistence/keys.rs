use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

const DECK_STATE_PREFIX: &str = "deck:";
const DECK_STATE_SUFFIX: &str = ":state";

pub fn deck_state_key(deck_id: &str) -> String {
    format!("{DECK_STATE_PREFIX}{deck_id}{DECK_STATE_SUFFIX}")
}
