pub mod config;
pub mod deck;
pub mod logging;
pub mod persistence;
pub mod registry;
pub mod scheduler;

pub use deck::{Card, CardSeed, Deck, DeckConfig, DeckMeta, DeckState, QueueKind, Tier};
pub use registry::{DeckRegistry, DeckSummary, MetaUpdate, RegistryOptions};
pub use scheduler::{AnswerOutcome, Draw, Scheduler};
