use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tier_deck::config::{log_level_from_env, Config};
use tier_deck::logging::init_tracing;
use tier_deck::persistence::FileStore;
use tier_deck::scheduler::stats;
use tier_deck::{CardSeed, DeckRegistry, MetaUpdate, Tier};

const DEMO_DECK: &str = "demo";
const DEFAULT_TURNS: usize = 60;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let _log_guard = init_tracing(&log_level_from_env());
    let config = Config::from_env();

    let turns = std::env::args()
        .nth(1)
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_TURNS);

    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    tracing::info!(data_dir = %store.root().display(), turns, "tier-deck simulator starting");

    let registry = DeckRegistry::with_store(store, config.registry_options());

    let restored = registry.activate(DEMO_DECK, Some("Demo deck")).await;
    if !restored {
        registry.update_meta(
            DEMO_DECK,
            MetaUpdate {
                description: Some("Generated by the simulator".to_string()),
                source: Some("simulator".to_string()),
                ..Default::default()
            },
        );
    }
    let admitted = registry.admit(DEMO_DECK, demo_cards());
    tracing::info!(admitted, "demo cards admitted");

    tokio::select! {
        _ = simulate(&registry, turns, config.seed.unwrap_or(0)) => {},
        _ = shutdown_signal() => {
            tracing::info!("interrupted, stopping simulation");
        },
    }

    if let Some(summary) = registry.with_deck(DEMO_DECK, stats::deck_stats) {
        tracing::info!(
            counter = summary.counter,
            tier = %summary.current_tier,
            new = summary.counts.new,
            review = summary.counts.review,
            cooldown = summary.counts.cooldown,
            "session finished"
        );
    }

    registry.flush().await;
    tracing::info!("Graceful shutdown complete");
}

/// Plays `turns` answers against the demo deck. Harder tiers are answered
/// correctly less often.
async fn simulate(registry: &DeckRegistry, turns: usize, seed: u64) {
    let mut learner = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));

    for turn in 0..turns {
        let Some(draw) = registry.draw_next(DEMO_DECK) else {
            return;
        };
        let Some(card) = draw.card else {
            tracing::info!(turn, "nothing left to study");
            return;
        };

        let accuracy = 0.9 - 0.15 * card.tier.index() as f64;
        let correct = learner.random_bool(accuracy);
        if let Some(outcome) = registry.answer(DEMO_DECK, &card.id, correct) {
            tracing::info!(
                turn,
                card = %card.label,
                tier = %card.tier,
                from = %outcome.from,
                correct,
                cooldown = outcome.cooldown,
                "answered"
            );
        }

        tokio::task::yield_now().await;
    }
}

fn demo_cards() -> Vec<CardSeed> {
    let groups: [(Tier, &[&str]); 4] = [
        (Tier::Beginner, &["Bem-te-vi", "Sabiá-laranjeira", "Quero-quero", "Pardal"]),
        (Tier::Intermediate, &["Tucano-toco", "Arara-azul", "Seriema"]),
        (Tier::Advanced, &["Gralha-azul", "Tiê-sangue", "Saíra-sete-cores"]),
        (Tier::Expert, &["Soldadinho-do-araripe", "Choquinha-de-alagoas"]),
    ];

    groups
        .iter()
        .flat_map(|(tier, names)| {
            names.iter().map(move |name| {
                let id = name.to_lowercase().replace(' ', "-");
                CardSeed::new(id, *name, *tier)
            })
        })
        .collect()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
