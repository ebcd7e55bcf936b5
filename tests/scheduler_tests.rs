mod common;

use tier_deck::scheduler::{self, stats, Scheduler};
use tier_deck::{Deck, DeckConfig, QueueKind, Tier};

use common::{card, deck_from_queues, no_jitter, seed};

#[test]
fn first_answer_moves_new_card_to_cooldown() {
    let mut deck = Deck::new("a");
    scheduler::admit(&mut deck, vec![seed("a", Tier::Beginner)]);
    let mut sched = Scheduler::with_seed(1);

    assert_eq!(sched.peek_next(&deck).map(|c| c.id.clone()), Some("a".to_string()));

    let outcome = sched.answer(&mut deck, "a", true).unwrap();
    assert_eq!(outcome.from, QueueKind::New);
    assert_eq!(deck.counter(), 1);
    assert_eq!(deck.queue_of("a"), Some(QueueKind::Cooldown));
    assert_eq!(deck.card("a").unwrap().last_seen_at, 1);
    assert!(deck.new_queue().is_empty());
    assert!(deck.review_queue().is_empty());
}

#[test]
fn wrong_answer_applies_floor_before_jitter() {
    let mut deck = Deck::with_config("b", no_jitter());
    scheduler::admit(&mut deck, vec![seed("x", Tier::Beginner).with_cooldown(4)]);

    Scheduler::with_seed(3).answer(&mut deck, "x", false);
    assert_eq!(deck.card("x").unwrap().cooldown, 3);

    let mut jittery = Deck::new("b2");
    scheduler::admit(&mut jittery, vec![seed("x", Tier::Beginner).with_cooldown(4)]);
    let mut sched = Scheduler::with_seed(3);
    sched.answer(&mut jittery, "x", false);
    let cooldown = jittery.card("x").unwrap().cooldown;
    assert!((2..=4).contains(&cooldown), "cooldown {cooldown}");
}

#[test]
fn review_only_deck_always_serves_oldest_review() {
    let deck = deck_from_queues(
        20,
        Tier::Beginner,
        vec![card("locked", Tier::Advanced, 5, 0)],
        vec![],
        vec![
            card("r5", Tier::Beginner, 1, 5),
            card("r2", Tier::Intermediate, 1, 2),
            card("r8", Tier::Beginner, 1, 8),
        ],
    );

    for s in 0..200 {
        let mut sched = Scheduler::with_seed(s);
        assert_eq!(sched.peek_next(&deck).unwrap().id, "r2");
    }
}

#[test]
fn last_new_card_of_tier_gates_advancement() {
    let mut deck = Deck::new("d");
    scheduler::admit(
        &mut deck,
        vec![seed("a", Tier::Beginner), seed("b", Tier::Intermediate)],
    );
    assert!(!scheduler::can_advance(&deck));
    assert!(!scheduler::advance(&mut deck));

    Scheduler::with_seed(9).answer(&mut deck, "a", true);

    assert!(scheduler::can_advance(&deck));
    assert!(scheduler::advance(&mut deck));
    assert_eq!(deck.current_tier(), Tier::Intermediate);
    assert_eq!(stats::next_tier(&deck), Some(Tier::Advanced));
}

#[test]
fn admission_is_idempotent() {
    let mut deck = Deck::new("i");
    let batch = vec![
        seed("a", Tier::Beginner),
        seed("b", Tier::Beginner),
        seed("c", Tier::Expert),
    ];

    assert_eq!(scheduler::admit(&mut deck, batch.clone()), 3);
    let before = deck.to_state();
    assert_eq!(scheduler::admit(&mut deck, batch), 0);
    let after = deck.to_state();

    assert_eq!(before.new_queue, after.new_queue);
    assert_eq!(before.cooldown_queue, after.cooldown_queue);
    assert_eq!(before.review_queue, after.review_queue);
}

#[test]
fn admission_with_empty_input_changes_nothing() {
    let mut deck = Deck::new("e");
    assert_eq!(scheduler::admit(&mut deck, Vec::new()), 0);
    assert!(deck.cards().is_empty());
}

#[test]
fn tier_defaults_shrink_with_difficulty() {
    let mut deck = Deck::new("t");
    scheduler::admit(&mut deck, Tier::ALL.iter().map(|t| seed(t.as_str(), *t)));

    let cooldowns: Vec<u32> = Tier::ALL
        .iter()
        .map(|t| deck.card(t.as_str()).unwrap().cooldown)
        .collect();
    assert_eq!(cooldowns, [7, 6, 5, 4]);
}

#[test]
fn cards_come_back_for_review_after_cooldown() {
    let config = DeckConfig {
        min_cooldown: 1,
        ..no_jitter()
    };
    let mut deck = Deck::with_config("loop", config);
    scheduler::admit(
        &mut deck,
        vec![
            seed("a", Tier::Beginner).with_cooldown(1),
            seed("b", Tier::Beginner).with_cooldown(1),
            seed("c", Tier::Beginner).with_cooldown(1),
        ],
    );
    let mut sched = Scheduler::with_seed(5);

    // wrong answers keep cooldowns at the floor of 1
    sched.answer(&mut deck, "a", false);
    sched.answer(&mut deck, "b", false);
    assert_eq!(deck.queue_of("a"), Some(QueueKind::Review));

    let outcome = sched.answer(&mut deck, "c", false).unwrap();
    assert_eq!(outcome.promoted, 1);
    assert_eq!(deck.queue_of("b"), Some(QueueKind::Review));
    assert_eq!(deck.counter(), 3);
}

#[test]
fn review_and_cooldown_cards_of_past_tiers_keep_circulating() {
    let deck = deck_from_queues(
        10,
        Tier::Advanced,
        vec![card("adv", Tier::Advanced, 5, 0)],
        vec![],
        vec![card("old", Tier::Beginner, 2, 3)],
    );

    let mut seen_old = false;
    for s in 0..100 {
        if Scheduler::with_seed(s).peek_next(&deck).unwrap().id == "old" {
            seen_old = true;
        }
    }
    assert!(seen_old);
}

#[test]
fn draw_next_advances_past_empty_tiers() {
    let mut deck = Deck::new("skip");
    scheduler::admit(&mut deck, vec![seed("exp", Tier::Expert)]);

    let draw = Scheduler::with_seed(0).draw_next(&mut deck);
    assert_eq!(draw.card.map(|c| c.id), Some("exp".to_string()));
    assert_eq!(draw.tiers_advanced, 3);
    assert_eq!(deck.current_tier(), Tier::Expert);
}

#[test]
fn cards_admitted_after_an_idle_draw_stay_reachable() {
    let mut deck = Deck::with_config("grow", no_jitter());
    let mut sched = Scheduler::with_seed(4);

    let idle = sched.draw_next(&mut deck);
    assert!(idle.card.is_none());
    assert_eq!(deck.current_tier(), Tier::Beginner);

    scheduler::admit(&mut deck, vec![seed("a", Tier::Beginner), seed("b", Tier::Intermediate)]);
    let draw = sched.draw_next(&mut deck);
    assert_eq!(draw.card.map(|c| c.id), Some("a".to_string()));

    sched.answer(&mut deck, "a", true);
    let draw = sched.draw_next(&mut deck);
    assert_eq!(draw.card.map(|c| c.id), Some("b".to_string()));
    assert_eq!(draw.tiers_advanced, 1);

    sched.answer(&mut deck, "b", true);
    let resting = sched.draw_next(&mut deck);
    assert!(resting.card.is_none());
    assert_eq!(deck.current_tier(), Tier::Intermediate);

    scheduler::admit(&mut deck, vec![seed("c", Tier::Intermediate)]);
    let draw = sched.draw_next(&mut deck);
    assert_eq!(draw.card.map(|c| c.id), Some("c".to_string()));
}

#[test]
fn counter_counts_answers_only() {
    let mut deck = Deck::new("c");
    scheduler::admit(&mut deck, vec![seed("a", Tier::Beginner)]);
    let mut sched = Scheduler::with_seed(2);

    sched.peek_next(&deck);
    scheduler::refresh_review_queue(&mut deck);
    scheduler::advance(&mut deck);
    assert_eq!(deck.counter(), 0);

    sched.answer(&mut deck, "a", true);
    sched.answer(&mut deck, "missing", true);
    assert_eq!(deck.counter(), 1);
}

#[test]
fn same_seed_same_session() {
    let play = |s: u64| {
        let mut deck = Deck::new("r");
        scheduler::admit(
            &mut deck,
            (0..8).map(|i| seed(&format!("c{i}"), Tier::Beginner)),
        );
        let mut sched = Scheduler::with_seed(s);
        let mut trace = Vec::new();
        for turn in 0..30 {
            let Some(next) = sched.peek_next(&deck).map(|c| c.id.clone()) else {
                break;
            };
            let outcome = sched.answer(&mut deck, &next, turn % 3 != 0).unwrap();
            trace.push((next, outcome.cooldown));
        }
        trace
    };

    assert_eq!(play(77), play(77));
}
