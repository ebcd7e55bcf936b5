//! Benchmark suite for tier-deck
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tier_deck::scheduler::{self, Scheduler};
use tier_deck::{CardSeed, Deck, Tier};

fn populated_deck(cards: usize) -> Deck {
    let mut deck = Deck::new("bench");
    scheduler::admit(
        &mut deck,
        (0..cards).map(|i| {
            let tier = Tier::from_index(i % Tier::COUNT).unwrap_or_default();
            CardSeed::new(format!("c{i}"), format!("Card {i}"), tier)
        }),
    );
    let mut sched = Scheduler::with_seed(1);
    for turn in 0..cards {
        let draw = sched.draw_next(&mut deck);
        let Some(card) = draw.card else { break };
        sched.answer(&mut deck, &card.id, turn % 4 != 0);
    }
    deck
}

fn bench_peek_next(c: &mut Criterion) {
    let mut group = c.benchmark_group("peek_next");
    for size in [100usize, 1_000, 10_000] {
        let deck = populated_deck(size);
        let mut sched = Scheduler::with_seed(7);
        group.bench_with_input(BenchmarkId::from_parameter(size), &deck, |b, deck| {
            b.iter(|| black_box(sched.peek_next(deck).map(|c| c.cooldown)))
        });
    }
    group.finish();
}

fn bench_answer(c: &mut Criterion) {
    let mut group = c.benchmark_group("answer");
    for size in [100usize, 1_000, 10_000] {
        let deck = populated_deck(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &deck, |b, deck| {
            b.iter_batched(
                || (deck.clone(), Scheduler::with_seed(3)),
                |(mut deck, mut sched)| {
                    let id = sched.peek_next(&deck).map(|c| c.id.clone());
                    if let Some(id) = id {
                        black_box(sched.answer(&mut deck, &id, true));
                    }
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let deck = populated_deck(1_000);
    c.bench_function("Deck::to_state/1000", |b| b.iter(|| black_box(deck.to_state())));
}

criterion_group!(benches, bench_peek_next, bench_answer, bench_snapshot);
criterion_main!(benches);
