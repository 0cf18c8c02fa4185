#![feature(test)]
extern crate test;

use jass_rs::games::jass::{
    legal_cards, mcts::search, sample, Card, Hand, MctsConfig, PlayerView, Round, Suit, Trump,
    TrumpAction,
};
use rand::{rngs::StdRng, seq::IteratorRandom, SeedableRng};
use test::{black_box, Bencher};

fn jass_playthrough(rng: &mut StdRng) -> Round {
    let mut round = Round::new(0);
    round.deal_cards(rng);
    round.declare_trump(TrumpAction::Declare(Trump::Suit(Suit::Hearts)));
    while !round.is_finished() {
        let card = round
            .legal_cards()
            .iter()
            .choose(rng)
            .expect("should have a card to play");
        round.play_card(card);
    }
    round
}

#[bench]
fn bench_random_playthrough(b: &mut Bencher) {
    let mut rng = StdRng::seed_from_u64(42);
    b.iter(|| {
        black_box(jass_playthrough(&mut rng));
    })
}

#[bench]
fn bench_legal_cards(b: &mut Bencher) {
    let hand: Hand = ["SK", "S6", "HJ", "H6", "D7", "C9"]
        .iter()
        .map(|s| s.parse::<Card>().unwrap())
        .collect();
    let trick: Vec<Card> = ["SA", "H9"].iter().map(|s| s.parse().unwrap()).collect();
    b.iter(|| {
        black_box(legal_cards(hand, &trick, Trump::Suit(Suit::Hearts)));
    })
}

#[bench]
fn bench_sample(b: &mut Bencher) {
    let mut rng = StdRng::seed_from_u64(7);
    let mut round = Round::new(0);
    round.deal_cards(&mut rng);
    round.declare_trump(TrumpAction::Declare(Trump::ObeAbe));
    let view = PlayerView::from_round(&round);
    b.iter(|| {
        black_box(sample(&view, &mut rng));
    })
}

#[bench]
fn bench_search_100_iterations(b: &mut Bencher) {
    let mut round = Round::new(0);
    round.deal_cards(&mut StdRng::seed_from_u64(3));
    round.declare_trump(TrumpAction::Declare(Trump::UneUfe));
    let view = PlayerView::from_round(&round);
    let config = MctsConfig {
        budget_ms: 60_000,
        max_iterations: Some(100),
        seed: Some(1),
        ..Default::default()
    };
    b.iter(|| {
        black_box(search(&view, &config));
    })
}
