use rand::Rng;

use super::cards::{Hand, Seat, CARDS_PER_HAND, NR_SEATS};
use super::player_view::PlayerView;
use super::round::Round;
use crate::utils::shuffle_and_deal;

/// One possible world consistent with `view`.
///
/// The unseen cards are dealt uniformly at random to the other three seats,
/// each getting as many as it still has to play. Nothing is inferred from the
/// trump declaration or from which suits a seat failed to follow.
pub fn sample(view: &PlayerView, rng: &mut impl Rng) -> Round {
    let played = view.played_count_by_seat();
    let others: Vec<Seat> = (0..NR_SEATS).filter(|seat| *seat != view.seat).collect();
    let sizes: Vec<usize> = others
        .iter()
        .map(|seat| CARDS_PER_HAND.saturating_sub(played[*seat]))
        .collect();

    let dealt = shuffle_and_deal(&view.unseen_cards().cards(), &sizes, rng);

    let mut hands = [Hand::EMPTY; NR_SEATS];
    hands[view.seat] = view.hand;
    for (seat, cards) in others.into_iter().zip(dealt) {
        hands[seat] = cards.into_iter().collect();
    }
    view.to_round(hands)
}
