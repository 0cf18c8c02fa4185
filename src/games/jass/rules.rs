use super::cards::{Card, Hand, Trump, JACK};
use super::error::RoundError;
use super::round::Round;

/// Cards of `hand` that may be played on top of `trick`.
///
/// Trump mode obe-abe/une-ufe: follow suit if possible.
/// Trump led: trumps must be followed, except that a lone trump jack need not be played.
/// Other suit led: follow suit or trump, but never under-trump a trump already in the trick
/// unless nothing but trumps is left in the hand.
pub fn legal_cards(hand: Hand, trick: &[Card], trump: Trump) -> Hand {
    assert!(
        trick.len() < 4,
        "trick already holds {} cards",
        trick.len()
    );
    let Some(first) = trick.first() else {
        return hand;
    };
    let lead = first.suit();
    let follow = hand.of_suit(lead);

    let trump_suit = match trump {
        Trump::ObeAbe | Trump::UneUfe => {
            return if follow.is_empty() { hand } else { follow };
        }
        Trump::Suit(suit) => suit,
    };
    let trumps = hand.of_suit(trump_suit);

    if lead == trump_suit {
        let only_jack =
            trumps.len() == 1 && trumps.contains(Card::from_suit_rank(trump_suit, JACK));
        return if trumps.is_empty() || only_jack {
            hand
        } else {
            trumps
        };
    }

    let lowest_trump = trick[1..]
        .iter()
        .filter(|c| c.suit() == trump_suit)
        .min_by_key(|c| c.trump_strength());

    match lowest_trump {
        None => {
            if follow.is_empty() {
                hand
            } else {
                follow | trumps
            }
        }
        Some(_) if trumps == hand => hand,
        Some(lowest) => {
            let higher: Hand = trumps.iter().filter(|c| c.is_higher_trump(*lowest)).collect();
            if follow.is_empty() {
                hand - (trumps - higher)
            } else {
                follow | higher
            }
        }
    }
}

/// Check that every card played in `round` was legal when it was played.
pub fn validate_round(round: &Round) -> Result<(), RoundError> {
    let trump = round.trump.ok_or(RoundError::TrumpNotDeclared)?;
    let mut hands = round.initial_hands();
    for (nr_trick, trick) in round.tricks.iter().enumerate() {
        for (position, (seat, card)) in trick.plays().enumerate() {
            let legal = legal_cards(hands[seat], &trick.cards()[..position], trump);
            if !legal.contains(card) {
                return Err(RoundError::IllegalCard {
                    seat,
                    card,
                    trick: nr_trick,
                });
            }
            hands[seat].remove(card);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::jass::cards::*;
    use crate::games::jass::round::tests::{logged_round, random_playthrough, LOGGED_TRICKS};
    use enum_iterator::all;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    fn hand(cards: &[Card]) -> Hand {
        cards.iter().copied().collect()
    }

    const HEARTS: Trump = Trump::Suit(Suit::Hearts);

    #[test]
    fn test_lead_allows_anything() {
        let h = hand(&[SA, HK, D6]);
        for trump in all::<Trump>() {
            assert_eq!(legal_cards(h, &[], trump), h);
        }
    }

    #[test]
    fn test_obe_une_follow_suit() {
        let h = hand(&[SK, S6, H6]);
        assert_eq!(legal_cards(h, &[SA], Trump::ObeAbe), hand(&[SK, S6]));
        assert_eq!(legal_cards(h, &[SA, SQ], Trump::UneUfe), hand(&[SK, S6]));
        assert_eq!(legal_cards(h, &[DA], Trump::UneUfe), h);
    }

    #[test]
    fn test_trump_led() {
        // lone trump jack does not have to be played
        let h = hand(&[HJ, S6, D7]);
        assert_eq!(legal_cards(h, &[HA], HEARTS), h);
        // lone other trump must be played
        assert_eq!(legal_cards(hand(&[H6, S6]), &[HA], HEARTS), hand(&[H6]));
        // several trumps, jack included
        assert_eq!(
            legal_cards(hand(&[HJ, H7, S6]), &[HA], HEARTS),
            hand(&[HJ, H7])
        );
        assert_eq!(legal_cards(hand(&[S6, D7]), &[HA], HEARTS), hand(&[S6, D7]));
    }

    #[test]
    fn test_no_trump_played_yet() {
        assert_eq!(
            legal_cards(hand(&[SK, H6, D7]), &[SA], HEARTS),
            hand(&[SK, H6])
        );
        assert_eq!(
            legal_cards(hand(&[H6, D7]), &[SA, S7], HEARTS),
            hand(&[H6, D7])
        );
    }

    #[test]
    fn test_trump_already_played() {
        // follow suit or over-trump
        assert_eq!(
            legal_cards(hand(&[SK, HJ, H6, D7]), &[SA, H9], HEARTS),
            hand(&[SK, HJ])
        );
        // void in the led suit: anything but an under-trump
        assert_eq!(
            legal_cards(hand(&[HJ, H6, D7]), &[SA, H9], HEARTS),
            hand(&[HJ, D7])
        );
        // only trumps left
        assert_eq!(
            legal_cards(hand(&[H6, H7]), &[SA, H9, S6], HEARTS),
            hand(&[H6, H7])
        );
    }

    #[test]
    fn test_lowest_trump_uses_trump_order() {
        // HK is the weaker of the two trumps, HA beats it
        assert_eq!(
            legal_cards(hand(&[HA, D7]), &[SA, H9, HK], HEARTS),
            hand(&[HA, D7])
        );
        assert_eq!(
            legal_cards(hand(&[HQ, D7]), &[SA, H9, HK], HEARTS),
            hand(&[D7])
        );
    }

    #[test]
    #[should_panic(expected = "trick already holds 4 cards")]
    fn test_complete_trick_panics() {
        legal_cards(hand(&[DA]), &[SA, SK, SQ, SJ], HEARTS);
    }

    #[test]
    fn test_validate_logged_round() {
        let mut round = logged_round();
        for (_, cards, _, _) in LOGGED_TRICKS {
            for card in cards {
                round.play_card(card);
            }
        }
        assert_eq!(validate_round(&round), Ok(()));
    }

    #[test]
    fn test_validate_detects_revoke() {
        let mut round = Round::new(NORTH);
        round.hands[WEST] = hand(&[SA]);
        round.hands[SOUTH] = hand(&[SK, H6]);
        round.declare_trump(TrumpAction::Declare(Trump::ObeAbe));
        round.play_card(SA);
        round.play_card(H6);
        assert_eq!(
            validate_round(&round),
            Err(RoundError::IllegalCard {
                seat: SOUTH,
                card: H6,
                trick: 0
            })
        );
    }

    #[test]
    fn test_random_rounds_only_play_legal_cards() {
        for (i, trump) in all::<Trump>().enumerate() {
            let round = random_playthrough(i % 4, trump, 100 + i as u64);
            assert_eq!(validate_round(&round), Ok(()));
        }
    }

    proptest! {
        #[test]
        fn prop_legal_cards_is_non_empty_subset(seed in any::<u64>(), hand_size in 1usize..=9, trick_size in 0usize..4, trump in 0usize..6) {
            let trump = Trump::from_index(trump).unwrap();
            let mut deck: Vec<Card> = Card::all().collect();
            deck.shuffle(&mut StdRng::seed_from_u64(seed));
            let h: Hand = deck[..hand_size].iter().copied().collect();
            let trick = &deck[hand_size..hand_size + trick_size];
            let legal = legal_cards(h, trick, trump);
            prop_assert!(!legal.is_empty());
            prop_assert_eq!(legal - h, Hand::EMPTY);
        }
    }
}
