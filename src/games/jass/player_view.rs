use serde::{Deserialize, Serialize};

use super::cards::{Card, Hand, Seat, Trump, CARDS_PER_HAND, NR_SEATS, NR_TRICKS};
use super::error::RoundError;
use super::round::{Round, Trick};
use super::rules::legal_cards;

/// What one seat knows about a round: its own hand plus everything public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// the observing seat
    pub seat: Seat,
    pub dealer: Seat,
    pub player: Option<Seat>,
    pub trump: Option<Trump>,
    pub forehand: Option<bool>,
    pub declared_trump: Option<Seat>,
    pub hand: Hand,
    pub tricks: [Trick; NR_TRICKS],
    pub nr_tricks: usize,
    pub nr_cards_in_trick: usize,
    pub nr_played_cards: usize,
    pub points: [i32; 2],
}

impl PlayerView {
    /// View of the seat that has to act next.
    pub fn from_round(round: &Round) -> PlayerView {
        let seat = round.player.expect("round is already finished");
        PlayerView::for_seat(round, seat)
    }

    pub fn for_seat(round: &Round, seat: Seat) -> PlayerView {
        assert!(seat < NR_SEATS, "invalid seat {seat}");
        PlayerView {
            seat,
            dealer: round.dealer,
            player: round.player,
            trump: round.trump,
            forehand: round.forehand,
            declared_trump: round.declared_trump,
            hand: round.hands[seat],
            tricks: round.tricks,
            nr_tricks: round.nr_tricks,
            nr_cards_in_trick: round.nr_cards_in_trick,
            nr_played_cards: round.nr_played_cards,
            points: round.points,
        }
    }

    /// View of the seat to act after `cards_played` cards of a logged round,
    /// its hand recovered from the cards it plays later on.
    pub fn from_complete_round(
        round: &Round,
        cards_played: usize,
    ) -> Result<PlayerView, RoundError> {
        let replayed = round.state_after(cards_played)?;
        let seat = replayed.player.ok_or(RoundError::RoundFinished)?;
        Ok(PlayerView::for_seat(&replayed, seat))
    }

    pub fn current_trick(&self) -> Option<&Trick> {
        self.tricks.get(self.nr_tricks)
    }

    pub fn current_trick_cards(&self) -> &[Card] {
        self.current_trick().map(|t| t.cards()).unwrap_or(&[])
    }

    pub fn played_cards(&self) -> Hand {
        self.tricks
            .iter()
            .flat_map(|t| t.cards().iter().copied())
            .collect()
    }

    pub fn played_count_by_seat(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for (seat, _) in self.tricks.iter().flat_map(|t| t.plays()) {
            counts[seat] += 1;
        }
        counts
    }

    /// Cards held by the other three seats.
    pub fn unseen_cards(&self) -> Hand {
        Hand::FULL - self.hand - self.played_cards()
    }

    pub fn is_my_turn(&self) -> bool {
        self.player == Some(self.seat)
    }

    /// True while the forehand may still push the trump decision to its partner.
    pub fn can_push(&self) -> bool {
        self.trump.is_none() && self.forehand.is_none()
    }

    /// Cards the observing seat may play now.
    pub fn legal_cards(&self) -> Hand {
        let trump = self.trump.expect("trump has not been declared");
        assert!(self.is_my_turn(), "seat {} is not to act", self.seat);
        legal_cards(self.hand, self.current_trick_cards(), trump)
    }

    /// A full round with the given hands and this view's public history.
    pub fn to_round(&self, hands: [Hand; 4]) -> Round {
        let mut round = Round::new(self.dealer);
        round.player = self.player;
        round.trump = self.trump;
        round.forehand = self.forehand;
        round.declared_trump = self.declared_trump;
        round.hands = hands;
        round.tricks = self.tricks;
        round.nr_tricks = self.nr_tricks;
        round.nr_cards_in_trick = self.nr_cards_in_trick;
        round.nr_played_cards = self.nr_played_cards;
        round.points = self.points;
        round
    }

    pub fn check_invariants(&self) -> Result<(), RoundError> {
        self.to_round([Hand::EMPTY; 4]).check_public_invariants()?;

        let played = self.played_cards();
        if !(self.hand & played).is_empty() {
            return Err(RoundError::Invariant(format!(
                "hand holds played cards {}",
                self.hand & played
            )));
        }
        let expected = CARDS_PER_HAND - self.played_count_by_seat()[self.seat];
        if self.hand.len() != expected {
            return Err(RoundError::Invariant(format!(
                "seat {} holds {} cards, expected {}",
                self.seat,
                self.hand.len(),
                expected
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::jass::cards::*;
    use crate::games::jass::round::tests::{logged_round, random_playthrough, LOGGED_TRICKS};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_view_hides_other_hands() {
        let mut round = Round::new(EAST);
        round.deal_cards(&mut StdRng::seed_from_u64(8));
        round.declare_trump(TrumpAction::Declare(Trump::Suit(Suit::Clubs)));
        let card = round.legal_cards().first().unwrap();
        round.play_card(card);

        let view = PlayerView::from_round(&round);
        assert_eq!(view.seat, round.player.unwrap());
        assert_eq!(view.hand, round.hands[view.seat]);
        assert_eq!(view.current_trick_cards(), &[card]);
        assert_eq!(view.unseen_cards().len(), 36 - 9 - 1);
        assert!(view.is_my_turn());
        assert!(!view.can_push());
        assert!(view.check_invariants().is_ok());
        assert_eq!(view.legal_cards(), round.legal_cards());
    }

    #[test]
    fn test_can_push_before_declaration() {
        let mut round = Round::new(NORTH);
        round.deal_cards(&mut StdRng::seed_from_u64(1));
        assert!(PlayerView::from_round(&round).can_push());
        round.declare_trump(TrumpAction::Push);
        let view = PlayerView::from_round(&round);
        assert_eq!(view.seat, EAST);
        assert!(!view.can_push());
    }

    #[test]
    fn test_from_complete_round() {
        let mut round = logged_round();
        for (_, cards, _, _) in LOGGED_TRICKS {
            for card in cards {
                round.play_card(card);
            }
        }
        // fifth card: first card of the second trick, led by North
        let view = PlayerView::from_complete_round(&round, 4).unwrap();
        assert_eq!(view.seat, NORTH);
        assert_eq!(view.nr_tricks, 1);
        assert_eq!(view.hand.len(), 8);
        assert!(view.hand.contains(S7));
        assert!(view.check_invariants().is_ok());

        assert_eq!(
            PlayerView::from_complete_round(&round, 36),
            Err(RoundError::RoundFinished)
        );
    }

    #[test]
    fn test_view_invariants_catch_bad_hand() {
        let round = random_playthrough(SOUTH, Trump::ObeAbe, 4).state_after(10).unwrap();
        let mut view = PlayerView::from_round(&round);
        view.hand.insert(round.tricks[0].cards()[0]);
        assert!(view.check_invariants().is_err());
    }

    #[test]
    fn test_view_invariants_require_own_hand() {
        let round = random_playthrough(EAST, Trump::Suit(Suit::Diamonds), 12)
            .state_after(7)
            .unwrap();
        let mut view = PlayerView::from_round(&round);
        assert!(view.check_invariants().is_ok());
        view.hand = Hand::EMPTY;
        assert!(matches!(
            view.check_invariants(),
            Err(RoundError::Invariant(_))
        ));
    }

    #[test]
    #[should_panic(expected = "is not to act")]
    fn test_legal_cards_out_of_turn_panics() {
        let mut round = Round::new(NORTH);
        round.deal_cards(&mut StdRng::seed_from_u64(1));
        round.declare_trump(TrumpAction::Declare(Trump::ObeAbe));
        PlayerView::for_seat(&round, NORTH).legal_cards();
    }
}
