use rand::Rng;
use serde::{Deserialize, Serialize};

use super::cards::{
    next_seat, partner, team, Card, Hand, Seat, Trump, TrumpAction, CARDS_PER_HAND,
    LAST_TRICK_BONUS, NR_CARDS, NR_SEATS, NR_TRICKS,
};
use super::error::RoundError;
use super::rules::legal_cards;
use crate::utils::shuffle_and_deal;

/// Up to four cards in the order they were played, plus the result once complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    // slots past `len` always hold the first card of the deck
    cards: [Card; 4],
    len: usize,
    pub first_player: Option<Seat>,
    pub winner: Option<Seat>,
    pub points: i32,
}

impl Default for Trick {
    fn default() -> Self {
        Self {
            cards: [Card::new(0); 4],
            len: 0,
            first_player: None,
            winner: None,
            points: 0,
        }
    }
}

impl Trick {
    pub fn new(first_player: Seat) -> Self {
        Self {
            first_player: Some(first_player),
            ..Default::default()
        }
    }

    pub fn from_cards(first_player: Seat, cards: &[Card]) -> Self {
        let mut trick = Trick::new(first_player);
        for card in cards {
            trick.push(*card);
        }
        trick
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_complete(&self) -> bool {
        self.len == 4
    }

    pub fn push(&mut self, card: Card) {
        assert!(self.len < 4, "trick is already complete");
        self.cards[self.len] = card;
        self.len += 1;
    }

    /// Seat that played (or will play) the card at `position` in this trick.
    pub fn player_at(&self, position: usize) -> Option<Seat> {
        self.first_player
            .map(|first| (first + NR_SEATS - position % NR_SEATS) % NR_SEATS)
    }

    /// Cards of the trick together with the seat that played them.
    pub fn plays(&self) -> impl Iterator<Item = (Seat, Card)> + '_ {
        self.cards()
            .iter()
            .enumerate()
            .filter_map(|(position, card)| self.player_at(position).map(|seat| (seat, *card)))
    }
}

/// Points of the cards in a trick, the last trick of the round earns a bonus.
pub fn calc_points(cards: &[Card], trump: Trump, is_last: bool) -> i32 {
    let points: i32 = cards.iter().map(|c| c.points(trump)).sum();
    if is_last {
        points + LAST_TRICK_BONUS
    } else {
        points
    }
}

/// Position (0 = first card) of the card currently winning the trick.
pub fn winning_position(cards: &[Card], trump: Trump) -> usize {
    let lead = cards.first().expect("trick has no cards").suit();
    let mut winner = 0;
    match trump {
        Trump::UneUfe => {
            // lowest card of the led suit, a higher rank offset is a lower card
            for (i, card) in cards.iter().enumerate().skip(1) {
                if card.suit() == lead && card.rank() > cards[winner].rank() {
                    winner = i;
                }
            }
        }
        Trump::ObeAbe => {
            for (i, card) in cards.iter().enumerate().skip(1) {
                if card.suit() == lead && card.rank() < cards[winner].rank() {
                    winner = i;
                }
            }
        }
        Trump::Suit(trump_suit) if lead == trump_suit => {
            for (i, card) in cards.iter().enumerate().skip(1) {
                if card.is_higher_trump(cards[winner]) {
                    winner = i;
                }
            }
        }
        Trump::Suit(trump_suit) => {
            let mut trump_played = false;
            for (i, card) in cards.iter().enumerate().skip(1) {
                if card.suit() == trump_suit {
                    if !trump_played || card.is_higher_trump(cards[winner]) {
                        trump_played = true;
                        winner = i;
                    }
                } else if !trump_played && card.suit() == lead && card.rank() < cards[winner].rank()
                {
                    winner = i;
                }
            }
        }
    }
    winner
}

/// Seat that wins a trick led by `first_player`.
pub fn calc_winner(cards: &[Card], first_player: Seat, trump: Trump) -> Seat {
    let position = winning_position(cards, trump);
    (first_player + NR_SEATS - position) % NR_SEATS
}

/// Queryable phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// no cards dealt and trump undecided
    Dealing,
    /// forehand has to declare trump or push
    Trump,
    /// forehand pushed, partner has to declare
    TrumpPartner,
    Play,
    Finished,
}

/// One deal of Jass: hands, trump and the nine tricks.
///
/// The fields are public so collaborators can rebuild a round from stored
/// data; [`Round::check_invariants`] verifies such a reconstruction. Game
/// progress should go through [`Round::declare_trump`] and
/// [`Round::play_card`] only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub dealer: Seat,
    /// seat of the next action, `None` once the round is finished
    pub player: Option<Seat>,
    pub trump: Option<Trump>,
    /// true if the forehand declared, false after a push
    pub forehand: Option<bool>,
    pub declared_trump: Option<Seat>,
    pub hands: [Hand; 4],
    pub tricks: [Trick; NR_TRICKS],
    pub nr_tricks: usize,
    pub nr_cards_in_trick: usize,
    pub nr_played_cards: usize,
    /// points of team 0 (North/South) and team 1 (East/West)
    pub points: [i32; 2],
}

impl Round {
    pub fn new(dealer: Seat) -> Self {
        assert!(dealer < NR_SEATS, "invalid dealer {dealer}");
        Self {
            dealer,
            // the first action is the trump declaration by the dealer's successor
            player: Some(next_seat(dealer)),
            trump: None,
            forehand: None,
            declared_trump: None,
            hands: [Hand::EMPTY; 4],
            tricks: [Trick::default(); NR_TRICKS],
            nr_tricks: 0,
            nr_cards_in_trick: 0,
            nr_played_cards: 0,
            points: [0, 0],
        }
    }

    /// Seat that declares trump if nobody pushes.
    pub fn forehand_seat(&self) -> Seat {
        next_seat(self.dealer)
    }

    pub fn try_deal_cards(&mut self, rng: &mut impl Rng) -> Result<(), RoundError> {
        if self.nr_played_cards > 0 || self.hands.iter().any(|h| !h.is_empty()) {
            return Err(RoundError::AlreadyDealt);
        }
        let deck: Vec<Card> = Card::all().collect();
        let dealt = shuffle_and_deal(&deck, &[CARDS_PER_HAND; NR_SEATS], rng);
        for (hand, cards) in self.hands.iter_mut().zip(dealt) {
            *hand = cards.into_iter().collect();
        }
        Ok(())
    }

    pub fn deal_cards(&mut self, rng: &mut impl Rng) {
        if let Err(e) = self.try_deal_cards(rng) {
            panic!("{e}");
        }
    }

    pub fn state(&self) -> RoundState {
        if self.nr_played_cards == NR_CARDS {
            RoundState::Finished
        } else if self.trump.is_some() {
            RoundState::Play
        } else if self.forehand.is_none() && self.hands.iter().all(|h| h.is_empty()) {
            RoundState::Dealing
        } else if self.forehand == Some(false) {
            RoundState::TrumpPartner
        } else {
            RoundState::Trump
        }
    }

    /// Seat that has to make the trump decision, `None` once trump is set.
    pub fn trump_seat(&self) -> Option<Seat> {
        match (self.trump, self.forehand) {
            (Some(_), _) => None,
            (None, None) => Some(self.forehand_seat()),
            (None, Some(false)) => Some(partner(self.forehand_seat())),
            (None, Some(true)) => None,
        }
    }

    pub fn try_declare_trump(&mut self, action: TrumpAction) -> Result<(), RoundError> {
        let expected = self.trump_seat().ok_or(RoundError::TrumpAlreadyDeclared)?;
        if self.player != Some(expected) {
            return Err(RoundError::NotYourTurn {
                expected,
                actual: self.player,
            });
        }
        match (self.forehand, action) {
            (None, TrumpAction::Push) => {
                self.forehand = Some(false);
                self.player = Some(partner(expected));
            }
            (None, TrumpAction::Declare(trump)) => {
                self.trump = Some(trump);
                self.forehand = Some(true);
                self.declared_trump = Some(expected);
                // the declarer also leads the first trick
                self.tricks[0] = Trick::new(expected);
            }
            (_, TrumpAction::Push) => return Err(RoundError::PushNotAllowed(action)),
            (_, TrumpAction::Declare(trump)) => {
                self.trump = Some(trump);
                self.declared_trump = Some(expected);
                // after a push the forehand still leads the first trick
                let first = self.forehand_seat();
                self.player = Some(first);
                self.tricks[0] = Trick::new(first);
            }
        }
        Ok(())
    }

    pub fn declare_trump(&mut self, action: TrumpAction) {
        if let Err(e) = self.try_declare_trump(action) {
            panic!("{e}");
        }
    }

    pub fn try_play_card(&mut self, card: Card) -> Result<(), RoundError> {
        if self.nr_played_cards >= NR_CARDS {
            return Err(RoundError::RoundFinished);
        }
        let trump = self.trump.ok_or(RoundError::TrumpNotDeclared)?;
        let player = self.player.ok_or(RoundError::RoundFinished)?;
        if !self.hands[player].contains(card) {
            return Err(RoundError::CardNotInHand { seat: player, card });
        }

        self.hands[player].remove(card);
        self.tricks[self.nr_tricks].push(card);
        self.nr_played_cards += 1;

        if self.nr_cards_in_trick < 3 {
            self.nr_cards_in_trick += 1;
            self.player = Some(next_seat(player));
        } else {
            self.end_trick(trump);
        }
        Ok(())
    }

    pub fn play_card(&mut self, card: Card) {
        if let Err(e) = self.try_play_card(card) {
            panic!("{e}");
        }
    }

    fn end_trick(&mut self, trump: Trump) {
        let is_last = self.nr_played_cards == NR_CARDS;
        let trick = &mut self.tricks[self.nr_tricks];
        let first = trick
            .first_player
            .expect("trick should have a first player");
        let points = calc_points(trick.cards(), trump, is_last);
        let winner = calc_winner(trick.cards(), first, trump);
        trick.points = points;
        trick.winner = Some(winner);
        self.points[team(winner)] += points;

        self.nr_tricks += 1;
        self.nr_cards_in_trick = 0;
        if self.nr_tricks < NR_TRICKS {
            // winner of the trick leads
            self.tricks[self.nr_tricks] = Trick::new(winner);
            self.player = Some(winner);
        } else {
            self.player = None;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.nr_played_cards == NR_CARDS
    }

    /// The trick being played, `None` once all nine tricks are complete.
    pub fn current_trick(&self) -> Option<&Trick> {
        self.tricks.get(self.nr_tricks)
    }

    pub fn current_trick_cards(&self) -> &[Card] {
        self.current_trick().map(|t| t.cards()).unwrap_or(&[])
    }

    pub fn completed_tricks(&self) -> &[Trick] {
        &self.tricks[..self.nr_tricks]
    }

    pub fn points_for_team(&self, team: usize) -> i32 {
        self.points[team]
    }

    /// Team with more points, `None` for a draw or an unfinished round.
    pub fn winning_team(&self) -> Option<usize> {
        if !self.is_finished() || self.points[0] == self.points[1] {
            return None;
        }
        Some(if self.points[0] > self.points[1] { 0 } else { 1 })
    }

    /// Cards the seat to act may play.
    pub fn legal_cards(&self) -> Hand {
        let trump = self.trump.expect("trump has not been declared");
        let player = self.player.expect("round is already finished");
        legal_cards(self.hands[player], self.current_trick_cards(), trump)
    }

    /// Every card played so far together with the seat that played it.
    pub fn plays(&self) -> impl Iterator<Item = (Seat, Card)> + '_ {
        self.tricks.iter().flat_map(|t| t.plays())
    }

    pub fn played_cards(&self) -> Hand {
        self.plays().map(|(_, card)| card).collect()
    }

    /// Cards played so far by each seat.
    pub fn played_count_by_seat(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for (seat, _) in self.plays() {
            counts[seat] += 1;
        }
        counts
    }

    /// The hands as they were right after dealing, recovered from the played cards.
    pub fn initial_hands(&self) -> [Hand; 4] {
        let mut hands = self.hands;
        for (seat, card) in self.plays() {
            hands[seat].insert(card);
        }
        hands
    }

    /// Rebuild the round as it was after `cards_played` cards, replaying the
    /// declaration and the plays through the state machine.
    pub fn state_after(&self, cards_played: usize) -> Result<Round, RoundError> {
        let trump = self.trump.ok_or(RoundError::TrumpNotDeclared)?;
        if cards_played > self.nr_played_cards {
            return Err(RoundError::Invariant(format!(
                "cannot replay {} cards, only {} were played",
                cards_played, self.nr_played_cards
            )));
        }
        let mut round = Round::new(self.dealer);
        round.hands = self.initial_hands();
        if self.forehand == Some(false) {
            round.try_declare_trump(TrumpAction::Push)?;
        }
        round.try_declare_trump(TrumpAction::Declare(trump))?;
        for (seat, card) in self.plays().take(cards_played) {
            if round.player != Some(seat) {
                return Err(RoundError::NotYourTurn {
                    expected: seat,
                    actual: round.player,
                });
            }
            round.try_play_card(card)?;
        }
        Ok(round)
    }

    /// Validate the internal consistency of the round.
    pub fn check_invariants(&self) -> Result<(), RoundError> {
        self.check_public_invariants()?;

        let played = self.played_cards();
        let held = self.hands.iter().fold(Hand::EMPTY, |acc, h| acc | *h);
        if held.len() != self.hands.iter().map(|h| h.len()).sum::<usize>() {
            return Err(RoundError::Invariant(
                "a card is held by two seats".to_string(),
            ));
        }
        if !(held & played).is_empty() {
            return Err(RoundError::Invariant(format!(
                "cards {} are both held and played",
                held & played
            )));
        }
        // hands may be left empty before the first card and in a reconstructed finished round
        if held.is_empty() && (self.nr_played_cards == 0 || self.is_finished()) {
            return Ok(());
        }
        if held.len() + played.len() != NR_CARDS {
            return Err(RoundError::Invariant(format!(
                "{} cards in play, expected {}",
                held.len() + played.len(),
                NR_CARDS
            )));
        }
        let played_by_seat = self.played_count_by_seat();
        for seat in 0..NR_SEATS {
            if self.hands[seat].len() + played_by_seat[seat] != CARDS_PER_HAND {
                return Err(RoundError::Invariant(format!(
                    "seat {} holds {} cards after playing {}",
                    seat,
                    self.hands[seat].len(),
                    played_by_seat[seat]
                )));
            }
        }
        Ok(())
    }

    /// Checks everything but the hands.
    pub(crate) fn check_public_invariants(&self) -> Result<(), RoundError> {
        let fail = |msg: String| -> Result<(), RoundError> { Err(RoundError::Invariant(msg)) };

        if self.dealer >= NR_SEATS {
            return fail(format!("invalid dealer {}", self.dealer));
        }

        // trump declaration
        let forehand_seat = self.forehand_seat();
        match (self.trump, self.forehand) {
            (Some(_), None) => return fail("trump set without a declaration".to_string()),
            (Some(_), Some(forehand)) => {
                let expected = if forehand {
                    forehand_seat
                } else {
                    partner(forehand_seat)
                };
                if self.declared_trump != Some(expected) {
                    return fail(format!(
                        "trump declared by {:?}, expected {}",
                        self.declared_trump, expected
                    ));
                }
            }
            (None, Some(true)) => return fail("forehand declared but no trump".to_string()),
            (None, _) => {
                if self.nr_played_cards > 0 {
                    return fail("cards played before trump was declared".to_string());
                }
                if self.player != self.trump_seat() {
                    return fail(format!(
                        "seat {:?} to declare trump, expected {:?}",
                        self.player,
                        self.trump_seat()
                    ));
                }
            }
        }

        // cards played
        if self.nr_tricks > NR_TRICKS || self.nr_cards_in_trick > 3 {
            return fail(format!(
                "{} tricks with {} cards in the current trick",
                self.nr_tricks, self.nr_cards_in_trick
            ));
        }
        if self.nr_played_cards != 4 * self.nr_tricks + self.nr_cards_in_trick {
            return fail(format!(
                "{} cards played but {} tricks and {} cards in the current trick",
                self.nr_played_cards, self.nr_tricks, self.nr_cards_in_trick
            ));
        }
        for (i, trick) in self.tricks.iter().enumerate() {
            let expected_len = match i.cmp(&self.nr_tricks) {
                std::cmp::Ordering::Less => 4,
                std::cmp::Ordering::Equal => self.nr_cards_in_trick,
                std::cmp::Ordering::Greater => 0,
            };
            if trick.len() != expected_len {
                return fail(format!("trick {} holds {} cards", i, trick.len()));
            }
        }

        // trick leaders, winners and points
        if let Some(trump) = self.trump {
            if self.tricks[0].first_player != Some(forehand_seat) {
                return fail(format!(
                    "first trick led by {:?}, expected {}",
                    self.tricks[0].first_player, forehand_seat
                ));
            }
            let mut team_points = [0; 2];
            for (i, trick) in self.completed_tricks().iter().enumerate() {
                let first = trick.first_player.unwrap_or(NR_SEATS);
                if first >= NR_SEATS {
                    return fail(format!("trick {i} has no first player"));
                }
                let winner = calc_winner(trick.cards(), first, trump);
                if trick.winner != Some(winner) {
                    return fail(format!(
                        "trick {} won by {:?}, the cards give {}",
                        i, trick.winner, winner
                    ));
                }
                let points = calc_points(trick.cards(), trump, i == NR_TRICKS - 1);
                if trick.points != points {
                    return fail(format!(
                        "trick {} scored {}, the cards give {}",
                        i, trick.points, points
                    ));
                }
                if let Some(next) = self.tricks.get(i + 1) {
                    if next.first_player != Some(winner) {
                        return fail(format!(
                            "trick {} led by {:?}, expected winner {}",
                            i + 1,
                            next.first_player,
                            winner
                        ));
                    }
                }
                team_points[team(winner)] += points;
            }
            if team_points != self.points {
                return fail(format!(
                    "team points {:?} but tricks give {:?}",
                    self.points, team_points
                ));
            }

            // seat to act
            let expected_player = self
                .current_trick()
                .and_then(|t| t.player_at(self.nr_cards_in_trick));
            if self.player != expected_player {
                return fail(format!(
                    "seat {:?} to act, expected {:?}",
                    self.player, expected_player
                ));
            }
        }

        if self.played_cards().len() != self.nr_played_cards {
            return fail("a card was played twice".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::games::jass::cards::*;
    use enum_iterator::all;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, seq::IteratorRandom, SeedableRng};

    /// Logged round: dealer West, pushed, une-ufe. (first, cards, points, winner)
    pub(crate) const LOGGED_TRICKS: [(Seat, [Card; 4], i32, Seat); 9] = [
        (2, [C7, CK, C6, CJ], 17, 0),
        (0, [S7, SJ, SA, C10], 12, 0),
        (0, [S9, S6, SQ, D10], 24, 3),
        (3, [H10, HJ, H6, HQ], 26, 1),
        (1, [H7, DA, H8, C9], 8, 1),
        (1, [H9, CA, HA, DJ], 2, 1),
        (1, [HK, S8, SK, CQ], 19, 1),
        (1, [DQ, D6, D9, DK], 18, 0),
        (0, [S10, D7, C8, D8], 31, 0),
    ];

    /// A round set up to replay the logged tricks: hands hold exactly the cards each seat plays.
    pub(crate) fn logged_round() -> Round {
        let mut round = Round::new(WEST);
        for (first, cards, _, _) in LOGGED_TRICKS {
            for (seat, card) in Trick::from_cards(first, &cards).plays() {
                round.hands[seat].insert(card);
            }
        }
        round.declare_trump(TrumpAction::Push);
        round.declare_trump(TrumpAction::Declare(Trump::UneUfe));
        round
    }

    pub(crate) fn random_playthrough(dealer: Seat, trump: Trump, seed: u64) -> Round {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut round = Round::new(dealer);
        round.deal_cards(&mut rng);
        round.declare_trump(TrumpAction::Declare(trump));
        while !round.is_finished() {
            let card = round
                .legal_cards()
                .iter()
                .choose(&mut rng)
                .expect("should have a card to play");
            round.play_card(card);
        }
        round
    }

    #[test]
    fn test_new_round() {
        let mut round = Round::new(NORTH);
        assert_eq!(round.player, Some(WEST));
        assert_eq!(round.state(), RoundState::Dealing);
        round.deal_cards(&mut StdRng::seed_from_u64(0));
        assert_eq!(round.state(), RoundState::Trump);
        assert!(round.check_invariants().is_ok());
    }

    #[test]
    fn test_deal() {
        let mut round = Round::new(EAST);
        round.deal_cards(&mut StdRng::seed_from_u64(3));
        assert!(round.hands.iter().all(|h| h.len() == 9));
        let all = round.hands.iter().fold(Hand::EMPTY, |acc, h| acc | *h);
        assert_eq!(all, Hand::FULL);
        assert!(round.check_invariants().is_ok());
    }

    #[test]
    #[should_panic(expected = "cards have already been dealt")]
    fn test_deal_twice_panics() {
        let mut round = Round::new(EAST);
        let mut rng = StdRng::seed_from_u64(3);
        round.deal_cards(&mut rng);
        round.deal_cards(&mut rng);
    }

    #[test]
    fn test_make_trump() {
        let mut round = Round::new(NORTH);
        round.declare_trump(TrumpAction::Declare(Trump::Suit(Suit::Diamonds)));
        assert_eq!(round.forehand, Some(true));
        assert_eq!(round.declared_trump, Some(WEST));
        assert_eq!(round.player, Some(WEST));
        assert_eq!(round.state(), RoundState::Play);
        assert!(round.check_invariants().is_ok());

        let mut round = Round::new(NORTH);
        round.declare_trump(TrumpAction::Push);
        assert_eq!(round.state(), RoundState::TrumpPartner);
        assert_eq!(round.player, Some(EAST));
        assert!(round.check_invariants().is_ok());
        round.declare_trump(TrumpAction::Declare(Trump::Suit(Suit::Diamonds)));
        assert_eq!(round.forehand, Some(false));
        assert_eq!(round.declared_trump, Some(EAST));
        assert_eq!(round.player, Some(WEST));
        assert!(round.check_invariants().is_ok());
    }

    #[test]
    #[should_panic(expected = "push is only allowed for the forehand")]
    fn test_second_push_panics() {
        let mut round = Round::new(NORTH);
        round.declare_trump(TrumpAction::Push);
        round.declare_trump(TrumpAction::Push);
    }

    #[test]
    #[should_panic(expected = "trump has already been declared")]
    fn test_declare_twice_panics() {
        let mut round = Round::new(NORTH);
        round.declare_trump(TrumpAction::Declare(Trump::ObeAbe));
        round.declare_trump(TrumpAction::Declare(Trump::UneUfe));
    }

    #[test]
    fn test_declare_out_of_turn() {
        let mut round = Round::new(NORTH);
        round.player = Some(SOUTH);
        assert_eq!(
            round.try_declare_trump(TrumpAction::Declare(Trump::ObeAbe)),
            Err(RoundError::NotYourTurn {
                expected: WEST,
                actual: Some(SOUTH)
            })
        );
    }

    #[test]
    #[should_panic(expected = "trump has not been declared")]
    fn test_play_before_trump_panics() {
        let mut round = Round::new(NORTH);
        round.deal_cards(&mut StdRng::seed_from_u64(1));
        let card = round.hands[WEST].first().unwrap();
        round.play_card(card);
    }

    #[test]
    #[should_panic(expected = "does not hold card")]
    fn test_play_card_not_in_hand_panics() {
        let mut round = Round::new(NORTH);
        round.deal_cards(&mut StdRng::seed_from_u64(1));
        round.declare_trump(TrumpAction::Declare(Trump::ObeAbe));
        let card = round.hands[EAST].first().unwrap();
        round.play_card(card);
    }

    #[test]
    fn test_play_after_finish_is_rejected() {
        let mut round = random_playthrough(SOUTH, Trump::ObeAbe, 5);
        assert_eq!(round.try_play_card(DA), Err(RoundError::RoundFinished));
        assert_eq!(round.player, None);
        assert_eq!(round.state(), RoundState::Finished);
    }

    #[test]
    fn test_calc_points() {
        let trick = [SA, SK, SQ, SJ];
        assert_eq!(calc_points(&trick, Trump::Suit(Suit::Diamonds), false), 20);
        assert_eq!(calc_points(&trick, Trump::Suit(Suit::Hearts), true), 25);
        assert_eq!(calc_points(&trick, Trump::Suit(Suit::Spades), false), 38);
        assert_eq!(calc_points(&trick, Trump::Suit(Suit::Clubs), false), 20);
        assert_eq!(
            calc_points(&[SA, SJ, S6, S9], Trump::Suit(Suit::Spades), false),
            45
        );
    }

    #[test]
    fn test_calc_winner() {
        let diamonds = Trump::Suit(Suit::Diamonds);
        let hearts = Trump::Suit(Suit::Hearts);
        let spades = Trump::Suit(Suit::Spades);
        let clubs = Trump::Suit(Suit::Clubs);

        //           E   N   W   S
        let trick = [SA, SK, HQ, C7];
        assert_eq!(calc_winner(&trick, EAST, diamonds), EAST);
        assert_eq!(calc_winner(&trick, EAST, hearts), WEST);
        assert_eq!(calc_winner(&trick, EAST, spades), EAST);
        assert_eq!(calc_winner(&trick, EAST, clubs), SOUTH);
        assert_eq!(calc_winner(&trick, EAST, Trump::ObeAbe), EAST);
        assert_eq!(calc_winner(&trick, EAST, Trump::UneUfe), NORTH);

        assert_eq!(calc_winner(&[S9, S10, SQ, SK], EAST, spades), EAST);
        assert_eq!(calc_winner(&[S9, S10, SJ, SK], EAST, spades), WEST);
        assert_eq!(calc_winner(&[SA, D6, D7, SJ], EAST, hearts), EAST);
        assert_eq!(calc_winner(&[SA, D6, D7, SJ], EAST, diamonds), WEST);
        assert_eq!(calc_winner(&[SA, D6, D7, SJ], EAST, spades), SOUTH);
        assert_eq!(calc_winner(&[SA, D6, D7, S9], EAST, spades), SOUTH);
        assert_eq!(calc_winner(&[D7, SA, D6, S9], EAST, Trump::UneUfe), WEST);
        assert_eq!(calc_winner(&[SA, D6, D7, S9], EAST, Trump::UneUfe), SOUTH);
        assert_eq!(calc_winner(&[SA, D6, D7, S9], EAST, Trump::ObeAbe), EAST);
    }

    #[test]
    fn test_complete_logged_round() {
        let mut round = logged_round();
        assert_eq!(round.player, Some(SOUTH));
        for (i, (first, cards, points, winner)) in LOGGED_TRICKS.iter().enumerate() {
            assert_eq!(round.player, Some(*first));
            for card in cards {
                round.play_card(*card);
                assert!(round.check_invariants().is_ok(), "{:?}", round.check_invariants());
                assert_eq!(
                    round.nr_played_cards,
                    4 * round.nr_tricks + round.nr_cards_in_trick
                );
            }
            assert_eq!(round.nr_tricks, i + 1);
            let trick = &round.tricks[i];
            assert_eq!(trick.points, *points);
            assert_eq!(trick.winner, Some(*winner));
            assert_eq!(trick.first_player, Some(*first));
        }
        assert!(round.is_finished());
        assert_eq!(round.points, [78, 79]);
        assert_eq!(round.winning_team(), Some(1));
    }

    #[test]
    fn test_state_after_recovers_intermediate_state() {
        let full = random_playthrough(EAST, Trump::Suit(Suit::Hearts), 11);
        for cards_played in [0, 1, 4, 17, 36] {
            let replayed = full.state_after(cards_played).unwrap();
            assert_eq!(replayed.nr_played_cards, cards_played);
            assert!(replayed.check_invariants().is_ok());
        }
        assert_eq!(full.state_after(36).unwrap(), full);
    }

    #[test]
    fn test_invariants_detect_tampering() {
        let mut round = random_playthrough(NORTH, Trump::ObeAbe, 2);
        round.points[0] += 1;
        assert!(matches!(
            round.check_invariants(),
            Err(RoundError::Invariant(_))
        ));

        let mut round = random_playthrough(NORTH, Trump::ObeAbe, 2);
        round.tricks[3].winner = Some((round.tricks[3].winner.unwrap() + 1) % 4);
        assert!(round.check_invariants().is_err());

        let mut round = Round::new(NORTH);
        round.deal_cards(&mut StdRng::seed_from_u64(9));
        let card = round.hands[0].first().unwrap();
        round.hands[1].insert(card);
        assert!(round.check_invariants().is_err());
    }

    #[test]
    fn test_invariants_require_hands_mid_round() {
        let full = random_playthrough(WEST, Trump::Suit(Suit::Spades), 5);
        let mut round = full.state_after(5).unwrap();
        assert!(round.check_invariants().is_ok());
        round.hands = [Hand::EMPTY; 4];
        assert!(matches!(
            round.check_invariants(),
            Err(RoundError::Invariant(_))
        ));

        // a finished round reconstructed without hands is complete
        let mut finished = full.clone();
        finished.hands = [Hand::EMPTY; 4];
        assert!(finished.check_invariants().is_ok());
        assert!(Round::new(NORTH).check_invariants().is_ok());
    }

    #[test]
    fn test_invariants_check_trump_seat() {
        let mut round = Round::new(NORTH);
        round.deal_cards(&mut StdRng::seed_from_u64(6));
        round.player = Some(SOUTH);
        assert!(round.check_invariants().is_err());

        round.player = Some(WEST);
        round.declare_trump(TrumpAction::Push);
        assert!(round.check_invariants().is_ok());
        round.player = Some(WEST);
        assert!(round.check_invariants().is_err());
        round.player = Some(EAST);
        assert!(round.check_invariants().is_ok());
    }

    #[test]
    fn test_every_trump_scores_157() {
        for (i, trump) in all::<Trump>().enumerate() {
            let round = random_playthrough(i % 4, trump, i as u64);
            assert_eq!(round.points[0] + round.points[1], 152 + LAST_TRICK_BONUS);
        }
    }

    proptest! {
        #[test]
        fn prop_random_rounds_keep_invariants(seed in any::<u64>(), dealer in 0usize..4, trump in 0usize..6) {
            let trump = Trump::from_index(trump).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut round = Round::new(dealer);
            round.deal_cards(&mut rng);
            round.declare_trump(TrumpAction::Declare(trump));
            while !round.is_finished() {
                let legal = round.legal_cards();
                prop_assert!(!legal.is_empty());
                let card = legal.iter().choose(&mut rng).unwrap();
                round.play_card(card);
                prop_assert!(round.check_invariants().is_ok());
            }
            for trick in round.completed_tricks() {
                let winner = trick.winner.unwrap();
                prop_assert!(winner < 4);
                prop_assert!(trick.plays().any(|(seat, _)| seat == winner));
            }
            prop_assert_eq!(round.points[0] + round.points[1], 157);
        }
    }
}
