use std::collections::HashMap;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not, Sub};
use std::str::FromStr;

use enum_iterator::Sequence;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::error::CardParseError;

pub type Seat = usize;

// seats are numbered clockwise, play goes counter clockwise
pub const NORTH: Seat = 0;
pub const EAST: Seat = 1;
pub const SOUTH: Seat = 2;
pub const WEST: Seat = 3;
pub const SEAT_NAMES: [&str; 4] = ["North", "East", "South", "West"];

pub const NR_SEATS: usize = 4;
pub const NR_CARDS: usize = 36;
pub const NR_TRICKS: usize = 9;
pub const CARDS_PER_HAND: usize = 9;
pub const LAST_TRICK_BONUS: i32 = 5;

pub fn next_seat(seat: Seat) -> Seat {
    (seat + 3) % 4
}

pub fn partner(seat: Seat) -> Seat {
    (seat + 2) % 4
}

/// Team 0 is North/South, team 1 is East/West.
pub fn team(seat: Seat) -> usize {
    seat % 2
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Sequence, Serialize, Deserialize,
)]
pub enum Suit {
    Diamonds,
    Hearts,
    Spades,
    Clubs,
}

impl Suit {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Suit {
        match index {
            0 => Suit::Diamonds,
            1 => Suit::Hearts,
            2 => Suit::Spades,
            3 => Suit::Clubs,
            _ => panic!("invalid suit index {index}"),
        }
    }

    pub fn short(self) -> &'static str {
        ["D", "H", "S", "C"][self.index()]
    }

    /// All nine cards of the suit.
    pub fn mask(self) -> Hand {
        Hand(0x1ff << (9 * self.index()))
    }
}

// rank offsets from the start of a suit
pub const ACE: u8 = 0;
pub const KING: u8 = 1;
pub const QUEEN: u8 = 2;
pub const JACK: u8 = 3;
pub const TEN: u8 = 4;
pub const NINE: u8 = 5;
pub const EIGHT: u8 = 6;
pub const SEVEN: u8 = 7;
pub const SIX: u8 = 8;

/// Strength of each rank offset when its suit is trump: J > 9 > A > K > Q > 10 > 8 > 7 > 6
const TRUMP_STRENGTH: [u8; 9] = [6, 5, 4, 8, 3, 7, 2, 1, 0];

pub const CARD_STRINGS: [&str; NR_CARDS] = [
    "DA", "DK", "DQ", "DJ", "D10", "D9", "D8", "D7", "D6", //
    "HA", "HK", "HQ", "HJ", "H10", "H9", "H8", "H7", "H6", //
    "SA", "SK", "SQ", "SJ", "S10", "S9", "S8", "S7", "S6", //
    "CA", "CK", "CQ", "CJ", "C10", "C9", "C8", "C7", "C6",
];

static CARD_IDS: Lazy<HashMap<&'static str, Card>> = Lazy::new(|| {
    CARD_STRINGS
        .iter()
        .enumerate()
        .map(|(id, name)| (*name, Card(id as u8)))
        .collect()
});

/// Points of each card, one row per trump index (D, H, S, C, obe, une).
pub const CARD_VALUES: [[i32; NR_CARDS]; 6] = [
    // DA DK DQ DJ D10 D9 D8 D7 D6 HA HK HQ HJ H10 H9 H8 H7 H6 SA SK SQ SJ S10 S9 S8 S7 S6 CA CK CQ CJ C10 C9 C8 C7 C6
    [
        11, 4, 3, 20, 10, 14, 0, 0, 0, 11, 4, 3, 2, 10, 0, 0, 0, 0, 11, 4, 3, 2, 10, 0, 0, 0, 0,
        11, 4, 3, 2, 10, 0, 0, 0, 0,
    ],
    [
        11, 4, 3, 2, 10, 0, 0, 0, 0, 11, 4, 3, 20, 10, 14, 0, 0, 0, 11, 4, 3, 2, 10, 0, 0, 0, 0,
        11, 4, 3, 2, 10, 0, 0, 0, 0,
    ],
    [
        11, 4, 3, 2, 10, 0, 0, 0, 0, 11, 4, 3, 2, 10, 0, 0, 0, 0, 11, 4, 3, 20, 10, 14, 0, 0, 0,
        11, 4, 3, 2, 10, 0, 0, 0, 0,
    ],
    [
        11, 4, 3, 2, 10, 0, 0, 0, 0, 11, 4, 3, 2, 10, 0, 0, 0, 0, 11, 4, 3, 2, 10, 0, 0, 0, 0,
        11, 4, 3, 20, 10, 14, 0, 0, 0,
    ],
    [
        11, 4, 3, 2, 10, 0, 8, 0, 0, 11, 4, 3, 2, 10, 0, 8, 0, 0, 11, 4, 3, 2, 10, 0, 8, 0, 0,
        11, 4, 3, 2, 10, 0, 8, 0, 0,
    ],
    [
        0, 4, 3, 2, 10, 0, 8, 0, 11, 0, 4, 3, 2, 10, 0, 8, 0, 11, 0, 4, 3, 2, 10, 0, 8, 0, 11, 0,
        4, 3, 2, 10, 0, 8, 0, 11,
    ],
];

/// A card, identified by its index in [0, 36).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card(u8);

impl Card {
    pub fn new(id: usize) -> Card {
        assert!(id < NR_CARDS, "card id out of range: {id}");
        Card(id as u8)
    }

    pub fn from_suit_rank(suit: Suit, rank: u8) -> Card {
        assert!(rank < 9, "rank offset out of range: {rank}");
        Card(suit.index() as u8 * 9 + rank)
    }

    pub fn id(self) -> usize {
        self.0 as usize
    }

    pub fn suit(self) -> Suit {
        Suit::from_index(self.id() / 9)
    }

    /// Rank offset inside the suit, 0 (ace) is the highest when not trump.
    pub fn rank(self) -> u8 {
        self.0 % 9
    }

    pub fn points(self, trump: Trump) -> i32 {
        CARD_VALUES[trump.index()][self.id()]
    }

    pub fn trump_strength(self) -> u8 {
        TRUMP_STRENGTH[self.rank() as usize]
    }

    /// True if both cards are of the same suit and `self` beats `other` when that suit is trump.
    pub fn is_higher_trump(self, other: Card) -> bool {
        self.suit() == other.suit() && self.trump_strength() > other.trump_strength()
    }

    pub fn is_lower_trump(self, other: Card) -> bool {
        self.suit() == other.suit() && self.trump_strength() < other.trump_strength()
    }

    pub fn all() -> impl Iterator<Item = Card> {
        (0..NR_CARDS as u8).map(Card)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(CARD_STRINGS[self.id()])
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(CARD_STRINGS[self.id()])
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CARD_IDS
            .get(s.trim().to_uppercase().as_str())
            .copied()
            .ok_or_else(|| CardParseError(s.to_string()))
    }
}

impl TryFrom<String> for Card {
    type Error = CardParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

pub const DA: Card = Card(0);
pub const DK: Card = Card(1);
pub const DQ: Card = Card(2);
pub const DJ: Card = Card(3);
pub const D10: Card = Card(4);
pub const D9: Card = Card(5);
pub const D8: Card = Card(6);
pub const D7: Card = Card(7);
pub const D6: Card = Card(8);
pub const HA: Card = Card(9);
pub const HK: Card = Card(10);
pub const HQ: Card = Card(11);
pub const HJ: Card = Card(12);
pub const H10: Card = Card(13);
pub const H9: Card = Card(14);
pub const H8: Card = Card(15);
pub const H7: Card = Card(16);
pub const H6: Card = Card(17);
pub const SA: Card = Card(18);
pub const SK: Card = Card(19);
pub const SQ: Card = Card(20);
pub const SJ: Card = Card(21);
pub const S10: Card = Card(22);
pub const S9: Card = Card(23);
pub const S8: Card = Card(24);
pub const S7: Card = Card(25);
pub const S6: Card = Card(26);
pub const CA: Card = Card(27);
pub const CK: Card = Card(28);
pub const CQ: Card = Card(29);
pub const CJ: Card = Card(30);
pub const C10: Card = Card(31);
pub const C9: Card = Card(32);
pub const C8: Card = Card(33);
pub const C7: Card = Card(34);
pub const C6: Card = Card(35);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum Trump {
    Suit(Suit),
    /// highest card of the led suit wins
    ObeAbe,
    /// lowest card of the led suit wins
    UneUfe,
}

impl Trump {
    /// Row of the point table: D=0, H=1, S=2, C=3, obe=4, une=5
    pub fn index(self) -> usize {
        match self {
            Trump::Suit(suit) => suit.index(),
            Trump::ObeAbe => 4,
            Trump::UneUfe => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<Trump> {
        match index {
            0..=3 => Some(Trump::Suit(Suit::from_index(index))),
            4 => Some(Trump::ObeAbe),
            5 => Some(Trump::UneUfe),
            _ => None,
        }
    }

    pub fn short(self) -> &'static str {
        ["D", "H", "S", "C", "O", "U"][self.index()]
    }
}

impl fmt::Display for Trump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trump::Suit(suit) => write!(f, "{suit:?}"),
            Trump::ObeAbe => f.write_str("Obe-abe"),
            Trump::UneUfe => f.write_str("Une-ufe"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum TrumpAction {
    Declare(Trump),
    /// forehand hands the declaration over to the partner
    Push,
}

impl TrumpAction {
    pub const PUSH_INDEX: usize = 6;

    pub fn index(self) -> usize {
        match self {
            TrumpAction::Declare(trump) => trump.index(),
            TrumpAction::Push => Self::PUSH_INDEX,
        }
    }

    pub fn from_index(index: usize) -> Option<TrumpAction> {
        if index == Self::PUSH_INDEX {
            return Some(TrumpAction::Push);
        }
        Trump::from_index(index).map(TrumpAction::Declare)
    }

    pub fn from_short(s: &str) -> Option<TrumpAction> {
        let s = s.trim().to_uppercase();
        if s == "P" {
            return Some(TrumpAction::Push);
        }
        (0..6)
            .filter_map(Trump::from_index)
            .find(|t| t.short() == s)
            .map(TrumpAction::Declare)
    }
}

/// A set of cards stored as a 36 bit presence mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hand(u64);

impl Hand {
    pub const EMPTY: Hand = Hand(0);
    pub const FULL: Hand = Hand((1 << NR_CARDS) - 1);

    pub fn contains(self, card: Card) -> bool {
        self.0 & (1 << card.id()) != 0
    }

    pub fn insert(&mut self, card: Card) {
        self.0 |= 1 << card.id();
    }

    pub fn remove(&mut self, card: Card) {
        self.0 &= !(1 << card.id());
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn of_suit(self, suit: Suit) -> Hand {
        self & suit.mask()
    }

    pub fn has_suit(self, suit: Suit) -> bool {
        !self.of_suit(suit).is_empty()
    }

    pub fn iter(self) -> HandIter {
        HandIter(self.0)
    }

    pub fn cards(self) -> Vec<Card> {
        self.iter().collect()
    }

    pub fn first(self) -> Option<Card> {
        self.iter().next()
    }

    /// Number of cards held in each suit, in suit order.
    pub fn count_suits(self) -> [usize; 4] {
        [0, 1, 2, 3].map(|s| self.of_suit(Suit::from_index(s)).len())
    }
}

impl BitOr for Hand {
    type Output = Hand;

    fn bitor(self, rhs: Hand) -> Hand {
        Hand(self.0 | rhs.0)
    }
}

impl BitAnd for Hand {
    type Output = Hand;

    fn bitand(self, rhs: Hand) -> Hand {
        Hand(self.0 & rhs.0)
    }
}

impl Sub for Hand {
    type Output = Hand;

    fn sub(self, rhs: Hand) -> Hand {
        Hand(self.0 & !rhs.0)
    }
}

impl Not for Hand {
    type Output = Hand;

    fn not(self) -> Hand {
        Hand(!self.0 & Self::FULL.0)
    }
}

impl FromIterator<Card> for Hand {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut hand = Hand::EMPTY;
        for card in iter {
            hand.insert(card);
        }
        hand
    }
}

impl IntoIterator for Hand {
    type Item = Card;
    type IntoIter = HandIter;

    fn into_iter(self) -> HandIter {
        self.iter()
    }
}

pub struct HandIter(u64);

impl Iterator for HandIter {
    type Item = Card;

    fn next(&mut self) -> Option<Card> {
        if self.0 == 0 {
            return None;
        }
        let id = self.0.trailing_zeros();
        self.0 &= self.0 - 1;
        Some(Card(id as u8))
    }
}

impl fmt::Debug for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
