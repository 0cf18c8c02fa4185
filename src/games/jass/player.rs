use std::io::{self, BufRead, Write};

use colored::{ColoredString, Colorize};
use enum_iterator::all;
use rand::{rngs::StdRng, seq::IteratorRandom, SeedableRng};
use tracing::warn;

use super::cards::{Card, Hand, Suit, Trump, TrumpAction, SEAT_NAMES};
use super::config::MctsConfig;
use super::mcts::{search, SearchResult};
use super::player_view::PlayerView;

/// Anything that can take the decisions of one seat.
pub trait Player {
    fn select_trump(&mut self, view: &PlayerView) -> TrumpAction;
    fn play_card(&mut self, view: &PlayerView) -> Card;
    fn name(&self) -> &str;
}

/// Hand points of every trump mode, indexed like [`Trump::index`].
pub fn trump_points(hand: Hand) -> [i32; 6] {
    let mut points = [0; 6];
    for trump in all::<Trump>() {
        points[trump.index()] = hand.iter().map(|c| c.points(trump)).sum();
    }
    points
}

/// Declare the trump mode worth the most points in `hand`, or push when nothing
/// reaches `push_threshold` and pushing is still allowed.
pub fn select_trump_by_points(hand: Hand, can_push: bool, push_threshold: i32) -> TrumpAction {
    let points = trump_points(hand);
    let (best, best_points) = all::<Trump>()
        .map(|t| (t, points[t.index()]))
        .fold(None, |best: Option<(Trump, i32)>, (t, p)| match best {
            Some((_, best_p)) if best_p >= p => best,
            _ => Some((t, p)),
        })
        .expect("there are six trump modes");
    if can_push && best_points < push_threshold {
        TrumpAction::Push
    } else {
        TrumpAction::Declare(best)
    }
}

pub struct RandomPlayer {
    name: String,
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(name: &str, seed: u64) -> Self {
        Self {
            name: name.to_string(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Player for RandomPlayer {
    fn select_trump(&mut self, view: &PlayerView) -> TrumpAction {
        let mut actions: Vec<TrumpAction> = all::<Trump>().map(TrumpAction::Declare).collect();
        if view.can_push() {
            actions.push(TrumpAction::Push);
        }
        actions
            .into_iter()
            .choose(&mut self.rng)
            .expect("should have a trump to select")
    }

    fn play_card(&mut self, view: &PlayerView) -> Card {
        view.legal_cards()
            .iter()
            .choose(&mut self.rng)
            .expect("should have a card to play")
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Search based player: trump by hand points, cards by [`search`].
pub struct MctsPlayer {
    name: String,
    pub config: MctsConfig,
    pub last_search: Option<SearchResult>,
}

impl MctsPlayer {
    pub fn new(name: &str, config: MctsConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            last_search: None,
        }
    }
}

impl Player for MctsPlayer {
    fn select_trump(&mut self, view: &PlayerView) -> TrumpAction {
        select_trump_by_points(view.hand, view.can_push(), self.config.push_threshold)
    }

    fn play_card(&mut self, view: &PlayerView) -> Card {
        let result = search(view, &self.config);
        let card = result.card;
        self.last_search = Some(result);
        card
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn print_card(card: Card) -> ColoredString {
    let string = card.to_string();
    match card.suit() {
        Suit::Diamonds => string.yellow(),
        Suit::Hearts => string.red(),
        Suit::Spades => string.green(),
        Suit::Clubs => string.blue(),
    }
}

fn print_cards(cards: impl IntoIterator<Item = Card>) -> String {
    cards
        .into_iter()
        .map(|c| print_card(c).to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Asks a human for every decision, reading answers line by line.
pub struct InteractivePlayer<R: BufRead, W: Write> {
    name: String,
    input: R,
    output: W,
}

impl InteractivePlayer<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio(name: &str) -> Self {
        InteractivePlayer::new(name, io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> InteractivePlayer<R, W> {
    pub fn new(name: &str, input: R, output: W) -> Self {
        Self {
            name: name.to_string(),
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, message: &str) {
        if let Err(e) = writeln!(self.output, "{message}") {
            warn!(player = %self.name, error = %e, "failed to write to the output");
        }
    }

    /// Next answer, `None` once the input is closed.
    fn ask(&mut self, prompt: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{prompt}").and_then(|_| self.output.flush()) {
            warn!(player = %self.name, error = %e, "failed to write to the output");
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn show_hand(&mut self, view: &PlayerView) {
        let message = format!(
            "{} ({}), your hand: {}",
            self.name,
            SEAT_NAMES[view.seat],
            print_cards(view.hand)
        );
        self.say(&message);
    }
}

impl<R: BufRead, W: Write> Player for InteractivePlayer<R, W> {
    fn select_trump(&mut self, view: &PlayerView) -> TrumpAction {
        self.show_hand(view);
        let mut options: Vec<String> = all::<Trump>()
            .map(|t| format!("{} ({})", t.short(), t))
            .collect();
        if view.can_push() {
            options.push("P (push)".to_string());
        }
        let message = format!("Possible trumps are: {}", options.join(", "));
        self.say(&message);
        loop {
            let Some(answer) = self.ask("> Enter trump [1 char]: ") else {
                let action = select_trump_by_points(view.hand, false, 0);
                warn!(seat = view.seat, ?action, "input closed, declaring by hand points");
                return action;
            };
            match TrumpAction::from_short(&answer) {
                Some(TrumpAction::Push) if !view.can_push() => {
                    self.say("Push is not allowed any more.");
                }
                Some(action) => return action,
                None => {
                    let message = format!("'{answer}' is no valid trump to select");
                    self.say(&message);
                }
            }
        }
    }

    fn play_card(&mut self, view: &PlayerView) -> Card {
        self.show_hand(view);
        let trump = view.trump.expect("trump has not been declared");
        let mut message = format!("Trump: {trump}");
        if !view.current_trick_cards().is_empty() {
            message += &format!(
                ", current trick: {}",
                print_cards(view.current_trick_cards().iter().copied())
            );
        }
        self.say(&message);

        let legal = view.legal_cards();
        loop {
            let Some(answer) = self.ask("> Enter card to play: ") else {
                let card = legal.first().expect("should have a card to play");
                warn!(seat = view.seat, %card, "input closed, playing first legal card");
                return card;
            };
            match answer.parse::<Card>() {
                Ok(card) if legal.contains(card) => return card,
                Ok(card) if view.hand.contains(card) => {
                    let message = format!("'{card}' is not a valid card to play.");
                    self.say(&message);
                }
                _ => {
                    let message = format!("'{answer}' is not a card you have in your hand.");
                    self.say(&message);
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
