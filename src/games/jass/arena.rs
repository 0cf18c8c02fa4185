use std::io::Write;

use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::cards::{next_seat, Seat, TrumpAction, NORTH, NR_SEATS};
use super::error::{ArenaError, RoundError};
use super::log::RoundLog;
use super::player::Player;
use super::player_view::PlayerView;
use super::round::Round;

/// Results of the games played so far, from the point of view of team 0 (North/South).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArenaStats {
    pub games_played: usize,
    pub wins: [usize; 2],
    pub draws: usize,
    /// points of team 0 minus points of team 1, summed over all games
    pub delta_points: i64,
}

impl ArenaStats {
    pub fn win_rate(&self, team: usize) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins[team] as f64 / self.games_played as f64
    }

    fn record(&mut self, points: [i32; 2]) {
        self.games_played += 1;
        self.delta_points += i64::from(points[0] - points[1]);
        match points[0].cmp(&points[1]) {
            std::cmp::Ordering::Greater => self.wins[0] += 1,
            std::cmp::Ordering::Less => self.wins[1] += 1,
            std::cmp::Ordering::Equal => self.draws += 1,
        }
    }
}

/// Plays rounds between four players and keeps the score.
pub struct Arena {
    players: Vec<Box<dyn Player>>,
    rng: StdRng,
    /// rounds summed up into one game
    pub rounds_per_game: usize,
    dealer: Seat,
    stats: ArenaStats,
    log: Option<Box<dyn Write>>,
}

impl Arena {
    /// Players in seat order North, East, South, West.
    pub fn new(players: Vec<Box<dyn Player>>, seed: Option<u64>) -> Self {
        assert_eq!(players.len(), NR_SEATS, "an arena needs four players");
        Self {
            players,
            rng: seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64),
            rounds_per_game: 1,
            dealer: NORTH,
            stats: ArenaStats::default(),
            log: None,
        }
    }

    /// Write every finished round as one JSON line to `log`.
    pub fn with_log(mut self, log: Box<dyn Write>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn stats(&self) -> &ArenaStats {
        &self.stats
    }

    fn determine_trump(&mut self, round: &mut Round) -> Result<(), RoundError> {
        let view = PlayerView::from_round(round);
        let action = self.players[view.seat].select_trump(&view);
        debug!(seat = view.seat, ?action, "trump action");
        round.try_declare_trump(action)?;
        if action == TrumpAction::Push {
            let view = PlayerView::from_round(round);
            let action = self.players[view.seat].select_trump(&view);
            debug!(seat = view.seat, ?action, "trump action after push");
            round.try_declare_trump(action)?;
        }
        Ok(())
    }

    /// Deal and play one complete round. Illegal answers from a player end the round with an error.
    pub fn play_round(&mut self, dealer: Seat) -> Result<Round, ArenaError> {
        let mut round = Round::new(dealer);
        round.try_deal_cards(&mut self.rng)?;
        self.determine_trump(&mut round)?;

        while !round.is_finished() {
            let view = PlayerView::from_round(&round);
            let card = self.players[view.seat].play_card(&view);
            if !view.legal_cards().contains(card) {
                warn!(
                    seat = view.seat,
                    player = self.players[view.seat].name(),
                    %card,
                    "illegal card"
                );
                return Err(RoundError::IllegalCard {
                    seat: view.seat,
                    card,
                    trick: round.nr_tricks,
                }
                .into());
            }
            round.try_play_card(card)?;
        }

        info!(
            dealer,
            trump = %round.trump.map(|t| t.to_string()).unwrap_or_default(),
            points = ?round.points,
            "round finished"
        );
        if let Some(log) = self.log.as_mut() {
            let line = RoundLog::from_round(&round)?.to_json_line()?;
            writeln!(log, "{line}")?;
        }
        Ok(round)
    }

    /// Play one game of `rounds_per_game` rounds, the dealer moves on every round.
    pub fn play_game(&mut self) -> Result<[i32; 2], ArenaError> {
        let mut points = [0, 0];
        for _ in 0..self.rounds_per_game {
            let round = self.play_round(self.dealer)?;
            points[0] += round.points[0];
            points[1] += round.points[1];
            self.dealer = next_seat(self.dealer);
        }
        self.stats.record(points);
        Ok(points)
    }

    pub fn play_games(&mut self, nr_games: usize) -> Result<&ArenaStats, ArenaError> {
        for game in 0..nr_games {
            let points = self.play_game()?;
            debug!(game, ?points, "game finished");
        }
        if let Some(log) = self.log.as_mut() {
            log.flush()?;
        }
        info!(
            games = self.stats.games_played,
            wins = ?self.stats.wins,
            draws = self.stats.draws,
            delta_points = self.stats.delta_points,
            "games finished"
        );
        Ok(&self.stats)
    }
}
