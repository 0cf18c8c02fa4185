//! Round log in the Swisslos JSON format, one round per line:
//!
//! ```json
//! {"trump":5,"dealer":3,"tss":1,"tricks":[{"cards":["C7","CK","C6","CJ"],"points":17,"win":0,"first":2}, ...]}
//! ```
//!
//! `tss` is only present when the forehand pushed.

use serde::{Deserialize, Serialize};

use super::cards::{partner, team, Card, Seat, Trump, NR_CARDS, NR_SEATS, NR_TRICKS};
use super::error::{ReconstructionError, RoundError};
use super::round::{calc_points, calc_winner, Round, Trick};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrickLog {
    pub cards: Vec<Card>,
    pub points: i32,
    pub win: i32,
    pub first: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLog {
    pub trump: i32,
    pub dealer: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tss: Option<i32>,
    pub tricks: Vec<TrickLog>,
}

fn seat(value: i32) -> Result<Seat, ReconstructionError> {
    usize::try_from(value)
        .ok()
        .filter(|seat| *seat < NR_SEATS)
        .ok_or(ReconstructionError::InvalidSeat(value))
}

impl RoundLog {
    pub fn from_round(round: &Round) -> Result<RoundLog, RoundError> {
        if !round.is_finished() {
            return Err(RoundError::RoundNotFinished);
        }
        let trump = round.trump.ok_or(RoundError::TrumpNotDeclared)?;
        let tricks = round
            .completed_tricks()
            .iter()
            .map(|trick| {
                Ok(TrickLog {
                    cards: trick.cards().to_vec(),
                    points: trick.points,
                    win: trick.winner.ok_or(RoundError::RoundNotFinished)? as i32,
                    first: trick.first_player.ok_or(RoundError::RoundNotFinished)? as i32,
                })
            })
            .collect::<Result<Vec<_>, RoundError>>()?;
        Ok(RoundLog {
            trump: trump.index() as i32,
            dealer: round.dealer as i32,
            tss: (round.forehand == Some(false)).then_some(1),
            tricks,
        })
    }

    /// Rebuild the complete round, checking the logged winners and points
    /// against the ones the cards give.
    pub fn to_round(&self) -> Result<Round, ReconstructionError> {
        if self.tricks.len() != NR_TRICKS {
            return Err(ReconstructionError::Incomplete(self.tricks.len()));
        }
        let trump = usize::try_from(self.trump)
            .ok()
            .and_then(Trump::from_index)
            .ok_or(ReconstructionError::InvalidTrump(self.trump))?;
        let dealer = seat(self.dealer)?;

        let mut round = Round::new(dealer);
        let forehand_seat = round.forehand_seat();
        let pushed = self.tss == Some(1);
        round.trump = Some(trump);
        round.forehand = Some(!pushed);
        round.declared_trump = Some(if pushed {
            partner(forehand_seat)
        } else {
            forehand_seat
        });

        for (i, logged) in self.tricks.iter().enumerate() {
            if logged.cards.len() != 4 {
                return Err(ReconstructionError::TrickSize {
                    trick: i,
                    count: logged.cards.len(),
                });
            }
            let first = seat(logged.first)?;
            let mut trick = Trick::from_cards(first, &logged.cards);

            let winner = calc_winner(trick.cards(), first, trump);
            if logged.win != winner as i32 {
                return Err(ReconstructionError::Mismatch {
                    trick: i,
                    field: "winner",
                    logged: logged.win,
                    computed: winner as i32,
                });
            }
            let points = calc_points(trick.cards(), trump, i == NR_TRICKS - 1);
            if logged.points != points {
                return Err(ReconstructionError::Mismatch {
                    trick: i,
                    field: "points",
                    logged: logged.points,
                    computed: points,
                });
            }
            trick.winner = Some(winner);
            trick.points = points;
            round.tricks[i] = trick;
            round.points[team(winner)] += points;
        }
        round.nr_tricks = NR_TRICKS;
        round.nr_cards_in_trick = 0;
        round.nr_played_cards = NR_CARDS;
        round.player = None;

        round.check_invariants()?;
        Ok(round)
    }

    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> Result<RoundLog, ReconstructionError> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Parse one log line straight into a complete round.
pub fn parse_round(line: &str) -> Result<Round, ReconstructionError> {
    RoundLog::from_json_line(line)?.to_round()
}
