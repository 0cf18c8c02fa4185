use std::path::PathBuf;

use thiserror::Error;

use super::cards::{Card, Seat, TrumpAction};

/// A caller broke the contract of the round state machine.
///
/// The fail-fast entry points (`Round::play_card`, `Round::declare_trump`, ...)
/// panic with the message of one of these; the `try_` variants hand it back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundError {
    #[error("cards have already been dealt")]
    AlreadyDealt,
    #[error("trump has already been declared")]
    TrumpAlreadyDeclared,
    #[error("trump has not been declared")]
    TrumpNotDeclared,
    #[error("seat {actual:?} acted but seat {expected} was expected")]
    NotYourTurn { expected: Seat, actual: Option<Seat> },
    #[error("push is only allowed for the forehand seat, got {0:?}")]
    PushNotAllowed(TrumpAction),
    #[error("seat {seat} does not hold card {card}")]
    CardNotInHand { seat: Seat, card: Card },
    #[error("illegal card {card} played by seat {seat} in trick {trick}")]
    IllegalCard { seat: Seat, card: Card, trick: usize },
    #[error("round is already finished")]
    RoundFinished,
    #[error("round is not finished")]
    RoundNotFinished,
    #[error("invariant violated: {0}")]
    Invariant(String),
}

/// Stored round data that could not be turned back into a consistent round.
#[derive(Error, Debug)]
pub enum ReconstructionError {
    #[error("failed to parse round log: {0}")]
    Json(#[from] serde_json::Error),
    #[error("round log holds {0} tricks, a complete round has 9")]
    Incomplete(usize),
    #[error("invalid trump value {0}")]
    InvalidTrump(i32),
    #[error("invalid seat value {0}")]
    InvalidSeat(i32),
    #[error("trick {trick} holds {count} cards")]
    TrickSize { trick: usize, count: usize },
    #[error("trick {trick}: logged {field} {logged} but the cards give {computed}")]
    Mismatch {
        trick: usize,
        field: &'static str,
        logged: i32,
        computed: i32,
    },
    #[error(transparent)]
    Round(#[from] RoundError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown card '{0}'")]
pub struct CardParseError(pub String);

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A round in the arena could not be completed.
#[derive(Error, Debug)]
pub enum ArenaError {
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error("failed to write round log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize round log: {0}")]
    Json(#[from] serde_json::Error),
}
