/*
Game: Jass (Schieber)
Swiss trick taking game for two teams of two, 36 cards, one trump mode per round
*/

pub mod arena;
pub mod cards;
pub mod config;
pub mod error;
pub mod log;
pub mod mcts;
pub mod player;
pub mod player_view;
pub mod round;
pub mod rules;
pub mod sampler;

// Re-export the main types
pub use arena::{Arena, ArenaStats};
pub use cards::{Card, Hand, Seat, Suit, Trump, TrumpAction};
pub use config::MctsConfig;
pub use error::{ArenaError, ConfigError, ReconstructionError, RoundError};
pub use log::RoundLog;
pub use mcts::{search, SearchResult};
pub use player::{InteractivePlayer, MctsPlayer, Player, RandomPlayer};
pub use player_view::PlayerView;
pub use round::{Round, RoundState, Trick};
pub use rules::{legal_cards, validate_round};
pub use sampler::sample;
