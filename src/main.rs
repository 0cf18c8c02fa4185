//! jass-arena: play Jass rounds between random, search based and human players.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use jass_rs::games::jass::cards::SEAT_NAMES;
use jass_rs::games::jass::log::parse_round;
use jass_rs::games::jass::{
    validate_round, Arena, InteractivePlayer, MctsConfig, MctsPlayer, Player, RandomPlayer,
};

#[derive(Parser)]
#[command(name = "jass-arena")]
#[command(about = "Play Jass (Schieber) rounds between computer and human players")]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value = "10")]
    games: usize,

    /// Rounds summed up into one game
    #[arg(long, default_value = "1")]
    rounds_per_game: usize,

    /// Player type for all seats
    #[arg(long, conflicts_with_all = ["north", "east", "south", "west"])]
    seats: Option<PlayerType>,

    #[arg(long, default_value = "mcts")]
    north: PlayerType,

    #[arg(long, default_value = "random")]
    east: PlayerType,

    #[arg(long, default_value = "mcts")]
    south: PlayerType,

    #[arg(long, default_value = "random")]
    west: PlayerType,

    /// Seed for dealing and for the players
    #[arg(long)]
    seed: Option<u64>,

    /// Search settings as JSON, command line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Thinking time per card in milliseconds
    #[arg(long)]
    budget_ms: Option<u64>,

    /// Determinizations searched in parallel
    #[arg(long)]
    trees: Option<usize>,

    /// Append every finished round to this file, one JSON line per round
    #[arg(long)]
    log: Option<PathBuf>,

    /// Only check the rounds of an existing log file and exit
    #[arg(long, conflicts_with = "log")]
    check_log: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlayerType {
    Random,
    Mcts,
    Human,
}

fn mcts_config(args: &Args) -> Result<MctsConfig> {
    let mut config = match &args.config {
        Some(path) => MctsConfig::load(path)
            .with_context(|| format!("loading search settings from {}", path.display()))?,
        None => MctsConfig::default(),
    };
    if let Some(budget_ms) = args.budget_ms {
        config.budget_ms = budget_ms;
    }
    if let Some(trees) = args.trees {
        config.trees = trees;
    }
    if config.seed.is_none() {
        config.seed = args.seed;
    }
    config.validate()?;
    Ok(config)
}

fn create_player(
    kind: PlayerType,
    seat: usize,
    config: &MctsConfig,
    seed: Option<u64>,
) -> Box<dyn Player> {
    let name = SEAT_NAMES[seat];
    match kind {
        PlayerType::Random => match seed {
            Some(seed) => Box::new(RandomPlayer::seeded(name, seed.wrapping_add(seat as u64))),
            None => Box::new(RandomPlayer::new(name)),
        },
        PlayerType::Mcts => {
            let mut config = config.clone();
            config.seed = config.seed.map(|s| s.wrapping_add(1000 * seat as u64));
            Box::new(MctsPlayer::new(name, config))
        }
        PlayerType::Human => Box::new(InteractivePlayer::stdio(name)),
    }
}

fn check_log(path: &PathBuf) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut checked = 0;
    for (nr, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let round = parse_round(&line).with_context(|| format!("line {}", nr + 1))?;
        if let Err(e) = validate_round(&round) {
            bail!("line {}: {}", nr + 1, e);
        }
        checked += 1;
    }
    println!("{checked} rounds in {} are consistent", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(path) = &args.check_log {
        return check_log(path);
    }

    let config = mcts_config(&args)?;
    let kinds = match args.seats {
        Some(kind) => [kind; 4],
        None => [args.north, args.east, args.south, args.west],
    };
    info!(?kinds, ?config, "starting arena");

    let players: Vec<Box<dyn Player>> = kinds
        .iter()
        .enumerate()
        .map(|(seat, kind)| create_player(*kind, seat, &config, args.seed))
        .collect();

    let mut arena = Arena::new(players, args.seed);
    arena.rounds_per_game = args.rounds_per_game;
    if let Some(path) = &args.log {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening round log {}", path.display()))?;
        arena = arena.with_log(Box::new(BufWriter::new(file)));
    }

    let start = Instant::now();
    let stats = arena.play_games(args.games)?;
    println!(
        "{} games in {:?}: North/South won {} ({:.1}%), East/West won {} ({:.1}%), {} draws, point delta {}",
        stats.games_played,
        start.elapsed(),
        stats.wins[0],
        100.0 * stats.win_rate(0),
        stats.wins[1],
        100.0 * stats.win_rate(1),
        stats.draws,
        stats.delta_points
    );
    Ok(())
}
