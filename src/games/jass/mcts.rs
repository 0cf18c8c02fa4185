//! Determinized Monte Carlo tree search for the card play.
//!
//! Each tree searches one sampled world (see [`sample`]). Trees are
//! independent and run in parallel on rayon; their root visit counts are
//! summed to pick the card.
//!
//! **UCB1**: `win_score / visits + c * sqrt(ln(parent_visits) / visits)`,
//! unvisited children first, ties broken at random.
//!
//! Outcome of a rollout for the searching team: its share of all points if it
//! scored more than the opponents, 0 otherwise. The outcome is credited to
//! the nodes of moves made by the searching team, the opponents' nodes only
//! count visits.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rand::{rngs::StdRng, seq::IteratorRandom, seq::SliceRandom, Rng, SeedableRng};
use rayon::prelude::*;
use tracing::debug;

use super::cards::{team, Card, Seat};
use super::config::MctsConfig;
use super::player_view::PlayerView;
use super::round::Round;
use super::sampler::sample;

/// Summary of one card decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub card: Card,
    /// visits of each root move, summed over all trees
    pub visits: BTreeMap<Card, u64>,
    pub iterations: u64,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<usize>,
    children: Vec<usize>,
    /// card played to reach this node, `None` for the root
    card: Option<Card>,
    /// seat that played `card`, the acting seat for the root
    seat: Seat,
    visits: u64,
    win_score: f64,
    expanded: bool,
}

impl Node {
    fn new(parent: Option<usize>, card: Option<Card>, seat: Seat) -> Self {
        Self {
            parent,
            children: Vec::new(),
            card,
            seat,
            visits: 0,
            win_score: 0.0,
            expanded: false,
        }
    }
}

/// Search tree over one determinization, nodes live in an arena and refer to each other by index.
struct Tree {
    nodes: Vec<Node>,
    root_round: Round,
    root_team: usize,
    exploration: f64,
}

impl Tree {
    fn new(root_round: Round, exploration: f64) -> Self {
        let seat = root_round
            .player
            .expect("search needs a seat to act");
        Self {
            nodes: vec![Node::new(None, None, seat)],
            root_round,
            root_team: team(seat),
            exploration,
        }
    }

    fn ucb(&self, parent_visits: u64, child: &Node) -> f64 {
        if child.visits == 0 {
            return f64::INFINITY;
        }
        let visits = child.visits as f64;
        child.win_score / visits + self.exploration * ((parent_visits as f64).ln() / visits).sqrt()
    }

    fn select_child(&self, node: usize, rng: &mut impl Rng) -> usize {
        let parent = &self.nodes[node];
        let mut best = Vec::new();
        let mut best_score = f64::NEG_INFINITY;
        for &child in &parent.children {
            let score = self.ucb(parent.visits, &self.nodes[child]);
            if score > best_score {
                best_score = score;
                best.clear();
                best.push(child);
            } else if score == best_score {
                best.push(child);
            }
        }
        *best.choose(rng).expect("node should have children")
    }

    fn expand(&mut self, node: usize, round: &Round) {
        self.nodes[node].expanded = true;
        if round.is_finished() {
            return;
        }
        let seat = round.player.expect("unfinished round should have a seat to act");
        for card in round.legal_cards() {
            let child = self.nodes.len();
            self.nodes.push(Node::new(Some(node), Some(card), seat));
            self.nodes[node].children.push(child);
        }
    }

    fn iterate(&mut self, rng: &mut impl Rng) {
        let mut round = self.root_round.clone();
        let mut node = 0;

        // selection
        while self.nodes[node].expanded && !self.nodes[node].children.is_empty() {
            node = self.select_child(node, rng);
            self.play(&mut round, node);
        }

        // expansion
        if !self.nodes[node].expanded {
            self.expand(node, &round);
            if let Some(&child) = self.nodes[node].children.choose(rng) {
                node = child;
                self.play(&mut round, node);
            }
        }

        let score = rollout(&mut round, self.root_team, rng);
        self.backpropagate(node, score);
    }

    fn play(&self, round: &mut Round, node: usize) {
        let card = self.nodes[node].card.expect("only the root has no card");
        round.play_card(card);
    }

    fn backpropagate(&mut self, node: usize, score: f64) {
        let mut current = Some(node);
        while let Some(index) = current {
            let node = &mut self.nodes[index];
            node.visits += 1;
            if team(node.seat) == self.root_team {
                node.win_score += score;
            }
            current = node.parent;
        }
    }

    fn root_visits(&self) -> impl Iterator<Item = (Card, u64)> + '_ {
        self.nodes[0].children.iter().filter_map(|&child| {
            let node = &self.nodes[child];
            node.card.map(|card| (card, node.visits))
        })
    }
}

/// Finish the round with random legal cards, returns the outcome for `root_team`.
fn rollout(round: &mut Round, root_team: usize, rng: &mut impl Rng) -> f64 {
    while !round.is_finished() {
        let card = round
            .legal_cards()
            .iter()
            .choose(rng)
            .expect("should have a legal card");
        round.play_card(card);
    }
    let mine = round.points_for_team(root_team);
    let theirs = round.points_for_team(1 - root_team);
    if mine > theirs {
        mine as f64 / (mine + theirs) as f64
    } else {
        0.0
    }
}

fn search_tree(
    view: &PlayerView,
    config: &MctsConfig,
    deadline: Instant,
    seed: u64,
) -> (BTreeMap<Card, u64>, u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = Tree::new(sample(view, &mut rng), config.exploration);
    let mut iterations = 0;
    // the deadline is only checked between iterations, a started rollout always completes
    while Instant::now() < deadline && config.max_iterations.map_or(true, |max| iterations < max) {
        tree.iterate(&mut rng);
        iterations += 1;
    }
    (tree.root_visits().collect(), iterations)
}

/// Choose a card for the seat to act in `view`.
///
/// Always returns one of `view.legal_cards()`, also when the budget is too
/// small for a single iteration.
pub fn search(view: &PlayerView, config: &MctsConfig) -> SearchResult {
    let legal = view.legal_cards();
    let fallback = legal.first().expect("seat to act should hold a card");
    if legal.len() == 1 {
        return SearchResult {
            card: fallback,
            visits: BTreeMap::new(),
            iterations: 0,
        };
    }

    let deadline = Instant::now() + Duration::from_millis(config.budget_ms);
    let base_seed = config.seed.unwrap_or_else(rand::random);
    let trees = config.trees.max(1);

    let results: Vec<(BTreeMap<Card, u64>, u64)> = (0..trees)
        .into_par_iter()
        .map(|i| search_tree(view, config, deadline, base_seed.wrapping_add(i as u64)))
        .collect();

    let mut visits: BTreeMap<Card, u64> = BTreeMap::new();
    let mut iterations = 0;
    for (tree_visits, tree_iterations) in results {
        iterations += tree_iterations;
        for (card, count) in tree_visits {
            *visits.entry(card).or_insert(0) += count;
        }
    }

    // most visits wins, the lowest card on a tie
    let card = visits
        .iter()
        .filter(|(_, count)| **count > 0)
        .fold(None, |best: Option<(Card, u64)>, (card, count)| match best {
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((*card, *count)),
        })
        .map(|(card, _)| card)
        .unwrap_or(fallback);

    debug!(
        seat = view.seat,
        %card,
        iterations,
        trees,
        "mcts search finished"
    );
    SearchResult {
        card,
        visits,
        iterations,
    }
}
