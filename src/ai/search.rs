//! Fixed-depth alpha-beta search.

use super::strategy::Strategy;
use crate::games::reversi::{Board, Disc, Move, mask_to_moves};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const INF: i32 = i32::MAX / 2;
const WIN: i32 = 1_000_000;

#[rustfmt::skip]
const SQUARE_WEIGHTS: [i32; 64] = [
    100, -20,  10,   5,   5,  10, -20, 100,
    -20, -50,  -2,  -2,  -2,  -2, -50, -20,
     10,  -2,  -1,  -1,  -1,  -1,  -2,  10,
      5,  -2,  -1,  -1,  -1,  -1,  -2,   5,
      5,  -2,  -1,  -1,  -1,  -1,  -2,   5,
     10,  -2,  -1,  -1,  -1,  -1,  -2,  10,
    -20, -50,  -2,  -2,  -2,  -2, -50, -20,
    100, -20,  10,   5,   5,  10, -20, 100,
];

/// Static evaluation used at the search horizon.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Evaluation {
    /// Disc difference.
    #[default]
    PieceCount,
    /// Square weight table favouring corners and edges.
    Positional,
}

impl Evaluation {
    /// Scores `board` from `player`'s point of view.
    pub fn evaluate(self, board: &Board, player: Disc) -> i32 {
        match self {
            Evaluation::PieceCount => {
                board.count(player) as i32 - board.count(player.opponent()) as i32
            }
            Evaluation::Positional => {
                weight_sum(board.discs(player)) - weight_sum(board.discs(player.opponent()))
            }
        }
    }
}

fn weight_sum(mut mask: u64) -> i32 {
    let mut total = 0;
    while mask != 0 {
        total += SQUARE_WEIGHTS[mask.trailing_zeros() as usize];
        mask &= mask - 1;
    }
    total
}

/// Decisive score for a finished game, offset by the disc margin.
fn terminal_score(board: &Board, player: Disc) -> i32 {
    let diff = board.count(player) as i32 - board.count(player.opponent()) as i32;
    match diff.signum() {
        1 => WIN + diff,
        -1 => -WIN + diff,
        _ => 0,
    }
}

/// Negamax with alpha-beta pruning to a fixed depth.
///
/// Children are ordered by their one-ply evaluation; equal scores at the
/// root resolve to the lowest scan index, so the result is deterministic.
#[derive(Debug, Clone)]
pub struct AlphaBetaStrategy {
    depth: u8,
    evaluation: Evaluation,
    name: String,
}

impl AlphaBetaStrategy {
    /// Creates a search of the given depth (at least one ply).
    pub fn new(depth: u8, evaluation: Evaluation) -> Self {
        let depth = depth.max(1);
        Self {
            depth,
            evaluation,
            name: format!("alphabeta_{}_d{}", evaluation, depth),
        }
    }

    /// Search depth in plies.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Returns the best move for `player` with its score, or `None` when
    /// `player` has no legal move.
    #[instrument(skip(self, board), fields(strategy = %self.name))]
    pub fn search(&self, board: &Board, player: Disc) -> Option<(Move, i32)> {
        let children = self.ordered_children(board, player);
        let mut nodes = 0u64;
        let mut best: Option<(Move, i32)> = None;

        for (mv, next) in children {
            // Keep the window one below the best score so ties are exact.
            let alpha = best.map_or(-INF, |(_, score)| score - 1);
            let score = -self.negamax(
                &next,
                player.opponent(),
                self.depth - 1,
                -INF,
                -alpha,
                &mut nodes,
            );

            let better = match best {
                None => true,
                Some((best_mv, best_score)) => {
                    score > best_score || (score == best_score && mv.index() < best_mv.index())
                }
            };
            if better {
                best = Some((mv, score));
            }
        }

        debug!(?best, nodes, "Search complete");
        best
    }

    fn negamax(
        &self,
        board: &Board,
        player: Disc,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        nodes: &mut u64,
    ) -> i32 {
        *nodes += 1;

        if !board.has_any_legal_move(player) {
            if !board.has_any_legal_move(player.opponent()) {
                return terminal_score(board, player);
            }
            if depth == 0 {
                return self.evaluation.evaluate(board, player);
            }
            return -self.negamax(board, player.opponent(), depth, -beta, -alpha, nodes);
        }

        if depth == 0 {
            return self.evaluation.evaluate(board, player);
        }

        for (_, next) in self.ordered_children(board, player) {
            let score = -self.negamax(&next, player.opponent(), depth - 1, -beta, -alpha, nodes);
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }

    fn ordered_children(&self, board: &Board, player: Disc) -> Vec<(Move, Board)> {
        let mut scored: Vec<(Move, Board, i32)> = mask_to_moves(board.legal_mask(player))
            .into_iter()
            .filter_map(|mv| {
                let (next, _) = board.apply_move(player, mv).ok()?;
                let score = -self.evaluation.evaluate(&next, player.opponent());
                Some((mv, next, score))
            })
            .collect();

        // Stable sort keeps scan order among equal scores.
        scored.sort_by(|a, b| b.2.cmp(&a.2));
        scored.into_iter().map(|(mv, next, _)| (mv, next)).collect()
    }
}

impl Strategy for AlphaBetaStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&self, board: &Board, player: Disc, legal: &[Move]) -> Option<Move> {
        if legal.len() <= 1 {
            return legal.first().copied();
        }
        match self.search(board, player) {
            Some((mv, _)) if legal.contains(&mv) => Some(mv),
            _ => legal.first().copied(),
        }
    }
}
