//! In-process move selection.

use crate::games::reversi::{Board, Disc, Move};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// A pure move-selection policy.
///
/// Implementations never perform I/O. `legal` is the full legal move list
/// for `player` in scan order; `None` is returned only when it is empty.
pub trait Strategy: Send + Sync + std::fmt::Debug {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Picks one of `legal`.
    fn select_move(&self, board: &Board, player: Disc, legal: &[Move]) -> Option<Move>;
}

/// Picks uniformly among legal moves.
#[derive(Debug)]
pub struct RandomStrategy {
    rng: Mutex<StdRng>,
}

impl RandomStrategy {
    /// Creates a strategy seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a reproducible strategy.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    #[instrument(skip(self, _board, legal), fields(legal = legal.len()))]
    fn select_move(&self, _board: &Board, player: Disc, legal: &[Move]) -> Option<Move> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let choice = legal.choose(&mut *rng).copied();
        debug!(?player, ?choice, "Random move chosen");
        choice
    }
}
