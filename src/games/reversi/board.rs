//! Bitboard rules engine: legal moves, captures, scoring.

use super::types::{BOARD_SIZE, Disc, Move, NUM_SQUARES, Outcome, RulesError, Square};

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Reversi board state represented by two bitboards.
///
/// Bit `i` corresponds to the square with index `row * 8 + col`. The two
/// masks never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    black: u64,
    white: u64,
}

impl Board {
    /// Creates the standard starting position:
    /// (3,3) white, (3,4) black, (4,3) black, (4,4) white.
    pub fn new() -> Self {
        Self {
            black: bit(28) | bit(35),
            white: bit(27) | bit(36),
        }
    }

    /// Creates a board from raw masks. Squares set in both masks are
    /// treated as black.
    pub fn from_bitboards(black: u64, white: u64) -> Self {
        Self {
            black,
            white: white & !black,
        }
    }

    /// Builds a board from eight rows of eight characters each:
    /// `X` black, `O` white, `-` or `.` empty.
    pub fn from_rows(rows: [&str; BOARD_SIZE]) -> Result<Self, String> {
        let mut line = String::with_capacity(NUM_SQUARES);
        for (r, row) in rows.iter().enumerate() {
            let row: String = row.chars().filter(|c| !c.is_whitespace()).collect();
            if row.chars().count() != BOARD_SIZE {
                return Err(format!("row {r} must have {BOARD_SIZE} squares: {row:?}"));
            }
            line.push_str(&row);
        }
        Self::from_line(&line)
    }

    /// Parses the 64-character line encoding produced by [`Board::to_line`].
    pub fn from_line(line: &str) -> Result<Self, String> {
        let mut black = 0u64;
        let mut white = 0u64;
        let mut count = 0usize;
        for (pos, c) in line.chars().enumerate() {
            if pos >= NUM_SQUARES {
                return Err(format!("board line longer than {NUM_SQUARES} squares"));
            }
            match c {
                '-' | '.' => {}
                other => match Disc::from_symbol(other) {
                    Some(Disc::Black) => black |= bit(pos),
                    Some(Disc::White) => white |= bit(pos),
                    None => return Err(format!("unexpected square {other:?} at index {pos}")),
                },
            }
            count = pos + 1;
        }
        if count != NUM_SQUARES {
            return Err(format!("board line has {count} squares, expected {NUM_SQUARES}"));
        }
        Ok(Self { black, white })
    }

    /// Encodes the board as 64 characters in index order.
    pub fn to_line(&self) -> String {
        (0..NUM_SQUARES)
            .map(|pos| match self.square_at(pos) {
                Square::Empty => '-',
                Square::Occupied(disc) => disc.symbol(),
            })
            .collect()
    }

    /// Returns the square at the given coordinate.
    pub fn get(&self, mv: Move) -> Square {
        self.square_at(mv.index())
    }

    /// Returns all squares in row-major order, grouped by row.
    pub fn rows(&self) -> [[Square; BOARD_SIZE]; BOARD_SIZE] {
        let mut rows = [[Square::Empty; BOARD_SIZE]; BOARD_SIZE];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, square) in row.iter_mut().enumerate() {
                *square = self.square_at(r * BOARD_SIZE + c);
            }
        }
        rows
    }

    /// Returns the legal move mask for the given side.
    pub fn legal_mask(&self, player: Disc) -> u64 {
        let (me, opp) = self.sides(player);
        let occupied = me | opp;
        let mut legal = 0u64;

        for pos in 0..NUM_SQUARES {
            let move_bit = bit(pos);
            if (occupied & move_bit) != 0 {
                continue;
            }
            if collect_flips(pos, me, opp) != 0 {
                legal |= move_bit;
            }
        }

        legal
    }

    /// Returns the legal moves for `player` in row-major scan order.
    pub fn legal_moves(&self, player: Disc) -> Vec<Move> {
        mask_to_moves(self.legal_mask(player))
    }

    /// Returns `true` if `mv` is legal for `player`.
    pub fn is_legal(&self, player: Disc, mv: Move) -> bool {
        self.flips(player, mv) != 0
    }

    /// Returns `true` if `player` has at least one legal move.
    pub fn has_any_legal_move(&self, player: Disc) -> bool {
        self.legal_mask(player) != 0
    }

    /// Returns the mask of discs `mv` would capture for `player`; zero when
    /// the square is occupied or nothing is captured.
    pub fn flips(&self, player: Disc, mv: Move) -> u64 {
        let (me, opp) = self.sides(player);
        collect_flips(mv.index(), me, opp)
    }

    /// Plays `mv` for `player`, returning the resulting board and the number
    /// of captured discs. `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::IllegalMove`] if the square is occupied or the
    /// move captures nothing.
    pub fn apply_move(&self, player: Disc, mv: Move) -> Result<(Board, u32), RulesError> {
        let flips = self.flips(player, mv);
        if flips == 0 {
            return Err(RulesError::IllegalMove(mv));
        }

        let (me, opp) = self.sides(player);
        let next_me = me | bit(mv.index()) | flips;
        let next_opp = opp & !flips;

        let next = match player {
            Disc::Black => Board {
                black: next_me,
                white: next_opp,
            },
            Disc::White => Board {
                black: next_opp,
                white: next_me,
            },
        };
        Ok((next, flips.count_ones()))
    }

    /// Returns `true` when neither side has a legal move.
    pub fn is_terminal(&self) -> bool {
        !self.has_any_legal_move(Disc::Black) && !self.has_any_legal_move(Disc::White)
    }

    /// Returns `(black_count, white_count)`.
    pub fn score(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    /// Returns the disc count for one side.
    pub fn count(&self, player: Disc) -> u8 {
        self.discs(player).count_ones() as u8
    }

    /// Returns the occupancy mask for one side.
    pub fn discs(&self, player: Disc) -> u64 {
        self.sides(player).0
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        let (black, white) = self.score();
        NUM_SQUARES as u8 - black - white
    }

    /// Majority-count result. Only meaningful on a terminal board.
    pub fn winner(&self) -> Outcome {
        let (black, white) = self.score();
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Outcome::Black,
            std::cmp::Ordering::Less => Outcome::White,
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        let mut result = String::from("  0 1 2 3 4 5 6 7");
        for row in 0..BOARD_SIZE {
            result.push('\n');
            result.push_str(&row.to_string());
            for col in 0..BOARD_SIZE {
                result.push(' ');
                result.push(match self.square_at(row * BOARD_SIZE + col) {
                    Square::Empty => '.',
                    Square::Occupied(disc) => disc.symbol(),
                });
            }
        }
        result
    }

    fn square_at(&self, pos: usize) -> Square {
        let square = bit(pos);
        if (self.black & square) != 0 {
            Square::Occupied(Disc::Black)
        } else if (self.white & square) != 0 {
            Square::Occupied(Disc::White)
        } else {
            Square::Empty
        }
    }

    fn sides(&self, player: Disc) -> (u64, u64) {
        match player {
            Disc::Black => (self.black, self.white),
            Disc::White => (self.white, self.black),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a move mask into moves in ascending index order.
pub fn mask_to_moves(mut mask: u64) -> Vec<Move> {
    let mut out = Vec::with_capacity(mask.count_ones() as usize);
    while mask != 0 {
        let pos = mask.trailing_zeros() as usize;
        if let Some(mv) = Move::from_index(pos) {
            out.push(mv);
        }
        mask &= mask - 1;
    }
    out
}

fn collect_flips(pos: usize, me: u64, opp: u64) -> u64 {
    if pos >= NUM_SQUARES {
        return 0;
    }

    let move_bit = bit(pos);
    if ((me | opp) & move_bit) != 0 {
        return 0;
    }

    let (row, col) = pos_to_row_col(pos);
    let mut flips = 0u64;

    for (dr, dc) in DIRECTIONS {
        let mut r = row + dr;
        let mut c = col + dc;
        let mut line = 0u64;

        while in_bounds(r, c) {
            let square = bit((r as usize) * BOARD_SIZE + c as usize);
            if (opp & square) != 0 {
                line |= square;
            } else {
                // Own disc closes the run; an empty square voids it.
                if (me & square) != 0 {
                    flips |= line;
                }
                break;
            }

            r += dr;
            c += dc;
        }
    }

    flips
}

fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

fn pos_to_row_col(pos: usize) -> (i32, i32) {
    ((pos / BOARD_SIZE) as i32, (pos % BOARD_SIZE) as i32)
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
