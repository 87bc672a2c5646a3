//! Board representation, blank moves, and solvability.
//!
//! A board is a row-major square grid of tile values with `0` standing
//! for the blank. Construction validates that the cells form a
//! permutation, so every `Board` in the rest of the crate is known to
//! be well-formed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A cardinal move of the blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Canonical ordering, shared with the variable index.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row/column offset of the cell the blank moves into.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Index into [`Direction::ALL`].
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", name)
    }
}

/// Cell reached from `(row, col)` by moving in `dir`, if it stays on a
/// `side`-sized grid.
pub(crate) fn neighbor(
    side: usize,
    row: usize,
    col: usize,
    dir: Direction,
) -> Option<(usize, usize)> {
    let (dr, dc) = dir.delta();
    let nr = row as i32 + dr;
    let nc = col as i32 + dc;
    if nr < 0 || nc < 0 || nr >= side as i32 || nc >= side as i32 {
        return None;
    }
    Some((nr as usize, nc as usize))
}

/// Rejected board input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must be a square grid with side at least 2, got {0} cells")]
    BadShape(usize),
    #[error("cells must be a permutation of 0..{expected}, value {value} is out of range or repeated")]
    NotAPermutation { expected: usize, value: u8 },
}

/// A square sliding-tile board; cell value 0 is the blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Board {
    side: usize,
    cells: Vec<u8>,
}

impl Board {
    /// Build a board from row-major cells, validating the permutation
    /// invariant.
    pub fn new(side: usize, cells: Vec<u8>) -> Result<Self, BoardError> {
        if side < 2 || cells.len() != side * side {
            return Err(BoardError::BadShape(cells.len()));
        }
        let mut seen = vec![false; cells.len()];
        for &value in &cells {
            if value as usize >= cells.len() || seen[value as usize] {
                return Err(BoardError::NotAPermutation {
                    expected: cells.len(),
                    value,
                });
            }
            seen[value as usize] = true;
        }
        Ok(Self { side, cells })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.side + col]
    }

    /// Location of the blank.
    pub fn blank_pos(&self) -> (usize, usize) {
        // The permutation invariant guarantees exactly one blank.
        let idx = self.cells.iter().position(|&v| v == 0).unwrap();
        (idx / self.side, idx % self.side)
    }

    /// Move the blank in `dir`, swapping it with the neighboring tile.
    /// Returns `None` when the move would leave the grid.
    pub fn apply(&self, dir: Direction) -> Option<Board> {
        let (row, col) = self.blank_pos();
        let (nrow, ncol) = neighbor(self.side, row, col, dir)?;
        let mut cells = self.cells.clone();
        cells.swap(row * self.side + col, nrow * self.side + ncol);
        Some(Board {
            side: self.side,
            cells,
        })
    }

    /// Out-of-order pairs in the flattened non-blank sequence.
    fn inversions(&self) -> usize {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0)
            .map(|(i, &v)| {
                self.cells[i + 1..]
                    .iter()
                    .filter(|&&w| w != 0 && w < v)
                    .count()
            })
            .sum()
    }

    /// Invariant class of the board under legal moves. On odd sides this
    /// is the inversion parity; on even sides vertical moves flip the
    /// inversion parity, so the blank row joins the signature.
    fn parity_signature(&self) -> usize {
        let inversions = self.inversions();
        if self.side % 2 == 1 {
            inversions % 2
        } else {
            (inversions + self.blank_pos().0) % 2
        }
    }
}

impl TryFrom<Vec<Vec<u8>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        let side = rows.len();
        if rows.iter().any(|row| row.len() != side) {
            return Err(BoardError::BadShape(rows.iter().map(Vec::len).sum()));
        }
        Board::new(side, rows.into_iter().flatten().collect())
    }
}

impl From<Board> for Vec<Vec<u8>> {
    fn from(board: Board) -> Self {
        board
            .cells
            .chunks(board.side)
            .map(<[u8]>::to_vec)
            .collect()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.side * self.side - 1).to_string().len();
        for row in self.cells.chunks(self.side) {
            for (i, &value) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                if value == 0 {
                    write!(f, "{:>width$}", ".")?;
                } else {
                    write!(f, "{:>width$}", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Immutable puzzle description: side length and goal board. Threaded
/// through every component instead of module-level globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleConfig {
    side: usize,
    goal: Board,
}

impl PuzzleConfig {
    /// Standard goal: tiles `0..side²` in row-major order, blank in the
    /// top-left corner.
    pub fn standard(side: usize) -> Result<Self, BoardError> {
        if side < 2 || side * side > u8::MAX as usize + 1 {
            return Err(BoardError::BadShape(side * side));
        }
        let cells = (0..side * side).map(|v| v as u8).collect();
        Ok(Self {
            side,
            goal: Board::new(side, cells)?,
        })
    }

    /// Puzzle with an arbitrary goal board.
    pub fn with_goal(goal: Board) -> Self {
        Self {
            side: goal.side(),
            goal,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn goal(&self) -> &Board {
        &self.goal
    }

    /// Number of tile values, blank included.
    pub fn tiles(&self) -> usize {
        self.side * self.side
    }

    /// Whether `board` can reach the goal at all. Legal moves preserve
    /// the parity signature, so reachability is exactly signature
    /// equality.
    pub fn is_solvable(&self, board: &Board) -> bool {
        board.side() == self.side && board.parity_signature() == self.goal.parity_signature()
    }
}
