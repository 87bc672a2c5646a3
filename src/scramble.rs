//! Random scrambling by a bounded walk of blank moves.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, Direction, PuzzleConfig};

/// Walk `moves` random blank moves away from the goal, never
/// immediately undoing the previous move.
///
/// Every legal move preserves the solvability parity, so the result is
/// always reachable from the goal, and moves only swap cells, so it is
/// always a valid permutation. The plan distance of the result is at
/// most `moves`.
pub fn scramble(config: &PuzzleConfig, moves: usize, rng: &mut impl Rng) -> Board {
    let mut board = config.goal().clone();
    let mut last: Option<Direction> = None;
    for _ in 0..moves {
        let candidates: Vec<(Direction, Board)> = Direction::ALL
            .iter()
            .filter(|&&dir| last != Some(dir.opposite()))
            .filter_map(|&dir| board.apply(dir).map(|next| (dir, next)))
            .collect();
        let Some((dir, next)) = candidates.choose(rng).cloned() else {
            break;
        };
        board = next;
        last = Some(dir);
    }
    board
}
