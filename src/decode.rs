//! Reconstruction of a plan from a satisfying assignment.
//!
//! The uniqueness families guarantee exactly one true position
//! proposition per cell and exactly one true action proposition per
//! step. A model violating that indicates an encoder or
//! oracle-integration defect, so decoding fails loudly instead of
//! picking an occupant arbitrarily.

use thiserror::Error;

use crate::board::{Board, Direction, PuzzleConfig};
use crate::oracle::Model;
use crate::vars::VarIndex;

/// Exactly-one violation while reading a model.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("model inconsistency: {0}")]
pub struct DecodeInconsistency(String);

/// Rebuild the board trajectory and action list for the index's
/// horizon: `N+1` boards and `N` blank moves.
pub fn decode_plan(
    config: &PuzzleConfig,
    vars: &VarIndex,
    model: &Model,
) -> Result<(Vec<Board>, Vec<Direction>), DecodeInconsistency> {
    let n = vars.horizon();
    let mut trajectory = Vec::with_capacity(n + 1);
    for step in 1..=n + 1 {
        trajectory.push(decode_board(config, vars, model, step)?);
    }
    let mut actions = Vec::with_capacity(n);
    for step in 1..=n {
        actions.push(decode_action(vars, model, step)?);
    }
    Ok((trajectory, actions))
}

fn decode_board(
    config: &PuzzleConfig,
    vars: &VarIndex,
    model: &Model,
    step: usize,
) -> Result<Board, DecodeInconsistency> {
    let side = config.side();
    let mut cells = Vec::with_capacity(config.tiles());
    for row in 0..side {
        for col in 0..side {
            let mut occupant = None;
            for tile in 0..config.tiles() {
                let tile = tile as u8;
                if model.is_true(vars.position(step, row, col, tile)) {
                    if let Some(prev) = occupant.replace(tile) {
                        return Err(DecodeInconsistency(format!(
                            "step {step}: cell ({row}, {col}) holds both {prev} and {tile}"
                        )));
                    }
                }
            }
            match occupant {
                Some(tile) => cells.push(tile),
                None => {
                    return Err(DecodeInconsistency(format!(
                        "step {step}: cell ({row}, {col}) has no occupant"
                    )))
                }
            }
        }
    }
    Board::new(side, cells)
        .map_err(|e| DecodeInconsistency(format!("step {step}: {e}")))
}

fn decode_action(
    vars: &VarIndex,
    model: &Model,
    step: usize,
) -> Result<Direction, DecodeInconsistency> {
    let mut taken = None;
    for &dir in &Direction::ALL {
        if model.is_true(vars.action(step, dir)) {
            if let Some(prev) = taken.replace(dir) {
                return Err(DecodeInconsistency(format!(
                    "step {step}: both {prev} and {dir} taken"
                )));
            }
        }
    }
    taken.ok_or_else(|| DecodeInconsistency(format!("step {step}: no action taken")))
}
