//! Iterative-deepening horizon search over the SAT encoding.
//!
//! The driver attempts horizons in increasing order, building a fresh
//! variable index and problem for each, so the first satisfiable
//! horizon yields a plan of minimal length. Unsatisfiability at one
//! horizon is expected control flow, not an error.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

use log::{debug, info};
use thiserror::Error;

use crate::board::{Board, Direction, PuzzleConfig};
use crate::decode::{decode_plan, DecodeInconsistency};
use crate::encode::Encoder;
use crate::oracle::{Oracle, OracleError, Outcome, SatOracle};
use crate::vars::VarIndex;

/// Search bounds for the driver.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Largest horizon to attempt.
    pub max_horizon: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { max_horizon: 30 }
    }
}

/// Why no plan was produced.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The board sits in the unreachable parity class; a larger bound
    /// cannot help.
    #[error("puzzle is not solvable from this board")]
    Unsolvable,
    /// Every horizon up to the bound was unsatisfiable. Retryable with
    /// a larger bound; the attempts record what was tried.
    #[error("no plan within {max_horizon} moves")]
    BoundExceeded {
        max_horizon: usize,
        attempts: Vec<HorizonAttempt>,
    },
    /// The model violated an exactly-one invariant while decoding.
    #[error(transparent)]
    Inconsistent(#[from] DecodeInconsistency),
    /// The solving backend failed.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// A plan: one blank move per step and the induced board sequence
/// (`len() + 1` boards, first the initial board, last the goal).
#[derive(Debug, Clone)]
pub struct Plan {
    pub actions: Vec<Direction>,
    pub trajectory: Vec<Board>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Diagnostics for one attempted horizon.
#[derive(Debug, Clone, Copy)]
pub struct HorizonAttempt {
    pub horizon: usize,
    pub vars: usize,
    pub clauses: usize,
    pub satisfiable: bool,
}

/// A successful search: the minimal plan plus per-horizon diagnostics,
/// kept so callers can inspect every attempt without re-running.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub plan: Plan,
    pub attempts: Vec<HorizonAttempt>,
    pub time_elapsed_ms: u64,
}

/// Find a minimal-length plan from `initial` to the configured goal.
///
/// Returns an empty plan when the board already matches the goal, and
/// checks solvability before any oracle call.
pub fn find_plan(
    config: &PuzzleConfig,
    initial: &Board,
    planner: &PlannerConfig,
    oracle: &mut dyn Oracle,
) -> Result<SearchResult, PlanError> {
    let start = Instant::now();

    if initial == config.goal() {
        return Ok(empty_result(initial, start));
    }
    if !config.is_solvable(initial) {
        return Err(PlanError::Unsolvable);
    }

    let mut attempts = Vec::new();
    for horizon in 1..=planner.max_horizon {
        let vars = VarIndex::new(config, horizon);
        let problem = Encoder::new(config, initial, &vars).encode();
        debug!(
            "horizon {horizon}: {} vars, {} clauses",
            problem.var_count,
            problem.clauses.len()
        );

        let outcome = oracle.solve(&problem)?;
        attempts.push(HorizonAttempt {
            horizon,
            vars: problem.var_count,
            clauses: problem.clauses.len(),
            satisfiable: matches!(outcome, Outcome::Satisfiable(_)),
        });
        match outcome {
            Outcome::Satisfiable(model) => {
                let (trajectory, actions) = decode_plan(config, &vars, &model)?;
                info!("plan of length {horizon} found");
                return Ok(SearchResult {
                    plan: Plan {
                        actions,
                        trajectory,
                    },
                    attempts,
                    time_elapsed_ms: elapsed_ms(start),
                });
            }
            Outcome::Unsatisfiable => {
                debug!("horizon {horizon} unsatisfiable");
            }
        }
    }

    Err(PlanError::BoundExceeded {
        max_horizon: planner.max_horizon,
        attempts,
    })
}

struct AttemptMessage {
    horizon: usize,
    var_count: usize,
    clause_count: usize,
    outcome: Result<Outcome, OracleError>,
}

/// Parallel variant: fans a window of consecutive horizons out across
/// `workers` threads, each with its own fresh oracle.
///
/// The window concludes at its smallest satisfiable horizon only after
/// every smaller horizon has reported, which preserves the
/// minimal-length guarantee; results for larger horizons are ignored.
/// Once a success is confirmed, attempts that have not started are
/// cancelled; an in-flight solver call is opaque and runs to
/// completion.
pub fn find_plan_parallel(
    config: &PuzzleConfig,
    initial: &Board,
    planner: &PlannerConfig,
    workers: usize,
) -> Result<SearchResult, PlanError> {
    let start = Instant::now();

    if initial == config.goal() {
        return Ok(empty_result(initial, start));
    }
    if !config.is_solvable(initial) {
        return Err(PlanError::Unsolvable);
    }

    let workers = workers.max(1);
    let mut attempts = Vec::new();
    let mut window_start = 1;
    while window_start <= planner.max_horizon {
        let window_end = planner.max_horizon.min(window_start + workers - 1);
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();

        for horizon in window_start..=window_end {
            let tx = tx.clone();
            let config = config.clone();
            let initial = initial.clone();
            let cancel = Arc::clone(&cancel);
            thread::spawn(move || {
                if cancel.load(Ordering::Acquire) {
                    return;
                }
                let vars = VarIndex::new(&config, horizon);
                let problem = Encoder::new(&config, &initial, &vars).encode();
                let mut oracle = SatOracle;
                let outcome = oracle.solve(&problem);
                let _ = tx.send(AttemptMessage {
                    horizon,
                    var_count: problem.var_count,
                    clause_count: problem.clauses.len(),
                    outcome,
                });
            });
        }
        drop(tx);

        let mut pending: BTreeMap<usize, AttemptMessage> = BTreeMap::new();
        let mut next = window_start;
        for message in rx {
            pending.insert(message.horizon, message);
            // Consume results in horizon order; nothing is concluded
            // while a smaller horizon is still outstanding.
            while let Some(message) = pending.remove(&next) {
                let outcome = message.outcome?;
                attempts.push(HorizonAttempt {
                    horizon: message.horizon,
                    vars: message.var_count,
                    clauses: message.clause_count,
                    satisfiable: matches!(outcome, Outcome::Satisfiable(_)),
                });
                if let Outcome::Satisfiable(model) = outcome {
                    cancel.store(true, Ordering::Release);
                    let vars = VarIndex::new(config, message.horizon);
                    let (trajectory, actions) = decode_plan(config, &vars, &model)?;
                    info!("plan of length {} found", message.horizon);
                    return Ok(SearchResult {
                        plan: Plan {
                            actions,
                            trajectory,
                        },
                        attempts,
                        time_elapsed_ms: elapsed_ms(start),
                    });
                }
                next += 1;
            }
            if next > window_end {
                break;
            }
        }
        window_start = window_end + 1;
    }

    Err(PlanError::BoundExceeded {
        max_horizon: planner.max_horizon,
        attempts,
    })
}

fn empty_result(initial: &Board, start: Instant) -> SearchResult {
    SearchResult {
        plan: Plan {
            actions: Vec::new(),
            trajectory: vec![initial.clone()],
        },
        attempts: Vec::new(),
        time_elapsed_ms: elapsed_ms(start),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
