//! SAT-based optimal planner for sliding-tile puzzles.
//!
//! The crate reduces bounded sliding-tile planning to propositional
//! satisfiability: a step-indexed encoding of board states and blank
//! moves, an iterative-deepening driver over plan lengths, and a
//! decoder that turns a satisfying assignment back into a concrete
//! plan. The first satisfiable horizon yields a minimal-length plan.

pub mod board;
pub mod decode;
pub mod encode;
pub mod oracle;
pub mod planner;
pub mod scramble;
pub mod vars;

// Re-export main types
pub use board::{Board, BoardError, Direction, PuzzleConfig};
pub use decode::{decode_plan, DecodeInconsistency};
pub use encode::{Clause, Encoder, Lit, Problem};
pub use oracle::{Model, Oracle, OracleError, Outcome, SatOracle};
pub use planner::{
    find_plan, find_plan_parallel, HorizonAttempt, Plan, PlanError, PlannerConfig, SearchResult,
};
pub use scramble::scramble;
pub use vars::{Prop, Var, VarIndex};
