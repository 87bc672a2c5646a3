//! Satisfiability oracle interface and the varisat-backed default.
//!
//! The driver only depends on the [`Oracle`] trait, so alternative
//! backends (including incremental ones) can be substituted without
//! touching the encoder.

use thiserror::Error;
use varisat::{solver::Solver, ExtendFormula, Lit as SolverLit};

use crate::encode::Problem;
use crate::vars::Var;

/// Failure inside the solving backend.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("solver backend error: {0}")]
    Backend(String),
}

/// A total truth assignment over a problem's declared variables.
/// Variables the backend left unassigned are false.
#[derive(Debug, Clone)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    pub(crate) fn new(var_count: usize) -> Self {
        Self {
            values: vec![false; var_count + 1],
        }
    }

    pub(crate) fn set(&mut self, var: Var) {
        let idx = var as usize;
        if idx < self.values.len() {
            self.values[idx] = true;
        }
    }

    pub fn is_true(&self, var: Var) -> bool {
        self.values.get(var as usize).copied().unwrap_or(false)
    }
}

/// Outcome of one oracle call.
#[derive(Debug, Clone)]
pub enum Outcome {
    Satisfiable(Model),
    Unsatisfiable,
}

/// Injected satisfiability capability: one blocking call per problem.
pub trait Oracle {
    fn solve(&mut self, problem: &Problem) -> Result<Outcome, OracleError>;
}

/// Varisat-backed oracle. Every call builds a fresh solver, so calls
/// are independent and the oracle itself carries no state.
#[derive(Debug, Default)]
pub struct SatOracle;

impl Oracle for SatOracle {
    fn solve(&mut self, problem: &Problem) -> Result<Outcome, OracleError> {
        let mut solver = Solver::new();
        let mut lits = Vec::new();
        for clause in &problem.clauses {
            lits.clear();
            lits.extend(
                clause
                    .iter()
                    .map(|&lit| SolverLit::from_dimacs(lit as isize)),
            );
            solver.add_clause(&lits);
        }

        match solver.solve() {
            Ok(true) => {
                let assignment = solver
                    .model()
                    .ok_or_else(|| OracleError::Backend("SAT but no model returned".to_string()))?;
                let mut model = Model::new(problem.var_count);
                for lit in assignment {
                    if lit.is_positive() {
                        model.set(lit.to_dimacs() as Var);
                    }
                }
                Ok(Outcome::Satisfiable(model))
            }
            Ok(false) => Ok(Outcome::Unsatisfiable),
            Err(e) => Err(OracleError::Backend(e.to_string())),
        }
    }
}
