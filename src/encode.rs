//! CNF encoding of bounded sliding-tile planning.
//!
//! For a fixed horizon N the encoder emits clauses over the variable
//! index: per-step uniqueness of the board assignment, unit clamps for
//! the initial and goal boards, exactly one action per step, action
//! feasibility, and the transition axioms that tie consecutive steps
//! together. The formula is satisfiable iff an N-move plan exists.

use smallvec::SmallVec;

use crate::board::{neighbor, Board, Direction, PuzzleConfig};
use crate::vars::VarIndex;

/// A signed DIMACS-style literal.
pub type Lit = i32;

/// A disjunction of literals.
pub type Clause = Vec<Lit>;

/// A clause set over `var_count` variables.
///
/// Clause order only influences solver heuristics, never
/// satisfiability.
#[derive(Debug, Clone)]
pub struct Problem {
    pub var_count: usize,
    pub clauses: Vec<Clause>,
}

/// Builds the clause set for one horizon attempt.
pub struct Encoder<'a> {
    config: &'a PuzzleConfig,
    initial: &'a Board,
    vars: &'a VarIndex,
    clauses: Vec<Clause>,
}

impl<'a> Encoder<'a> {
    pub fn new(config: &'a PuzzleConfig, initial: &'a Board, vars: &'a VarIndex) -> Self {
        Self {
            config,
            initial,
            vars,
            clauses: Vec::new(),
        }
    }

    /// Emit every clause family for the horizon the index was built
    /// for.
    pub fn encode(mut self) -> Problem {
        let n = self.vars.horizon();
        let initial = self.initial;
        let goal = self.config.goal();

        for step in 1..=n + 1 {
            self.cell_uniqueness(step);
            self.tile_uniqueness(step);
        }
        self.boundary(1, initial);
        self.boundary(n + 1, goal);
        for step in 1..=n {
            self.action_exclusivity(step);
            self.action_feasibility(step);
            self.transitions(step);
        }

        Problem {
            var_count: self.vars.var_count(),
            clauses: self.clauses,
        }
    }

    fn side(&self) -> usize {
        self.config.side()
    }

    fn tiles(&self) -> usize {
        self.config.tiles()
    }

    /// Exactly one tile per cell: at-least-one plus pairwise exclusion.
    fn cell_uniqueness(&mut self, step: usize) {
        for row in 0..self.side() {
            for col in 0..self.side() {
                let vars: Vec<Lit> = (0..self.tiles())
                    .map(|tile| self.vars.position(step, row, col, tile as u8))
                    .collect();
                self.pairwise_exclusion(&vars);
                self.clauses.push(vars);
            }
        }
    }

    /// Each tile occupies exactly one cell.
    fn tile_uniqueness(&mut self, step: usize) {
        for tile in 0..self.tiles() {
            let vars: Vec<Lit> = (0..self.side())
                .flat_map(|row| (0..self.side()).map(move |col| (row, col)))
                .map(|(row, col)| self.vars.position(step, row, col, tile as u8))
                .collect();
            self.pairwise_exclusion(&vars);
            self.clauses.push(vars);
        }
    }

    fn pairwise_exclusion(&mut self, vars: &[Lit]) {
        for (i, &a) in vars.iter().enumerate() {
            for &b in &vars[i + 1..] {
                self.clauses.push(vec![-a, -b]);
            }
        }
    }

    /// Unit clauses clamping `step` to `board`.
    fn boundary(&mut self, step: usize, board: &Board) {
        for row in 0..self.side() {
            for col in 0..self.side() {
                let tile = board.get(row, col);
                self.clauses
                    .push(vec![self.vars.position(step, row, col, tile)]);
            }
        }
    }

    /// Exactly one action per step.
    fn action_exclusivity(&mut self, step: usize) {
        let vars: Vec<Lit> = Direction::ALL
            .iter()
            .map(|&dir| self.vars.action(step, dir))
            .collect();
        self.pairwise_exclusion(&vars);
        self.clauses.push(vars);
    }

    /// Taking a direction requires the blank to sit on a cell whose
    /// move in that direction stays on the grid. The source set is
    /// rebuilt from adjacency for each direction.
    fn action_feasibility(&mut self, step: usize) {
        for &dir in &Direction::ALL {
            let mut clause = vec![-self.vars.action(step, dir)];
            for (row, col) in self.sources(dir) {
                clause.push(self.vars.position(step, row, col, 0));
            }
            self.clauses.push(clause);
        }
    }

    /// Cells with an in-bounds neighbor in `dir`.
    fn sources(&self, dir: Direction) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for row in 0..self.side() {
            for col in 0..self.side() {
                if neighbor(self.side(), row, col, dir).is_some() {
                    cells.push((row, col));
                }
            }
        }
        cells
    }

    /// Effect and frame axioms for one step: if the action is taken,
    /// the blank sits on the source, and tile `p` sits on the
    /// destination, then at the next step the blank is on the
    /// destination, `p` is on the source, and every untouched cell
    /// keeps its occupant.
    ///
    /// The frame loop dominates clause volume, so the three antecedent
    /// literals are built once per (source, direction, tile) and reused
    /// for every emitted clause.
    fn transitions(&mut self, step: usize) {
        let side = self.side();
        let tiles = self.tiles();
        for row in 0..side {
            for col in 0..side {
                for &dir in &Direction::ALL {
                    let Some((nrow, ncol)) = neighbor(side, row, col, dir) else {
                        continue;
                    };
                    let action = self.vars.action(step, dir);
                    let blank_at_source = self.vars.position(step, row, col, 0);
                    for tile in 1..tiles {
                        let tile = tile as u8;
                        let antecedent: SmallVec<[Lit; 4]> = SmallVec::from_slice(&[
                            -action,
                            -blank_at_source,
                            -self.vars.position(step, nrow, ncol, tile),
                        ]);
                        // The blank ends up on the destination cell.
                        self.implied(&antecedent, self.vars.position(step + 1, nrow, ncol, 0));
                        // The displaced tile ends up on the source cell.
                        self.implied(&antecedent, self.vars.position(step + 1, row, col, tile));
                        // Frame: every other cell keeps its occupant.
                        for x in 0..side {
                            for y in 0..side {
                                if (x, y) == (row, col) || (x, y) == (nrow, ncol) {
                                    continue;
                                }
                                for k in 0..tiles {
                                    let mut clause = Vec::with_capacity(antecedent.len() + 2);
                                    clause.extend_from_slice(&antecedent);
                                    clause.push(-self.vars.position(step, x, y, k as u8));
                                    clause.push(self.vars.position(step + 1, x, y, k as u8));
                                    self.clauses.push(clause);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn implied(&mut self, antecedent: &[Lit], consequent: Lit) {
        let mut clause = Vec::with_capacity(antecedent.len() + 1);
        clause.extend_from_slice(antecedent);
        clause.push(consequent);
        self.clauses.push(clause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(side: usize, horizon: usize) -> (PuzzleConfig, VarIndex) {
        let config = PuzzleConfig::standard(side).unwrap();
        let vars = VarIndex::new(&config, horizon);
        (config, vars)
    }

    #[test]
    fn test_cell_uniqueness_clause_count() {
        let (config, vars) = setup(3, 1);
        let initial = config.goal().clone();
        let mut encoder = Encoder::new(&config, &initial, &vars);
        encoder.cell_uniqueness(1);
        // 9 cells × (C(9,2) exclusions + 1 at-least-one)
        assert_eq!(encoder.clauses.len(), 9 * 37);
    }

    #[test]
    fn test_tile_uniqueness_clause_count() {
        let (config, vars) = setup(3, 1);
        let initial = config.goal().clone();
        let mut encoder = Encoder::new(&config, &initial, &vars);
        encoder.tile_uniqueness(1);
        assert_eq!(encoder.clauses.len(), 9 * 37);
    }

    #[test]
    fn test_boundary_emits_one_unit_clause_per_cell() {
        let (config, vars) = setup(3, 1);
        let initial = config.goal().apply(Direction::Down).unwrap();
        let mut encoder = Encoder::new(&config, &initial, &vars);
        encoder.boundary(1, &initial);
        assert_eq!(encoder.clauses.len(), 9);
        assert!(encoder.clauses.iter().all(|c| c.len() == 1 && c[0] > 0));
        // The clamp names the tile actually on each cell.
        assert!(encoder
            .clauses
            .contains(&vec![vars.position(1, 1, 0, 0)]));
        assert!(encoder
            .clauses
            .contains(&vec![vars.position(1, 0, 0, 3)]));
    }

    #[test]
    fn test_action_exclusivity_clause_count() {
        let (config, vars) = setup(3, 2);
        let initial = config.goal().clone();
        let mut encoder = Encoder::new(&config, &initial, &vars);
        encoder.action_exclusivity(1);
        // C(4,2) exclusions + 1 at-least-one
        assert_eq!(encoder.clauses.len(), 7);
    }

    #[test]
    fn test_feasibility_sources_are_scoped_per_direction() {
        let (config, vars) = setup(3, 1);
        let initial = config.goal().clone();
        let encoder = Encoder::new(&config, &initial, &vars);

        // Moving up needs a row above the blank, and so on.
        assert_eq!(
            encoder.sources(Direction::Up),
            vec![(1, 0), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2)]
        );
        assert_eq!(
            encoder.sources(Direction::Down),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
        assert_eq!(
            encoder.sources(Direction::Left),
            vec![(0, 1), (0, 2), (1, 1), (1, 2), (2, 1), (2, 2)]
        );
        assert_eq!(
            encoder.sources(Direction::Right),
            vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]
        );
    }

    #[test]
    fn test_feasibility_clause_shape() {
        let (config, vars) = setup(3, 1);
        let initial = config.goal().clone();
        let mut encoder = Encoder::new(&config, &initial, &vars);
        encoder.action_feasibility(1);
        assert_eq!(encoder.clauses.len(), 4);

        let up = &encoder.clauses[Direction::Up.index()];
        assert_eq!(up[0], -vars.action(1, Direction::Up));
        let sources: Vec<Lit> = (1..3)
            .flat_map(|row| (0..3).map(move |col| (row, col)))
            .map(|(row, col)| vars.position(1, row, col, 0))
            .collect();
        assert_eq!(&up[1..], &sources[..]);
    }

    #[test]
    fn test_transition_clause_count() {
        let (config, vars) = setup(3, 1);
        let initial = config.goal().clone();
        let mut encoder = Encoder::new(&config, &initial, &vars);
        encoder.transitions(1);
        // 24 in-bounds (source, direction) pairs × 8 tiles ×
        // (2 effect clauses + 7 untouched cells × 9 frame clauses)
        assert_eq!(encoder.clauses.len(), 24 * 8 * 65);
    }

    #[test]
    fn test_full_problem_shape() {
        let (config, vars) = setup(3, 1);
        let initial = config.goal().apply(Direction::Down).unwrap();
        let problem = Encoder::new(&config, &initial, &vars).encode();
        assert_eq!(problem.var_count, 166);
        // 2 steps of uniqueness + both clamps + actions + transitions.
        assert_eq!(
            problem.clauses.len(),
            2 * (333 + 333) + 9 + 9 + 7 + 4 + 12480
        );
        // Every literal references a declared variable.
        assert!(problem
            .clauses
            .iter()
            .flatten()
            .all(|&lit| lit != 0 && lit.unsigned_abs() as usize <= problem.var_count));
    }
}
