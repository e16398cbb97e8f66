//! SAT solver integration using CaDiCaL

use super::constraints::ClauseSink;
use super::decoder::Assignment;
use cadical::{Solver, Timeout};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    timeout: Option<Duration>,
}

/// Outcome of one solver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveStatus {
    Satisfiable(Assignment),
    Unsatisfiable,
    /// Interrupted before reaching an answer
    Unknown,
}

/// A clause sink that can be asked for a model of what it holds
pub trait Solve: ClauseSink {
    fn solve(&mut self) -> SolveStatus;
}

impl SatSolver {
    /// Create a new SAT solver instance
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            timeout: None,
        }
    }

    /// Set solving timeout; each solve call gets the full budget
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// Solve the clauses added so far
    pub fn solve(&mut self) -> SolveStatus {
        self.solve_with_assumptions(&[])
    }

    /// Solve with every literal in `assumptions` temporarily forced true
    pub fn solve_with_assumptions(&mut self, assumptions: &[i32]) -> SolveStatus {
        if let Some(timeout) = self.timeout {
            self.solver.set_callbacks(Some(Timeout::new(timeout.as_secs_f32())));
        }

        let start_time = Instant::now();
        let result = if assumptions.is_empty() {
            self.solver.solve()
        } else {
            self.solver.solve_with(assumptions.iter().copied())
        };
        log::debug!(
            "solver returned {:?} in {:.3}s ({} variables, {} clauses)",
            result,
            start_time.elapsed().as_secs_f64(),
            self.variable_count,
            self.clause_count
        );

        match result {
            Some(true) => SolveStatus::Satisfiable(self.extract_assignment()),
            Some(false) => SolveStatus::Unsatisfiable,
            None => SolveStatus::Unknown,
        }
    }

    /// Whether an assumption took part in the last unsatisfiable answer
    pub fn failed(&self, assumption: i32) -> bool {
        self.solver.failed(assumption)
    }

    /// Extract variable assignment from the solver
    fn extract_assignment(&self) -> Assignment {
        let mut values = HashMap::new();

        for var in 1..=self.variable_count as i32 {
            if let Some(value) = self.solver.value(var) {
                values.insert(var, value);
            }
        }

        Assignment::new(values)
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ClauseSink for SatSolver {
    fn add_clause(&mut self, literals: &[i32]) {
        for &literal in literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(literals.iter().copied());
        self.clause_count += 1;
    }
}

impl Solve for SatSolver {
    fn solve(&mut self) -> SolveStatus {
        SatSolver::solve(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_creation() {
        let solver = SatSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut solver = SatSolver::new();

        // x1 ∨ x2, ¬x1 ∨ x2
        solver.add_clause(&[1, 2]);
        solver.add_clause(&[-1, 2]);

        match solver.solve() {
            SolveStatus::Satisfiable(assignment) => assert_eq!(assignment.get(2), Some(true)),
            other => panic!("expected a model, got {:?}", other),
        }
    }

    #[test]
    fn test_unsatisfiable() {
        let mut solver = SatSolver::new();
        solver.add_clause(&[1]);
        solver.add_clause(&[-1]);

        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
    }

    #[test]
    fn test_failed_assumptions() {
        let mut solver = SatSolver::new();
        // selector 3 guards x1, selector 4 guards ¬x1, selector 5 guards x2
        solver.add_clause(&[1, -3]);
        solver.add_clause(&[-1, -4]);
        solver.add_clause(&[2, -5]);

        assert_eq!(solver.solve_with_assumptions(&[3, 4, 5]), SolveStatus::Unsatisfiable);
        assert!(solver.failed(3));
        assert!(solver.failed(4));

        assert!(matches!(solver.solve_with_assumptions(&[3, 5]), SolveStatus::Satisfiable(_)));
    }

    #[test]
    fn test_variable_count_tracking() {
        let mut solver = SatSolver::new();

        solver.add_clause(&[1, -5, 3]);
        assert_eq!(solver.variable_count(), 5); // Highest variable is 5

        solver.add_clause(&[2, -7]);
        assert_eq!(solver.variable_count(), 7);
        assert_eq!(solver.clause_count(), 2);
    }

    #[test]
    fn test_timeout_still_solves_easy_problem() {
        let mut solver = SatSolver::new();
        solver.set_timeout(Duration::from_secs(10));
        solver.add_clause(&[1]);

        assert!(matches!(solver.solve(), SolveStatus::Satisfiable(_)));
    }
}
