//! Logic grid puzzle SAT solver
//!
//! This library encodes permutation-based logic grid puzzles ("Zebra" puzzles)
//! into CNF, hands the clauses to a SAT solver and decodes the model back into
//! a grid of category values.

pub mod config;
pub mod error;
pub mod puzzle;
pub mod sat;
pub mod solve;
pub mod utils;

pub use config::Settings;
pub use solve::{PuzzleProblem, Solution};

use anyhow::Result;

/// Main entry point for solving a configured puzzle
pub fn solve_puzzle(settings: Settings) -> Result<Vec<Solution>> {
    let problem = PuzzleProblem::new(settings)?;
    problem.solve()
}
