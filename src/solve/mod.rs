//! Puzzle problem definition and solution handling

pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::PuzzleProblem;
pub use solution::{CategoryRow, Solution};
pub use validator::{ClueViolation, SolutionValidator, ValidationResult};
