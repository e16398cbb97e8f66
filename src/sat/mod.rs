//! SAT encoding components for logic grid puzzles

pub mod constraints;
pub mod decoder;
pub mod encoder;
pub mod solver;
pub mod variables;

pub use constraints::{Clause, ClauseEmitter, ClauseSink};
pub use decoder::{Assignment, SolutionDecoder};
pub use encoder::{EncodedPuzzle, EncodingStatistics, PuzzleEncoder, SolveReport};
pub use solver::{SatSolver, Solve, SolveStatus};
pub use variables::{LiteralAllocator, RegistryBuilder, VariableRegistry};
