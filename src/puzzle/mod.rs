//! Logic grid puzzle definitions

pub mod grid;
pub mod io;
pub mod model;

pub use grid::SolutionGrid;
pub use io::{canonical_puzzle, create_example_puzzles, load_puzzle_from_file, save_puzzle_to_file};
pub use model::{Category, CategoryId, Clue, Constraint, Puzzle, PuzzleSchema, ValueId};
