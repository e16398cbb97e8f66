//! Error types for puzzle loading, encoding, solving and decoding

use thiserror::Error;

/// Caller misuse of the encoding layer.
///
/// These are contract violations: the encoder never clamps or guesses,
/// and clauses emitted before the error are left in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("category '{0}' is already registered")]
    CategoryAlreadyRegistered(String),

    #[error("category '{category}' has {found} values, expected {expected}")]
    CategorySizeMismatch {
        category: String,
        found: usize,
        expected: usize,
    },

    #[error("category '{0}' was never registered")]
    UnregisteredCategory(String),

    #[error("value {index} does not exist in category '{category}'")]
    UnknownValue { category: String, index: usize },

    #[error("position {position} is out of range (puzzle has {size} positions)")]
    PositionOutOfRange { position: usize, size: usize },

    #[error("position {position} is not interior (needs 0 < position < {})", .size - 1)]
    NotInteriorPosition { position: usize, size: usize },

    #[error("literal 0 is the clause terminator and cannot appear inside a clause")]
    ZeroLiteral,

    #[error("cannot emit an empty clause")]
    EmptyClause,

    #[error("{0} literal(s) pending without a terminating 0")]
    UnterminatedClause(usize),
}

/// The external assignment violates the exclusivity invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("value '{value}' is not placed at any position")]
    ValueUnplaced { value: String },

    #[error("value '{value}' is placed at several positions: {positions:?}")]
    ValueInMultiplePositions { value: String, positions: Vec<usize> },

    #[error("category '{category}' has both '{first}' and '{second}' at position {position}")]
    PositionConflict {
        category: String,
        position: usize,
        first: String,
        second: String,
    },
}

/// Failures reported after handing the clause set to the solver.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(
        "puzzle is not satisfiable ({clauses} clauses, {variables} variables){}",
        format_core(.core)
    )]
    Unsatisfiable {
        clauses: usize,
        variables: usize,
        core: Vec<String>,
    },

    #[error("solver gave up without an answer (timeout {timeout_seconds}s)")]
    Unknown { timeout_seconds: u64 },

    #[error("puzzle has more than one solution ({found} found)")]
    AmbiguousPuzzle { found: usize },

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("solver reported success but the assignment is inconsistent: {0}")]
    Decode(#[from] DecodeError),
}

fn format_core(core: &[String]) -> String {
    if core.is_empty() {
        String::new()
    } else {
        format!("; conflicting clues: {}", core.join(" | "))
    }
}

/// Problems in a puzzle definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("puzzle defines no categories")]
    NoCategories,

    #[error("category '{category}' has {found} values but the puzzle size is {expected}")]
    CategorySize {
        category: String,
        found: usize,
        expected: usize,
    },

    #[error("category '{0}' is defined twice")]
    DuplicateCategory(String),

    #[error("value label '{0}' appears more than once")]
    DuplicateValue(String),

    #[error("clue {clue} references unknown value '{label}'")]
    UnknownValueLabel { clue: usize, label: String },
}
