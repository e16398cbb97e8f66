//! Independent check of a decoded grid against the puzzle clues

use crate::puzzle::{Constraint, Puzzle, SolutionGrid, ValueId};
use std::fmt;

/// Checks decoded grids without going through the SAT encoding
pub struct SolutionValidator;

/// Result of solution validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Rows that are not a permutation of their category
    pub structure_errors: Vec<String>,
    pub violations: Vec<ClueViolation>,
}

/// A clue that does not hold on the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueViolation {
    pub clue_index: usize,
    pub clue: String,
    pub description: String,
}

impl SolutionValidator {
    pub fn validate(puzzle: &Puzzle, grid: &SolutionGrid) -> ValidationResult {
        let structure_errors = Self::check_structure(puzzle, grid);

        // Clue checks need every value placed exactly once
        let violations = if structure_errors.is_empty() {
            puzzle
                .clues
                .iter()
                .enumerate()
                .filter_map(|(i, clue)| {
                    Self::check_constraint(grid, &clue.constraint).map(|description| ClueViolation {
                        clue_index: i,
                        clue: clue.label(&puzzle.schema),
                        description,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        ValidationResult {
            is_valid: structure_errors.is_empty() && violations.is_empty(),
            structure_errors,
            violations,
        }
    }

    fn check_structure(puzzle: &Puzzle, grid: &SolutionGrid) -> Vec<String> {
        let schema = &puzzle.schema;
        let mut errors = Vec::new();

        if grid.size != schema.size() || grid.rows.len() != schema.category_count() {
            errors.push(format!(
                "grid is {}x{}, puzzle needs {}x{}",
                grid.rows.len(),
                grid.size,
                schema.category_count(),
                schema.size()
            ));
            return errors;
        }

        for category in schema.category_ids() {
            let row = grid.row(category).unwrap_or(&[]);
            if row.len() != schema.size() {
                errors.push(format!(
                    "category '{}' has {} entries, expected {}",
                    schema.category_name(category),
                    row.len(),
                    schema.size()
                ));
                continue;
            }
            for value in schema.values_of(category) {
                let count = row.iter().filter(|v| **v == value).count();
                if count != 1 {
                    errors.push(format!(
                        "'{}' appears {} times in category '{}'",
                        schema.label(value),
                        count,
                        schema.category_name(category)
                    ));
                }
            }
        }

        errors
    }

    /// `None` when the constraint holds, otherwise a description of the failure
    fn check_constraint(grid: &SolutionGrid, constraint: &Constraint) -> Option<String> {
        let pos = |v: ValueId| grid.position_of(v);

        match *constraint {
            Constraint::Linked(a, b) => {
                let (pa, pb) = (pos(a)?, pos(b)?);
                (pa != pb).then(|| format!("positions {} and {} differ", pa, pb))
            }
            Constraint::LeftOf(a, b) => {
                let (pa, pb) = (pos(a)?, pos(b)?);
                (pa + 1 != pb).then(|| format!("position {} is not directly left of {}", pa, pb))
            }
            Constraint::ForcedPosition(v, position) => {
                let pv = pos(v)?;
                (pv != position).then(|| format!("found at {}, expected {}", pv, position))
            }
            Constraint::Implication { a, position_a, b, position_b } => {
                let (pa, pb) = (pos(a)?, pos(b)?);
                (pa == position_a && pb != position_b)
                    .then(|| format!("premise holds but consequence is at {}", pb))
            }
            Constraint::Between { a, b, position } => {
                let (pa, pb) = (pos(a)?, pos(b)?);
                (pa == position && pb.abs_diff(position) != 1)
                    .then(|| format!("at {} without a neighbour (other value at {})", pa, pb))
            }
            Constraint::NextTo(a, b) => {
                let (pa, pb) = (pos(a)?, pos(b)?);
                (pa.abs_diff(pb) != 1).then(|| format!("positions {} and {} are not adjacent", pa, pb))
            }
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Result:")?;
        writeln!(f, "  Valid: {}", self.is_valid)?;
        for error in &self.structure_errors {
            writeln!(f, "  Structure: {}", error)?;
        }
        for violation in &self.violations {
            writeln!(
                f,
                "  Clue {} ({}): {}",
                violation.clue_index + 1,
                violation.clue,
                violation.description
            )?;
        }
        Ok(())
    }
}
