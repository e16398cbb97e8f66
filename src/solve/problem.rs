//! Logic grid puzzle problem definition

use super::{Solution, SolutionValidator, ValidationResult};
use crate::config::Settings;
use crate::error::SolveError;
use crate::puzzle::{canonical_puzzle, load_puzzle_from_file, Puzzle, SolutionGrid};
use crate::sat::{EncodingStatistics, PuzzleEncoder, SolveReport};
use anyhow::{Context, Result};

/// A loaded puzzle together with the settings used to solve it
pub struct PuzzleProblem {
    settings: Settings,
    puzzle: Puzzle,
    encoder: PuzzleEncoder,
}

impl PuzzleProblem {
    /// Load the configured puzzle file, or the canonical puzzle when none is set
    pub fn new(settings: Settings) -> Result<Self> {
        let puzzle = match &settings.input.puzzle_file {
            Some(path) => load_puzzle_from_file(path).context("Failed to load puzzle file")?,
            None => canonical_puzzle(),
        };
        Ok(Self::with_puzzle(settings, puzzle))
    }

    /// Create a problem with an explicit puzzle (useful for testing)
    pub fn with_puzzle(settings: Settings, puzzle: Puzzle) -> Self {
        let encoder = PuzzleEncoder::new(settings.solver.clone());
        Self { settings, puzzle, encoder }
    }

    /// Solve the puzzle and return every valid solution found
    pub fn solve(&self) -> Result<Vec<Solution>> {
        log::info!(
            "solving '{}': {} categories of {} values, {} clues",
            self.puzzle.name,
            self.puzzle.schema.category_count(),
            self.puzzle.size(),
            self.puzzle.clues.len()
        );

        let report = self.encoder.solve(&self.puzzle)?;
        let found = report.grids.len();

        if self.settings.solver.require_unique && found > 1 {
            return Err(SolveError::AmbiguousPuzzle { found }.into());
        }

        let unique = match (found, report.exhausted) {
            (1, true) => Some(true),
            (n, _) if n > 1 => Some(false),
            _ => None,
        };

        let solutions = report
            .grids
            .iter()
            .enumerate()
            .map(|(i, grid)| self.accept_model(i, grid, &report, unique))
            .collect::<Result<Vec<_>>>()?;

        if solutions.is_empty() {
            anyhow::bail!("Solver returned without a model");
        }

        log::debug!("{} valid solution(s)", solutions.len());
        Ok(solutions)
    }

    /// Wrap a decoded model. A model that breaks a clue fails the whole solve.
    fn accept_model(
        &self,
        index: usize,
        grid: &SolutionGrid,
        report: &SolveReport,
        unique: Option<bool>,
    ) -> Result<Solution> {
        let validation = SolutionValidator::validate(&self.puzzle, grid);
        if !validation.is_valid {
            log::error!("model {} failed validation:\n{}", index + 1, validation);
            anyhow::bail!("Model {} violates the puzzle:\n{}", index + 1, validation);
        }

        Ok(Solution::new(
            &self.puzzle,
            grid,
            report.statistics.total_clauses,
            report.statistics.total_variables,
            unique,
            report.solve_time,
        ))
    }

    /// Check a previously saved solution against this puzzle
    pub fn validate_solution(&self, solution: &Solution) -> Result<ValidationResult> {
        let grid = solution
            .grid_for(&self.puzzle)
            .context("Solution does not match the puzzle categories")?;
        Ok(SolutionValidator::validate(&self.puzzle, &grid))
    }

    /// Encode without solving and report the clause counts
    pub fn encoding_statistics(&self) -> Result<EncodingStatistics> {
        Ok(self.encoder.analyze(&self.puzzle)?)
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::io::parse_puzzle_from_str;
    use std::time::Duration;

    fn settings(require_unique: bool) -> Settings {
        let mut settings = Settings::default();
        settings.solver.timeout_seconds = 0;
        settings.solver.require_unique = require_unique;
        settings
    }

    const OPEN: &str = r#"
name: open
categories:
  - name: color
    values: [Red, Blue]
  - name: pet
    values: [Cat, Dog]
clues:
  - kind: linked
    a: Red
    b: Cat
"#;

    #[test]
    fn test_defaults_to_canonical_puzzle() {
        let problem = PuzzleProblem::new(settings(true)).unwrap();
        assert_eq!(problem.puzzle().name, "einstein");

        let solutions = problem.solve().unwrap();
        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].unique, Some(true));
        assert_eq!(solutions[0].value_at("pet", 3), Some("Fish"));
        assert_eq!(solutions[0].value_at("nationality", 3), Some("German"));
    }

    #[test]
    fn test_ambiguous_puzzle_is_rejected_when_uniqueness_required() {
        let puzzle = parse_puzzle_from_str(OPEN).unwrap();
        let problem = PuzzleProblem::with_puzzle(settings(true), puzzle);

        let err = problem.solve().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SolveError>(),
            Some(SolveError::AmbiguousPuzzle { found: 2 })
        ));
    }

    #[test]
    fn test_ambiguous_puzzle_lists_models_otherwise() {
        let puzzle = parse_puzzle_from_str(OPEN).unwrap();
        let problem = PuzzleProblem::with_puzzle(settings(false), puzzle);

        let solutions = problem.solve().unwrap();
        assert_eq!(solutions.len(), 2);
        assert!(solutions.iter().all(|s| s.unique == Some(false)));
        for solution in &solutions {
            assert_eq!(solution.position_of("Red"), solution.position_of("Cat"));
        }
    }

    #[test]
    fn test_validate_saved_solution() {
        let problem = PuzzleProblem::new(settings(true)).unwrap();
        let mut solution = problem.solve().unwrap().remove(0);
        assert!(problem.validate_solution(&solution).unwrap().is_valid);

        // move the fish next door
        let pets = &mut solution.rows[4].values;
        pets.swap(3, 4);
        let result = problem.validate_solution(&solution).unwrap();
        assert!(!result.is_valid);
        assert!(result.violations.iter().any(|v| v.clue == "The Swede keeps dogs."));
    }

    #[test]
    fn test_model_breaking_a_clue_is_an_error() {
        let problem = PuzzleProblem::new(settings(true)).unwrap();
        let mut solution = problem.solve().unwrap().remove(0);

        // still a permutation, but the Swede no longer keeps the dogs
        solution.rows[4].values.swap(3, 4);
        let grid = solution.grid_for(problem.puzzle()).unwrap();
        let report = SolveReport {
            grids: vec![grid.clone()],
            exhausted: true,
            statistics: problem.encoding_statistics().unwrap(),
            solve_time: Duration::ZERO,
        };

        let err = problem.accept_model(0, &grid, &report, Some(true)).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Model 1 violates the puzzle"));
        assert!(message.contains("The Swede keeps dogs."));
    }

    #[test]
    fn test_encoding_statistics() {
        let problem = PuzzleProblem::new(settings(true)).unwrap();
        let stats = problem.encoding_statistics().unwrap();
        assert_eq!(stats.registry_variables, 125);
        assert_eq!(stats.clue_clauses.len(), 15);
    }
}
