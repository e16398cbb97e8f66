//! Encoding session for logic grid puzzles

use super::constraints::{encode_constraint, Clause, ClauseEmitter, ClauseSink};
use super::decoder::{Assignment, SolutionDecoder};
use super::solver::{SatSolver, Solve, SolveStatus};
use super::variables::{LiteralAllocator, VariableRegistry};
use crate::config::SolverConfig;
use crate::error::{EncodingError, SolveError};
use crate::puzzle::{Puzzle, SolutionGrid};
use std::time::{Duration, Instant};

/// A puzzle fully translated into clauses held by `S`
pub struct EncodedPuzzle<S: ClauseSink> {
    pub registry: VariableRegistry,
    pub allocator: LiteralAllocator,
    pub emitter: ClauseEmitter<S>,
    /// Clauses added by the registry exclusivity constraints
    pub structural_clauses: usize,
    /// Clauses added by each clue, in clue order
    pub clue_clauses: Vec<usize>,
    /// Selector variable per clue when encoded with guards
    pub selectors: Vec<i32>,
}

impl<S: ClauseSink> EncodedPuzzle<S> {
    /// Translate `puzzle` into `sink`.
    ///
    /// With `guarded`, every clue gets a fresh selector variable and its
    /// clauses only apply when that selector is assumed true.
    pub fn encode(puzzle: &Puzzle, sink: S, guarded: bool) -> Result<Self, EncodingError> {
        let mut emitter = ClauseEmitter::new(sink);
        let (registry, mut allocator) = VariableRegistry::build(puzzle.schema.clone(), &mut emitter)?;
        let structural_clauses = emitter.clause_count();

        let mut clue_clauses = Vec::with_capacity(puzzle.clues.len());
        let mut selectors = Vec::new();

        for (i, clue) in puzzle.clues.iter().enumerate() {
            if guarded {
                let selector = allocator.next_variable();
                selectors.push(selector);
                emitter.set_guard(Some(selector));
            }

            let before = emitter.clause_count();
            encode_constraint(&registry, &mut emitter, &clue.constraint)?;
            let added = emitter.clause_count() - before;
            clue_clauses.push(added);

            log::trace!(
                "clue {} {} added {} clauses",
                i,
                clue.constraint.describe(&puzzle.schema),
                added
            );
        }
        emitter.set_guard(None);
        emitter.ensure_flushed()?;

        log::info!(
            "encoded '{}': {} variables, {} clauses ({} structural)",
            puzzle.name,
            allocator.issued(),
            emitter.clause_count(),
            structural_clauses
        );

        Ok(Self {
            registry,
            allocator,
            emitter,
            structural_clauses,
            clue_clauses,
            selectors,
        })
    }

    /// Forbid the registry placement described by `assignment`
    pub fn block(&mut self, assignment: &Assignment) -> Result<(), EncodingError> {
        let blocking: Vec<i32> = self
            .registry
            .variables()
            .filter(|&var| assignment.is_true(var))
            .map(|var| -var)
            .collect();
        self.emitter.emit(&blocking)
    }

    pub fn statistics(&self, puzzle: &Puzzle) -> EncodingStatistics {
        EncodingStatistics {
            categories: puzzle.schema.category_count(),
            positions: puzzle.size(),
            registry_variables: self.registry.variable_count(),
            total_variables: self.allocator.issued(),
            total_clauses: self.emitter.clause_count(),
            structural_clauses: self.structural_clauses,
            clue_clauses: puzzle
                .clues
                .iter()
                .zip(&self.clue_clauses)
                .map(|(clue, count)| (clue.label(&puzzle.schema), *count))
                .collect(),
        }
    }
}

/// Result of a successful solve
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Decoded models, in the order the solver found them
    pub grids: Vec<SolutionGrid>,
    /// The search proved there are no further models
    pub exhausted: bool,
    pub statistics: EncodingStatistics,
    pub solve_time: Duration,
}

/// Drives encoding, solving and decoding for one puzzle
pub struct PuzzleEncoder {
    config: SolverConfig,
}

impl PuzzleEncoder {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    fn new_solver(&self) -> SatSolver {
        let mut solver = SatSolver::new();
        if self.config.timeout_seconds > 0 {
            solver.set_timeout(Duration::from_secs(self.config.timeout_seconds));
        }
        solver
    }

    /// Encode into an in-memory clause list without solving
    pub fn analyze(&self, puzzle: &Puzzle) -> Result<EncodingStatistics, EncodingError> {
        let encoded = EncodedPuzzle::encode(puzzle, Vec::<Clause>::new(), false)?;
        Ok(encoded.statistics(puzzle))
    }

    /// Encode, solve, and decode up to `max_solutions` distinct models
    pub fn solve(&self, puzzle: &Puzzle) -> Result<SolveReport, SolveError> {
        let start_time = Instant::now();
        let encoded = EncodedPuzzle::encode(puzzle, self.new_solver(), false)?;
        self.enumerate(puzzle, encoded, start_time)
    }

    /// Pull models out of an encoded puzzle, blocking each one found
    fn enumerate<S: Solve>(
        &self,
        puzzle: &Puzzle,
        mut encoded: EncodedPuzzle<S>,
        start_time: Instant,
    ) -> Result<SolveReport, SolveError> {
        let statistics = encoded.statistics(puzzle);

        let mut grids = Vec::new();
        let mut exhausted = false;

        while grids.len() < self.config.max_solutions {
            match encoded.emitter.sink_mut().solve() {
                SolveStatus::Satisfiable(assignment) => {
                    let grid = SolutionDecoder::new(&encoded.registry, &assignment).decode_all()?;
                    grids.push(grid);
                    encoded.block(&assignment)?;
                    log::debug!("model {} found, blocking clause added", grids.len());
                }
                SolveStatus::Unsatisfiable if grids.is_empty() => {
                    log::warn!("'{}' is unsatisfiable", puzzle.name);
                    let core = if self.config.explain_unsat {
                        self.explain_unsat(puzzle)?
                    } else {
                        Vec::new()
                    };
                    return Err(SolveError::Unsatisfiable {
                        clauses: statistics.total_clauses,
                        variables: statistics.total_variables,
                        core,
                    });
                }
                SolveStatus::Unsatisfiable => {
                    exhausted = true;
                    break;
                }
                SolveStatus::Unknown if grids.is_empty() => {
                    return Err(SolveError::Unknown { timeout_seconds: self.config.timeout_seconds });
                }
                SolveStatus::Unknown => break,
            }
        }

        let solve_time = start_time.elapsed();
        log::info!(
            "'{}': {} model(s) in {:.3}s{}",
            puzzle.name,
            grids.len(),
            solve_time.as_secs_f64(),
            if exhausted { ", search exhausted" } else { "" }
        );

        Ok(SolveReport { grids, exhausted, statistics, solve_time })
    }

    /// Labels of a minimal set of clues that cannot hold together
    pub fn explain_unsat(&self, puzzle: &Puzzle) -> Result<Vec<String>, SolveError> {
        let mut encoded = EncodedPuzzle::encode(puzzle, self.new_solver(), true)?;
        let selectors = encoded.selectors.clone();
        let solver = encoded.emitter.sink_mut();

        match solver.solve_with_assumptions(&selectors) {
            SolveStatus::Unsatisfiable => {}
            SolveStatus::Unknown => {
                return Err(SolveError::Unknown { timeout_seconds: self.config.timeout_seconds });
            }
            // Guarded clauses cannot be stricter than the plain encoding
            SolveStatus::Satisfiable(_) => return Ok(Vec::new()),
        }

        let mut core: Vec<usize> = (0..selectors.len()).filter(|&i| solver.failed(selectors[i])).collect();

        // Deletion pass: drop every clue the rest stays unsatisfiable without
        let mut i = 0;
        while i < core.len() {
            let trial: Vec<i32> = core
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, &clue)| selectors[clue])
                .collect();
            match solver.solve_with_assumptions(&trial) {
                SolveStatus::Unsatisfiable => {
                    core.remove(i);
                }
                _ => i += 1,
            }
        }

        log::info!("unsatisfiable core has {} clue(s)", core.len());
        Ok(core.into_iter().map(|i| puzzle.clues[i].label(&puzzle.schema)).collect())
    }
}

/// Statistics about the SAT encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingStatistics {
    pub categories: usize,
    pub positions: usize,
    pub registry_variables: usize,
    pub total_variables: usize,
    pub total_clauses: usize,
    pub structural_clauses: usize,
    pub clue_clauses: Vec<(String, usize)>,
}

impl std::fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Encoding Statistics:")?;
        writeln!(f, "  Categories: {}", self.categories)?;
        writeln!(f, "  Positions: {}", self.positions)?;
        writeln!(f, "  Registry variables: {}", self.registry_variables)?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Total clauses: {}", self.total_clauses)?;
        writeln!(f, "  Exclusivity clauses: {}", self.structural_clauses)?;
        for (label, count) in &self.clue_clauses {
            writeln!(f, "    {:>3}  {}", count, label)?;
        }
        Ok(())
    }
}
