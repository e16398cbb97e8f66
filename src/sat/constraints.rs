//! Clause emission and the constraint encoders
//!
//! Every encoder reads literals from a frozen [`VariableRegistry`] and pushes
//! clauses through a [`ClauseEmitter`]. Encoders never touch the registry
//! mapping itself.

use super::VariableRegistry;
use crate::error::EncodingError;
use crate::puzzle::{Constraint, ValueId};
use itertools::Itertools;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }
}

/// Consumer of finished clauses, usually the SAT solver
pub trait ClauseSink {
    fn add_clause(&mut self, literals: &[i32]);
}

impl ClauseSink for Vec<Clause> {
    fn add_clause(&mut self, literals: &[i32]) {
        self.push(Clause::new(literals.to_vec()));
    }
}

/// Counts clauses and forwards them to a [`ClauseSink`].
///
/// Clauses can be handed over whole with [`ClauseEmitter::emit`] or built one
/// literal at a time with [`ClauseEmitter::emit_literal`], where 0 closes the
/// clause. Nothing emitted is ever retracted.
#[derive(Debug)]
pub struct ClauseEmitter<S: ClauseSink> {
    sink: S,
    pending: Vec<i32>,
    clause_count: usize,
    highest_variable: i32,
    guard: Option<i32>,
}

impl<S: ClauseSink> ClauseEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            pending: Vec::new(),
            clause_count: 0,
            highest_variable: 0,
            guard: None,
        }
    }

    /// Emit a complete clause
    pub fn emit(&mut self, literals: &[i32]) -> Result<(), EncodingError> {
        if literals.is_empty() {
            return Err(EncodingError::EmptyClause);
        }
        if literals.contains(&0) {
            return Err(EncodingError::ZeroLiteral);
        }

        match self.guard {
            Some(selector) => {
                let mut guarded = Vec::with_capacity(literals.len() + 1);
                guarded.extend_from_slice(literals);
                guarded.push(-selector);
                self.forward(&guarded);
            }
            None => self.forward(literals),
        }
        Ok(())
    }

    /// Append one literal to the clause under construction; 0 terminates it
    pub fn emit_literal(&mut self, literal: i32) -> Result<(), EncodingError> {
        if literal != 0 {
            self.pending.push(literal);
            return Ok(());
        }

        let clause = std::mem::take(&mut self.pending);
        self.emit(&clause)
    }

    /// Fail if a clause was started with [`ClauseEmitter::emit_literal`] but never closed
    pub fn ensure_flushed(&self) -> Result<(), EncodingError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(EncodingError::UnterminatedClause(self.pending.len()))
        }
    }

    /// Append `-selector` to every following clause, making them conditional
    /// on `selector` being assumed true
    pub fn set_guard(&mut self, selector: Option<i32>) {
        self.guard = selector;
    }

    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Highest variable id seen in an emitted clause
    pub fn variable_count(&self) -> usize {
        self.highest_variable as usize
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn forward(&mut self, literals: &[i32]) {
        for &literal in literals {
            self.highest_variable = self.highest_variable.max(literal.abs());
        }
        self.sink.add_clause(literals);
        self.clause_count += 1;
    }
}

/// Forbid any two of `vars` from being true together
pub fn encode_at_most_one<S: ClauseSink>(
    emitter: &mut ClauseEmitter<S>,
    vars: &[i32],
) -> Result<(), EncodingError> {
    for (&a, &b) in vars.iter().tuple_combinations() {
        emitter.emit(&[-a, -b])?;
    }
    Ok(())
}

/// Pairwise at-most-one plus a single at-least-one clause
pub fn encode_exactly_one<S: ClauseSink>(
    emitter: &mut ClauseEmitter<S>,
    vars: &[i32],
) -> Result<(), EncodingError> {
    encode_at_most_one(emitter, vars)?;
    emitter.emit(vars)
}

/// lit1 <=> lit2
pub fn encode_double_implication<S: ClauseSink>(
    emitter: &mut ClauseEmitter<S>,
    lit1: i32,
    lit2: i32,
) -> Result<(), EncodingError> {
    emitter.emit(&[lit1, -lit2])?;
    emitter.emit(&[-lit1, lit2])
}

/// `a` and `b` always share a position
pub fn encode_linked<S: ClauseSink>(
    registry: &VariableRegistry,
    emitter: &mut ClauseEmitter<S>,
    a: ValueId,
    b: ValueId,
) -> Result<(), EncodingError> {
    for position in 0..registry.size() {
        let lit1 = registry.lookup(a, position)?;
        let lit2 = registry.lookup(b, position)?;
        encode_double_implication(emitter, lit1, lit2)?;
    }
    Ok(())
}

/// `a` sits immediately left of `b`.
///
/// The chain of biconditionals alone still admits `a` last with `b` first,
/// so `a` is also barred from the last position.
pub fn encode_left_of<S: ClauseSink>(
    registry: &VariableRegistry,
    emitter: &mut ClauseEmitter<S>,
    a: ValueId,
    b: ValueId,
) -> Result<(), EncodingError> {
    let size = registry.size();
    if size < 2 {
        return Err(EncodingError::PositionOutOfRange { position: 1, size });
    }

    for position in 0..size - 1 {
        let lit1 = registry.lookup(a, position)?;
        let lit2 = registry.lookup(b, position + 1)?;
        encode_double_implication(emitter, lit1, lit2)?;
    }
    emitter.emit(&[-registry.lookup(a, size - 1)?])
}

/// Pin `value` to `position` with a unit clause
pub fn encode_forced_position<S: ClauseSink>(
    registry: &VariableRegistry,
    emitter: &mut ClauseEmitter<S>,
    value: ValueId,
    position: usize,
) -> Result<(), EncodingError> {
    let lit = registry.lookup(value, position)?;
    emitter.emit_literal(lit)?;
    emitter.emit_literal(0)
}

/// `a` at `position_a` forces `b` at `position_b`
pub fn encode_implication<S: ClauseSink>(
    registry: &VariableRegistry,
    emitter: &mut ClauseEmitter<S>,
    a: ValueId,
    position_a: usize,
    b: ValueId,
    position_b: usize,
) -> Result<(), EncodingError> {
    let lit1 = registry.lookup(a, position_a)?;
    let lit2 = registry.lookup(b, position_b)?;
    emitter.emit(&[-lit1, lit2])
}

/// `a` at an interior `position` puts `b` on one of its two neighbours,
/// and `b` on both neighbours puts `a` at `position`
pub fn encode_between<S: ClauseSink>(
    registry: &VariableRegistry,
    emitter: &mut ClauseEmitter<S>,
    a: ValueId,
    b: ValueId,
    position: usize,
) -> Result<(), EncodingError> {
    let size = registry.size();
    if position == 0 || position + 1 >= size {
        return Err(EncodingError::NotInteriorPosition { position, size });
    }

    let lit1 = registry.lookup(a, position)?;
    let left = registry.lookup(b, position - 1)?;
    let right = registry.lookup(b, position + 1)?;

    emitter.emit(&[-left, lit1, -right])?;
    emitter.emit(&[left, -lit1, right])
}

/// `a` and `b` on adjacent positions, in either order.
///
/// Boundary positions have a single neighbour and get a plain implication;
/// interior positions go through [`encode_between`].
pub fn encode_next_to<S: ClauseSink>(
    registry: &VariableRegistry,
    emitter: &mut ClauseEmitter<S>,
    a: ValueId,
    b: ValueId,
) -> Result<(), EncodingError> {
    let size = registry.size();
    if size < 2 {
        return Err(EncodingError::PositionOutOfRange { position: 1, size });
    }

    encode_implication(registry, emitter, a, 0, b, 1)?;
    for position in 1..size - 1 {
        encode_between(registry, emitter, a, b, position)?;
    }
    encode_implication(registry, emitter, a, size - 1, b, size - 2)
}

/// Dispatch one constraint to its encoder
pub fn encode_constraint<S: ClauseSink>(
    registry: &VariableRegistry,
    emitter: &mut ClauseEmitter<S>,
    constraint: &Constraint,
) -> Result<(), EncodingError> {
    match *constraint {
        Constraint::Linked(a, b) => encode_linked(registry, emitter, a, b),
        Constraint::LeftOf(a, b) => encode_left_of(registry, emitter, a, b),
        Constraint::ForcedPosition(value, position) => encode_forced_position(registry, emitter, value, position),
        Constraint::Implication { a, position_a, b, position_b } => {
            encode_implication(registry, emitter, a, position_a, b, position_b)
        }
        Constraint::Between { a, b, position } => encode_between(registry, emitter, a, b, position),
        Constraint::NextTo(a, b) => encode_next_to(registry, emitter, a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{Category, CategoryId, PuzzleSchema};

    /// All models over variables 1..=n
    fn models(n: usize) -> impl Iterator<Item = Vec<bool>> {
        (0..1u32 << n).map(move |bits| (0..n).map(|i| bits & (1 << i) != 0).collect())
    }

    fn holds(clauses: &[Clause], model: &[bool]) -> bool {
        let value = |lit: i32| {
            let v = model[(lit.unsigned_abs() - 1) as usize];
            if lit > 0 { v } else { !v }
        };
        clauses.iter().all(|c| c.literals.iter().any(|&lit| value(lit)))
    }

    fn collecting() -> ClauseEmitter<Vec<Clause>> {
        ClauseEmitter::new(Vec::new())
    }

    /// Two categories of `size` values with a registry built over them
    fn registry(size: usize) -> (VariableRegistry, ClauseEmitter<Vec<Clause>>) {
        let schema = PuzzleSchema::new(vec![
            Category {
                name: "a".to_string(),
                values: (0..size).map(|i| format!("a{}", i)).collect(),
            },
            Category {
                name: "b".to_string(),
                values: (0..size).map(|i| format!("b{}", i)).collect(),
            },
        ])
        .unwrap();
        let mut emitter = collecting();
        let (registry, _) = VariableRegistry::build(schema, &mut emitter).unwrap();
        (registry, emitter)
    }

    /// Positions of `a` and `b` in every model of the emitted clauses
    fn placements(
        registry: &VariableRegistry,
        clauses: &[Clause],
        a: ValueId,
        b: ValueId,
    ) -> Vec<(usize, usize)> {
        let n = registry.variable_count();
        let mut found = Vec::new();
        for model in models(n).filter(|m| holds(clauses, m)) {
            let pos = |v: ValueId| {
                (0..registry.size())
                    .find(|&p| model[(registry.lookup(v, p).unwrap() - 1) as usize])
                    .unwrap()
            };
            found.push((pos(a), pos(b)));
        }
        found.sort();
        found.dedup();
        found
    }

    #[test]
    fn test_emitter_counts() {
        let mut emitter = collecting();
        emitter.emit(&[1, -7]).unwrap();
        emitter.emit(&[3]).unwrap();

        assert_eq!(emitter.clause_count(), 2);
        assert_eq!(emitter.variable_count(), 7);
        assert_eq!(emitter.sink()[0], Clause::new(vec![1, -7]));
    }

    #[test]
    fn test_emitter_rejects_malformed_clauses() {
        let mut emitter = collecting();
        assert_eq!(emitter.emit(&[]), Err(EncodingError::EmptyClause));
        assert_eq!(emitter.emit(&[1, 0, 2]), Err(EncodingError::ZeroLiteral));
        assert_eq!(emitter.emit_literal(0), Err(EncodingError::EmptyClause));
        assert_eq!(emitter.clause_count(), 0);
    }

    #[test]
    fn test_emit_literal_stream() {
        let mut emitter = collecting();
        for lit in [4, -2, 0, 1, 0] {
            emitter.emit_literal(lit).unwrap();
        }
        assert_eq!(emitter.clause_count(), 2);
        assert_eq!(emitter.sink(), &vec![Clause::new(vec![4, -2]), Clause::new(vec![1])]);
        assert!(emitter.ensure_flushed().is_ok());

        emitter.emit_literal(9).unwrap();
        assert_eq!(emitter.ensure_flushed(), Err(EncodingError::UnterminatedClause(1)));
    }

    #[test]
    fn test_guard_is_appended() {
        let mut emitter = collecting();
        emitter.set_guard(Some(10));
        emitter.emit(&[1, 2]).unwrap();
        emitter.set_guard(None);
        emitter.emit(&[3]).unwrap();

        assert_eq!(emitter.sink()[0].literals, vec![1, 2, -10]);
        assert_eq!(emitter.sink()[1].literals, vec![3]);
        assert_eq!(emitter.variable_count(), 10);
    }

    #[test]
    fn test_at_most_one() {
        for k in 1..=5 {
            let vars: Vec<i32> = (1..=k).collect();
            let mut emitter = collecting();
            encode_at_most_one(&mut emitter, &vars).unwrap();

            let k = k as usize;
            assert_eq!(emitter.clause_count(), k * (k - 1) / 2);

            let clauses = emitter.into_sink();
            for model in models(k) {
                let trues = model.iter().filter(|v| **v).count();
                assert_eq!(holds(&clauses, &model), trues <= 1);
            }
        }
    }

    #[test]
    fn test_exactly_one() {
        let vars = [1, 2, 3, 4];
        let mut emitter = collecting();
        encode_exactly_one(&mut emitter, &vars).unwrap();
        assert_eq!(emitter.clause_count(), 6 + 1);

        let clauses = emitter.into_sink();
        assert_eq!(clauses.last().unwrap().literals, vec![1, 2, 3, 4]);
        for model in models(4) {
            let trues = model.iter().filter(|v| **v).count();
            assert_eq!(holds(&clauses, &model), trues == 1);
        }
    }

    #[test]
    fn test_double_implication() {
        let mut emitter = collecting();
        encode_double_implication(&mut emitter, 1, -2).unwrap();
        let clauses = emitter.into_sink();

        for model in models(2) {
            let lit1 = model[0];
            let lit2 = !model[1];
            assert_eq!(holds(&clauses, &model), lit1 == lit2);
        }
    }

    #[test]
    fn test_linked_values_share_position() {
        let (registry, mut emitter) = registry(3);
        let a = ValueId::new(CategoryId(0), 0);
        let b = ValueId::new(CategoryId(1), 2);
        encode_linked(&registry, &mut emitter, a, b).unwrap();

        let found = placements(&registry, emitter.sink(), a, b);
        assert_eq!(found, vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_left_of() {
        let (registry, mut emitter) = registry(3);
        let a = ValueId::new(CategoryId(0), 1);
        let b = ValueId::new(CategoryId(1), 0);
        let before = emitter.clause_count();
        encode_left_of(&registry, &mut emitter, a, b).unwrap();
        assert_eq!(emitter.clause_count() - before, 2 * 2 + 1);

        let found = placements(&registry, emitter.sink(), a, b);
        assert_eq!(found, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_forced_position() {
        let (registry, mut emitter) = registry(3);
        let v = ValueId::new(CategoryId(0), 2);
        let w = ValueId::new(CategoryId(1), 0);
        encode_forced_position(&registry, &mut emitter, v, 1).unwrap();

        let lit = registry.lookup(v, 1).unwrap();
        assert_eq!(emitter.sink().last(), Some(&Clause::new(vec![lit])));

        let found = placements(&registry, emitter.sink(), v, w);
        assert!(!found.is_empty());
        assert!(found.iter().all(|(pv, _)| *pv == 1));
    }

    #[test]
    fn test_forced_position_out_of_range() {
        let (registry, mut emitter) = registry(3);
        let before = emitter.clause_count();
        let err = encode_forced_position(&registry, &mut emitter, ValueId::new(CategoryId(0), 0), 3);
        assert_eq!(err, Err(EncodingError::PositionOutOfRange { position: 3, size: 3 }));
        assert_eq!(emitter.clause_count(), before);
    }

    #[test]
    fn test_implication() {
        let (registry, mut emitter) = registry(3);
        let a = ValueId::new(CategoryId(0), 0);
        let b = ValueId::new(CategoryId(1), 0);
        encode_implication(&registry, &mut emitter, a, 0, b, 2).unwrap();

        let found = placements(&registry, emitter.sink(), a, b);
        assert!(found.contains(&(0, 2)));
        assert!(!found.contains(&(0, 0)));
        assert!(!found.contains(&(0, 1)));
        assert!(found.contains(&(1, 0)));
    }

    #[test]
    fn test_between_requires_interior() {
        let (registry, mut emitter) = registry(3);
        let a = ValueId::new(CategoryId(0), 0);
        let b = ValueId::new(CategoryId(1), 0);

        assert_eq!(
            encode_between(&registry, &mut emitter, a, b, 0),
            Err(EncodingError::NotInteriorPosition { position: 0, size: 3 })
        );
        assert_eq!(
            encode_between(&registry, &mut emitter, a, b, 2),
            Err(EncodingError::NotInteriorPosition { position: 2, size: 3 })
        );

        let before = emitter.clause_count();
        encode_between(&registry, &mut emitter, a, b, 1).unwrap();
        assert_eq!(emitter.clause_count() - before, 2);
    }

    #[test]
    fn test_between_at_interior() {
        let (registry, mut emitter) = registry(3);
        let a = ValueId::new(CategoryId(0), 0);
        let b = ValueId::new(CategoryId(1), 0);
        encode_between(&registry, &mut emitter, a, b, 1).unwrap();

        let found = placements(&registry, emitter.sink(), a, b);
        assert!(!found.contains(&(1, 1)));
        assert!(found.contains(&(1, 0)));
        assert!(found.contains(&(1, 2)));
    }

    #[test]
    fn test_next_to_positions_differ_by_one() {
        for size in 2..=3 {
            let (registry, mut emitter) = registry(size);
            let a = ValueId::new(CategoryId(0), 0);
            let b = ValueId::new(CategoryId(1), 1);
            encode_next_to(&registry, &mut emitter, a, b).unwrap();

            let found = placements(&registry, emitter.sink(), a, b);
            let mut expected: Vec<(usize, usize)> = (0..size)
                .flat_map(|p| [(p, p.wrapping_sub(1)), (p, p + 1)])
                .filter(|(_, q)| *q < size)
                .collect();
            expected.sort();
            assert_eq!(found, expected, "size {}", size);
        }
    }

    #[test]
    fn test_next_to_clause_count() {
        let (registry, mut emitter) = registry(5);
        let before = emitter.clause_count();
        encode_next_to(
            &registry,
            &mut emitter,
            ValueId::new(CategoryId(0), 0),
            ValueId::new(CategoryId(1), 0),
        )
        .unwrap();
        // two boundary implications plus two clauses per interior position
        assert_eq!(emitter.clause_count() - before, 2 + 2 * 3);
    }

    #[test]
    fn test_encode_constraint_dispatch() {
        let (registry, mut emitter) = registry(3);
        let a = ValueId::new(CategoryId(0), 0);
        let b = ValueId::new(CategoryId(1), 0);

        let before = emitter.clause_count();
        encode_constraint(&registry, &mut emitter, &Constraint::Linked(a, b)).unwrap();
        assert_eq!(emitter.clause_count() - before, 6);

        let before = emitter.clause_count();
        encode_constraint(&registry, &mut emitter, &Constraint::ForcedPosition(a, 0)).unwrap();
        assert_eq!(emitter.clause_count() - before, 1);
    }
}
