//! Variable allocation and the value/position registry

use super::constraints::{encode_exactly_one, ClauseEmitter, ClauseSink};
use crate::error::EncodingError;
use crate::puzzle::{CategoryId, PuzzleSchema, ValueId};

/// Issues fresh SAT variable ids, starting at 1
#[derive(Debug, Clone)]
pub struct LiteralAllocator {
    next_id: i32,
}

impl LiteralAllocator {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Return a variable id never returned before by this allocator
    pub fn next_variable(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Number of ids issued so far; also the highest id issued
    pub fn issued(&self) -> usize {
        (self.next_id - 1) as usize
    }
}

impl Default for LiteralAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable population phase of the registry.
///
/// Each category is registered exactly once; [`RegistryBuilder::finish`]
/// then freezes the mapping into a read-only [`VariableRegistry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    schema: PuzzleSchema,
    allocator: LiteralAllocator,
    /// `entries[category][value][position]`
    entries: Vec<Option<Vec<Vec<i32>>>>,
}

impl RegistryBuilder {
    pub fn new(schema: PuzzleSchema, allocator: LiteralAllocator) -> Self {
        let entries = vec![None; schema.category_count()];
        Self { schema, allocator, entries }
    }

    /// Allocate N variables per value of `category` and require each value
    /// to occupy exactly one position
    pub fn register<S: ClauseSink>(
        &mut self,
        category: CategoryId,
        emitter: &mut ClauseEmitter<S>,
    ) -> Result<(), EncodingError> {
        let name = self.schema.category_name(category).to_string();
        let found = self
            .schema
            .category(category)
            .map(|c| c.values.len())
            .ok_or_else(|| EncodingError::UnregisteredCategory(name.clone()))?;

        let size = self.schema.size();
        if found != size {
            return Err(EncodingError::CategorySizeMismatch { category: name, found, expected: size });
        }
        if self.entries[category.0].is_some() {
            return Err(EncodingError::CategoryAlreadyRegistered(name));
        }

        let mut values = Vec::with_capacity(size);
        for _ in 0..size {
            let literals: Vec<i32> = (0..size).map(|_| self.allocator.next_variable()).collect();
            encode_exactly_one(emitter, &literals)?;
            values.push(literals);
        }

        log::debug!(
            "registered category '{}' with {} variables (ids up to {})",
            name,
            size * size,
            self.allocator.issued()
        );
        self.entries[category.0] = Some(values);
        Ok(())
    }

    /// Register every category of the schema in declaration order
    pub fn register_all<S: ClauseSink>(&mut self, emitter: &mut ClauseEmitter<S>) -> Result<(), EncodingError> {
        let ids: Vec<CategoryId> = self.schema.category_ids().collect();
        for id in ids {
            self.register(id, emitter)?;
        }
        Ok(())
    }

    pub fn is_registered(&self, category: CategoryId) -> bool {
        matches!(self.entries.get(category.0), Some(Some(_)))
    }

    /// Require exactly one value per (category, position), then freeze.
    ///
    /// Hands the allocator back so later encoders can keep issuing ids.
    pub fn finish<S: ClauseSink>(
        self,
        emitter: &mut ClauseEmitter<S>,
    ) -> Result<(VariableRegistry, LiteralAllocator), EncodingError> {
        let size = self.schema.size();
        let mut entries = Vec::with_capacity(self.entries.len());

        for (ci, entry) in self.entries.into_iter().enumerate() {
            let values = entry.ok_or_else(|| {
                EncodingError::UnregisteredCategory(self.schema.category_name(CategoryId(ci)).to_string())
            })?;
            for position in 0..size {
                let column: Vec<i32> = values.iter().map(|literals| literals[position]).collect();
                encode_exactly_one(emitter, &column)?;
            }
            entries.push(values);
        }

        let registry = VariableRegistry { schema: self.schema, entries };
        Ok((registry, self.allocator))
    }
}

/// Read-only mapping from (value, position) to SAT variable
#[derive(Debug, Clone)]
pub struct VariableRegistry {
    schema: PuzzleSchema,
    entries: Vec<Vec<Vec<i32>>>,
}

impl VariableRegistry {
    /// Register all categories of `schema` with a fresh allocator
    pub fn build<S: ClauseSink>(
        schema: PuzzleSchema,
        emitter: &mut ClauseEmitter<S>,
    ) -> Result<(Self, LiteralAllocator), EncodingError> {
        let mut builder = RegistryBuilder::new(schema, LiteralAllocator::new());
        builder.register_all(emitter)?;
        builder.finish(emitter)
    }

    pub fn schema(&self) -> &PuzzleSchema {
        &self.schema
    }

    pub fn size(&self) -> usize {
        self.schema.size()
    }

    /// Variable meaning "`value` occupies `position`"
    pub fn lookup(&self, value: ValueId, position: usize) -> Result<i32, EncodingError> {
        let literals = self.literals(value)?;
        literals
            .get(position)
            .copied()
            .ok_or(EncodingError::PositionOutOfRange { position, size: self.size() })
    }

    /// The N variables of a value in position order
    pub fn literals(&self, value: ValueId) -> Result<&[i32], EncodingError> {
        let category = self.entries.get(value.category.0).ok_or_else(|| {
            EncodingError::UnregisteredCategory(self.schema.category_name(value.category).to_string())
        })?;
        category
            .get(value.index)
            .map(Vec::as_slice)
            .ok_or_else(|| EncodingError::UnknownValue {
                category: self.schema.category_name(value.category).to_string(),
                index: value.index,
            })
    }

    /// Every registry variable, in allocation order
    pub fn variables(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().flatten().flatten().copied()
    }

    pub fn variable_count(&self) -> usize {
        self.entries.iter().map(|c| c.len() * self.size()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::{canonical_puzzle, Category};
    use crate::sat::constraints::Clause;
    use std::collections::HashSet;

    fn schema(size: usize, categories: usize) -> PuzzleSchema {
        let cats = (0..categories)
            .map(|c| Category {
                name: format!("c{}", c),
                values: (0..size).map(|v| format!("c{}v{}", c, v)).collect(),
            })
            .collect();
        PuzzleSchema::new(cats).unwrap()
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let mut allocator = LiteralAllocator::new();
        assert_eq!(allocator.issued(), 0);

        let ids: Vec<i32> = (0..10).map(|_| allocator.next_variable()).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
        assert_eq!(allocator.issued(), 10);
    }

    #[test]
    fn test_registry_ids_are_distinct() {
        let puzzle = canonical_puzzle();
        let mut emitter = ClauseEmitter::new(Vec::<Clause>::new());
        let (registry, allocator) = VariableRegistry::build(puzzle.schema.clone(), &mut emitter).unwrap();

        let mut seen = HashSet::new();
        for category in puzzle.schema.category_ids() {
            for value in puzzle.schema.values_of(category) {
                for position in 0..5 {
                    let var = registry.lookup(value, position).unwrap();
                    assert!(var > 0);
                    assert!(seen.insert(var));
                }
            }
        }

        assert_eq!(seen.len(), 5 * 25);
        assert_eq!(registry.variable_count(), 125);
        assert_eq!(allocator.issued(), 125);
    }

    #[test]
    fn test_register_allocates_n_squared() {
        let schema = schema(4, 2);
        let mut emitter = ClauseEmitter::new(Vec::<Clause>::new());
        let mut builder = RegistryBuilder::new(schema, LiteralAllocator::new());

        builder.register(CategoryId(0), &mut emitter).unwrap();
        assert_eq!(builder.allocator.issued(), 16);
        // 4 values, each C(4,2) pairs plus one at-least-one clause
        assert_eq!(emitter.clause_count(), 4 * (6 + 1));
        assert!(builder.is_registered(CategoryId(0)));
        assert!(!builder.is_registered(CategoryId(1)));
    }

    #[test]
    fn test_double_registration_is_detected() {
        let schema = schema(3, 1);
        let mut emitter = ClauseEmitter::new(Vec::<Clause>::new());
        let mut builder = RegistryBuilder::new(schema, LiteralAllocator::new());

        builder.register(CategoryId(0), &mut emitter).unwrap();
        let clauses_before = emitter.clause_count();

        let err = builder.register(CategoryId(0), &mut emitter).unwrap_err();
        assert_eq!(err, EncodingError::CategoryAlreadyRegistered("c0".to_string()));
        assert_eq!(builder.allocator.issued(), 9);
        assert_eq!(emitter.clause_count(), clauses_before);
    }

    #[test]
    fn test_finish_requires_all_categories() {
        let schema = schema(2, 2);
        let mut emitter = ClauseEmitter::new(Vec::<Clause>::new());
        let mut builder = RegistryBuilder::new(schema, LiteralAllocator::new());
        builder.register(CategoryId(0), &mut emitter).unwrap();

        let err = builder.finish(&mut emitter).unwrap_err();
        assert_eq!(err, EncodingError::UnregisteredCategory("c1".to_string()));
    }

    #[test]
    fn test_finish_adds_position_exclusivity() {
        let schema = schema(3, 2);
        let mut emitter = ClauseEmitter::new(Vec::<Clause>::new());
        let mut builder = RegistryBuilder::new(schema, LiteralAllocator::new());
        builder.register_all(&mut emitter).unwrap();
        let after_register = emitter.clause_count();

        let (registry, _) = builder.finish(&mut emitter).unwrap();
        // 2 categories x 3 positions, each C(3,2) + 1 clauses
        assert_eq!(emitter.clause_count() - after_register, 2 * 3 * 4);

        let v0 = ValueId::new(CategoryId(0), 0);
        let v1 = ValueId::new(CategoryId(0), 1);
        let a = registry.lookup(v0, 2).unwrap();
        let b = registry.lookup(v1, 2).unwrap();
        assert!(emitter.sink().iter().any(|c| c.literals == vec![-a, -b]));
    }

    #[test]
    fn test_lookup_bounds() {
        let schema = schema(2, 1);
        let mut emitter = ClauseEmitter::new(Vec::<Clause>::new());
        let (registry, _) = VariableRegistry::build(schema, &mut emitter).unwrap();

        assert!(registry.lookup(ValueId::new(CategoryId(0), 1), 1).is_ok());
        assert_eq!(
            registry.lookup(ValueId::new(CategoryId(0), 0), 2),
            Err(EncodingError::PositionOutOfRange { position: 2, size: 2 })
        );
        assert!(matches!(
            registry.lookup(ValueId::new(CategoryId(0), 5), 0),
            Err(EncodingError::UnknownValue { index: 5, .. })
        ));
        assert!(matches!(
            registry.lookup(ValueId::new(CategoryId(3), 0), 0),
            Err(EncodingError::UnregisteredCategory(_))
        ));
    }
}
