//! Turning a satisfying assignment back into placements

use super::VariableRegistry;
use crate::error::{DecodeError, EncodingError, SolveError};
use crate::puzzle::{CategoryId, SolutionGrid, ValueId};
use std::collections::HashMap;

/// Truth values reported by the solver, keyed by variable id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    values: HashMap<i32, bool>,
}

impl Assignment {
    pub fn new(values: HashMap<i32, bool>) -> Self {
        Self { values }
    }

    /// Build an assignment where exactly the given variables are true
    /// and every other variable up to `variable_count` is false
    pub fn from_true_variables<I: IntoIterator<Item = i32>>(variable_count: usize, trues: I) -> Self {
        let mut values: HashMap<i32, bool> = (1..=variable_count as i32).map(|v| (v, false)).collect();
        for var in trues {
            values.insert(var, true);
        }
        Self { values }
    }

    /// Whether a signed literal holds; unknown variables count as false
    pub fn is_true(&self, literal: i32) -> bool {
        let value = self.values.get(&literal.abs()).copied().unwrap_or(false);
        if literal > 0 {
            value
        } else {
            !value
        }
    }

    pub fn get(&self, var: i32) -> Option<bool> {
        self.values.get(&var).copied()
    }

    pub fn set(&mut self, var: i32, value: bool) {
        self.values.insert(var, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Reads placements out of an assignment through the registry
pub struct SolutionDecoder<'a> {
    registry: &'a VariableRegistry,
    assignment: &'a Assignment,
}

impl<'a> SolutionDecoder<'a> {
    pub fn new(registry: &'a VariableRegistry, assignment: &'a Assignment) -> Self {
        Self { registry, assignment }
    }

    /// Ordered values of one category; index `i` holds the value at position `i`.
    ///
    /// Any value that is unplaced, placed twice, or sharing a position with
    /// another value is reported instead of guessed around.
    pub fn decode(&self, category: CategoryId) -> Result<Vec<ValueId>, SolveError> {
        let schema = self.registry.schema();
        let size = self.registry.size();
        let mut row: Vec<Option<ValueId>> = vec![None; size];

        if schema.category(category).is_none() {
            return Err(EncodingError::UnregisteredCategory(schema.category_name(category).to_string()).into());
        }

        for value in schema.values_of(category) {
            let literals = self.registry.literals(value)?;
            let positions: Vec<usize> = literals
                .iter()
                .enumerate()
                .filter(|(_, &lit)| self.assignment.is_true(lit))
                .map(|(p, _)| p)
                .collect();

            let position = match positions.as_slice() {
                [] => {
                    return Err(DecodeError::ValueUnplaced { value: schema.label(value).to_string() }.into());
                }
                [position] => *position,
                _ => {
                    return Err(DecodeError::ValueInMultiplePositions {
                        value: schema.label(value).to_string(),
                        positions,
                    }
                    .into());
                }
            };

            if let Some(previous) = row[position] {
                return Err(DecodeError::PositionConflict {
                    category: schema.category_name(category).to_string(),
                    position,
                    first: schema.label(previous).to_string(),
                    second: schema.label(value).to_string(),
                }
                .into());
            }
            row[position] = Some(value);
        }

        // N values on N distinct positions fill the row
        Ok(row.into_iter().flatten().collect())
    }

    /// Decode every category into a grid
    pub fn decode_all(&self) -> Result<SolutionGrid, SolveError> {
        let rows = self
            .registry
            .schema()
            .category_ids()
            .map(|id| self.decode(id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SolutionGrid::new(self.registry.size(), rows))
    }
}
