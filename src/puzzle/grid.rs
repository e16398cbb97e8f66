//! Decoded solution grid: one ordered row of values per category

use super::model::{CategoryId, PuzzleSchema, ValueId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placement of every value, row per category, column per position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionGrid {
    pub size: usize,
    /// `rows[c][p]` is the value of category `c` at position `p`
    pub rows: Vec<Vec<ValueId>>,
}

impl SolutionGrid {
    pub fn new(size: usize, rows: Vec<Vec<ValueId>>) -> Self {
        Self { size, rows }
    }

    pub fn row(&self, category: CategoryId) -> Option<&[ValueId]> {
        self.rows.get(category.0).map(Vec::as_slice)
    }

    pub fn value_at(&self, category: CategoryId, position: usize) -> Option<ValueId> {
        self.rows.get(category.0).and_then(|row| row.get(position)).copied()
    }

    /// Position of a value, or `None` if the value is absent from its row
    pub fn position_of(&self, value: ValueId) -> Option<usize> {
        self.rows
            .get(value.category.0)
            .and_then(|row| row.iter().position(|v| *v == value))
    }

    /// Labels laid out by category name, for serialisation and display
    pub fn labelled(&self, schema: &PuzzleSchema) -> BTreeMap<String, Vec<String>> {
        schema
            .category_ids()
            .filter_map(|id| {
                let row = self.row(id)?;
                let labels = row.iter().map(|v| schema.label(*v).to_string()).collect();
                Some((schema.category_name(id).to_string(), labels))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::model::Category;

    #[test]
    fn test_lookup_helpers() {
        let schema = PuzzleSchema::new(vec![
            Category::new("color", &["Red", "Blue"]),
            Category::new("pet", &["Cat", "Dog"]),
        ])
        .unwrap();
        let red = schema.resolve("Red").unwrap();
        let blue = schema.resolve("Blue").unwrap();
        let cat = schema.resolve("Cat").unwrap();
        let dog = schema.resolve("Dog").unwrap();

        let grid = SolutionGrid::new(2, vec![vec![blue, red], vec![cat, dog]]);
        assert_eq!(grid.position_of(red), Some(1));
        assert_eq!(grid.value_at(CategoryId(1), 0), Some(cat));
        assert_eq!(grid.value_at(CategoryId(1), 2), None);

        let labelled = grid.labelled(&schema);
        assert_eq!(labelled["color"], vec!["Blue", "Red"]);
    }
}
