//! Solution representation for logic grid puzzles

use crate::puzzle::{Puzzle, SolutionGrid};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// A decoded, validated solution with the encoding size that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub puzzle_name: String,
    /// One row per category, positions left to right
    pub rows: Vec<CategoryRow>,
    pub clauses: usize,
    pub variables: usize,
    /// `Some(true)` when the search proved no other model exists
    pub unique: Option<bool>,
    #[serde(skip)]
    pub solve_time: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category: String,
    pub values: Vec<String>,
}

impl Solution {
    pub fn new(
        puzzle: &Puzzle,
        grid: &SolutionGrid,
        clauses: usize,
        variables: usize,
        unique: Option<bool>,
        solve_time: Duration,
    ) -> Self {
        let schema = &puzzle.schema;
        let rows = schema
            .category_ids()
            .map(|id| CategoryRow {
                category: schema.category_name(id).to_string(),
                values: grid
                    .row(id)
                    .unwrap_or(&[])
                    .iter()
                    .map(|v| schema.label(*v).to_string())
                    .collect(),
            })
            .collect();

        Self {
            puzzle_name: puzzle.name.clone(),
            rows,
            clauses,
            variables,
            unique,
            solve_time,
        }
    }

    pub fn size(&self) -> usize {
        self.rows.first().map_or(0, |row| row.values.len())
    }

    /// Label of `category` at `position`
    pub fn value_at(&self, category: &str, position: usize) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.category == category)
            .and_then(|row| row.values.get(position))
            .map(String::as_str)
    }

    /// Position holding the value labelled `label`
    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.rows
            .iter()
            .find_map(|row| row.values.iter().position(|v| v == label))
    }

    /// Resolve labels back into a grid over `puzzle`'s schema.
    ///
    /// Rows are matched by category name so a saved file may list them in any order.
    pub fn grid_for(&self, puzzle: &Puzzle) -> Result<SolutionGrid> {
        let schema = &puzzle.schema;
        let mut rows = Vec::with_capacity(schema.category_count());

        for id in schema.category_ids() {
            let name = schema.category_name(id);
            let row = self
                .rows
                .iter()
                .find(|row| row.category == name)
                .with_context(|| format!("Solution has no row for category '{}'", name))?;

            let values = row
                .values
                .iter()
                .map(|label| {
                    schema
                        .resolve(label)
                        .filter(|v| v.category == id)
                        .with_context(|| format!("'{}' is not a value of category '{}'", label, name))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(values);
        }

        Ok(SolutionGrid::new(schema.size(), rows))
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write solution file: {}", path.display()))?;
        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read solution file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse solution file: {}", path.display()))
    }
}
