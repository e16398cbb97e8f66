//! Typed puzzle model: categories, values and resolved clues

use crate::error::PuzzleError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Index of a category inside a [`PuzzleSchema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub usize);

/// A value of one category, identified by its category and its index in that category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId {
    pub category: CategoryId,
    pub index: usize,
}

impl ValueId {
    pub fn new(category: CategoryId, index: usize) -> Self {
        Self { category, index }
    }
}

/// A named group of mutually exclusive values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub values: Vec<String>,
}

impl Category {
    pub fn new<S: Into<String>>(name: S, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// The immutable shape of a puzzle: its categories and the number of positions.
///
/// Every category holds exactly `size` values and value labels are unique
/// across the whole puzzle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleSchema {
    categories: Vec<Category>,
    size: usize,
    labels: HashMap<String, ValueId>,
}

impl PuzzleSchema {
    /// Build and validate a schema
    pub fn new(categories: Vec<Category>) -> Result<Self, PuzzleError> {
        let size = categories
            .first()
            .map(|c| c.values.len())
            .ok_or(PuzzleError::NoCategories)?;

        let mut names = HashSet::new();
        let mut labels = HashMap::new();

        for (ci, category) in categories.iter().enumerate() {
            if category.values.len() != size || size == 0 {
                return Err(PuzzleError::CategorySize {
                    category: category.name.clone(),
                    found: category.values.len(),
                    expected: size,
                });
            }
            if !names.insert(category.name.as_str()) {
                return Err(PuzzleError::DuplicateCategory(category.name.clone()));
            }
            for (vi, label) in category.values.iter().enumerate() {
                if labels.insert(label.clone(), ValueId::new(CategoryId(ci), vi)).is_some() {
                    return Err(PuzzleError::DuplicateValue(label.clone()));
                }
            }
        }

        Ok(Self { categories, size, labels })
    }

    /// Number of positions, equal to the number of values per category
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category_ids(&self) -> impl Iterator<Item = CategoryId> {
        (0..self.categories.len()).map(CategoryId)
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id.0)
    }

    pub fn category_name(&self, id: CategoryId) -> &str {
        self.categories.get(id.0).map(|c| c.name.as_str()).unwrap_or("<unknown>")
    }

    /// All values of a category in declaration order
    pub fn values_of(&self, id: CategoryId) -> impl Iterator<Item = ValueId> + '_ {
        let count = self.categories.get(id.0).map(|c| c.values.len()).unwrap_or(0);
        (0..count).map(move |index| ValueId::new(id, index))
    }

    pub fn label(&self, value: ValueId) -> &str {
        self.categories
            .get(value.category.0)
            .and_then(|c| c.values.get(value.index))
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    /// Resolve a value label to its typed id
    pub fn resolve(&self, label: &str) -> Option<ValueId> {
        self.labels.get(label).copied()
    }
}

/// One declarative relation between values and positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Both values always occupy the same position
    Linked(ValueId, ValueId),
    /// The first value is immediately left of the second
    LeftOf(ValueId, ValueId),
    /// The value is pinned to a position
    ForcedPosition(ValueId, usize),
    /// `a` at `position_a` forces `b` at `position_b`
    Implication {
        a: ValueId,
        position_a: usize,
        b: ValueId,
        position_b: usize,
    },
    /// Neighbour relation at one interior position
    Between { a: ValueId, b: ValueId, position: usize },
    /// The values occupy adjacent positions, in either order
    NextTo(ValueId, ValueId),
}

impl Constraint {
    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::Linked(..) => "linked",
            Constraint::LeftOf(..) => "left_of",
            Constraint::ForcedPosition(..) => "forced_position",
            Constraint::Implication { .. } => "implication",
            Constraint::Between { .. } => "between",
            Constraint::NextTo(..) => "next_to",
        }
    }

    /// Render with value labels, e.g. `next_to(Blend, Cats)`
    pub fn describe(&self, schema: &PuzzleSchema) -> String {
        let l = |v: &ValueId| schema.label(*v).to_string();
        match self {
            Constraint::Linked(a, b) | Constraint::LeftOf(a, b) | Constraint::NextTo(a, b) => {
                format!("{}({}, {})", self.kind(), l(a), l(b))
            }
            Constraint::ForcedPosition(v, p) => format!("{}({} @ {})", self.kind(), l(v), p),
            Constraint::Implication { a, position_a, b, position_b } => {
                format!("{}({} @ {} -> {} @ {})", self.kind(), l(a), position_a, l(b), position_b)
            }
            Constraint::Between { a, b, position } => {
                format!("{}({} @ {}, {})", self.kind(), l(a), position, l(b))
            }
        }
    }
}

/// A constraint together with its human-readable text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
    pub constraint: Constraint,
    pub description: Option<String>,
}

impl Clue {
    pub fn new(constraint: Constraint) -> Self {
        Self { constraint, description: None }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The description if present, otherwise the rendered constraint
    pub fn label(&self, schema: &PuzzleSchema) -> String {
        match &self.description {
            Some(text) => text.clone(),
            None => self.constraint.describe(schema),
        }
    }
}

/// A complete puzzle: schema plus clues
#[derive(Debug, Clone)]
pub struct Puzzle {
    pub name: String,
    pub schema: PuzzleSchema,
    pub clues: Vec<Clue>,
}

impl Puzzle {
    pub fn new<S: Into<String>>(name: S, schema: PuzzleSchema, clues: Vec<Clue>) -> Self {
        Self { name: name.into(), schema, clues }
    }

    pub fn size(&self) -> usize {
        self.schema.size()
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Puzzle '{}':", self.name)?;
        writeln!(f, "  Positions: {}", self.schema.size())?;
        for category in self.schema.categories() {
            writeln!(f, "  {}: {}", category.name, category.values.join(", "))?;
        }
        writeln!(f, "  Clues: {}", self.clues.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_schema() -> PuzzleSchema {
        PuzzleSchema::new(vec![
            Category::new("color", &["Red", "Blue"]),
            Category::new("pet", &["Cat", "Dog"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_schema_resolution() {
        let schema = small_schema();
        assert_eq!(schema.size(), 2);
        assert_eq!(schema.category_count(), 2);
        assert_eq!(schema.resolve("Dog"), Some(ValueId::new(CategoryId(1), 1)));
        assert_eq!(schema.resolve("Fish"), None);
        assert_eq!(schema.label(ValueId::new(CategoryId(0), 1)), "Blue");
        assert_eq!(schema.values_of(CategoryId(1)).count(), 2);
    }

    #[test]
    fn test_schema_rejects_bad_shapes() {
        assert_eq!(PuzzleSchema::new(vec![]), Err(PuzzleError::NoCategories));

        let uneven = PuzzleSchema::new(vec![
            Category::new("color", &["Red", "Blue"]),
            Category::new("pet", &["Cat"]),
        ]);
        assert!(matches!(uneven, Err(PuzzleError::CategorySize { found: 1, expected: 2, .. })));

        let duplicate = PuzzleSchema::new(vec![
            Category::new("color", &["Red", "Blue"]),
            Category::new("mood", &["Blue", "Calm"]),
        ]);
        assert_eq!(duplicate, Err(PuzzleError::DuplicateValue("Blue".to_string())));

        let same_name = PuzzleSchema::new(vec![
            Category::new("color", &["Red"]),
            Category::new("color", &["Blue"]),
        ]);
        assert_eq!(same_name, Err(PuzzleError::DuplicateCategory("color".to_string())));
    }

    #[test]
    fn test_clue_label_falls_back_to_constraint() {
        let schema = small_schema();
        let red = schema.resolve("Red").unwrap();
        let cat = schema.resolve("Cat").unwrap();

        let clue = Clue::new(Constraint::NextTo(red, cat));
        assert_eq!(clue.label(&schema), "next_to(Red, Cat)");

        let clue = clue.with_description("The cat lives next to the red house.");
        assert_eq!(clue.label(&schema), "The cat lives next to the red house.");
    }
}
