//! Puzzle files and the built-in canonical puzzle

use super::model::{Category, Clue, Constraint, Puzzle, PuzzleSchema, ValueId};
use crate::error::PuzzleError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk form of a puzzle. Clues reference values by label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleDefinition {
    pub name: String,
    pub categories: Vec<Category>,
    #[serde(default)]
    pub clues: Vec<ClueDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClueDefinition {
    Linked {
        a: String,
        b: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    LeftOf {
        a: String,
        b: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    ForcedPosition {
        value: String,
        position: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Implication {
        a: String,
        position_a: usize,
        b: String,
        position_b: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Between {
        a: String,
        b: String,
        position: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    NextTo {
        a: String,
        b: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl PuzzleDefinition {
    /// Resolve labels and validate the schema
    pub fn into_puzzle(self) -> Result<Puzzle, PuzzleError> {
        let schema = PuzzleSchema::new(self.categories)?;
        let clues = self
            .clues
            .into_iter()
            .enumerate()
            .map(|(i, clue)| resolve_clue(&schema, i, clue))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Puzzle::new(self.name, schema, clues))
    }

    /// Turn a puzzle back into its on-disk form
    pub fn from_puzzle(puzzle: &Puzzle) -> Self {
        let schema = &puzzle.schema;
        let l = |v: ValueId| schema.label(v).to_string();
        let clues = puzzle
            .clues
            .iter()
            .map(|clue| {
                let description = clue.description.clone();
                match clue.constraint {
                    Constraint::Linked(a, b) => ClueDefinition::Linked { a: l(a), b: l(b), description },
                    Constraint::LeftOf(a, b) => ClueDefinition::LeftOf { a: l(a), b: l(b), description },
                    Constraint::ForcedPosition(v, position) => {
                        ClueDefinition::ForcedPosition { value: l(v), position, description }
                    }
                    Constraint::Implication { a, position_a, b, position_b } => ClueDefinition::Implication {
                        a: l(a),
                        position_a,
                        b: l(b),
                        position_b,
                        description,
                    },
                    Constraint::Between { a, b, position } => {
                        ClueDefinition::Between { a: l(a), b: l(b), position, description }
                    }
                    Constraint::NextTo(a, b) => ClueDefinition::NextTo { a: l(a), b: l(b), description },
                }
            })
            .collect();

        Self {
            name: puzzle.name.clone(),
            categories: schema.categories().to_vec(),
            clues,
        }
    }
}

fn resolve_clue(schema: &PuzzleSchema, index: usize, clue: ClueDefinition) -> Result<Clue, PuzzleError> {
    let find = |label: &str| {
        schema.resolve(label).ok_or_else(|| PuzzleError::UnknownValueLabel {
            clue: index,
            label: label.to_string(),
        })
    };

    let (constraint, description) = match clue {
        ClueDefinition::Linked { a, b, description } => (Constraint::Linked(find(&a)?, find(&b)?), description),
        ClueDefinition::LeftOf { a, b, description } => (Constraint::LeftOf(find(&a)?, find(&b)?), description),
        ClueDefinition::ForcedPosition { value, position, description } => {
            (Constraint::ForcedPosition(find(&value)?, position), description)
        }
        ClueDefinition::Implication { a, position_a, b, position_b, description } => (
            Constraint::Implication { a: find(&a)?, position_a, b: find(&b)?, position_b },
            description,
        ),
        ClueDefinition::Between { a, b, position, description } => {
            (Constraint::Between { a: find(&a)?, b: find(&b)?, position }, description)
        }
        ClueDefinition::NextTo { a, b, description } => (Constraint::NextTo(find(&a)?, find(&b)?), description),
    };

    Ok(Clue { constraint, description })
}

/// Load a puzzle from a YAML file
pub fn load_puzzle_from_file<P: AsRef<Path>>(path: P) -> Result<Puzzle> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read puzzle file: {}", path.as_ref().display()))?;

    parse_puzzle_from_str(&content)
        .with_context(|| format!("Failed to parse puzzle file: {}", path.as_ref().display()))
}

/// Parse a puzzle from its YAML representation
pub fn parse_puzzle_from_str(content: &str) -> Result<Puzzle> {
    let definition: PuzzleDefinition = serde_yaml::from_str(content).context("Invalid puzzle YAML")?;
    Ok(definition.into_puzzle()?)
}

/// Save a puzzle to a YAML file
pub fn save_puzzle_to_file<P: AsRef<Path>>(puzzle: &Puzzle, path: P) -> Result<()> {
    let content = serde_yaml::to_string(&PuzzleDefinition::from_puzzle(puzzle))
        .context("Failed to serialize puzzle")?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write puzzle file: {}", path.as_ref().display()))?;

    Ok(())
}

/// The classic five-house puzzle with its fifteen clues
pub fn canonical_puzzle() -> Puzzle {
    let categories = vec![
        Category::new("nationality", &["Brit", "Swede", "Dane", "Norwegian", "German"]),
        Category::new("drink", &["Tea", "Water", "Coffee", "Milk", "Beer"]),
        Category::new("color", &["Red", "Blue", "Yellow", "Green", "White"]),
        Category::new("cigarette", &["Blend", "Prince", "Dunhill", "Bluemaster", "PallMall"]),
        Category::new("pet", &["Dogs", "Birds", "Cats", "Horses", "Fish"]),
    ];

    let linked = |a: &str, b: &str, text: &str| ClueDefinition::Linked {
        a: a.to_string(),
        b: b.to_string(),
        description: Some(text.to_string()),
    };
    let next_to = |a: &str, b: &str, text: &str| ClueDefinition::NextTo {
        a: a.to_string(),
        b: b.to_string(),
        description: Some(text.to_string()),
    };
    let forced = |value: &str, position: usize, text: &str| ClueDefinition::ForcedPosition {
        value: value.to_string(),
        position,
        description: Some(text.to_string()),
    };

    let clues = vec![
        linked("Brit", "Red", "The Brit lives in the red house."),
        linked("Swede", "Dogs", "The Swede keeps dogs."),
        linked("Dane", "Tea", "The Dane drinks tea."),
        ClueDefinition::LeftOf {
            a: "Green".to_string(),
            b: "White".to_string(),
            description: Some("The green house is immediately left of the white house.".to_string()),
        },
        linked("Green", "Coffee", "The owner of the green house drinks coffee."),
        linked("PallMall", "Birds", "The Pall Mall smoker keeps birds."),
        linked("Yellow", "Dunhill", "The owner of the yellow house smokes Dunhill."),
        forced("Milk", 2, "The man in the center house drinks milk."),
        forced("Norwegian", 0, "The Norwegian lives in the first house from the left."),
        next_to("Blend", "Cats", "The Blend smoker lives next to the cat owner."),
        next_to("Horses", "Dunhill", "The horse owner lives next to the Dunhill smoker."),
        linked("Bluemaster", "Beer", "The Bluemaster smoker drinks beer."),
        linked("German", "Prince", "The German smokes Prince."),
        next_to("Norwegian", "Blue", "The Norwegian lives next to the blue house."),
        next_to("Blend", "Water", "The Blend smoker has a neighbour who drinks water."),
    ];

    PuzzleDefinition {
        name: "einstein".to_string(),
        categories,
        clues,
    }
    .into_puzzle()
    .unwrap_or_else(|e| unreachable!("canonical puzzle is well formed: {e}"))
}

/// Write example puzzle files into a directory.
///
/// Existing files are left alone unless `force` is set. Returns the paths
/// that were written.
pub fn create_example_puzzles<P: AsRef<Path>>(dir: P, force: bool) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let small = PuzzleDefinition {
        name: "three_houses".to_string(),
        categories: vec![
            Category::new("color", &["Red", "Green", "Blue"]),
            Category::new("pet", &["Cat", "Dog", "Fish"]),
        ],
        clues: vec![
            ClueDefinition::ForcedPosition {
                value: "Red".to_string(),
                position: 0,
                description: Some("The red house is on the left.".to_string()),
            },
            ClueDefinition::LeftOf {
                a: "Green".to_string(),
                b: "Blue".to_string(),
                description: None,
            },
            ClueDefinition::Linked {
                a: "Dog".to_string(),
                b: "Blue".to_string(),
                description: Some("The dog lives in the blue house.".to_string()),
            },
            ClueDefinition::NextTo {
                a: "Fish".to_string(),
                b: "Dog".to_string(),
                description: None,
            },
        ],
    };

    let examples = [("einstein.yaml", canonical_puzzle()), ("three_houses.yaml", small.into_puzzle()?)];

    let mut written = Vec::new();
    for (file_name, puzzle) in examples {
        let path = dir.join(file_name);
        if path.exists() && !force {
            log::info!("keeping existing {}", path.display());
            continue;
        }

        save_puzzle_to_file(&puzzle, &path)?;
        written.push(path);
    }

    Ok(written)
}
