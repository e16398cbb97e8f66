//! Configuration settings for the puzzle solver

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub solver: SolverConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Stop after this many distinct models; 2 is enough to prove uniqueness
    pub max_solutions: usize,
    /// 0 disables the limit
    pub timeout_seconds: u64,
    pub require_unique: bool,
    pub explain_unsat: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// `None` selects the built-in canonical puzzle
    pub puzzle_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub save: bool,
    pub output_directory: PathBuf,
    pub show_statistics: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
    Visual,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            solver: SolverConfig {
                max_solutions: 2,
                timeout_seconds: 60,
                require_unique: true,
                explain_unsat: true,
            },
            input: InputConfig { puzzle_file: None },
            output: OutputConfig {
                format: OutputFormat::Visual,
                save: false,
                output_directory: PathBuf::from("output/solutions"),
                show_statistics: true,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.solver.max_solutions == 0 {
            anyhow::bail!("Maximum solutions must be positive");
        }

        if self.solver.require_unique && self.solver.max_solutions < 2 {
            anyhow::bail!("Checking uniqueness needs max_solutions of at least 2");
        }

        if let Some(puzzle_file) = &self.input.puzzle_file {
            if !puzzle_file.exists() {
                anyhow::bail!("Puzzle file does not exist: {}", puzzle_file.display());
            }
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(max_solutions) = cli_overrides.max_solutions {
            self.solver.max_solutions = max_solutions;
        }
        if let Some(timeout) = cli_overrides.timeout_seconds {
            self.solver.timeout_seconds = timeout;
        }
        if let Some(ref puzzle_file) = cli_overrides.puzzle_file {
            self.input.puzzle_file = Some(puzzle_file.clone());
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
            self.output.save = true;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub max_solutions: Option<usize>,
    pub timeout_seconds: Option<u64>,
    pub puzzle_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
}
