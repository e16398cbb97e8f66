//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::solve::Solution;
use anyhow::{Context, Result};
use std::path::Path;

/// Format solutions for display
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// The one-line encoding size report printed after a successful solve
    pub fn diagnostics(solution: &Solution) -> String {
        format!(
            "satisfiable with {} clauses and {} variables",
            solution.clauses, solution.variables
        )
    }

    /// Plain table, one line per category
    pub fn format_solution(solution: &Solution) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== {} ===\n", solution.puzzle_name));
        output.push_str(&format!("Solve Time: {:.3}s\n", solution.solve_time.as_secs_f64()));
        output.push_str(&format!("Unique: {}\n", Self::uniqueness(solution)));
        output.push('\n');

        let width = Self::column_width(solution);
        let label_width = Self::label_width(solution);

        output.push_str(&format!("{:label_width$}", "position"));
        for position in 1..=solution.size() {
            output.push_str(&format!(" | {:width$}", position));
        }
        output.push('\n');
        output.push_str(&"-".repeat(label_width + solution.size() * (width + 3)));
        output.push('\n');

        for row in &solution.rows {
            output.push_str(&format!("{:label_width$}", row.category));
            for value in &row.values {
                output.push_str(&format!(" | {:width$}", value));
            }
            output.push('\n');
        }

        output
    }

    /// Row of little houses above a coloured table of values
    pub fn format_visual(solution: &Solution) -> String {
        let mut output = String::new();
        let width = Self::column_width(solution).max(6);
        let label_width = Self::label_width(solution) + 2;
        let size = solution.size();

        output.push_str(&"-".repeat(label_width + size * width));
        output.push_str("\n|\n|");
        output.push_str(&" ".repeat(label_width - 1));
        for position in 1..=size {
            output.push_str(&format!("{:<width$}", format!("  _{}_", position)));
        }
        output.push_str("\n|");
        output.push_str(&" ".repeat(label_width - 1));
        for _ in 0..size {
            output.push_str(&format!("{:<width$}", " /\\___\\"));
        }
        output.push_str("\n|");
        output.push_str(&" ".repeat(label_width - 1));
        for _ in 0..size {
            output.push_str(&format!("{:<width$}", " |_|\"\"|"));
        }
        output.push_str("\n|\n");

        for row in &solution.rows {
            output.push_str(&format!("{:label_width$}", format!("| {}", row.category)));
            for value in &row.values {
                // pad before colouring so escape codes do not count towards the width
                output.push_str(&ColorOutput::colored(&format!("{:width$}", value), Color::Green));
            }
            output.push('\n');
        }

        output
    }

    /// Format multiple solutions as a summary table
    pub fn format_solution_summary(solutions: &[Solution]) -> String {
        let mut output = String::new();

        output.push_str("Solutions Summary:\n");
        output.push_str("#   | Clauses | Variables | Time(ms) | Unique\n");
        output.push_str("----|---------|-----------|----------|-------\n");

        for (i, solution) in solutions.iter().enumerate() {
            output.push_str(&format!(
                "{:3} | {:7} | {:9} | {:8} | {}\n",
                i + 1,
                solution.clauses,
                solution.variables,
                solution.solve_time.as_millis(),
                Self::uniqueness(solution)
            ));
        }

        output
    }

    /// Render a solution in the requested format
    pub fn render(solution: &Solution, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Text => Self::format_solution(solution),
            OutputFormat::Json => solution.to_json().context("Failed to serialize solution")?,
            OutputFormat::Visual => Self::format_visual(solution),
        })
    }

    /// Save solutions to files based on output format
    pub fn save_solutions<P: AsRef<Path>>(
        solutions: &[Solution],
        output_dir: P,
        format: OutputFormat,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        for (i, solution) in solutions.iter().enumerate() {
            let filepath = match format {
                OutputFormat::Text => output_dir.join(format!("solution_{:03}.txt", i + 1)),
                OutputFormat::Json => output_dir.join(format!("solution_{:03}.json", i + 1)),
                OutputFormat::Visual => output_dir.join(format!("solution_{:03}_visual.txt", i + 1)),
            };

            match format {
                OutputFormat::Json => solution.save_to_file(&filepath)?,
                OutputFormat::Text => std::fs::write(&filepath, Self::format_solution(solution))
                    .with_context(|| format!("Failed to write {}", filepath.display()))?,
                // files never carry escape codes
                OutputFormat::Visual => {
                    let content = ColorOutput::strip(&Self::format_visual(solution));
                    std::fs::write(&filepath, content)
                        .with_context(|| format!("Failed to write {}", filepath.display()))?
                }
            }
            log::debug!("saved {}", filepath.display());
        }

        Ok(())
    }

    fn uniqueness(solution: &Solution) -> &'static str {
        match solution.unique {
            Some(true) => "yes",
            Some(false) => "no",
            None => "unknown",
        }
    }

    fn column_width(solution: &Solution) -> usize {
        solution
            .rows
            .iter()
            .flat_map(|row| row.values.iter().map(String::len))
            .max()
            .unwrap_or(0)
            .max(2)
    }

    fn label_width(solution: &Solution) -> usize {
        solution
            .rows
            .iter()
            .map(|row| row.category.len())
            .chain(std::iter::once("position".len()))
            .max()
            .unwrap_or(0)
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Remove ANSI escape sequences
    pub fn strip(text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                // skip to the terminating 'm'
                for c in chars.by_ref() {
                    if c == 'm' {
                        break;
                    }
                }
            } else {
                output.push(c);
            }
        }
        output
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}
