//! Configuration management for the puzzle solver

pub mod settings;

pub use settings::{CliOverrides, InputConfig, OutputConfig, OutputFormat, Settings, SolverConfig};
