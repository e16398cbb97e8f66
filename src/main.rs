//! Main CLI application for the logic grid puzzle solver

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use zebra_sat::{
    config::{CliOverrides, OutputFormat, Settings},
    error::SolveError,
    puzzle::create_example_puzzles,
    solve::{PuzzleProblem, Solution},
    utils::{ColorOutput, SolutionFormatter},
};

#[derive(Parser)]
#[command(name = "zebra_sat")]
#[command(about = "Logic grid puzzle SAT solver")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a puzzle
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Puzzle file (overrides config; built-in puzzle when unset)
        #[arg(short, long)]
        puzzle: Option<PathBuf>,

        /// Maximum solutions to find (overrides config)
        #[arg(short, long)]
        max_solutions: Option<usize>,

        /// Solver timeout in seconds, 0 for none (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Save solutions into this directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode a puzzle and report clause counts without solving
    Analyze {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Puzzle file (overrides config)
        #[arg(short, long)]
        puzzle: Option<PathBuf>,
    },

    /// Check a saved JSON solution against a puzzle
    Validate {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Puzzle file (overrides config)
        #[arg(short, long)]
        puzzle: Option<PathBuf>,

        /// Solution file
        #[arg(short, long)]
        solution: PathBuf,
    },

    /// Create example configuration and puzzle files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
    Visual,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Visual => OutputFormat::Visual,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Solve { config, puzzle, max_solutions, timeout, format, output } => {
            let overrides = CliOverrides {
                max_solutions,
                timeout_seconds: timeout,
                puzzle_file: puzzle,
                format: format.map(OutputFormat::from),
                output_dir: output,
            };
            solve_command(config, overrides)
        }
        Commands::Analyze { config, puzzle } => analyze_command(config, puzzle),
        Commands::Validate { config, puzzle, solution } => validate_command(config, puzzle, solution),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

/// Settings from `config_path`, or defaults when the file does not exist
fn load_settings(config_path: &Path, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        log::info!("config file {} not found, using defaults", config_path.display());
        Settings::default()
    };

    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;
    Ok(settings)
}

fn puzzle_override(puzzle: Option<PathBuf>) -> CliOverrides {
    CliOverrides { puzzle_file: puzzle, ..CliOverrides::default() }
}

fn solve_command(config_path: PathBuf, overrides: CliOverrides) -> Result<()> {
    let settings = load_settings(&config_path, &overrides)?;

    let start_time = Instant::now();
    let problem = PuzzleProblem::new(settings.clone()).context("Failed to load puzzle")?;

    println!(
        "{}",
        ColorOutput::info(&format!("Solving '{}'...", problem.puzzle().name))
    );

    let solutions = match problem.solve() {
        Ok(solutions) => solutions,
        Err(e) => {
            match e.downcast_ref::<SolveError>() {
                Some(SolveError::Unsatisfiable { .. }) => {
                    println!("{}", ColorOutput::error("Puzzle is not satisfiable"));
                }
                Some(SolveError::AmbiguousPuzzle { found }) => {
                    println!(
                        "{}",
                        ColorOutput::warning(&format!(
                            "Puzzle is ambiguous: found {} solutions (set require_unique: false to list them)",
                            found
                        ))
                    );
                }
                _ => {}
            }
            return Err(e);
        }
    };

    let total_time = start_time.elapsed();
    println!(
        "{}",
        ColorOutput::success(&format!(
            "{} ({} solution(s) in {:.3}s)",
            SolutionFormatter::diagnostics(&solutions[0]),
            solutions.len(),
            total_time.as_secs_f64()
        ))
    );

    for (i, solution) in solutions.iter().enumerate() {
        if solutions.len() > 1 {
            println!("\n{}", ColorOutput::info(&format!("Solution {}:", i + 1)));
        }
        println!("{}", SolutionFormatter::render(solution, settings.output.format)?);
    }

    if solutions.len() > 1 {
        println!("\n{}", SolutionFormatter::format_solution_summary(&solutions));
    }

    if settings.output.show_statistics {
        println!("\n{}", problem.encoding_statistics()?);
    }

    if settings.output.save {
        SolutionFormatter::save_solutions(&solutions, &settings.output.output_directory, settings.output.format)
            .context("Failed to save solutions")?;
        println!(
            "{}",
            ColorOutput::success(&format!(
                "Solutions saved to {}",
                settings.output.output_directory.display()
            ))
        );
    }

    Ok(())
}

fn analyze_command(config_path: PathBuf, puzzle: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(&config_path, &puzzle_override(puzzle))?;
    let problem = PuzzleProblem::new(settings).context("Failed to load puzzle")?;

    println!("{}", problem.puzzle());

    let statistics = problem.encoding_statistics().context("Failed to encode puzzle")?;
    println!("{}", statistics);

    Ok(())
}

fn validate_command(config_path: PathBuf, puzzle: Option<PathBuf>, solution_path: PathBuf) -> Result<()> {
    let settings = load_settings(&config_path, &puzzle_override(puzzle))?;
    let problem = PuzzleProblem::new(settings).context("Failed to load puzzle")?;

    let solution = Solution::load_from_file(&solution_path)?;
    if solution.puzzle_name != problem.puzzle().name {
        log::warn!(
            "solution was saved for '{}', validating against '{}'",
            solution.puzzle_name,
            problem.puzzle().name
        );
    }

    let result = problem.validate_solution(&solution)?;
    println!("{}", result);

    if result.is_valid {
        println!("{}", ColorOutput::success("Solution is valid"));
        Ok(())
    } else {
        println!("{}", ColorOutput::error("Solution is invalid"));
        anyhow::bail!("Solution failed validation")
    }
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    let config_dir = directory.join("config");
    let puzzle_dir = directory.join("input/puzzles");
    let output_dir = directory.join("output/solutions");

    for dir in [&config_dir, &puzzle_dir, &output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    let written = create_example_puzzles(&puzzle_dir, force).context("Failed to create example puzzles")?;
    for path in &written {
        println!("Created: {}", path.display());
    }

    // Variant that lists every model of a puzzle instead of rejecting ambiguity
    let examples_dir = config_dir.join("examples");
    let mut enumerate = Settings::default();
    enumerate.solver.max_solutions = 10;
    enumerate.solver.require_unique = false;
    enumerate.input.puzzle_file = Some(PathBuf::from("input/puzzles/three_houses.yaml"));
    enumerate.output.format = OutputFormat::Text;
    let enumerate_path = examples_dir.join("enumerate.yaml");
    if !enumerate_path.exists() || force {
        enumerate.to_file(&enumerate_path)?;
        println!("Created: {}", enumerate_path.display());
    } else {
        println!("Skipped: {} (already exists)", enumerate_path.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Add your puzzles to {}", puzzle_dir.display());
    println!("3. Run: zebra_sat solve --config config/default.yaml");

    Ok(())
}
