//! Command-line parsing for the SPI grader.
//!
//! Argument parsing and command dispatch stay separate from the grading code;
//! `app` turns these structs into a `GradingPolicy` and runs the pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "spi", version, about = "Attendance bonus allocation and SPI grading")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Grade a student record and write final marks plus SPI.
    ///
    /// `spi <input> <output>` is shorthand for this command.
    Grade(GradeArgs),
    /// Write an input CSV: the shipped template, or a seeded random record.
    Sample(SampleArgs),
    /// Print the summary of a saved JSON result.
    Show(ShowArgs),
    /// Print the grade table.
    Grades,
}

/// Options for grading one record.
#[derive(Debug, Parser, Clone)]
pub struct GradeArgs {
    /// Input CSV (Parameter, Subject Name, marks, credits, Value).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file. A `.json` extension writes the full result document,
    /// anything else writes the final marks CSV.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Also write the JSON result document here.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Skip the terminal summary (only the final SPI line is printed).
    #[arg(short, long)]
    pub quiet: bool,

    /// Log pipeline stages to stderr (overridden by SPI_LOG).
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Rule constants. Defaults match `GradingPolicy::default()`.
#[derive(Debug, Args, Clone)]
pub struct PolicyArgs {
    /// Minimum component mark that counts as a pass.
    #[arg(long, default_value_t = 35.0)]
    pub pass_mark: f64,

    /// Maximum attendance bonus per component.
    #[arg(long, default_value_t = 7.0, allow_negative_numbers = true)]
    pub component_cap: f64,

    /// Lowest mark the single-failure pardon lifts to the pass mark.
    #[arg(long, default_value_t = 33.0)]
    pub pardon_floor: f64,

    /// Marks added to every component when nothing fails.
    #[arg(long, default_value_t = 2.0, allow_negative_numbers = true)]
    pub universal_bonus: f64,

    /// Time limit for the bonus allocation solve, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    pub solve_timeout_ms: u64,

    /// Disable the allocation time limit.
    #[arg(long, conflicts_with = "solve_timeout_ms")]
    pub no_timeout: bool,
}

/// Options for writing a sample input.
#[derive(Debug, Parser, Clone)]
pub struct SampleArgs {
    /// Where to write the input CSV.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Generate a random record instead of the template.
    #[arg(long)]
    pub random: bool,

    /// Random seed.
    #[arg(long, default_value_t = 42, requires = "random")]
    pub seed: u64,

    /// Number of subjects to generate.
    #[arg(long, default_value_t = 6, requires = "random")]
    pub subjects: usize,

    /// Mean of generated marks.
    #[arg(long, default_value_t = 40.0, requires = "random")]
    pub mean: f64,

    /// Standard deviation of generated marks.
    #[arg(long, default_value_t = 10.0, requires = "random")]
    pub std_dev: f64,

    /// Largest attendance bonus budget to draw.
    #[arg(long, default_value_t = 12, requires = "random")]
    pub max_budget: u32,
}

/// Options for showing a saved result.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// JSON result produced by `spi grade ... --export-json` or a `.json` output.
    #[arg(long, value_name = "JSON")]
    pub result: PathBuf,
}
