//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the input record
//! - runs the grading pipeline
//! - prints the summary
//! - writes the results file and optional JSON export

use std::path::Path;

use clap::Parser;
use tracing::info;

use crate::cli::{Command, GradeArgs, PolicyArgs, SampleArgs, ShowArgs};
use crate::data::sample::{RandomSampleConfig, random_record, template_record};
use crate::domain::GradingPolicy;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `spi` binary.
pub fn run() -> Result<(), AppError> {
    // `spi <input> <output>` behaves like `spi grade <input> <output>`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Grade(args) => handle_grade(args),
        Command::Sample(args) => handle_sample(args),
        Command::Show(args) => handle_show(args),
        Command::Grades => {
            println!("{}", crate::report::format_grade_table());
            Ok(())
        }
    }
}

fn handle_grade(args: GradeArgs) -> Result<(), AppError> {
    crate::logging::init(args.verbose);

    let policy = policy_from_args(&args.policy);
    info!(input = %args.input.display(), "reading input");
    let record = crate::io::ingest::load_record(&args.input)?;
    let outcome = pipeline::run_grading(&record, &policy)?;

    // Render everything first so a failing target leaves no partial results.
    let primary = if is_json_path(&args.output) {
        crate::io::result::render_result_json(&outcome)?
    } else {
        crate::io::ingest::ensure_csv_path(&args.output)?;
        crate::io::export::render_results_csv(&outcome)?
    };
    let export = match &args.export_json {
        Some(path) => Some((path.as_path(), crate::io::result::render_result_json(&outcome)?)),
        None => None,
    };

    let mut targets = vec![(args.output.as_path(), primary.as_slice())];
    if let Some((path, bytes)) = &export {
        targets.push((*path, bytes.as_slice()));
    }
    crate::io::export::write_outputs(&targets)?;

    if args.quiet {
        println!("{}", crate::report::format_spi_line(outcome.spi()));
    } else {
        println!("{}", crate::report::format_summary(&outcome));
        println!("Results written to {}", args.output.display());
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    crate::logging::init(false);

    let record = if args.random {
        random_record(&RandomSampleConfig {
            seed: args.seed,
            subjects: args.subjects,
            mean: args.mean,
            std_dev: args.std_dev,
            max_budget: args.max_budget,
        })?
    } else {
        template_record()?
    };

    crate::io::export::write_record_csv(&args.output, &record)?;
    println!(
        "Sample input with {} subject(s) written to {}",
        record.subjects().len(),
        args.output.display()
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    crate::logging::init(false);

    let result = crate::io::result::read_result_json(&args.result)?;
    println!("Result generated by {} at {}", result.tool, result.generated_at.to_rfc3339());
    println!("{}", crate::report::format_summary(&result.outcome));
    Ok(())
}

pub fn policy_from_args(args: &PolicyArgs) -> GradingPolicy {
    GradingPolicy {
        pass_mark: args.pass_mark,
        component_cap: args.component_cap,
        pardon_floor: args.pardon_floor,
        universal_bonus: args.universal_bonus,
        solve_timeout_ms: (!args.no_timeout).then_some(args.solve_timeout_ms),
    }
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Rewrite argv so bare file arguments default to `spi grade`.
///
/// Rules:
/// - `spi`                        -> unchanged (clap prints usage)
/// - `spi --help/--version/-h`    -> unchanged (show top-level help/version)
/// - `spi grade|sample|show|...`  -> unchanged
/// - `spi in.csv out.csv ...`     -> `spi grade in.csv out.csv ...`
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "grade" | "sample" | "show" | "grades");
    if is_subcommand {
        return argv;
    }

    argv.insert(1, "grade".to_string());
    argv
}
