//! CLI entrypoint for the fiberrt conformance harness.

use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use fiberrt_harness::report::ConformanceReport;
use fiberrt_harness::{run_scenario, HarnessError, SCENARIO_NAMES};

/// Conformance tooling for fiberrt.
#[derive(Debug, Parser)]
#[command(name = "fiberrt-harness")]
#[command(about = "Scenario/property conformance runner for fiberrt")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the names of every runnable scenario.
    List,
    /// Run one named scenario, or `all` of them, and report pass/fail.
    Run {
        /// Scenario name (see `list`), or `all`.
        scenario: String,
        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::List => {
            for name in SCENARIO_NAMES {
                println!("{name}");
            }
            ExitCode::SUCCESS
        }
        Command::Run { scenario, format } => run(&scenario, format),
    }
}

fn run(scenario: &str, format: Format) -> ExitCode {
    match run_inner(scenario, format) {
        Ok(all_passed) => {
            if all_passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_inner(scenario: &str, format: Format) -> Result<bool, HarnessError> {
    let report = if scenario.eq_ignore_ascii_case("all") {
        fiberrt_harness::run_all()
    } else {
        let outcome =
            run_scenario(scenario).ok_or_else(|| HarnessError::UnknownScenario(scenario.to_string()))?;
        ConformanceReport::from_outcomes(vec![outcome])
    };

    match format {
        Format::Text => print!("{}", report.to_text()),
        Format::Json => println!("{}", report.to_json()?),
    }

    Ok(report.all_passed())
}
