mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::schedule::{CompareArgs, ScheduleArgs};
use commands::solve::SolveArgs;

/// Loan repayment schedules with prepayments
#[derive(Parser)]
#[command(
    name = "loanplan",
    version,
    about = "Loan repayment schedules with prepayments",
    long_about = "Computes month-by-month loan repayment schedules under the equal-principal \
                  and equal-principal-and-interest methods, with lump-sum prepayments that \
                  either shorten the loan or lower the monthly payment."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Month-by-month repayment schedule with prepayments applied
    Schedule(ScheduleArgs),
    /// Compare equal-principal and equal-payment repayment for the same loan
    Compare(CompareArgs),
    /// Solve for the missing one of principal, months, rate and payment
    Solve(SolveArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Compare(args) => commands::schedule::run_compare(args),
        Commands::Solve(args) => commands::solve::run_solve(args),
        Commands::Version => {
            println!("loanplan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
