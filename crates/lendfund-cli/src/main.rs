mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::lending::{DealArgs, ScheduleArgs};
use commands::monte_carlo::SimulateArgs;
use commands::portfolio::{RatiosArgs, SeriesArgs};
use commands::time_value::{IrrArgs, NpvArgs, PvArgs};

/// Loan and portfolio analytics for private lending funds
#[derive(Parser)]
#[command(
    name = "lfa",
    version,
    about = "Loan and portfolio analytics for private lending funds",
    long_about = "A CLI for loan-level and portfolio-level fund analytics with decimal \
                  precision. Supports amortization schedules, NPV/IRR, whole-deal \
                  economics, Monte Carlo VaR simulation, and risk-adjusted return ratios."
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
    /// Generate a loan cash flow schedule
    Schedule(ScheduleArgs),
    /// Discount a single future amount to present value
    Pv(PvArgs),
    /// Net present value of a cash flow series
    Npv(NpvArgs),
    /// Solve for the internal rate of return of a cash flow series
    Irr(IrrArgs),
    /// Analyze a loan end to end: schedule, hurdle NPV, realized IRR
    Deal(DealArgs),
    /// Monte Carlo portfolio simulation with VaR and Expected Shortfall
    Simulate(SimulateArgs),
    /// Risk-adjusted return ratios from reported figures
    Ratios(RatiosArgs),
    /// Full return-series analysis (annualisation, ratio suite, beta/alpha)
    Series(SeriesArgs),
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
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::lending::run_schedule(args),
        Commands::Pv(args) => commands::time_value::run_pv(args),
        Commands::Npv(args) => commands::time_value::run_npv(args),
        Commands::Irr(args) => commands::time_value::run_irr(args),
        Commands::Deal(args) => commands::lending::run_deal(args),
        Commands::Simulate(args) => commands::monte_carlo::run_simulate(args),
        Commands::Ratios(args) => commands::portfolio::run_ratios(args),
        Commands::Series(args) => commands::portfolio::run_series(args),
        Commands::Version => {
            println!("lfa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
