mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::model::{ExportArgs, FundArgs, SensitivityArgs};

/// Venture fund economics modelling
#[derive(Parser)]
#[command(
    name = "fundm",
    version,
    about = "Venture fund economics modelling",
    long_about = "Models a venture fund end to end with decimal precision: capital stack, \
                  power-law portfolio returns, annual cash flows with DPI and carry, \
                  LP net returns with IRR, and sensitivity scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation stages to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full fund model
    Run(FundArgs),
    /// Per-category invested capital, gross returns and MOIC
    Portfolio(FundArgs),
    /// Year-by-year cash flows with DPI and carry
    CashFlows(FundArgs),
    /// Net LP returns: carry, net MOIC and net IRR
    LpReturns(FundArgs),
    /// Scale gross returns across scenarios
    Sensitivity(SensitivityArgs),
    /// Print the default model parameters
    Defaults,
    /// Write every output sheet as CSV into a directory
    Export(ExportArgs),
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

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    // Already set when running under a test harness.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Run(args) => commands::model::run_model(args),
        Commands::Portfolio(args) => commands::model::run_portfolio(args),
        Commands::CashFlows(args) => commands::model::run_cash_flows(args),
        Commands::LpReturns(args) => commands::model::run_lp_returns(args),
        Commands::Sensitivity(args) => commands::model::run_sensitivity(args),
        Commands::Defaults => commands::model::run_defaults(),
        Commands::Export(args) => commands::model::run_export(args),
        Commands::Version => {
            println!("fundm {}", env!("CARGO_PKG_VERSION"));
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
