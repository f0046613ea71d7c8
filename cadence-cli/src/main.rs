//! Cadence CLI - transaction history with recurring charge detection

use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;


use commands::{config, exchange, remove, transactions};

/// Cadence - see where your money goes every month
#[derive(Parser)]
#[command(name = "cadence", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List transactions with recurring charges flagged
    Transactions {
        /// Access token of the linked item
        #[arg(long, env = "PLAID_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
        /// First day of the range (YYYY-MM-DD); defaults to the look-back window
        #[arg(long, requires = "end_date")]
        start_date: Option<NaiveDate>,
        /// Last day of the range (YYYY-MM-DD), inclusive
        #[arg(long, requires = "start_date")]
        end_date: Option<NaiveDate>,
        /// Only show recurring transactions
        #[arg(long)]
        recurring_only: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Exchange a link public token for an access token
    Exchange {
        /// Public token from the link flow
        public_token: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove the linked item and invalidate its access token
    Remove {
        /// Access token of the linked item
        #[arg(long, env = "PLAID_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    // Logs go to stderr so --json output stays machine-readable
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).compact())
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Transactions { access_token, start_date, end_date, recurring_only, json } => {
            let range = start_date.zip(end_date);
            transactions::run(&access_token, range, recurring_only, json)
        }
        Commands::Exchange { public_token, json } => exchange::run(&public_token, json),
        Commands::Remove { access_token, force, json } => remove::run(&access_token, force, json),
        Commands::Config { json } => config::run(json),
    }
}
