//! # billbook
//!
//! Command-line front end for Billbook.
//!
//! ## Usage
//! ```text
//! billbook report --period quarterly --csv
//! billbook score --client "Acme Traders" --trend
//! billbook clients --as-of 2026-03-31
//! billbook totals --invoice INV-0042
//! billbook payables
//! billbook config init
//! ```
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  init_tracing() ──► BillbookConfig::load() ──► flag overrides           │
//! │                                                   │                     │
//! │                                                   ▼                     │
//! │                     load_snapshot(data.file) ──► commands::* ──► stdout │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use billbook_cli::commands::{self, DocumentRef};
use billbook_cli::{BillbookConfig, CliError};
use billbook_core::dates::parse_date;
use billbook_core::ReportPeriod;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "billbook", version, about = "Invoicing totals, client health and financial reports")]
struct Cli {
    /// Path to billbook.toml (defaults to the platform config directory).
    #[arg(long, global = true, env = "BILLBOOK_CONFIG")]
    config: Option<PathBuf>,

    /// Snapshot JSON file, overriding the configured one.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Revenue, expenses, profit and the monthly series.
    Report {
        /// weekly | monthly | quarterly | yearly
        #[arg(long, value_parser = parse_period)]
        period: Option<ReportPeriod>,

        /// Reference date for the window (default: today).
        #[arg(long, value_parser = parse_cli_date)]
        today: Option<NaiveDate>,

        /// Also write the CSV export into the output directory.
        #[arg(long)]
        csv: bool,

        /// Directory for the CSV export, overriding the configured one.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Health score for one client.
    Score {
        /// Client id or name.
        #[arg(long)]
        client: String,

        #[arg(long, value_parser = parse_cli_date)]
        as_of: Option<NaiveDate>,

        /// Show the six-month trend instead of a single score.
        #[arg(long)]
        trend: bool,
    },

    /// Every client with recomputed totals and score.
    Clients {
        #[arg(long, value_parser = parse_cli_date)]
        as_of: Option<NaiveDate>,
    },

    /// Recomputed totals and tax breakdown of one document.
    Totals(TotalsArgs),

    /// Vendor bills summary and overdue list.
    Payables {
        #[arg(long, value_parser = parse_cli_date)]
        today: Option<NaiveDate>,
    },

    /// Show or initialize the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct TotalsArgs {
    /// Invoice id or number.
    #[arg(long)]
    invoice: Option<String>,

    /// Quotation id or number.
    #[arg(long)]
    quotation: Option<String>,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as TOML.
    Show,
    /// Write the effective configuration to the config file.
    Init,
}

fn parse_cli_date(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("unrecognized date '{}'", raw))
}

fn parse_period(raw: &str) -> Result<ReportPeriod, String> {
    raw.parse().map_err(|e: billbook_core::ValidationError| e.to_string())
}

// =============================================================================
// Entry Point
// =============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = BillbookConfig::load(cli.config.clone())?;
    if let Some(data) = &cli.data {
        config.data.file = data.clone();
    }
    debug!(data = ?config.data.file, "Configuration ready");

    let output = run(&cli, &mut config)?;
    print!("{}", output);
    Ok(())
}

fn run(cli: &Cli, config: &mut BillbookConfig) -> Result<String, CliError> {
    let today = Local::now().date_naive();
    let json = cli.json;

    match &cli.command {
        Command::Config(ConfigCommand::Show) => config.to_toml(),
        Command::Config(ConfigCommand::Init) => {
            let path = cli
                .config
                .clone()
                .or_else(BillbookConfig::default_config_path)
                .ok_or_else(|| CliError::InvalidConfig("no config directory available".into()))?;
            config.save(&path)?;
            Ok(format!("{}\n", path.display()))
        }
        Command::Report {
            period,
            today: as_of,
            csv,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.report.output_dir = dir.clone();
            }
            let period = period.unwrap_or(config.report.default_period);
            let as_of = as_of.unwrap_or(today);
            let snapshot = commands::load_snapshot(&config.data.file)?;

            let mut output = commands::report(config, &snapshot, period, as_of, json)?;
            if *csv {
                let path = commands::export_report(&snapshot, period, as_of, &config.report.output_dir)?;
                info!(path = %path.display(), "CSV written");
                output.push_str(&format!("{}\n", path.display()));
            }
            Ok(output)
        }
        Command::Score { client, as_of, trend } => {
            let snapshot = commands::load_snapshot(&config.data.file)?;
            commands::score(&snapshot, client, as_of.unwrap_or(today), *trend, json)
        }
        Command::Clients { as_of } => {
            let snapshot = commands::load_snapshot(&config.data.file)?;
            commands::clients(config, &snapshot, as_of.unwrap_or(today), json)
        }
        Command::Totals(args) => {
            let document = match (&args.invoice, &args.quotation) {
                (Some(id), _) => DocumentRef::Invoice(id.clone()),
                (None, Some(id)) => DocumentRef::Quotation(id.clone()),
                (None, None) => {
                    return Err(CliError::InvalidConfig("--invoice or --quotation is required".into()))
                }
            };
            let snapshot = commands::load_snapshot(&config.data.file)?;
            commands::totals(config, &snapshot, &document, json)
        }
        Command::Payables { today: as_of } => {
            let snapshot = commands::load_snapshot(&config.data.file)?;
            commands::payables(config, &snapshot, as_of.unwrap_or(today), json)
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=billbook_core=trace` - Show trace for the core only
/// - Default: INFO, with DEBUG for billbook crates
///
/// Logs go to stderr so command output stays pipeable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,billbook_core=debug,billbook_cli=debug,billbook=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
