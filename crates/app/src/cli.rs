use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "corrida")]
#[command(about = "Trips, expenses and profit per km for a rideshare driver")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings that can be forced from the command line.
#[derive(Args, Debug, Default)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the data directory.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Override timezone (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Override log level (e.g. `debug`).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record a trip.
    Trip(TripArgs),
    /// Record an expense.
    Expense(ExpenseArgs),
    /// Delete one record by id.
    Remove { id: String },
    /// Delete every record of today.
    ClearDay {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
    /// Show or set today's distance in km.
    Distance { km: Option<String> },
    /// Show or set the history mode (`dia` or `mes`).
    Mode { mode: Option<String> },
    /// List today's records, newest first.
    Today {
        /// Only `corrida` or `gasto` records.
        #[arg(long)]
        kind: Option<String>,
    },
    /// Today's gains, expenses, balance and per-km ratios.
    Summary,
    /// The history view of the active mode, or of `--mode`.
    History {
        #[arg(long)]
        mode: Option<String>,
    },
    /// Per-day totals of the current month.
    Month,
    /// Record count and distance counters.
    Overview,
    /// Expense categories accepted by `expense`.
    Categories,
    /// Write today's CSV report.
    Report(OutputArgs),
    /// Write a JSON backup of the whole ledger.
    Backup(OutputArgs),
    /// Replace the ledger with the content of a backup file.
    Restore {
        file: PathBuf,
        /// Confirm the replacement.
        #[arg(long)]
        yes: bool,
    },
    /// Print today's summary as plain text for sharing.
    Share,
}

#[derive(Args, Debug)]
pub struct TripArgs {
    /// Amount in reais (`23,90` or `23.90`).
    pub amount: String,
    #[arg(long, short)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExpenseArgs {
    /// Category key or name (`combustivel`, `Fuel`, ...).
    pub category: String,
    /// Amount in reais.
    pub amount: String,
    #[arg(long, short)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Directory the file is written to.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
    /// Print to stdout instead of writing a file.
    #[arg(long)]
    pub stdout: bool,
}
