//! Command-line surface and the settings resolved from it.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use splitledger_core::Currency;
use splitledger_observability::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "splitledger")]
#[command(about = "Who owes whom: balances, history and summaries from an expense journal")]
pub struct Cli {
    /// JSON journal to replay (also read from `SPLITLEDGER_JOURNAL`).
    #[arg(long, env = "SPLITLEDGER_JOURNAL")]
    pub journal: PathBuf,

    /// Log output format: `json` or `pretty`.
    #[arg(long, env = "SPLITLEDGER_LOG_FORMAT", default_value = "json")]
    pub log_format: LogFormat,

    /// Ledger currency code.
    #[arg(long, env = "SPLITLEDGER_CURRENCY", default_value = "USD")]
    pub currency: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Net balance against every counterparty.
    Balances,
    /// Entries between the journal owner and one counterparty.
    History {
        counterparty: String,
    },
    /// Dashboard totals for expenses, transfers, subscriptions and loans.
    Summary {
        /// Restrict the expense breakdown to one month, as `YYYY-MM`.
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
        /// Reference date for upcoming payments (defaults to today).
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Days ahead that count as "due soon".
        #[arg(long, default_value_t = 7)]
        due_within: i64,
    },
}

/// Everything the commands need, validated once up front.
#[derive(Debug, Clone)]
pub struct Settings {
    pub journal: PathBuf,
    pub log_format: LogFormat,
    pub currency: Currency,
    pub command: Command,
}

impl Settings {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let currency = Currency::from_code(&cli.currency)?;
        Ok(Self {
            journal: cli.journal,
            log_format: cli.log_format,
            currency,
            command: cli.command,
        })
    }
}

fn parse_month(raw: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("expected YYYY-MM, got `{raw}`");
    let (year, month) = raw.split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}
