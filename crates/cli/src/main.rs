//! `splitledger`: replay an expense journal and print balances or summaries as JSON.

mod config;
mod journal;
mod report;

use std::io::Write;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use splitledger_core::Participant;

use crate::config::{Cli, Command, Settings};
use crate::journal::Journal;
use crate::report::{BalancesReport, HistoryReport, SummaryReport};

fn main() -> anyhow::Result<()> {
    let settings = Settings::from_cli(Cli::parse())?;
    splitledger_observability::init(settings.log_format);

    info!(
        journal = %settings.journal.display(),
        currency = %settings.currency,
        "starting splitledger"
    );

    let books = Journal::load(&settings.journal)?
        .replay(settings.currency)
        .context("replaying journal")?;

    match settings.command {
        Command::Balances => print_json(&BalancesReport::build(&books)?)?,
        Command::History { counterparty } => {
            let counterparty = Participant::new(counterparty)?;
            print_json(&HistoryReport::build(&books, counterparty)?)?;
        }
        Command::Summary {
            month,
            as_of,
            due_within,
        } => {
            let as_of = as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
            print_json(&SummaryReport::build(&books, month, as_of, due_within)?)?;
        }
    }

    info!("done");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
