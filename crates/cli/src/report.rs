//! JSON views printed by each subcommand.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use splitledger_core::{LedgerResult, Money, Participant};
use splitledger_ledger::{EntrySource, ExpenseSummary, TransferSummary};
use splitledger_loans::LoanSummary;
use splitledger_subscriptions::monthly_total;

use crate::journal::Books;

#[derive(Debug, Serialize)]
pub struct BalancesReport {
    pub owner: Participant,
    /// Positive: they owe the owner. Negative: the owner owes them.
    pub balances: BTreeMap<Participant, Money>,
    pub net: Money,
}

impl BalancesReport {
    pub fn build(books: &Books) -> LedgerResult<Self> {
        let balances = books.ledger.balances()?;
        let net = Money::sum(books.ledger.currency(), balances.values().copied())?;
        Ok(Self {
            owner: books.ledger.owner().clone(),
            balances,
            net,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryLine {
    pub source: EntrySource,
    /// Effect on what the counterparty owes the owner.
    pub delta: Money,
    pub reversal: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryReport {
    pub counterparty: Participant,
    pub balance: Money,
    pub entries: Vec<HistoryLine>,
}

impl HistoryReport {
    pub fn build(books: &Books, counterparty: Participant) -> LedgerResult<Self> {
        let ledger = &books.ledger;
        let entries = ledger
            .history(&counterparty)
            .into_iter()
            .filter_map(|entry| {
                entry
                    .signed_delta(ledger.owner(), &counterparty)
                    .map(|delta| HistoryLine {
                        source: entry.source(),
                        delta,
                        reversal: entry.is_reversal(),
                    })
            })
            .collect();
        Ok(Self {
            balance: ledger.balance(&counterparty)?,
            counterparty,
            entries,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct UpcomingPayment {
    pub name: String,
    pub amount: Money,
    pub due_on: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionsReport {
    pub active_count: usize,
    pub monthly_total: Money,
    pub due_soon: Vec<UpcomingPayment>,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub expenses: ExpenseSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<ExpenseSummary>,
    pub transfers: TransferSummary,
    pub subscriptions: SubscriptionsReport,
    pub loans: LoanSummary,
}

impl SummaryReport {
    pub fn build(
        books: &Books,
        month: Option<(i32, u32)>,
        as_of: NaiveDate,
        due_within: i64,
    ) -> LedgerResult<Self> {
        let ledger = &books.ledger;
        let currency = ledger.currency();

        let month = month
            .map(|(year, month)| {
                ExpenseSummary::for_month(
                    ledger.expenses(),
                    ledger.cards(),
                    year,
                    month,
                    currency,
                )
            })
            .transpose()?;

        let mut due_soon = Vec::new();
        for subscription in &books.subscriptions {
            if let Some(due_on) = subscription.upcoming_within(as_of, due_within)? {
                due_soon.push(UpcomingPayment {
                    name: subscription.name.clone(),
                    amount: subscription.amount,
                    due_on,
                });
            }
        }
        due_soon.sort_by_key(|p| p.due_on);

        Ok(Self {
            expenses: ExpenseSummary::from_expenses(ledger.expenses(), ledger.cards(), currency)?,
            month,
            transfers: TransferSummary::for_participant(
                ledger.transfers(),
                ledger.owner(),
                currency,
            )?,
            subscriptions: SubscriptionsReport {
                active_count: books.subscriptions.iter().filter(|s| s.active).count(),
                monthly_total: monthly_total(&books.subscriptions, currency)?,
                due_soon,
            },
            loans: LoanSummary::from_loans(&books.loans, currency)?,
        })
    }
}
