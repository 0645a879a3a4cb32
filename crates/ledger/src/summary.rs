//! Dashboard aggregates over expenses and transfers.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use splitledger_core::{Currency, LedgerResult, Money, Participant, find_by_id};

use crate::card::Card;
use crate::expense::Expense;
use crate::transfer::{Transfer, TransferStatus};

/// Totals shown on the expenses dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseSummary {
    pub count: usize,
    pub total: Money,
    pub shared_total: Money,
    /// Charged to a credit or debit card.
    pub card_total: Money,
    /// Paid without a card, or with the cash wallet.
    pub cash_total: Money,
    /// Mean expense, truncated to whole minor units.
    pub average: Money,
    pub by_category: BTreeMap<String, Money>,
}

impl ExpenseSummary {
    /// `cards` resolves each expense's card; a card id missing from it still
    /// counts as card spending.
    pub fn from_expenses<'a, I>(
        expenses: I,
        cards: &[Card],
        currency: Currency,
    ) -> LedgerResult<Self>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        let mut count = 0usize;
        let mut total = Money::zero(currency);
        let mut shared_total = Money::zero(currency);
        let mut card_total = Money::zero(currency);
        let mut cash_total = Money::zero(currency);
        let mut by_category: BTreeMap<String, Money> = BTreeMap::new();

        for expense in expenses {
            count += 1;
            total = total.add(expense.total)?;
            if expense.is_shared() {
                shared_total = shared_total.add(expense.total)?;
            }
            let paid_in_cash = match &expense.card {
                None => true,
                Some(id) => find_by_id(cards, id).is_some_and(Card::is_cash),
            };
            if paid_in_cash {
                cash_total = cash_total.add(expense.total)?;
            } else {
                card_total = card_total.add(expense.total)?;
            }
            let slot = by_category
                .entry(expense.category.clone())
                .or_insert_with(|| Money::zero(currency));
            *slot = slot.add(expense.total)?;
        }

        let average = match i64::try_from(count) {
            Ok(n) if n > 0 => Money::from_minor(total.minor() / n, currency),
            _ => Money::zero(currency),
        };

        Ok(Self {
            count,
            total,
            shared_total,
            card_total,
            cash_total,
            average,
            by_category,
        })
    }

    /// Summary restricted to expenses dated in `year`/`month`.
    pub fn for_month<'a, I>(
        expenses: I,
        cards: &[Card],
        year: i32,
        month: u32,
        currency: Currency,
    ) -> LedgerResult<Self>
    where
        I: IntoIterator<Item = &'a Expense>,
    {
        Self::from_expenses(
            expenses
                .into_iter()
                .filter(|e| e.date.year() == year && e.date.month() == month),
            cards,
            currency,
        )
    }
}

/// Totals shown on the transfers dashboard for one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferSummary {
    pub sent: Money,
    pub received: Money,
    pub pending_total: Money,
    pub pending_count: usize,
}

impl TransferSummary {
    /// `sent`/`received` only count completed transfers; pending ones are
    /// tallied separately in either direction.
    pub fn for_participant<'a, I>(
        transfers: I,
        participant: &Participant,
        currency: Currency,
    ) -> LedgerResult<Self>
    where
        I: IntoIterator<Item = &'a Transfer>,
    {
        let mut summary = Self {
            sent: Money::zero(currency),
            received: Money::zero(currency),
            pending_total: Money::zero(currency),
            pending_count: 0,
        };

        for transfer in transfers {
            let outgoing = transfer.sender() == participant;
            let incoming = transfer.recipient() == participant;
            if !outgoing && !incoming {
                continue;
            }
            match transfer.status() {
                TransferStatus::Completed if outgoing => {
                    summary.sent = summary.sent.add(transfer.amount())?;
                }
                TransferStatus::Completed => {
                    summary.received = summary.received.add(transfer.amount())?;
                }
                TransferStatus::Pending => {
                    summary.pending_total = summary.pending_total.add(transfer.amount())?;
                    summary.pending_count += 1;
                }
                TransferStatus::Failed => {}
            }
        }

        Ok(summary)
    }
}
