//! The split ledger: an append-only history of obligations between participants.
//!
//! Balances are never stored. Every query folds the full entry history, so
//! there is no running total that could drift from the entries behind it.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use splitledger_core::{
    Aggregate, CardId, Currency, ExpenseId, LedgerError, LedgerResult, Money, Participant,
    TransferId, find_by_id, find_by_id_mut,
};

use crate::card::Card;
use crate::entry::{EntrySource, LedgerEntry};
use crate::expense::{Expense, SharedStatus};
use crate::transfer::{Transfer, TransferCommand, TransferEvent, TransferStatus};

/// Final outcome requested for a pending transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Completed,
    Failed { reason: Option<String> },
}

/// Ledger of shared expenses and transfers, seen from `owner`'s side.
///
/// Positive balances mean the counterparty owes the owner; negative balances
/// mean the owner owes the counterparty. All amounts share one currency.
///
/// Mutating methods take `&mut self`, so appends are single-writer, and each
/// operation computes every entry before pushing any: a rejected expense or
/// transfer leaves the ledger untouched.
#[derive(Debug, Clone)]
pub struct SplitLedger {
    owner: Participant,
    currency: Currency,
    entries: Vec<LedgerEntry>,
    cards: Vec<Card>,
    expenses: Vec<Expense>,
    transfers: Vec<Transfer>,
}

impl SplitLedger {
    pub fn new(owner: Participant, currency: Currency) -> Self {
        Self {
            owner,
            currency,
            entries: Vec::new(),
            cards: Vec::new(),
            expenses: Vec::new(),
            transfers: Vec::new(),
        }
    }

    pub fn owner(&self) -> &Participant {
        &self.owner
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Full entry history in record order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        find_by_id(&self.cards, id)
    }

    /// Make a card available for expenses to reference.
    pub fn register_card(&mut self, card: Card) -> LedgerResult<()> {
        if self.card(&card.id).is_some() {
            return Err(LedgerError::invalid_state(format!(
                "card {} already registered",
                card.id
            )));
        }
        card.validate()?;
        debug!(card_id = %card.id, kind = ?card.kind, "registered card");
        self.cards.push(card);
        Ok(())
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn expense(&self, id: &ExpenseId) -> Option<&Expense> {
        find_by_id(&self.expenses, id)
    }

    /// Every transfer recorded, including pending and failed ones.
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn transfer(&self, id: TransferId) -> Option<&Transfer> {
        self.transfers.iter().find(|t| t.id_typed() == id)
    }

    fn ensure_currency(&self, amount: Money) -> LedgerResult<()> {
        if amount.currency() != self.currency {
            return Err(LedgerError::currency_mismatch(
                self.currency.code(),
                amount.currency().code(),
            ));
        }
        Ok(())
    }

    /// Record an expense and append the entries its split rule produces.
    ///
    /// Returns how many entries were appended (zero for personal expenses).
    pub fn record_expense(&mut self, expense: Expense) -> LedgerResult<usize> {
        let entries = self.expense_entries(&expense).inspect_err(|e| {
            warn!(expense_id = %expense.id, error = %e, "rejected expense");
        })?;

        let appended = entries.len();
        self.entries.extend(entries);
        debug!(
            expense_id = %expense.id,
            appended,
            shared = expense.is_shared(),
            "recorded expense"
        );
        self.expenses.push(expense);
        Ok(appended)
    }

    fn expense_entries(&self, expense: &Expense) -> LedgerResult<Vec<LedgerEntry>> {
        if self.expense(&expense.id).is_some() {
            return Err(LedgerError::invalid_state(format!(
                "expense {} already recorded",
                expense.id
            )));
        }
        self.ensure_currency(expense.total)?;
        expense.validate()?;
        if let Some(card) = &expense.card {
            if self.card(card).is_none() {
                return Err(LedgerError::not_found(format!("card {card}")));
            }
        }
        expense.entries()
    }

    /// Accept a shared expense that was recorded as pending and post its entries.
    ///
    /// Returns how many entries were appended.
    pub fn accept_expense(&mut self, id: &ExpenseId) -> LedgerResult<usize> {
        self.decide_expense(id, SharedStatus::Accepted)
    }

    /// Reject a pending shared expense. Nothing is ever posted for it.
    pub fn reject_expense(&mut self, id: &ExpenseId) -> LedgerResult<()> {
        self.decide_expense(id, SharedStatus::Rejected).map(|_| ())
    }

    fn decide_expense(&mut self, id: &ExpenseId, decision: SharedStatus) -> LedgerResult<usize> {
        let expense = find_by_id_mut(&mut self.expenses, id)
            .ok_or_else(|| LedgerError::not_found(format!("expense {id}")))?;
        if expense.status != SharedStatus::Pending {
            let err = LedgerError::invalid_state(format!(
                "expense {id} is already {:?}",
                expense.status
            ));
            warn!(expense_id = %id, error = %err, "rejected expense decision");
            return Err(err);
        }

        let mut decided = expense.clone();
        decided.status = decision;
        let entries = decided.entries()?;
        *expense = decided;

        let appended = entries.len();
        self.entries.extend(entries);
        debug!(expense_id = %id, ?decision, appended, "settled shared expense");
        Ok(appended)
    }

    /// Record a transfer in any state.
    ///
    /// Only a completed transfer appends an entry; pending and failed ones are
    /// kept for history and can be finalized later.
    pub fn record_transfer(&mut self, transfer: Transfer) -> LedgerResult<()> {
        let checked = self.check_new_transfer(&transfer);
        if let Err(e) = &checked {
            warn!(transfer_id = %transfer.id_typed(), error = %e, "rejected transfer");
        }
        checked?;

        if let Some(entry) = transfer.entry() {
            self.entries.push(entry);
        }
        debug!(
            transfer_id = %transfer.id_typed(),
            status = ?transfer.status(),
            "recorded transfer"
        );
        self.transfers.push(transfer);
        Ok(())
    }

    fn check_new_transfer(&self, transfer: &Transfer) -> LedgerResult<()> {
        if self.transfer(transfer.id_typed()).is_some() {
            return Err(LedgerError::invalid_state(format!(
                "transfer {} already recorded",
                transfer.id_typed()
            )));
        }
        self.ensure_currency(transfer.amount())?;
        transfer.validate()
    }

    /// Drive a recorded pending transfer to its final state.
    ///
    /// Completing appends the transfer's entry. Finalizing a transfer that is
    /// already completed or failed is an `InvalidState` error.
    pub fn finalize_transfer(
        &mut self,
        id: TransferId,
        outcome: TransferOutcome,
        on: NaiveDate,
    ) -> LedgerResult<Vec<TransferEvent>> {
        let transfer = self
            .transfers
            .iter_mut()
            .find(|t| t.id_typed() == id)
            .ok_or_else(|| LedgerError::not_found(format!("transfer {id}")))?;

        let command = match outcome {
            TransferOutcome::Completed => TransferCommand::Complete { on },
            TransferOutcome::Failed { reason } => TransferCommand::Fail { on, reason },
        };

        let events = transfer.execute(&command).inspect_err(|e| {
            warn!(transfer_id = %id, error = %e, "rejected transfer finalization");
        })?;

        if let Some(entry) = transfer.entry() {
            self.entries.push(entry);
        }
        debug!(transfer_id = %id, status = ?transfer.status(), "finalized transfer");
        Ok(events)
    }

    /// Append offsetting entries for everything `source` contributed.
    ///
    /// The original entries stay in the history. A source can be reversed once.
    pub fn reverse(&mut self, source: EntrySource) -> LedgerResult<usize> {
        let mut offsets = Vec::new();
        for entry in self.entries.iter().filter(|e| e.source() == source) {
            if entry.is_reversal() {
                return Err(LedgerError::invalid_state(format!("{source} already reversed")));
            }
            offsets.push(entry.offsetting());
        }

        if offsets.is_empty() {
            return Err(LedgerError::invalid_state(format!(
                "{source} has no entries to reverse"
            )));
        }

        let appended = offsets.len();
        self.entries.extend(offsets);
        debug!(%source, appended, "reversed source");
        Ok(appended)
    }

    /// Net amount `counterparty` owes the owner (negative: owner owes them).
    pub fn balance(&self, counterparty: &Participant) -> LedgerResult<Money> {
        self.balance_between(&self.owner, counterparty)
    }

    /// Net amount `counterparty` owes `viewer`, for any pair of participants.
    pub fn balance_between(
        &self,
        viewer: &Participant,
        counterparty: &Participant,
    ) -> LedgerResult<Money> {
        Money::sum(
            self.currency,
            self.entries
                .iter()
                .filter_map(|e| e.signed_delta(viewer, counterparty)),
        )
    }

    /// Every counterparty with a non-zero balance against the owner.
    pub fn balances(&self) -> LedgerResult<BTreeMap<Participant, Money>> {
        let counterparties: HashSet<&Participant> = self
            .entries
            .iter()
            .filter(|e| e.involves(&self.owner))
            .flat_map(|e| [e.debtor(), e.creditor()])
            .filter(|p| *p != &self.owner)
            .collect();

        let mut out = BTreeMap::new();
        for counterparty in counterparties {
            let balance = self.balance(counterparty)?;
            if !balance.is_zero() {
                out.insert(counterparty.clone(), balance);
            }
        }
        Ok(out)
    }

    /// Entries between the owner and `counterparty`, in record order.
    pub fn history(&self, counterparty: &Participant) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.signed_delta(&self.owner, counterparty).is_some())
            .collect()
    }

    /// Transfers still waiting for an outcome.
    pub fn pending_transfers(&self) -> impl Iterator<Item = &Transfer> {
        self.transfers
            .iter()
            .filter(|t| t.status() == TransferStatus::Pending)
    }
}
