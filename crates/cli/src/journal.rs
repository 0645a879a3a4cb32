//! Loading a JSON journal and replaying it into in-memory books.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, info};

use splitledger_core::{Currency, LedgerResult, Participant};
use splitledger_ledger::{Card, Expense, SplitLedger, Transfer};
use splitledger_loans::Loan;
use splitledger_subscriptions::Subscription;

/// On-disk journal: every fact the owner has recorded.
#[derive(Debug, Clone, Deserialize)]
pub struct Journal {
    pub owner: Participant,
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub loans: Vec<Loan>,
}

/// A replayed journal.
#[derive(Debug)]
pub struct Books {
    pub ledger: SplitLedger,
    pub subscriptions: Vec<Subscription>,
    pub loans: Vec<Loan>,
}

impl Journal {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading journal {}", path.display()))?;
        let journal = serde_json::from_str(&raw)
            .with_context(|| format!("parsing journal {}", path.display()))?;
        Ok(journal)
    }

    /// Replay every fact in journal order. The first invalid fact aborts the replay.
    pub fn replay(self, currency: Currency) -> LedgerResult<Books> {
        let mut ledger = SplitLedger::new(self.owner, currency);
        for card in self.cards {
            ledger.register_card(card)?;
        }
        for expense in self.expenses {
            ledger.record_expense(expense)?;
        }
        for transfer in self.transfers {
            ledger.record_transfer(transfer)?;
        }
        for subscription in &self.subscriptions {
            subscription.validate()?;
        }
        for loan in &self.loans {
            loan.validate()?;
        }

        info!(
            owner = %ledger.owner(),
            cards = ledger.cards().len(),
            expenses = ledger.expenses().len(),
            transfers = ledger.transfers().len(),
            entries = ledger.entries().len(),
            "journal replayed"
        );
        debug!(
            subscriptions = self.subscriptions.len(),
            loans = self.loans.len(),
            "side books loaded"
        );

        Ok(Books {
            ledger,
            subscriptions: self.subscriptions,
            loans: self.loans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use splitledger_core::{LedgerError, Money};

    fn p(s: &str) -> Participant {
        Participant::new(s).unwrap()
    }

    fn journal(value: serde_json::Value) -> Journal {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> serde_json::Value {
        json!({
            "owner": "ana@example.com",
            "cards": [{
                "id": "0190f5a0-0000-7000-8000-0000000000c1",
                "name": "Visa",
                "last_four": "4242",
                "type": "credit",
                "bank": "Galicia"
            }],
            "expenses": [{
                "id": "0190f5a0-0000-7000-8000-000000000001",
                "title": "Dinner",
                "category": "Food",
                "date": "2024-02-15",
                "total": { "minor": 3000, "currency": "USD" },
                "payer": "ana@example.com",
                "card": "0190f5a0-0000-7000-8000-0000000000c1",
                "split": {
                    "kind": "equal",
                    "participants": ["ana@example.com", "bob@example.com", "carl@example.com"]
                }
            }],
            "transfers": [{
                "id": "0190f5a0-0000-7000-8000-000000000002",
                "sender": "bob@example.com",
                "recipient": "ana@example.com",
                "amount": { "minor": 400, "currency": "USD" },
                "title": "Part of dinner",
                "created_on": "2024-02-16",
                "status": "completed",
                "finalized_on": "2024-02-16"
            }],
            "subscriptions": [{
                "id": "0190f5a0-0000-7000-8000-000000000003",
                "name": "Music",
                "amount": { "minor": 999, "currency": "USD" },
                "frequency": "monthly",
                "next_payment": "2024-03-01",
                "billing_day": 1,
                "active": true,
                "category": "Entertainment"
            }],
            "loans": []
        })
    }

    #[test]
    fn replay_builds_balances() {
        let books = journal(sample()).replay(Currency::USD).unwrap();

        let usd = |minor| Money::from_minor(minor, Currency::USD);
        assert_eq!(books.ledger.balance(&p("bob@example.com")).unwrap(), usd(600));
        assert_eq!(books.ledger.balance(&p("carl@example.com")).unwrap(), usd(1000));
        assert_eq!(books.subscriptions.len(), 1);
    }

    #[test]
    fn replay_rejects_expense_on_unknown_card() {
        let mut value = sample();
        value["cards"] = json!([]);
        let err = journal(value).replay(Currency::USD).unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[test]
    fn pending_shared_expense_replays_without_entries() {
        let mut value = sample();
        value["expenses"][0]["status"] = json!("pending");
        let books = journal(value).replay(Currency::USD).unwrap();

        let usd = |minor| Money::from_minor(minor, Currency::USD);
        assert_eq!(books.ledger.balance(&p("carl@example.com")).unwrap(), usd(0));
        assert_eq!(books.ledger.balance(&p("bob@example.com")).unwrap(), usd(-400));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let books = journal(json!({ "owner": "ana" })).replay(Currency::EUR).unwrap();
        assert!(books.ledger.entries().is_empty());
        assert!(books.loans.is_empty());
    }

    #[test]
    fn replay_rejects_foreign_currency() {
        let err = journal(sample()).replay(Currency::EUR).unwrap_err();
        assert!(matches!(err, LedgerError::CurrencyMismatch { .. }));
    }

    #[test]
    fn replay_rejects_duplicate_expense() {
        let mut value = sample();
        let expense = value["expenses"][0].clone();
        value["expenses"].as_array_mut().unwrap().push(expense);

        let err = journal(value).replay(Currency::USD).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)));
    }
}
