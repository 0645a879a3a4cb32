use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use splitledger_core::{
    CardId, Entity, ExpenseId, LedgerError, LedgerResult, Money, Participant,
};

use crate::entry::{EntrySource, LedgerEntry};
use crate::split::SplitRule;

/// Whether the other participants agreed to a shared expense.
///
/// `Pending -> Accepted | Rejected`, both final. Only accepted expenses post
/// ledger entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SharedStatus {
    Pending,
    #[default]
    Accepted,
    Rejected,
}

/// An expense paid by one participant, optionally shared with others.
///
/// Without a split rule the expense is personal and produces no ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub date: NaiveDate,
    pub total: Money,
    pub payer: Participant,
    #[serde(default)]
    pub split: Option<SplitRule>,
    /// Card the expense was charged to; `None` means paid in cash.
    #[serde(default)]
    pub card: Option<CardId>,
    #[serde(default)]
    pub status: SharedStatus,
}

impl Expense {
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        date: NaiveDate,
        total: Money,
        payer: Participant,
    ) -> LedgerResult<Self> {
        let expense = Self {
            id: ExpenseId::new(),
            title: title.into(),
            description: None,
            category: category.into(),
            date,
            total,
            payer,
            split: None,
            card: None,
            status: SharedStatus::Accepted,
        };
        expense.validate()?;
        Ok(expense)
    }

    pub fn with_id(mut self, id: ExpenseId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_card(mut self, card: CardId) -> Self {
        self.card = Some(card);
        self
    }

    pub fn shared(mut self, rule: SplitRule) -> Self {
        self.split = Some(rule);
        self
    }

    /// Hold the entries back until the other participants accept.
    pub fn awaiting_acceptance(mut self) -> Self {
        self.status = SharedStatus::Pending;
        self
    }

    pub fn is_shared(&self) -> bool {
        self.split.is_some()
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.title.trim().is_empty() {
            return Err(LedgerError::invalid_format("expense title is required"));
        }
        if self.category.trim().is_empty() {
            return Err(LedgerError::invalid_format("expense category is required"));
        }
        if self.total.is_negative() {
            return Err(LedgerError::invalid_amount(format!(
                "expense total must not be negative ({})",
                self.total
            )));
        }
        match &self.split {
            Some(rule) => rule.validate()?,
            None if self.status != SharedStatus::Accepted => {
                return Err(LedgerError::invalid_state(format!(
                    "personal expense {} cannot be {:?}",
                    self.id, self.status
                )));
            }
            None => {}
        }
        Ok(())
    }

    /// Entries this expense contributes to a ledger.
    ///
    /// The split is checked against the total even while acceptance is
    /// pending, but only an accepted expense yields entries.
    pub fn entries(&self) -> LedgerResult<Vec<LedgerEntry>> {
        let Some(rule) = &self.split else {
            return Ok(Vec::new());
        };
        let entries = rule.apply(self.total, &self.payer, EntrySource::Expense(self.id))?;
        match self.status {
            SharedStatus::Accepted => Ok(entries),
            SharedStatus::Pending | SharedStatus::Rejected => Ok(Vec::new()),
        }
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
