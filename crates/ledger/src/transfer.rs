use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use splitledger_core::{
    Aggregate, AggregateRoot, Event, LedgerError, LedgerResult, Money, Participant,
    TransferId,
};

use crate::entry::{EntrySource, LedgerEntry};

/// Transfer lifecycle: `Pending -> Completed | Failed`. Both outcomes are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
}

impl TransferStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }
}

/// Aggregate root: a direct payment from `sender` to `recipient`.
///
/// Only a completed transfer moves balances; pending and failed ones are kept
/// for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    id: TransferId,
    sender: Participant,
    recipient: Participant,
    amount: Money,
    title: String,
    #[serde(default)]
    description: Option<String>,
    created_on: NaiveDate,
    status: TransferStatus,
    #[serde(default)]
    finalized_on: Option<NaiveDate>,
    #[serde(default)]
    failure_reason: Option<String>,
    #[serde(default, skip_serializing)]
    version: u64,
}

impl Transfer {
    /// Open a new pending transfer.
    pub fn pending(
        sender: Participant,
        recipient: Participant,
        amount: Money,
        title: impl Into<String>,
        created_on: NaiveDate,
    ) -> LedgerResult<Self> {
        let transfer = Self {
            id: TransferId::new(),
            sender,
            recipient,
            amount,
            title: title.into(),
            description: None,
            created_on,
            status: TransferStatus::Pending,
            finalized_on: None,
            failure_reason: None,
            version: 0,
        };
        transfer.validate()?;
        Ok(transfer)
    }

    /// Shortcut for a transfer that already settled on `created_on`.
    pub fn completed(
        sender: Participant,
        recipient: Participant,
        amount: Money,
        title: impl Into<String>,
        created_on: NaiveDate,
    ) -> LedgerResult<Self> {
        let mut transfer = Self::pending(sender, recipient, amount, title, created_on)?;
        transfer.execute(&TransferCommand::Complete { on: created_on })?;
        Ok(transfer)
    }

    pub fn with_id(mut self, id: TransferId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id_typed(&self) -> TransferId {
        self.id
    }

    pub fn sender(&self) -> &Participant {
        &self.sender
    }

    pub fn recipient(&self) -> &Participant {
        &self.recipient
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn created_on(&self) -> NaiveDate {
        self.created_on
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn finalized_on(&self) -> Option<NaiveDate> {
        self.finalized_on
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if !self.amount.is_positive() {
            return Err(LedgerError::invalid_amount(format!(
                "transfer amount must be positive ({})",
                self.amount
            )));
        }
        if self.sender == self.recipient {
            return Err(LedgerError::invalid_format(format!(
                "transfer sender and recipient are both {}",
                self.sender
            )));
        }
        if self.title.trim().is_empty() {
            return Err(LedgerError::invalid_format("transfer title is required"));
        }
        Ok(())
    }

    /// The balance movement of a completed transfer.
    ///
    /// Paying someone makes them owe you that amount back, which cancels out
    /// any debt running the other way.
    pub fn entry(&self) -> Option<LedgerEntry> {
        (self.status == TransferStatus::Completed).then(|| {
            LedgerEntry::new(
                self.recipient.clone(),
                self.sender.clone(),
                self.amount,
                EntrySource::Transfer(self.id),
            )
        })
    }
}

impl AggregateRoot for Transfer {
    type Id = TransferId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// How a pending transfer ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum TransferCommand {
    Complete { on: NaiveDate },
    Fail { on: NaiveDate, reason: Option<String> },
}

/// Event: TransferCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferCompleted {
    pub transfer_id: TransferId,
    pub on: NaiveDate,
}

/// Event: TransferFailed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFailed {
    pub transfer_id: TransferId,
    pub on: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferEvent {
    Completed(TransferCompleted),
    Failed(TransferFailed),
}

impl Event for TransferEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TransferEvent::Completed(_) => "ledger.transfer.completed",
            TransferEvent::Failed(_) => "ledger.transfer.failed",
        }
    }

    fn occurred_on(&self) -> NaiveDate {
        match self {
            TransferEvent::Completed(e) => e.on,
            TransferEvent::Failed(e) => e.on,
        }
    }
}

impl Aggregate for Transfer {
    type Command = TransferCommand;
    type Event = TransferEvent;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TransferEvent::Completed(e) => {
                self.status = TransferStatus::Completed;
                self.finalized_on = Some(e.on);
            }
            TransferEvent::Failed(e) => {
                self.status = TransferStatus::Failed;
                self.finalized_on = Some(e.on);
                self.failure_reason = e.reason.clone();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        if self.status.is_terminal() {
            return Err(LedgerError::invalid_state(format!(
                "transfer {} is already {:?}",
                self.id, self.status
            )));
        }

        let event = match command {
            TransferCommand::Complete { on } => {
                if *on < self.created_on {
                    return Err(LedgerError::invalid_state(
                        "transfer cannot complete before it was created",
                    ));
                }
                TransferEvent::Completed(TransferCompleted {
                    transfer_id: self.id,
                    on: *on,
                })
            }
            TransferCommand::Fail { on, reason } => TransferEvent::Failed(TransferFailed {
                transfer_id: self.id,
                on: *on,
                reason: reason.clone(),
            }),
        };

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitledger_core::Currency;

    fn p(s: &str) -> Participant {
        Participant::new(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn pending() -> Transfer {
        Transfer::pending(
            p("ana"),
            p("bob"),
            Money::from_minor(2500, Currency::USD),
            "Rent share",
            day(1),
        )
        .unwrap()
    }

    #[test]
    fn pending_transfer_has_no_entry() {
        assert!(pending().entry().is_none());
    }

    #[test]
    fn description_survives_json() {
        let transfer = pending().with_description("March rent, second half");
        assert_eq!(transfer.description(), Some("March rent, second half"));

        let json = serde_json::to_value(&transfer).unwrap();
        let back: Transfer = serde_json::from_value(json).unwrap();
        assert_eq!(back.description(), Some("March rent, second half"));
        assert!(pending().description().is_none());
    }

    #[test]
    fn completing_emits_event_and_entry() {
        let mut transfer = pending();
        let events = transfer.execute(&TransferCommand::Complete { on: day(2) }).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "ledger.transfer.completed");
        assert_eq!(transfer.status(), TransferStatus::Completed);
        assert_eq!(transfer.version(), 1);

        let entry = transfer.entry().unwrap();
        assert_eq!(entry.debtor(), &p("bob"));
        assert_eq!(entry.creditor(), &p("ana"));
    }

    #[test]
    fn terminal_transfers_cannot_be_finalized_again() {
        let mut transfer = pending();
        transfer
            .execute(&TransferCommand::Fail {
                on: day(2),
                reason: Some("card declined".into()),
            })
            .unwrap();
        assert_eq!(transfer.failure_reason(), Some("card declined"));

        for cmd in [
            TransferCommand::Complete { on: day(3) },
            TransferCommand::Fail { on: day(3), reason: None },
        ] {
            let err = transfer.execute(&cmd).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidState(_)));
        }
        assert_eq!(transfer.status(), TransferStatus::Failed);
        assert_eq!(transfer.version(), 1);
    }

    #[test]
    fn invalid_transfers_are_rejected() {
        let zero = Transfer::pending(
            p("ana"),
            p("bob"),
            Money::zero(Currency::USD),
            "Nothing",
            day(1),
        );
        assert!(matches!(zero, Err(LedgerError::InvalidAmount(_))));

        let to_self = Transfer::pending(
            p("ana"),
            p("ana"),
            Money::from_minor(1, Currency::USD),
            "Self",
            day(1),
        );
        assert!(matches!(to_self, Err(LedgerError::InvalidFormat(_))));
    }
}
