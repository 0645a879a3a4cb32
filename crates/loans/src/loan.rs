use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use splitledger_core::{
    Aggregate, AggregateRoot, Currency, Event, LedgerError, LedgerResult, LoanId, Money,
    Participant,
};

/// Which side of the loan the ledger owner is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanKind {
    /// The owner owes the money.
    Borrowed,
    /// The owner is owed the money.
    Lent,
}

/// Loan lifecycle: `Active -> Overdue -> Paid`, or straight `Active -> Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Overdue,
    Paid,
}

impl LoanStatus {
    /// Still has money outstanding.
    pub fn is_outstanding(self) -> bool {
        !matches!(self, LoanStatus::Paid)
    }
}

/// Aggregate root: money borrowed from or lent to someone, repaid over time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    kind: LoanKind,
    title: String,
    #[serde(default)]
    counterparty: Option<Participant>,
    amount: Money,
    remaining: Money,
    /// Annual interest in basis points (1% = 100). Informational only.
    #[serde(default)]
    interest_bps: u32,
    start_date: NaiveDate,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    status: LoanStatus,
    #[serde(default, skip_serializing)]
    version: u64,
}

impl Loan {
    pub fn open(
        kind: LoanKind,
        title: impl Into<String>,
        amount: Money,
        interest_bps: u32,
        start_date: NaiveDate,
    ) -> LedgerResult<Self> {
        let loan = Self {
            id: LoanId::new(),
            kind,
            title: title.into(),
            counterparty: None,
            amount,
            remaining: amount,
            interest_bps,
            start_date,
            due_date: None,
            status: LoanStatus::Active,
            version: 0,
        };
        loan.validate()?;
        Ok(loan)
    }

    pub fn with_id(mut self, id: LoanId) -> Self {
        self.id = id;
        self
    }

    pub fn with_counterparty(mut self, counterparty: Participant) -> Self {
        self.counterparty = Some(counterparty);
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> LedgerResult<Self> {
        self.due_date = Some(due_date);
        self.validate()?;
        Ok(self)
    }

    pub fn id_typed(&self) -> LoanId {
        self.id
    }

    pub fn kind(&self) -> LoanKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn counterparty(&self) -> Option<&Participant> {
        self.counterparty.as_ref()
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn remaining(&self) -> Money {
        self.remaining
    }

    pub fn interest_bps(&self) -> u32 {
        self.interest_bps
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn status(&self) -> LoanStatus {
        self.status
    }

    /// Share of the principal already repaid, 0..=100, truncated.
    pub fn progress_percent(&self) -> u32 {
        let amount = i128::from(self.amount.minor());
        if amount <= 0 {
            return 0;
        }
        let repaid = amount - i128::from(self.remaining.minor());
        u32::try_from(repaid * 100 / amount).unwrap_or(0)
    }

    /// Checks a loan, including one deserialized from a journal.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.title.trim().is_empty() {
            return Err(LedgerError::invalid_format("loan title is required"));
        }
        if !self.amount.is_positive() {
            return Err(LedgerError::invalid_amount(format!(
                "loan amount must be positive ({})",
                self.amount
            )));
        }
        if self.remaining.currency() != self.amount.currency() {
            return Err(LedgerError::currency_mismatch(
                self.amount.currency().code(),
                self.remaining.currency().code(),
            ));
        }
        if self.remaining.is_negative() || self.remaining.minor() > self.amount.minor() {
            return Err(LedgerError::invalid_amount(format!(
                "remaining {} is outside 0..={}",
                self.remaining, self.amount
            )));
        }
        if self.remaining.is_zero() != (self.status == LoanStatus::Paid) {
            return Err(LedgerError::invalid_state(format!(
                "loan {} is {:?} with {} remaining",
                self.title, self.status, self.remaining
            )));
        }
        if let Some(due) = self.due_date {
            if due < self.start_date {
                return Err(LedgerError::invalid_format(format!(
                    "due date {due} is before start date {}",
                    self.start_date
                )));
            }
        }
        Ok(())
    }
}

impl AggregateRoot for Loan {
    type Id = LoanId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LoanCommand {
    RecordRepayment { amount: Money, paid_on: NaiveDate },
    MarkOverdue { as_of: NaiveDate },
}

/// Event: RepaymentRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentRecorded {
    pub loan_id: LoanId,
    pub amount: Money,
    pub remaining: Money,
    pub paid_on: NaiveDate,
}

/// Event: LoanPaidOff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPaidOff {
    pub loan_id: LoanId,
    pub on: NaiveDate,
}

/// Event: LoanMarkedOverdue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanMarkedOverdue {
    pub loan_id: LoanId,
    pub as_of: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanEvent {
    RepaymentRecorded(RepaymentRecorded),
    PaidOff(LoanPaidOff),
    MarkedOverdue(LoanMarkedOverdue),
}

impl Event for LoanEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LoanEvent::RepaymentRecorded(_) => "loans.loan.repayment_recorded",
            LoanEvent::PaidOff(_) => "loans.loan.paid_off",
            LoanEvent::MarkedOverdue(_) => "loans.loan.marked_overdue",
        }
    }

    fn occurred_on(&self) -> NaiveDate {
        match self {
            LoanEvent::RepaymentRecorded(e) => e.paid_on,
            LoanEvent::PaidOff(e) => e.on,
            LoanEvent::MarkedOverdue(e) => e.as_of,
        }
    }
}

impl Aggregate for Loan {
    type Command = LoanCommand;
    type Event = LoanEvent;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LoanEvent::RepaymentRecorded(e) => {
                self.remaining = e.remaining;
            }
            LoanEvent::PaidOff(_) => {
                self.status = LoanStatus::Paid;
            }
            LoanEvent::MarkedOverdue(_) => {
                self.status = LoanStatus::Overdue;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LoanCommand::RecordRepayment { amount, paid_on } => {
                if self.status == LoanStatus::Paid {
                    return Err(LedgerError::invalid_state(format!(
                        "loan {} is already paid off",
                        self.title
                    )));
                }
                if !amount.is_positive() {
                    return Err(LedgerError::invalid_amount(format!(
                        "repayment must be positive ({amount})"
                    )));
                }
                let remaining = self.remaining.subtract(*amount)?;
                if remaining.is_negative() {
                    return Err(LedgerError::invalid_amount(format!(
                        "repayment {amount} exceeds remaining {}",
                        self.remaining
                    )));
                }

                let mut events = vec![LoanEvent::RepaymentRecorded(RepaymentRecorded {
                    loan_id: self.id,
                    amount: *amount,
                    remaining,
                    paid_on: *paid_on,
                })];
                if remaining.is_zero() {
                    events.push(LoanEvent::PaidOff(LoanPaidOff {
                        loan_id: self.id,
                        on: *paid_on,
                    }));
                }
                Ok(events)
            }
            LoanCommand::MarkOverdue { as_of } => {
                if self.status != LoanStatus::Active {
                    return Err(LedgerError::invalid_state(format!(
                        "only active loans can become overdue (loan {} is {:?})",
                        self.title, self.status
                    )));
                }
                match self.due_date {
                    Some(due) if *as_of > due => {
                        Ok(vec![LoanEvent::MarkedOverdue(LoanMarkedOverdue {
                            loan_id: self.id,
                            as_of: *as_of,
                        })])
                    }
                    Some(due) => Err(LedgerError::invalid_state(format!(
                        "loan {} is not due until {due}",
                        self.title
                    ))),
                    None => Err(LedgerError::invalid_state(format!(
                        "loan {} has no due date",
                        self.title
                    ))),
                }
            }
        }
    }
}

/// Outstanding totals across a set of loans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanSummary {
    /// What the owner still owes.
    pub borrowed_outstanding: Money,
    /// What others still owe the owner.
    pub lent_outstanding: Money,
    pub active_count: usize,
    pub overdue_count: usize,
}

impl LoanSummary {
    pub fn from_loans<'a, I>(loans: I, currency: Currency) -> LedgerResult<Self>
    where
        I: IntoIterator<Item = &'a Loan>,
    {
        let mut summary = Self {
            borrowed_outstanding: Money::zero(currency),
            lent_outstanding: Money::zero(currency),
            active_count: 0,
            overdue_count: 0,
        };

        for loan in loans.into_iter().filter(|l| l.status.is_outstanding()) {
            match loan.kind {
                LoanKind::Borrowed => {
                    summary.borrowed_outstanding =
                        summary.borrowed_outstanding.add(loan.remaining)?;
                }
                LoanKind::Lent => {
                    summary.lent_outstanding = summary.lent_outstanding.add(loan.remaining)?;
                }
            }
            match loan.status {
                LoanStatus::Overdue => summary.overdue_count += 1,
                _ => summary.active_count += 1,
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::USD)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn car_loan() -> Loan {
        Loan::open(LoanKind::Borrowed, "Car", usd(100_000), 450, date(2024, 1, 1))
            .unwrap()
            .with_due_date(date(2024, 12, 31))
            .unwrap()
    }

    fn repay(amount: i64, day: u32) -> LoanCommand {
        LoanCommand::RecordRepayment {
            amount: usd(amount),
            paid_on: date(2024, 6, day),
        }
    }

    #[test]
    fn open_starts_with_full_remaining() {
        let loan = car_loan();
        assert_eq!(loan.remaining(), usd(100_000));
        assert_eq!(loan.status(), LoanStatus::Active);
        assert_eq!(loan.progress_percent(), 0);
        assert_eq!(loan.version(), 0);
    }

    #[test]
    fn open_rejects_bad_input() {
        let zero = Loan::open(LoanKind::Lent, "Nothing", usd(0), 0, date(2024, 1, 1));
        assert!(matches!(zero, Err(LedgerError::InvalidAmount(_))));

        let backwards = Loan::open(LoanKind::Lent, "Backwards", usd(500), 0, date(2024, 5, 1))
            .unwrap()
            .with_due_date(date(2024, 4, 1));
        assert!(matches!(backwards, Err(LedgerError::InvalidFormat(_))));
    }

    #[test]
    fn repayments_reduce_remaining_until_paid() {
        let mut loan = car_loan();

        let events = loan.execute(&repay(25_000, 1)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(loan.remaining(), usd(75_000));
        assert_eq!(loan.progress_percent(), 25);

        let events = loan.execute(&repay(75_000, 2)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type(), "loans.loan.paid_off");
        assert_eq!(loan.status(), LoanStatus::Paid);
        assert_eq!(loan.progress_percent(), 100);
        assert_eq!(loan.version(), 3);

        let err = loan.execute(&repay(1, 3)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)));
    }

    #[test]
    fn overpayment_leaves_loan_untouched() {
        let mut loan = car_loan();
        let err = loan.execute(&repay(100_001, 1)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        assert_eq!(loan.remaining(), usd(100_000));
        assert_eq!(loan.version(), 0);

        let err = loan.execute(&repay(0, 1)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn repayment_in_other_currency_is_rejected() {
        let mut loan = car_loan();
        let err = loan
            .execute(&LoanCommand::RecordRepayment {
                amount: Money::from_minor(100, Currency::EUR),
                paid_on: date(2024, 6, 1),
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::CurrencyMismatch { .. }));
    }

    #[test]
    fn overdue_requires_passed_due_date() {
        let mut loan = car_loan();
        let early = loan.execute(&LoanCommand::MarkOverdue { as_of: date(2024, 12, 31) });
        assert!(matches!(early, Err(LedgerError::InvalidState(_))));

        loan.execute(&LoanCommand::MarkOverdue { as_of: date(2025, 1, 1) })
            .unwrap();
        assert_eq!(loan.status(), LoanStatus::Overdue);

        let again = loan.execute(&LoanCommand::MarkOverdue { as_of: date(2025, 2, 1) });
        assert!(matches!(again, Err(LedgerError::InvalidState(_))));

        // Overdue loans can still be repaid.
        loan.execute(&LoanCommand::RecordRepayment {
            amount: usd(100_000),
            paid_on: date(2025, 2, 1),
        })
        .unwrap();
        assert_eq!(loan.status(), LoanStatus::Paid);
    }

    #[test]
    fn loan_without_due_date_never_goes_overdue() {
        let mut loan = Loan::open(LoanKind::Lent, "Friend", usd(5_000), 0, date(2024, 1, 1)).unwrap();
        let err = loan
            .execute(&LoanCommand::MarkOverdue { as_of: date(2030, 1, 1) })
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)));
    }

    #[test]
    fn summary_counts_active_and_overdue_outstanding() {
        let mut overdue = car_loan();
        overdue
            .execute(&LoanCommand::MarkOverdue { as_of: date(2025, 1, 1) })
            .unwrap();

        let lent = Loan::open(LoanKind::Lent, "Sis", usd(20_000), 0, date(2024, 3, 1))
            .unwrap()
            .with_counterparty(Participant::new("sis@example.com").unwrap());

        let mut paid = Loan::open(LoanKind::Borrowed, "Phone", usd(9_000), 0, date(2024, 1, 1)).unwrap();
        paid.execute(&repay(9_000, 1)).unwrap();

        let loans = vec![overdue, lent, paid];
        let summary = LoanSummary::from_loans(&loans, Currency::USD).unwrap();
        assert_eq!(summary.borrowed_outstanding, usd(100_000));
        assert_eq!(summary.lent_outstanding, usd(20_000));
        assert_eq!(summary.active_count, 1);
        assert_eq!(summary.overdue_count, 1);
    }

    #[test]
    fn inconsistent_journal_loan_fails_validation() {
        let json = r#"{
            "id": "0190f5a0-0000-7000-8000-0000000000aa",
            "kind": "lent",
            "title": "Bike",
            "amount": { "minor": 1000, "currency": "USD" },
            "remaining": { "minor": 0, "currency": "USD" },
            "start_date": "2024-01-01",
            "status": "active"
        }"#;
        let loan: Loan = serde_json::from_str(json).unwrap();
        assert!(matches!(loan.validate(), Err(LedgerError::InvalidState(_))));
    }

    proptest! {
        #[test]
        fn repayments_never_overshoot(
            principal in 1i64..1_000_000,
            payments in prop::collection::vec(1i64..200_000, 0..20),
        ) {
            let mut loan =
                Loan::open(LoanKind::Borrowed, "Any", usd(principal), 0, date(2024, 1, 1)).unwrap();
            let mut accepted = 0i64;
            for amount in payments {
                if loan.execute(&repay(amount, 1)).is_ok() {
                    accepted += amount;
                }
            }

            prop_assert_eq!(loan.remaining(), usd(principal - accepted));
            prop_assert!(!loan.remaining().is_negative());
            prop_assert!(loan.progress_percent() <= 100);
            prop_assert_eq!(loan.status() == LoanStatus::Paid, accepted == principal);
        }
    }
}
