//! Money borrowed and lent outside the shared-expense ledger.

pub mod loan;

pub use loan::{
    Loan, LoanCommand, LoanEvent, LoanKind, LoanMarkedOverdue, LoanPaidOff, LoanStatus,
    LoanSummary, RepaymentRecorded,
};
