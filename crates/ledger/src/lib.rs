//! Shared-expense splitting and per-counterparty balances.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Callers
//! persist expenses and transfers themselves and replay them into a
//! [`SplitLedger`].

pub mod card;
pub mod entry;
pub mod expense;
pub mod ledger;
pub mod split;
pub mod summary;
pub mod transfer;

pub use card::{Card, CardType};
pub use entry::{EntrySource, LedgerEntry};
pub use expense::{Expense, SharedStatus};
pub use ledger::{SplitLedger, TransferOutcome};
pub use split::{PercentShare, Share, SplitRule};
pub use summary::{ExpenseSummary, TransferSummary};
pub use transfer::{
    Transfer, TransferCommand, TransferCompleted, TransferEvent, TransferFailed, TransferStatus,
};
