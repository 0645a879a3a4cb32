//! `splitledger-core`: value types and building blocks shared by every ledger crate.
//!
//! Pure domain primitives only: no IO, no persistence.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::{Entity, find_by_id, find_by_id_mut};
pub use error::{LedgerError, LedgerResult};
pub use event::Event;
pub use id::{CardId, ExpenseId, LoanId, Participant, SubscriptionId, TransferId};
pub use money::{Currency, Money};
pub use value_object::ValueObject;
