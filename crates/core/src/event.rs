use chrono::NaiveDate;

/// A lifecycle fact emitted by an aggregate.
///
/// Events are immutable and designed to be appended, never edited.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "ledger.transfer.completed").
    fn event_type(&self) -> &'static str;

    /// Business date the event refers to.
    fn occurred_on(&self) -> NaiveDate;
}
