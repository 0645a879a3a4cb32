use serde::{Deserialize, Serialize};

use splitledger_core::{ExpenseId, Money, Participant, TransferId};

/// What produced a ledger entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntrySource {
    Expense(ExpenseId),
    Transfer(TransferId),
}

impl core::fmt::Display for EntrySource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntrySource::Expense(id) => write!(f, "expense:{id}"),
            EntrySource::Transfer(id) => write!(f, "transfer:{id}"),
        }
    }
}

/// One immutable obligation: `debtor` owes `creditor` a positive `amount`.
///
/// Entries are derived from shared expenses and completed transfers. A
/// correction is a second entry with the roles swapped and `reversal` set,
/// never an edit of the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    debtor: Participant,
    creditor: Participant,
    amount: Money,
    source: EntrySource,
    #[serde(default)]
    reversal: bool,
}

impl LedgerEntry {
    pub(crate) fn new(
        debtor: Participant,
        creditor: Participant,
        amount: Money,
        source: EntrySource,
    ) -> Self {
        Self {
            debtor,
            creditor,
            amount,
            source,
            reversal: false,
        }
    }

    /// Entry cancelling this one out.
    pub(crate) fn offsetting(&self) -> Self {
        Self {
            debtor: self.creditor.clone(),
            creditor: self.debtor.clone(),
            amount: self.amount,
            source: self.source,
            reversal: true,
        }
    }

    pub fn debtor(&self) -> &Participant {
        &self.debtor
    }

    pub fn creditor(&self) -> &Participant {
        &self.creditor
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn source(&self) -> EntrySource {
        self.source
    }

    pub fn is_reversal(&self) -> bool {
        self.reversal
    }

    pub fn involves(&self, participant: &Participant) -> bool {
        &self.debtor == participant || &self.creditor == participant
    }

    /// Signed effect of this entry on what `counterparty` owes `viewer`.
    ///
    /// Positive when the counterparty is the debtor, negative when the viewer
    /// is, `None` when the entry is not between the two.
    pub fn signed_delta(&self, viewer: &Participant, counterparty: &Participant) -> Option<Money> {
        if &self.debtor == counterparty && &self.creditor == viewer {
            Some(self.amount)
        } else if &self.debtor == viewer && &self.creditor == counterparty {
            Some(Money::from_minor(-self.amount.minor(), self.amount.currency()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitledger_core::Currency;

    fn p(s: &str) -> Participant {
        Participant::new(s).unwrap()
    }

    #[test]
    fn signed_delta_follows_owner_perspective() {
        let entry = LedgerEntry::new(
            p("bob"),
            p("ana"),
            Money::from_minor(250, Currency::USD),
            EntrySource::Expense(ExpenseId::new()),
        );

        assert_eq!(entry.signed_delta(&p("ana"), &p("bob")).unwrap().minor(), 250);
        assert_eq!(entry.signed_delta(&p("bob"), &p("ana")).unwrap().minor(), -250);
        assert!(entry.signed_delta(&p("ana"), &p("carl")).is_none());
    }

    #[test]
    fn offsetting_entry_swaps_roles() {
        let entry = LedgerEntry::new(
            p("bob"),
            p("ana"),
            Money::from_minor(90, Currency::USD),
            EntrySource::Transfer(TransferId::new()),
        );
        let offset = entry.offsetting();

        assert!(offset.is_reversal());
        assert_eq!(offset.source(), entry.source());
        assert_eq!(offset.debtor(), entry.creditor());
        let sum = entry.signed_delta(&p("ana"), &p("bob")).unwrap().minor()
            + offset.signed_delta(&p("ana"), &p("bob")).unwrap().minor();
        assert_eq!(sum, 0);
    }
}
