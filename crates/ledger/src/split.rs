//! Split rules: turning one expense total into per-participant shares.
//!
//! All arithmetic is in integer minor units. Whatever integer division leaves
//! over is handed out one minor unit at a time to the first participants in the
//! order the caller listed them, so shares always add up to the total exactly.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use splitledger_core::{LedgerError, LedgerResult, Money, Participant};

use crate::entry::{EntrySource, LedgerEntry};

/// A participant's portion of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub participant: Participant,
    pub amount: Money,
}

impl Share {
    pub fn new(participant: Participant, amount: Money) -> Self {
        Self {
            participant,
            amount,
        }
    }
}

/// A participant's whole-number percentage of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentShare {
    pub participant: Participant,
    pub percent: u32,
}

impl PercentShare {
    pub fn new(participant: Participant, percent: u32) -> Self {
        Self {
            participant,
            percent,
        }
    }
}

/// Policy dividing a shared expense among participants.
///
/// Participant order matters: it decides who absorbs leftover minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitRule {
    Equal { participants: Vec<Participant> },
    Percentage { shares: Vec<PercentShare> },
    Fixed { shares: Vec<Share> },
}

impl SplitRule {
    pub fn equal(participants: Vec<Participant>) -> LedgerResult<Self> {
        let rule = SplitRule::Equal { participants };
        rule.validate()?;
        Ok(rule)
    }

    /// Percentages must add up to exactly 100.
    pub fn percentage(shares: Vec<PercentShare>) -> LedgerResult<Self> {
        let rule = SplitRule::Percentage { shares };
        rule.validate()?;
        Ok(rule)
    }

    /// Fixed amounts are checked against the expense total when applied.
    pub fn fixed(shares: Vec<Share>) -> LedgerResult<Self> {
        let rule = SplitRule::Fixed { shares };
        rule.validate()?;
        Ok(rule)
    }

    pub fn participants(&self) -> Vec<&Participant> {
        match self {
            SplitRule::Equal { participants } => participants.iter().collect(),
            SplitRule::Percentage { shares } => shares.iter().map(|s| &s.participant).collect(),
            SplitRule::Fixed { shares } => shares.iter().map(|s| &s.participant).collect(),
        }
    }

    pub fn participant_count(&self) -> usize {
        match self {
            SplitRule::Equal { participants } => participants.len(),
            SplitRule::Percentage { shares } => shares.len(),
            SplitRule::Fixed { shares } => shares.len(),
        }
    }

    /// Structural checks that do not depend on the expense total.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.participant_count() == 0 {
            return Err(LedgerError::invalid_split("split needs at least one participant"));
        }

        let mut seen = HashSet::new();
        for participant in self.participants() {
            if !seen.insert(participant) {
                return Err(LedgerError::invalid_split(format!(
                    "participant {participant} listed more than once"
                )));
            }
        }

        match self {
            SplitRule::Equal { .. } => Ok(()),
            SplitRule::Percentage { shares } => {
                let sum: u64 = shares.iter().map(|s| u64::from(s.percent)).sum();
                if sum != 100 {
                    return Err(LedgerError::invalid_split(format!(
                        "percentages sum to {sum}, expected 100"
                    )));
                }
                Ok(())
            }
            SplitRule::Fixed { shares } => {
                let currency = shares[0].amount.currency();
                for share in shares {
                    if share.amount.currency() != currency {
                        return Err(LedgerError::invalid_split(format!(
                            "fixed shares mix {} and {}",
                            currency,
                            share.amount.currency()
                        )));
                    }
                    if share.amount.is_negative() {
                        return Err(LedgerError::invalid_split(format!(
                            "fixed share for {} is negative",
                            share.participant
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    /// Every participant's share of `total`, in caller order, payer included.
    pub fn shares(&self, total: Money) -> LedgerResult<Vec<Share>> {
        self.validate()?;
        if total.is_negative() {
            return Err(LedgerError::invalid_split(format!(
                "cannot split a negative total ({total})"
            )));
        }

        let currency = total.currency();
        match self {
            SplitRule::Equal { participants } => {
                let count = i64::try_from(participants.len()).map_err(|_| LedgerError::Overflow)?;
                let base = total.minor() / count;
                let mut amounts = vec![base; participants.len()];
                distribute_remainder(&mut amounts, total.minor() % count, |_| true);

                Ok(participants
                    .iter()
                    .zip(amounts)
                    .map(|(p, minor)| Share::new(p.clone(), Money::from_minor(minor, currency)))
                    .collect())
            }
            SplitRule::Percentage { shares } => {
                let mut amounts = Vec::with_capacity(shares.len());
                for share in shares {
                    let minor = i128::from(total.minor()) * i128::from(share.percent) / 100;
                    amounts.push(i64::try_from(minor).map_err(|_| LedgerError::Overflow)?);
                }
                let allocated: i64 = amounts.iter().sum();
                // Zero-percent participants never absorb leftovers.
                distribute_remainder(&mut amounts, total.minor() - allocated, |i| {
                    shares[i].percent > 0
                });

                Ok(shares
                    .iter()
                    .zip(amounts)
                    .map(|(s, minor)| {
                        Share::new(s.participant.clone(), Money::from_minor(minor, currency))
                    })
                    .collect())
            }
            SplitRule::Fixed { shares } => {
                if let Some(foreign) = shares.iter().find(|s| s.amount.currency() != currency) {
                    return Err(LedgerError::invalid_split(format!(
                        "fixed share for {} is in {}, expense total is in {}",
                        foreign.participant,
                        foreign.amount.currency(),
                        currency
                    )));
                }
                let sum = Money::sum(currency, shares.iter().map(|s| s.amount))?;
                if sum != total {
                    return Err(LedgerError::invalid_split(format!(
                        "fixed shares sum to {sum}, expense total is {total}"
                    )));
                }
                Ok(shares.clone())
            }
        }
    }

    /// Ledger entries produced by splitting `total` paid by `payer`.
    ///
    /// One entry per non-payer participant with a positive share; the payer
    /// never owes themselves. A zero total owes nothing.
    pub fn apply(
        &self,
        total: Money,
        payer: &Participant,
        source: EntrySource,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        self.validate()?;
        if total.is_zero() {
            return Ok(Vec::new());
        }

        Ok(self
            .shares(total)?
            .into_iter()
            .filter(|share| &share.participant != payer && share.amount.is_positive())
            .map(|share| LedgerEntry::new(share.participant, payer.clone(), share.amount, source))
            .collect())
    }
}

/// Hand `remainder` minor units out one at a time, front to back, to the
/// positions accepted by `eligible`.
fn distribute_remainder(amounts: &mut [i64], remainder: i64, eligible: impl Fn(usize) -> bool) {
    let mut left = remainder;
    for (i, amount) in amounts.iter_mut().enumerate() {
        if left <= 0 {
            break;
        }
        if eligible(i) {
            *amount += 1;
            left -= 1;
        }
    }
}
