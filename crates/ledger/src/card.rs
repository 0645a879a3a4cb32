use serde::{Deserialize, Serialize};

use splitledger_core::{CardId, Entity, LedgerError, LedgerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Credit,
    Debit,
    /// The owner's wallet; expenses charged here count as cash spending.
    Cash,
}

/// A payment method expenses can be charged to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub last_four: String,
    #[serde(rename = "type")]
    pub kind: CardType,
    pub bank: String,
}

impl Card {
    pub fn new(
        name: impl Into<String>,
        last_four: impl Into<String>,
        kind: CardType,
        bank: impl Into<String>,
    ) -> LedgerResult<Self> {
        let card = Self {
            id: CardId::new(),
            name: name.into(),
            last_four: last_four.into(),
            kind,
            bank: bank.into(),
        };
        card.validate()?;
        Ok(card)
    }

    pub fn with_id(mut self, id: CardId) -> Self {
        self.id = id;
        self
    }

    pub fn is_cash(&self) -> bool {
        self.kind == CardType::Cash
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::invalid_format("card name is required"));
        }
        if self.bank.trim().is_empty() {
            return Err(LedgerError::invalid_format("card bank is required"));
        }
        if self.last_four.len() != 4 || !self.last_four.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LedgerError::invalid_format(format!(
                "card last four must be exactly 4 digits, got {:?}",
                self.last_four
            )));
        }
        Ok(())
    }
}

impl Entity for Card {
    type Id = CardId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
