use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use splitledger_core::{
    Currency, Entity, LedgerError, LedgerResult, Money, SubscriptionId,
};

/// How often a subscription charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Whole months per period, `None` for weekly billing.
    fn months(self) -> Option<u32> {
        match self {
            Frequency::Weekly => None,
            Frequency::Monthly => Some(1),
            Frequency::Quarterly => Some(3),
            Frequency::Yearly => Some(12),
        }
    }

    /// `amount` charged once per period, expressed per month.
    ///
    /// Weekly charges use 52 weeks / 12 months. Results truncate toward zero.
    pub fn monthly_equivalent(self, amount: Money) -> LedgerResult<Money> {
        let minor = i128::from(amount.minor());
        let monthly = match self {
            Frequency::Weekly => minor * 52 / 12,
            Frequency::Monthly => minor,
            Frequency::Quarterly => minor / 3,
            Frequency::Yearly => minor / 12,
        };
        let monthly = i64::try_from(monthly).map_err(|_| LedgerError::Overflow)?;
        Ok(Money::from_minor(monthly, amount.currency()))
    }
}

/// A recurring charge such as a streaming service or gym membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Money,
    pub frequency: Frequency,
    pub next_payment: NaiveDate,
    /// Day of month the charge is anchored to; short months clamp to their last day.
    pub billing_day: u32,
    pub active: bool,
    pub category: String,
}

impl Subscription {
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        frequency: Frequency,
        next_payment: NaiveDate,
        category: impl Into<String>,
    ) -> LedgerResult<Self> {
        let subscription = Self {
            id: SubscriptionId::new(),
            name: name.into(),
            description: None,
            amount,
            frequency,
            next_payment,
            billing_day: next_payment.day(),
            active: true,
            category: category.into(),
        };
        subscription.validate()?;
        Ok(subscription)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::invalid_format("subscription name is required"));
        }
        if self.category.trim().is_empty() {
            return Err(LedgerError::invalid_format("subscription category is required"));
        }
        if !self.amount.is_positive() {
            return Err(LedgerError::invalid_amount(format!(
                "subscription amount must be positive ({})",
                self.amount
            )));
        }
        if !(1..=31).contains(&self.billing_day) {
            return Err(LedgerError::invalid_format(format!(
                "billing day {} is not a day of the month",
                self.billing_day
            )));
        }
        Ok(())
    }

    pub fn monthly_equivalent(&self) -> LedgerResult<Money> {
        self.frequency.monthly_equivalent(self.amount)
    }

    /// Payment date one period after `from`.
    fn following(&self, from: NaiveDate) -> LedgerResult<NaiveDate> {
        let out_of_range = || LedgerError::invalid_state("payment date out of range");
        match self.frequency.months() {
            None => from.checked_add_days(Days::new(7)).ok_or_else(out_of_range),
            Some(months) => {
                let shifted = from
                    .checked_add_months(Months::new(months))
                    .ok_or_else(out_of_range)?;
                clamp_to_day(shifted, self.billing_day).ok_or_else(out_of_range)
            }
        }
    }

    /// Move the next payment forward by one period (after a charge went through).
    pub fn advance(&mut self) -> LedgerResult<NaiveDate> {
        self.next_payment = self.following(self.next_payment)?;
        Ok(self.next_payment)
    }

    /// First scheduled payment on or after `today`.
    pub fn next_payment_on_or_after(&self, today: NaiveDate) -> LedgerResult<NaiveDate> {
        let mut date = self.next_payment;
        while date < today {
            date = self.following(date)?;
        }
        Ok(date)
    }

    /// Signed number of days from `today` until the stored next payment.
    pub fn days_until_next_payment(&self, today: NaiveDate) -> i64 {
        (self.next_payment - today).num_days()
    }

    /// Active and charging within the next `window_days` days (today included).
    pub fn is_due_soon(&self, today: NaiveDate, window_days: i64) -> bool {
        let days = self.days_until_next_payment(today);
        self.active && (0..=window_days).contains(&days)
    }

    /// Next charge falling within `window_days` of `today`, rolling a stale
    /// `next_payment` forward first. `None` for paused subscriptions.
    pub fn upcoming_within(
        &self,
        today: NaiveDate,
        window_days: i64,
    ) -> LedgerResult<Option<NaiveDate>> {
        if !self.active {
            return Ok(None);
        }
        let next = self.next_payment_on_or_after(today)?;
        Ok(((next - today).num_days() <= window_days).then_some(next))
    }

    pub fn pause(&mut self) -> LedgerResult<()> {
        if !self.active {
            return Err(LedgerError::invalid_state(format!(
                "subscription {} is already paused",
                self.name
            )));
        }
        self.active = false;
        Ok(())
    }

    pub fn resume(&mut self) -> LedgerResult<()> {
        if self.active {
            return Err(LedgerError::invalid_state(format!(
                "subscription {} is already active",
                self.name
            )));
        }
        self.active = true;
        Ok(())
    }
}

impl Entity for Subscription {
    type Id = SubscriptionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// `date` moved to `day` within its month, or the month's last day if shorter.
fn clamp_to_day(date: NaiveDate, day: u32) -> Option<NaiveDate> {
    (28..=day.max(28))
        .rev()
        .map(|d| d.min(day))
        .find_map(|d| NaiveDate::from_ymd_opt(date.year(), date.month(), d))
}

/// Sum of monthly equivalents over active subscriptions.
pub fn monthly_total<'a, I>(subscriptions: I, currency: Currency) -> LedgerResult<Money>
where
    I: IntoIterator<Item = &'a Subscription>,
{
    subscriptions
        .into_iter()
        .filter(|s| s.active)
        .try_fold(Money::zero(currency), |acc, s| acc.add(s.monthly_equivalent()?))
}
