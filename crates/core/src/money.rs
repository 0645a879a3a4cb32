//! Money and currency value objects.
//!
//! Amounts are signed integers of **minor units** (e.g. cents) tagged with a
//! [`Currency`]. Arithmetic between two amounts requires equal currencies and
//! never converts implicitly.

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::value_object::ValueObject;

const MAX_MINOR_UNITS: u8 = 6;

/// ISO-style currency: a three-letter code plus its fractional-digit count.
///
/// `minor_units` is how many decimal digits separate major from minor units:
/// USD has 2, so `10.50 USD` is stored as `1050`; JPY has 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "CurrencyRepr", into = "CurrencyRepr")]
pub struct Currency {
    code: [u8; 3],
    minor_units: u8,
}

impl Currency {
    pub const USD: Currency = Currency::known(*b"USD", 2);
    pub const EUR: Currency = Currency::known(*b"EUR", 2);
    pub const GBP: Currency = Currency::known(*b"GBP", 2);
    pub const ARS: Currency = Currency::known(*b"ARS", 2);
    pub const JPY: Currency = Currency::known(*b"JPY", 0);

    const KNOWN: [Currency; 5] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::ARS,
        Currency::JPY,
    ];

    const fn known(code: [u8; 3], minor_units: u8) -> Self {
        Self { code, minor_units }
    }

    /// Build a currency that is not in the built-in table.
    ///
    /// The code must be three ASCII letters (normalized to uppercase) and
    /// `minor_units` at most 6.
    pub fn new(code: &str, minor_units: u8) -> LedgerResult<Self> {
        let bytes = code.trim().as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(LedgerError::invalid_format(format!(
                "currency code must be three letters, got {code:?}"
            )));
        }
        if minor_units > MAX_MINOR_UNITS {
            return Err(LedgerError::invalid_format(format!(
                "currency {code} has too many minor units ({minor_units})"
            )));
        }
        let mut normalized = [0u8; 3];
        for (dst, src) in normalized.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self {
            code: normalized,
            minor_units,
        })
    }

    /// Look up a built-in currency by code (case-insensitive).
    pub fn from_code(code: &str) -> LedgerResult<Self> {
        let wanted = code.trim().to_ascii_uppercase();
        Self::KNOWN
            .into_iter()
            .find(|c| c.code() == wanted)
            .ok_or_else(|| LedgerError::invalid_format(format!("unknown currency: {code}")))
    }

    pub fn code(&self) -> &str {
        // Construction only admits ASCII letters.
        core::str::from_utf8(&self.code).unwrap_or("???")
    }

    pub fn minor_units(&self) -> u8 {
        self.minor_units
    }

    fn scale(&self) -> i64 {
        10i64.pow(u32::from(self.minor_units))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl ValueObject for Currency {}

/// Wire form: a bare code for built-in currencies, an object otherwise.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CurrencyRepr {
    Code(String),
    Custom { code: String, minor_units: u8 },
}

impl TryFrom<CurrencyRepr> for Currency {
    type Error = LedgerError;

    fn try_from(value: CurrencyRepr) -> Result<Self, Self::Error> {
        match value {
            CurrencyRepr::Code(code) => Currency::from_code(&code),
            CurrencyRepr::Custom { code, minor_units } => Currency::new(&code, minor_units),
        }
    }
}

impl From<Currency> for CurrencyRepr {
    fn from(value: Currency) -> Self {
        match Currency::from_code(value.code()) {
            Ok(known) if known == value => CurrencyRepr::Code(value.code().to_string()),
            _ => CurrencyRepr::Custom {
                code: value.code().to_string(),
                minor_units: value.minor_units,
            },
        }
    }
}

/// Signed amount of minor units in a given currency.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl ValueObject for Money {}

impl Money {
    pub const fn from_minor(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    pub const fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    pub fn minor(&self) -> i64 {
        self.minor
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    pub fn is_negative(&self) -> bool {
        self.minor < 0
    }

    fn ensure_same_currency(&self, other: &Money) -> LedgerResult<()> {
        if self.currency != other.currency {
            return Err(LedgerError::currency_mismatch(
                self.currency.code(),
                other.currency.code(),
            ));
        }
        Ok(())
    }

    pub fn add(self, other: Money) -> LedgerResult<Money> {
        self.ensure_same_currency(&other)?;
        let minor = self.minor.checked_add(other.minor).ok_or(LedgerError::Overflow)?;
        Ok(Money::from_minor(minor, self.currency))
    }

    pub fn subtract(self, other: Money) -> LedgerResult<Money> {
        self.ensure_same_currency(&other)?;
        let minor = self.minor.checked_sub(other.minor).ok_or(LedgerError::Overflow)?;
        Ok(Money::from_minor(minor, self.currency))
    }

    pub fn negate(self) -> LedgerResult<Money> {
        let minor = self.minor.checked_neg().ok_or(LedgerError::Overflow)?;
        Ok(Money::from_minor(minor, self.currency))
    }

    pub fn compare(&self, other: &Money) -> LedgerResult<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.minor.cmp(&other.minor))
    }

    /// Sum of `amounts`, all of which must be in `currency`.
    pub fn sum<I>(currency: Currency, amounts: I) -> LedgerResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.add(m))
    }

    /// Parse a human decimal string (`"12.34"`, `"-0.5"`, `"10,50"`) into minor units.
    ///
    /// Rejects empty or non-numeric input and more fractional digits than the
    /// currency allows. Never rounds.
    pub fn from_decimal_str(input: &str, currency: Currency) -> LedgerResult<Money> {
        let invalid = || LedgerError::invalid_format(format!("invalid amount: {input:?}"));

        let trimmed = input.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        if rest.is_empty() {
            return Err(invalid());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let whole = parts.next().ok_or_else(invalid)?;
        let frac = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let whole: i64 = whole.parse().map_err(|_| LedgerError::Overflow)?;

        let digits = usize::from(currency.minor_units());
        let frac_minor: i64 = match frac {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                if frac.len() > digits {
                    return Err(LedgerError::invalid_format(format!(
                        "{input:?} has more than {digits} decimals for {currency}"
                    )));
                }
                let padded = format!("{frac:0<digits$}");
                padded.parse().map_err(|_| invalid())?
            }
        };

        let magnitude = whole
            .checked_mul(currency.scale())
            .and_then(|v| v.checked_add(frac_minor))
            .ok_or(LedgerError::Overflow)?;

        Ok(Money::from_minor(
            if negative { -magnitude } else { magnitude },
            currency,
        ))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.unsigned_abs();
        let digits = usize::from(self.currency.minor_units());
        if digits == 0 {
            return write!(f, "{sign}{abs} {}", self.currency);
        }
        let scale = self.currency.scale().unsigned_abs();
        write!(
            f,
            "{sign}{}.{:0digits$} {}",
            abs / scale,
            abs % scale,
            self.currency
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::USD)
    }

    #[test]
    fn mixing_currencies_fails() {
        let eur = Money::from_minor(100, Currency::EUR);
        let err = usd(100).add(eur).unwrap_err();
        assert_eq!(err, LedgerError::currency_mismatch("USD", "EUR"));
        assert!(usd(1).subtract(eur).is_err());
        assert!(usd(1).compare(&eur).is_err());
    }

    #[test]
    fn arithmetic_in_minor_units() {
        assert_eq!(usd(150).add(usd(-50)).unwrap(), usd(100));
        assert_eq!(usd(150).subtract(usd(200)).unwrap(), usd(-50));
        assert_eq!(usd(7).negate().unwrap(), usd(-7));
        assert_eq!(usd(1).compare(&usd(2)).unwrap(), Ordering::Less);
        assert!(usd(0).is_zero());
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(usd(i64::MAX).add(usd(1)), Err(LedgerError::Overflow));
        assert_eq!(usd(i64::MIN).negate(), Err(LedgerError::Overflow));
    }

    #[test]
    fn parse_respects_currency_digits() {
        let p = |s: &str, c: Currency| Money::from_decimal_str(s, c).map(|m| m.minor());
        assert_eq!(p("10", Currency::USD), Ok(1000));
        assert_eq!(p("10.5", Currency::USD), Ok(1050));
        assert_eq!(p("10,50", Currency::EUR), Ok(1050));
        assert_eq!(p("-0.01", Currency::USD), Ok(-1));
        assert_eq!(p("+3.", Currency::USD), Ok(300));
        assert_eq!(p(" 1500 ", Currency::JPY), Ok(1500));
    }

    #[test]
    fn parse_rejects_garbage_and_excess_precision() {
        for bad in ["", "-", "abc", "1.2.3", ".5", "1e3", "12.345"] {
            let err = Money::from_decimal_str(bad, Currency::USD).unwrap_err();
            assert!(matches!(err, LedgerError::InvalidFormat(_)), "{bad}: {err:?}");
        }
        assert!(Money::from_decimal_str("1.5", Currency::JPY).is_err());
    }

    #[test]
    fn display_uses_currency_digits() {
        assert_eq!(usd(1050).to_string(), "10.50 USD");
        assert_eq!(usd(-5).to_string(), "-0.05 USD");
        assert_eq!(Money::from_minor(1500, Currency::JPY).to_string(), "1500 JPY");
    }

    #[test]
    fn currency_codes_are_validated() {
        assert_eq!(Currency::from_code("usd").unwrap(), Currency::USD);
        assert!(Currency::from_code("XXX").is_err());
        let btc = Currency::new("btc", 6).unwrap();
        assert_eq!(btc.code(), "BTC");
        assert!(Currency::new("BT", 2).is_err());
        assert!(Currency::new("ABC", 7).is_err());
    }

    #[test]
    fn currency_serializes_compactly_when_known() {
        let json = serde_json::to_string(&Currency::ARS).unwrap();
        assert_eq!(json, "\"ARS\"");
        let custom = Currency::new("BTC", 6).unwrap();
        let json = serde_json::to_string(&custom).unwrap();
        let back: Currency = serde_json::from_str(&json).unwrap();
        assert_eq!(back, custom);
    }

    proptest! {
        #[test]
        fn display_then_parse_preserves_amount(minor in -1_000_000_000i64..1_000_000_000i64) {
            let m = usd(minor);
            let rendered = m.to_string();
            let number = rendered.trim_end_matches(" USD");
            prop_assert_eq!(Money::from_decimal_str(number, Currency::USD).unwrap(), m);
        }
    }
}
