//! Fixed-point ledger amounts.
//!
//! Balances and mutation amounts are stored as `i64` minor units with exactly
//! [`Money::DECIMALS`] fractional digits. Text that would need more precision is
//! rejected, never rounded.

use std::{fmt, ops::Neg, str::FromStr};

use crate::{EngineError, ResultEngine};

/// A signed amount in minor units (hundredths).
///
/// Balances are never negative; a negative value only appears as the signed
/// form of a debit handed to a `BalanceStore`.
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::parse_amount("12.3").unwrap();
/// assert_eq!(amount.minor(), 1230);
/// assert_eq!(amount.to_string(), "12.30");
/// assert!(Money::parse_amount("-1").is_err());
/// assert!(Money::parse_amount("0.001").is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

const SCALE: i64 = 100;

impl Money {
    /// Fractional digits kept by every amount.
    pub const DECIMALS: usize = 2;
    pub const ZERO: Money = Money(0);
    pub const MAX: Money = Money(i64::MAX);

    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `None` when the sum leaves the `i64` range.
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Parses a caller-supplied mutation amount.
    ///
    /// Amounts are unsigned: the operation decides whether they credit or
    /// debit, so any sign in the input is rejected.
    pub fn parse_amount(raw: &str) -> ResultEngine<Money> {
        let trimmed = raw.trim();
        if trimmed.starts_with(['-', '+']) {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be unsigned, got {trimmed}"
            )));
        }
        trimmed.parse()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        write!(
            f,
            "{sign}{}.{:0width$}",
            abs / scale,
            abs % scale,
            width = Self::DECIMALS
        )
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses `[-]units[.fraction]`, with 1 to [`Money::DECIMALS`] fraction
    /// digits. Exponents, thousands separators and bare dots are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {s:?}"));
        let too_large = || EngineError::InvalidAmount(format!("amount out of range: {s}"));

        let text = s.trim();
        let (negative, magnitude) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (units, fraction) = match magnitude.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (magnitude, ""),
        };
        if !all_digits(units) || magnitude.ends_with('.') {
            return Err(invalid());
        }
        if !fraction.is_empty() && !all_digits(fraction) {
            return Err(invalid());
        }
        if fraction.len() > Self::DECIMALS {
            return Err(EngineError::InvalidAmount(format!(
                "amount {s} has more than {} decimals",
                Self::DECIMALS
            )));
        }

        // Right-pad so "1.5" reads as 150 minor units.
        let fraction_minor = format!("{fraction:0<width$}", width = Self::DECIMALS)
            .parse::<i64>()
            .map_err(|_| invalid())?;

        let minor = units
            .parse::<i64>()
            .ok()
            .and_then(|units| units.checked_mul(SCALE))
            .and_then(|minor| minor.checked_add(fraction_minor))
            .ok_or_else(too_large)?;

        Ok(Money(if negative { -minor } else { minor }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_two_fraction_digits() {
        let rendered: Vec<String> = [0, 1, 10, 1500, -1050]
            .into_iter()
            .map(|minor| Money::from_minor(minor).to_string())
            .collect();
        assert_eq!(rendered, ["0.00", "0.01", "0.10", "15.00", "-10.50"]);
    }

    #[test]
    fn parses_decimal_text() {
        assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().minor(), 1050);
        assert_eq!("0.07".parse::<Money>().unwrap().minor(), 7);
        assert_eq!("-0.01".parse::<Money>().unwrap().minor(), -1);
        assert_eq!("  2.30 ".parse::<Money>().unwrap().minor(), 230);
    }

    #[test]
    fn rejects_extra_precision_instead_of_rounding() {
        for raw in ["12.345", "0.001", "1.0000000000000001"] {
            let err = raw.parse::<Money>().unwrap_err();
            assert!(err.is_validation(), "{raw}");
        }
    }

    #[test]
    fn rejects_malformed_text() {
        for raw in ["", "-", "abc", "1.2.3", ".5", "7.", "1e3", "1,50", "1.x", "--1"] {
            assert!(raw.parse::<Money>().is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!("92233720368547758.08".parse::<Money>().is_err());
        assert_eq!("92233720368547758.07".parse::<Money>().unwrap(), Money::MAX);
    }

    #[test]
    fn mutation_amounts_are_unsigned() {
        assert_eq!(Money::parse_amount(" 3.50 ").unwrap().minor(), 350);
        assert_eq!(Money::parse_amount("0").unwrap(), Money::ZERO);
        assert!(Money::parse_amount("-3.50").unwrap_err().is_validation());
        assert!(Money::parse_amount("+3.50").unwrap_err().is_validation());
    }

    #[test]
    fn repeated_tenths_stay_exact() {
        let tenth = Money::parse_amount("0.10").unwrap();
        let total = (0..10).try_fold(Money::ZERO, |acc, _| acc.checked_add(tenth));
        assert_eq!(total, Some(Money::from_minor(100)));
    }
}
