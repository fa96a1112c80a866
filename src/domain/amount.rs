//! Token Amounts
//!
//! Display-unit amounts are exact decimals parsed from user input. Requests to
//! the aggregator carry integer base units, obtained by scaling with
//! `10^decimals` and flooring.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Largest scale a `Decimal` can represent
const MAX_SCALE: u8 = 28;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount is not a number: {0}")]
    NotNumeric(String),

    #[error("Amount must be greater than zero, got {0}")]
    NotPositive(String),

    #[error("Amount {amount} overflows base units at {decimals} decimals")]
    Overflow { amount: String, decimals: u8 },

    #[error("Amount {amount} is below the smallest unit at {decimals} decimals")]
    BelowPrecision { amount: String, decimals: u8 },
}

/// Parse a user-entered amount in display units.
///
/// Rejects empty input, anything that is not a plain decimal number, and
/// values `<= 0`.
pub fn parse_amount(input: &str) -> Result<Decimal, AmountError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let amount = Decimal::from_str(trimmed)
        .map_err(|_| AmountError::NotNumeric(trimmed.to_string()))?;

    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive(trimmed.to_string()));
    }

    Ok(amount)
}

/// Convert a display amount to base units: `floor(amount * 10^decimals)`.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u64, AmountError> {
    let overflow = || AmountError::Overflow {
        amount: amount.to_string(),
        decimals,
    };

    let mut scaled = amount;
    for _ in 0..decimals {
        scaled = scaled.checked_mul(Decimal::TEN).ok_or_else(overflow)?;
    }

    scaled.floor().to_u64().ok_or_else(overflow)
}

/// Convert base units back to a display amount.
pub fn from_base_units(raw: u64, decimals: u8) -> Decimal {
    let scale = u32::from(decimals.min(MAX_SCALE));
    Decimal::from_i128_with_scale(i128::from(raw), scale).normalize()
}

/// Render an amount with at most `decimals` fractional digits, trailing zeros trimmed.
pub fn format_token_amount(amount: Decimal, decimals: u8) -> String {
    let rounded = amount
        .round_dp_with_strategy(u32::from(decimals.min(MAX_SCALE)), RoundingStrategy::ToZero)
        .normalize();

    if rounded.is_zero() {
        return "0".to_string();
    }
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!(parse_amount("0.5").unwrap(), dec!(0.5));
        assert_eq!(parse_amount("  12 ").unwrap(), dec!(12));
        assert_eq!(parse_amount("0.000000001").unwrap(), dec!(0.000000001));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("   "), Err(AmountError::Empty));
        assert!(matches!(parse_amount("abc"), Err(AmountError::NotNumeric(_))));
        assert!(matches!(parse_amount("1.2.3"), Err(AmountError::NotNumeric(_))));
        assert!(matches!(parse_amount("0"), Err(AmountError::NotPositive(_))));
        assert!(matches!(parse_amount("-0.5"), Err(AmountError::NotPositive(_))));
    }

    #[test]
    fn test_base_units_floor() {
        assert_eq!(to_base_units(dec!(0.5), 9).unwrap(), 500_000_000);
        assert_eq!(to_base_units(dec!(1), 6).unwrap(), 1_000_000);
        // Sub-unit dust is truncated, never rounded up
        assert_eq!(to_base_units(dec!(0.1234567), 6).unwrap(), 123_456);
        assert_eq!(to_base_units(dec!(0.0000009), 6).unwrap(), 0);
        assert_eq!(to_base_units(dec!(2.9999999999), 9).unwrap(), 2_999_999_999);
    }

    #[test]
    fn test_base_units_matches_floor_formula() {
        let cases = [
            (dec!(0.1), 9u8),
            (dec!(123.456789), 6),
            (dec!(0.333333333333), 9),
            (dec!(42), 0),
            (dec!(7.77777), 2),
        ];

        for (amount, decimals) in cases {
            let mut expected = amount;
            for _ in 0..decimals {
                expected *= Decimal::TEN;
            }
            assert_eq!(
                to_base_units(amount, decimals).unwrap(),
                expected.floor().to_u64().unwrap(),
                "amount {} at {} decimals",
                amount,
                decimals
            );
        }
    }

    #[test]
    fn test_base_units_overflow() {
        let huge = Decimal::from(u64::MAX);
        assert!(matches!(
            to_base_units(huge, 9),
            Err(AmountError::Overflow { decimals: 9, .. })
        ));
    }

    #[test]
    fn test_from_base_units() {
        assert_eq!(from_base_units(150_000_000, 6), dec!(150));
        assert_eq!(from_base_units(500_000_000, 9), dec!(0.5));
        assert_eq!(from_base_units(0, 9), Decimal::ZERO);
    }

    #[test]
    fn test_format_token_amount() {
        assert_eq!(format_token_amount(dec!(50.125), 6), "50.125");
        assert_eq!(format_token_amount(dec!(50.1250000), 6), "50.125");
        assert_eq!(format_token_amount(dec!(1.123456789), 6), "1.123456");
        assert_eq!(format_token_amount(dec!(0), 9), "0");
        assert_eq!(format_token_amount(dec!(0.0000001), 6), "0");
    }
}
