//! Display helpers for addresses and amounts.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const EXPLORER_BASE_URL: &str = "https://explorer.solana.com";

/// Smallest amount shown as a number
const DUST_THRESHOLD: Decimal = dec!(0.000001);

/// Shorten an address to `start` leading and `end` trailing characters.
pub fn truncate_address(address: &str, start: usize, end: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= start + end {
        return address.to_string();
    }

    let head: String = chars[..start].iter().collect();
    let tail: String = chars[chars.len() - end..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Format an amount for display with at most `max_decimals` fractional digits
/// and thousands separators.
pub fn format_amount(amount: &str, max_decimals: u32) -> String {
    let Ok(value) = Decimal::from_str(amount.trim()) else {
        return "0".to_string();
    };

    if value > Decimal::ZERO && value < DUST_THRESHOLD {
        return "<0.000001".to_string();
    }

    let rounded = value.round_dp(max_decimals).normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn explorer_address_url(address: &str) -> String {
    format!("{}/address/{}", EXPLORER_BASE_URL, address)
}

pub fn explorer_tx_url(txid: &str) -> String {
    format!("{}/tx/{}", EXPLORER_BASE_URL, txid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", 4, 4),
            "9WzD...AWWM"
        );
        assert_eq!(truncate_address("abcdefgh", 4, 4), "abcdefgh");
        assert_eq!(truncate_address("", 4, 4), "");
        assert_eq!(truncate_address("So1111111112", 6, 4), "So1111...1112");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount("1234567.891", 2), "1,234,567.89");
        assert_eq!(format_amount("50.125", 6), "50.125");
        assert_eq!(format_amount("100", 6), "100");
        assert_eq!(format_amount("0.0000001", 6), "<0.000001");
        assert_eq!(format_amount("0", 6), "0");
        assert_eq!(format_amount("nope", 6), "0");
        assert_eq!(format_amount("-1500.5", 2), "-1,500.5");
    }

    #[test]
    fn test_explorer_urls() {
        assert_eq!(
            explorer_address_url("abc"),
            "https://explorer.solana.com/address/abc"
        );
        assert_eq!(explorer_tx_url("sig"), "https://explorer.solana.com/tx/sig");
    }
}
