use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Maximum number of significant digits a `Decimal` mantissa can hold safely.
const MAX_SIGNIFICANT_DIGITS: usize = 28;

// USD prices and values, as decimal strings from the snapshot
pub fn parse_decimal(value: &str) -> Result<Decimal, ConversionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConversionError::InvalidDecimal(value.to_string()));
    }
    if trimmed.contains(['e', 'E']) {
        return Decimal::from_scientific(trimmed)
            .map_err(|_| ConversionError::InvalidDecimal(value.to_string()));
    }
    Decimal::from_str(trimmed).map_err(|_| ConversionError::InvalidDecimal(value.to_string()))
}

/// Parses a raw on-chain integer amount and scales it down by `decimals`.
///
/// Raw amounts routinely exceed the 96-bit mantissa of `Decimal` (a 1e12 token
/// supply with 18 decimals is already 1e30), so the decimal point is placed in
/// the string before parsing and excess fractional digits are truncated.
pub fn parse_scaled(raw: &str, decimals: u32) -> Result<Decimal, ConversionError> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConversionError::InvalidDecimal(raw.to_string()));
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let decimals = decimals as usize;
    let (integer, fraction) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (&digits[..split], digits[split..].to_string())
    } else {
        ("", format!("{}{}", "0".repeat(decimals - digits.len()), digits))
    };

    if integer.len() > MAX_SIGNIFICANT_DIGITS {
        return Err(ConversionError::Overflow);
    }

    let fraction = fraction.trim_end_matches('0');
    let keep = MAX_SIGNIFICANT_DIGITS.saturating_sub(integer.len()).min(fraction.len());
    let fraction = &fraction[..keep];

    let mut text = String::with_capacity(integer.len() + fraction.len() + 3);
    if negative {
        text.push('-');
    }
    text.push_str(if integer.is_empty() { "0" } else { integer });
    if !fraction.is_empty() {
        text.push('.');
        text.push_str(fraction);
    }
    Decimal::from_str(&text).map_err(|_| ConversionError::InvalidDecimal(raw.to_string()))
}

/// Canonical wire form of a computed decimal ("0.021024", "525.6", "0").
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Fixed four-decimal wire form used for distribution percentages ("16.6667").
/// Midpoints round away from zero.
pub fn format_percentage(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(4);
    rounded.to_string()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),
    #[error("Overflow in conversion")]
    Overflow,
}
