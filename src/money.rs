//! Money Normalization Module
//!
//! Unified conversion between client-facing amount representations and the
//! internal canonical form. All conversions MUST go through this module.
//!
//! ## Internal Representation
//! - All amounts are exact `Decimal` values with scale 2
//! - Magnitude fits NUMERIC(20,2): up to 18 integer digits
//! - No binary-float intermediaries anywhere in arithmetic
//!
//! Clients may submit amounts as either a JSON string or a JSON number;
//! both are normalized here, at the earliest point, before any store work.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

/// Canonical fractional digits for every stored amount and balance.
pub const AMOUNT_SCALE: u32 = 2;

/// Money normalization errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Amount must be positive")]
    NotPositive,

    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount too large")]
    Overflow,
}

/// Client-facing amount: a JSON string ("12.50") or a JSON number (12.5)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(Decimal),
}

impl AmountInput {
    /// Normalize to the canonical scale-2 Decimal
    pub fn normalize(&self) -> Result<Decimal, MoneyError> {
        match self {
            AmountInput::Text(s) => parse_amount(s),
            AmountInput::Number(d) => normalize_decimal(*d),
        }
    }
}

impl From<&str> for AmountInput {
    fn from(s: &str) -> Self {
        AmountInput::Text(s.to_string())
    }
}

impl From<Decimal> for AmountInput {
    fn from(d: Decimal) -> Self {
        AmountInput::Number(d)
    }
}

/// Parse a client-provided amount string into the canonical form
///
/// # Errors
/// * `InvalidFormat` - non-numeric input (commas, exponents, hex, ...)
/// * `NotPositive` - zero or negative amounts
/// * `PrecisionOverflow` - more than two significant fractional digits
/// * `Overflow` - magnitude exceeds NUMERIC(20,2)
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    // Decimal::from_str accepts scientific notation via from_scientific only,
    // so plain from_str already rejects "1e2"; commas and hex fail outright.
    let parsed = Decimal::from_str(amount_str)
        .map_err(|_| MoneyError::InvalidFormat(amount_str.to_string()))?;

    normalize_decimal(parsed)
}

/// Normalize an exact Decimal to scale 2, enforcing the amount invariants
pub fn normalize_decimal(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(MoneyError::NotPositive);
    }

    // Trailing zeros carry no value; "1.230" is exact at scale 2
    let mut normalized = amount.normalize();

    if normalized.scale() > AMOUNT_SCALE {
        return Err(MoneyError::PrecisionOverflow {
            provided: normalized.scale(),
            max: AMOUNT_SCALE,
        });
    }

    normalized.rescale(AMOUNT_SCALE);

    if normalized >= max_amount() {
        return Err(MoneyError::Overflow);
    }

    Ok(normalized)
}

/// Format a canonical amount or balance as its client-facing decimal string
pub fn format_amount(amount: Decimal) -> String {
    let mut v = amount;
    v.rescale(AMOUNT_SCALE);
    v.to_string()
}

/// Exclusive upper bound for amounts: 10^18, the NUMERIC(20,2) envelope
fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_000_000u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qa_parse_amount_variations() {
        // Normal cases
        assert_eq!(parse_amount("1.23").unwrap(), Decimal::new(123, 2));
        assert_eq!(parse_amount("50").unwrap(), Decimal::new(5000, 2));
        assert_eq!(parse_amount("0.01").unwrap(), Decimal::new(1, 2));

        // Leading/trailing zeros
        assert_eq!(parse_amount("001.23").unwrap(), Decimal::new(123, 2));
        assert_eq!(parse_amount("1.2300").unwrap(), Decimal::new(123, 2));

        // Zero representations (rejected: amounts are strictly positive)
        assert_eq!(parse_amount("0"), Err(MoneyError::NotPositive));
        assert_eq!(parse_amount("0.00"), Err(MoneyError::NotPositive));
    }

    #[test]
    fn qa_parse_amount_rejects_negative() {
        assert_eq!(parse_amount("-1.00"), Err(MoneyError::NotPositive));
        assert_eq!(parse_amount("-0.01"), Err(MoneyError::NotPositive));
    }

    #[test]
    fn qa_parse_amount_invalid_formats() {
        let cases = ["1,000.00", "1.2.3", "1. 23", "1e2", "0x12", ".", "abc", ""];
        for case in cases {
            assert!(
                matches!(parse_amount(case), Err(MoneyError::InvalidFormat(_))),
                "Should reject invalid format: {:?}",
                case
            );
        }
    }

    #[test]
    fn qa_parse_amount_precision_limits() {
        // Exact limit
        assert!(parse_amount("1.23").is_ok());

        // One digit too many
        assert_eq!(
            parse_amount("1.234"),
            Err(MoneyError::PrecisionOverflow {
                provided: 3,
                max: 2
            })
        );

        // Trailing zeros beyond scale 2 are value-preserving, so accepted
        assert_eq!(parse_amount("1.230").unwrap(), Decimal::new(123, 2));
    }

    #[test]
    fn qa_parse_amount_magnitude_boundary() {
        // Largest storable value: 18 integer digits
        assert!(parse_amount("999999999999999999.99").is_ok());
        assert_eq!(parse_amount("1000000000000000000"), Err(MoneyError::Overflow));
    }

    #[test]
    fn qa_normalize_decimal_scale() {
        let d = Decimal::from_str("12.5").unwrap();
        let n = normalize_decimal(d).unwrap();
        assert_eq!(n.scale(), AMOUNT_SCALE);
        assert_eq!(n.to_string(), "12.50");
    }

    #[test]
    fn qa_amount_input_both_shapes() {
        let from_text = AmountInput::from("20.00").normalize().unwrap();
        let from_number = AmountInput::from(Decimal::new(20, 0)).normalize().unwrap();
        assert_eq!(from_text, from_number);
    }

    #[test]
    fn qa_format_amount_roundtrip() {
        for s in ["0.01", "1.00", "50.00", "12500.00"] {
            let parsed = parse_amount(s).unwrap();
            assert_eq!(format_amount(parsed), s);
        }
    }
}
