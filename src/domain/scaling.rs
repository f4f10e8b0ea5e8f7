//! Decimal scaling between on-chain integers and display strings.
//!
//! "Unscaled" values are the raw integers the contracts return.
//! "Scaled" values are decimal strings obtained by dividing by
//! `10^decimals`. All conversions are exact string/integer work on
//! `U256`; no floating point is involved.

use alloy::primitives::U256;

use crate::error::{DjedError, Result};

/// Fractional digits in the reserve-ratio percentage string.
const PERCENT_FRACTION_DIGITS: usize = 4;

/// Decimal places a ratio moves when rendered as a percentage.
const PERCENT_SHIFT: u8 = 2 + PERCENT_FRACTION_DIGITS as u8;

/// Scale a raw integer into a decimal string.
///
/// Trailing fractional zeros are dropped but one fractional digit is
/// always kept, so `2 * 10^18` with 18 decimals renders as `"2.0"`.
pub fn decimal_scaling(unscaled: U256, decimals: u8) -> String {
    let digits = unscaled.to_string();
    let decimals = usize::from(decimals);

    let (int_part, frac_part) = if digits.len() <= decimals {
        ("0".to_string(), format!("{digits:0>decimals$}"))
    } else {
        let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
        (int_part.to_string(), frac_part.to_string())
    };

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{int_part}.0")
    } else {
        format!("{int_part}.{frac_part}")
    }
}

/// Parse a decimal string back into a raw integer.
///
/// Accepts `123`, `1.5`, `.5` and `5.`; surrounding whitespace is
/// ignored. Fractional digits beyond `decimals` are truncated.
pub fn decimal_unscaling(scaled: &str, decimals: u8) -> Result<U256> {
    let invalid = |reason| DjedError::InvalidAmount {
        input: scaled.to_string(),
        reason,
    };

    let trimmed = scaled.trim();
    let (int_part, frac_part) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid("no digits"));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid("expected an unsigned decimal number"));
    }

    let decimals = usize::from(decimals);
    let frac_part = &frac_part[..frac_part.len().min(decimals)];
    let combined = format!("{int_part}{frac_part:0<decimals$}");
    let combined = combined.trim_start_matches('0');

    if combined.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(combined, 10).map_err(|_| invalid("value exceeds 256 bits"))
}

/// Render a raw ratio as a percentage with four fractional digits.
///
/// Rounds half-up: a ratio of `4.5 * 10^24` with 24 decimals renders as
/// `"450.0000%"`. Exact over the whole `U256` range.
pub fn percent_scaling(unscaled: U256, decimals: u8) -> String {
    let digits = match decimals.checked_sub(PERCENT_SHIFT) {
        // Multiplying by 10^(shift - decimals) is appending zeros.
        None => format!("{unscaled}{}", "0".repeat(usize::from(PERCENT_SHIFT - decimals))),
        Some(excess) => match U256::from(10u8).checked_pow(U256::from(excess)) {
            Some(divisor) => {
                let mut quotient = unscaled / divisor;
                let remainder = unscaled % divisor;
                if !remainder.is_zero() && remainder >= divisor - remainder {
                    quotient += U256::from(1u8);
                }
                quotient.to_string()
            }
            // Divisor beyond 256 bits: every value rounds to zero.
            None => String::new(),
        },
    };

    let digits = format!(
        "{:0>width$}",
        digits.trim_start_matches('0'),
        width = PERCENT_FRACTION_DIGITS + 1
    );
    let (int_part, frac_part) = digits.split_at(digits.len() - PERCENT_FRACTION_DIGITS);
    format!("{int_part}.{frac_part}%")
}
