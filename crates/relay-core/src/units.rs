//! Fixed-point balance units.
//!
//! Balances and costs are stored as `i64` units where `10_000` units equal
//! `1.0` in the tenant's currency (4 decimal places). Integer arithmetic
//! keeps the ledger exact under concurrent updates.

use std::fmt::Write as _;

/// Number of units per whole currency unit (4 decimal places).
pub const UNIT_SCALE: i64 = 10_000;

/// Error parsing a decimal amount into units.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    /// The input is not a decimal number.
    #[error("invalid decimal amount: {0}")]
    Invalid(String),

    /// More than 4 fractional digits were supplied.
    #[error("too many decimal places (max 4): {0}")]
    TooPrecise(String),

    /// The amount does not fit in an `i64`.
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// Format units as a decimal string with 4 fractional digits.
///
/// ```
/// assert_eq!(relay_core::format_units(75), "0.0075");
/// assert_eq!(relay_core::format_units(-12_500), "-1.2500");
/// ```
#[must_use]
pub fn format_units(units: i64) -> String {
    let sign = if units < 0 { "-" } else { "" };
    let abs = units.unsigned_abs();
    let whole = abs / 10_000;
    let frac = abs % 10_000;
    let mut out = String::new();
    // i64 formatting into a String cannot fail
    let _ = write!(out, "{sign}{whole}.{frac:04}");
    out
}

/// Parse a decimal string (at most 4 fractional digits) into units.
///
/// ```
/// assert_eq!(relay_core::parse_units("0.0075").unwrap(), 75);
/// assert_eq!(relay_core::parse_units("25").unwrap(), 250_000);
/// ```
///
/// # Errors
///
/// Returns a [`UnitsError`] if the input is not a decimal number, carries
/// more than 4 fractional digits, or overflows an `i64`.
pub fn parse_units(input: &str) -> Result<i64, UnitsError> {
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let (whole_str, frac_str) = match rest.split_once('.') {
        Some((w, f)) => (w, f),
        None => (rest, ""),
    };

    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(UnitsError::Invalid(input.to_string()));
    }
    if frac_str.len() > 4 {
        return Err(UnitsError::TooPrecise(input.to_string()));
    }
    if !whole_str.chars().all(|c| c.is_ascii_digit())
        || !frac_str.chars().all(|c| c.is_ascii_digit())
    {
        return Err(UnitsError::Invalid(input.to_string()));
    }

    let whole: i64 = if whole_str.is_empty() {
        0
    } else {
        whole_str
            .parse()
            .map_err(|_| UnitsError::OutOfRange(input.to_string()))?
    };

    let mut frac: i64 = 0;
    if !frac_str.is_empty() {
        frac = frac_str
            .parse()
            .map_err(|_| UnitsError::Invalid(input.to_string()))?;
        for _ in frac_str.len()..4 {
            frac *= 10;
        }
    }

    let units = whole
        .checked_mul(UNIT_SCALE)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(|| UnitsError::OutOfRange(input.to_string()))?;

    Ok(if negative { -units } else { units })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_whole_and_fraction() {
        assert_eq!(format_units(0), "0.0000");
        assert_eq!(format_units(75), "0.0075");
        assert_eq!(format_units(150), "0.0150");
        assert_eq!(format_units(1_234_567), "123.4567");
        assert_eq!(format_units(-50), "-0.0050");
    }

    #[test]
    fn parse_common_shapes() {
        assert_eq!(parse_units("0.0075").unwrap(), 75);
        assert_eq!(parse_units("0.005").unwrap(), 50);
        assert_eq!(parse_units("10").unwrap(), 100_000);
        assert_eq!(parse_units("10.").unwrap(), 100_000);
        assert_eq!(parse_units(".5").unwrap(), 5_000);
        assert_eq!(parse_units("-1.25").unwrap(), -12_500);
        assert_eq!(parse_units(" 2.5000 ").unwrap(), 25_000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_units("").is_err());
        assert!(parse_units(".").is_err());
        assert!(parse_units("1.23456").is_err());
        assert!(parse_units("1,25").is_err());
        assert!(parse_units("abc").is_err());
        assert!(parse_units("99999999999999999999").is_err());
    }

    #[test]
    fn roundtrip() {
        for units in [0, 1, 75, 150, 9_999, 10_000, 123_456_789] {
            assert_eq!(parse_units(&format_units(units)).unwrap(), units);
        }
    }
}
