//! Tolerant numeric coercion for values read back from the cache.
//!
//! Redis returns every hash field and counter as text, and writers are not
//! required to agree on a representation: an id written as `7` by one code
//! path may come back as `7.0` after passing through another. These helpers
//! accept either form and fail closed (`None`) on anything else, so callers
//! can skip a malformed entry without failing the whole read.

use rust_decimal::Decimal;

/// Coerce a cache scalar to an integer.
///
/// Accepts plain integers (`"7"`) and decimal renderings of integers
/// (`"7.0"`, `"7.9"` truncates toward zero).
#[must_use]
pub fn to_i64(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() {
        #[allow(clippy::cast_possible_truncation)]
        let n = f.trunc() as i64;
        Some(n)
    } else {
        None
    }
}

/// Coerce a cache scalar to a decimal amount.
#[must_use]
pub fn to_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if let Ok(d) = raw.parse::<Decimal>() {
        return Some(d);
    }
    // Fall back through f64 for renderings Decimal won't parse directly
    // (e.g. exponent notation).
    let f = raw.parse::<f64>().ok()?;
    Decimal::try_from(f).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_i64_plain_integer() {
        assert_eq!(to_i64("7"), Some(7));
        assert_eq!(to_i64("-3"), Some(-3));
        assert_eq!(to_i64(" 42 "), Some(42));
    }

    #[test]
    fn test_to_i64_float_rendering() {
        assert_eq!(to_i64("7.0"), Some(7));
        assert_eq!(to_i64("7.9"), Some(7));
        assert_eq!(to_i64("-2.5"), Some(-2));
    }

    #[test]
    fn test_to_i64_rejects_garbage() {
        assert_eq!(to_i64(""), None);
        assert_eq!(to_i64("abc"), None);
        assert_eq!(to_i64("nan"), None);
        assert_eq!(to_i64("inf"), None);
    }

    #[test]
    fn test_to_decimal_integer_and_fraction() {
        assert_eq!(to_decimal("20"), Some(Decimal::from(20)));
        assert_eq!(to_decimal("20.5"), Some("20.5".parse().unwrap()));
    }

    #[test]
    fn test_to_decimal_exponent_fallback() {
        assert_eq!(to_decimal("2e1"), Some(Decimal::from(20)));
    }

    #[test]
    fn test_to_decimal_rejects_garbage() {
        assert_eq!(to_decimal(""), None);
        assert_eq!(to_decimal("abc"), None);
    }
}
