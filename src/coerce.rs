//! Permissive numeric coercion of field text.
//!
//! Fields are untrusted input, so these never fail: the longest numeric
//! prefix is parsed and anything unparseable becomes zero.

use std::sync::LazyLock;

use regex::Regex;

static INT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?\d+(?:_\d+)*)").expect("integer prefix pattern is valid")
});

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:_\d+)*(?:\.\d+(?:_\d+)*)?|\.\d+(?:_\d+)*)(?:[eE][+-]?\d+)?)")
        .expect("float prefix pattern is valid")
});

/// Parse the leading integer of `s`, or 0.
///
/// Out of range values saturate at `i64::MIN` / `i64::MAX`.
pub fn to_int(s: &str) -> i64 {
    let Some(caps) = INT_PREFIX.captures(s) else {
        return 0;
    };
    let digits = caps[1].replace('_', "");
    digits.parse::<i64>().unwrap_or_else(|_| {
        if digits.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

/// Parse the leading decimal number of `s`, or 0.0.
pub fn to_float(s: &str) -> f64 {
    FLOAT_PREFIX
        .captures(s)
        .and_then(|caps| caps[1].replace('_', "").parse::<f64>().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_plain() {
        assert_eq!(to_int("42"), 42);
        assert_eq!(to_int("-17"), -17);
        assert_eq!(to_int("+5"), 5);
    }

    #[test]
    fn int_prefix_and_whitespace() {
        assert_eq!(to_int("12abc"), 12);
        assert_eq!(to_int("  7"), 7);
        assert_eq!(to_int("3.9"), 3);
    }

    #[test]
    fn int_underscores() {
        assert_eq!(to_int("1_000"), 1000);
        assert_eq!(to_int("1__0"), 1);
        assert_eq!(to_int("_1"), 0);
    }

    #[test]
    fn int_garbage_is_zero() {
        assert_eq!(to_int("abc"), 0);
        assert_eq!(to_int(""), 0);
        assert_eq!(to_int("--5"), 0);
        assert_eq!(to_int("0x1A"), 0);
    }

    #[test]
    fn int_saturates() {
        assert_eq!(to_int("99999999999999999999999"), i64::MAX);
        assert_eq!(to_int("-99999999999999999999999"), i64::MIN);
    }

    #[test]
    fn float_plain() {
        assert_eq!(to_float("3.14"), 3.14);
        assert_eq!(to_float("-2"), -2.0);
        assert_eq!(to_float(".5"), 0.5);
    }

    #[test]
    fn float_prefix() {
        assert_eq!(to_float("3.5kg"), 3.5);
        assert_eq!(to_float("1e3"), 1000.0);
        assert_eq!(to_float("2.5e-1x"), 0.25);
        assert_eq!(to_float("7e"), 7.0);
        assert_eq!(to_float("5."), 5.0);
    }

    #[test]
    fn float_garbage_is_zero() {
        assert_eq!(to_float("abc"), 0.0);
        assert_eq!(to_float(""), 0.0);
        assert_eq!(to_float("nan"), 0.0);
        assert_eq!(to_float("inf"), 0.0);
        assert_eq!(to_float("."), 0.0);
    }
}
