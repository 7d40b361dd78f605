// src/extractors/value.rs

use std::fmt;

/// Largest magnitude accepted as a per-share figure. Also keeps 4-digit years out.
pub const EPS_BOUND: f64 = 25.0;

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥'];

/// A per-share amount held in hundredths, so formatting is always exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EpsValue(i64);

impl EpsValue {
    /// Accepts finite values within `[-EPS_BOUND, EPS_BOUND]`, rounded to two decimals.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value.abs() > EPS_BOUND {
            return None;
        }
        Some(Self((value * 100.0).round() as i64))
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn negated(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for EpsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let hundredths = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, hundredths / 100, hundredths % 100)
    }
}

/// Normalizes a raw numeric token into a bounded EPS value.
///
/// `(1.23)` is read as negative; currency symbols and thousands separators are
/// dropped. Anything unparseable, non-finite or outside the plausible range
/// yields `None`.
pub fn extract_eps_value(token: &str) -> Option<EpsValue> {
    // "$(0.12)" and "($0.12)" are both common in filings
    let token = token.trim().trim_start_matches(CURRENCY_SYMBOLS).trim();
    if token.is_empty() {
        return None;
    }

    let value = match token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => -parse_amount(inner)?,
        None => parse_amount(token)?,
    };

    EpsValue::from_f64(value)
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',')
        .map(|c| if c == '\u{2212}' { '-' } else { c })
        .collect();
    cleaned.trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(token: &str) -> Option<String> {
        extract_eps_value(token).map(|v| v.to_string())
    }

    #[test]
    fn test_plain_values_get_two_decimals() {
        assert_eq!(extracted("0.45").as_deref(), Some("0.45"));
        assert_eq!(extracted("  1.5 ").as_deref(), Some("1.50"));
        assert_eq!(extracted("3").as_deref(), Some("3.00"));
        assert_eq!(extracted("-0.07").as_deref(), Some("-0.07"));
        assert_eq!(extracted("$12.5").as_deref(), Some("12.50"));
    }

    #[test]
    fn test_parenthesized_values_are_negative() {
        assert_eq!(extracted("(1.23)").as_deref(), Some("-1.23"));
        assert_eq!(extracted("($0.12)").as_deref(), Some("-0.12"));
        assert_eq!(extracted("$(0.12)").as_deref(), Some("-0.12"));
        assert_eq!(extracted("( 0.50 )").as_deref(), Some("-0.50"));
    }

    #[test]
    fn test_years_and_large_values_are_rejected() {
        for token in ["2020", "1900", "2100", "(2019)", "$1,234.5", "25.01", "-26", "1,000"] {
            assert_eq!(extracted(token), None, "token {:?} should be rejected", token);
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert_eq!(extracted("25").as_deref(), Some("25.00"));
        assert_eq!(extracted("-25").as_deref(), Some("-25.00"));
        assert_eq!(extracted("(25.00)").as_deref(), Some("-25.00"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        for token in ["", "   ", "—", "-", ".", "n/a", "NaN", "inf", "(abc)", "(0.12", "1 2"] {
            assert_eq!(extracted(token), None, "token {:?} should be rejected", token);
        }
    }

    #[test]
    fn test_negative_zero_prints_unsigned() {
        assert_eq!(extracted("(0.00)").as_deref(), Some("0.00"));
        assert_eq!(extracted("-0.001").as_deref(), Some("0.00"));
    }

    #[test]
    fn test_unicode_minus() {
        assert_eq!(extracted("\u{2212}0.31").as_deref(), Some("-0.31"));
    }

    #[test]
    fn test_every_in_range_value_formats_to_hundredths() {
        for hundredths in (-2500i64..=2500).step_by(37) {
            let token = format!("{}", hundredths as f64 / 100.0);
            let value = extract_eps_value(&token).expect("in range");
            assert_eq!(value, EpsValue(hundredths), "token {}", token);
            assert_eq!(value.to_string().split('.').nth(1).map(str::len), Some(2));
        }
    }

    #[test]
    fn test_negation() {
        let value = extract_eps_value("1.50").unwrap();
        assert!(!value.is_negative());
        assert_eq!(value.negated().to_string(), "-1.50");
        assert_eq!(value.negated().negated(), value);
    }
}
