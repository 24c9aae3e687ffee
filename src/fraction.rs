//! Fraction arithmetic: GCD reduction, canonical form, text formatting and parsing.
//!
//! Everything here is total. Malformed input never panics: parsing yields `None`,
//! and simplification of a zero denominator yields the `0/1` sentinel.

use serde::{Deserialize, Serialize};

/// Denominator used when converting decimal text ("0.75") to a fraction.
/// Two decimal places is the precision the game works with.
const DECIMAL_SCALE: i64 = 100;

/// A transient numerator/denominator pair. Not necessarily canonical until
/// passed through [`simplify_fraction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
  pub numerator: i64,
  pub denominator: i64,
}

impl Fraction {
  pub const ZERO: Fraction = Fraction { numerator: 0, denominator: 1 };

  pub fn new(numerator: i64, denominator: i64) -> Self {
    Self { numerator, denominator }
  }

  pub fn simplified(self) -> Self {
    simplify_fraction(self.numerator, self.denominator)
  }
}

impl std::fmt::Display for Fraction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&format_fraction(self.numerator, self.denominator))
  }
}

/// Euclid on absolute values. `gcd(0, 0) == 0`, callers guard against it.
pub fn gcd(a: i64, b: i64) -> u64 {
  let mut a = a.unsigned_abs();
  let mut b = b.unsigned_abs();
  while b != 0 {
    let t = b;
    b = a % b;
    a = t;
  }
  a
}

/// Reduce to lowest terms with a positive denominator.
/// A zero numerator or zero denominator collapses to `0/1`.
pub fn simplify_fraction(numerator: i64, denominator: i64) -> Fraction {
  if denominator == 0 || numerator == 0 {
    return Fraction::ZERO;
  }

  let divisor = gcd(numerator, denominator);
  // Only i64::MIN has a gcd that does not fit back into i64.
  let Ok(divisor) = i64::try_from(divisor) else {
    return Fraction::ZERO;
  };
  let n = numerator / divisor;
  let d = denominator / divisor;

  if d < 0 {
    match (n.checked_neg(), d.checked_neg()) {
      (Some(n), Some(d)) => Fraction { numerator: n, denominator: d },
      _ => Fraction::ZERO,
    }
  } else {
    Fraction { numerator: n, denominator: d }
  }
}

/// `3/1` renders as `"3"`, `0/5` as `"0"`, everything else as `"n/d"`.
pub fn format_fraction(numerator: i64, denominator: i64) -> String {
  if denominator == 1 {
    return numerator.to_string();
  }
  if numerator == 0 {
    return "0".into();
  }
  format!("{}/{}", numerator, denominator)
}

/// Parse learner or canonical answer text.
///
/// Accepted, in order:
/// - decimal text with a `.` and no `/` ("0.5", "1.25"), rounded to hundredths
///   and simplified;
/// - `a/b` with integer parts and `b != 0`, simplified;
/// - a bare integer, as `n/1`.
///
/// All whitespace is ignored and matching is case-insensitive. Integer parts must
/// fit in 32 bits, which keeps every later multiplication overflow-free.
pub fn parse_fraction(text: &str) -> Option<Fraction> {
  let cleaned = crate::util::normalize_answer(text);
  if cleaned.is_empty() {
    return None;
  }

  if cleaned.contains('.') && !cleaned.contains('/') {
    return parse_decimal(&cleaned);
  }

  let parts: Vec<&str> = cleaned.split('/').collect();
  if parts.len() == 2 {
    let numerator = parse_int(parts[0])?;
    let denominator = parse_int(parts[1])?;
    if denominator == 0 {
      return None;
    }
    return Some(simplify_fraction(numerator, denominator));
  }

  if parts.len() == 1 {
    return parse_int(&cleaned).map(|n| Fraction::new(n, 1));
  }

  None
}

/// Equality of canonical forms.
pub fn fractions_equal(a: Fraction, b: Fraction) -> bool {
  a.simplified() == b.simplified()
}

/// Render a proper fraction as decimal text with exactly two places,
/// rounding halves up ("1/8" -> "0.13").
pub fn to_decimal_text(numerator: i64, denominator: i64) -> String {
  if denominator == 0 {
    return "0.00".into();
  }
  let f = simplify_fraction(numerator, denominator);
  let negative = f.numerator < 0;
  let n = i128::from(f.numerator.unsigned_abs());
  let d = i128::from(f.denominator);
  let hundredths = (n * 200 + d) / (2 * d);
  format!(
    "{}{}.{:02}",
    if negative && hundredths != 0 { "-" } else { "" },
    hundredths / 100,
    hundredths % 100
  )
}

fn parse_int(s: &str) -> Option<i64> {
  s.parse::<i32>().ok().map(i64::from)
}

fn parse_decimal(s: &str) -> Option<Fraction> {
  let value: f64 = s.parse().ok()?;
  if !value.is_finite() {
    return None;
  }
  // Math.round semantics: halves go towards +inf.
  let scaled = (value * DECIMAL_SCALE as f64 + 0.5).floor();
  if scaled.abs() > f64::from(i32::MAX) {
    return None;
  }
  Some(simplify_fraction(scaled as i64, DECIMAL_SCALE))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gcd_uses_absolute_values() {
    assert_eq!(gcd(12, 18), 6);
    assert_eq!(gcd(-12, 18), 6);
    assert_eq!(gcd(7, 0), 7);
    assert_eq!(gcd(0, 0), 0);
  }

  #[test]
  fn simplify_reduces_and_fixes_sign() {
    assert_eq!(simplify_fraction(6, 8), Fraction::new(3, 4));
    assert_eq!(simplify_fraction(3, -6), Fraction::new(-1, 2));
    assert_eq!(simplify_fraction(-3, -6), Fraction::new(1, 2));
    assert_eq!(simplify_fraction(10, 5), Fraction::new(2, 1));
  }

  #[test]
  fn simplify_falls_back_to_zero() {
    assert_eq!(simplify_fraction(5, 0), Fraction::ZERO);
    assert_eq!(simplify_fraction(0, 7), Fraction::ZERO);
    assert_eq!(simplify_fraction(i64::MIN, i64::MIN), Fraction::ZERO);
  }

  #[test]
  fn simplify_is_idempotent_with_positive_denominator() {
    for n in -30..=30 {
      for d in -30..=30 {
        if d == 0 {
          continue;
        }
        let once = simplify_fraction(n, d);
        assert!(once.denominator > 0, "{n}/{d} -> {once:?}");
        assert_eq!(simplify_fraction(once.numerator, once.denominator), once);
        if once.numerator != 0 {
          assert_eq!(gcd(once.numerator, once.denominator), 1);
        }
      }
    }
  }

  #[test]
  fn format_cases() {
    assert_eq!(format_fraction(3, 1), "3");
    assert_eq!(format_fraction(0, 5), "0");
    assert_eq!(format_fraction(3, 4), "3/4");
    assert_eq!(Fraction::new(5, 2).to_string(), "5/2");
  }

  #[test]
  fn parse_accepts_the_three_notations() {
    assert_eq!(parse_fraction("0.5"), Some(Fraction::new(1, 2)));
    assert_eq!(parse_fraction(" 2 / 4 "), Some(Fraction::new(1, 2)));
    assert_eq!(parse_fraction("7"), Some(Fraction::new(7, 1)));
    assert_eq!(parse_fraction("-3/6"), Some(Fraction::new(-1, 2)));
    assert_eq!(parse_fraction(".25"), Some(Fraction::new(1, 4)));
  }

  #[test]
  fn parse_rounds_decimals_to_hundredths() {
    assert_eq!(parse_fraction("0.333"), Some(Fraction::new(33, 100)));
    assert_eq!(parse_fraction("0.125"), Some(Fraction::new(13, 100)));
    assert_eq!(parse_fraction("1.50"), Some(Fraction::new(3, 2)));
  }

  #[test]
  fn parse_rejects_malformed_text() {
    for bad in ["", "   ", "abc", "1/0", "1/2/3", "1.5/2", "1/x", "..", "nan", "inf"] {
      assert_eq!(parse_fraction(bad), None, "{bad:?}");
    }
    assert_eq!(parse_fraction("99999999999"), None);
  }

  #[test]
  fn formatted_output_parses_back_to_the_same_value() {
    for n in 0..25 {
      for d in 1..13 {
        let s = simplify_fraction(n, d);
        let text = format_fraction(s.numerator, s.denominator);
        let back = parse_fraction(&text).expect("parseable");
        assert!(fractions_equal(back, s), "{text}");
      }
    }
  }

  #[test]
  fn equality_compares_canonical_forms() {
    assert!(fractions_equal(Fraction::new(2, 4), Fraction::new(1, 2)));
    assert!(fractions_equal(Fraction::new(-1, -2), Fraction::new(3, 6)));
    assert!(!fractions_equal(Fraction::new(1, 3), Fraction::new(1, 2)));
  }

  #[test]
  fn decimal_text_rounds_half_up() {
    assert_eq!(to_decimal_text(1, 2), "0.50");
    assert_eq!(to_decimal_text(1, 3), "0.33");
    assert_eq!(to_decimal_text(2, 3), "0.67");
    assert_eq!(to_decimal_text(1, 8), "0.13");
    assert_eq!(to_decimal_text(7, 8), "0.88");
    assert_eq!(to_decimal_text(11, 12), "0.92");
  }
}
