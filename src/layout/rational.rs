//! Exact rational numbers for the linear solver
//!
//! Values are stored in reduced form with a positive denominator, so two
//! equal rationals always have identical fields. All arithmetic is checked:
//! an operation that would overflow returns `None` instead of wrapping.

use std::fmt;

/// A reduced fraction `numer / denom` with `denom > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    numer: i128,
    denom: i128,
}

impl Rational {
    pub const ZERO: Rational = Rational { numer: 0, denom: 1 };
    pub const ONE: Rational = Rational { numer: 1, denom: 1 };

    /// Create and normalize a fraction. Returns `None` for a zero denominator.
    pub fn new(numer: i128, denom: i128) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        if numer == 0 {
            return Some(Self::ZERO);
        }
        let divisor = i128::try_from(gcd(numer.unsigned_abs(), denom.unsigned_abs())).ok()?;
        let (mut numer, mut denom) = (numer / divisor, denom / divisor);
        if denom < 0 {
            numer = numer.checked_neg()?;
            denom = denom.checked_neg()?;
        }
        Some(Self { numer, denom })
    }

    pub fn from_integer(value: i64) -> Self {
        Self {
            numer: i128::from(value),
            denom: 1,
        }
    }

    /// Parse an unsigned decimal literal such as `12` or `12.5` exactly.
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut numer: i128 = 0;
        let mut denom: i128 = 1;
        for digit in whole.bytes().chain(fraction.bytes()) {
            numer = numer
                .checked_mul(10)?
                .checked_add(i128::from(digit - b'0'))?;
        }
        for _ in 0..fraction.len() {
            denom = denom.checked_mul(10)?;
        }
        Self::new(numer, denom)
    }

    pub fn numer(self) -> i128 {
        self.numer
    }

    pub fn denom(self) -> i128 {
        self.denom
    }

    pub fn is_zero(self) -> bool {
        self.numer == 0
    }

    pub fn checked_neg(self) -> Option<Self> {
        Some(Self {
            numer: self.numer.checked_neg()?,
            denom: self.denom,
        })
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        // Scale by lcm(denoms) rather than the product to keep magnitudes down
        let divisor = i128::try_from(gcd(self.denom.unsigned_abs(), other.denom.unsigned_abs())).ok()?;
        let left = self.numer.checked_mul(other.denom / divisor)?;
        let right = other.numer.checked_mul(self.denom / divisor)?;
        let denom = (self.denom / divisor).checked_mul(other.denom)?;
        Self::new(left.checked_add(right)?, denom)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.checked_add(other.checked_neg()?)
    }

    pub fn checked_mul(self, other: Self) -> Option<Self> {
        if self.is_zero() || other.is_zero() {
            return Some(Self::ZERO);
        }
        let first = i128::try_from(gcd(self.numer.unsigned_abs(), other.denom.unsigned_abs())).ok()?;
        let second = i128::try_from(gcd(other.numer.unsigned_abs(), self.denom.unsigned_abs())).ok()?;
        let numer = (self.numer / first).checked_mul(other.numer / second)?;
        let denom = (self.denom / second).checked_mul(other.denom / first)?;
        Self::new(numer, denom)
    }

    /// Divide, returning `None` on overflow or when `other` is zero.
    pub fn checked_div(self, other: Self) -> Option<Self> {
        self.checked_mul(other.recip()?)
    }

    pub fn recip(self) -> Option<Self> {
        Self::new(self.denom, self.numer)
    }

    pub fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

fn gcd(mut left: u128, mut right: u128) -> u128 {
    while right != 0 {
        let rem = left % right;
        left = right;
        right = rem;
    }
    left.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(numer: i128, denom: i128) -> Rational {
        Rational::new(numer, denom).unwrap()
    }

    #[test]
    fn test_new_reduces_and_normalizes_sign() {
        let value = r(6, -8);
        assert_eq!(value.numer(), -3);
        assert_eq!(value.denom(), 4);
        assert_eq!(r(0, -5), Rational::ZERO);
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert!(Rational::new(1, 0).is_none());
        assert!(Rational::ONE.checked_div(Rational::ZERO).is_none());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Rational::parse_decimal("800"), Some(Rational::from(800)));
        assert_eq!(Rational::parse_decimal("12.5"), Some(r(25, 2)));
        assert_eq!(Rational::parse_decimal("0.1"), Some(r(1, 10)));
        assert_eq!(Rational::parse_decimal(".5"), None);
        assert_eq!(Rational::parse_decimal("1.2.3"), None);
        assert_eq!(Rational::parse_decimal("1e3"), None);
    }

    #[test]
    fn test_parse_decimal_overflow() {
        let huge = "9".repeat(60);
        assert_eq!(Rational::parse_decimal(&huge), None);
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let third = r(1, 3);
        let sum = third.checked_add(third).unwrap().checked_add(third).unwrap();
        assert_eq!(sum, Rational::ONE);
        assert_eq!(r(1, 2).checked_sub(r(1, 3)).unwrap(), r(1, 6));
        assert_eq!(r(2, 3).checked_mul(r(9, 4)).unwrap(), r(3, 2));
        assert_eq!(r(2, 3).checked_div(r(4, 9)).unwrap(), r(3, 2));
    }

    #[test]
    fn test_overflow_is_reported() {
        let big = Rational::new(i128::MAX, 1).unwrap();
        assert!(big.checked_add(Rational::ONE).is_none());
        assert!(big.checked_mul(Rational::from(2)).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rational::from(400).to_string(), "400");
        assert_eq!(r(-800, 3).to_string(), "-800/3");
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(r(1, 4).to_f64(), 0.25);
        assert!(r(5, 2).to_f64() == 2.5);
    }
}
