// Rational numbers as exposed by container drivers (time bases, frame rates, aspect ratios)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exact rational number with 32-bit terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    /// The "unknown" rational used for absent frame rates and aspect ratios
    pub const ZERO: Rational = Rational { num: 0, den: 1 };

    /// Create a rational without normalizing it
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Zero numerator means unknown for rates and ratios
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Floating point value, `None` when the denominator is zero
    pub fn to_f64(&self) -> Option<f64> {
        if self.den == 0 {
            None
        } else {
            Some(self.num as f64 / self.den as f64)
        }
    }

    /// Reduce `num / den` to the closest ratio whose terms do not exceed `max`.
    ///
    /// Exact fractions are returned in lowest terms; otherwise the best
    /// continued-fraction approximation is chosen. The flag tells whether the
    /// result is exact.
    pub fn reduce(num: i64, den: i64, max: i32) -> (Rational, bool) {
        let negative = (num < 0) != (den < 0);
        let max = max as i128;
        let mut num = (num as i128).abs();
        let mut den = (den as i128).abs();

        let divisor = gcd(num, den);
        if divisor != 0 {
            num /= divisor;
            den /= divisor;
        }

        let mut a0 = (0i128, 1i128);
        let mut a1 = (1i128, 0i128);

        if num <= max && den <= max {
            a1 = (num, den);
            den = 0;
        }

        while den != 0 {
            let x = num / den;
            let next_den = num - den * x;
            let a2 = (x * a1.0 + a0.0, x * a1.1 + a0.1);

            if a2.0 > max || a2.1 > max {
                let mut x = x;
                if a1.0 != 0 {
                    x = (max - a0.0) / a1.0;
                }
                if a1.1 != 0 {
                    x = x.min((max - a0.1) / a1.1);
                }
                if den * (2 * x * a1.1 + a0.1) > num * a1.1 {
                    a1 = (x * a1.0 + a0.0, x * a1.1 + a0.1);
                }
                break;
            }

            a0 = a1;
            a1 = a2;
            num = den;
            den = next_den;
        }

        let reduced = Rational {
            num: if negative { -(a1.0 as i32) } else { a1.0 as i32 },
            den: a1.1 as i32,
        };
        (reduced, den == 0)
    }
}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}
