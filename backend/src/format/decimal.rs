//! Decimal digit arithmetic for rendering doubles.
//!
//! Values are taken from their shortest round-trip representation and rounded
//! half-up on those decimal digits, so `0.125` at two places gives `0.13`.

/// Non-negative finite value as decimal digits: `0.d1d2d3... * 10^point`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decimal {
    digits: Vec<u8>,
    point: i32,
}

impl Decimal {
    /// Decompose the magnitude of a finite double.
    pub fn from_f64(value: f64) -> Self {
        let repr = format!("{:e}", value.abs());
        let (mantissa, exponent) = repr.split_once('e').unwrap_or((repr.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);

        let mut digits: Vec<u8> = mantissa
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0')
            .collect();
        while digits.last() == Some(&0) {
            digits.pop();
        }

        if digits.is_empty() {
            return Self::zero();
        }
        Self {
            digits,
            point: exponent + 1,
        }
    }

    fn zero() -> Self {
        Self {
            digits: Vec::new(),
            point: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Power of ten of the leading digit.
    pub fn exponent(&self) -> i32 {
        self.point - 1
    }

    fn digit_at(&self, index: i64) -> u8 {
        if index < 0 {
            return 0;
        }
        self.digits.get(index as usize).copied().unwrap_or(0)
    }

    /// Keep `keep` leading digits, rounding half-up on the first dropped one.
    fn round_to(&mut self, keep: i64) {
        if keep < 0 {
            *self = Self::zero();
            return;
        }
        let keep = keep as usize;
        if keep >= self.digits.len() {
            return;
        }

        let round_up = self.digits[keep] >= 5;
        self.digits.truncate(keep);
        if round_up {
            let mut i = keep;
            loop {
                if i == 0 {
                    self.digits.insert(0, 1);
                    self.point += 1;
                    break;
                }
                i -= 1;
                if self.digits[i] == 9 {
                    self.digits[i] = 0;
                } else {
                    self.digits[i] += 1;
                    break;
                }
            }
        }

        while self.digits.last() == Some(&0) {
            self.digits.pop();
        }
        if self.digits.is_empty() {
            *self = Self::zero();
        }
    }

    /// Round to `precision` significant digits.
    pub fn rounded_significant(&self, precision: usize) -> Self {
        let mut rounded = self.clone();
        rounded.round_to(precision as i64);
        rounded
    }

    /// Integer and fraction digits with `precision` fraction places.
    pub fn to_fixed(&self, precision: usize) -> (String, String) {
        let mut rounded = self.clone();
        rounded.round_to(i64::from(rounded.point) + precision as i64);

        let point = i64::from(rounded.point);
        let integer = if point <= 0 {
            "0".to_string()
        } else {
            (0..point).map(|i| digit_char(rounded.digit_at(i))).collect()
        };
        let fraction = (0..precision as i64)
            .map(|k| digit_char(rounded.digit_at(point + k)))
            .collect();
        (integer, fraction)
    }

    /// Leading digit, `precision` fraction digits and the decimal exponent.
    pub fn to_scientific(&self, precision: usize) -> (char, String, i32) {
        if self.is_zero() {
            return ('0', "0".repeat(precision), 0);
        }
        let rounded = self.rounded_significant(precision + 1);
        let fraction = (1..=precision as i64)
            .map(|k| digit_char(rounded.digit_at(k)))
            .collect();
        (digit_char(rounded.digit_at(0)), fraction, rounded.exponent())
    }

    /// Shortest textual form: plain decimal for `1e-3 <= v < 1e7`,
    /// otherwise `d.dddE[-]n`. Always has at least one fraction digit.
    pub fn to_shortest(&self) -> String {
        if self.is_zero() {
            return "0.0".to_string();
        }
        let exponent = self.exponent();
        let point = i64::from(self.point);
        let len = self.digits.len() as i64;

        if (-3..7).contains(&exponent) {
            let integer: String = if point <= 0 {
                "0".to_string()
            } else {
                (0..point).map(|i| digit_char(self.digit_at(i))).collect()
            };
            let mut fraction: String = (point..len)
                .map(|i| digit_char(self.digit_at(i)))
                .collect();
            if fraction.is_empty() {
                fraction.push('0');
            }
            format!("{}.{}", integer, fraction)
        } else {
            let mut fraction: String = (1..len).map(|i| digit_char(self.digit_at(i))).collect();
            if fraction.is_empty() {
                fraction.push('0');
            }
            format!("{}.{}E{}", digit_char(self.digit_at(0)), fraction, exponent)
        }
    }
}

fn digit_char(d: u8) -> char {
    (b'0' + d) as char
}

/// Insert `,` between every group of three integer digits.
pub(crate) fn group_thousands(integer: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(v: f64, precision: usize) -> String {
        let (i, f) = Decimal::from_f64(v).to_fixed(precision);
        if f.is_empty() {
            i
        } else {
            format!("{}.{}", i, f)
        }
    }

    #[test]
    fn test_half_up_on_shortest_digits() {
        assert_eq!(fixed(0.125, 2), "0.13");
        assert_eq!(fixed(2.5, 0), "3");
        assert_eq!(fixed(0.5, 0), "1");
        assert_eq!(fixed(1.005, 2), "1.01");
    }

    #[test]
    fn test_fixed_carry_and_padding() {
        assert_eq!(fixed(9.9996, 3), "10.000");
        assert_eq!(fixed(0.1, 20), "0.10000000000000000000");
        assert_eq!(fixed(0.004, 2), "0.00");
        assert_eq!(fixed(0.05, 1), "0.1");
        assert_eq!(fixed(123456.0, 0), "123456");
        assert_eq!(fixed(0.0, 3), "0.000");
    }

    #[test]
    fn test_scientific() {
        let (lead, frac, exp) = Decimal::from_f64(0.0123456789).to_scientific(6);
        assert_eq!((lead, frac.as_str(), exp), ('1', "234568", -2));

        let (lead, frac, exp) = Decimal::from_f64(9.99).to_scientific(1);
        assert_eq!((lead, frac.as_str(), exp), ('1', "0", 1));
    }

    #[test]
    fn test_shortest() {
        assert_eq!(Decimal::from_f64(100.0).to_shortest(), "100.0");
        assert_eq!(Decimal::from_f64(3.14159).to_shortest(), "3.14159");
        assert_eq!(Decimal::from_f64(0.001).to_shortest(), "0.001");
        assert_eq!(Decimal::from_f64(0.0001).to_shortest(), "1.0E-4");
        assert_eq!(Decimal::from_f64(1.0e7).to_shortest(), "1.0E7");
        assert_eq!(Decimal::from_f64(0.0).to_shortest(), "0.0");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("1234"), "1,234");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
