//! Hexadecimal floating-point digits (`%a`).
//!
//! Output has the shape `1.<hex digits>p<binary exponent>`; subnormal values
//! start with `0.` and use exponent `-1022`, zero is `0.0p0`. With a precision
//! between 1 and 12 the significand is rounded half-even to that many hex
//! digits and subnormals are normalized first.

const SIGNIFICAND_BITS: u32 = 52;
const SIGNIFICAND_MASK: u64 = (1 << SIGNIFICAND_BITS) - 1;
const EXPONENT_BIAS: i32 = 1023;
const MIN_EXPONENT: i32 = -1022;
const FULL_DIGITS: usize = 13;

/// Shift applied to subnormals before rounding.
const SUBNORMAL_SCALE: i32 = 54;

/// Mantissa (`1.8`) and exponent suffix (`p0`) of a non-negative finite value.
pub(crate) fn hex_float(value: f64, precision: Option<usize>) -> (String, String) {
    let digits = match precision {
        None => 0,
        Some(0) => 1,
        Some(p) => p,
    };

    let (mut mantissa, exponent) = if value == 0.0 || digits == 0 || digits >= FULL_DIGITS {
        exact(value)
    } else {
        rounded(value, digits)
    };

    if digits > 0 {
        let written = mantissa.split_once('.').map(|(_, f)| f.len()).unwrap_or(0);
        if written < digits {
            mantissa.push_str(&"0".repeat(digits - written));
        }
    }
    (mantissa, format!("p{}", exponent))
}

/// All significand digits, trailing zeros removed (at least one digit kept).
fn exact(value: f64) -> (String, i32) {
    if value == 0.0 {
        return ("0.0".to_string(), 0);
    }
    let bits = value.to_bits();
    let biased = ((bits >> SIGNIFICAND_BITS) & 0x7ff) as i32;

    let hex = format!("{:013x}", bits & SIGNIFICAND_MASK);
    let fraction = match hex.trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };

    if biased == 0 {
        (format!("0.{}", fraction), MIN_EXPONENT)
    } else {
        (format!("1.{}", fraction), biased - EXPONENT_BIAS)
    }
}

fn rounded(value: f64, digits: usize) -> (String, i32) {
    let subnormal = value.to_bits() >> SIGNIFICAND_BITS == 0;
    let scaled = if subnormal {
        value * 2f64.powi(SUBNORMAL_SCALE)
    } else {
        value
    };

    let shift = SIGNIFICAND_BITS - 4 * digits as u32;
    let bits = scaled.to_bits();
    let mut kept = bits >> shift;
    let dropped = bits & ((1u64 << shift) - 1);
    let half = 1u64 << (shift - 1);
    if dropped > half || (dropped == half && kept & 1 == 1) {
        kept += 1;
    }

    let result = f64::from_bits(kept << shift);
    if result.is_infinite() {
        return ("1.0".to_string(), 1024);
    }
    let (mantissa, exponent) = exact(result);
    if subnormal {
        (mantissa, exponent - SUBNORMAL_SCALE)
    } else {
        (mantissa, exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(value: f64, precision: Option<usize>) -> String {
        let (mantissa, suffix) = hex_float(value, precision);
        format!("{}{}", mantissa, suffix)
    }

    #[test]
    fn test_exact_digits() {
        assert_eq!(hex(1.0, None), "1.0p0");
        assert_eq!(hex(1.5, None), "1.8p0");
        assert_eq!(hex(0.1, None), "1.999999999999ap-4");
        assert_eq!(hex(0.0123456789, None), "1.948b0f8fab5e6p-7");
        assert_eq!(hex(0.0, None), "0.0p0");
    }

    #[test]
    fn test_subnormal() {
        assert_eq!(hex(f64::from_bits(1), None), "0.0000000000001p-1022");
        assert_eq!(hex(f64::from_bits(1), Some(1)), "1.0p-1074");
    }

    #[test]
    fn test_precision_rounds_and_pads() {
        assert_eq!(hex(0.1, Some(1)), "1.ap-4");
        assert_eq!(hex(0.0123456789, Some(3)), "1.949p-7");
        assert_eq!(hex(1.97, Some(1)), "1.0p1");
        assert_eq!(hex(1.5, Some(2)), "1.80p0");
        assert_eq!(hex(1.5, Some(0)), "1.8p0");
        assert_eq!(hex(1.5, Some(13)), "1.8000000000000p0");
        assert_eq!(hex(0.0, Some(3)), "0.000p0");
        assert_eq!(hex(f64::MAX, Some(1)), "1.0p1024");
    }
}
