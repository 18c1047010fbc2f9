//! Printf-style format patterns for a single floating-point argument.
//!
//! A pattern is literal text interleaved with directives of the form
//! `%[index$][flags][width][.precision]conversion`.
//!
//! | Conversion | Output                                             |
//! |------------|----------------------------------------------------|
//! | `f`        | Decimal, default precision 6                       |
//! | `e` `E`    | Scientific, `d.dddddde+XX`                         |
//! | `g` `G`    | Decimal or scientific depending on magnitude       |
//! | `a` `A`    | Hexadecimal significand, binary exponent `p±n`     |
//! | `s` `S`    | Shortest textual form of the double                |
//! | `b` `B`    | `true` (the argument is always present)            |
//! | `h` `H`    | Hex hash of the bit pattern                        |
//! | `%`        | Literal `%`                                        |
//! | `n`        | Line separator                                     |
//!
//! Flags: `-` left justify, `#` alternate form, `+` always signed,
//! ` ` leading space, `0` zero padding, `,` thousands grouping,
//! `(` parentheses around negatives, `<` reuse the previous argument.
//!
//! Widths, precisions and argument indexes must fit in a signed 32-bit
//! integer.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::decimal::{group_thousands, Decimal};
use super::hex::hex_float;
use crate::error::{FormatError, FormatResult};

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^%(\d+\$)?([-#+ 0,(<]*)?(\d+)?(\.\d+)?([tT])?([a-zA-Z%])")
        .expect("directive regex is valid")
});

const DEFAULT_PRECISION: usize = 6;

/// Number of arguments a pattern is rendered with.
const ARGUMENT_COUNT: usize = 1;

// =============================================================================
// Directive model
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Decimal,
    Scientific,
    General,
    HexFloat,
    Text,
    Boolean,
    Hash,
    Percent,
    LineSeparator,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    left_justify: bool,
    alternate: bool,
    plus: bool,
    leading_space: bool,
    zero_pad: bool,
    group: bool,
    parentheses: bool,
    previous: bool,
}

impl Flags {
    fn parse(raw: &str) -> FormatResult<Self> {
        let mut flags = Flags::default();
        for c in raw.chars() {
            let slot = match c {
                '-' => &mut flags.left_justify,
                '#' => &mut flags.alternate,
                '+' => &mut flags.plus,
                ' ' => &mut flags.leading_space,
                '0' => &mut flags.zero_pad,
                ',' => &mut flags.group,
                '(' => &mut flags.parentheses,
                '<' => &mut flags.previous,
                other => return Err(FormatError::IllegalFlags(other.to_string())),
            };
            if *slot {
                return Err(FormatError::IllegalFlags(format!("duplicate '{}'", c)));
            }
            *slot = true;
        }
        Ok(flags)
    }

    /// Flags other than `-` and `<`, as written.
    fn numeric_only(&self) -> Vec<char> {
        let mut set = Vec::new();
        if self.plus {
            set.push('+');
        }
        if self.leading_space {
            set.push(' ');
        }
        if self.zero_pad {
            set.push('0');
        }
        if self.group {
            set.push(',');
        }
        if self.parentheses {
            set.push('(');
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgumentIndex {
    Ordinary,
    Explicit(usize),
    Previous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directive {
    text: String,
    index: ArgumentIndex,
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
    uppercase: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Directive(Directive),
}

// =============================================================================
// FormatPattern
// =============================================================================

/// A parsed, immutable format pattern.
///
/// Parsing checks the syntax and the flag combinations; argument binding is
/// checked by [`FormatPattern::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPattern {
    source: String,
    segments: Vec<Segment>,
}

impl FormatPattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> FormatResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(pos) = rest.find('%') {
            literal.push_str(&rest[..pos]);
            rest = &rest[pos..];

            let caps = match DIRECTIVE.captures(rest) {
                Some(caps) => caps,
                None => {
                    let after: String = rest.chars().nth(1).map(String::from).unwrap_or_else(|| "%".into());
                    return Err(FormatError::UnknownConversion(after));
                }
            };
            let matched = caps.get(0).map(|m| m.as_str()).unwrap_or_default();

            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Directive(parse_directive(matched, &caps)?));
            rest = &rest[matched.len()..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    /// The pattern as entered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of directives, including `%%` and `%n`.
    pub fn directive_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Directive(_)))
            .count()
    }

    /// Render one value through the pattern.
    pub fn render(&self, value: f64) -> FormatResult<String> {
        let mut out = String::new();
        let mut next_ordinary = 0usize;
        let mut last: Option<usize> = None;

        for segment in &self.segments {
            let directive = match segment {
                Segment::Literal(text) => {
                    out.push_str(text);
                    continue;
                }
                Segment::Directive(d) => d,
            };

            match directive.conversion {
                Conversion::Percent => {
                    out.push_str(&justify("%".to_string(), directive));
                    continue;
                }
                Conversion::LineSeparator => {
                    out.push('\n');
                    continue;
                }
                _ => {}
            }

            let index = match directive.index {
                ArgumentIndex::Ordinary => {
                    let i = next_ordinary;
                    next_ordinary += 1;
                    Some(i)
                }
                ArgumentIndex::Explicit(n) => n.checked_sub(1),
                ArgumentIndex::Previous => last,
            };
            match index {
                Some(i) if i < ARGUMENT_COUNT => last = Some(i),
                _ => return Err(FormatError::MissingArgument(directive.text.clone())),
            }

            out.push_str(&render_directive(directive, value));
        }

        Ok(out)
    }
}

impl fmt::Display for FormatPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// =============================================================================
// Parsing
// =============================================================================

fn parse_directive(text: &str, caps: &regex::Captures<'_>) -> FormatResult<Directive> {
    let flags = Flags::parse(caps.get(2).map(|m| m.as_str()).unwrap_or(""))?;

    let index = match caps.get(1) {
        Some(m) => {
            let n = m.as_str().trim_end_matches('$');
            let n = parse_bounded(n).ok_or_else(|| FormatError::ArgumentIndexOutOfRange(n.to_string()))?;
            ArgumentIndex::Explicit(n)
        }
        None if flags.previous => ArgumentIndex::Previous,
        None => ArgumentIndex::Ordinary,
    };
    let width = caps
        .get(3)
        .map(|m| parse_bounded(m.as_str()).ok_or_else(|| FormatError::WidthOutOfRange(m.as_str().to_string())))
        .transpose()?;
    let precision = caps
        .get(4)
        .map(|m| {
            let digits = m.as_str().trim_start_matches('.');
            parse_bounded(digits).ok_or_else(|| FormatError::PrecisionOutOfRange(digits.to_string()))
        })
        .transpose()?;

    let conversion_char = caps
        .get(6)
        .and_then(|m| m.as_str().chars().next())
        .unwrap_or('%');

    if let Some(prefix) = caps.get(5) {
        // Date/time conversions need a temporal argument.
        return Err(FormatError::IllegalConversion(
            prefix.as_str().chars().next().unwrap_or('t'),
        ));
    }

    let (conversion, uppercase) = match conversion_char {
        'f' => (Conversion::Decimal, false),
        'e' => (Conversion::Scientific, false),
        'E' => (Conversion::Scientific, true),
        'g' => (Conversion::General, false),
        'G' => (Conversion::General, true),
        'a' => (Conversion::HexFloat, false),
        'A' => (Conversion::HexFloat, true),
        's' => (Conversion::Text, false),
        'S' => (Conversion::Text, true),
        'b' => (Conversion::Boolean, false),
        'B' => (Conversion::Boolean, true),
        'h' => (Conversion::Hash, false),
        'H' => (Conversion::Hash, true),
        '%' => (Conversion::Percent, false),
        'n' => (Conversion::LineSeparator, false),
        'd' | 'o' | 'x' | 'X' | 'c' | 'C' | 't' | 'T' => {
            return Err(FormatError::IllegalConversion(conversion_char))
        }
        other => return Err(FormatError::UnknownConversion(other.to_string())),
    };

    let directive = Directive {
        text: text.to_string(),
        index,
        flags,
        width,
        precision,
        conversion,
        uppercase,
    };
    check_directive(&directive, conversion_char)?;
    Ok(directive)
}

/// Digits as a non-negative `i32`, returned as `usize`.
fn parse_bounded(digits: &str) -> Option<usize> {
    digits.parse::<i32>().ok().and_then(|n| usize::try_from(n).ok())
}

fn check_directive(d: &Directive, conversion_char: char) -> FormatResult<()> {
    let flags = &d.flags;
    match d.conversion {
        Conversion::Percent => {
            if let Some(p) = d.precision {
                return Err(FormatError::IllegalPrecision(p));
            }
            if !flags.numeric_only().is_empty() || flags.alternate || flags.previous {
                return Err(FormatError::IllegalFlags(d.text.clone()));
            }
            if flags.left_justify && d.width.is_none() {
                return Err(FormatError::MissingWidth(d.text.clone()));
            }
        }
        Conversion::LineSeparator => {
            if let Some(w) = d.width {
                return Err(FormatError::IllegalWidth(w));
            }
            if let Some(p) = d.precision {
                return Err(FormatError::IllegalPrecision(p));
            }
            if *flags != Flags::default() {
                return Err(FormatError::IllegalFlags(d.text.clone()));
            }
        }
        Conversion::Text | Conversion::Boolean | Conversion::Hash => {
            if flags.alternate {
                return Err(FormatError::FlagMismatch {
                    flag: '#',
                    conversion: conversion_char,
                });
            }
            if let Some(&flag) = flags.numeric_only().first() {
                return Err(FormatError::FlagMismatch {
                    flag,
                    conversion: conversion_char,
                });
            }
            if flags.left_justify && d.width.is_none() {
                return Err(FormatError::MissingWidth(d.text.clone()));
            }
        }
        Conversion::Decimal | Conversion::Scientific | Conversion::General | Conversion::HexFloat => {
            if flags.left_justify && flags.zero_pad {
                return Err(FormatError::IllegalFlags(d.text.clone()));
            }
            if flags.plus && flags.leading_space {
                return Err(FormatError::IllegalFlags(d.text.clone()));
            }
            if (flags.left_justify || flags.zero_pad) && d.width.is_none() {
                return Err(FormatError::MissingWidth(d.text.clone()));
            }
            if d.conversion == Conversion::Scientific && flags.group {
                return Err(FormatError::FlagMismatch {
                    flag: ',',
                    conversion: conversion_char,
                });
            }
            if d.conversion == Conversion::HexFloat {
                let rejected = [('(', flags.parentheses), (',', flags.group)];
                if let Some(&(flag, _)) = rejected.iter().find(|(_, set)| *set) {
                    return Err(FormatError::FlagMismatch {
                        flag,
                        conversion: conversion_char,
                    });
                }
            }
            if d.conversion == Conversion::General && flags.alternate {
                return Err(FormatError::FlagMismatch {
                    flag: '#',
                    conversion: conversion_char,
                });
            }
        }
    }
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

fn render_directive(d: &Directive, value: f64) -> String {
    let body = match d.conversion {
        Conversion::Decimal | Conversion::Scientific | Conversion::General | Conversion::HexFloat => {
            render_float(d, value)
        }
        Conversion::Text => truncate(shortest_text(value), d.precision),
        Conversion::Boolean => truncate("true".to_string(), d.precision),
        Conversion::Hash => truncate(format!("{:x}", hash_code(value)), d.precision),
        Conversion::Percent | Conversion::LineSeparator => String::new(),
    };
    let body = if d.uppercase {
        body.to_uppercase()
    } else {
        body
    };
    justify(body, d)
}

fn render_float(d: &Directive, value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }

    let flags = &d.flags;
    let negative = value.is_sign_negative();
    let mut out = String::new();

    if negative {
        out.push(if flags.parentheses { '(' } else { '-' });
    } else if flags.plus {
        out.push('+');
    } else if flags.leading_space {
        out.push(' ');
    }

    if value.is_infinite() {
        out.push_str("Infinity");
    } else {
        let (mut magnitude, suffix) = if d.conversion == Conversion::HexFloat {
            out.push_str("0x");
            hex_float(value.abs(), d.precision)
        } else {
            float_magnitude(d, &Decimal::from_f64(value))
        };

        if flags.zero_pad {
            if let Some(width) = d.width {
                let closing = usize::from(negative && flags.parentheses);
                let target = width.saturating_sub(suffix.len() + closing);
                let pad = target.saturating_sub(out.len() + magnitude.len());
                magnitude.insert_str(0, &"0".repeat(pad));
            }
        }
        out.push_str(&magnitude);
        out.push_str(&suffix);
    }

    if negative && flags.parentheses {
        out.push(')');
    }
    out
}

/// Digits of the magnitude and the exponent suffix (empty for decimal form).
fn float_magnitude(d: &Directive, decimal: &Decimal) -> (String, String) {
    let flags = &d.flags;
    match d.conversion {
        Conversion::Scientific => {
            let precision = d.precision.unwrap_or(DEFAULT_PRECISION);
            scientific(decimal, precision, flags.alternate)
        }
        Conversion::General => {
            let precision = match d.precision {
                None => DEFAULT_PRECISION,
                Some(0) => 1,
                Some(p) => p,
            };
            if decimal.is_zero() {
                return (fixed(decimal, precision - 1, flags), String::new());
            }
            let exponent = i64::from(decimal.rounded_significant(precision).exponent());
            if exponent < -4 || exponent >= precision as i64 {
                scientific(decimal, precision - 1, false)
            } else {
                let places = (precision as i64 - exponent - 1) as usize;
                (fixed(decimal, places, flags), String::new())
            }
        }
        _ => {
            let precision = d.precision.unwrap_or(DEFAULT_PRECISION);
            (fixed(decimal, precision, flags), String::new())
        }
    }
}

fn fixed(decimal: &Decimal, precision: usize, flags: &Flags) -> String {
    let (integer, fraction) = decimal.to_fixed(precision);
    let mut out = if flags.group {
        group_thousands(&integer)
    } else {
        integer
    };
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(&fraction);
    } else if flags.alternate {
        out.push('.');
    }
    out
}

fn scientific(decimal: &Decimal, precision: usize, alternate: bool) -> (String, String) {
    let (lead, fraction, exponent) = decimal.to_scientific(precision);
    let mut mantissa = lead.to_string();
    if !fraction.is_empty() {
        mantissa.push('.');
        mantissa.push_str(&fraction);
    } else if alternate {
        mantissa.push('.');
    }
    let sign = if exponent < 0 { '-' } else { '+' };
    (mantissa, format!("e{}{:02}", sign, exponent.abs()))
}

fn shortest_text(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    if value.is_infinite() {
        return format!("{}Infinity", sign);
    }
    format!("{}{}", sign, Decimal::from_f64(value).to_shortest())
}

/// Hash of the canonical bit pattern, folded to 32 bits.
fn hash_code(value: f64) -> u32 {
    let bits = if value.is_nan() {
        0x7ff8_0000_0000_0000u64
    } else {
        value.to_bits()
    };
    (bits ^ (bits >> 32)) as u32
}

fn truncate(s: String, precision: Option<usize>) -> String {
    match precision {
        Some(p) if p < s.chars().count() => s.chars().take(p).collect(),
        _ => s,
    }
}

fn justify(body: String, d: &Directive) -> String {
    let width = match d.width {
        Some(w) => w,
        None => return body,
    };
    let len = body.chars().count();
    if len >= width {
        return body;
    }
    let pad = " ".repeat(width - len);
    if d.flags.left_justify {
        body + &pad
    } else {
        pad + &body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(pattern: &str, value: f64) -> String {
        FormatPattern::parse(pattern).unwrap().render(value).unwrap()
    }

    fn parse_err(pattern: &str) -> FormatError {
        FormatPattern::parse(pattern).unwrap_err()
    }

    #[test]
    fn test_decimal() {
        assert_eq!(fmt("%.3f", 0.0123456789), "0.012");
        assert_eq!(fmt("%.2f", 3.14159), "3.14");
        assert_eq!(fmt("%f", 1.5), "1.500000");
        assert_eq!(fmt("%.0f", 2.5), "3");
        assert_eq!(fmt("%#.0f", 2.0), "2.");
        assert_eq!(fmt("%.2f", -0.0), "-0.00");
    }

    #[test]
    fn test_scientific() {
        assert_eq!(fmt("%e", 0.0123456789), "1.234568e-02");
        assert_eq!(fmt("%.2E", 12345.678), "1.23E+04");
        assert_eq!(fmt("%.0e", 5.0), "5e+00");
        assert_eq!(fmt("%e", 0.0), "0.000000e+00");
        assert_eq!(fmt("%.1e", 1.0e-100), "1.0e-100");
    }

    #[test]
    fn test_general() {
        assert_eq!(fmt("%g", 0.0123456789), "0.0123457");
        assert_eq!(fmt("%g", 123456789.0), "1.23457e+08");
        assert_eq!(fmt("%g", 0.00001234), "1.23400e-05");
        assert_eq!(fmt("%g", 0.0), "0.00000");
        assert_eq!(fmt("%.3G", 1234.5), "1.23E+03");
        assert_eq!(fmt("%g", 9.9999999), "10.0000");
    }

    #[test]
    fn test_flags_and_width() {
        assert_eq!(fmt("%,.2f", 1234567.891), "1,234,567.89");
        assert_eq!(fmt("%+.1f", 2.0), "+2.0");
        assert_eq!(fmt("% .1f", 2.0), " 2.0");
        assert_eq!(fmt("%(.1f", -2.0), "(2.0)");
        assert_eq!(fmt("%08.2f", -3.14159), "-0003.14");
        assert_eq!(fmt("%(08.2f", -3.14159), "(003.14)");
        assert_eq!(fmt("%010.2e", 31.4), "003.14e+01");
        assert_eq!(fmt("%8.2f", 3.14159), "    3.14");
        assert_eq!(fmt("%-8.2f|", 3.14159), "3.14    |");
    }

    #[test]
    fn test_hex_float() {
        assert_eq!(fmt("%a", 0.0123456789), "0x1.948b0f8fab5e6p-7");
        assert_eq!(fmt("%a", 1.0), "0x1.0p0");
        assert_eq!(fmt("%a", 0.0), "0x0.0p0");
        assert_eq!(fmt("%A", 0.1), "0X1.999999999999AP-4");
        assert_eq!(fmt("%.1a", 0.1), "0x1.ap-4");
        assert_eq!(fmt("%.2a", 1.5), "0x1.80p0");
        assert_eq!(fmt("%a", f64::from_bits(1)), "0x0.0000000000001p-1022");
        assert_eq!(fmt("%+a", 1.0), "+0x1.0p0");
        assert_eq!(fmt("% a", 1.0), " 0x1.0p0");
        assert_eq!(fmt("%a", -1.0), "-0x1.0p0");
        assert_eq!(fmt("%#a", 1.5), "0x1.8p0");
        assert_eq!(fmt("%012a", 1.5), "0x000001.8p0");
        assert_eq!(fmt("%012a", -1.5), "-0x00001.8p0");
        assert_eq!(fmt("%-10a|", 1.5), "0x1.8p0   |");
        assert_eq!(fmt("%a", f64::NEG_INFINITY), "-Infinity");
        assert_eq!(fmt("%A", f64::NAN), "NAN");

        assert_eq!(parse_err("%,a"), FormatError::FlagMismatch { flag: ',', conversion: 'a' });
        assert_eq!(parse_err("%(a"), FormatError::FlagMismatch { flag: '(', conversion: 'a' });
        assert!(matches!(parse_err("%-a"), FormatError::MissingWidth(_)));
    }

    #[test]
    fn test_numbers_beyond_i32_rejected() {
        assert_eq!(
            parse_err("%.2147483648f"),
            FormatError::PrecisionOutOfRange("2147483648".into())
        );
        assert_eq!(
            parse_err("%.3000000000f"),
            FormatError::PrecisionOutOfRange("3000000000".into())
        );
        assert_eq!(
            parse_err("%99999999999999999999f"),
            FormatError::WidthOutOfRange("99999999999999999999".into())
        );
        assert_eq!(
            parse_err("%4294967297$f"),
            FormatError::ArgumentIndexOutOfRange("4294967297".into())
        );

        let widest = FormatPattern::parse("%2147483647.1f").unwrap();
        assert_eq!(widest.directive_count(), 1);
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(fmt("%.2f", f64::NAN), "NaN");
        assert_eq!(fmt("%+.2f", f64::INFINITY), "+Infinity");
        assert_eq!(fmt("%.2f", f64::NEG_INFINITY), "-Infinity");
        assert_eq!(fmt("%E", f64::INFINITY), "INFINITY");
        assert_eq!(fmt("%08.2f", f64::NAN), "     NaN");
    }

    #[test]
    fn test_general_conversions() {
        assert_eq!(fmt("%s", 100.0), "100.0");
        assert_eq!(fmt("%s", 0.0001), "1.0E-4");
        assert_eq!(fmt("%.3s", 3.14159), "3.1");
        assert_eq!(fmt("%b", 0.0), "true");
        assert_eq!(fmt("%B", 1.0), "TRUE");
        assert_eq!(fmt("%h", 1.0), "3ff00000");
        assert_eq!(fmt("%S", f64::NAN), "NAN");
    }

    #[test]
    fn test_literals_percent_and_newline() {
        assert_eq!(fmt("value: %.1f%%", 42.0), "value: 42.0%");
        assert_eq!(fmt("%.1f%n", 1.0), "1.0\n");
        assert_eq!(fmt("no directives", 1.0), "no directives");
        assert_eq!(fmt("%5%", 1.0), "    %");
    }

    #[test]
    fn test_argument_indexes() {
        assert_eq!(fmt("%1$.1f / %1$.2f", 1.0), "1.0 / 1.00");
        assert_eq!(fmt("%.1f %<.3f", 1.0), "1.0 1.000");

        let two = FormatPattern::parse("%f %f").unwrap();
        assert!(matches!(two.render(1.0), Err(FormatError::MissingArgument(d)) if d == "%f"));

        let second = FormatPattern::parse("%2$f").unwrap();
        assert!(second.render(1.0).is_err());

        let previous = FormatPattern::parse("%<f").unwrap();
        assert!(previous.render(1.0).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_err("%zzz"), FormatError::UnknownConversion("z".into()));
        assert_eq!(parse_err("50%"), FormatError::UnknownConversion("%".into()));
        assert_eq!(parse_err("%d"), FormatError::IllegalConversion('d'));
        assert_eq!(parse_err("%tY"), FormatError::IllegalConversion('t'));
        assert_eq!(parse_err("%T"), FormatError::IllegalConversion('T'));
        assert!(matches!(parse_err("%-f"), FormatError::MissingWidth(_)));
        assert!(matches!(parse_err("%-08f"), FormatError::IllegalFlags(_)));
        assert!(matches!(parse_err("%+ f"), FormatError::IllegalFlags(_)));
        assert!(matches!(parse_err("%++f"), FormatError::IllegalFlags(_)));
        assert_eq!(
            parse_err("%,e"),
            FormatError::FlagMismatch { flag: ',', conversion: 'e' }
        );
        assert_eq!(
            parse_err("%#g"),
            FormatError::FlagMismatch { flag: '#', conversion: 'g' }
        );
        assert_eq!(
            parse_err("%+s"),
            FormatError::FlagMismatch { flag: '+', conversion: 's' }
        );
        assert_eq!(parse_err("%.2%"), FormatError::IllegalPrecision(2));
        assert_eq!(parse_err("%5n"), FormatError::IllegalWidth(5));
    }

    #[test]
    fn test_directive_count() {
        let pattern = FormatPattern::parse("[%.2f] %%").unwrap();
        assert_eq!(pattern.directive_count(), 2);
        assert_eq!(pattern.to_string(), "[%.2f] %%");
    }
}
