//! Format pattern engine.
//!
//! - `pattern`: parse a printf-style pattern and render one double through it
//! - `decimal`: half-up decimal rounding on shortest digits
//! - `hex`: hexadecimal significand and exponent for `%a`

mod decimal;
mod hex;
pub mod pattern;

pub use pattern::FormatPattern;
