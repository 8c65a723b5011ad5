//! Numeric values of Number and Float fields.

use std::fmt;

use crate::util::coding::{float_int_digits, int_digits, trim_field};
use crate::{Error, Result};

/// Integral text shorter than this decodes to `Int`.
const INT_DIGITS: usize = 10;
/// Integral text shorter than this decodes to `Long`.
const LONG_DIGITS: usize = 19;
/// Fractional text shorter than this decodes to `Double`.
const DOUBLE_DIGITS: usize = 14;

/// A decoded number, in the narrowest representation its text allows.
///
/// Fractional values of 14 characters or more decode to `Decimal` to keep
/// every digit; shorter ones go through `f64` and may round in the last place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Long(i64),
    BigInt(i128),
    Double(f64),
    /// `digits × 10^-scale`.
    Decimal { digits: i128, scale: u32 },
}

impl Number {
    /// Parse the text of a numeric field. Blank or `"."` is an empty value.
    pub fn decode(raw: &[u8]) -> Result<Option<Number>> {
        let trimmed = trim_field(raw);
        let text = std::str::from_utf8(trimmed)
            .map_err(|_| Error::corrupted(format!("non-ASCII number {:?}", trimmed)))?;
        if text.is_empty() || text == "." {
            return Ok(None);
        }

        let bad = || Error::corrupted(format!("invalid number '{}'", text));
        let n = if !text.contains('.') {
            if text.len() < INT_DIGITS {
                Number::Int(text.parse().map_err(|_| bad())?)
            } else if text.len() < LONG_DIGITS {
                Number::Long(text.parse().map_err(|_| bad())?)
            } else {
                Number::BigInt(text.parse().map_err(|_| bad())?)
            }
        } else if text.len() < DOUBLE_DIGITS {
            Number::Double(text.parse().map_err(|_| bad())?)
        } else {
            parse_decimal(text).ok_or_else(bad)?
        };
        Ok(Some(n))
    }

    /// Whether the value is below zero.
    pub fn is_negative(&self) -> bool {
        match *self {
            Number::Int(v) => v < 0,
            Number::Long(v) => v < 0,
            Number::BigInt(v) => v < 0,
            Number::Double(v) => v < 0.0,
            Number::Decimal { digits, .. } => digits < 0,
        }
    }

    /// Digits before the decimal point, at least 1.
    pub fn int_digits(&self) -> usize {
        match *self {
            Number::Int(v) => int_digits(v.unsigned_abs() as u128),
            Number::Long(v) => int_digits(v.unsigned_abs() as u128),
            Number::BigInt(v) => int_digits(v.unsigned_abs()),
            Number::Double(v) => float_int_digits(v),
            Number::Decimal { digits, scale } => {
                let unit = 10u128.checked_pow(scale).unwrap_or(u128::MAX);
                int_digits(digits.unsigned_abs() / unit)
            }
        }
    }

    /// Lossy conversion to `f64`.
    pub fn to_f64(&self) -> f64 {
        match *self {
            Number::Int(v) => v as f64,
            Number::Long(v) => v as f64,
            Number::BigInt(v) => v as f64,
            Number::Double(v) => v,
            Number::Decimal { digits, scale } => digits as f64 / 10f64.powi(scale as i32),
        }
    }

    /// The value as `i64`, if it is integral and in range.
    pub fn to_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(v) => Some(v as i64),
            Number::Long(v) => Some(v),
            Number::BigInt(v) => i64::try_from(v).ok(),
            Number::Double(v) if v.fract() == 0.0 && v.abs() < 9.2e18 => Some(v as i64),
            Number::Double(_) => None,
            Number::Decimal { digits, scale } => {
                let unit = 10i128.checked_pow(scale)?;
                if digits % unit == 0 {
                    i64::try_from(digits / unit).ok()
                } else {
                    None
                }
            }
        }
    }
}

fn parse_decimal(text: &str) -> Option<Number> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (int, frac) = body.split_once('.')?;
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    if !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits: i128 = 0;
    for b in int.bytes().chain(frac.bytes()) {
        digits = digits.checked_mul(10)?.checked_add((b - b'0') as i128)?;
    }
    Some(Number::Decimal {
        digits: if negative { -digits } else { digits },
        scale: frac.len() as u32,
    })
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(v) => write!(f, "{}", v),
            Number::Long(v) => write!(f, "{}", v),
            Number::BigInt(v) => write!(f, "{}", v),
            Number::Double(v) => write!(f, "{}", v),
            Number::Decimal { digits, scale } => {
                if scale == 0 {
                    return write!(f, "{}", digits);
                }
                let abs = digits.unsigned_abs().to_string();
                let scale = scale as usize;
                let padded = format!("{:0>w$}", abs, w = scale + 1);
                let (int, frac) = padded.split_at(padded.len() - scale);
                let sign = if digits < 0 { "-" } else { "" };
                write!(f, "{}{}.{}", sign, int, frac)
            }
        }
    }
}

macro_rules! number_from {
    ($($t:ty => $variant:ident as $as:ty),* $(,)?) => {
        $(
            impl From<$t> for Number {
                fn from(v: $t) -> Self {
                    Number::$variant(v as $as)
                }
            }
        )*
    };
}

number_from! {
    i8 => Int as i32,
    i16 => Int as i32,
    i32 => Int as i32,
    u8 => Int as i32,
    u16 => Int as i32,
    u32 => Long as i64,
    i64 => Long as i64,
    u64 => BigInt as i128,
    i128 => BigInt as i128,
    f32 => Double as f64,
    f64 => Double as f64,
}
