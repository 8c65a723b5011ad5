//! Field descriptors.

use std::fmt;

use crate::options::MAX_FIELD_NAME_LEN;
use crate::types::Type;
use crate::version::Version;
use crate::{Error, Result};

/// Right-justified rendering pattern of a numeric field.
///
/// Equivalent to `%<width>.<decimals>f`, or `%<width>d` when `decimals` is 0.
/// Always uses `.` as the decimal separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    width: usize,
    decimals: usize,
}

impl NumberFormat {
    fn new(width: usize, decimals: usize) -> Self {
        Self { width, decimals }
    }

    /// Characters available in front of the decimal point.
    pub fn integer_width(&self) -> usize {
        if self.decimals == 0 {
            self.width
        } else {
            self.width.saturating_sub(self.decimals + 1)
        }
    }

    /// Digits after the decimal point.
    pub fn decimals(&self) -> usize {
        self.decimals
    }

    /// Render an integer.
    pub fn format_int(&self, value: i128) -> String {
        if self.decimals == 0 {
            format!("{:>w$}", value, w = self.width)
        } else {
            format!("{:>w$}.{}", value, "0".repeat(self.decimals), w = self.integer_width())
        }
    }

    /// Render a float, rounded to the field's decimals.
    pub fn format_float(&self, value: f64) -> String {
        if self.decimals == 0 {
            format!("{:>w$}", value.round() as i128, w = self.width)
        } else {
            format!("{:>w$.d$}", value, w = self.width, d = self.decimals)
        }
    }

    /// Render a scaled decimal `digits × 10^-scale`.
    pub fn format_decimal(&self, digits: i128, scale: u32) -> String {
        let target = self.decimals as u32;
        let rescaled = rescale(digits, scale, target);
        if target == 0 {
            return format!("{:>w$}", rescaled, w = self.width);
        }
        let unit = 10i128.pow(target);
        let abs = rescaled.unsigned_abs();
        let int = abs / unit as u128;
        let frac = abs % unit as u128;
        let sign = if rescaled < 0 { "-" } else { "" };
        let text = format!("{}{}.{:0d$}", sign, int, frac, d = self.decimals);
        format!("{:>w$}", text, w = self.width)
    }
}

/// Change the scale of `digits × 10^-from` to `to`, rounding half away from zero.
fn rescale(digits: i128, from: u32, to: u32) -> i128 {
    if to >= from {
        digits.saturating_mul(10i128.saturating_pow(to - from))
    } else {
        let div = 10i128.saturating_pow(from - to);
        let q = digits / div;
        let r = digits % div;
        if r.abs() * 2 >= div {
            q + digits.signum()
        } else {
            q
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            write!(f, "%{}d", self.width)
        } else {
            write!(f, "%{}.{}f", self.width, self.decimals)
        }
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    field_type: Type,
    length: usize,
    decimals: usize,
    format: NumberFormat,
}

impl Field {
    /// Create a field.
    ///
    /// Types with an inherent length (Logical, Date, memo types) ignore
    /// `length`; non-numeric types ignore `decimals`.
    pub fn new(name: impl Into<String>, field_type: Type, length: usize, decimals: usize) -> Self {
        let length = field_type.fixed_length().unwrap_or(length);
        let decimals = if field_type.is_numeric() { decimals } else { 0 };
        Self {
            name: name.into(),
            field_type,
            length,
            decimals,
            format: NumberFormat::new(length, decimals),
        }
    }

    /// Field exactly as found in a header, without length normalisation.
    pub(crate) fn from_descriptor(name: String, field_type: Type, length: usize, decimals: usize) -> Self {
        Self {
            name,
            field_type,
            length,
            decimals,
            format: NumberFormat::new(length, decimals),
        }
    }

    /// Character field of the given length.
    pub fn character(name: impl Into<String>, length: usize) -> Self {
        Self::new(name, Type::Character, length, 0)
    }

    /// Number field.
    pub fn number(name: impl Into<String>, length: usize, decimals: usize) -> Self {
        Self::new(name, Type::Number, length, decimals)
    }

    /// Logical field.
    pub fn logical(name: impl Into<String>) -> Self {
        Self::new(name, Type::Logical, 1, 0)
    }

    /// Date field.
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, Type::Date, 8, 0)
    }

    /// Memo field.
    pub fn memo(name: impl Into<String>) -> Self {
        Self::new(name, Type::Memo, 10, 0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> Type {
        self.field_type
    }

    /// Bytes occupied in a record.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn decimals(&self) -> usize {
        self.decimals
    }

    /// Precomputed numeric rendering pattern.
    pub fn format(&self) -> &NumberFormat {
        &self.format
    }

    /// Check the definition against a dialect before it is written.
    pub fn validate(&self, version: Version) -> Result<()> {
        let bytes = self.name.len();
        if bytes == 0 || bytes > MAX_FIELD_NAME_LEN || self.name.contains('\0') {
            return Err(Error::InvalidFieldName(self.name.clone()));
        }
        version.check_field(&self.name, self.field_type, self.length, self.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_lengths_override() {
        let f = Field::new("FLAG", Type::Logical, 40, 3);
        assert_eq!(f.length(), 1);
        assert_eq!(f.decimals(), 0);

        let f = Field::new("NOTES", Type::Memo, 0, 0);
        assert_eq!(f.length(), 10);

        let f = Field::new("NAME", Type::Character, 20, 2);
        assert_eq!(f.decimals(), 0);
    }

    #[test]
    fn test_format_pattern() {
        assert_eq!(Field::number("N", 5, 0).format().to_string(), "%5d");
        assert_eq!(Field::number("N", 10, 2).format().to_string(), "%10.2f");
    }

    #[test]
    fn test_format_values() {
        let f = Field::number("N", 5, 0);
        assert_eq!(f.format().format_int(12345), "12345");
        assert_eq!(f.format().format_int(-42), "  -42");
        assert_eq!(f.format().format_float(2.5), "    3");

        let f = Field::number("N", 8, 2);
        assert_eq!(f.format().format_int(7), "    7.00");
        assert_eq!(f.format().format_float(-3.14159), "   -3.14");
        assert_eq!(f.format().format_decimal(123456, 3), "  123.46");
        assert_eq!(f.format().format_decimal(-5, 0), "   -5.00");
        assert_eq!(f.format().integer_width(), 5);
    }

    #[test]
    fn test_validate_name() {
        assert!(Field::character("ABCDEFGHIJ", 5).validate(Version::DBase3).is_ok());
        assert!(matches!(
            Field::character("ABCDEFGHIJK", 5).validate(Version::DBase3),
            Err(Error::InvalidFieldName(_))
        ));
        assert!(matches!(
            Field::character("", 5).validate(Version::DBase3),
            Err(Error::InvalidFieldName(_))
        ));
    }

    #[test]
    fn test_validate_delegates_to_dialect() {
        assert!(matches!(
            Field::new("F", Type::Float, 10, 2).validate(Version::DBase3),
            Err(Error::InvalidFieldType { .. })
        ));
        assert!(matches!(
            Field::character("C", 300).validate(Version::DBase3),
            Err(Error::InvalidFieldLength { .. })
        ));
    }
}
