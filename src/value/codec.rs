//! Per-type conversion between field bytes and typed values.
//!
//! For memo-typed fields the bytes handled here are the memo content; the
//! inline block pointer is managed by the table.

use std::borrow::Cow;

use crate::charset::Charset;
use crate::field::Field;
use crate::types::Type;
use crate::util::coding::strip_soft_returns;
use crate::value::validate;
use crate::value::{DbfDate, Number, TypedValue};
use crate::{Error, Result};

/// Decode field bytes of type `field_type`.
pub fn decode(raw: &[u8], field_type: Type, charset: &Charset) -> Result<Option<TypedValue>> {
    let typed = match field_type {
        Type::Character => {
            let mut bytes = strip_soft_returns(raw);
            let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
            bytes.truncate(end);
            Some(TypedValue::Text(charset.decode(&bytes)))
        }
        Type::Number | Type::Float => Number::decode(raw)?.map(TypedValue::Number),
        Type::Logical => match raw.first() {
            None | Some(b' ') => None,
            Some(&c) => Some(TypedValue::Logical(matches!(c, b'Y' | b'y' | b'T' | b't'))),
        },
        Type::Date => DbfDate::decode(raw)?.map(TypedValue::Date),
        Type::Memo => Some(TypedValue::Text(charset.decode(raw))),
        Type::Binary | Type::General | Type::Picture => Some(TypedValue::Bytes(raw.to_vec())),
    };
    Ok(typed)
}

/// Encode a typed value for `field`.
///
/// Fails with `DataMismatch` for incompatible values and with
/// `ValueTooLarge` when the result does not fit.
pub fn encode(value: &TypedValue, field: &Field, charset: &Charset) -> Result<Vec<u8>> {
    validate::check(field.name(), field.field_type(), value)?;

    match field.field_type() {
        Type::Character => {
            let mut bytes = charset.encode(&as_text(value))?;
            if bytes.len() > field.length() {
                return Err(Error::too_large(field.name(), field.length()));
            }
            bytes.resize(field.length(), 0);
            Ok(bytes)
        }
        Type::Number | Type::Float => match value {
            TypedValue::Number(n) => encode_number(n, field),
            _ => Err(mismatch(value, field)),
        },
        Type::Logical => match value {
            TypedValue::Logical(true) => Ok(vec![b'T']),
            TypedValue::Logical(false) => Ok(vec![b'F']),
            TypedValue::Text(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(mismatch(value, field)),
        },
        Type::Date => match value {
            TypedValue::Date(d) => Ok(d.encode().to_vec()),
            TypedValue::Text(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(mismatch(value, field)),
        },
        Type::Memo => charset.encode(&as_text(value)),
        Type::Binary | Type::General | Type::Picture => match value {
            TypedValue::Bytes(b) => Ok(b.clone()),
            _ => Err(mismatch(value, field)),
        },
    }
}

/// Bytes written for an empty value: spaces inline, no memo content.
pub fn encode_null(field: &Field) -> Vec<u8> {
    if field.field_type().is_memo() {
        Vec::new()
    } else {
        vec![b' '; field.length()]
    }
}

fn encode_number(n: &Number, field: &Field) -> Result<Vec<u8>> {
    if let Number::Double(v) = *n {
        if !v.is_finite() {
            return Err(Error::mismatch(format!(
                "field {}: cannot store {}",
                field.name(),
                v
            )));
        }
    }

    let format = field.format();
    let sign = usize::from(n.is_negative());
    if sign.saturating_add(n.int_digits()) > format.integer_width() {
        return Err(Error::too_large(field.name(), field.length()));
    }

    let text = match *n {
        Number::Int(v) => format.format_int(v as i128),
        Number::Long(v) => format.format_int(v as i128),
        Number::BigInt(v) => format.format_int(v),
        Number::Double(v) => format.format_float(v),
        Number::Decimal { digits, scale } => format.format_decimal(digits, scale),
    };

    // rounding may still carry into a new digit
    if text.len() > field.length() {
        return Err(Error::too_large(field.name(), field.length()));
    }
    let mut bytes = text.into_bytes();
    bytes.resize(field.length(), 0);
    Ok(bytes)
}

fn as_text(value: &TypedValue) -> Cow<'_, str> {
    match value {
        TypedValue::Text(s) => Cow::Borrowed(s),
        TypedValue::Number(n) => Cow::Owned(n.to_string()),
        TypedValue::Logical(true) => Cow::Borrowed("T"),
        TypedValue::Logical(false) => Cow::Borrowed("F"),
        TypedValue::Date(d) => Cow::Owned(String::from_utf8_lossy(&d.encode()).into_owned()),
        TypedValue::Bytes(b) => String::from_utf8_lossy(b),
    }
}

fn mismatch(value: &TypedValue, field: &Field) -> Error {
    Error::mismatch(format!(
        "cannot write {} to {} field {}",
        value.kind(),
        field.field_type(),
        field.name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cs() -> Charset {
        Charset::default()
    }

    fn text(s: &str) -> TypedValue {
        TypedValue::Text(s.to_string())
    }

    #[test]
    fn test_character_length_enforcement() {
        let f = Field::character("NAME", 5);
        assert!(matches!(
            encode(&text("ABCDEF"), &f, &cs()),
            Err(Error::ValueTooLarge { .. })
        ));
        assert_eq!(encode(&text("ABCDE"), &f, &cs()).unwrap(), b"ABCDE");
        assert_eq!(encode(&text("ABCD"), &f, &cs()).unwrap(), b"ABCD\0");
    }

    #[test]
    fn test_character_decode() {
        assert_eq!(
            decode(b"AB\x8D\x0ACD\0\0", Type::Character, &cs()).unwrap(),
            Some(text("ABCD"))
        );
        assert_eq!(
            decode(b"padded    ", Type::Character, &cs()).unwrap(),
            Some(text("padded    "))
        );
    }

    #[test]
    fn test_character_renders_scalars() {
        let f = Field::character("C", 8);
        assert_eq!(
            encode(&TypedValue::Number(Number::Int(-12)), &f, &cs()).unwrap(),
            b"-12\0\0\0\0\0"
        );
        assert_eq!(
            encode(&TypedValue::Date(DbfDate::new(1999, 12, 31)), &f, &cs()).unwrap(),
            b"19991231"
        );
        let short = Field::character("C", 6);
        assert!(matches!(
            encode(&TypedValue::Date(DbfDate::new(1999, 12, 31)), &short, &cs()),
            Err(Error::ValueTooLarge { .. })
        ));
    }

    #[test]
    fn test_number_overflow() {
        let f = Field::number("N", 5, 0);
        let big = TypedValue::Number(Number::Int(123456));
        assert!(matches!(
            encode(&big, &f, &cs()),
            Err(Error::ValueTooLarge { .. })
        ));
        let ok = TypedValue::Number(Number::Int(12345));
        assert_eq!(encode(&ok, &f, &cs()).unwrap(), b"12345");
        let neg = TypedValue::Number(Number::Int(-1234));
        assert_eq!(encode(&neg, &f, &cs()).unwrap(), b"-1234");
        let neg = TypedValue::Number(Number::Int(-12345));
        assert!(encode(&neg, &f, &cs()).is_err());
    }

    #[test]
    fn test_number_with_decimals() {
        let f = Field::number("N", 7, 2);
        let v = TypedValue::Number(Number::Double(3.14159));
        assert_eq!(encode(&v, &f, &cs()).unwrap(), b"   3.14");
        let v = TypedValue::Number(Number::Int(1234));
        assert_eq!(encode(&v, &f, &cs()).unwrap(), b"1234.00");
        let v = TypedValue::Number(Number::Int(12345));
        assert!(encode(&v, &f, &cs()).is_err());
        // 9999.999 rounds to 10000.00
        let v = TypedValue::Number(Number::Double(9999.999));
        assert!(matches!(
            encode(&v, &f, &cs()),
            Err(Error::ValueTooLarge { .. })
        ));
    }

    #[test]
    fn test_number_rejects_non_finite() {
        let f = Field::number("N", 7, 2);
        for x in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let v = TypedValue::Number(Number::Double(x));
            assert!(matches!(encode(&v, &f, &cs()), Err(Error::DataMismatch(_))), "{}", x);
        }
    }

    #[test]
    fn test_logical() {
        let f = Field::logical("L");
        assert_eq!(encode(&TypedValue::Logical(true), &f, &cs()).unwrap(), b"T");
        assert_eq!(encode(&TypedValue::Logical(false), &f, &cs()).unwrap(), b"F");
        assert_eq!(encode(&text("Y"), &f, &cs()).unwrap(), b"Y");
        assert_eq!(encode_null(&f), b" ");

        for (raw, expected) in [
            (b"T", Some(true)),
            (b"y", Some(true)),
            (b"N", Some(false)),
            (b"?", Some(false)),
            (b" ", None),
        ] {
            let decoded = decode(raw, Type::Logical, &cs()).unwrap();
            assert_eq!(decoded, expected.map(TypedValue::Logical));
        }
    }

    #[test]
    fn test_date() {
        let f = Field::date("D");
        let d = TypedValue::Date(DbfDate::new(1909, 3, 18));
        assert_eq!(encode(&d, &f, &cs()).unwrap(), b"19090318");
        assert_eq!(decode(b"19090318", Type::Date, &cs()).unwrap(), Some(d));
        assert_eq!(encode_null(&f), b"        ");
    }

    #[test]
    fn test_memo_has_no_ceiling() {
        let f = Field::memo("M");
        let long = "x".repeat(2000);
        assert_eq!(encode(&text(&long), &f, &cs()).unwrap().len(), 2000);
        assert!(encode_null(&f).is_empty());
    }

    #[test]
    fn test_binary_passthrough() {
        let f = Field::new("B", Type::Binary, 10, 0);
        let v = TypedValue::Bytes(vec![0, 0x1A, 0xFF]);
        assert_eq!(encode(&v, &f, &cs()).unwrap(), vec![0, 0x1A, 0xFF]);
        assert_eq!(decode(&[0, 0x1A, 0xFF], Type::Binary, &cs()).unwrap(), Some(v));
    }
}
