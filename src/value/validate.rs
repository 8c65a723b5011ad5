//! Compatibility of typed values with field types.

use crate::types::Type;
use crate::value::TypedValue;
use crate::{Error, Result};

/// Check that `value` may be written to a field of type `field_type`.
pub fn check(field_name: &str, field_type: Type, value: &TypedValue) -> Result<()> {
    let ok = match (field_type, value) {
        (Type::Character | Type::Memo, TypedValue::Bytes(_)) => false,
        (Type::Character | Type::Memo, _) => true,
        (Type::Number | Type::Float, TypedValue::Number(_)) => true,
        (Type::Logical, TypedValue::Logical(_)) => true,
        (Type::Logical, TypedValue::Text(s)) => {
            if !matches!(s.as_str(), "Y" | "N" | "T" | "F" | " ") {
                return Err(Error::mismatch(format!(
                    "field {}: logical text must be one of Y, N, T, F or a space, got '{}'",
                    field_name, s
                )));
            }
            true
        }
        (Type::Date, TypedValue::Date(_)) => true,
        (Type::Date, TypedValue::Text(s)) => {
            if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::mismatch(format!(
                    "field {}: '{}' is not a YYYYMMDD date",
                    field_name, s
                )));
            }
            true
        }
        (Type::Binary | Type::General | Type::Picture, TypedValue::Bytes(_)) => true,
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(Error::mismatch(format!(
            "cannot write {} to {} field {}",
            value.kind(),
            field_type,
            field_name
        )))
    }
}
