//! Field values.
//!
//! A [`Value`] is created either from typed data (when building a record to
//! append) or from raw field bytes (when reading). The other representation
//! is computed on first use and cached for the lifetime of the value:
//!
//! ```text
//!   Value::from(typed)          Value::from_raw(bytes)
//!          |                              |
//!   typed cell = set              raw cell = set (+ field shape)
//!          |                              |
//!   raw_for(field) -> encode      typed() -> decode
//! ```
//!
//! Raw bytes of memo-typed fields are the memo content, not the block
//! pointer stored in the record.

pub(crate) mod codec;
mod date;
mod number;
mod validate;

pub use date::DbfDate;
pub use number::Number;

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDate;
use once_cell::unsync::OnceCell;

use crate::charset::Charset;
use crate::field::Field;
use crate::types::Type;
use crate::{Error, Result};

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Text(String),
    Number(Number),
    Logical(bool),
    Date(DbfDate),
    Bytes(Vec<u8>),
}

impl TypedValue {
    /// Name of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Text(_) => "text",
            TypedValue::Number(_) => "number",
            TypedValue::Logical(_) => "logical",
            TypedValue::Date(_) => "date",
            TypedValue::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Text(s) => f.write_str(s),
            TypedValue::Number(n) => write!(f, "{}", n),
            TypedValue::Logical(b) => write!(f, "{}", b),
            TypedValue::Date(d) => write!(f, "{}", d),
            TypedValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// The field shape raw bytes were produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape {
    field_type: Type,
    length: usize,
    decimals: usize,
    charset: Charset,
}

impl Shape {
    fn of(field: &Field, charset: &Charset) -> Self {
        Self {
            field_type: field.field_type(),
            length: field.length(),
            decimals: field.decimals(),
            charset: *charset,
        }
    }
}

#[derive(Debug, Clone)]
struct Raw {
    shape: Shape,
    bytes: Vec<u8>,
}

/// A field value with lazily converted typed and raw representations.
#[derive(Debug, Clone)]
pub struct Value {
    typed: OnceCell<Option<TypedValue>>,
    raw: OnceCell<Raw>,
}

impl Value {
    /// An empty value; written as spaces or a blank memo pointer.
    pub fn null() -> Self {
        Self::from_typed(None)
    }

    fn from_typed(typed: Option<TypedValue>) -> Self {
        Self {
            typed: OnceCell::with_value(typed),
            raw: OnceCell::new(),
        }
    }

    /// Wrap bytes read from a field of `field`'s shape.
    pub(crate) fn from_raw(bytes: Vec<u8>, field: &Field, charset: &Charset) -> Self {
        Self {
            typed: OnceCell::new(),
            raw: OnceCell::with_value(Raw {
                shape: Shape::of(field, charset),
                bytes,
            }),
        }
    }

    /// The typed value, decoding raw bytes on first call.
    pub fn typed(&self) -> Result<Option<&TypedValue>> {
        self.typed
            .get_or_try_init(|| match self.raw.get() {
                Some(raw) => codec::decode(&raw.bytes, raw.shape.field_type, &raw.shape.charset),
                None => Ok(None),
            })
            .map(Option::as_ref)
    }

    /// The bytes to store for `field`.
    ///
    /// Cached raw bytes are reused when they were produced for the same field
    /// shape and charset; otherwise the typed value is encoded, validated
    /// against the field type, and cached if nothing was cached yet.
    pub fn raw_for(&self, field: &Field, charset: &Charset) -> Result<Cow<'_, [u8]>> {
        let shape = Shape::of(field, charset);
        if let Some(raw) = self.raw.get() {
            if raw.shape == shape {
                return Ok(Cow::Borrowed(&raw.bytes));
            }
        }

        let bytes = match self.typed()? {
            Some(typed) => codec::encode(typed, field, charset)?,
            None => codec::encode_null(field),
        };

        if self.raw.get().is_some() {
            return Ok(Cow::Owned(bytes));
        }
        let raw = self.raw.get_or_init(|| Raw { shape, bytes });
        Ok(Cow::Borrowed(&raw.bytes))
    }

    /// True for an empty value.
    pub fn is_null(&self) -> Result<bool> {
        Ok(self.typed()?.is_none())
    }

    /// Text content, or `None` when empty.
    pub fn as_str(&self) -> Result<Option<&str>> {
        match self.typed()? {
            None => Ok(None),
            Some(TypedValue::Text(s)) => Ok(Some(s)),
            Some(other) => Err(kind_error("text", other)),
        }
    }

    pub fn as_number(&self) -> Result<Option<Number>> {
        match self.typed()? {
            None => Ok(None),
            Some(TypedValue::Number(n)) => Ok(Some(*n)),
            Some(other) => Err(kind_error("number", other)),
        }
    }

    pub fn as_bool(&self) -> Result<Option<bool>> {
        match self.typed()? {
            None => Ok(None),
            Some(TypedValue::Logical(b)) => Ok(Some(*b)),
            Some(other) => Err(kind_error("logical", other)),
        }
    }

    pub fn as_date(&self) -> Result<Option<DbfDate>> {
        match self.typed()? {
            None => Ok(None),
            Some(TypedValue::Date(d)) => Ok(Some(*d)),
            Some(other) => Err(kind_error("date", other)),
        }
    }

    pub fn as_bytes(&self) -> Result<Option<&[u8]>> {
        match self.typed()? {
            None => Ok(None),
            Some(TypedValue::Bytes(b)) => Ok(Some(b)),
            Some(other) => Err(kind_error("bytes", other)),
        }
    }
}

fn kind_error(wanted: &str, found: &TypedValue) -> Error {
    Error::mismatch(format!("expected {} value, found {}", wanted, found.kind()))
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

impl From<TypedValue> for Value {
    fn from(v: TypedValue) -> Self {
        Self::from_typed(Some(v))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        TypedValue::Number(n).into()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        TypedValue::Text(s.to_string()).into()
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        TypedValue::Text(s).into()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        TypedValue::Logical(b).into()
    }
}

impl From<DbfDate> for Value {
    fn from(d: DbfDate) -> Self {
        TypedValue::Date(d).into()
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        DbfDate::from(d).into()
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        TypedValue::Bytes(b).into()
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        TypedValue::Bytes(b.to_vec()).into()
    }
}

macro_rules! value_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Number::from(v).into()
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, i128, u8, u16, u32, u64, f32, f64);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or_else(Value::null, Into::into)
    }
}
