//! Records: field name to value mappings.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::charset::Charset;
use crate::field::Field;
use crate::value::{DbfDate, Number, TypedValue, Value};
use crate::Result;

/// One row of a table.
///
/// Fields absent from the map are written as empty values.
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set the value of a field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the name/value pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Bytes to store for `field`; `None` when the record has no such value.
    pub fn raw_value(&self, field: &Field, charset: &Charset) -> Result<Option<Cow<'_, [u8]>>> {
        self.values
            .get(field.name())
            .map(|v| v.raw_for(field, charset))
            .transpose()
    }

    /// Decoded value of a field.
    pub fn typed_value(&self, name: &str) -> Result<Option<&TypedValue>> {
        match self.values.get(name) {
            Some(v) => v.typed(),
            None => Ok(None),
        }
    }

    pub fn string_value(&self, name: &str) -> Result<Option<&str>> {
        match self.values.get(name) {
            Some(v) => v.as_str(),
            None => Ok(None),
        }
    }

    pub fn number_value(&self, name: &str) -> Result<Option<Number>> {
        match self.values.get(name) {
            Some(v) => v.as_number(),
            None => Ok(None),
        }
    }

    pub fn bool_value(&self, name: &str) -> Result<Option<bool>> {
        match self.values.get(name) {
            Some(v) => v.as_bool(),
            None => Ok(None),
        }
    }

    pub fn date_value(&self, name: &str) -> Result<Option<DbfDate>> {
        match self.values.get(name) {
            Some(v) => v.as_date(),
            None => Ok(None),
        }
    }

    pub fn bytes_value(&self, name: &str) -> Result<Option<&[u8]>> {
        match self.values.get(name) {
            Some(v) => v.as_bytes(),
            None => Ok(None),
        }
    }
}

impl From<HashMap<String, Value>> for Record {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_typed_getters() {
        let r = Record::new()
            .with("NAME", "Alice")
            .with("AGE", 42)
            .with("ACTIVE", true)
            .with("BORN", DbfDate::new(1982, 4, 1));

        assert_eq!(r.string_value("NAME").unwrap(), Some("Alice"));
        assert_eq!(r.number_value("AGE").unwrap(), Some(Number::Int(42)));
        assert_eq!(r.bool_value("ACTIVE").unwrap(), Some(true));
        assert_eq!(r.date_value("BORN").unwrap(), Some(DbfDate::new(1982, 4, 1)));
        assert_eq!(r.string_value("MISSING").unwrap(), None);
        assert!(matches!(r.bool_value("NAME"), Err(Error::DataMismatch(_))));
    }

    #[test]
    fn test_raw_value() {
        let r: Record = vec![("CODE", "AB")].into_iter().collect();
        let cs = Charset::default();
        let f = Field::character("CODE", 4);
        assert_eq!(&*r.raw_value(&f, &cs).unwrap().unwrap(), b"AB\0\0");
        let other = Field::character("OTHER", 4);
        assert!(r.raw_value(&other, &cs).unwrap().is_none());
    }
}
