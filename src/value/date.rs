//! Calendar dates as stored in Date fields.

use std::fmt;

use chrono::{Datelike, NaiveDate};

use crate::{Error, Result};

/// Width of a Date field.
pub const DATE_LEN: usize = 8;

/// A `YYYYMMDD` date.
///
/// Components are stored as found; no calendar validation is applied, so a
/// file containing February 30th reads and writes back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DbfDate {
    year: u16,
    month: u8,
    day: u8,
}

impl DbfDate {
    /// Create a date without checking it against the calendar.
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// Convert to a chrono date, if the components form a real date.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)
    }

    /// Encode as eight ASCII digits.
    pub fn encode(&self) -> [u8; DATE_LEN] {
        let mut out = [b'0'; DATE_LEN];
        let text = format!("{:04}{:02}{:02}", self.year % 10000, self.month % 100, self.day % 100);
        out.copy_from_slice(text.as_bytes());
        out
    }

    /// Decode eight ASCII digits. A blank year is an empty date.
    pub fn decode(raw: &[u8]) -> Result<Option<Self>> {
        if raw.len() < DATE_LEN {
            return Err(Error::corrupted(format!(
                "date field of {} bytes",
                raw.len()
            )));
        }
        if raw[..4].iter().all(|&b| b == b' ' || b == 0) {
            return Ok(None);
        }
        Ok(Some(Self {
            year: parse_digits(&raw[..4])? as u16,
            month: parse_digits(&raw[4..6])? as u8,
            day: parse_digits(&raw[6..8])? as u8,
        }))
    }

    /// Parse `YYYYMMDD` text.
    pub fn parse(text: &str) -> Result<Self> {
        if text.len() != DATE_LEN || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::mismatch(format!(
                "'{}' is not a YYYYMMDD date",
                text
            )));
        }
        Self::decode(text.as_bytes())?
            .ok_or_else(|| Error::mismatch(format!("'{}' is not a YYYYMMDD date", text)))
    }
}

fn parse_digits(raw: &[u8]) -> Result<u32> {
    let text = std::str::from_utf8(raw)
        .ok()
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| Error::corrupted(format!("invalid date digits {:?}", raw)))?;
    text.parse()
        .map_err(|_| Error::corrupted(format!("invalid date digits {:?}", raw)))
}

impl From<NaiveDate> for DbfDate {
    fn from(d: NaiveDate) -> Self {
        Self {
            year: d.year().clamp(0, 9999) as u16,
            month: d.month() as u8,
            day: d.day() as u8,
        }
    }
}

impl fmt::Display for DbfDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}
