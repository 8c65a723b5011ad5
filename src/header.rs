//! Table header codec.
//!
//! # Layout
//!
//! ```text
//! +--------------------------+ 0x00
//! | version byte         (1) |
//! | last modified Y M D  (3) |  year since 1900
//! | record count      (4 LE) |
//! | header length     (2 LE) |
//! | record length     (2 LE) |
//! | reserved            (20) |
//! +--------------------------+ 0x20
//! | field descriptor    (32) |  x N
//! +--------------------------+
//! | terminator         (1-2) |  0D, or 0D 0D for Clipper 5
//! +--------------------------+
//! ```
//!
//! # Field descriptor
//!
//! ```text
//! name (10) | NUL | type (1) | address (4) | length (1) | decimals (1)
//!           | reserved (2) | work area id (1) | reserved (11)
//! ```

use std::collections::HashSet;
use std::io::{self, Read, Write};

use bytes::{Buf, BufMut, BytesMut};
use chrono::Local;
use log::debug;

use crate::field::Field;
use crate::options::MAX_FIELD_NAME_LEN;
use crate::types::Type;
use crate::util::coding::{get_fixed_str, put_fixed_str};
use crate::value::DbfDate;
use crate::version::Version;
use crate::{Error, Result};

/// Size of the table info block.
pub const INFO_BLOCK_SIZE: usize = 32;

/// Size of one field descriptor.
pub const DESCRIPTOR_SIZE: usize = 32;

/// Offset of the record count inside the header.
pub const RECORD_COUNT_OFFSET: u64 = 4;

/// Marker of the header terminator.
pub const HEADER_TERMINATOR: u8 = 0x0D;

const WORK_AREA_ID: u8 = 0x01;

/// Parsed table header.
#[derive(Debug, Clone)]
pub struct Header {
    version: Version,
    version_byte: u8,
    last_modified: DbfDate,
    record_count: u32,
    header_length: u16,
    record_length: u16,
    fields: Vec<Field>,
}

impl Header {
    /// Build the header of a new table, validating the definition.
    pub fn new(version: Version, fields: Vec<Field>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::InvalidConfiguration("a table needs at least one field".into()));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            field.validate(version)?;
            if !seen.insert(field.name().to_ascii_uppercase()) {
                return Err(Error::InvalidFieldName(format!("duplicate field {}", field.name())));
            }
        }

        let header_length =
            INFO_BLOCK_SIZE + DESCRIPTOR_SIZE * fields.len() + version.terminator().len();
        let record_length = 1 + fields.iter().map(Field::length).sum::<usize>();
        let header_length = u16::try_from(header_length).map_err(|_| {
            Error::InvalidConfiguration(format!("{} fields do not fit in a header", fields.len()))
        })?;
        let record_length = u16::try_from(record_length).map_err(|_| Error::InvalidFieldLength {
            field: "<record>".into(),
            length: record_length,
            max: u16::MAX as usize,
        })?;

        let has_memo = fields.iter().any(|f| f.field_type().is_memo());
        Ok(Self {
            version,
            version_byte: version.version_byte(has_memo),
            last_modified: DbfDate::from(Local::now().date_naive()),
            record_count: 0,
            header_length,
            record_length,
            fields,
        })
    }

    /// Read a header from the start of a table file.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut info = [0u8; INFO_BLOCK_SIZE];
        read_exact_or_corrupted(reader, &mut info, "table header")?;

        let mut buf = &info[..];
        let version_byte = buf.get_u8();
        let (year, month, day) = (buf.get_u8(), buf.get_u8(), buf.get_u8());
        let record_count = buf.get_u32_le();
        let header_length = buf.get_u16_le();
        let record_length = buf.get_u16_le();

        let terminator_len = header_length as usize % DESCRIPTOR_SIZE;
        if !(1..=2).contains(&terminator_len)
            || (header_length as usize) < INFO_BLOCK_SIZE + terminator_len
        {
            return Err(Error::corrupted(format!(
                "header length {} does not match a descriptor array",
                header_length
            )));
        }
        let version = Version::resolve(version_byte, terminator_len);
        let field_count =
            (header_length as usize - INFO_BLOCK_SIZE - terminator_len) / DESCRIPTOR_SIZE;

        let mut rest = vec![0u8; header_length as usize - INFO_BLOCK_SIZE];
        read_exact_or_corrupted(reader, &mut rest, "field descriptors")?;
        let mut buf = &rest[..];

        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(decode_descriptor(&mut buf, version)?);
        }
        if buf.first() != Some(&HEADER_TERMINATOR) {
            return Err(Error::corrupted("missing header terminator"));
        }

        let needed = 1 + fields.iter().map(Field::length).sum::<usize>();
        if (record_length as usize) < needed {
            return Err(Error::corrupted(format!(
                "record length {} is shorter than its fields ({})",
                record_length, needed
            )));
        }

        let mut full_year = year as u16 + 1900;
        if full_year < 1980 {
            full_year += 100;
        }

        debug!(
            "read {} header: {} fields, {} records of {} bytes",
            version, field_count, record_count, record_length
        );

        Ok(Self {
            version,
            version_byte,
            last_modified: DbfDate::new(full_year, month, day),
            record_count,
            header_length,
            record_length,
            fields,
        })
    }

    /// Encode the complete header, terminator included.
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(self.header_length as usize);
        buf.put_u8(self.version_byte);

        let mut year = self.last_modified.year().saturating_sub(1900);
        if year >= 100 {
            year -= 100;
        }
        buf.put_u8(year.min(255) as u8);
        buf.put_u8(self.last_modified.month());
        buf.put_u8(self.last_modified.day());

        buf.put_u32_le(self.record_count);
        buf.put_u16_le(self.header_length);
        buf.put_u16_le(self.record_length);
        buf.put_bytes(0, 20);

        for field in &self.fields {
            encode_descriptor(&mut buf, field, self.version);
        }
        buf.put_slice(self.version.terminator());
        buf
    }

    /// Write the encoded header.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.encode())?;
        Ok(())
    }

    /// Encoded record count for the in-place rewrite at `RECORD_COUNT_OFFSET`.
    pub fn encode_record_count(&self) -> [u8; 4] {
        self.record_count.to_le_bytes()
    }

    /// File offset of record slot `index`.
    pub fn record_offset(&self, index: u32) -> u64 {
        self.header_length as u64 + index as u64 * self.record_length as u64
    }

    pub(crate) fn increment_record_count(&mut self) {
        self.record_count += 1;
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The version byte as found in the file.
    pub fn version_byte(&self) -> u8 {
        self.version_byte
    }

    pub fn last_modified(&self) -> DbfDate {
        self.last_modified
    }

    pub fn record_count(&self) -> u32 {
        self.record_count
    }

    pub fn header_length(&self) -> u16 {
        self.header_length
    }

    pub fn record_length(&self) -> u16 {
        self.record_length
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by exact name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Whether any field stores its content in the memo file.
    pub fn has_memo(&self) -> bool {
        self.fields.iter().any(|f| f.field_type().is_memo())
    }
}

fn read_exact_or_corrupted<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::corrupted(format!("{} truncated", what))
        } else {
            e.into()
        }
    })
}

fn decode_descriptor(buf: &mut &[u8], version: Version) -> Result<Field> {
    if buf.len() < DESCRIPTOR_SIZE {
        return Err(Error::corrupted("field descriptor truncated"));
    }
    let name = get_fixed_str(buf, MAX_FIELD_NAME_LEN + 1)
        .ok_or_else(|| Error::corrupted("field descriptor truncated"))?;
    let name = String::from_utf8_lossy(&name).trim_end().to_string();

    let code = buf.get_u8();
    let field_type = Type::from_code(code).ok_or_else(|| {
        Error::corrupted(format!(
            "field {}: unknown field type {:?}",
            name, code as char
        ))
    })?;
    buf.advance(4);
    let len_byte = buf.get_u8();
    let dec_byte = buf.get_u8();
    buf.advance(14);

    let (length, decimals) =
        if version.dialect().wide_char_length && field_type == Type::Character {
            (u16::from_le_bytes([len_byte, dec_byte]) as usize, 0)
        } else {
            (len_byte as usize, dec_byte as usize)
        };

    Ok(Field::from_descriptor(name, field_type, length, decimals))
}

fn encode_descriptor(buf: &mut BytesMut, field: &Field, version: Version) {
    put_fixed_str(buf, field.name().as_bytes(), MAX_FIELD_NAME_LEN);
    buf.put_u8(0);
    buf.put_u8(field.field_type().code());
    buf.put_u32(0);
    if version.dialect().wide_char_length && field.field_type() == Type::Character {
        buf.put_u16_le(field.length() as u16);
    } else {
        buf.put_u8(field.length() as u8);
        buf.put_u8(field.decimals() as u8);
    }
    buf.put_u16(0);
    buf.put_u8(WORK_AREA_ID);
    buf.put_bytes(0, 11);
}
