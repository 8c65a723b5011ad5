//! Sequential record reader.

use std::io::{self, Read, Seek, SeekFrom};

use log::trace;

use crate::record::Record;
use crate::util::coding::trim_field;
use crate::value::Value;
use crate::{Error, Result};

use super::{memo_for_read, Table, END_OF_FILE, RECORD_DELETED};

/// Outcome of reading one record slot.
enum Slot {
    Valid(Record),
    Deleted,
    End,
}

/// Iterator over the valid records of an open table.
///
/// Deleted records are skipped. Iteration stops at the record count from the
/// header, at an EOF marker, or at the physical end of the file, whichever
/// comes first. After an error the iterator is exhausted.
pub struct RecordIterator<'a> {
    table: &'a mut Table,
    index: u32,
    finished: bool,
}

impl<'a> RecordIterator<'a> {
    pub(super) fn new(table: &'a mut Table) -> Self {
        Self {
            table,
            index: 0,
            finished: false,
        }
    }

    /// Next valid record, or `None` at the end.
    pub fn try_next(&mut self) -> Result<Option<Record>> {
        while !self.finished {
            match self.read_slot() {
                Ok(Slot::Valid(record)) => return Ok(Some(record)),
                Ok(Slot::Deleted) => continue,
                Ok(Slot::End) => self.finished = true,
                Err(e) => {
                    self.finished = true;
                    return Err(e);
                }
            }
        }
        Ok(None)
    }

    fn read_slot(&mut self) -> Result<Slot> {
        let charset = self.table.options.charset;
        let table_path = self.table.path.clone();
        let open = self
            .table
            .state
            .as_mut()
            .ok_or_else(|| super::closed_error(&table_path))?;

        if self.index >= open.header.record_count() {
            return Ok(Slot::End);
        }
        let index = self.index;
        self.index += 1;

        open.file
            .seek(SeekFrom::Start(open.header.record_offset(index)))?;
        let mut marker = [0u8; 1];
        if open.file.read(&mut marker)? == 0 || marker[0] == END_OF_FILE {
            return Ok(Slot::End);
        }
        if marker[0] == RECORD_DELETED {
            trace!("skipping deleted record {}", index);
            return Ok(Slot::Deleted);
        }

        let mut body = vec![0u8; open.header.record_length() as usize - 1];
        open.file.read_exact(&mut body).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::corrupted(format!("record {} truncated", index))
            } else {
                e.into()
            }
        })?;

        let version = open.header.version();
        let mut record = Record::new();
        let mut offset = 0;
        for field in open.header.fields() {
            let raw = &body[offset..offset + field.length()];
            offset += field.length();

            let bytes = if field.field_type().is_memo() {
                match parse_memo_pointer(raw)? {
                    Some(block) => {
                        memo_for_read(&mut open.memo, &table_path, version)?.read_block(block)?
                    }
                    None => Vec::new(),
                }
            } else {
                raw.to_vec()
            };
            record.set(field.name(), Value::from_raw(bytes, field, &charset));
        }
        Ok(Slot::Valid(record))
    }
}

impl Iterator for RecordIterator<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().transpose()
    }
}

/// Block index of an inline memo pointer; `None` when blank or zero.
fn parse_memo_pointer(raw: &[u8]) -> Result<Option<u32>> {
    let digits = trim_field(raw);
    if digits.is_empty() {
        return Ok(None);
    }
    let text = std::str::from_utf8(digits)
        .ok()
        .filter(|t| t.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| {
            Error::corrupted(format!(
                "invalid memo pointer {:?}",
                String::from_utf8_lossy(raw)
            ))
        })?;
    let block: u32 = text
        .parse()
        .map_err(|_| Error::corrupted(format!("memo pointer {} out of range", text)))?;
    Ok((block != 0).then_some(block))
}
