//! Tables: a `.dbf` file and, lazily, its memo file.
//!
//! A table is either closed or open. Every operation except `open`, `close`,
//! `delete` and the path accessors requires an open table.
//!
//! # Record stream
//!
//! ```text
//! header | marker + fields | marker + fields | ... | 1A
//!          ^ 0x20 valid, 0x2A deleted
//! ```
//!
//! Records are append-only. Each append writes the new row and the trailing
//! EOF byte, then rewrites the record count in the header.

mod iterator;

pub use iterator::RecordIterator;

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, trace};

use crate::charset::Charset;
use crate::field::Field;
use crate::header::{Header, RECORD_COUNT_OFFSET};
use crate::memo::MemoFile;
use crate::options::{IfNonExistent, Options, SyncMode};
use crate::record::Record;
use crate::util::filename::{delete_file, find_memo_file, memo_file_path};
use crate::value::codec::encode_null;
use crate::value::{DbfDate, Value};
use crate::version::Version;
use crate::{Error, Result};

/// Marker of a valid record.
pub const RECORD_VALID: u8 = 0x20;
/// Marker of a deleted record.
pub const RECORD_DELETED: u8 = 0x2A;
/// End-of-file marker, written after the last record.
pub const END_OF_FILE: u8 = 0x1A;

/// Handles and header of an open table.
#[derive(Debug)]
struct OpenTable {
    file: File,
    header: Header,
    memo: Option<MemoFile>,
}

/// A DBF table.
#[derive(Debug)]
pub struct Table {
    path: PathBuf,
    options: Options,
    /// Definition used when `open` creates the file.
    definition: Option<(Version, Vec<Field>)>,
    state: Option<OpenTable>,
}

impl Table {
    /// A closed handle to an existing table.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_options(path, Options::default())
    }

    /// A closed handle to an existing table with custom options.
    pub fn with_options(path: impl AsRef<Path>, options: Options) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
            definition: None,
            state: None,
        }
    }

    /// A closed handle carrying a definition for `open(IfNonExistent::Create)`.
    ///
    /// The definition is validated when the file is created.
    pub fn create(path: impl AsRef<Path>, version: Version, fields: Vec<Field>) -> Self {
        Self::create_with_options(path, version, fields, Options::default())
    }

    pub fn create_with_options(
        path: impl AsRef<Path>,
        version: Version,
        fields: Vec<Field>,
        options: Options,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
            definition: Some((version, fields)),
            state: None,
        }
    }

    /// Open the table, creating it from its definition when missing and
    /// `if_missing` is `Create`.
    pub fn open(&mut self, if_missing: IfNonExistent) -> Result<()> {
        if self.state.is_some() {
            return Err(Error::illegal_state(format!(
                "{} is already open",
                self.path.display()
            )));
        }
        self.options.validate()?;

        let state = if self.path.exists() {
            self.open_existing()?
        } else {
            match if_missing {
                IfNonExistent::Error => {
                    return Err(Error::FileNotFound(self.path.display().to_string()))
                }
                IfNonExistent::Create => self.create_file()?,
            }
        };
        self.state = Some(state);
        Ok(())
    }

    fn open_existing(&self) -> Result<OpenTable> {
        let mut file = match OpenOptions::new().read(true).write(true).open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => File::open(&self.path)?,
            Err(e) => return Err(e.into()),
        };
        let header = Header::read_from(&mut file)?;
        debug!(
            "opened {} ({}, {} records)",
            self.path.display(),
            header.version(),
            header.record_count()
        );
        Ok(OpenTable {
            file,
            header,
            memo: None,
        })
    }

    fn create_file(&self) -> Result<OpenTable> {
        let (version, fields) = self.definition.clone().ok_or_else(|| {
            Error::illegal_state(format!(
                "cannot create {} without a field definition",
                self.path.display()
            ))
        })?;
        let header = Header::new(version, fields)?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        header.write_to(&mut file)?;
        file.write_all(&[END_OF_FILE])?;
        if self.options.sync_mode == SyncMode::Always {
            file.sync_all()?;
        }

        info!(
            "created {} table {} with {} fields",
            version,
            self.path.display(),
            header.fields().len()
        );
        Ok(OpenTable {
            file,
            header,
            memo: None,
        })
    }

    /// Close the table. Closing a closed table is a no-op.
    ///
    /// Both handles are released even if syncing the first fails; the
    /// first error is returned.
    pub fn close(&mut self) -> Result<()> {
        let Some(open) = self.state.take() else {
            return Ok(());
        };
        let data = open.file.sync_all().map_err(Error::from);
        let memo = match open.memo {
            Some(memo) => memo.close(),
            None => Ok(()),
        };
        debug!("closed {}", self.path.display());
        data.and(memo)
    }

    /// Close the table and remove its file and, if it was opened, its memo file.
    pub fn delete(&mut self) -> Result<()> {
        let memo_path = self
            .state
            .as_ref()
            .and_then(|s| s.memo.as_ref())
            .map(|m| m.path().to_path_buf());
        let closed = self.close();

        delete_file(&self.path)?;
        if let Some(memo_path) = memo_path {
            delete_file(&memo_path)?;
        }
        debug!("deleted {}", self.path.display());
        closed
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the table.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn charset(&self) -> &Charset {
        &self.options.charset
    }

    pub fn header(&self) -> Result<&Header> {
        Ok(&self.opened()?.header)
    }

    pub fn fields(&self) -> Result<&[Field]> {
        Ok(self.opened()?.header.fields())
    }

    pub fn field(&self, name: &str) -> Result<Option<&Field>> {
        Ok(self.opened()?.header.field(name))
    }

    pub fn version(&self) -> Result<Version> {
        Ok(self.opened()?.header.version())
    }

    pub fn record_count(&self) -> Result<u32> {
        Ok(self.opened()?.header.record_count())
    }

    pub fn last_modified(&self) -> Result<DbfDate> {
        Ok(self.opened()?.header.last_modified())
    }

    /// Iterate over the valid records in file order.
    pub fn records(&mut self) -> Result<RecordIterator<'_>> {
        self.opened()?;
        Ok(RecordIterator::new(self))
    }

    /// Append a record.
    ///
    /// Every inline value is validated and encoded before anything is
    /// written, so `ValueTooLarge` and `DataMismatch` leave the files
    /// untouched. Memo content is appended next, then the row.
    pub fn add_record(&mut self, record: &Record) -> Result<()> {
        let charset = self.options.charset;
        let sync_mode = self.options.sync_mode;
        let path = self.path.clone();
        let open = self.state.as_mut().ok_or_else(|| closed_error(&path))?;
        let version = open.header.version();
        let zero_padded = version.dialect().zero_padded_memo_pointer;

        let mut row = Vec::with_capacity(open.header.record_length() as usize);
        row.push(RECORD_VALID);
        let mut memos: Vec<(usize, usize, Cow<'_, [u8]>)> = Vec::new();
        for field in open.header.fields() {
            let raw = match record.raw_value(field, &charset)? {
                Some(raw) => raw,
                None => Cow::Owned(encode_null(field)),
            };
            if field.field_type().is_memo() {
                if !raw.is_empty() {
                    memos.push((row.len(), field.length(), raw));
                }
                row.resize(row.len() + field.length(), b' ');
            } else {
                // descriptors read from a file may be wider than the encoding
                if raw.len() > field.length() {
                    return Err(Error::too_large(field.name(), field.length()));
                }
                row.extend_from_slice(&raw);
                row.resize(row.len() + field.length() - raw.len(), b' ');
            }
        }
        row.resize(open.header.record_length() as usize, b' ');

        for (offset, width, content) in memos {
            let memo = memo_for_write(&mut open.memo, &path, version)?;
            let index = memo.append_block(&content)?;
            let pointer = format_memo_pointer(index, zero_padded, width);
            if pointer.len() > width {
                return Err(Error::corrupted(format!(
                    "memo block {} does not fit a {}-byte pointer",
                    index, width
                )));
            }
            row[offset..offset + width].copy_from_slice(pointer.as_bytes());
        }

        let index = open.header.record_count();
        let offset = open.header.record_offset(index);
        open.file.seek(SeekFrom::Start(offset))?;
        open.file.write_all(&row)?;
        open.file.write_all(&[END_OF_FILE])?;

        open.header.increment_record_count();
        open.file.seek(SeekFrom::Start(RECORD_COUNT_OFFSET))?;
        open.file.write_all(&open.header.encode_record_count())?;

        if sync_mode == SyncMode::Always {
            open.file.sync_data()?;
            if let Some(memo) = &open.memo {
                memo.sync()?;
            }
        }
        trace!("appended record {} to {}", index, path.display());
        Ok(())
    }

    /// Append a record from values in field order.
    ///
    /// Fields without a value are written empty; more values than fields is
    /// `RecordTooLarge`.
    pub fn add_values<V: Into<Value>>(&mut self, values: impl IntoIterator<Item = V>) -> Result<()> {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let fields = self.fields()?;
        if values.len() > fields.len() {
            return Err(Error::RecordTooLarge {
                values: values.len(),
                fields: fields.len(),
            });
        }
        let record: Record = fields
            .iter()
            .map(|f| f.name().to_string())
            .zip(values)
            .collect();
        self.add_record(&record)
    }

    fn opened(&self) -> Result<&OpenTable> {
        self.state.as_ref().ok_or_else(|| closed_error(&self.path))
    }
}

fn closed_error(path: &Path) -> Error {
    Error::illegal_state(format!("{} is not open", path.display()))
}

/// Inline text of a memo pointer.
fn format_memo_pointer(index: u32, zero_padded: bool, width: usize) -> String {
    if zero_padded {
        format!("{:0w$}", index, w = width)
    } else {
        format!("{:>w$}", index, w = width)
    }
}

/// The memo file for reading; it must already exist.
fn memo_for_read<'m>(
    memo: &'m mut Option<MemoFile>,
    table_path: &Path,
    version: Version,
) -> Result<&'m mut MemoFile> {
    if memo.is_none() {
        let extension = version.dialect().memo_extension;
        let path = find_memo_file(table_path, extension)?.ok_or_else(|| {
            Error::corrupted(format!(
                "memo file (.{}) for {} not found",
                extension,
                table_path.display()
            ))
        })?;
        *memo = Some(MemoFile::open(&path, version, IfNonExistent::Error)?);
    }
    memo.as_mut()
        .ok_or_else(|| Error::illegal_state("memo file not open"))
}

/// The memo file for writing, created next to the table when missing.
fn memo_for_write<'m>(
    memo: &'m mut Option<MemoFile>,
    table_path: &Path,
    version: Version,
) -> Result<&'m mut MemoFile> {
    if memo.is_none() {
        let extension = version.dialect().memo_extension;
        let path = match find_memo_file(table_path, extension)? {
            Some(path) => path,
            None => {
                let path = memo_file_path(table_path, extension);
                info!("creating memo file {}", path.display());
                path
            }
        };
        *memo = Some(MemoFile::open(&path, version, IfNonExistent::Create)?);
    }
    memo.as_mut()
        .ok_or_else(|| Error::illegal_state("memo file not open"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MEMO_POINTER_LEN;
    use crate::value::Number;
    use tempfile::tempdir;

    fn people(path: &Path) -> Table {
        Table::create(
            path,
            Version::DBase3,
            vec![
                Field::character("NAME", 10),
                Field::number("AGE", 3, 0),
                Field::logical("MEMBER"),
            ],
        )
    }

    #[test]
    fn test_create_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("people.dbf");

        let mut table = people(&path);
        table.open(IfNonExistent::Create).unwrap();
        table.add_values(vec![Value::from("Ann"), Value::from(31), Value::from(true)]).unwrap();
        table.add_values(vec![Value::from("Bob")]).unwrap();
        assert_eq!(table.record_count().unwrap(), 2);
        table.close().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(len, 32 + 3 * 32 + 1 + 2 * 15 + 1);

        let mut table = Table::new(&path);
        table.open(IfNonExistent::Error).unwrap();
        let records: Vec<Record> = table.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].string_value("NAME").unwrap(), Some("Ann"));
        assert_eq!(records[0].number_value("AGE").unwrap(), Some(Number::Int(31)));
        assert_eq!(records[1].bool_value("MEMBER").unwrap(), None);
        assert_eq!(records[1].number_value("AGE").unwrap(), None);
    }

    #[test]
    fn test_state_machine() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dbf");

        let mut table = Table::new(&path);
        assert!(matches!(
            table.open(IfNonExistent::Error),
            Err(Error::FileNotFound(_))
        ));
        assert!(matches!(
            table.open(IfNonExistent::Create),
            Err(Error::IllegalState(_))
        ));
        assert!(matches!(table.fields(), Err(Error::IllegalState(_))));
        assert!(matches!(table.records(), Err(Error::IllegalState(_))));
        assert!(table.close().is_ok());

        let mut table = people(&path);
        table.open(IfNonExistent::Create).unwrap();
        assert!(matches!(
            table.open(IfNonExistent::Create),
            Err(Error::IllegalState(_))
        ));
        table.close().unwrap();
        table.close().unwrap();
        assert!(!table.is_open());
        assert!(matches!(
            table.add_values(vec![1]),
            Err(Error::IllegalState(_))
        ));
    }

    #[test]
    fn test_open_validates_options() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dbf");
        let options = Options {
            charset: Charset::for_label("utf-16le").unwrap(),
            sync_mode: SyncMode::None,
        };
        let mut table = Table::create_with_options(
            &path,
            Version::DBase3,
            vec![Field::logical("L")],
            options,
        );
        assert!(matches!(
            table.open(IfNonExistent::Create),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_too_many_values() {
        let dir = tempdir().unwrap();
        let mut table = people(&dir.path().join("t.dbf"));
        table.open(IfNonExistent::Create).unwrap();
        let result = table.add_values(vec![Value::from("a"), 1.into(), true.into(), 2.into()]);
        assert!(matches!(
            result,
            Err(Error::RecordTooLarge {
                values: 4,
                fields: 3
            })
        ));
        assert_eq!(table.record_count().unwrap(), 0);
    }

    #[test]
    fn test_failed_encode_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dbf");
        let mut table = people(&path);
        table.open(IfNonExistent::Create).unwrap();
        let before = std::fs::metadata(&path).unwrap().len();

        let record = Record::new().with("NAME", "Carol").with("AGE", 1000);
        assert!(matches!(
            table.add_record(&record),
            Err(Error::ValueTooLarge { .. })
        ));
        assert_eq!(table.record_count().unwrap(), 0);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), before);
    }

    #[test]
    fn test_invalid_definition_creates_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.dbf");
        let mut table = Table::create(&path, Version::DBase3, vec![Field::character("C", 300)]);
        let err = table.open(IfNonExistent::Create).unwrap_err();
        assert!(err.is_definition_error());
        assert!(!path.exists());
        assert!(!table.is_open());
    }

    /// Widen the first descriptor of an empty table by `extra` bytes.
    fn widen_first_field(path: &Path, extra: u8) {
        let mut bytes = std::fs::read(path).unwrap();
        bytes[32 + 16] += extra;
        let record_length = u16::from_le_bytes([bytes[10], bytes[11]]) + extra as u16;
        bytes[10..12].copy_from_slice(&record_length.to_le_bytes());
        std::fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_inline_values_fill_declared_width() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wide.dbf");
        let mut table = Table::create(
            &path,
            Version::DBase3,
            vec![Field::logical("L"), Field::character("C", 3)],
        );
        table.open(IfNonExistent::Create).unwrap();
        table.close().unwrap();
        widen_first_field(&path, 1);

        let mut table = Table::new(&path);
        table.open(IfNonExistent::Error).unwrap();
        assert_eq!(table.fields().unwrap()[0].length(), 2);
        table.add_values(vec![Value::from(true), Value::from("abc")]).unwrap();
        table.close().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[97..103], b" T abc");

        let mut table = Table::new(&path);
        table.open(IfNonExistent::Error).unwrap();
        let records: Vec<Record> = table.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records[0].bool_value("L").unwrap(), Some(true));
        assert_eq!(records[0].string_value("C").unwrap(), Some("abc"));
    }

    #[test]
    fn test_inline_value_wider_than_descriptor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("narrow.dbf");
        let mut table = Table::create(&path, Version::DBase3, vec![Field::date("D")]);
        table.open(IfNonExistent::Create).unwrap();
        table.close().unwrap();

        // shrink the date field to 4 bytes
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[32 + 16] = 4;
        bytes[10..12].copy_from_slice(&5u16.to_le_bytes());
        std::fs::write(&path, bytes).unwrap();

        let mut table = Table::new(&path);
        table.open(IfNonExistent::Error).unwrap();
        let before = std::fs::metadata(&path).unwrap().len();
        assert!(matches!(
            table.add_values(vec![DbfDate::new(1909, 3, 18)]),
            Err(Error::ValueTooLarge { length: 4, .. })
        ));
        assert_eq!(table.record_count().unwrap(), 0);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), before);
    }

    #[test]
    fn test_memo_pointer_padding() {
        assert_eq!(format_memo_pointer(12, true, MEMO_POINTER_LEN), "0000000012");
        assert_eq!(format_memo_pointer(12, false, MEMO_POINTER_LEN), "        12");
    }

    #[test]
    fn test_delete_removes_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.dbf");
        let mut table = Table::create(
            &path,
            Version::DBase4,
            vec![Field::character("ID", 4), Field::memo("BODY")],
        );
        table.open(IfNonExistent::Create).unwrap();
        table
            .add_record(&Record::new().with("ID", "1").with("BODY", "hello"))
            .unwrap();
        let memo = dir.path().join("notes.dbt");
        assert!(memo.exists());

        table.delete().unwrap();
        assert!(!path.exists());
        assert!(!memo.exists());
        assert!(!table.is_open());
    }
}
