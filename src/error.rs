//! Error types for xbase.

use std::io;
use thiserror::Error;

/// Result type alias for xbase operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for table operations.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// I/O error from file operations.
    #[error("I/O error: {0}")]
    Io(String),

    /// The table or its memo file is structurally inconsistent.
    #[error("Corrupted table: {0}")]
    CorruptedTable(String),

    /// A table or memo file does not exist and may not be created.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Field type is not supported by the table's dialect.
    #[error("Field {field}: type {field_type} is not supported by {version}")]
    InvalidFieldType {
        field: String,
        field_type: char,
        version: String,
    },

    /// Declared field length is zero or exceeds the dialect maximum.
    #[error("Field {field}: invalid length {length} (max: {max})")]
    InvalidFieldLength {
        field: String,
        length: usize,
        max: usize,
    },

    /// Field name is empty or longer than 10 bytes.
    #[error("Invalid field name: {0:?}")]
    InvalidFieldName(String),

    /// Encoded value does not fit into the field.
    #[error("Value too large for field {field} (length: {length})")]
    ValueTooLarge { field: String, length: usize },

    /// Value kind is incompatible with the field type or accessor.
    #[error("Data mismatch: {0}")]
    DataMismatch(String),

    /// More positional values than fields.
    #[error("Record too large: {values} values for {fields} fields")]
    RecordTooLarge { values: usize, fields: usize },

    /// Operation not valid in the table's current state.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl Error {
    /// Create a corrupted-table error with the given message.
    pub fn corrupted<S: Into<String>>(msg: S) -> Self {
        Error::CorruptedTable(msg.into())
    }

    /// Create an illegal-state error.
    pub fn illegal_state<S: Into<String>>(msg: S) -> Self {
        Error::IllegalState(msg.into())
    }

    /// Create a data-mismatch error.
    pub fn mismatch<S: Into<String>>(msg: S) -> Self {
        Error::DataMismatch(msg.into())
    }

    pub(crate) fn too_large(field: &str, length: usize) -> Self {
        Error::ValueTooLarge {
            field: field.to_string(),
            length,
        }
    }

    /// Check if this error indicates corruption.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Error::CorruptedTable(_))
    }

    /// Check if this error was raised while validating a table definition.
    ///
    /// Definition errors are detected before any byte is written.
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidFieldType { .. }
                | Error::InvalidFieldLength { .. }
                | Error::InvalidFieldName(_)
        )
    }
}
