//! Configuration options for xbase.

use crate::charset::Charset;

/// Size of a memo file block in bytes.
pub const MEMO_BLOCK_SIZE: usize = 512;

/// Maximum field name length in bytes.
pub const MAX_FIELD_NAME_LEN: usize = 10;

/// Text that every table charset must encode byte for byte.
const ASCII_SAMPLE: &str = "0123456789 .-TFYN";

/// What `open` does when the table file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfNonExistent {
    /// Create the table from its definition.
    Create,
    /// Fail with `FileNotFound`.
    #[default]
    Error,
}

/// Durability of appended records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Sync data and memo files after every appended record.
    Always,
    /// Let the OS decide; files are synced on close.
    #[default]
    None,
}

/// Table configuration options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Charset for Character and Memo content.
    pub charset: Charset,

    /// Sync behaviour of `add_record`.
    pub sync_mode: SyncMode,
}

impl Options {
    /// Validate the options.
    ///
    /// The charset must store ASCII digits, spaces and the decimal point as
    /// single ASCII bytes, since numbers, dates and memo pointers are written
    /// that way.
    pub fn validate(&self) -> crate::Result<()> {
        let encoded = self.charset.encode(ASCII_SAMPLE).ok();
        if encoded.as_deref() != Some(ASCII_SAMPLE.as_bytes()) {
            return Err(crate::Error::InvalidConfiguration(format!(
                "charset {} is not ASCII-compatible",
                self.charset.name()
            )));
        }
        Ok(())
    }
}

/// Builder for Options.
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    options: Options,
    charset_label: Option<String>,
}

impl OptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the charset.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.options.charset = charset;
        self.charset_label = None;
        self
    }

    /// Set the charset by WHATWG label; resolved in `build`.
    pub fn charset_label(mut self, label: impl Into<String>) -> Self {
        self.charset_label = Some(label.into());
        self
    }

    /// Set sync mode.
    pub fn sync_mode(mut self, mode: SyncMode) -> Self {
        self.options.sync_mode = mode;
        self
    }

    /// Build the options.
    pub fn build(mut self) -> crate::Result<Options> {
        if let Some(label) = self.charset_label.take() {
            self.options.charset = Charset::for_label(&label)?;
        }
        self.options.validate()?;
        Ok(self.options)
    }
}
