//! # xbase
//!
//! Reading and writing xBase/DBF tables and their memo files.
//!
//! ## Features
//!
//! - **Dialects**: dBase III, dBase IV, dBase 5, Clipper 5 and FoxPro 2.6
//! - **Field types**: Character, Number, Float, Logical, Date, Memo, Binary,
//!   General and Picture
//! - **Memo files**: `.dbt`/`.fpt` block files, created on first use
//! - **Charsets**: any WHATWG-labelled single-byte code page
//! - **Lazy values**: records keep raw bytes until a typed value is asked for
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use xbase::{Field, IfNonExistent, Record, Table, Version};
//!
//! let mut table = Table::create(
//!     "people.dbf",
//!     Version::DBase3,
//!     vec![Field::character("NAME", 20), Field::number("AGE", 3, 0)],
//! );
//! table.open(IfNonExistent::Create)?;
//! table.add_record(&Record::new().with("NAME", "Ann").with("AGE", 31))?;
//!
//! for record in table.records()? {
//!     let record = record?;
//!     println!("{:?}", record.string_value("NAME")?);
//! }
//! table.close()?;
//! ```

// Public modules
pub mod charset;
pub mod error;
pub mod field;
pub mod header;
pub mod memo;
pub mod options;
pub mod record;
pub mod types;
pub mod value;
pub mod version;

mod database;
mod table;
mod util;

// Re-export main types for convenience
pub use charset::Charset;
pub use error::{Error, Result};
pub use field::{Field, NumberFormat};
pub use header::Header;
pub use options::{IfNonExistent, Options, OptionsBuilder, SyncMode};
pub use record::Record;
pub use types::Type;
pub use value::{DbfDate, Number, TypedValue, Value};
pub use version::{Dialect, MemoLayout, Version};

// Tables
pub use database::Database;
pub use table::{RecordIterator, Table};

// Byte-order helpers
pub use util::coding::{change_endianness_i16, change_endianness_i32};

/// List the `.dbf` files in a directory.
pub fn list_tables(dir: impl AsRef<std::path::Path>) -> Result<std::collections::BTreeSet<String>> {
    util::filename::list_tables(dir.as_ref())
}
