//! Byte-level helpers and file naming.

pub mod coding;
pub mod filename;
