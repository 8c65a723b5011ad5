//! Per-dialect format constants.

use crate::types::Type;

/// How content blocks are laid out in the memo file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoLayout {
    /// Raw content followed by an end marker; read until the first 0x1A.
    Terminated,
    /// `FF FF 08 00` + u32 LE length including the 8-byte sub-header.
    DbaseBlockHeader,
    /// u32 BE block type + u32 BE content length.
    FoxProBlockHeader,
}

impl MemoLayout {
    /// Bytes preceding the content inside the first block.
    pub fn data_offset(self) -> usize {
        match self {
            MemoLayout::Terminated => 0,
            MemoLayout::DbaseBlockHeader | MemoLayout::FoxProBlockHeader => 8,
        }
    }
}

/// Immutable constants of one xBase dialect.
#[derive(Debug)]
pub struct Dialect {
    /// Human-readable name.
    pub name: &'static str,
    /// Version byte written for tables without memo fields.
    pub version_byte: u8,
    /// Version byte written for tables with memo fields.
    pub memo_version_byte: u8,
    /// Maximum Character field length.
    pub max_char_length: usize,
    /// Maximum Number field length.
    pub max_number_length: usize,
    /// Header terminator bytes.
    pub terminator: &'static [u8],
    /// Field types a table of this dialect may declare.
    pub allowed_types: &'static [Type],
    /// Memo file extension, lower case.
    pub memo_extension: &'static str,
    /// Memo content block layout.
    pub memo_layout: MemoLayout,
    /// Marker written after memo content.
    pub memo_end_marker: &'static [u8],
    /// Inline memo pointers are zero-padded rather than space-padded.
    pub zero_padded_memo_pointer: bool,
    /// Character field length spans the length and decimal bytes (u16 LE).
    pub wide_char_length: bool,
}

/// Maximum Float field length, shared by every dialect.
pub const MAX_FLOAT_LENGTH: usize = 20;

const DBASE3_TYPES: &[Type] = &[
    Type::Character,
    Type::Number,
    Type::Logical,
    Type::Date,
    Type::Memo,
];

const DBASE4_TYPES: &[Type] = &[
    Type::Character,
    Type::Number,
    Type::Float,
    Type::Logical,
    Type::Date,
    Type::Memo,
];

const DBASE5_TYPES: &[Type] = &[
    Type::Character,
    Type::Number,
    Type::Float,
    Type::Logical,
    Type::Date,
    Type::Memo,
    Type::Binary,
    Type::General,
];

const FOXPRO_TYPES: &[Type] = &[
    Type::Character,
    Type::Number,
    Type::Float,
    Type::Logical,
    Type::Date,
    Type::Memo,
    Type::General,
    Type::Picture,
];

pub(crate) static DBASE3: Dialect = Dialect {
    name: "dBase III",
    version_byte: 0x03,
    memo_version_byte: 0x83,
    max_char_length: 254,
    max_number_length: 19,
    terminator: &[0x0D],
    allowed_types: DBASE3_TYPES,
    memo_extension: "dbt",
    memo_layout: MemoLayout::Terminated,
    memo_end_marker: &[0x1A, 0x1A],
    zero_padded_memo_pointer: false,
    wide_char_length: false,
};

pub(crate) static CLIPPER5: Dialect = Dialect {
    name: "Clipper 5",
    version_byte: 0x03,
    memo_version_byte: 0x83,
    max_char_length: 1024,
    max_number_length: 19,
    terminator: &[0x0D, 0x0D],
    allowed_types: DBASE3_TYPES,
    memo_extension: "dbt",
    memo_layout: MemoLayout::Terminated,
    memo_end_marker: &[0x1A, 0x1A],
    zero_padded_memo_pointer: false,
    wide_char_length: true,
};

pub(crate) static DBASE4: Dialect = Dialect {
    name: "dBase IV",
    version_byte: 0x04,
    memo_version_byte: 0x8B,
    max_char_length: 254,
    max_number_length: 20,
    terminator: &[0x0D],
    allowed_types: DBASE4_TYPES,
    memo_extension: "dbt",
    memo_layout: MemoLayout::DbaseBlockHeader,
    memo_end_marker: &[],
    zero_padded_memo_pointer: true,
    wide_char_length: false,
};

pub(crate) static DBASE5: Dialect = Dialect {
    name: "dBase 5",
    version_byte: 0x05,
    memo_version_byte: 0x85,
    max_char_length: 254,
    max_number_length: 20,
    terminator: &[0x0D],
    allowed_types: DBASE5_TYPES,
    memo_extension: "dbt",
    memo_layout: MemoLayout::DbaseBlockHeader,
    memo_end_marker: &[],
    zero_padded_memo_pointer: true,
    wide_char_length: false,
};

pub(crate) static FOXPRO26: Dialect = Dialect {
    name: "FoxPro 2.6",
    version_byte: 0x03,
    memo_version_byte: 0xF5,
    max_char_length: 254,
    max_number_length: 20,
    terminator: &[0x0D],
    allowed_types: FOXPRO_TYPES,
    memo_extension: "fpt",
    memo_layout: MemoLayout::FoxProBlockHeader,
    memo_end_marker: &[],
    zero_padded_memo_pointer: false,
    wide_char_length: false,
};
