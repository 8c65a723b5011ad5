//! Field types and their one-byte codes.

use std::fmt;

/// The type of a field, stored as an ASCII code in the field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Type {
    /// Fixed-width text.
    Character = b'C',
    /// Fixed-point number as ASCII digits.
    Number = b'N',
    /// Floating-point number as ASCII digits.
    Float = b'F',
    /// `T`/`F`/`Y`/`N` or blank.
    Logical = b'L',
    /// `YYYYMMDD`.
    Date = b'D',
    /// Text stored in the memo file.
    Memo = b'M',
    /// Binary data stored in the memo file.
    Binary = b'B',
    /// OLE object stored in the memo file.
    General = b'G',
    /// Picture stored in the memo file.
    Picture = b'P',
}

/// Every field type, in descriptor-code order of the original dBase releases.
pub const ALL_TYPES: [Type; 9] = [
    Type::Character,
    Type::Number,
    Type::Float,
    Type::Logical,
    Type::Date,
    Type::Memo,
    Type::Binary,
    Type::General,
    Type::Picture,
];

/// Width of the inline block pointer of memo-typed fields.
pub const MEMO_POINTER_LEN: usize = 10;

impl Type {
    /// Create from the descriptor code.
    pub fn from_code(code: u8) -> Option<Self> {
        ALL_TYPES.iter().copied().find(|t| t.code() == code)
    }

    /// Convert to the descriptor code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Length imposed by the type, if any.
    pub fn fixed_length(self) -> Option<usize> {
        match self {
            Type::Logical => Some(1),
            Type::Date => Some(8),
            Type::Memo | Type::Binary | Type::General | Type::Picture => Some(MEMO_POINTER_LEN),
            Type::Character | Type::Number | Type::Float => None,
        }
    }

    /// Whether the content lives in the memo file.
    pub fn is_memo(self) -> bool {
        matches!(
            self,
            Type::Memo | Type::Binary | Type::General | Type::Picture
        )
    }

    /// Whether the field carries a decimal count.
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Number | Type::Float)
    }

    /// Whether memo content is raw bytes rather than text.
    pub fn is_binary(self) -> bool {
        matches!(self, Type::Binary | Type::General | Type::Picture)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code() as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for t in ALL_TYPES {
            assert_eq!(Type::from_code(t.code()), Some(t));
        }
        assert_eq!(Type::from_code(b'X'), None);
        assert_eq!(Type::from_code(b'c'), None);
    }

    #[test]
    fn test_fixed_lengths() {
        assert_eq!(Type::Logical.fixed_length(), Some(1));
        assert_eq!(Type::Date.fixed_length(), Some(8));
        assert_eq!(Type::General.fixed_length(), Some(10));
        assert_eq!(Type::Character.fixed_length(), None);
    }

    #[test]
    fn test_classification() {
        assert!(Type::Picture.is_memo());
        assert!(Type::Picture.is_binary());
        assert!(Type::Memo.is_memo());
        assert!(!Type::Memo.is_binary());
        assert!(Type::Float.is_numeric());
        assert!(!Type::Date.is_numeric());
        assert_eq!(Type::Number.to_string(), "N");
    }
}
