//! Code-page conversion for Character and Memo content.
//!
//! DBF files carry no reliable charset marker, so the caller picks one when
//! opening a table. ISO-8859-1 is the default because every byte maps to a
//! character and back.

use std::fmt;

use encoding::all::ISO_8859_1;
use encoding::label::encoding_from_whatwg_label;
use encoding::{DecoderTrap, EncoderTrap, Encoding, EncodingRef};

use crate::{Error, Result};

/// A character set used to convert between field bytes and Rust strings.
#[derive(Clone, Copy)]
pub struct Charset(EncodingRef);

impl Charset {
    /// Resolve a charset by its WHATWG label (`"ibm866"`, `"windows-1252"`, ...).
    pub fn for_label(label: &str) -> Result<Self> {
        encoding_from_whatwg_label(label)
            .map(Charset)
            .ok_or_else(|| Error::InvalidConfiguration(format!("unknown charset: {}", label)))
    }

    /// The charset's canonical name.
    pub fn name(&self) -> &'static str {
        self.0.whatwg_name().unwrap_or_else(|| self.0.name())
    }

    /// Decode bytes, replacing unmappable sequences.
    pub fn decode(&self, bytes: &[u8]) -> String {
        // Replace never fails.
        self.0
            .decode(bytes, DecoderTrap::Replace)
            .unwrap_or_else(|e| e.into_owned())
    }

    /// Encode a string, failing on characters the charset cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        self.0.encode(text, EncoderTrap::Strict).map_err(|e| {
            Error::mismatch(format!("text not representable in {}: {}", self.name(), e))
        })
    }
}

impl Default for Charset {
    fn default() -> Self {
        Charset(ISO_8859_1)
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}

impl PartialEq for Charset {
    fn eq(&self, other: &Self) -> bool {
        self.0.name() == other.0.name()
    }
}

impl Eq for Charset {}
