//! Memo files: variable-length content for Memo, Binary, General and
//! Picture fields.
//!
//! # File Format
//!
//! ```text
//! +------------------+ block 0
//! | Header           |  next free block + dialect metadata, zero-padded
//! +------------------+ block 1
//! | Content          |  one or more whole blocks per memo
//! +------------------+
//! | ...              |
//! +------------------+
//! ```
//!
//! # Header block
//!
//! ```text
//! dBase III / Clipper   [0..4]  next free block (LE)   [16] 0x03
//! dBase IV / dBase 5    [0..4]  next free block (LE)   [8..16] file name
//!                       [16..20] 00 00 02 01           [20..22] block size (LE)
//! FoxPro 2.6            [0..4]  next free block (BE)   [6..8] block size (BE)
//! ```
//!
//! # Content blocks
//!
//! ```text
//! terminated      content | 1A 1A | zero padding
//! dBase IV / 5    FF FF 08 00 | length + 8 (LE) | content | zero padding
//! FoxPro          type = 1 (BE) | length (BE)   | content | zero padding
//! ```
//!
//! Blocks are allocated append-only; space is never reclaimed.

mod file;

pub use file::MemoFile;

use bytes::{BufMut, BytesMut};

use crate::version::{MemoLayout, Version};

/// Default memo block size.
pub use crate::options::MEMO_BLOCK_SIZE;

/// Byte that ends terminated memo content.
pub const MEMO_END: u8 = 0x1A;

const DBASE_BLOCK_SIGNATURE: [u8; 4] = [0xFF, 0xFF, 0x08, 0x00];
const FOXPRO_TEXT_BLOCK: u32 = 1;

/// Blocks occupied by `content_len` bytes of content, and the zero padding
/// that fills the last one.
pub fn block_span(content_len: usize, version: Version, block_size: usize) -> (usize, usize) {
    let d = version.dialect();
    let n = content_len + d.memo_end_marker.len() + d.memo_layout.data_offset();
    let mut blocks = n / block_size + 1;
    let mut pad = block_size - n % block_size;
    if pad == block_size {
        pad = 0;
        blocks -= 1;
    }
    (blocks, pad)
}

/// Encode one memo entry: sub-header, content, end marker and padding.
pub fn encode_entry(content: &[u8], version: Version, block_size: usize) -> BytesMut {
    let d = version.dialect();
    let (blocks, pad) = block_span(content.len(), version, block_size);
    let mut buf = BytesMut::with_capacity(blocks * block_size);

    match d.memo_layout {
        MemoLayout::Terminated => {}
        MemoLayout::DbaseBlockHeader => {
            buf.put_slice(&DBASE_BLOCK_SIGNATURE);
            buf.put_u32_le((content.len() + d.memo_layout.data_offset()) as u32);
        }
        MemoLayout::FoxProBlockHeader => {
            buf.put_u32(FOXPRO_TEXT_BLOCK);
            buf.put_u32(content.len() as u32);
        }
    }
    buf.put_slice(content);
    buf.put_slice(d.memo_end_marker);
    buf.put_bytes(0, pad);
    buf
}

/// Encode the header block of a new memo file.
pub fn encode_file_header(
    version: Version,
    next_block: u32,
    file_stem: &str,
    block_size: usize,
) -> BytesMut {
    let mut buf = BytesMut::with_capacity(block_size);
    match version.dialect().memo_layout {
        MemoLayout::Terminated => {
            buf.put_u32_le(next_block);
            buf.put_bytes(0, 12);
            buf.put_u8(0x03);
        }
        MemoLayout::DbaseBlockHeader => {
            buf.put_u32_le(next_block);
            buf.put_bytes(0, 4);
            let stem = file_stem.to_uppercase();
            crate::util::coding::put_fixed_str(&mut buf, stem.as_bytes(), 8);
            buf.put_slice(&[0x00, 0x00, 0x02, 0x01]);
            buf.put_u16_le(block_size as u16);
        }
        MemoLayout::FoxProBlockHeader => {
            buf.put_u32(next_block);
            buf.put_bytes(0, 2);
            buf.put_u16(block_size as u16);
        }
    }
    let used = buf.len();
    buf.put_bytes(0, block_size - used);
    buf
}

/// Encode the next-free-block counter stored at offset 0.
pub fn encode_counter(version: Version, next_block: u32) -> [u8; 4] {
    match version.dialect().memo_layout {
        MemoLayout::FoxProBlockHeader => next_block.to_be_bytes(),
        _ => next_block.to_le_bytes(),
    }
}

/// Decode the next-free-block counter.
pub fn decode_counter(version: Version, raw: [u8; 4]) -> u32 {
    match version.dialect().memo_layout {
        MemoLayout::FoxProBlockHeader => u32::from_be_bytes(raw),
        _ => u32::from_le_bytes(raw),
    }
}
