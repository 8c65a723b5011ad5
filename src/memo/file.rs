//! Memo file handle.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::options::{IfNonExistent, MEMO_BLOCK_SIZE};
use crate::util::coding::strip_soft_returns;
use crate::util::filename::{delete_file, strip_extension};
use crate::version::{MemoLayout, Version};
use crate::{Error, Result};

use super::{decode_counter, encode_counter, encode_entry, encode_file_header, MEMO_END};

/// An open memo file.
#[derive(Debug)]
pub struct MemoFile {
    /// Path of the memo file.
    path: PathBuf,
    file: File,
    version: Version,
    block_size: usize,
    /// First unallocated block.
    next_block: u32,
}

impl MemoFile {
    /// Open a memo file, creating it when missing if `if_missing` allows.
    pub fn open(path: &Path, version: Version, if_missing: IfNonExistent) -> Result<Self> {
        if path.exists() {
            let mut file = OpenOptions::new().read(true).write(true).open(path)?;
            let (next_block, block_size) = read_file_header(&mut file, version)?;
            debug!(
                "opened memo file {}: next block {}, block size {}",
                path.display(),
                next_block,
                block_size
            );
            return Ok(Self {
                path: path.to_path_buf(),
                file,
                version,
                block_size,
                next_block,
            });
        }

        match if_missing {
            IfNonExistent::Error => Err(Error::FileNotFound(path.display().to_string())),
            IfNonExistent::Create => {
                let mut file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create_new(true)
                    .open(path)?;
                let stem = path
                    .file_name()
                    .map(|n| strip_extension(&n.to_string_lossy()).to_string())
                    .unwrap_or_default();
                file.write_all(&encode_file_header(version, 1, &stem, MEMO_BLOCK_SIZE))?;
                debug!("created memo file {}", path.display());
                Ok(Self {
                    path: path.to_path_buf(),
                    file,
                    version,
                    block_size: MEMO_BLOCK_SIZE,
                    next_block: 1,
                })
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First unallocated block.
    pub fn next_block(&self) -> u32 {
        self.next_block
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Read the content stored at `index`.
    pub fn read_block(&mut self, index: u32) -> Result<Vec<u8>> {
        if index == 0 || index >= self.next_block {
            return Err(Error::corrupted(format!(
                "memo block {} outside allocated range 1..{}",
                index, self.next_block
            )));
        }
        self.file
            .seek(SeekFrom::Start(index as u64 * self.block_size as u64))?;

        let layout = self.version.dialect().memo_layout;
        let content = match layout {
            MemoLayout::Terminated => self.read_terminated()?,
            MemoLayout::DbaseBlockHeader => {
                let mut sub = [0u8; 8];
                self.read_memo_exact(&mut sub)?;
                let stored = u32::from_le_bytes([sub[4], sub[5], sub[6], sub[7]]) as usize;
                let len = stored.checked_sub(layout.data_offset()).ok_or_else(|| {
                    Error::corrupted(format!("memo block {}: length {} too small", index, stored))
                })?;
                self.read_counted(len)?
            }
            MemoLayout::FoxProBlockHeader => {
                let mut sub = [0u8; 8];
                self.read_memo_exact(&mut sub)?;
                let len = u32::from_be_bytes([sub[4], sub[5], sub[6], sub[7]]) as usize;
                self.read_counted(len)?
            }
        };
        trace!("read memo block {} ({} bytes)", index, content.len());
        Ok(content)
    }

    /// Append `content` in fresh blocks and return the first block index.
    pub fn append_block(&mut self, content: &[u8]) -> Result<u32> {
        let entry = encode_entry(content, self.version, self.block_size);
        let blocks = (entry.len() / self.block_size) as u32;
        let index = self.next_block;

        self.file
            .seek(SeekFrom::Start(index as u64 * self.block_size as u64))?;
        self.file.write_all(&entry)?;

        self.next_block += blocks;
        self.file.seek(SeekFrom::Start(0))?;
        self.file
            .write_all(&encode_counter(self.version, self.next_block))?;

        debug!(
            "appended memo at block {} ({} bytes, {} blocks)",
            index,
            content.len(),
            blocks
        );
        Ok(index)
    }

    /// Flush file contents to disk.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    /// Sync and release the handle.
    pub fn close(self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Close and remove the file.
    pub fn delete(self) -> Result<()> {
        let path = self.path.clone();
        drop(self.file);
        delete_file(&path)?;
        Ok(())
    }

    fn read_terminated(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = [0u8; MEMO_BLOCK_SIZE];
        loop {
            let n = self.file.read(&mut chunk)?;
            if n == 0 {
                return Err(Error::corrupted("memo file ends inside a memo"));
            }
            if let Some(end) = chunk[..n].iter().position(|&b| b == MEMO_END) {
                out.extend_from_slice(&chunk[..end]);
                return Ok(strip_soft_returns(&out));
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    fn read_counted(&mut self, len: usize) -> Result<Vec<u8>> {
        let remaining = self
            .file
            .metadata()?
            .len()
            .saturating_sub(self.file.stream_position()?);
        if len as u64 > remaining {
            return Err(Error::corrupted(format!(
                "memo length {} exceeds the {} bytes left in the file",
                len, remaining
            )));
        }
        let mut out = vec![0u8; len];
        self.read_memo_exact(&mut out)?;
        Ok(out)
    }

    fn read_memo_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.file.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::corrupted("memo file ends inside a memo")
            } else {
                e.into()
            }
        })
    }
}

/// Read the next free block and the block size from the header block.
fn read_file_header(file: &mut File, version: Version) -> Result<(u32, usize)> {
    let mut head = [0u8; 24];
    let mut got = 0;
    while got < head.len() {
        let n = file.read(&mut head[got..])?;
        if n == 0 {
            break;
        }
        got += n;
    }
    if got < 4 {
        return Err(Error::corrupted("empty memo file"));
    }

    let mut next_block = decode_counter(version, [head[0], head[1], head[2], head[3]]);
    let declared = match version.dialect().memo_layout {
        MemoLayout::Terminated => 0,
        MemoLayout::DbaseBlockHeader if got >= 22 => u16::from_le_bytes([head[20], head[21]]),
        MemoLayout::FoxProBlockHeader if got >= 8 => u16::from_be_bytes([head[6], head[7]]),
        _ => 0,
    };
    let block_size = if declared == 0 {
        MEMO_BLOCK_SIZE
    } else {
        declared as usize
    };

    if next_block == 0 {
        let len = file.metadata()?.len();
        next_block = (len.div_ceil(block_size as u64)).max(1) as u32;
    }
    Ok((next_block, block_size))
}
