//! Container header: the self-describing prefix of every DNA file.
//!
//! ```text
//! offset  size  field
//! 0       3     magic "DNA"
//! 3       8     original size, i64 little-endian
//! 11      1     name length in bytes
//! 12      n     basename, UTF-8
//! ```
//!
//! The body starts at `12 + n`.  Readers recompute that offset from the
//! header on every open; it is never cached across operations.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Write};

use crate::error::{DnaError, Result};

pub const MAGIC: &[u8; 3] = b"DNA";
/// Magic + original size + name length.
pub const FIXED_HEADER_SIZE: usize = 12;
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// Only constructed through [`Header::new`] or [`Header::read`], so the
/// name always fits the length byte and the size fits the signed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    original_size: u64,
    name:          String,
}

impl Header {
    /// Fails with [`DnaError::Value`] when the name does not fit the one-byte
    /// length field or the size does not fit the signed 64-bit field.
    pub fn new(original_size: u64, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.len() > MAX_NAME_LEN {
            return Err(DnaError::Value(format!(
                "filename is {} bytes, at most {MAX_NAME_LEN} fit in the header",
                name.len()
            )));
        }
        if original_size > i64::MAX as u64 {
            return Err(DnaError::Value(format!(
                "original size {original_size} exceeds the header's signed 64-bit field"
            )));
        }
        Ok(Self { original_size, name })
    }

    pub fn original_size(&self) -> u64 {
        self.original_size
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte length of the name field (not its character count).
    pub fn name_len(&self) -> u8 {
        self.name.len() as u8
    }

    /// Total header size; the body begins at this offset.
    pub fn size(&self) -> u64 {
        (FIXED_HEADER_SIZE + self.name.len()) as u64
    }

    /// Number of units the body holds for `unit_size`.  A zero unit size
    /// holds no units.
    pub fn unit_count(&self, unit_size: usize) -> u64 {
        match unit_size {
            0 => 0,
            n => self.original_size.div_ceil(n as u64),
        }
    }

    /// Zero bytes appended to the final unit; 0 for a zero unit size.
    pub fn padding(&self, unit_size: usize) -> u64 {
        (self.unit_count(unit_size) * unit_size as u64).saturating_sub(self.original_size)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size() as usize);
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&(self.original_size as i64).to_le_bytes());
        buf.push(self.name_len());
        buf.extend_from_slice(self.name.as_bytes());
        buf
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(&self.encode())
    }

    /// Parse a header from the start of `reader`, leaving it positioned at
    /// the first body byte.
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut fixed = [0u8; FIXED_HEADER_SIZE];
        reader.read_exact(&mut fixed).map_err(truncated)?;
        if &fixed[..3] != MAGIC {
            return Err(DnaError::Format("bad magic, not a DNA file".into()));
        }

        let mut rest = &fixed[3..];
        let original_size = rest.read_i64::<LittleEndian>()?;
        if original_size < 0 {
            return Err(DnaError::Format(format!("negative original size {original_size}")));
        }
        let name_len = rest.read_u8()? as usize;

        let mut name = vec![0u8; name_len];
        reader.read_exact(&mut name).map_err(truncated)?;
        let name = String::from_utf8(name)
            .map_err(|_| DnaError::Format("filename is not valid UTF-8".into()))?;

        Ok(Self { original_size: original_size as u64, name })
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        Self::read(buf)
    }
}

fn truncated(e: io::Error) -> DnaError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => DnaError::Format("truncated header".into()),
        _                            => DnaError::Io(e),
    }
}
