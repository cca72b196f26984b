//! Streaming container engine: writer, reader and random access.
//!
//! # Writer
//! [`DnaWriter`] emits the header as soon as it is constructed, then accepts
//! input in chunks of any size.  Bytes are cut into `unit_size` units in
//! arrival order; a partial unit waits in a small pending buffer until more
//! input arrives.  `finish()` zero-pads the last partial unit (if any) and
//! flushes.  The writer counts every byte it receives and fails with
//! [`DnaError::SizeMismatch`] if the stream disagrees with the size declared
//! in the header.
//!
//! # Reader
//! [`DnaReader`] parses the header, leaving the handle at the first body
//! byte, and streams the body back out, stopping at exactly
//! `original_size` bytes.  Padding in the final unit is never emitted.
//!
//! # Random access
//! Unit `i` lives at `header_size + i * unit_size`.  [`jump_read`] seeks
//! there and reads one unit without touching any other; it only checks that
//! a full unit is physically present.  [`DnaReader::read_unit`] additionally
//! rejects indices past the logical unit count.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::config::DEFAULT_UNIT_SIZE;
use crate::error::{DnaError, Result};
use crate::geometry::Geometry;
use crate::header::Header;

/// Shape of a packed container, reported by [`DnaWriter::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackSummary {
    pub original_size: u64,
    pub header_size:   u64,
    pub unit_count:    u64,
    pub padding:       u64,
}

impl PackSummary {
    /// Physical size of the container on disk.
    pub fn container_size(&self) -> u64 {
        self.header_size + self.original_size + self.padding
    }
}

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct DnaWriter<W: Write> {
    writer:        W,
    pub header:    Header,
    unit_size:     usize,
    /// Leading bytes of a unit that has not been completed yet.
    pending:       Vec<u8>,
    received:      u64,
    units_written: u64,
    finished:      bool,
}

impl<W: Write> DnaWriter<W> {
    pub fn new(writer: W, header: Header) -> Result<Self> {
        Self::with_unit_size(writer, header, DEFAULT_UNIT_SIZE)
    }

    /// Writes the header immediately.
    pub fn with_unit_size(mut writer: W, header: Header, unit_size: usize) -> Result<Self> {
        if unit_size == 0 {
            return Err(DnaError::Value("unit size must be at least 1".into()));
        }
        header.write(&mut writer)?;
        Ok(Self {
            writer,
            header,
            unit_size,
            pending:       Vec::with_capacity(unit_size),
            received:      0,
            units_written: 0,
            finished:      false,
        })
    }

    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    /// Bytes accepted so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn units_written(&self) -> u64 {
        self.units_written
    }

    /// Append `chunk` to the stream, emitting every unit it completes.
    pub fn write_chunk(&mut self, mut chunk: &[u8]) -> Result<()> {
        if self.finished {
            return Err(already_finished());
        }
        let received = self.received + chunk.len() as u64;
        if received > self.header.original_size() {
            return Err(DnaError::SizeMismatch {
                declared: self.header.original_size(),
                actual:   received,
            });
        }
        self.received = received;

        // Complete the pending unit first so order is preserved.
        if !self.pending.is_empty() {
            let take = (self.unit_size - self.pending.len()).min(chunk.len());
            self.pending.extend_from_slice(&chunk[..take]);
            chunk = &chunk[take..];
            if self.pending.len() < self.unit_size {
                return Ok(());
            }
            self.writer.write_all(&self.pending)?;
            self.pending.clear();
            self.units_written += 1;
        }

        let whole = chunk.len() - chunk.len() % self.unit_size;
        if whole > 0 {
            self.writer.write_all(&chunk[..whole])?;
            self.units_written += (whole / self.unit_size) as u64;
        }
        self.pending.extend_from_slice(&chunk[whole..]);
        Ok(())
    }

    /// Drain `reader` into the container `chunk_size` bytes at a time.
    /// Returns the number of bytes consumed.
    pub fn copy_from<R: Read>(&mut self, mut reader: R, chunk_size: usize) -> Result<u64> {
        let mut buf = vec![0u8; chunk_size.max(1)];
        let mut total = 0u64;
        loop {
            let n = read_some(&mut reader, &mut buf)?;
            if n == 0 {
                break;
            }
            self.write_chunk(&buf[..n])?;
            total += n as u64;
        }
        Ok(total)
    }

    /// Pad and emit the final partial unit, then flush.  Must be called once.
    pub fn finish(&mut self) -> Result<PackSummary> {
        if self.finished {
            return Err(already_finished());
        }
        self.finished = true;

        if self.received != self.header.original_size() {
            return Err(DnaError::SizeMismatch {
                declared: self.header.original_size(),
                actual:   self.received,
            });
        }

        let mut padding = 0u64;
        if !self.pending.is_empty() {
            padding = (self.unit_size - self.pending.len()) as u64;
            self.pending.resize(self.unit_size, 0);
            self.writer.write_all(&self.pending)?;
            self.pending.clear();
            self.units_written += 1;
        }
        self.writer.flush()?;

        Ok(PackSummary {
            original_size: self.header.original_size(),
            header_size:   self.header.size(),
            unit_count:    self.units_written,
            padding,
        })
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Pack everything `reader` yields into `writer` under `header`.
pub fn pack_stream<R: Read, W: Write>(
    reader:     R,
    writer:     W,
    header:     Header,
    unit_size:  usize,
    chunk_size: usize,
) -> Result<PackSummary> {
    let mut w = DnaWriter::with_unit_size(writer, header, unit_size)?;
    w.copy_from(reader, chunk_size)?;
    w.finish()
}

// ── Reader ───────────────────────────────────────────────────────────────────

pub struct DnaReader<R: Read> {
    reader:     R,
    pub header: Header,
    unit_size:  usize,
}

impl<R: Read> DnaReader<R> {
    pub fn new(reader: R) -> Result<Self> {
        Self::with_unit_size(reader, DEFAULT_UNIT_SIZE)
    }

    /// Parses the header; `reader` must be positioned at the container start.
    pub fn with_unit_size(mut reader: R, unit_size: usize) -> Result<Self> {
        if unit_size == 0 {
            return Err(DnaError::Value("unit size must be at least 1".into()));
        }
        let header = Header::read(&mut reader)?;
        Ok(Self { reader, header, unit_size })
    }

    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    /// Logical unit count, derived from the recorded original size.
    pub fn unit_count(&self) -> u64 {
        self.header.unit_count(self.unit_size)
    }

    /// Stream the original bytes into `out`, dropping padding.
    ///
    /// Reads forward from the current position, so it must run before any
    /// [`read_unit`](DnaReader::read_unit) call on the same reader.
    pub fn unpack_to<W: Write>(&mut self, mut out: W, chunk_size: usize) -> Result<u64> {
        let expected = self.header.original_size();
        let mut buf = vec![0u8; chunk_size.max(1)];
        let mut written = 0u64;

        while written < expected {
            let n = read_some(&mut self.reader, &mut buf)?;
            if n == 0 {
                break;
            }
            let take = (n as u64).min(expected - written) as usize;
            out.write_all(&buf[..take])?;
            written += take as u64;
        }
        if written < expected {
            return Err(DnaError::Truncated { expected, actual: written });
        }
        out.flush()?;
        Ok(written)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> DnaReader<R> {
    /// Read unit `index`, rejecting indices past the logical unit count.
    pub fn read_unit(&mut self, index: u64) -> Result<Vec<u8>> {
        let count = self.unit_count();
        if index >= count {
            return Err(DnaError::UnitOutOfRange { index, count });
        }
        jump_read(&mut self.reader, index, self.header.size(), self.unit_size)
    }

    pub fn read_geometry(&mut self, index: u64) -> Result<Geometry> {
        Geometry::decode(&self.read_unit(index)?)
    }
}

// ── Random access ────────────────────────────────────────────────────────────

/// Absolute byte offset of unit `index`.
pub fn unit_offset(header_size: u64, index: u64, unit_size: usize) -> Result<u64> {
    index
        .checked_mul(unit_size as u64)
        .and_then(|o| o.checked_add(header_size))
        .ok_or_else(|| DnaError::Value(format!("unit index {index} overflows the file offset")))
}

/// Seek to unit `index` and read exactly one unit.
///
/// Only the physical end of file is checked: a unit that exists on disk is
/// returned even if it lies beyond the recorded original size.
pub fn jump_read<R: Read + Seek>(
    reader:      &mut R,
    index:       u64,
    header_size: u64,
    unit_size:   usize,
) -> Result<Vec<u8>> {
    let offset = unit_offset(header_size, index, unit_size)?;
    reader.seek(SeekFrom::Start(offset))?;

    let mut unit = vec![0u8; unit_size];
    let mut filled = 0;
    while filled < unit_size {
        let n = read_some(reader, &mut unit[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    if filled < unit_size {
        return Err(DnaError::IncompleteUnit { index, expected: unit_size, actual: filled });
    }
    Ok(unit)
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn read_some<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

fn already_finished() -> DnaError {
    DnaError::Value("container writer already finished".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn pack(data: &[u8], unit_size: usize, chunk_size: usize) -> (Vec<u8>, PackSummary) {
        let header = Header::new(data.len() as u64, "t.bin").unwrap();
        let mut out = Vec::new();
        let summary = pack_stream(data, &mut out, header, unit_size, chunk_size).unwrap();
        (out, summary)
    }

    #[test]
    fn body_is_padded_to_whole_units() {
        let (out, s) = pack(b"abcdefghij", 7, 4);
        assert_eq!(s.unit_count, 2);
        assert_eq!(s.padding, 4);
        assert_eq!(out.len() as u64, s.container_size());
        assert_eq!(&out[17..], b"abcdefghij\0\0\0\0");
    }

    #[test]
    fn chunking_does_not_change_output() {
        let data: Vec<u8> = (0u8..=200).collect();
        let (reference, _) = pack(&data, 7, 1);
        for chunk in [2, 3, 6, 7, 8, 13, 64, 1024] {
            let (out, _) = pack(&data, 7, chunk);
            assert_eq!(out, reference, "chunk size {chunk}");
        }
    }

    #[test]
    fn exact_multiple_has_no_pad_unit() {
        let (out, s) = pack(&[9u8; 21], 7, 5);
        assert_eq!(s.unit_count, 3);
        assert_eq!(s.padding, 0);
        assert_eq!(out.len(), 17 + 21);
    }

    #[test]
    fn empty_input_is_header_only() {
        let (out, s) = pack(&[], 7, 5);
        assert_eq!(s.unit_count, 0);
        assert_eq!(out, Header::new(0, "t.bin").unwrap().encode());

        let mut r = DnaReader::new(Cursor::new(out)).unwrap();
        let mut restored = Vec::new();
        assert_eq!(r.unpack_to(&mut restored, 16).unwrap(), 0);
        assert!(restored.is_empty());
    }

    #[test]
    fn unpack_drops_padding() {
        let data = b"Hello Geometry Logic System DNA! 123";
        let (out, _) = pack(data, 7, 64);
        for chunk in [1, 7, 10, 4096] {
            let mut r = DnaReader::new(Cursor::new(out.clone())).unwrap();
            let mut restored = Vec::new();
            r.unpack_to(&mut restored, chunk).unwrap();
            assert_eq!(restored, data);
        }
    }

    #[test]
    fn longer_stream_than_declared_fails_early() {
        let header = Header::new(3, "t").unwrap();
        let mut w = DnaWriter::new(Vec::new(), header).unwrap();
        w.write_chunk(b"ab").unwrap();
        let err = w.write_chunk(b"cd").unwrap_err();
        assert!(matches!(err, DnaError::SizeMismatch { declared: 3, actual: 4 }));
    }

    #[test]
    fn shorter_stream_than_declared_fails_at_finish() {
        let header = Header::new(10, "t").unwrap();
        let mut w = DnaWriter::new(Vec::new(), header).unwrap();
        w.write_chunk(b"abc").unwrap();
        assert!(matches!(w.finish(), Err(DnaError::SizeMismatch { declared: 10, actual: 3 })));
    }

    #[test]
    fn finish_twice_is_rejected() {
        let mut w = DnaWriter::new(Vec::new(), Header::new(1, "t").unwrap()).unwrap();
        w.write_chunk(b"x").unwrap();
        w.finish().unwrap();
        assert!(matches!(w.finish(), Err(DnaError::Value(_))));
        assert!(matches!(w.write_chunk(b""), Err(DnaError::Value(_))));
        assert_eq!(w.into_inner().len(), 13 + 7);
    }

    #[test]
    fn zero_unit_size_is_rejected() {
        let header = Header::new(0, "t").unwrap();
        assert!(matches!(DnaWriter::with_unit_size(Vec::new(), header, 0), Err(DnaError::Value(_))));
    }

    #[test]
    fn truncated_body_is_reported() {
        let (mut out, _) = pack(&[1u8; 20], 7, 64);
        out.truncate(17 + 15);
        let mut r = DnaReader::new(Cursor::new(out)).unwrap();
        let err = r.unpack_to(Vec::new(), 8).unwrap_err();
        assert!(matches!(err, DnaError::Truncated { expected: 20, actual: 15 }));
    }

    #[test]
    fn bad_magic_stops_reader() {
        let (mut out, _) = pack(b"abc", 7, 64);
        out[..3].copy_from_slice(b"AND");
        assert!(matches!(DnaReader::new(Cursor::new(out)), Err(DnaError::Format(_))));
    }

    #[test]
    fn jump_read_matches_packed_units() {
        let data: Vec<u8> = (0u8..50).collect();
        let (out, s) = pack(&data, 7, 3);
        let mut cur = Cursor::new(out);
        for i in 0..s.unit_count {
            let unit = jump_read(&mut cur, i, s.header_size, 7).unwrap();
            let start = (i * 7) as usize;
            let end = (start + 7).min(data.len());
            assert_eq!(&unit[..end - start], &data[start..end]);
            assert!(unit[end - start..].iter().all(|&b| b == 0));
        }
        let err = jump_read(&mut cur, s.unit_count, s.header_size, 7).unwrap_err();
        assert!(matches!(err, DnaError::IncompleteUnit { expected: 7, actual: 0, .. }));
    }

    #[test]
    fn jump_read_returns_physical_trailing_units() {
        // A stray unit past the logical end is returned by the raw reader
        // but rejected by the bounds-checked one.
        let (mut out, s) = pack(b"abcdefg", 7, 64);
        out.extend_from_slice(&[0u8; 7]);
        let mut cur = Cursor::new(out);
        assert_eq!(jump_read(&mut cur, 1, s.header_size, 7).unwrap(), vec![0u8; 7]);

        cur.set_position(0);
        let mut r = DnaReader::new(cur).unwrap();
        assert!(matches!(r.read_unit(1), Err(DnaError::UnitOutOfRange { index: 1, count: 1 })));
        assert_eq!(r.read_unit(0).unwrap(), b"abcdefg");
    }

    #[test]
    fn short_final_unit_is_incomplete() {
        let (mut out, s) = pack(b"abcdefghij", 7, 64);
        out.pop();
        let mut cur = Cursor::new(out);
        let err = jump_read(&mut cur, 1, s.header_size, 7).unwrap_err();
        assert!(matches!(err, DnaError::IncompleteUnit { index: 1, expected: 7, actual: 6 }));
    }

    #[test]
    fn offset_overflow_is_value_error() {
        assert_eq!(unit_offset(12, 3, 7).unwrap(), 33);
        assert!(matches!(unit_offset(12, u64::MAX, 7), Err(DnaError::Value(_))));
    }

    #[test]
    fn read_geometry_decodes_unit() {
        let g = Geometry { x: -123_456, r: 1, g: 2, b: 3 };
        let mut data = Vec::new();
        data.extend_from_slice(&[0u8; 7]);
        data.extend_from_slice(&g.encode());
        let (out, _) = pack(&data, 7, 64);
        let mut r = DnaReader::new(Cursor::new(out)).unwrap();
        assert_eq!(r.read_geometry(1).unwrap(), g);
    }

    #[test]
    fn other_unit_sizes() {
        let data: Vec<u8> = (0u8..100).collect();
        for unit_size in [1usize, 2, 16, 99, 100, 101] {
            let (out, s) = pack(&data, unit_size, 9);
            assert_eq!(s.unit_count, 100u64.div_ceil(unit_size as u64));
            let body = out.len() as u64 - s.header_size;
            assert_eq!(body, s.unit_count * unit_size as u64);

            let mut r = DnaReader::with_unit_size(Cursor::new(out), unit_size).unwrap();
            let mut restored = Vec::new();
            r.unpack_to(&mut restored, 13).unwrap();
            assert_eq!(restored, data);
        }
    }
}
