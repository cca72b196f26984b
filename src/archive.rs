//! High-level [`Dna`] API: the path-level entry points.
//!
//! ```no_run
//! use dnafile::archive::Dna;
//! use dnafile::config::Config;
//!
//! let dna = Dna::new(Config::default())?;
//! dna.pack("photo.raw", "photo.dna")?;
//! dna.unpack("photo.dna", "photo.restored.raw")?;
//! let g = dna.read_unit("photo.dna", 1)?;
//! println!("unit 1: {g}");
//! # Ok::<(), dnafile::DnaError>(())
//! ```
//!
//! Every operation opens its own handles, parses the header afresh and
//! returns a typed result; nothing is logged as a substitute for an error.

use log::{debug, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{open_existing, DnaError, Result};
use crate::geometry::Geometry;
use crate::header::Header;
use crate::io_stream::{pack_stream, DnaReader, PackSummary};
use crate::space::{output_dir, FsSpaceProbe, SpaceProbe};

// ── Reports ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PackReport {
    pub output:   PathBuf,
    /// Basename recorded in the header.
    pub name:     String,
    pub summary:  PackSummary,
    /// Answer of the free-space advisory; packing ran regardless.
    pub space_ok: bool,
}

#[derive(Debug, Clone)]
pub struct UnpackReport {
    pub output:        PathBuf,
    pub original_size: u64,
}

/// Decoded header plus the body geometry it implies.
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub header:     Header,
    pub unit_size:  usize,
    pub unit_count: u64,
    pub padding:    u64,
    /// Bytes actually present after the header.
    pub body_size:  u64,
}

impl ContainerInfo {
    /// Body size implied by the header.
    pub fn expected_body_size(&self) -> u64 {
        self.unit_count * self.unit_size as u64
    }
}

// ── Dna ──────────────────────────────────────────────────────────────────────

pub struct Dna {
    config: Config,
    probe:  Box<dyn SpaceProbe>,
}

impl Dna {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_probe(config, FsSpaceProbe)
    }

    pub fn with_probe<S: SpaceProbe + 'static>(config: Config, probe: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, probe: Box::new(probe) })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Pack ─────────────────────────────────────────────────────────────────

    /// Pack the file at `input` into a new container at `output`.
    ///
    /// The header records the size reported by the filesystem; the stream is
    /// recounted and a disagreement fails with [`DnaError::SizeMismatch`].
    pub fn pack<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<PackReport> {
        let (input, output) = (input.as_ref(), output.as_ref());

        let file = open_existing(input)?;
        let meta = file.metadata()?;
        if !meta.is_file() {
            return Err(DnaError::Value(format!("{} is not a regular file", input.display())));
        }
        let name = basename(input)?;
        let header = Header::new(meta.len(), name.clone())?;

        let required = meta.len().saturating_mul(self.config.space_factor);
        let dir = output_dir(output);
        let space_ok = self.probe.has_enough_space(dir, required);
        if !space_ok {
            warn!("disk space might be low in {} ({required} bytes wanted)", dir.display());
        }

        info!("packing {} to {}", input.display(), output.display());
        let sink = BufWriter::new(File::create(output)?);
        let summary = pack_stream(
            file,
            sink,
            header,
            self.config.unit_size,
            self.config.chunk_size,
        )?;
        info!(
            "packed {} bytes into {} unit(s), {} padding byte(s)",
            summary.original_size, summary.unit_count, summary.padding
        );

        Ok(PackReport { output: output.to_owned(), name, summary, space_ok })
    }

    // ── Unpack ───────────────────────────────────────────────────────────────

    /// Restore the original bytes of `input`.
    ///
    /// If `dest` is an existing directory the file is written there under
    /// its recorded name; otherwise `dest` is the output path itself.
    pub fn unpack<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, dest: Q) -> Result<UnpackReport> {
        let input = input.as_ref();
        let mut reader = DnaReader::with_unit_size(open_existing(input)?, self.config.unit_size)?;
        let output = resolve_destination(dest.as_ref(), reader.header.name())?;

        info!(
            "unpacking {} to {} (original size: {} bytes)",
            input.display(),
            output.display(),
            reader.header.original_size()
        );
        let sink = BufWriter::new(File::create(&output)?);
        let original_size = reader.unpack_to(sink, self.config.chunk_size)?;
        info!("unpacking complete");

        Ok(UnpackReport { output, original_size })
    }

    // ── Read ─────────────────────────────────────────────────────────────────

    /// Raw bytes of unit `index`, read without scanning earlier units.
    pub fn read_raw_unit<P: AsRef<Path>>(&self, input: P, index: u64) -> Result<Vec<u8>> {
        let mut reader = DnaReader::with_unit_size(open_existing(input.as_ref())?, self.config.unit_size)?;
        debug!("reading unit {index} past a {} byte header", reader.header.size());
        reader.read_unit(index)
    }

    /// Unit `index` decoded as a [`Geometry`] record.
    pub fn read_unit<P: AsRef<Path>>(&self, input: P, index: u64) -> Result<Geometry> {
        Geometry::decode(&self.read_raw_unit(input, index)?)
    }

    // ── Inspect ──────────────────────────────────────────────────────────────

    pub fn inspect<P: AsRef<Path>>(&self, input: P) -> Result<ContainerInfo> {
        let file = open_existing(input.as_ref())?;
        let file_len = file.metadata()?.len();
        let reader = DnaReader::with_unit_size(file, self.config.unit_size)?;
        let header = reader.header;
        Ok(ContainerInfo {
            unit_size:  self.config.unit_size,
            unit_count: header.unit_count(self.config.unit_size),
            padding:    header.padding(self.config.unit_size),
            body_size:  file_len.saturating_sub(header.size()),
            header,
        })
    }
}

// ── helpers ──────────────────────────────────────────────────────────────────

/// Final path component of `path` as UTF-8.
pub fn basename(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .ok_or_else(|| DnaError::Value(format!("{} has no file name", path.display())))?;
    name.to_str()
        .map(str::to_owned)
        .ok_or_else(|| DnaError::Value(format!("file name of {} is not UTF-8", path.display())))
}

/// Where an unpacked file goes: `dest/<stored_name>` for an existing
/// directory, `dest` verbatim otherwise.
pub fn resolve_destination(dest: &Path, stored_name: &str) -> Result<PathBuf> {
    if dest.is_dir() {
        Ok(dest.join(checked_name(stored_name)?))
    } else {
        Ok(dest.to_owned())
    }
}

/// A stored name must be a single plain path component.
fn checked_name(name: &str) -> Result<&str> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\');
    if plain {
        Ok(name)
    } else {
        Err(DnaError::Format(format!("stored filename {name:?} is not a plain basename")))
    }
}
