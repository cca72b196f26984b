use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DnaError {
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Invalid container format: {0}")]
    Format(String),
    #[error("Invalid value: {0}")]
    Value(String),
    #[error("Reached EOF or incomplete unit {index}: expected {expected} bytes, got {actual}")]
    IncompleteUnit { index: u64, expected: usize, actual: usize },
    #[error("Unit {index} out of range: container holds {count} unit(s)")]
    UnitOutOfRange { index: u64, count: u64 },
    #[error("Input length changed while packing: header declares {declared} bytes, stream delivered {actual}")]
    SizeMismatch { declared: u64, actual: u64 },
    #[error("Container body truncated: expected {expected} bytes, found {actual}")]
    Truncated { expected: u64, actual: u64 },
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DnaError>;

/// Open `path` for reading, reporting a missing file as [`DnaError::NotFound`].
pub(crate) fn open_existing(path: &std::path::Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DnaError::NotFound(path.to_path_buf()),
        _                       => DnaError::Io(e),
    })
}
