pub mod error;
pub mod config;
pub mod header;
pub mod geometry;
pub mod io_stream;
pub mod archive;
pub mod space;
pub mod errlog;

pub use error::{DnaError, Result};
pub use config::Config;
pub use header::Header;
pub use geometry::Geometry;
pub use io_stream::{DnaReader, DnaWriter, PackSummary, jump_read};
pub use archive::Dna;
