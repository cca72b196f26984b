//! Free-space advisory consulted before packing.
//!
//! The answer is a hint only: packing proceeds either way.

use log::warn;
use std::path::Path;

pub trait SpaceProbe {
    /// `true` when `dir` appears to have more than `required` bytes free.
    fn has_enough_space(&self, dir: &Path, required: u64) -> bool;
}

/// Queries the filesystem holding `dir`.  A failed query answers `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSpaceProbe;

impl SpaceProbe for FsSpaceProbe {
    fn has_enough_space(&self, dir: &Path, required: u64) -> bool {
        match fs2::available_space(dir) {
            Ok(available) => available > required,
            Err(e) => {
                warn!("disk check failed for {}, proceeding: {e}", dir.display());
                true
            }
        }
    }
}

/// Fixed answer; for callers that want to skip the query.
#[derive(Debug, Clone, Copy)]
pub struct AssumeSpace(pub bool);

impl SpaceProbe for AssumeSpace {
    fn has_enough_space(&self, _dir: &Path, _required: u64) -> bool {
        self.0
    }
}

/// Directory the output file will land in.
pub fn output_dir(output: &Path) -> &Path {
    match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_requirement_fits() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsSpaceProbe.has_enough_space(dir.path(), 1));
    }

    #[test]
    fn absurd_requirement_does_not_fit() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!FsSpaceProbe.has_enough_space(dir.path(), u64::MAX));
    }

    #[test]
    fn missing_dir_falls_back_to_true() {
        assert!(FsSpaceProbe.has_enough_space(Path::new("/definitely/not/here"), u64::MAX));
    }

    #[test]
    fn output_dir_of_bare_name_is_cwd() {
        assert_eq!(output_dir(Path::new("out.dna")), Path::new("."));
        assert_eq!(output_dir(Path::new("a/b/out.dna")), Path::new("a/b"));
    }
}
