//! Geometry view of a single 7-byte unit.
//!
//! ```text
//! offset  size  field
//! 0       4     x, i32 little-endian
//! 4       1     r
//! 5       1     g
//! 6       1     b
//! ```
//!
//! Pure reinterpretation: pack/unpack never go through this module.  Field
//! widths are enforced by the types, so every value is representable and no
//! truncation can occur.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DnaError, Result};

pub const GEOMETRY_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Geometry {
    pub fn decode(unit: &[u8]) -> Result<Self> {
        if unit.len() != GEOMETRY_SIZE {
            return Err(DnaError::Format(format!(
                "geometry unit must be exactly {GEOMETRY_SIZE} bytes, got {}",
                unit.len()
            )));
        }
        Ok(Self {
            x: LittleEndian::read_i32(&unit[..4]),
            r: unit[4],
            g: unit[5],
            b: unit[6],
        })
    }

    pub fn encode(&self) -> [u8; GEOMETRY_SIZE] {
        let mut unit = [0u8; GEOMETRY_SIZE];
        LittleEndian::write_i32(&mut unit[..4], self.x);
        unit[4] = self.r;
        unit[5] = self.g;
        unit[6] = self.b;
        unit
    }
}

impl TryFrom<&[u8]> for Geometry {
    type Error = DnaError;

    fn try_from(unit: &[u8]) -> Result<Self> {
        Geometry::decode(unit)
    }
}

impl From<Geometry> for [u8; GEOMETRY_SIZE] {
    fn from(g: Geometry) -> Self {
        g.encode()
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ x: {}, r: {}, g: {}, b: {} }}", self.x, self.r, self.g, self.b)
    }
}
