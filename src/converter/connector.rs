use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use memmap2::Mmap;

/// Transition cost signalling an unreachable (rid, lid) pair.
///
/// Kept far below `i32::MAX` so that saturating additions of real costs
/// on top of it never wrap.
pub const INVALID_COST: i32 = i32::MAX / 2;

/// Cell sentinel stored in the matrix for unreachable transitions.
const RAW_INVALID: i16 = i16::MAX;

const MAGIC: &[u8; 4] = b"KSCX";
const VERSION: u8 = 1;
/// magic(4) + version(1) + num_ids(2).
const HEADER_SIZE: usize = 4 + 1 + 2;

/// Backing storage for cost data: either owned or memory-mapped.
enum CostStorage {
    Owned(Vec<i16>),
    Mapped(Mmap),
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid header (too short)")]
    InvalidHeader,
    #[error("invalid magic bytes (expected KSCX)")]
    InvalidMagic,
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("matrix body truncated")]
    TruncatedData,
}

/// The connection matrix mapping (right_id of left node, left_id of right
/// node) to a transition cost.
///
/// `rid = 0` is the BOS row and `lid = 0` the EOS column.
pub struct Connector {
    num_ids: u16,
    storage: CostStorage,
}

impl Connector {
    /// Create an owned connector. `costs` is row-major: index
    /// `rid * num_ids + lid`. Short vectors are padded with zeros.
    pub fn from_costs(num_ids: u16, mut costs: Vec<i16>) -> Self {
        costs.resize(num_ids as usize * num_ids as usize, 0);
        Self {
            num_ids,
            storage: CostStorage::Owned(costs),
        }
    }

    /// Memory-map a serialized matrix.
    pub fn open(path: &Path) -> Result<Self, ConnectorError> {
        let file = File::open(path)?;
        // Read-only map of an immutable data file.
        let mmap = unsafe { Mmap::map(&file)? };
        if mmap.len() < HEADER_SIZE {
            return Err(ConnectorError::InvalidHeader);
        }
        if &mmap[0..4] != MAGIC {
            return Err(ConnectorError::InvalidMagic);
        }
        if mmap[4] != VERSION {
            return Err(ConnectorError::UnsupportedVersion(mmap[4]));
        }
        let num_ids = u16::from_le_bytes([mmap[5], mmap[6]]);
        let body = num_ids as usize * num_ids as usize * 2;
        if mmap.len() < HEADER_SIZE + body {
            return Err(ConnectorError::TruncatedData);
        }
        Ok(Self {
            num_ids,
            storage: CostStorage::Mapped(mmap),
        })
    }

    /// Serialize to the KSCX on-disk format.
    pub fn save(&self, path: &Path) -> Result<(), ConnectorError> {
        let mut file = File::create(path)?;
        file.write_all(MAGIC)?;
        file.write_all(&[VERSION])?;
        file.write_all(&self.num_ids.to_le_bytes())?;
        let n = self.num_ids as usize;
        match &self.storage {
            CostStorage::Owned(costs) => {
                for &c in &costs[..n * n] {
                    file.write_all(&c.to_le_bytes())?;
                }
            }
            CostStorage::Mapped(mmap) => {
                file.write_all(&mmap[HEADER_SIZE..HEADER_SIZE + n * n * 2])?;
            }
        }
        Ok(())
    }

    /// Transition cost between the left node's rid and the right node's
    /// lid. Out-of-range ids cost 0; the stored sentinel maps to
    /// [`INVALID_COST`].
    pub fn transition_cost(&self, rid: u16, lid: u16) -> i32 {
        let idx = (rid as usize)
            .saturating_mul(self.num_ids as usize)
            .saturating_add(lid as usize);
        let raw = match &self.storage {
            CostStorage::Owned(costs) => costs.get(idx).copied().unwrap_or(0),
            CostStorage::Mapped(mmap) => {
                let byte_offset = HEADER_SIZE + idx * 2;
                mmap.get(byte_offset..byte_offset + 2)
                    .map(|b| i16::from_le_bytes([b[0], b[1]]))
                    .unwrap_or(0)
            }
        };
        if raw == RAW_INVALID {
            INVALID_COST
        } else {
            i32::from(raw)
        }
    }

    pub fn num_ids(&self) -> u16 {
        self.num_ids
    }
}

/// Add two transition-scale costs without ever leaving the "infinite"
/// regime: once either side is at `INVALID_COST` the sum stays there.
pub fn saturating_cost_add(a: i32, b: i32) -> i32 {
    if a >= INVALID_COST || b >= INVALID_COST {
        INVALID_COST
    } else {
        a.saturating_add(b)
    }
}
