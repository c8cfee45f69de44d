//! Persisted conversion history.
//!
//! Records committed (reading, surface) pairs and persists them in an
//! encrypted file: a magic/version header, the CBC initialization
//! vector, then the AES-256-CBC ciphertext of a length-prefixed bincode
//! body. How the records influence ranking is a learning-model concern
//! and stays outside this core; here they are stored, queried and
//! reverted only.

pub mod aes256;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

const MAGIC: &[u8; 4] = b"KSUH";
const VERSION: u8 = 1;
/// magic(4) + version(1) + iv(16).
const HEADER_SIZE: usize = 4 + 1 + aes256::BLOCK_BYTES;

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("file too short")]
    TooShort,
    #[error("invalid magic bytes (expected KSUH)")]
    InvalidMagic,
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("ciphertext is not block-aligned")]
    Misaligned,
    #[error("decrypted body is inconsistent (wrong key?)")]
    Corrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub frequency: u32,
    pub last_used: u64,
}

/// Flat serialization format for bincode.
#[derive(Serialize, Deserialize)]
struct HistoryData {
    entries: Vec<HistoryRecord>,
}

#[derive(Serialize, Deserialize)]
struct HistoryRecord {
    key: String,
    value: String,
    frequency: u32,
    last_used: u64,
}

/// Committed conversions, keyed by (reading, surface).
#[derive(Debug, Default, Clone)]
pub struct UserHistory {
    entries: HashMap<(String, String), HistoryEntry>,
}

impl UserHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Record one committed conversion at `timestamp` (epoch seconds).
    pub fn record(&mut self, key: &str, value: &str, timestamp: u64) {
        let entry = self
            .entries
            .entry((key.to_string(), value.to_string()))
            .or_insert(HistoryEntry {
                frequency: 0,
                last_used: 0,
            });
        entry.frequency = entry.frequency.saturating_add(1);
        entry.last_used = timestamp;
    }

    /// Remove one record, e.g. when a commit is reverted.
    pub fn remove(&mut self, key: &str, value: &str) -> bool {
        self.entries
            .remove(&(key.to_string(), value.to_string()))
            .is_some()
    }

    pub fn entry(&self, key: &str, value: &str) -> Option<&HistoryEntry> {
        self.entries.get(&(key.to_string(), value.to_string()))
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.entry(key, value).is_some()
    }

    /// Serialize and encrypt with AES-256-CBC.
    pub fn to_encrypted_bytes(
        &self,
        key: &[u8; aes256::KEY_BYTES],
        iv: &[u8; aes256::BLOCK_BYTES],
    ) -> Result<Vec<u8>, HistoryError> {
        let body = bincode::serialize(&self.to_data()).map_err(|_| HistoryError::Corrupted)?;

        // Length-prefixed plaintext, zero-padded to the block size.
        let mut plaintext = Vec::with_capacity(4 + body.len() + aes256::BLOCK_BYTES);
        plaintext.extend_from_slice(&(body.len() as u32).to_le_bytes());
        plaintext.extend_from_slice(&body);
        let padded = plaintext.len().div_ceil(aes256::BLOCK_BYTES) * aes256::BLOCK_BYTES;
        plaintext.resize(padded, 0);
        aes256::transform_cbc(key, iv, &mut plaintext);

        let mut out = Vec::with_capacity(HEADER_SIZE + plaintext.len());
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.extend_from_slice(iv);
        out.extend_from_slice(&plaintext);
        Ok(out)
    }

    pub fn from_encrypted_bytes(
        bytes: &[u8],
        key: &[u8; aes256::KEY_BYTES],
    ) -> Result<Self, HistoryError> {
        if bytes.len() < HEADER_SIZE {
            return Err(HistoryError::TooShort);
        }
        if &bytes[0..4] != MAGIC {
            return Err(HistoryError::InvalidMagic);
        }
        if bytes[4] != VERSION {
            return Err(HistoryError::UnsupportedVersion(bytes[4]));
        }
        let mut iv = [0u8; aes256::BLOCK_BYTES];
        iv.copy_from_slice(&bytes[5..HEADER_SIZE]);

        let mut plaintext = bytes[HEADER_SIZE..].to_vec();
        if plaintext.len() % aes256::BLOCK_BYTES != 0 || plaintext.len() < aes256::BLOCK_BYTES {
            return Err(HistoryError::Misaligned);
        }
        aes256::inverse_transform_cbc(key, &iv, &mut plaintext);

        let body_len = u32::from_le_bytes(plaintext[0..4].try_into().unwrap()) as usize;
        let body = plaintext
            .get(4..4 + body_len)
            .ok_or(HistoryError::Corrupted)?;
        let data: HistoryData =
            bincode::deserialize(body).map_err(|_| HistoryError::Corrupted)?;
        Ok(Self::from_data(data))
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(
        &self,
        path: &Path,
        key: &[u8; aes256::KEY_BYTES],
        iv: &[u8; aes256::BLOCK_BYTES],
    ) -> Result<(), HistoryError> {
        let bytes = self.to_encrypted_bytes(key, iv)?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        debug!(entries = self.len(), "history saved");
        Ok(())
    }

    /// Open from file, returning an empty history if the file doesn't
    /// exist yet.
    pub fn open(path: &Path, key: &[u8; aes256::KEY_BYTES]) -> Result<Self, HistoryError> {
        match fs::read(path) {
            Ok(bytes) => Self::from_encrypted_bytes(&bytes, key),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn to_data(&self) -> HistoryData {
        let mut entries: Vec<HistoryRecord> = self
            .entries
            .iter()
            .map(|((key, value), entry)| HistoryRecord {
                key: key.clone(),
                value: value.clone(),
                frequency: entry.frequency,
                last_used: entry.last_used,
            })
            .collect();
        // HashMap order is arbitrary; keep the file deterministic.
        entries.sort_by(|a, b| (&a.key, &a.value).cmp(&(&b.key, &b.value)));
        HistoryData { entries }
    }

    fn from_data(data: HistoryData) -> Self {
        let entries = data
            .entries
            .into_iter()
            .map(|r| {
                (
                    (r.key, r.value),
                    HistoryEntry {
                        frequency: r.frequency,
                        last_used: r.last_used,
                    },
                )
            })
            .collect();
        Self { entries }
    }
}
