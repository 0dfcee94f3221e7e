use super::error::SaveError;
use super::SNAPSHOT_VERSION;
use crate::lineup::SavedLineup;
use crate::models::{Athlete, LineupId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

const MAX_ATHLETES: usize = 1000;
const MAX_LINEUPS: usize = 500;
const CHECKSUM_LEN: usize = 32;

/// Full persisted state: roster, every saved lineup and the active pointer
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub athletes: Vec<Athlete>,

    pub saved_lineups: IndexMap<LineupId, SavedLineup>,

    /// `null` in snapshots written before any lineup existed
    #[serde(default)]
    pub active_lineup_id: Option<LineupId>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Structural checks that cannot be repaired by migration
    pub fn validate(&self) -> Result<(), SaveError> {
        if self.athletes.len() > MAX_ATHLETES {
            return Err(SaveError::DataTooLarge { size: self.athletes.len() });
        }
        if self.saved_lineups.len() > MAX_LINEUPS {
            return Err(SaveError::DataTooLarge { size: self.saved_lineups.len() });
        }

        let mut athlete_ids = HashSet::new();
        for athlete in &self.athletes {
            if !athlete_ids.insert(&athlete.id) {
                return Err(SaveError::Corrupted(format!("duplicate athlete id '{}'", athlete.id)));
            }
            for (abbr, metrics) in &athlete.events {
                metrics.validate().map_err(|e| {
                    SaveError::Corrupted(format!("athlete '{}' event {}: {}", athlete.id, abbr, e))
                })?;
            }
        }

        Ok(())
    }
}

/// Binary envelope written by the packed codec
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PackedSnapshot {
    /// Format version for migration
    pub version: u32,

    /// Write time (unix milliseconds)
    pub saved_at: u64,

    pub snapshot: Snapshot,
}

impl PackedSnapshot {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { version: SNAPSHOT_VERSION, saved_at: current_timestamp(), snapshot }
    }
}

/// MessagePack → LZ4 → trailing SHA-256
pub fn serialize_and_compress(snapshot: &Snapshot) -> Result<Vec<u8>, SaveError> {
    snapshot.validate()?;

    let envelope = PackedSnapshot::new(snapshot.clone());
    let msgpack = to_vec_named(&envelope)?;

    let mut packed = compress_prepend_size(&msgpack);

    let checksum = Sha256::digest(&packed);
    packed.extend_from_slice(&checksum);

    Ok(packed)
}

/// Reverses [`serialize_and_compress`], verifying the checksum first
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<PackedSnapshot, SaveError> {
    // Size header + checksum
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(SaveError::Corrupted("packed snapshot truncated".to_string()));
    }

    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;
    let envelope: PackedSnapshot = from_slice(&msgpack)?;

    if envelope.version > SNAPSHOT_VERSION {
        return Err(SaveError::VersionMismatch { found: envelope.version, expected: SNAPSHOT_VERSION });
    }
    envelope.snapshot.validate()?;

    Ok(envelope)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
