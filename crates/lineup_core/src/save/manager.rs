use super::error::SaveError;
use super::format::{decompress_and_deserialize, serialize_and_compress, Snapshot};
use super::migration::migrate_packed;

use std::fs::{rename, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// Where snapshots go. Callers store a full snapshot after each accepted
/// mutation and ask for one back at startup.
pub trait PersistenceSink {
    fn store(&mut self, snapshot: &Snapshot) -> Result<(), SaveError>;

    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> Result<Option<Snapshot>, SaveError>;
}

/// Holds the last stored snapshot as opaque JSON bytes
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    bytes: Option<Vec<u8>>,
    writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the sink with raw bytes, as if a previous session wrote them
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: Some(bytes.into()), writes: 0 }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PersistenceSink for MemorySink {
    fn store(&mut self, snapshot: &Snapshot) -> Result<(), SaveError> {
        self.bytes = Some(serde_json::to_vec(snapshot)?);
        self.writes += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>, SaveError> {
        let Some(bytes) = &self.bytes else {
            return Ok(None);
        };
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        snapshot.validate()?;
        Ok(Some(snapshot))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotCodec {
    /// Pretty JSON, readable by the web client
    Json,
    /// MessagePack + LZ4 + SHA-256 envelope
    Packed,
}

impl SnapshotCodec {
    /// `.json` files are JSON, everything else is packed
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SnapshotCodec::Json,
            _ => SnapshotCodec::Packed,
        }
    }
}

/// Single-file sink with atomic replace
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    codec: SnapshotCodec,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let codec = SnapshotCodec::for_path(&path);
        Self { path, codec }
    }

    pub fn with_codec(path: impl Into<PathBuf>, codec: SnapshotCodec) -> Self {
        Self { path: path.into(), codec }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> SnapshotCodec {
        self.codec
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn encode(&self, snapshot: &Snapshot) -> Result<Vec<u8>, SaveError> {
        match self.codec {
            SnapshotCodec::Json => Ok(snapshot.to_json_pretty()?.into_bytes()),
            SnapshotCodec::Packed => serialize_and_compress(snapshot),
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Snapshot, SaveError> {
        match self.codec {
            SnapshotCodec::Json => {
                let snapshot: Snapshot = serde_json::from_slice(data)?;
                snapshot.validate()?;
                Ok(snapshot)
            }
            SnapshotCodec::Packed => migrate_packed(decompress_and_deserialize(data)?),
        }
    }

    /// `<file name>.tmp` next to the target, never the target itself
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceSink for FileSink {
    fn store(&mut self, snapshot: &Snapshot) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = self.encode(snapshot)?;

        // Write to a sibling temp file, then rename over the target
        let temp_path = self.temp_path();
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&data)?;
            file.flush()?;
            file.sync_all()?;
        }
        rename(&temp_path, &self.path)?;

        log::debug!("Stored {} bytes to {:?}", data.len(), self.path);
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>, SaveError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        let snapshot = self.decode(&data)?;
        log::info!("Loaded snapshot from {:?} ({} lineups)", self.path, snapshot.saved_lineups.len());
        Ok(Some(snapshot))
    }
}
