// Snapshot persistence for the lineup engine
// Pretty JSON for interchange, MessagePack + LZ4 with checksums for compact files

pub mod error;
pub mod format;
pub mod manager;
pub mod migration;

pub use error::SaveError;
pub use format::{decompress_and_deserialize, serialize_and_compress, PackedSnapshot, Snapshot};
pub use manager::{FileSink, MemorySink, PersistenceSink, SnapshotCodec};
pub use migration::{migrate_packed, repair_snapshot, RepairReport};

pub const SNAPSHOT_VERSION: u32 = 1;
