//! Operational limits for the log engine
//!
//! ## Contract
//!
//! The defaults are FROZEN: changing the shard count re-shapes partition keys
//! of new writes (harmless, shard keys carry no meaning), but changing the
//! page size changes the caller-visible pagination contract.

/// Operational limits enforced by the engine
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum records returned per query page (default: 100)
    pub page_size: usize,

    /// Number of write shards to spread partitions across (default: 10)
    pub shard_count: u8,

    /// Maximum stream display name length in bytes (default: 256)
    pub max_stream_name_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            page_size: 100,
            shard_count: 10,
            max_stream_name_bytes: 256,
        }
    }
}
