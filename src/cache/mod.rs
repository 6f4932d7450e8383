// Cache module for local key/value storage.
// Stores aggregated GitHub statistics and the admin flag between runs.

pub mod paths;
pub mod store;

pub use paths::*;
pub use store::{
    CacheEntry, DEFAULT_TTL, FileStore, KeyValueStore, read_entry, read_if_valid, write_entry,
};

#[cfg(test)]
pub use store::MemoryStore;
