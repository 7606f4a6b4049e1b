//! Persistent key-value storage backing the identity shadow copies

pub mod file;
pub mod memory;
pub mod traits;

// Re-export main components
pub use file::FileKeyValueStore;
pub use memory::MemoryKeyValueStore;
pub use traits::{KeyValueStore, StorageWrite};
