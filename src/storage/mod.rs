//! Key-value persistence for namespace snapshots.
//!
//! The namespace only ever needs `get` and `set` on one key. Two backends are
//! provided and picked at construction time through [`StorageOptions`].

mod indexed_store;
mod memory_store;
mod store;

pub use indexed_store::IndexedFileStore;
pub use memory_store::MemoryStore;
pub use store::{Backend, KeyValueStore, StorageOptions, Store, StoreError};
