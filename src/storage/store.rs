use std::path::PathBuf;

use clap::ValueEnum;
use derive_more::Display;
use snafu::Snafu;
use tracing::info;

use crate::ext::{AsyncTryFrom, HostPathExt};

use super::{IndexedFileStore, MemoryStore};

pub const DEFAULT_STORAGE_KEY: &str = "browser-file-storage";
pub const DEFAULT_DATA_DIR: &str = ".browserfs";

/// The persistence contract consumed by the namespace: one serialized snapshot
/// per key.
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
pub enum Backend {
    /// Compressed records on disk, located through a persisted index
    #[default]
    #[display("durable-indexed")]
    DurableIndexed,
    /// Plain in-memory map
    #[display("simple-keyed")]
    SimpleKeyed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageOptions {
    pub key: String,
    pub backend: Backend,
    /// Only used by [`Backend::DurableIndexed`]
    pub data_dir: PathBuf,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            backend: Backend::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

/// The backend chosen at runtime.
#[derive(Debug)]
pub enum Store {
    DurableIndexed(IndexedFileStore),
    SimpleKeyed(MemoryStore),
}

impl KeyValueStore for Store {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Store::DurableIndexed(store) => store.get(key).await,
            Store::SimpleKeyed(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Store::DurableIndexed(store) => store.set(key, value).await,
            Store::SimpleKeyed(store) => store.set(key, value).await,
        }
    }
}

impl<'a> AsyncTryFrom<&'a StorageOptions> for Store {
    type Error = StoreError;

    async fn async_try_from(options: &'a StorageOptions) -> Result<Self, Self::Error> {
        match options.backend {
            Backend::DurableIndexed => {
                info!(
                    "Using durable-indexed storage in {}",
                    options.data_dir.host_display()
                );
                Ok(Store::DurableIndexed(
                    IndexedFileStore::open(&options.data_dir).await?,
                ))
            }
            Backend::SimpleKeyed => {
                info!("Using simple-keyed in-memory storage");
                Ok(Store::SimpleKeyed(MemoryStore::new()))
            }
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum StoreError {
    #[snafu(display("Storage I/O failed on {}", path))]
    IoError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to encode the storage index"))]
    IndexEncodeError {
        source: bincode::error::EncodeError,
    },
    #[snafu(display("Failed to decode the storage index at {}", path))]
    IndexDecodeError {
        path: String,
        source: bincode::error::DecodeError,
    },
    #[snafu(display("Failed to compress the value for '{}'", key))]
    CompressError {
        key: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to decompress the value for '{}'", key))]
    DecompressError {
        key: String,
        source: std::io::Error,
    },
    #[snafu(display("Stored value for '{}' does not match its checksum", key))]
    ChecksumMismatch { key: String },
    #[snafu(display("Record for '{}' is missing: {}", key, path))]
    MissingRecord { key: String, path: String },
    #[snafu(display("Stored value for '{}' is not valid UTF-8", key))]
    InvalidUtf8 {
        key: String,
        source: std::string::FromUtf8Error,
    },
}
