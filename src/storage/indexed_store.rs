//! On-disk key-value store.
//!
//! Layout of the data directory:
//! - `index.bin`: bincode-encoded [`StoreIndex`], one entry per key;
//! - `<metrohash of key>.zst`: the zstd-compressed value of that key.
//!
//! Files are written next to their target and renamed into place, record first and
//! index second, so a crash never leaves the index pointing at a half-written record.

use std::collections::HashMap;
use std::hash::Hasher;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bincode::{Decode, Encode};
use compio::fs;
use futures::lock::Mutex;
use metrohash::MetroHash64;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::HostPathExt;

use super::KeyValueStore;
use super::store::{
    ChecksumMismatchSnafu, CompressSnafu, DecompressSnafu, IndexDecodeSnafu, IndexEncodeSnafu,
    InvalidUtf8Snafu, IoSnafu, MissingRecordSnafu, StoreError,
};

const INDEX_FILE_NAME: &str = "index.bin";
const RECORD_EXTENSION: &str = "zst";
const STAGING_EXTENSION: &str = "tmp";
const COMPRESSION_LEVEL: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default, Encode, Decode)]
struct StoreIndex {
    records: HashMap<String, RecordEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
struct RecordEntry {
    file_name: String,
    length: u64,
    checksum: u64,
}

#[derive(Debug)]
pub struct IndexedFileStore {
    dir: PathBuf,
    index: Mutex<StoreIndex>,
}

impl IndexedFileStore {
    /// Opens the store rooted at `dir`, creating the directory when needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await.context(IoSnafu {
            path: dir.host_display(),
        })?;

        let index_path = dir.join(INDEX_FILE_NAME);
        let index = match fs::read(&index_path).await {
            Ok(bytes) => {
                let (index, _) = bincode::decode_from_slice::<StoreIndex, _>(
                    &bytes,
                    bincode::config::standard(),
                )
                .context(IndexDecodeSnafu {
                    path: index_path.host_display(),
                })?;
                debug!("Loaded store index with {} keys", index.records.len());
                index
            }
            Err(error) if error.kind() == ErrorKind::NotFound => {
                info!(
                    "No existing store index in {}, starting fresh",
                    dir.host_display()
                );
                StoreIndex::default()
            }
            Err(error) => {
                return Err(error).context(IoSnafu {
                    path: index_path.host_display(),
                });
            }
        };

        Ok(Self {
            dir,
            index: Mutex::new(index),
        })
    }

    fn record_file_name(key: &str) -> String {
        format!("{:016x}.{RECORD_EXTENSION}", checksum(key.as_bytes()))
    }

    async fn write_atomically(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        let target = self.dir.join(file_name);
        let staging = self.dir.join(format!("{file_name}.{STAGING_EXTENSION}"));

        fs::write(&staging, bytes).await.0.context(IoSnafu {
            path: staging.host_display(),
        })?;
        fs::rename(&staging, &target).await.context(IoSnafu {
            path: target.host_display(),
        })?;

        Ok(())
    }
}

impl KeyValueStore for IndexedFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let index = self.index.lock().await;
        let Some(entry) = index.records.get(key) else {
            return Ok(None);
        };

        let path = self.dir.join(&entry.file_name);
        let compressed = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return MissingRecordSnafu {
                    key,
                    path: path.host_display(),
                }
                .fail();
            }
            Err(error) => {
                return Err(error).context(IoSnafu {
                    path: path.host_display(),
                });
            }
        };

        let bytes = zstd::decode_all(compressed.as_slice()).context(DecompressSnafu { key })?;
        ensure!(
            bytes.len() as u64 == entry.length && checksum(&bytes) == entry.checksum,
            ChecksumMismatchSnafu { key }
        );

        debug!("Read {} bytes for '{}'", bytes.len(), key);
        String::from_utf8(bytes).context(InvalidUtf8Snafu { key }).map(Some)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut index = self.index.lock().await;

        let file_name = Self::record_file_name(key);
        let compressed =
            zstd::encode_all(value.as_bytes(), COMPRESSION_LEVEL).context(CompressSnafu { key })?;
        self.write_atomically(&file_name, compressed).await?;

        let mut updated = index.clone();
        updated.records.insert(
            key.to_string(),
            RecordEntry {
                file_name,
                length: value.len() as u64,
                checksum: checksum(value.as_bytes()),
            },
        );
        let encoded = bincode::encode_to_vec(&updated, bincode::config::standard())
            .context(IndexEncodeSnafu)?;
        self.write_atomically(INDEX_FILE_NAME, encoded).await?;

        *index = updated;
        debug!("Stored {} bytes under '{}'", value.len(), key);
        Ok(())
    }
}

fn checksum(bytes: &[u8]) -> u64 {
    let mut hasher = MetroHash64::default();
    hasher.write(bytes);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_dir() -> TempDir {
        TempDir::new().expect("Failed to create temp directory")
    }

    #[compio::test]
    async fn missing_key_is_absent() {
        let dir = temp_dir();
        let store = IndexedFileStore::open(dir.path()).await.expect("store opens");

        assert_eq!(store.get("fs").await.expect("get succeeds"), None);
    }

    #[compio::test]
    async fn set_then_get_returns_value() {
        let dir = temp_dir();
        let store = IndexedFileStore::open(dir.path()).await.expect("store opens");

        store.set("fs", "{\"tree\":true}").await.expect("set succeeds");

        assert_eq!(
            store.get("fs").await.expect("get succeeds").as_deref(),
            Some("{\"tree\":true}")
        );
    }

    #[compio::test]
    async fn values_survive_reopening() {
        let dir = temp_dir();
        {
            let store = IndexedFileStore::open(dir.path()).await.expect("store opens");
            store.set("a", "first").await.expect("set succeeds");
            store.set("b", "second").await.expect("set succeeds");
            store.set("a", "third").await.expect("set succeeds");
        }

        let reopened = IndexedFileStore::open(dir.path()).await.expect("store reopens");

        assert_eq!(reopened.get("a").await.expect("get succeeds").as_deref(), Some("third"));
        assert_eq!(reopened.get("b").await.expect("get succeeds").as_deref(), Some("second"));
    }

    #[compio::test]
    async fn record_files_are_compressed_and_staging_is_cleaned_up() {
        let dir = temp_dir();
        let store = IndexedFileStore::open(dir.path()).await.expect("store opens");
        let value = "x".repeat(64 * 1024);

        store.set("fs", &value).await.expect("set succeeds");

        let record = dir.path().join(IndexedFileStore::record_file_name("fs"));
        let on_disk = std::fs::metadata(&record).expect("record exists").len();
        assert!(on_disk < value.len() as u64);

        let leftovers = std::fs::read_dir(dir.path())
            .expect("dir is readable")
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == STAGING_EXTENSION))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[compio::test]
    async fn tampered_record_fails_checksum() {
        let dir = temp_dir();
        let store = IndexedFileStore::open(dir.path()).await.expect("store opens");
        store.set("fs", "original").await.expect("set succeeds");

        let record = dir.path().join(IndexedFileStore::record_file_name("fs"));
        let tampered = zstd::encode_all("tampered".as_bytes(), COMPRESSION_LEVEL)
            .expect("compression succeeds");
        std::fs::write(&record, tampered).expect("record is writable");

        assert!(matches!(
            store.get("fs").await,
            Err(StoreError::ChecksumMismatch { key }) if key == "fs"
        ));
    }

    #[compio::test]
    async fn deleted_record_is_reported_missing() {
        let dir = temp_dir();
        let store = IndexedFileStore::open(dir.path()).await.expect("store opens");
        store.set("fs", "original").await.expect("set succeeds");

        std::fs::remove_file(dir.path().join(IndexedFileStore::record_file_name("fs")))
            .expect("record is removable");

        assert!(matches!(
            store.get("fs").await,
            Err(StoreError::MissingRecord { .. })
        ));
    }

    #[compio::test]
    async fn corrupt_index_fails_to_open() {
        let dir = temp_dir();
        std::fs::write(dir.path().join(INDEX_FILE_NAME), [0xff; 3]).expect("index is writable");

        assert!(matches!(
            IndexedFileStore::open(dir.path()).await,
            Err(StoreError::IndexDecodeError { .. })
        ));
    }
}
