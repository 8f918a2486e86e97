use std::sync::{Mutex, MutexGuard, PoisonError};

use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::ext::AsyncTryFrom;
use crate::snapshot;
use crate::storage::{KeyValueStore, StorageOptions, Store};
use crate::tree::{Entry, Node};

use super::error::{FsError, SnapshotFailureSnafu, StorageFailureSnafu};
use super::{MoveOptions, Namespace};

/// A namespace bound to one key of a store.
///
/// Reads work on the in-memory tree and never wait for storage. Mutations are
/// queued behind a write gate, so each one resolves, mutates and persists before
/// the next one starts and the stored snapshot always reflects the last
/// successful save.
#[derive(Debug)]
pub struct FileSystem<S = Store> {
    key: String,
    store: S,
    namespace: Mutex<Namespace>,
    write_gate: futures::lock::Mutex<()>,
}

impl FileSystem<Store> {
    /// Opens the backend described by `options` and loads the namespace stored
    /// under its key.
    pub async fn from_options(options: &StorageOptions) -> Result<Self, FsError> {
        let store = Store::async_try_from(options)
            .await
            .context(StorageFailureSnafu)?;
        Self::open(options.key.clone(), store).await
    }
}

impl<S: KeyValueStore> FileSystem<S> {
    /// Loads the snapshot stored under `key`, or starts from an empty root and
    /// saves it right away when there is none.
    pub async fn open(key: impl Into<String>, store: S) -> Result<Self, FsError> {
        let key = key.into();
        let existing = store.get(&key).await.context(StorageFailureSnafu)?;

        let (namespace, fresh) = match existing {
            Some(serialized) => {
                let root = snapshot::decode(&serialized).context(SnapshotFailureSnafu)?;
                info!("Loaded namespace '{}' ({} bytes)", key, serialized.len());
                (Namespace::from_root(root), false)
            }
            None => {
                info!("No namespace stored under '{}', starting empty", key);
                (Namespace::new(), true)
            }
        };

        let file_system = Self {
            key,
            store,
            namespace: Mutex::new(namespace),
            write_gate: futures::lock::Mutex::new(()),
        };
        if fresh {
            file_system.sync().await?;
        }
        Ok(file_system)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_path(&self) -> String {
        self.namespace().current_path()
    }

    /// Returns a copy of the node at `path`.
    pub fn get_item(&self, path: &str) -> Result<Node, FsError> {
        self.namespace().get_item(path).cloned()
    }

    pub fn list(&self, path: &str) -> Result<Vec<Entry>, FsError> {
        self.namespace().list(path)
    }

    pub fn read(&self, path: &str) -> Result<Option<String>, FsError> {
        Ok(self.namespace().read(path)?.map(str::to_string))
    }

    /// The serialized tree as it would be persisted right now.
    pub fn snapshot(&self) -> Result<String, FsError> {
        snapshot::encode(self.namespace().root()).context(SnapshotFailureSnafu)
    }

    /// Only the working directory changes, so nothing is persisted.
    pub fn set_current_directory(&self, path: &str) -> Result<(), FsError> {
        self.namespace().set_current_directory(path)
    }

    pub async fn add_children(&self, path: &str, nodes: Vec<Node>) -> Result<(), FsError> {
        self.mutate(|namespace| namespace.add_children(path, nodes))
            .await
    }

    pub async fn write(&self, path: &str, content: impl Into<String>) -> Result<(), FsError> {
        self.mutate(|namespace| namespace.write(path, content)).await
    }

    pub async fn remove_item(&self, path: &str) -> Result<Node, FsError> {
        self.mutate(|namespace| namespace.remove_item(path)).await
    }

    pub async fn rename_item(&self, path: &str, new_name: &str) -> Result<(), FsError> {
        self.mutate(|namespace| namespace.rename_item(path, new_name))
            .await
    }

    pub async fn move_item(
        &self,
        path: &str,
        new_parent: &str,
        options: MoveOptions,
    ) -> Result<(), FsError> {
        self.mutate(|namespace| namespace.move_item(path, new_parent, options))
            .await
    }

    /// Persists the current tree again. After a `StorageFailure` the in-memory
    /// tree is ahead of the store; this is how a caller catches the store up.
    pub async fn sync(&self) -> Result<(), FsError> {
        let _gate = self.write_gate.lock().await;
        let serialized = self.snapshot()?;
        self.persist(&serialized).await
    }

    async fn mutate<T>(
        &self,
        operation: impl FnOnce(&mut Namespace) -> Result<T, FsError>,
    ) -> Result<T, FsError> {
        let _gate = self.write_gate.lock().await;

        let (output, serialized) = {
            let mut namespace = self.namespace();
            let output = operation(&mut *namespace).inspect_err(|error| {
                debug!("Rejected operation: {}", error);
            })?;
            let serialized = snapshot::encode(namespace.root()).context(SnapshotFailureSnafu)?;
            (output, serialized)
        };

        self.persist(&serialized).await?;
        Ok(output)
    }

    async fn persist(&self, serialized: &str) -> Result<(), FsError> {
        match self.store.set(&self.key, serialized).await {
            Ok(()) => {
                debug!("Saved namespace '{}' ({} bytes)", self.key, serialized.len());
                Ok(())
            }
            Err(error) => {
                warn!("Failed to save namespace '{}': {}", self.key, error);
                Err(error).context(StorageFailureSnafu)
            }
        }
    }

    /// The lock is never held across an await point.
    fn namespace(&self) -> MutexGuard<'_, Namespace> {
        self.namespace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::task::Poll;

    use super::*;
    use crate::storage::{Backend, IndexedFileStore, MemoryStore, StoreError};
    use crate::tree::ROOT_NAME;

    /// A memory store whose writes can be switched off.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl FlakyStore {
        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::IoError {
                    path: key.to_string(),
                    source: std::io::Error::other("storage offline"),
                });
            }
            self.inner.set(key, value).await
        }
    }

    /// A memory store whose saves stay pending for a scripted number of polls,
    /// one entry per `set` call in order.
    #[derive(Debug, Default)]
    struct SlowStore {
        inner: MemoryStore,
        delays: Mutex<VecDeque<usize>>,
    }

    impl SlowStore {
        fn with_delays(delays: impl IntoIterator<Item = usize>) -> Self {
            Self {
                inner: MemoryStore::new(),
                delays: Mutex::new(delays.into_iter().collect()),
            }
        }
    }

    impl KeyValueStore for SlowStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            let mut remaining = self
                .delays
                .lock()
                .expect("delays lock")
                .pop_front()
                .unwrap_or(0);
            futures::future::poll_fn(|cx| {
                if remaining == 0 {
                    return Poll::Ready(());
                }
                remaining -= 1;
                cx.waker().wake_by_ref();
                Poll::Pending
            })
            .await;
            self.inner.set(key, value).await
        }
    }

    async fn stored(file_system: &FileSystem<impl KeyValueStore>) -> Option<String> {
        file_system
            .store()
            .get(file_system.key())
            .await
            .expect("get succeeds")
    }

    #[compio::test]
    async fn opening_an_empty_store_saves_an_empty_root() {
        let file_system = FileSystem::open("fs", MemoryStore::new())
            .await
            .expect("opens");

        let saved = stored(&file_system).await.expect("snapshot saved");
        assert_eq!(
            snapshot::decode(&saved).expect("decodes"),
            Node::directory(ROOT_NAME)
        );
    }

    #[compio::test]
    async fn every_mutation_is_persisted() {
        let file_system = FileSystem::open("fs", MemoryStore::new())
            .await
            .expect("opens");

        file_system
            .add_children("/", vec![Node::directory("docs")])
            .await
            .expect("add");
        file_system
            .add_children("/docs", vec![Node::file("a.txt")])
            .await
            .expect("add");
        file_system.write("/docs/a.txt", "hi").await.expect("write");

        let saved = stored(&file_system).await.expect("snapshot saved");
        assert_eq!(saved, file_system.snapshot().expect("encodes"));
        assert!(saved.contains("\"content\":\"hi\""));
    }

    #[compio::test]
    async fn rejected_operation_persists_nothing() {
        let file_system = FileSystem::open("fs", MemoryStore::new())
            .await
            .expect("opens");
        let before = stored(&file_system).await;

        let result = file_system.remove_item("/").await;

        assert!(matches!(result, Err(FsError::CannotRemoveRoot)));
        assert_eq!(stored(&file_system).await, before);
    }

    #[compio::test]
    async fn reopening_restores_the_tree() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let original_snapshot = {
            let store = IndexedFileStore::open(dir.path()).await.expect("store opens");
            let file_system = FileSystem::open("fs", store).await.expect("opens");
            file_system
                .add_children(
                    "/",
                    vec![Node::directory_with(
                        "docs",
                        vec![Node::file_with("a.txt", "hi"), Node::file("empty")],
                    )],
                )
                .await
                .expect("add");
            file_system
                .move_item("/docs/a.txt", "/", MoveOptions::copy())
                .await
                .expect("copy");
            file_system.snapshot().expect("encodes")
        };

        let store = IndexedFileStore::open(dir.path()).await.expect("store reopens");
        let reopened = FileSystem::open("fs", store).await.expect("reopens");

        assert_eq!(reopened.snapshot().expect("encodes"), original_snapshot);
        assert_eq!(reopened.read("/a.txt").expect("read").as_deref(), Some("hi"));
        assert_eq!(reopened.current_path(), "");
    }

    #[compio::test]
    async fn storage_failure_leaves_memory_ahead_until_sync() {
        let file_system = FileSystem::open("fs", FlakyStore::default())
            .await
            .expect("opens");
        file_system.store().set_failing(true);

        let result = file_system
            .add_children("/", vec![Node::file("late.txt")])
            .await;

        assert!(matches!(result, Err(FsError::StorageFailure { .. })));
        assert!(file_system.get_item("/late.txt").is_ok());
        assert!(!stored(&file_system).await.expect("snapshot saved").contains("late.txt"));

        file_system.store().set_failing(false);
        file_system.sync().await.expect("sync");
        assert!(stored(&file_system).await.expect("snapshot saved").contains("late.txt"));
    }

    #[compio::test]
    async fn corrupt_snapshot_fails_to_open() {
        let store = MemoryStore::new();
        store.set("fs", "{\"type\":\"file\"").await.expect("set succeeds");

        assert!(matches!(
            FileSystem::open("fs", store).await,
            Err(FsError::SnapshotFailure { .. })
        ));
    }

    #[compio::test]
    async fn slow_save_is_not_overtaken_by_a_later_mutation() {
        // Opening saves once, then the first mutation's save stalls while the
        // second one's would complete right away.
        let file_system = FileSystem::open("fs", SlowStore::with_delays([0, 5, 0]))
            .await
            .expect("opens");

        let (first, second) = futures::join!(
            file_system.add_children("/", vec![Node::directory("one")]),
            file_system.add_children("/", vec![Node::directory("two")]),
        );
        first.expect("first add");
        second.expect("second add");

        let saved = stored(&file_system).await.expect("snapshot saved");
        let root = snapshot::decode(&saved).expect("decodes");
        assert!(root.child_named("one").is_some());
        assert!(root.child_named("two").is_some());
        assert_eq!(saved, file_system.snapshot().expect("encodes"));
    }

    #[compio::test]
    async fn working_directory_is_not_persisted() {
        let file_system = FileSystem::open("fs", MemoryStore::new())
            .await
            .expect("opens");
        file_system
            .add_children("/", vec![Node::directory("docs")])
            .await
            .expect("add");
        let before = stored(&file_system).await;

        file_system.set_current_directory("docs").expect("cd");

        assert_eq!(file_system.current_path(), "docs");
        assert_eq!(stored(&file_system).await, before);
        assert!(matches!(
            file_system.rename_item("/docs", "papers").await,
            Err(FsError::CannotRemoveAncestorOfCwd { .. })
        ));
    }

    #[compio::test]
    async fn move_through_facade() {
        let file_system = FileSystem::open("fs", MemoryStore::new())
            .await
            .expect("opens");
        file_system
            .add_children(
                "/",
                vec![Node::directory("src"), Node::directory("dst")],
            )
            .await
            .expect("add");
        file_system
            .add_children("/src", vec![Node::file_with("f", "data")])
            .await
            .expect("add");

        file_system
            .move_item("/src/f", "/dst", MoveOptions::default())
            .await
            .expect("move");

        assert!(matches!(
            file_system.get_item("/src/f"),
            Err(FsError::NotFound { .. })
        ));
        assert_eq!(file_system.read("/dst/f").expect("read").as_deref(), Some("data"));
    }

    #[compio::test]
    async fn from_options_uses_selected_backend() {
        let options = StorageOptions {
            backend: Backend::SimpleKeyed,
            ..StorageOptions::default()
        };

        let file_system = FileSystem::from_options(&options).await.expect("opens");

        assert!(matches!(file_system.store(), Store::SimpleKeyed(_)));
        assert_eq!(file_system.key(), options.key);
    }
}
