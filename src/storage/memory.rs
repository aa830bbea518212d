//! In-process object store.
//!
//! Backs the pipeline in tests. Call counters let tests
//! assert that a short-circuited pipeline never touched storage, and
//! [`MemoryObjectStore::fail_puts`] simulates a rejected upload.

use crate::credential::StorageCredential;
use crate::error::StorageError;
use crate::storage::{check_length, Connector, ObjectLocation, ObjectStore};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// A map of objects keyed by location.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<ObjectLocation, Bytes>>,
    put_failure: Mutex<Option<String>>,
    fetches: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object directly, bypassing counters.
    pub fn insert(&self, location: ObjectLocation, content: impl Into<Bytes>) {
        lock(&self.objects).insert(location, content.into());
    }

    /// Read an object directly, bypassing counters.
    pub fn get(&self, location: &ObjectLocation) -> Option<Bytes> {
        lock(&self.objects).get(location).cloned()
    }

    /// Make every subsequent `put` fail with `message`.
    pub fn fail_puts(&self, message: impl Into<String>) {
        *lock(&self.put_failure) = Some(message.into());
    }

    /// Number of `fetch` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `put` calls so far, including failed ones.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn fetch(&self, location: &ObjectLocation) -> Result<Bytes, StorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.get(location).ok_or_else(|| StorageError::NotFound {
            bucket: location.bucket.clone(),
            object: location.object_name.clone(),
        })
    }

    async fn put(
        &self,
        location: &ObjectLocation,
        content: Bytes,
        content_length: u64,
    ) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = lock(&self.put_failure).clone() {
            return Err(StorageError::Injected(message));
        }
        check_length(&content, content_length)?;
        self.insert(location.clone(), content);
        Ok(())
    }
}

/// Hands out one shared [`MemoryObjectStore`], ignoring the credential.
#[derive(Debug)]
pub struct MemoryConnector {
    store: Arc<MemoryObjectStore>,
    failure: Option<String>,
    connects: AtomicUsize,
}

impl MemoryConnector {
    pub fn new(store: Arc<MemoryObjectStore>) -> Self {
        Self {
            store,
            failure: None,
            connects: AtomicUsize::new(0),
        }
    }

    /// A connector whose every `connect` fails with `message`.
    pub fn failing(store: Arc<MemoryObjectStore>, message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(store)
        }
    }

    /// Number of `connect` calls so far.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl Connector for MemoryConnector {
    fn connect(&self, _credential: &StorageCredential) -> Result<Arc<dyn ObjectStore>, StorageError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.failure {
            return Err(StorageError::Signing(message.clone()));
        }
        let store: Arc<dyn ObjectStore> = self.store.clone();
        Ok(store)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
