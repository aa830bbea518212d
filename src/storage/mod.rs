//! Object-storage seam.
//!
//! The pipeline only ever needs two remote operations, so the service sits
//! behind the narrow [`ObjectStore`] trait. A [`Connector`] turns a loaded
//! [`StorageCredential`] into a store; that is the point where a bad key
//! surfaces as a client-construction failure.
//!
//! ## Implementations
//!
//! | Type | Backend |
//! |------|---------|
//! | [`oci::OciObjectStorageClient`] | OCI Object Storage REST API, signed requests |
//! | [`memory::MemoryObjectStore`]  | in-process map with call counters, for tests |

pub mod memory;
pub mod oci;
pub mod signer;

use crate::credential::StorageCredential;
use crate::error::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

pub use memory::{MemoryConnector, MemoryObjectStore};
pub use oci::{OciConnector, OciObjectStorageClient};

/// Identifies one object within the storage service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub namespace: String,
    pub bucket: String,
    pub object_name: String,
}

impl ObjectLocation {
    pub fn new(
        namespace: impl Into<String>,
        bucket: impl Into<String>,
        object_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            bucket: bucket.into(),
            object_name: object_name.into(),
        }
    }

    /// Same namespace and bucket, different object.
    pub fn sibling(&self, object_name: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            bucket: self.bucket.clone(),
            object_name: object_name.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.bucket, self.object_name)
    }
}

/// The two object operations the pipeline uses.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read a whole object. The response stream is fully consumed and
    /// released before this returns.
    async fn fetch(&self, location: &ObjectLocation) -> Result<Bytes, StorageError>;

    /// Write `content` as one object. `content_length` must equal
    /// `content.len()`; it is sent as the declared length of the upload.
    async fn put(
        &self,
        location: &ObjectLocation,
        content: Bytes,
        content_length: u64,
    ) -> Result<(), StorageError>;
}

/// Builds a store from a credential.
pub trait Connector: Send + Sync {
    fn connect(&self, credential: &StorageCredential) -> Result<Arc<dyn ObjectStore>, StorageError>;
}

/// Reject a payload whose declared length disagrees with its size.
pub(crate) fn check_length(content: &Bytes, content_length: u64) -> Result<(), StorageError> {
    let actual = content.len() as u64;
    if actual != content_length {
        return Err(StorageError::LengthMismatch {
            declared: content_length,
            actual,
        });
    }
    Ok(())
}
