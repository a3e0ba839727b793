use anyhow::Result;
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::types::{ObjectsPage, VersionsCursor, VersionsPage};

pub mod s3;

/// Type alias for a boxed ObjectStore trait object.
///
/// One store instance is shared (via clone) by all workers; the underlying
/// client must tolerate concurrent calls without external locking.
pub type Storage = Box<dyn ObjectStore + Send + Sync>;

/// Backend capability surface consumed by the deletion pipeline.
///
/// Pages are fetched one at a time, in the order given by the backend's
/// continuation protocol. The pipeline never skips, reorders, or deduplicates
/// pages. A listing failure is unrecoverable at this layer; retrying
/// individual API calls is the client's concern (SDK retry configuration).
#[async_trait]
pub trait ObjectStore: DynClone {
    /// Fetch one page of the versions-and-markers listing.
    ///
    /// `cursor` is `None` for the first page; subsequent pages pass the
    /// cursor returned in the previous page's `next` field.
    async fn list_versions_page(&self, cursor: Option<VersionsCursor>) -> Result<VersionsPage>;

    /// Fetch one page of the plain-objects listing.
    async fn list_objects_page(&self, continuation: Option<String>) -> Result<ObjectsPage>;

    /// Delete a single object, version, or delete marker.
    async fn delete_entry(&self, key: &str, version_id: Option<String>) -> Result<()>;

    /// Delete the (now empty) bucket. Called exactly once, after all content
    /// phases have drained.
    async fn delete_bucket(&self) -> Result<()>;

    /// Name of the bucket this store operates on.
    fn bucket(&self) -> &str;
}

dyn_clone::clone_trait_object!(ObjectStore);
