use anyhow::Result;
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::config::Config;
use crate::types::{ObjectDeleteFailure, ObjectVersionId, VersionListPage};

pub mod s3;

/// Type alias for a boxed Storage trait object.
///
/// Clonable so each concurrent bucket task and deletion chunk can hold its
/// own handle over the shared client.
pub type Storage = Box<dyn StorageTrait + Send + Sync>;

/// Storage operations the purge engine requires from its environment.
///
/// The surface mirrors the three S3 calls the engine needs and nothing more:
/// a reachability probe, one page of a version listing, and one batch delete.
/// Pagination and chunking live in the callers ([`VersionLister`] and
/// [`BatchDeleter`]), which keeps this boundary mockable per call.
///
/// [`VersionLister`]: crate::lister::VersionLister
/// [`BatchDeleter`]: crate::deleter::BatchDeleter
#[async_trait]
pub trait StorageTrait: DynClone {
    /// Probe whether the bucket is reachable with the caller's credentials.
    ///
    /// Implemented as a metadata probe, not a listing. Any error response
    /// (not found, access denied, or otherwise) maps to `false`; the caller's
    /// only action in either case is to skip the bucket.
    async fn bucket_exists(&self, bucket: &str) -> bool;

    /// Fetch one page of the bucket's object-version listing.
    ///
    /// The markers must be the values returned by the previous page,
    /// passed back verbatim, or `None` for the first page.
    async fn list_object_versions(
        &self,
        bucket: &str,
        key_marker: Option<String>,
        version_id_marker: Option<String>,
        max_keys: i32,
    ) -> Result<VersionListPage>;

    /// Delete up to 1000 identifiers in a single quiet DeleteObjects call.
    ///
    /// Returns the per-object error entries from the response; an empty
    /// vector means every identifier was deleted. A transport or API-level
    /// failure of the call itself is an `Err`.
    async fn delete_objects(
        &self,
        bucket: &str,
        identifiers: &[ObjectVersionId],
    ) -> Result<Vec<ObjectDeleteFailure>>;
}

dyn_clone::clone_trait_object!(StorageTrait);

/// Create the S3-backed storage for a purge run.
pub async fn create_storage(config: &Config) -> Storage {
    Box::new(s3::S3Storage::create(config).await)
}
