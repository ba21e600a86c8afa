use anyhow::Result;
use tracing::debug;

use crate::storage::Storage;
use crate::types::ObjectVersionId;

/// Lists every object version and delete marker in a bucket.
///
/// Follows the ListObjectVersions cursor chain sequentially — the
/// key-marker/version-id-marker pair from each truncated page is passed back
/// verbatim on the next call — until the listing is exhausted. Both live
/// versions and delete markers are mapped into the same identifier form,
/// since emptying a bucket means deleting both.
///
/// The listing for a bucket fully completes before any deletion starts;
/// there is no upper bound on the number of pages, so a bucket with millions
/// of versions takes proportionally many calls.
pub struct VersionLister {
    storage: Storage,
}

impl VersionLister {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Produce the complete identifier list for `bucket`.
    ///
    /// Any page failure propagates; no partial list is returned.
    pub async fn list_all(&self, bucket: &str, max_keys: i32) -> Result<Vec<ObjectVersionId>> {
        debug!(bucket = bucket, "object version listing started.");

        let mut identifiers: Vec<ObjectVersionId> = Vec::new();
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let page = self
                .storage
                .list_object_versions(bucket, key_marker.take(), version_id_marker.take(), max_keys)
                .await?;

            identifiers.extend(page.versions);
            identifiers.extend(page.delete_markers);

            if !page.is_truncated {
                break;
            }
            key_marker = page.next_key_marker;
            version_id_marker = page.next_version_id_marker;
        }

        debug!(
            bucket = bucket,
            identifier_count = identifiers.len(),
            "object version listing completed."
        );
        Ok(identifiers)
    }
}
