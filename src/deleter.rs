//! Batch deletion using the S3 DeleteObjects API.
//!
//! Splits a bucket's identifier list into chunks of up to 1000 and issues
//! all chunk requests concurrently in quiet mode, so responses carry only
//! the failures.

use anyhow::{Context, Result, anyhow};
use tokio::task::JoinSet;
use tracing::debug;

use crate::storage::Storage;
use crate::types::ObjectDeleteFailure;
use crate::types::ObjectVersionId;
use crate::types::error::{BatchDeleteFailures, PurgeError};

/// Maximum identifiers per DeleteObjects API call (S3 limit).
pub const MAX_BATCH_SIZE: usize = 1000;

/// Deletes a bucket's complete identifier list in concurrent batches.
///
/// Chunk order follows listing order, but chunks run concurrently and no
/// chunk's failure blocks another from being attempted. After every chunk
/// completes, the responses are scanned in listing order; any per-object
/// error entry fails the bucket with a [`PurgeError::BatchDelete`] carrying
/// every collected failure.
pub struct BatchDeleter {
    storage: Storage,
    batch_size: usize,
}

impl BatchDeleter {
    pub fn new(storage: Storage, batch_size: u16) -> Self {
        let batch_size = (batch_size.max(1) as usize).min(MAX_BATCH_SIZE);
        Self {
            storage,
            batch_size,
        }
    }

    /// Delete every identifier from `bucket`.
    ///
    /// An empty list is an immediate success with zero delete calls.
    /// Returns the number of deleted objects on success.
    pub async fn delete_all(
        &self,
        bucket: &str,
        identifiers: Vec<ObjectVersionId>,
    ) -> Result<u64> {
        if identifiers.is_empty() {
            debug!(bucket = bucket, "no object versions to delete.");
            return Ok(0);
        }

        let total = identifiers.len() as u64;
        let chunks: Vec<Vec<ObjectVersionId>> = identifiers
            .chunks(self.batch_size)
            .map(<[ObjectVersionId]>::to_vec)
            .collect();
        let chunk_count = chunks.len();

        debug!(
            bucket = bucket,
            identifier_count = total,
            chunk_count = chunk_count,
            "sending DeleteObjects batch requests."
        );

        let mut join_set = JoinSet::new();
        for (index, chunk) in chunks.into_iter().enumerate() {
            let storage = self.storage.clone();
            let bucket = bucket.to_string();
            join_set.spawn(async move {
                let result = storage.delete_objects(&bucket, &chunk).await;
                (index, result)
            });
        }

        let mut outcomes: Vec<Option<Result<Vec<ObjectDeleteFailure>>>> =
            std::iter::repeat_with(|| None).take(chunk_count).collect();
        while let Some(joined) = join_set.join_next().await {
            let (index, result) = joined.context("DeleteObjects batch task panicked.")?;
            outcomes[index] = Some(result);
        }

        // Scan responses in listing order so the surfaced failure is
        // deterministic regardless of completion order.
        let mut failures: Vec<ObjectDeleteFailure> = Vec::new();
        for outcome in outcomes {
            let chunk_failures = outcome.expect("every chunk task reports an outcome")?;
            failures.extend(chunk_failures);
        }

        if !failures.is_empty() {
            return Err(anyhow!(PurgeError::BatchDelete(BatchDeleteFailures(
                failures
            ))));
        }

        debug!(
            bucket = bucket,
            deleted = total,
            "DeleteObjects batches completed."
        );
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageTrait;
    use crate::test_utils::init_dummy_tracing_subscriber;
    use crate::types::VersionListPage;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock storage recording each delete call and answering with scripted
    /// per-object failures keyed by object key.
    #[derive(Clone, Default)]
    struct RecordingStorage {
        calls: Arc<Mutex<Vec<Vec<ObjectVersionId>>>>,
        scripted_failures: Arc<HashMap<String, String>>,
        fail_call_with: Arc<Option<String>>,
    }

    impl RecordingStorage {
        fn with_failures(failures: HashMap<String, String>) -> Self {
            Self {
                scripted_failures: Arc::new(failures),
                ..Self::default()
            }
        }

        fn failing_entirely(message: &str) -> Self {
            Self {
                fail_call_with: Arc::new(Some(message.to_string())),
                ..Self::default()
            }
        }

        fn recorded_calls(&self) -> Vec<Vec<ObjectVersionId>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StorageTrait for RecordingStorage {
        async fn bucket_exists(&self, _bucket: &str) -> bool {
            true
        }

        async fn list_object_versions(
            &self,
            _bucket: &str,
            _key_marker: Option<String>,
            _version_id_marker: Option<String>,
            _max_keys: i32,
        ) -> Result<VersionListPage> {
            unimplemented!()
        }

        async fn delete_objects(
            &self,
            _bucket: &str,
            identifiers: &[ObjectVersionId],
        ) -> Result<Vec<ObjectDeleteFailure>> {
            self.calls.lock().unwrap().push(identifiers.to_vec());

            if let Some(ref message) = *self.fail_call_with {
                return Err(anyhow!(message.clone()));
            }

            Ok(identifiers
                .iter()
                .filter_map(|id| {
                    self.scripted_failures
                        .get(&id.key)
                        .map(|message| ObjectDeleteFailure {
                            key: id.key.clone(),
                            version_id: Some(id.version_id.clone()),
                            code: "InternalError".to_string(),
                            message: message.clone(),
                        })
                })
                .collect())
        }
    }

    fn make_identifiers(count: usize) -> Vec<ObjectVersionId> {
        (0..count)
            .map(|i| ObjectVersionId::new(format!("obj{i}"), format!("v{i}")))
            .collect()
    }

    #[tokio::test]
    async fn empty_list_issues_no_delete_calls() {
        init_dummy_tracing_subscriber();

        let storage = RecordingStorage::default();
        let deleter = BatchDeleter::new(Box::new(storage.clone()), 1000);

        let deleted = deleter.delete_all("b1", vec![]).await.unwrap();
        assert_eq!(deleted, 0);
        assert!(storage.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn chunks_at_batch_size_boundary() {
        init_dummy_tracing_subscriber();

        let storage = RecordingStorage::default();
        let deleter = BatchDeleter::new(Box::new(storage.clone()), 1000);

        let identifiers = make_identifiers(2500);
        let deleted = deleter.delete_all("b1", identifiers.clone()).await.unwrap();
        assert_eq!(deleted, 2500);

        let mut calls = storage.recorded_calls();
        assert_eq!(calls.len(), 3);

        let mut sizes: Vec<usize> = calls.iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![500, 1000, 1000]);

        // Union of all chunks equals the input, no duplicates.
        calls.sort_by_key(|chunk| chunk.first().map(|id| id.key.clone()));
        let mut union: Vec<ObjectVersionId> = calls.into_iter().flatten().collect();
        union.sort_by(|a, b| a.key.cmp(&b.key));
        let mut expected = identifiers;
        expected.sort_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(union, expected);
    }

    #[tokio::test]
    async fn exactly_one_call_for_a_full_batch() {
        init_dummy_tracing_subscriber();

        let storage = RecordingStorage::default();
        let deleter = BatchDeleter::new(Box::new(storage.clone()), 1000);

        deleter.delete_all("b1", make_identifiers(1000)).await.unwrap();
        assert_eq!(storage.recorded_calls().len(), 1);
    }

    #[tokio::test]
    async fn per_object_failure_fails_the_bucket_with_key_and_message() {
        init_dummy_tracing_subscriber();

        let mut failures = HashMap::new();
        failures.insert("obj2".to_string(), "bad object".to_string());
        let storage = RecordingStorage::with_failures(failures);
        let deleter = BatchDeleter::new(Box::new(storage.clone()), 1000);

        let identifiers = vec![
            ObjectVersionId::new("obj1", "v1"),
            ObjectVersionId::new("obj2", "v2"),
        ];
        let err = deleter.delete_all("b1", identifiers).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("obj2"));
        assert!(message.contains("bad object"));

        // The full failure set survives for callers that want it.
        match err.downcast_ref::<PurgeError>() {
            Some(PurgeError::BatchDelete(BatchDeleteFailures(failures))) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].key, "obj2");
            }
            other => panic!("expected BatchDelete error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn all_chunks_attempted_even_when_one_fails() {
        init_dummy_tracing_subscriber();

        let mut failures = HashMap::new();
        failures.insert("obj0".to_string(), "bad object".to_string());
        let storage = RecordingStorage::with_failures(failures);
        // batch_size 2 over 6 identifiers: 3 chunks, failure in the first.
        let deleter = BatchDeleter::new(Box::new(storage.clone()), 2);

        let err = deleter
            .delete_all("b1", make_identifiers(6))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("obj0"));
        assert_eq!(storage.recorded_calls().len(), 3);
    }

    #[tokio::test]
    async fn chunk_call_failure_fails_the_bucket() {
        init_dummy_tracing_subscriber();

        let storage = RecordingStorage::failing_entirely("connection reset");
        let deleter = BatchDeleter::new(Box::new(storage.clone()), 1000);

        let err = deleter
            .delete_all("b1", make_identifiers(3))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn zero_batch_size_is_clamped_to_one() {
        init_dummy_tracing_subscriber();

        let storage = RecordingStorage::default();
        let deleter = BatchDeleter::new(Box::new(storage.clone()), 0);

        deleter.delete_all("b1", make_identifiers(3)).await.unwrap();
        assert_eq!(storage.recorded_calls().len(), 3);
    }
}
