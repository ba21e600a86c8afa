//! The purge run orchestrator.
//!
//! Resolves the candidate bucket set for the requested lifecycle phase,
//! applies the confirmation gate and the existence filter, then fans out
//! list → delete per bucket as independent concurrent tasks joined at the
//! end. Per-bucket failures are caught at the task boundary and converted to
//! log output; only a configuration error (or a failed prompt read, which
//! happens before any storage call) fails the run itself.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::deleter::BatchDeleter;
use crate::lister::VersionLister;
use crate::resolver::{ConfiguredBucketResolver, DeploymentBucketResolver};
use crate::safety::ConfirmationGate;
use crate::storage::{self, Storage};
use crate::types::{PurgeReport, PurgeStats, RunMode};

/// Empties the configured buckets for one lifecycle phase.
///
/// All data lives within a single [`run`](PurgePipeline::run); nothing is
/// persisted between invocations.
///
/// ## Usage
///
/// ```no_run
/// # async fn example() {
/// use s3purge_rs::{Config, PurgePipeline, RunMode};
///
/// let config = Config::for_buckets(["my-stack-assets"]);
/// let pipeline = PurgePipeline::new(config).await;
/// pipeline.run(RunMode::OnDemand).await.unwrap();
///
/// let stats = pipeline.stats();
/// assert_eq!(stats.buckets_failed, 0);
/// # }
/// ```
pub struct PurgePipeline {
    config: Config,
    storage: Storage,
    gate: ConfirmationGate,
    resolver: Box<dyn DeploymentBucketResolver>,
    report: Arc<PurgeReport>,
}

impl PurgePipeline {
    /// Create a pipeline with S3-backed storage and stdin/stdout prompts.
    pub async fn new(config: Config) -> Self {
        let storage = storage::create_storage(&config).await;
        let resolver = Box::new(ConfiguredBucketResolver::new(
            config.deployment_bucket.clone(),
        ));
        Self::with_parts(config, storage, ConfirmationGate::new(), resolver)
    }

    /// Create a pipeline from explicit collaborators.
    ///
    /// This is the seam tests use to inject mock storage, scripted prompts,
    /// or alternative resolvers.
    pub fn with_parts(
        config: Config,
        storage: Storage,
        gate: ConfirmationGate,
        resolver: Box<dyn DeploymentBucketResolver>,
    ) -> Self {
        Self {
            config,
            storage,
            gate,
            resolver,
            report: Arc::new(PurgeReport::new()),
        }
    }

    /// Snapshot of the per-run counters.
    pub fn stats(&self) -> PurgeStats {
        self.report.snapshot()
    }

    /// Run the purge for the given lifecycle phase.
    ///
    /// Individual bucket failures never propagate here; the run resolves
    /// once every per-bucket attempt has finished. Only a configuration
    /// error or a failed confirmation-prompt read returns `Err`, and both
    /// occur before any storage side effect.
    pub async fn run(&self, mode: RunMode) -> Result<()> {
        self.config.validate()?;

        let candidates = self.select_candidates(mode).await;
        if candidates.is_empty() {
            info!("no buckets selected for this phase, nothing to do.");
            return Ok(());
        }

        let candidates = if self.config.prompt {
            let confirmed = self.gate.confirm(&candidates)?;
            self.report
                .add_declined((candidates.len() - confirmed.len()) as u64);
            confirmed
        } else {
            candidates
        };

        let existing = self.filter_existing(candidates).await;
        self.empty_buckets(existing).await;

        let stats = self.report.snapshot();
        info!(
            emptied = stats.buckets_emptied,
            failed = stats.buckets_failed,
            missing = stats.buckets_missing,
            declined = stats.buckets_declined,
            objects_deleted = stats.objects_deleted,
            "purge run completed."
        );
        Ok(())
    }

    /// Select the candidate bucket list for the phase.
    ///
    /// Pre-removal and on-demand runs use the general list, plus the
    /// auto-resolved deployment bucket when configured; pre-deploy runs use
    /// the deploy-time cleanup list. The two lists never merge.
    async fn select_candidates(&self, mode: RunMode) -> Vec<String> {
        if mode.uses_deploy_time_list() {
            return self.config.buckets_to_clean_on_deploy.clone();
        }

        let mut candidates = self.config.buckets.clone();
        if self.config.auto_resolve {
            match self.resolver.resolve().await {
                Ok(bucket) => {
                    if !candidates.contains(&bucket) {
                        candidates.push(bucket);
                    }
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        "could not resolve the deployment bucket, continuing with the configured buckets."
                    );
                }
            }
        }
        candidates
    }

    /// Drop candidates whose existence probe fails, so stale configuration
    /// entries don't produce noisy listing errors.
    async fn filter_existing(&self, candidates: Vec<String>) -> Vec<String> {
        let mut existing = Vec::with_capacity(candidates.len());
        for bucket in candidates {
            if self.storage.bucket_exists(&bucket).await {
                existing.push(bucket);
            } else {
                warn!(
                    bucket = bucket.as_str(),
                    "{} not found or you do not have permissions, skipping...", bucket
                );
                self.report.increment_missing();
            }
        }
        existing
    }

    /// Fan out list → delete per bucket, concurrently.
    ///
    /// Each task's failure is captured locally; sibling buckets and the
    /// overall run are unaffected.
    async fn empty_buckets(&self, buckets: Vec<String>) {
        let mut join_set = JoinSet::new();
        for bucket in buckets {
            let storage = self.storage.clone();
            let batch_size = self.config.batch_size;
            let max_keys = self.config.max_keys;
            let report = self.report.clone();

            join_set.spawn(async move {
                let lister = VersionLister::new(storage.clone());
                let deleter = BatchDeleter::new(storage, batch_size);

                let result = async {
                    let identifiers = lister.list_all(&bucket, max_keys).await?;
                    deleter.delete_all(&bucket, identifiers).await
                }
                .await;

                match result {
                    Ok(deleted) => {
                        report.increment_emptied();
                        report.add_objects_deleted(deleted);
                        info!(
                            bucket = bucket.as_str(),
                            objects_deleted = deleted,
                            "bucket {} successfully emptied",
                            bucket
                        );
                    }
                    Err(e) => {
                        report.increment_failed();
                        error!(
                            bucket = bucket.as_str(),
                            "bucket {} cannot be emptied: {:#}", bucket, e
                        );
                    }
                }
            });
        }

        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                self.report.increment_failed();
                error!("bucket task panicked: {}", e);
            }
        }
    }
}
