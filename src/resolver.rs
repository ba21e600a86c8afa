use anyhow::{Result, anyhow};
use async_trait::async_trait;

/// Resolves the caller's own deployment-artifact bucket name.
///
/// Consumed only when auto-resolve is configured. The trait keeps the purge
/// engine decoupled from wherever the name actually comes from — explicit
/// configuration today, possibly infrastructure state (stack outputs, SSM)
/// tomorrow.
#[async_trait]
pub trait DeploymentBucketResolver: Send + Sync {
    async fn resolve(&self) -> Result<String>;
}

/// Resolver backed by an explicitly configured bucket name.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredBucketResolver {
    deployment_bucket: Option<String>,
}

impl ConfiguredBucketResolver {
    pub fn new(deployment_bucket: Option<String>) -> Self {
        Self { deployment_bucket }
    }
}

#[async_trait]
impl DeploymentBucketResolver for ConfiguredBucketResolver {
    async fn resolve(&self) -> Result<String> {
        self.deployment_bucket
            .clone()
            .ok_or_else(|| anyhow!("auto-resolve is enabled but no deployment bucket name is configured."))
    }
}
