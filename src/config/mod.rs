pub mod args;

use crate::types::error::PurgeError;
use crate::types::{ClientConfigLocation, S3Credentials};

/// Main configuration for a purge run.
///
/// Holds the two independent bucket lists, the interactive-confirmation and
/// deployment-bucket options, and the ambient AWS client and tracing
/// settings. The run mode is not part of the configuration; it is passed to
/// [`PurgePipeline::run`](crate::pipeline::PurgePipeline::run) per
/// invocation.
///
/// # Quick start
///
/// ```
/// use s3purge_rs::Config;
///
/// let config = Config::for_buckets(["my-stack-assets", "my-stack-logs"]);
/// assert_eq!(config.batch_size, 1000);
/// assert!(!config.prompt);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Buckets emptied on pre-removal and on-demand runs.
    pub buckets: Vec<String>,
    /// Buckets emptied before a stack deploy. Independent of `buckets`;
    /// the two lists never merge.
    pub buckets_to_clean_on_deploy: Vec<String>,
    /// Ask the operator to confirm each bucket before emptying it.
    pub prompt: bool,
    /// Also empty the caller's own deployment-artifact bucket on
    /// pre-removal and on-demand runs.
    pub auto_resolve: bool,
    /// Deployment-artifact bucket name used by the shipped resolver when
    /// `auto_resolve` is set.
    pub deployment_bucket: Option<String>,
    /// Identifiers per DeleteObjects request (1..=1000).
    pub batch_size: u16,
    /// Max keys per listing page.
    pub max_keys: i32,
    pub client_config: Option<ClientConfig>,
    pub tracing_config: Option<TracingConfig>,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

impl Config {
    /// Create a `Config` that empties the given buckets on pre-removal and
    /// on-demand runs, with defaults for everything else.
    ///
    /// This is the recommended constructor for library usage; no prompt is
    /// configured, which is appropriate for programmatic use.
    pub fn for_buckets<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Config {
            buckets: buckets.into_iter().map(Into::into).collect(),
            ..Config::default()
        }
    }

    /// Reject a configuration that names no buckets at all.
    ///
    /// Called by the pipeline before any network activity, so a misconfigured
    /// run fails fast with a configuration error rather than a storage error.
    pub fn validate(&self) -> Result<(), PurgeError> {
        if self.buckets.is_empty() && self.buckets_to_clean_on_deploy.is_empty() {
            return Err(PurgeError::InvalidConfig(
                "you must configure 'buckets' or 'buckets-to-clean-on-deploy' with at least one bucket name"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            buckets: Vec::new(),
            buckets_to_clean_on_deploy: Vec::new(),
            prompt: false,
            auto_resolve: false,
            deployment_bucket: None,
            batch_size: 1000,
            max_keys: 1000,
            client_config: None,
            tracing_config: None,
            auto_complete_shell: None,
        }
    }
}

/// AWS S3 client configuration: credential source, region, endpoint,
/// retry and timeout settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_config_location: ClientConfigLocation,
    pub credential: S3Credentials,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub retry_config: RetryConfig,
    pub timeout_settings: TimeoutSettings,
}

/// Retry configuration for AWS SDK operations.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

/// Timeout configuration for AWS SDK operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutSettings {
    pub operation_timeout_milliseconds: Option<u64>,
    pub operation_attempt_timeout_milliseconds: Option<u64>,
    pub connect_timeout_milliseconds: Option<u64>,
    pub read_timeout_milliseconds: Option<u64>,
}

/// Tracing (logging) configuration: verbosity level, JSON output, color
/// control, and AWS SDK event tracing.
#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}
