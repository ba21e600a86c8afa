use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::config::{ClientConfig, Config, RetryConfig, TimeoutSettings, TracingConfig};
use crate::types::{AccessKeys, ClientConfigLocation, RunMode, S3Credentials};

#[cfg(test)]
mod tests;

// ---------------------------------------------------------------------------
// Default constants
// ---------------------------------------------------------------------------

const DEFAULT_BATCH_SIZE: u16 = 1000;
const DEFAULT_MAX_KEYS: i32 = 1000;
const DEFAULT_PROMPT: bool = false;
const DEFAULT_AUTO_RESOLVE: bool = false;
const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_AWS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;
const DEFAULT_FORCE_PATH_STYLE: bool = false;

// ---------------------------------------------------------------------------
// Error messages
// ---------------------------------------------------------------------------

const ERROR_MESSAGE_BATCH_SIZE_ZERO: &str = "Batch size must be at least 1.";
const ERROR_MESSAGE_BATCH_SIZE_TOO_LARGE: &str = "Batch size must be at most 1000 (S3 API limit).";
const ERROR_MESSAGE_MAX_KEYS_ZERO: &str = "Max keys must be at least 1.";

// ---------------------------------------------------------------------------
// CLIArgs (clap-derived argument struct)
// ---------------------------------------------------------------------------

/// s3purge - Empty versioned Amazon S3 buckets as a deployment-lifecycle step.
///
/// Removes every object version and delete marker from the configured
/// buckets so infrastructure tooling can delete or replace them.
///
/// Example:
///   s3purge pre-removal --bucket my-stack-assets --bucket my-stack-logs
///   s3purge pre-deploy --deploy-bucket my-old-bucket
///   s3purge on-demand --bucket my-stack-assets --prompt -v
#[derive(Parser, Clone, Debug)]
#[command(name = "s3purge", version, about, long_about = None)]
pub struct CLIArgs {
    /// Lifecycle phase to run.
    #[arg(value_enum, default_value = "on-demand")]
    pub mode: RunMode,

    // -----------------------------------------------------------------------
    // Bucket selection
    // -----------------------------------------------------------------------
    /// Bucket emptied on pre-removal and on-demand runs. Repeatable.
    #[arg(
        long = "bucket",
        env = "S3PURGE_BUCKETS",
        value_delimiter = ',',
        value_parser = NonEmptyStringValueParser::new(),
        help_heading = "Buckets"
    )]
    pub buckets: Vec<String>,

    /// Bucket emptied before a stack deploy. Repeatable and independent of
    /// --bucket; the two lists never merge.
    #[arg(
        long = "deploy-bucket",
        env = "S3PURGE_DEPLOY_BUCKETS",
        value_delimiter = ',',
        value_parser = NonEmptyStringValueParser::new(),
        help_heading = "Buckets"
    )]
    pub buckets_to_clean_on_deploy: Vec<String>,

    /// Also empty the deployment-artifact bucket (see --deployment-bucket)
    /// on pre-removal and on-demand runs.
    #[arg(long, env = "S3PURGE_AUTO_RESOLVE", default_value_t = DEFAULT_AUTO_RESOLVE, help_heading = "Buckets")]
    pub auto_resolve: bool,

    /// Deployment-artifact bucket name consumed by --auto-resolve.
    #[arg(long, env = "S3PURGE_DEPLOYMENT_BUCKET", value_parser = NonEmptyStringValueParser::new(), help_heading = "Buckets")]
    pub deployment_bucket: Option<String>,

    // -----------------------------------------------------------------------
    // Safety options
    // -----------------------------------------------------------------------
    /// Ask for confirmation before emptying each bucket.
    #[arg(short = 'p', long, env = "S3PURGE_PROMPT", default_value_t = DEFAULT_PROMPT, help_heading = "Safety")]
    pub prompt: bool,

    // -----------------------------------------------------------------------
    // Deletion options
    // -----------------------------------------------------------------------
    /// Identifiers per DeleteObjects request (1-1000). Default: 1000.
    #[arg(long, env = "S3PURGE_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE, help_heading = "Deletion")]
    pub batch_size: u16,

    /// Max keys per listing request. Default: 1000.
    #[arg(long, env = "S3PURGE_MAX_KEYS", default_value_t = DEFAULT_MAX_KEYS, help_heading = "Deletion")]
    pub max_keys: i32,

    // -----------------------------------------------------------------------
    // Logging options
    // -----------------------------------------------------------------------
    /// Verbosity level. -q (quiet), default (normal), -v, -vv (debug).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Output logs in JSON format.
    #[arg(long, env = "S3PURGE_JSON_TRACING", default_value_t = DEFAULT_JSON_TRACING, help_heading = "Logging")]
    pub json_tracing: bool,

    /// Enable AWS SDK tracing.
    #[arg(long, env = "S3PURGE_AWS_SDK_TRACING", default_value_t = DEFAULT_AWS_SDK_TRACING, help_heading = "Logging")]
    pub aws_sdk_tracing: bool,

    /// Enable tracing span events.
    #[arg(long, env = "S3PURGE_SPAN_EVENTS_TRACING", default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Logging")]
    pub span_events_tracing: bool,

    /// Disable colored output in logs.
    #[arg(long, env = "S3PURGE_DISABLE_COLOR_TRACING", default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Logging")]
    pub disable_color_tracing: bool,

    // -----------------------------------------------------------------------
    // Retry options
    // -----------------------------------------------------------------------
    /// Maximum retry attempts for AWS SDK operations. Default: 10.
    #[arg(long, env = "S3PURGE_AWS_MAX_ATTEMPTS", default_value_t = DEFAULT_AWS_MAX_ATTEMPTS, help_heading = "Retry")]
    pub aws_max_attempts: u32,

    /// Initial backoff in milliseconds for retries. Default: 100.
    #[arg(long, env = "S3PURGE_INITIAL_BACKOFF_MILLISECONDS", default_value_t = DEFAULT_INITIAL_BACKOFF_MILLISECONDS, help_heading = "Retry")]
    pub initial_backoff_milliseconds: u64,

    // -----------------------------------------------------------------------
    // Timeout options
    // -----------------------------------------------------------------------
    /// Overall operation timeout in milliseconds.
    #[arg(long, env = "S3PURGE_OPERATION_TIMEOUT_MILLISECONDS", help_heading = "Timeout")]
    pub operation_timeout_milliseconds: Option<u64>,

    /// Per-attempt operation timeout in milliseconds.
    #[arg(long, env = "S3PURGE_OPERATION_ATTEMPT_TIMEOUT_MILLISECONDS", help_heading = "Timeout")]
    pub operation_attempt_timeout_milliseconds: Option<u64>,

    /// Connection timeout in milliseconds.
    #[arg(long, env = "S3PURGE_CONNECT_TIMEOUT_MILLISECONDS", help_heading = "Timeout")]
    pub connect_timeout_milliseconds: Option<u64>,

    /// Read timeout in milliseconds.
    #[arg(long, env = "S3PURGE_READ_TIMEOUT_MILLISECONDS", help_heading = "Timeout")]
    pub read_timeout_milliseconds: Option<u64>,

    // -----------------------------------------------------------------------
    // AWS configuration
    // -----------------------------------------------------------------------
    /// AWS config file path.
    #[arg(long, env = "AWS_CONFIG_FILE", help_heading = "AWS")]
    pub aws_config_file: Option<PathBuf>,

    /// AWS shared credentials file path.
    #[arg(long, env = "AWS_SHARED_CREDENTIALS_FILE", help_heading = "AWS")]
    pub aws_shared_credentials_file: Option<PathBuf>,

    /// AWS profile. If not set, uses the default credential chain.
    #[arg(long, env = "S3PURGE_PROFILE", value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub profile: Option<String>,

    /// AWS access key ID.
    #[arg(long, env = "S3PURGE_ACCESS_KEY", value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub access_key: Option<String>,

    /// AWS secret access key.
    #[arg(long, env = "S3PURGE_SECRET_KEY", value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub secret_key: Option<String>,

    /// AWS session token.
    #[arg(long, env = "S3PURGE_SESSION_TOKEN", value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub session_token: Option<String>,

    /// AWS region.
    #[arg(long, env = "S3PURGE_REGION", value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint URL (e.g. MinIO).
    #[arg(long, env = "S3PURGE_ENDPOINT_URL", value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS")]
    pub endpoint_url: Option<String>,

    /// Force path-style access (required for some S3-compatible services).
    #[arg(long, env = "S3PURGE_FORCE_PATH_STYLE", default_value_t = DEFAULT_FORCE_PATH_STYLE, help_heading = "AWS")]
    pub force_path_style: bool,

    // -----------------------------------------------------------------------
    // Advanced options
    // -----------------------------------------------------------------------
    /// Generate shell completions.
    #[arg(long, env = "S3PURGE_AUTO_COMPLETE_SHELL", help_heading = "Advanced")]
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

// ---------------------------------------------------------------------------
// parse_from_args (public API)
// ---------------------------------------------------------------------------

/// Parse command-line arguments into a `CLIArgs` struct.
///
/// # Example
///
/// ```
/// use s3purge_rs::config::args::parse_from_args;
///
/// let args = vec!["s3purge", "pre-removal", "--bucket", "b1", "--prompt"];
/// let cli_args = parse_from_args(args).unwrap();
/// assert!(cli_args.prompt);
/// ```
pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

/// Parse arguments and build a Config in one step.
pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    Config::try_from(cli_args)
}

// ---------------------------------------------------------------------------
// Validation and Config conversion
// ---------------------------------------------------------------------------

impl CLIArgs {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err(ERROR_MESSAGE_BATCH_SIZE_ZERO.to_string());
        }
        if self.batch_size > 1000 {
            return Err(ERROR_MESSAGE_BATCH_SIZE_TOO_LARGE.to_string());
        }
        if self.max_keys < 1 {
            return Err(ERROR_MESSAGE_MAX_KEYS_ZERO.to_string());
        }
        Ok(())
    }

    fn build_client_config(&self) -> Option<ClientConfig> {
        let credential = if let Some(ref profile) = self.profile {
            S3Credentials::Profile(profile.clone())
        } else if let Some(ref access_key) = self.access_key {
            let secret_key = self.secret_key.clone().unwrap_or_default();
            S3Credentials::Credentials {
                access_keys: AccessKeys {
                    access_key: access_key.clone(),
                    secret_access_key: secret_key,
                    session_token: self.session_token.clone(),
                },
            }
        } else {
            S3Credentials::FromEnvironment
        };

        Some(ClientConfig {
            client_config_location: ClientConfigLocation {
                aws_config_file: self.aws_config_file.clone(),
                aws_shared_credentials_file: self.aws_shared_credentials_file.clone(),
            },
            credential,
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.force_path_style,
            retry_config: RetryConfig {
                aws_max_attempts: self.aws_max_attempts,
                initial_backoff_milliseconds: self.initial_backoff_milliseconds,
            },
            timeout_settings: TimeoutSettings {
                operation_timeout_milliseconds: self.operation_timeout_milliseconds,
                operation_attempt_timeout_milliseconds: self.operation_attempt_timeout_milliseconds,
                connect_timeout_milliseconds: self.connect_timeout_milliseconds,
                read_timeout_milliseconds: self.read_timeout_milliseconds,
            },
        })
    }

    fn build_tracing_config(&self) -> Option<TracingConfig> {
        let log_level = self.verbosity.log_level()?;

        Some(TracingConfig {
            tracing_level: log_level,
            json_tracing: self.json_tracing,
            aws_sdk_tracing: self.aws_sdk_tracing,
            span_events_tracing: self.span_events_tracing,
            disable_color_tracing: self.disable_color_tracing,
        })
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(args: CLIArgs) -> Result<Self, Self::Error> {
        args.validate()?;

        let client_config = args.build_client_config();
        let tracing_config = args.build_tracing_config();

        Ok(Config {
            buckets: args.buckets,
            buckets_to_clean_on_deploy: args.buckets_to_clean_on_deploy,
            prompt: args.prompt,
            auto_resolve: args.auto_resolve,
            deployment_bucket: args.deployment_bucket,
            batch_size: args.batch_size,
            max_keys: args.max_keys,
            client_config,
            tracing_config,
            auto_complete_shell: args.auto_complete_shell,
        })
    }
}
