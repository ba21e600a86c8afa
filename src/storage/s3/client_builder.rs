//! Builds the AWS S3 client from a [`ClientConfig`].

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::retry::RetryConfig as SdkRetryConfig;
use aws_config::timeout::TimeoutConfig as SdkTimeoutConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};

use crate::config::ClientConfig;
use crate::types::S3Credentials;

const CREDENTIALS_PROVIDER_NAME: &str = "s3purge";

impl ClientConfig {
    /// Create an AWS S3 client honoring the configured credential source,
    /// region, endpoint, retry, and timeout settings.
    pub async fn create_client(&self) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(profile_files) = self.build_profile_files() {
            loader = loader.profile_files(profile_files);
        }

        match &self.credential {
            S3Credentials::Profile(profile_name) => {
                loader = loader.profile_name(profile_name);
            }
            S3Credentials::Credentials { access_keys } => {
                let credentials = Credentials::new(
                    access_keys.access_key.clone(),
                    access_keys.secret_access_key.clone(),
                    access_keys.session_token.clone(),
                    None,
                    CREDENTIALS_PROVIDER_NAME,
                );
                loader = loader.credentials_provider(credentials);
            }
            S3Credentials::FromEnvironment => {}
        }

        if let Some(ref region) = self.region {
            loader = loader.region(Region::new(region.clone()));
        }

        loader = loader
            .retry_config(
                SdkRetryConfig::standard()
                    .with_max_attempts(self.retry_config.aws_max_attempts)
                    .with_initial_backoff(Duration::from_millis(
                        self.retry_config.initial_backoff_milliseconds,
                    )),
            )
            .timeout_config(self.build_timeout_config());

        let sdk_config = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(self.force_path_style);
        if let Some(ref endpoint_url) = self.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        Client::from_conf(builder.build())
    }

    fn build_profile_files(&self) -> Option<ProfileFiles> {
        let location = &self.client_config_location;
        if location.aws_config_file.is_none() && location.aws_shared_credentials_file.is_none() {
            return None;
        }

        let mut builder = ProfileFiles::builder();
        if let Some(ref config_file) = location.aws_config_file {
            builder = builder.with_file(ProfileFileKind::Config, config_file);
        }
        if let Some(ref credentials_file) = location.aws_shared_credentials_file {
            builder = builder.with_file(ProfileFileKind::Credentials, credentials_file);
        }
        Some(builder.build())
    }

    fn build_timeout_config(&self) -> SdkTimeoutConfig {
        let mut builder = SdkTimeoutConfig::builder();
        let settings = &self.timeout_settings;

        if let Some(timeout) = settings.operation_timeout_milliseconds {
            builder = builder.operation_timeout(Duration::from_millis(timeout));
        }
        if let Some(timeout) = settings.operation_attempt_timeout_milliseconds {
            builder = builder.operation_attempt_timeout(Duration::from_millis(timeout));
        }
        if let Some(timeout) = settings.connect_timeout_milliseconds {
            builder = builder.connect_timeout(Duration::from_millis(timeout));
        }
        if let Some(timeout) = settings.read_timeout_milliseconds {
            builder = builder.read_timeout(Duration::from_millis(timeout));
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ClientConfig, RetryConfig, TimeoutSettings};
    use crate::test_utils::init_dummy_tracing_subscriber;
    use crate::types::{AccessKeys, ClientConfigLocation, S3Credentials};

    fn make_test_client_config(credential: S3Credentials) -> ClientConfig {
        ClientConfig {
            client_config_location: ClientConfigLocation {
                aws_config_file: None,
                aws_shared_credentials_file: None,
            },
            credential,
            region: Some("us-east-1".to_string()),
            endpoint_url: Some("https://localhost:9000".to_string()),
            force_path_style: true,
            retry_config: RetryConfig {
                aws_max_attempts: 3,
                initial_backoff_milliseconds: 100,
            },
            timeout_settings: TimeoutSettings::default(),
        }
    }

    #[tokio::test]
    async fn create_client_with_static_credentials() {
        init_dummy_tracing_subscriber();

        let client_config = make_test_client_config(S3Credentials::Credentials {
            access_keys: AccessKeys {
                access_key: "test_key".to_string(),
                secret_access_key: "test_secret".to_string(),
                session_token: None,
            },
        });

        let client = client_config.create_client().await;
        assert_eq!(client.config().region().unwrap().to_string(), "us-east-1");
    }

    #[tokio::test]
    async fn create_client_with_session_token() {
        init_dummy_tracing_subscriber();

        let client_config = make_test_client_config(S3Credentials::Credentials {
            access_keys: AccessKeys {
                access_key: "test_key".to_string(),
                secret_access_key: "test_secret".to_string(),
                session_token: Some("token".to_string()),
            },
        });

        let client = client_config.create_client().await;
        assert_eq!(client.config().region().unwrap().to_string(), "us-east-1");
    }

    #[tokio::test]
    async fn create_client_from_environment_credentials() {
        init_dummy_tracing_subscriber();

        let client_config = make_test_client_config(S3Credentials::FromEnvironment);
        let client = client_config.create_client().await;
        assert_eq!(client.config().region().unwrap().to_string(), "us-east-1");
    }
}
