//! Settings resolution
//!
//! Every connection setting is taken from the first non-empty source among:
//! explicit flag, environment variable, configuration file.

use std::fmt;
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};

/// Default per-request timeout handed to the SDK
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Default upper bound for a whole command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Default upper bound for `ls`
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(10 * 60);

pub const ENV_ACCESS_KEY_ID: &str = "ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "SECRET_ACCESS_KEY";
pub const ENV_REGION: &str = "REGION";
pub const ENV_BUCKET: &str = "BUCKET";
pub const ENV_ENDPOINT_URL: &str = "ENDPOINT_URL";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct FlagValues {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub endpoint_url: Option<String>,
    pub continue_on_error: bool,
}

/// A static access key pair
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Everything needed to build a storage session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub region: String,

    /// Static credentials; `None` falls back to the ambient credential chain
    pub credentials: Option<StaticCredentials>,

    pub request_timeout: Duration,

    /// Custom endpoint for S3-compatible services
    pub endpoint_url: Option<String>,

    pub force_path_style: bool,
}

impl ClientConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            credentials: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            endpoint_url: None,
            force_path_style: false,
        }
    }

    /// Attach a static credential pair
    ///
    /// Both halves must be set together. Two empty values leave the ambient
    /// credential chain in place.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Result<Self> {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();

        match (access_key_id.is_empty(), secret_access_key.is_empty()) {
            (true, true) => self.credentials = None,
            (false, true) => {
                return Err(Error::PartialCredentials {
                    given: "access-key-id",
                    missing: "secret-access-key",
                });
            }
            (true, false) => {
                return Err(Error::PartialCredentials {
                    given: "secret-access-key",
                    missing: "access-key-id",
                });
            }
            (false, false) => {
                self.credentials = Some(StaticCredentials {
                    access_key_id,
                    secret_access_key,
                });
            }
        }

        Ok(self)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Point the client at a custom endpoint
    pub fn with_endpoint(mut self, endpoint_url: impl Into<String>) -> Result<Self> {
        let endpoint_url = endpoint_url.into();
        url::Url::parse(&endpoint_url)?;
        self.endpoint_url = Some(endpoint_url);
        Ok(self)
    }

    pub fn with_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }
}

/// Fully resolved settings for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    pub bucket: String,
    pub client: ClientConfig,
    pub command_timeout: Duration,
    pub list_timeout: Duration,
    pub continue_on_error: bool,
}

impl Settings {
    /// Resolve settings from flags, environment and configuration file
    ///
    /// `env` looks up an environment variable by name; pass
    /// `|name| std::env::var(name).ok()` for the process environment.
    pub fn resolve<F>(flags: &FlagValues, config: &Config, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |flag: &Option<String>, var: &str, file: &Option<String>| -> String {
            non_empty(flag.clone())
                .or_else(|| non_empty(env(var)))
                .or_else(|| non_empty(file.clone()))
                .unwrap_or_default()
        };

        let access_key_id = pick(&flags.access_key_id, ENV_ACCESS_KEY_ID, &config.access_key_id);
        let secret_access_key = pick(
            &flags.secret_access_key,
            ENV_SECRET_ACCESS_KEY,
            &config.secret_access_key,
        );
        let region = pick(&flags.region, ENV_REGION, &config.region);
        let bucket = pick(&flags.bucket, ENV_BUCKET, &config.bucket);
        let endpoint_url = pick(&flags.endpoint_url, ENV_ENDPOINT_URL, &config.endpoint_url);

        let mut missing = Vec::new();
        if region.is_empty() {
            missing.push("region".to_string());
        }
        if bucket.is_empty() {
            missing.push("bucket".to_string());
        }
        if !missing.is_empty() {
            return Err(Error::MissingSettings(missing));
        }

        let mut client = ClientConfig::new(region)
            .with_credentials(access_key_id, secret_access_key)?
            .with_path_style(config.force_path_style.unwrap_or(false));

        if let Some(secs) = config.request_timeout_secs {
            client = client.with_request_timeout(Duration::from_secs(secs));
        }

        if !endpoint_url.is_empty() {
            client = client.with_endpoint(endpoint_url)?;
        }

        Ok(Self {
            bucket,
            client,
            command_timeout: config
                .command_timeout_secs
                .map_or(DEFAULT_COMMAND_TIMEOUT, Duration::from_secs),
            list_timeout: config
                .list_timeout_secs
                .map_or(DEFAULT_LIST_TIMEOUT, Duration::from_secs),
            continue_on_error: flags.continue_on_error || config.continue_on_error.unwrap_or(false),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
