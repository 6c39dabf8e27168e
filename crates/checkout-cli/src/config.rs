//! CLI settings

use std::path::Path;
use std::time::Duration;

use checkout::{Environment, PollingPolicy};
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "CHECKOUT";

/// Status polling delays, in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polling {
    /// Delay during the first minute
    pub fast_delay_secs: u64,
    /// Delay once polling slowed down
    pub slow_delay_secs: u64,
    /// Elapsed time polling stays fast
    pub fast_threshold_secs: u64,
    /// Elapsed time after which polling stops
    pub max_duration_secs: u64,
}

impl Default for Polling {
    fn default() -> Self {
        let policy = PollingPolicy::default();

        Self {
            fast_delay_secs: policy.fast_delay.as_secs(),
            slow_delay_secs: policy.slow_delay.as_secs(),
            fast_threshold_secs: policy.fast_threshold.as_secs(),
            max_duration_secs: policy.max_duration.as_secs(),
        }
    }
}

impl From<&Polling> for PollingPolicy {
    fn from(polling: &Polling) -> Self {
        Self {
            fast_delay: Duration::from_secs(polling.fast_delay_secs),
            slow_delay: Duration::from_secs(polling.slow_delay_secs),
            fast_threshold: Duration::from_secs(polling.fast_threshold_secs),
            max_duration: Duration::from_secs(polling.max_duration_secs),
        }
    }
}

/// CLI settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Environment name (`test`, `live`, `us`, ...) or a base url
    pub environment: Environment,
    /// Client key
    pub client_key: String,
    /// Default log filter
    pub log_level: String,
    /// Status polling delays
    pub polling: Polling,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: Environment::Test,
            client_key: String::new(),
            log_level: "warn".to_string(),
            polling: Polling::default(),
        }
    }
}

impl Settings {
    /// Defaults, overridden by `config_file` when given, overridden by `CHECKOUT_*` variables
    ///
    /// Nested keys use a double underscore, e.g. `CHECKOUT_POLLING__MAX_DURATION_SECS`.
    pub fn new(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(config_file) = config_file {
            builder = builder.add_source(File::from(config_file));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}
